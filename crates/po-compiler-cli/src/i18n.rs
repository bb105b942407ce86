// crates/po-compiler-cli/src/i18n.rs
// ============================================================================
// Module: CLI Localization
// Description: English and Spanish message tables for po-compiler output.
// Purpose: Keep every user-facing CLI string behind a lookup key.
// Dependencies: std only.
// ============================================================================

//! ## Overview
//! Messages printed by `po-compiler` are looked up by key in a static table
//! per locale and formatted with [`t!`](crate::t), which fills `{name}`
//! placeholders from named arguments.
//!
//! ## Invariants
//! - Both tables define the same keys.
//! - A key missing from the active table resolves through English, then
//!   renders as the key itself.
//! - The locale is chosen once per process.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Output language.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Locale {
    /// English; used when nothing else is selected.
    En,
    /// Spanish.
    Es,
}

impl Locale {
    /// Two-letter language code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
        }
    }

    /// Reads a language tag such as `es`, `es-MX` or `es_MX.UTF-8`.
    ///
    /// Only the language subtag matters and case is ignored.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let language = value.trim().split(['-', '_', '.']).next().unwrap_or_default();
        match language.to_ascii_lowercase().as_str() {
            "en" => Some(Self::En),
            "es" => Some(Self::Es),
            _ => None,
        }
    }
}

/// Every locale with a message table.
pub const SUPPORTED_LOCALES: &[Locale] = &[Locale::En, Locale::Es];

/// Named placeholder value passed to [`macro@crate::t`].
#[derive(Clone)]
pub struct MessageArg {
    /// Placeholder name without braces.
    pub key: &'static str,
    /// Rendered replacement text.
    pub value: String,
}

impl MessageArg {
    /// Pairs a placeholder name with its text.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Locale Selection
// ============================================================================

/// Locale chosen for this process.
static CURRENT_LOCALE: OnceLock<Locale> = OnceLock::new();

/// Selects the output locale. Later calls are ignored.
pub fn set_locale(locale: Locale) {
    CURRENT_LOCALE.get_or_init(|| locale);
}

/// Active locale, English until [`set_locale`] runs.
#[must_use]
pub fn current_locale() -> Locale {
    CURRENT_LOCALE.get().copied().unwrap_or(Locale::En)
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// English messages.
const CATALOG_EN: &[(&str, &str)] = &[
    ("main.version", "po-compiler {version}"),
    ("serve.config.load_failed", "Failed to load config: {error}"),
    ("serve.init_failed", "Failed to initialize MCP server: {error}"),
    ("serve.failed", "MCP server failed: {error}"),
    ("config.load_failed", "Failed to load config: {error}"),
    ("config.validate.ok", "Config valid."),
    ("input.kind.catalog", "catalog"),
    ("input.kind.table", "binary table"),
    ("input.read_failed", "Failed to read {kind} at {path}: {error}"),
    (
        "input.read_too_large",
        "Refusing to read {kind} at {path} because it is {size} bytes (limit {limit}).",
    ),
    ("input.not_utf8", "Catalog at {path} is not valid UTF-8."),
    ("compile.failed", "Failed to compile {path}: {error}"),
    ("compile.write_failed", "Failed to write {path}: {error}"),
    ("validate.failed", "Failed to validate {path}: {error}"),
    ("validate.strict_failed", "Validation reported {count} warning(s)."),
    ("summarize.failed", "Failed to summarize {path}: {error}"),
    ("decode.failed", "Failed to decode {path}: {error}"),
    ("output.json_failed", "Failed to serialize output: {error}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("i18n.lang.invalid_env", "Invalid value for {env}: {value}. Expected 'en' or 'es'."),
    (
        "i18n.disclaimer.machine_translated",
        "Note: non-English output is machine-translated and may be inaccurate.",
    ),
];

/// Spanish messages.
const CATALOG_ES: &[(&str, &str)] = &[
    ("main.version", "po-compiler {version}"),
    ("serve.config.load_failed", "No se pudo cargar la configuración: {error}"),
    ("serve.init_failed", "No se pudo inicializar el servidor MCP: {error}"),
    ("serve.failed", "El servidor MCP falló: {error}"),
    ("config.load_failed", "No se pudo cargar la configuración: {error}"),
    ("config.validate.ok", "Configuración válida."),
    ("input.kind.catalog", "catálogo"),
    ("input.kind.table", "tabla binaria"),
    ("input.read_failed", "No se pudo leer {kind} en {path}: {error}"),
    (
        "input.read_too_large",
        "Se rechaza leer {kind} en {path} porque ocupa {size} bytes (límite {limit}).",
    ),
    ("input.not_utf8", "El catálogo en {path} no es UTF-8 válido."),
    ("compile.failed", "No se pudo compilar {path}: {error}"),
    ("compile.write_failed", "No se pudo escribir {path}: {error}"),
    ("validate.failed", "No se pudo validar {path}: {error}"),
    ("validate.strict_failed", "La validación informó {count} advertencia(s)."),
    ("summarize.failed", "No se pudo resumir {path}: {error}"),
    ("decode.failed", "No se pudo decodificar {path}: {error}"),
    ("output.json_failed", "No se pudo serializar la salida: {error}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "salida"),
    ("output.write_failed", "No se pudo escribir en {stream}: {error}"),
    ("i18n.lang.invalid_env", "Valor no válido para {env}: {value}. Se esperaba 'en' o 'es'."),
    (
        "i18n.disclaimer.machine_translated",
        "Nota: la salida que no está en inglés es traducción automática y puede ser inexacta.",
    ),
];

/// Lazily indexed message table for `locale`.
pub(crate) fn catalog_for(locale: Locale) -> &'static HashMap<&'static str, &'static str> {
    static CATALOG_EN_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    static CATALOG_ES_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    match locale {
        Locale::En => CATALOG_EN_MAP.get_or_init(|| CATALOG_EN.iter().copied().collect()),
        Locale::Es => CATALOG_ES_MAP.get_or_init(|| CATALOG_ES.iter().copied().collect()),
    }
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Renders `key` in the active locale.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    translate_for(current_locale(), key, args)
}

/// Renders `key` in `locale`, falling back to English and then to the key.
#[must_use]
pub fn translate_for(locale: Locale, key: &str, args: Vec<MessageArg>) -> String {
    let template = [locale, Locale::En]
        .into_iter()
        .find_map(|candidate| catalog_for(candidate).get(key).copied())
        .unwrap_or(key);
    args.into_iter().fold(template.to_string(), |message, arg| {
        message.replace(&format!("{{{}}}", arg.key), &arg.value)
    })
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Renders a message key in the active locale.
///
/// `t!("compile.failed", path = p, error = e)` replaces `{path}` and `{error}`
/// with the `to_string()` of each value.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}

// ============================================================================
// SECTION: Tests
// ============================================================================
