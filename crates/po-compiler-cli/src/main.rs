// crates/po-compiler-cli/src/main.rs
// ============================================================================
// Module: PO Compiler CLI Entry Point
// Description: Command dispatcher for the PO compiler server and offline tools.
// Purpose: Run the MCP server and compile, validate, or inspect catalogs locally.
// Dependencies: clap, po-compiler-core, po-compiler-mcp, serde, thiserror, tokio.
// ============================================================================

//! ## Overview
//! The `po-compiler` binary runs the MCP server and exposes the same compiler
//! operations for local files. Every command prints JSON on stdout; errors go
//! to stderr with a failure exit code. All user-facing strings are routed
//! through the i18n catalog.
//!
//! Security posture: input files are untrusted; reads are size-bounded before
//! parsing.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use po_compiler_cli::i18n::Locale;
use po_compiler_cli::i18n::set_locale;
use po_compiler_cli::t;
use po_compiler_config::MAX_SIZE_LIMIT;
use po_compiler_config::PoCompilerConfig;
use po_compiler_contract::tool_contracts;
use po_compiler_contract::tooling_markdown;
use po_compiler_core::CompileOutput;
use po_compiler_core::CompilerService;
use po_compiler_core::DEFAULT_HASH_ALGORITHM;
use po_compiler_core::Delivery;
use po_compiler_core::RecordView;
use po_compiler_core::hash_bytes;
use po_compiler_mcp::McpServer;
use po_compiler_mcp::McpServerError;
use po_compiler_mcp::compiler_service_from_config;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum size of a binary table accepted by `decode`.
const MAX_TABLE_BYTES: usize = MAX_SIZE_LIMIT;
/// Environment variable for CLI locale selection.
const LANG_ENV: &str = "PO_COMPILER_LANG";
/// Path argument that selects stdin.
const STDIN_PATH: &str = "-";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "po-compiler", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Preferred output language (overrides `PO_COMPILER_LANG`).
    #[arg(long, value_enum, value_name = "LANG", global = true)]
    lang: Option<LangArg>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the PO compiler MCP server.
    Serve(ServeCommand),
    /// Compile a catalog into a binary table.
    Compile(CompileCommand),
    /// Report structural warnings and progress for a catalog.
    Validate(ValidateCommand),
    /// Report translation progress for a catalog.
    Summarize(InputCommand),
    /// Decode a binary table into readable records.
    Decode(DecodeCommand),
    /// Print the MCP tool contracts.
    Tools(ToolsCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Configuration for the `serve` command.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Optional config file path (defaults to po-compiler.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for `compile`.
#[derive(Args, Debug)]
struct CompileCommand {
    /// Catalog text file (`-` reads stdin).
    #[arg(value_name = "INPUT")]
    input: PathBuf,
    /// Write the binary table to this path instead of using a delivery mode.
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
    /// Delivery mode: `inline`/`base64` or `external`/`path`.
    #[arg(long, value_name = "MODE", conflicts_with = "output")]
    mode: Option<String>,
    /// Optional config file path (defaults to po-compiler.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
struct ValidateCommand {
    /// Catalog input.
    #[command(flatten)]
    input: InputCommand,
    /// Exit with failure when any warning is reported.
    #[arg(long, action = ArgAction::SetTrue)]
    strict: bool,
}

/// Arguments shared by catalog reporting commands.
#[derive(Args, Debug)]
struct InputCommand {
    /// Catalog text file (`-` reads stdin).
    #[arg(value_name = "INPUT")]
    input: PathBuf,
    /// Optional config file path (defaults to po-compiler.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for `decode`.
#[derive(Args, Debug)]
struct DecodeCommand {
    /// Binary table file (`-` reads stdin).
    #[arg(value_name = "INPUT")]
    input: PathBuf,
}

/// Arguments for `tools`.
#[derive(Args, Debug)]
struct ToolsCommand {
    /// Output format.
    #[arg(long, value_enum, default_value_t = ToolsFormat::Markdown)]
    format: ToolsFormat,
}

/// Output formats for tool contracts.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum ToolsFormat {
    /// Markdown reference.
    Markdown,
    /// JSON contract array.
    Json,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a config file.
    Validate(ConfigValidateCommand),
}

/// Arguments for config validation.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to po-compiler.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Supported CLI language selections.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum LangArg {
    /// English.
    En,
    /// Spanish.
    Es,
}

impl From<LangArg> for Locale {
    fn from(value: LangArg) -> Self {
        match value {
            LangArg::En => Self::En,
            LangArg::Es => Self::Es,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

/// Errors raised while reading bounded input.
#[derive(Debug)]
enum ReadLimitError {
    /// I/O failure.
    Io(std::io::Error),
    /// Input exceeded the allowed size.
    TooLarge {
        /// Observed size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let env_lang = std::env::var(LANG_ENV).ok();
    let locale = resolve_locale(cli.lang, env_lang.as_deref())?;
    set_locale(locale);
    if locale != Locale::En {
        write_stderr_line(&t!("i18n.disclaimer.machine_translated"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Serve(command) => command_serve(command).await,
        Commands::Compile(command) => command_compile(&command),
        Commands::Validate(command) => command_validate(&command),
        Commands::Summarize(command) => command_summarize(&command),
        Commands::Decode(command) => command_decode(&command),
        Commands::Tools(command) => command_tools(&command),
        Commands::Config {
            command,
        } => command_config(command),
    }
}

/// Resolves the output locale from the flag, then the environment.
fn resolve_locale(lang: Option<LangArg>, env_lang: Option<&str>) -> CliResult<Locale> {
    if let Some(lang) = lang {
        return Ok(lang.into());
    }
    if let Some(value) = env_lang {
        return Locale::parse(value).ok_or_else(|| {
            CliError::new(t!("i18n.lang.invalid_env", env = LANG_ENV, value = value))
        });
    }
    Ok(Locale::En)
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Serve Command
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(command: ServeCommand) -> CliResult<ExitCode> {
    let config = PoCompilerConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(t!("serve.config.load_failed", error = err)))?;
    let server = McpServer::from_config(config)
        .map_err(|err| CliError::new(t!("serve.init_failed", error = err)))?;
    server
        .serve()
        .await
        .map_err(|err: McpServerError| CliError::new(t!("serve.failed", error = err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Catalog Commands
// ============================================================================

/// Executes the `compile` command.
fn command_compile(command: &CompileCommand) -> CliResult<ExitCode> {
    let service = load_service(command.config.as_deref())?;
    let text = read_catalog(&command.input, &service)?;
    let path = command.input.display();
    let output = match &command.output {
        Some(destination) => {
            let (bytes, summary) = service
                .compile_to_bytes(&text)
                .map_err(|err| CliError::new(t!("compile.failed", path = path, error = err)))?;
            fs::write(destination, &bytes).map_err(|err| {
                CliError::new(t!("compile.write_failed", path = destination.display(), error = err))
            })?;
            let written = std::path::absolute(destination).unwrap_or_else(|_| destination.clone());
            CompileOutput {
                delivery: Delivery::External {
                    path: written.to_string_lossy().into_owned(),
                },
                summary,
                digest: hash_bytes(DEFAULT_HASH_ALGORITHM, &bytes),
                size_bytes: bytes.len(),
            }
        }
        None => {
            let mode = service.resolve_mode(command.mode.as_deref());
            service
                .compile(&text, mode)
                .map_err(|err| CliError::new(t!("compile.failed", path = path, error = err)))?
        }
    };
    write_json(&output)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `validate` command.
fn command_validate(command: &ValidateCommand) -> CliResult<ExitCode> {
    let service = load_service(command.input.config.as_deref())?;
    let text = read_catalog(&command.input.input, &service)?;
    let report = service.validate(&text).map_err(|err| {
        CliError::new(t!("validate.failed", path = command.input.input.display(), error = err))
    })?;
    write_json(&report)?;
    if command.strict && !report.warnings.is_empty() {
        write_stderr_line(&t!("validate.strict_failed", count = report.warnings.len()))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the `summarize` command.
fn command_summarize(command: &InputCommand) -> CliResult<ExitCode> {
    let service = load_service(command.config.as_deref())?;
    let text = read_catalog(&command.input, &service)?;
    let summary = service.summarize(&text).map_err(|err| {
        CliError::new(t!("summarize.failed", path = command.input.display(), error = err))
    })?;
    write_json(&summary)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `decode` command.
fn command_decode(command: &DecodeCommand) -> CliResult<ExitCode> {
    let bytes = read_input(&command.input, MAX_TABLE_BYTES, &t!("input.kind.table"))?;
    let records = CompilerService::new().inspect(&bytes).map_err(|err| {
        CliError::new(t!("decode.failed", path = command.input.display(), error = err))
    })?;
    let views: Vec<RecordView> = records.iter().map(po_compiler_core::Record::view).collect();
    write_json(&views)?;
    Ok(ExitCode::SUCCESS)
}

/// Loads configuration and builds the compiler service.
fn load_service(config: Option<&Path>) -> CliResult<CompilerService> {
    let config = PoCompilerConfig::load(config)
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    Ok(compiler_service_from_config(&config.compiler))
}

// ============================================================================
// SECTION: Tooling Commands
// ============================================================================

/// Executes the `tools` command.
fn command_tools(command: &ToolsCommand) -> CliResult<ExitCode> {
    let contracts = tool_contracts();
    match command.format {
        ToolsFormat::Markdown => write_stdout_bytes(tooling_markdown(&contracts).as_bytes())
            .map_err(|err| CliError::new(output_error("stdout", &err)))?,
        ToolsFormat::Json => write_json(&contracts)?,
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(&command),
    }
}

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let _config = PoCompilerConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    write_stdout_line(&t!("config.validate.ok"))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Reads catalog text bounded by the service's input limit.
fn read_catalog(path: &Path, service: &CompilerService) -> CliResult<String> {
    let bytes = read_input(path, service.max_input_bytes(), &t!("input.kind.catalog"))?;
    String::from_utf8(bytes)
        .map_err(|_| CliError::new(t!("input.not_utf8", path = path.display())))
}

/// Reads a file, or stdin for `-`, enforcing a size limit.
fn read_input(path: &Path, max_bytes: usize, kind: &str) -> CliResult<Vec<u8>> {
    let result = if path.as_os_str() == STDIN_PATH {
        read_limited(std::io::stdin().lock(), max_bytes)
    } else {
        read_bytes_with_limit(path, max_bytes)
    };
    result.map_err(|err| match err {
        ReadLimitError::Io(err) => CliError::new(t!(
            "input.read_failed",
            kind = kind,
            path = path.display(),
            error = err
        )),
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(t!(
            "input.read_too_large",
            kind = kind,
            path = path.display(),
            size = size,
            limit = limit
        )),
    })
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let size = file.metadata().map_err(ReadLimitError::Io)?.len();
    if size > u64::try_from(max_bytes).unwrap_or(u64::MAX) {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    read_limited(file, max_bytes)
}

/// Reads at most `max_bytes` from a stream, failing if more are available.
fn read_limited(reader: impl Read, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let read_limit = u64::try_from(max_bytes).unwrap_or(u64::MAX).saturating_add(1);
    let mut bytes = Vec::new();
    reader.take(read_limit).read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes a value as JSON to stdout with a trailing newline.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let mut bytes = serde_json::to_vec_pretty(value)
        .map_err(|err| CliError::new(t!("output.json_failed", error = err)))?;
    bytes.push(b'\n');
    write_stdout_bytes(&bytes).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
