// crates/po-compiler-mcp/src/storage.rs
// ============================================================================
// Module: Artifact Storage
// Description: Temporary-file artifact store for external delivery.
// Purpose: Persist compiled tables under unique names and hand back paths.
// Dependencies: po-compiler-config, po-compiler-core, tempfile
// ============================================================================

//! ## Overview
//! [`TempFileArtifactStore`] writes each compiled table to a fresh file with a
//! random name inside the configured directory. Files are kept after the call
//! returns; cleanup is the caller's responsibility. Two stores of identical
//! bytes always produce two distinct files.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use po_compiler_config::CompilerConfig;
use po_compiler_config::DEFAULT_FILE_PREFIX;
use po_compiler_core::ArtifactLocation;
use po_compiler_core::ArtifactStore;
use po_compiler_core::CompilerService;
use po_compiler_core::StorageError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// File suffix for stored tables.
pub const ARTIFACT_SUFFIX: &str = ".mo";

// ============================================================================
// SECTION: Store
// ============================================================================

/// Artifact store backed by uniquely named files.
#[derive(Debug, Clone)]
pub struct TempFileArtifactStore {
    /// Directory receiving artifacts.
    dir: PathBuf,
    /// File name prefix.
    prefix: String,
}

impl TempFileArtifactStore {
    /// Creates a store writing into `dir` with the given file prefix.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    /// Creates a store from compiler configuration.
    ///
    /// Uses the system temporary directory when no output directory is set.
    #[must_use]
    pub fn from_config(config: &CompilerConfig) -> Self {
        let dir = config
            .output_dir
            .as_deref()
            .map(str::trim)
            .filter(|dir| !dir.is_empty())
            .map_or_else(std::env::temp_dir, PathBuf::from);
        let prefix = match config.file_prefix.trim() {
            "" => DEFAULT_FILE_PREFIX,
            prefix => prefix,
        };
        Self::new(dir, prefix)
    }
}

impl ArtifactStore for TempFileArtifactStore {
    fn store(&self, bytes: &[u8]) -> Result<ArtifactLocation, StorageError> {
        let mut file = tempfile::Builder::new()
            .prefix(&self.prefix)
            .suffix(ARTIFACT_SUFFIX)
            .tempfile_in(&self.dir)
            .map_err(|err| StorageError::Io(err.to_string()))?;
        file.write_all(bytes).map_err(|err| StorageError::Io(err.to_string()))?;
        file.flush().map_err(|err| StorageError::Io(err.to_string()))?;
        file.as_file().sync_all().map_err(|err| StorageError::Io(err.to_string()))?;
        let (_, path) = file.keep().map_err(|err| StorageError::Io(err.error.to_string()))?;
        let path = std::path::absolute(&path).unwrap_or(path);
        Ok(ArtifactLocation {
            path: path.to_string_lossy().into_owned(),
        })
    }
}

/// Builds a compiler service whose limits, fallback mode, and external
/// delivery directory come from configuration.
#[must_use]
pub fn compiler_service_from_config(config: &CompilerConfig) -> CompilerService {
    CompilerService::new()
        .with_store(Arc::new(TempFileArtifactStore::from_config(config)))
        .with_max_input_bytes(config.max_input_bytes)
        .with_default_mode(config.delivery_mode())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions."
    )]

    use std::path::Path;

    use po_compiler_config::CompilerConfig;
    use po_compiler_config::DEFAULT_FILE_PREFIX;
    use po_compiler_core::ArtifactStore;
    use po_compiler_core::StorageError;

    use super::TempFileArtifactStore;

    #[test]
    fn store_writes_distinct_files_with_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = TempFileArtifactStore::new(dir.path(), "catalog-");
        let first = store.store(b"abc").unwrap();
        let second = store.store(b"abc").unwrap();
        assert_ne!(first.path, second.path);
        for location in [&first, &second] {
            let path = Path::new(&location.path);
            assert!(path.is_absolute());
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            assert!(name.starts_with("catalog-"));
            assert!(name.ends_with(".mo"));
            assert_eq!(std::fs::read(path).unwrap(), b"abc");
        }
    }

    #[test]
    fn from_config_trims_prefix_and_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = CompilerConfig {
            output_dir: Some(dir.path().to_string_lossy().into_owned()),
            file_prefix: "  fr- ".to_string(),
            ..CompilerConfig::default()
        };
        let location = TempFileArtifactStore::from_config(&config).store(b"abc").unwrap();
        let name = Path::new(&location.path).file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("fr-"), "name: {name}");

        config.file_prefix = "   ".to_string();
        let location = TempFileArtifactStore::from_config(&config).store(b"abc").unwrap();
        let name = Path::new(&location.path).file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(DEFAULT_FILE_PREFIX), "name: {name}");
    }

    #[test]
    fn missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = TempFileArtifactStore::new(dir.path().join("missing"), "x-");
        assert!(matches!(store.store(b"abc"), Err(StorageError::Io(_))));
    }
}
