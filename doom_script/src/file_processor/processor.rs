//! Script file loading bounded by the compile-time size limit

use crate::config::compile_time::file_processing::MAX_FILE_SIZE;
use crate::logging::codes;
use crate::{log_debug, log_error, log_success};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileProcessorError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("File too large: {size} bytes (max: {max_size})")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("Invalid UTF-8 encoding in file: {path}")]
    InvalidEncoding { path: String },

    #[error("I/O error reading file: {message}")]
    IoError { message: String },

    #[error("Invalid file path: {path}")]
    InvalidPath { path: String },
}

impl FileProcessorError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            FileProcessorError::FileNotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            FileProcessorError::FileTooLarge { .. } => codes::file_processing::FILE_TOO_LARGE,
            FileProcessorError::PermissionDenied { .. } => {
                codes::file_processing::PERMISSION_DENIED
            }
            FileProcessorError::InvalidEncoding { .. } => codes::file_processing::INVALID_ENCODING,
            FileProcessorError::IoError { .. } => codes::file_processing::IO_ERROR,
            FileProcessorError::InvalidPath { .. } => codes::file_processing::INVALID_PATH,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    fn from_io(error: std::io::Error, path: &Path) -> Self {
        let path = path.display().to_string();
        match error.kind() {
            std::io::ErrorKind::NotFound => FileProcessorError::FileNotFound { path },
            std::io::ErrorKind::PermissionDenied => FileProcessorError::PermissionDenied { path },
            std::io::ErrorKind::InvalidData => FileProcessorError::InvalidEncoding { path },
            _ => FileProcessorError::IoError {
                message: format!("Failed to read '{}': {}", path, error),
            },
        }
    }
}

/// A loaded script: where it came from and its full text
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub size: u64,
    pub line_count: usize,
    pub text: String,
}

impl SourceFile {
    /// Stream name used in diagnostics
    pub fn stream_name(&self) -> String {
        self.path.display().to_string()
    }

    pub fn is_effectively_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FileProcessor {
    canonicalize_paths: bool,
}

impl FileProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report files by canonical path instead of the path given
    pub fn with_canonical_paths(mut self, enabled: bool) -> Self {
        self.canonicalize_paths = enabled;
        self
    }

    pub fn max_file_size() -> u64 {
        MAX_FILE_SIZE
    }

    pub fn read_source(&self, path: &Path) -> Result<SourceFile, FileProcessorError> {
        log_debug!("Reading script file", "path" => path.display());

        let path = self.validate_path(path)?;

        let size = match fs::metadata(&path) {
            Ok(metadata) => metadata.len(),
            Err(e) => return Err(Self::report(FileProcessorError::from_io(e, &path))),
        };
        if size > MAX_FILE_SIZE {
            return Err(Self::report(FileProcessorError::FileTooLarge {
                size,
                max_size: MAX_FILE_SIZE,
            }));
        }

        let text = fs::read_to_string(&path)
            .map_err(|e| Self::report(FileProcessorError::from_io(e, &path)))?;
        let line_count = text.lines().count();

        log_success!(codes::success::FILE_PROCESSING_SUCCESS, "Script file read",
            "path" => path.display(),
            "bytes" => size,
            "lines" => line_count
        );

        Ok(SourceFile {
            path,
            size,
            line_count,
            text,
        })
    }

    fn validate_path(&self, path: &Path) -> Result<PathBuf, FileProcessorError> {
        if path.as_os_str().is_empty() {
            return Err(Self::report(FileProcessorError::InvalidPath {
                path: String::new(),
            }));
        }
        if !path.exists() {
            return Err(Self::report(FileProcessorError::FileNotFound {
                path: path.display().to_string(),
            }));
        }
        if !path.is_file() {
            return Err(Self::report(FileProcessorError::InvalidPath {
                path: path.display().to_string(),
            }));
        }
        if self.canonicalize_paths {
            return path
                .canonicalize()
                .map_err(|e| Self::report(FileProcessorError::from_io(e, path)));
        }
        Ok(path.to_path_buf())
    }

    fn report(error: FileProcessorError) -> FileProcessorError {
        log_error!(error.error_code(), &error.to_string());
        error
    }
}

/// Read a script with default settings
pub fn read_source(path: &Path) -> Result<SourceFile, FileProcessorError> {
    FileProcessor::new().read_source(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn test_read_valid_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("patch.dh");
        let content = "using boom\nthing 1 {}\n";
        fs::write(&file_path, content).unwrap();

        let source = read_source(&file_path).unwrap();
        assert_eq!(source.line_count, 2);
        assert_eq!(source.size, content.len() as u64);
        assert_eq!(source.text, content);
        assert!(!source.is_effectively_empty());
        assert!(source.stream_name().ends_with("patch.dh"));
    }

    #[test]
    fn test_file_not_found() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.dh");
        assert_matches!(
            read_source(&missing),
            Err(FileProcessorError::FileNotFound { .. })
        );
    }

    #[test]
    fn test_directory_is_invalid_path() {
        let dir = tempdir().unwrap();
        assert_matches!(
            read_source(dir.path()),
            Err(FileProcessorError::InvalidPath { .. })
        );
        assert_matches!(
            read_source(Path::new("")),
            Err(FileProcessorError::InvalidPath { .. })
        );
    }

    #[test]
    fn test_file_size_limit() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("large.dh");
        fs::write(&file_path, "a".repeat((MAX_FILE_SIZE + 1) as usize)).unwrap();

        match read_source(&file_path) {
            Err(FileProcessorError::FileTooLarge { size, max_size }) => {
                assert!(size > MAX_FILE_SIZE);
                assert_eq!(max_size, MAX_FILE_SIZE);
            }
            other => panic!("Expected FileTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_utf8_is_reported() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("binary.dh");
        fs::write(&file_path, [0xffu8, 0xfe, 0x00]).unwrap();
        assert_matches!(
            read_source(&file_path),
            Err(FileProcessorError::InvalidEncoding { .. })
        );
    }

    #[test]
    fn test_canonical_paths() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("x.dh");
        fs::write(&file_path, "").unwrap();
        let source = FileProcessor::new()
            .with_canonical_paths(true)
            .read_source(&file_path)
            .unwrap();
        assert!(source.path.is_absolute());
        assert!(source.is_effectively_empty());
    }

    #[test]
    fn test_error_codes() {
        let error = FileProcessorError::FileNotFound { path: "x".into() };
        assert_eq!(error.error_code(), codes::file_processing::FILE_NOT_FOUND);
        assert_eq!(FileProcessor::max_file_size(), MAX_FILE_SIZE);
    }
}
