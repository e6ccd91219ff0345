//! Block reader errors

use crate::logging::{codes, Code};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, thiserror::Error)]
pub enum BlockReaderError {
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("File too large: {size} bytes (max: {max_size})")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("Input is empty: {path}")]
    EmptyFile { path: PathBuf },

    #[error("Invalid encoding in {path}: {message}")]
    InvalidEncoding { path: PathBuf, message: String },

    #[error("I/O error reading {path}: {message}")]
    IoError { path: PathBuf, message: String },

    #[error("READ inclusion nested deeper than {max_depth} files at {path}")]
    IncludeTooDeep { path: PathBuf, max_depth: usize },

    #[error("Unsupported feature at {path}:{line}: {message}")]
    UnsupportedFeature {
        path: PathBuf,
        line: u32,
        message: String,
    },

    #[error("Unsupported format version: {version}")]
    UnsupportedVersion { version: String },
}

impl BlockReaderError {
    pub fn file_not_found(path: &Path) -> Self {
        Self::FileNotFound {
            path: path.to_path_buf(),
        }
    }

    pub fn io_error(path: &Path, error: &std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::file_not_found(path),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => Self::IoError {
                path: path.to_path_buf(),
                message: error.to_string(),
            },
        }
    }

    pub fn vertical_format(path: &Path, line: u32) -> Self {
        Self::UnsupportedFeature {
            path: path.to_path_buf(),
            line,
            message: "Vertical input format is not allowed".to_string(),
        }
    }

    pub fn unsupported_version(version: &str) -> Self {
        Self::UnsupportedVersion {
            version: version.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::FileNotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            Self::PermissionDenied { .. } => codes::file_processing::PERMISSION_DENIED,
            Self::FileTooLarge { .. } => codes::file_processing::FILE_TOO_LARGE,
            Self::EmptyFile { .. } => codes::file_processing::EMPTY_FILE,
            Self::InvalidEncoding { .. } => codes::file_processing::INVALID_ENCODING,
            Self::IoError { .. } => codes::file_processing::IO_ERROR,
            Self::IncludeTooDeep { .. } => codes::file_processing::INCLUDE_TOO_DEEP,
            Self::UnsupportedFeature { .. } => codes::syntax::UNSUPPORTED_FEATURE,
            Self::UnsupportedVersion { .. } => codes::formatting::UNSUPPORTED_VERSION,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_mapping() {
        let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let error = BlockReaderError::io_error(Path::new("deck.i"), &missing);
        assert_eq!(error.error_code().as_str(), "E005");

        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "no");
        let error = BlockReaderError::io_error(Path::new("deck.i"), &denied);
        assert_eq!(error.error_code().as_str(), "E009");
    }

    #[test]
    fn test_vertical_format_halts() {
        let error = BlockReaderError::vertical_format(Path::new("deck.i"), 4);
        assert!(error.requires_halt());
        assert!(!error.is_recoverable());
        assert!(error.to_string().contains("deck.i:4"));
    }
}
