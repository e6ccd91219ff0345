//! Output errors

use crate::block_reader::BlockReaderError;
use crate::logging::{codes, Code};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, thiserror::Error)]
pub enum WriterError {
    #[error("Unsupported format version: {version}")]
    UnsupportedVersion { version: String },

    #[error("Line width {width} leaves no room after the continuation indent")]
    WidthTooSmall { width: usize },

    #[error("I/O error writing {path}: {message}")]
    IoError { path: PathBuf, message: String },
}

impl WriterError {
    pub fn io_error(path: &Path, error: &std::io::Error) -> Self {
        Self::IoError {
            path: path.to_path_buf(),
            message: error.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::UnsupportedVersion { .. } => codes::formatting::UNSUPPORTED_VERSION,
            Self::WidthTooSmall { .. } => codes::formatting::VALUE_NOT_FORMATTABLE,
            Self::IoError { .. } => codes::file_processing::IO_ERROR,
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

impl From<BlockReaderError> for WriterError {
    fn from(error: BlockReaderError) -> Self {
        match error {
            BlockReaderError::UnsupportedVersion { version } => Self::UnsupportedVersion { version },
            other => Self::IoError {
                path: PathBuf::new(),
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let error = WriterError::UnsupportedVersion {
            version: "4.0.0".to_string(),
        };
        assert_eq!(error.error_code().as_str(), "E070");

        let missing = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "no");
        let error = WriterError::io_error(Path::new("out.i"), &missing);
        assert_eq!(error.error_code().as_str(), "E011");
        assert!(error.to_string().contains("out.i"));
    }
}
