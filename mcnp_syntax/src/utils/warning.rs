//! Non-fatal diagnostics returned alongside results
//!
//! Every warning is also routed through the global logger when it is
//! created, so callers that ignore the returned list still see it.

use crate::logging::Code;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warning {
    pub code: Code,
    pub message: String,
    pub path: Option<PathBuf>,
    pub line: Option<u32>,
}

impl Warning {
    /// Create and log a warning
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        let warning = Self {
            code,
            message: message.into(),
            path: None,
            line: None,
        };
        crate::log_warning!(code, &warning.message);
        warning
    }

    pub fn at(mut self, path: &Path, line: u32) -> Self {
        self.path = Some(path.to_path_buf());
        self.line = Some(line);
        self
    }

    pub fn at_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "warning[{}]: {}", self.code.as_str(), self.message)?;
        match (&self.path, self.line) {
            (Some(path), Some(line)) => write!(f, " --> {}:{}", path.display(), line),
            (None, Some(line)) => write!(f, " --> line {}", line),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_warning_display_with_location() {
        let warning =
            Warning::new(codes::warnings::LINE_OVERRUN, "Line truncated").at(Path::new("deck.i"), 12);
        assert_eq!(
            warning.to_string(),
            "warning[W011]: Line truncated --> deck.i:12"
        );
    }
}
