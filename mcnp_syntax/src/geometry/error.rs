//! Half-space errors

use crate::logging::{codes, Code};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("Cannot compare {left} with {right}")]
    TypeMismatch { left: String, right: String },

    #[error("Illegal geometry state: {message}")]
    IllegalState { message: String },

    #[error("Geometry entry {id} does not exist")]
    UnknownNode { id: usize },
}

impl GeometryError {
    pub fn type_mismatch(left: &str, right: &str) -> Self {
        Self::TypeMismatch {
            left: left.to_string(),
            right: right.to_string(),
        }
    }

    pub fn illegal_state(message: &str) -> Self {
        Self::IllegalState {
            message: message.to_string(),
        }
    }

    pub fn unknown_node(id: usize) -> Self {
        Self::UnknownNode { id }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::TypeMismatch { .. } => codes::geometry::TYPE_MISMATCH,
            Self::IllegalState { .. } => codes::geometry::ILLEGAL_STATE,
            Self::UnknownNode { .. } => codes::geometry::UNKNOWN_NODE,
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

    pub fn description(&self) -> &'static str {
        codes::get_description(self.error_code().as_str())
    }

    pub fn recommended_action(&self) -> &'static str {
        codes::get_action(self.error_code().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        let mismatch = GeometryError::type_mismatch("unit", "branch");
        assert_eq!(mismatch.error_code().as_str(), "E060");
        assert!(mismatch.is_recoverable());
        assert!(!GeometryError::unknown_node(4).is_recoverable());
        assert_eq!(
            GeometryError::illegal_state("dangling").to_string(),
            "Illegal geometry state: dangling"
        );
    }
}
