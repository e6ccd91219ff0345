//! Shared formatting state and the node trait

use super::padding::CommentNode;
use crate::config::constants::format::{ABS_TOL, REL_TOL};
use crate::config::runtime::FormatPreferences;
use crate::utils::numeric::is_close;
use crate::utils::Warning;
use serde::{Deserialize, Serialize};

/// Relative and absolute tolerance for "unchanged" decisions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    pub rel: f64,
    pub abs: f64,
}

impl Tolerance {
    pub fn new(rel: f64, abs: f64) -> Self {
        Self { rel, abs }
    }

    pub fn close(&self, a: f64, b: f64) -> bool {
        is_close(a, b, self.rel, self.abs)
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            rel: REL_TOL,
            abs: ABS_TOL,
        }
    }
}

impl From<&FormatPreferences> for Tolerance {
    fn from(preferences: &FormatPreferences) -> Self {
        Self {
            rel: preferences.rel_tol,
            abs: preferences.abs_tol,
        }
    }
}

/// Carries tolerances into formatting and collects advisory warnings
#[derive(Debug, Clone, Default)]
pub struct FormatContext {
    pub tolerance: Tolerance,
    warnings: Vec<Warning>,
}

impl FormatContext {
    pub fn new(tolerance: Tolerance) -> Self {
        Self {
            tolerance,
            warnings: Vec::new(),
        }
    }

    pub fn warn(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }
}

/// Every node renders its exact placement text and exposes its comments
pub trait SyntaxNode {
    fn format(&self, ctx: &mut FormatContext) -> String;

    fn comments(&self) -> Vec<&CommentNode>;

    /// Format with default tolerances, discarding warnings
    fn to_text(&self) -> String {
        self.format(&mut FormatContext::default())
    }
}
