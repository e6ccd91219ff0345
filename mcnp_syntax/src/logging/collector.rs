//! Error collector with cargo-style output
//!
//! Events are grouped by the input file they were raised for, so READ
//! inclusions report against the included file rather than the root deck.

use super::config;
use super::events::LogEvent;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

// ============================================================================
// FILE PROCESSING CONTEXT
// ============================================================================

/// Context information for file processing
#[derive(Debug, Clone)]
pub struct FileProcessingContext {
    pub file_path: PathBuf,
    pub file_id: usize,
    pub start_time: Instant,
}

impl FileProcessingContext {
    pub fn new(file_path: PathBuf, file_id: usize) -> Self {
        Self {
            file_path,
            file_id,
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

// ============================================================================
// PROCESSING SUMMARY
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ProcessingSummary {
    pub total_files: usize,
    pub failed_files: usize,
    pub files_with_warnings: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub total_processing_time: Duration,
}

impl ProcessingSummary {
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.total_warnings > 0
    }
}

// ============================================================================
// ERROR COLLECTOR
// ============================================================================

/// Thread-safe error collector
pub struct ErrorCollector {
    file_events: Mutex<BTreeMap<PathBuf, Vec<LogEvent>>>,
    file_contexts: Mutex<BTreeMap<PathBuf, FileProcessingContext>>,
    processing_start: Instant,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self {
            file_events: Mutex::new(BTreeMap::new()),
            file_contexts: Mutex::new(BTreeMap::new()),
            processing_start: Instant::now(),
        }
    }

    /// Record an event for a specific file
    pub fn record_event(&self, file_path: &Path, event: LogEvent) {
        let max_events_per_file = config::get_max_log_events_per_file();
        let max_total = config::get_max_error_collection();

        let Ok(mut events) = self.file_events.lock() else {
            return;
        };

        let total: usize = events.values().map(|v| v.len()).sum();
        if total >= max_total {
            return;
        }

        let file_events = events.entry(file_path.to_path_buf()).or_default();

        if file_events.len() < max_events_per_file {
            file_events.push(event);
        } else if file_events.len() == max_events_per_file {
            file_events.push(LogEvent::warning(&format!(
                "Too many events for file (limit: {})",
                max_events_per_file
            )));
        }
    }

    /// Record file processing context
    pub fn record_file_context(&self, context: FileProcessingContext) {
        if let Ok(mut contexts) = self.file_contexts.lock() {
            contexts.insert(context.file_path.clone(), context);
        }
    }

    pub fn get_file_events(&self, file_path: &Path) -> Vec<LogEvent> {
        self.file_events
            .lock()
            .ok()
            .and_then(|events| events.get(file_path).cloned())
            .unwrap_or_default()
    }

    pub fn get_file_errors(&self, file_path: &Path) -> Vec<LogEvent> {
        self.get_file_events(file_path)
            .into_iter()
            .filter(|e| e.is_error())
            .collect()
    }

    pub fn get_all_file_events(&self) -> BTreeMap<PathBuf, Vec<LogEvent>> {
        self.file_events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn file_has_errors(&self, file_path: &Path) -> bool {
        !self.get_file_errors(file_path).is_empty()
    }

    /// Get processing summary
    pub fn get_summary(&self) -> ProcessingSummary {
        let events = self.get_all_file_events();

        let mut summary = ProcessingSummary {
            total_files: events.len(),
            total_processing_time: self.processing_start.elapsed(),
            ..ProcessingSummary::default()
        };

        for file_events in events.values() {
            let errors = file_events.iter().filter(|e| e.is_error()).count();
            let warnings = file_events.iter().filter(|e| e.is_warning()).count();

            if errors > 0 {
                summary.failed_files += 1;
            } else if warnings > 0 {
                summary.files_with_warnings += 1;
            }

            summary.total_errors += errors;
            summary.total_warnings += warnings;
        }

        summary
    }
}

impl Default for ErrorCollector {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// CARGO-STYLE FORMATTING
// ============================================================================

fn span_suffix(file_path: &Path, event: &LogEvent) -> String {
    event
        .span
        .as_ref()
        .map(|s| {
            format!(
                " --> {}:{}:{}",
                file_path.display(),
                s.start().line,
                s.start().column
            )
        })
        .unwrap_or_default()
}

/// Format errors in cargo-style output
pub fn format_cargo_style_errors(collector: &ErrorCollector) -> String {
    let mut output = String::new();

    for (file_path, events) in &collector.get_all_file_events() {
        let error_events: Vec<_> = events.iter().filter(|e| e.is_error()).collect();
        let warning_events: Vec<_> = events.iter().filter(|e| e.is_warning()).collect();

        if error_events.is_empty() && warning_events.is_empty() {
            continue;
        }

        output.push_str(&format!("Checking {}...\n", file_path.display()));

        for event in error_events {
            output.push_str(&format!(
                "error[{}]: {}{}\n",
                event.code.as_str(),
                event.message,
                span_suffix(file_path, event)
            ));
            output.push_str(&format!(
                "  = severity: {}, category: {}\n",
                event.severity(),
                event.category()
            ));
            for (key, value) in &event.context {
                if key != "file" && key != "file_id" {
                    output.push_str(&format!("  = {}: {}\n", key, value));
                }
            }
            let action = event.recommended_action();
            if action != "No specific action available" {
                output.push_str(&format!("  = help: {}\n", action));
            }
        }

        for event in warning_events {
            output.push_str(&format!(
                "warning[{}]: {}{}\n",
                event.code.as_str(),
                event.message,
                span_suffix(file_path, event)
            ));
        }

        output.push('\n');
    }

    let summary = collector.get_summary();
    if summary.total_errors > 0 {
        output.push_str(&format!("Total errors: {}\n", summary.total_errors));
    }
    if summary.total_warnings > 0 {
        output.push_str(&format!("Total warnings: {}\n", summary.total_warnings));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_error_collector_basic() {
        let collector = ErrorCollector::new();
        let file_path = PathBuf::from("deck.i");

        collector.record_event(
            &file_path,
            LogEvent::error(codes::syntax::UNEXPECTED_TOKEN, "Unexpected ':'"),
        );

        assert_eq!(collector.get_file_events(&file_path).len(), 1);
        assert!(collector.file_has_errors(&file_path));
    }

    #[test]
    fn test_processing_summary() {
        let collector = ErrorCollector::new();

        collector.record_event(
            Path::new("root.i"),
            LogEvent::error(codes::lexical::INVALID_NUMBER, "Bad number"),
        );
        collector.record_event(
            Path::new("included.i"),
            LogEvent::warning_with_code(codes::warnings::LINE_OVERRUN, "Truncated"),
        );

        let summary = collector.get_summary();
        assert_eq!(summary.total_files, 2);
        assert_eq!(summary.failed_files, 1);
        assert_eq!(summary.files_with_warnings, 1);
        assert!(summary.has_errors());
        assert!(summary.has_warnings());
    }

    #[test]
    fn test_cargo_style_output() {
        let collector = ErrorCollector::new();
        collector.record_event(
            Path::new("deck.i"),
            LogEvent::error(codes::syntax::DUPLICATE_PARAMETER, "IMP:N given twice")
                .with_context("record", "1 0 -1 imp:n=1 imp:n=1"),
        );

        let output = format_cargo_style_errors(&collector);
        assert!(output.contains("Checking deck.i..."));
        assert!(output.contains("error[E051]: IMP:N given twice"));
        assert!(output.contains("= record: 1 0 -1 imp:n=1 imp:n=1"));
        assert!(output.contains("Total errors: 1"));
    }
}
