use std::sync::{Arc, Mutex};
use inline_colorization::{color_red, color_green, color_yellow, color_reset};

/// Trait for handling output from inventory operations.
/// Everything here goes to stderr; stdout is reserved for the inventory document.
pub trait OutputHandler: Send + Sync {
    fn on_parse_start(&self, source_path: &str);
    fn on_fetch_start(&self, url: &str);
    fn on_fetch_complete(&self, record_count: usize);
    fn on_record_skipped(&self, index: usize, reason: &str);
    fn on_parse_end(&self, summary: &ParseSummary);

    fn log(&self, level: LogLevel, message: &str);
    fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }
    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }
    fn warning(&self, message: &str) {
        self.log(LogLevel::Warning, message);
    }
    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// Counters reported at the end of a parse
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseSummary {
    pub records: usize,
    pub hosts: usize,
    pub groups: usize,
    pub skipped: usize,
}

/// A no-op output handler for when output is not needed
pub struct NullOutputHandler;

impl OutputHandler for NullOutputHandler {
    fn on_parse_start(&self, _source_path: &str) {}
    fn on_fetch_start(&self, _url: &str) {}
    fn on_fetch_complete(&self, _record_count: usize) {}
    fn on_record_skipped(&self, _index: usize, _reason: &str) {}
    fn on_parse_end(&self, _summary: &ParseSummary) {}
    fn log(&self, _level: LogLevel, _message: &str) {}
}

/// Terminal output handler, verbosity gated
pub struct TerminalOutputHandler {
    pub verbosity: u32,
}

impl TerminalOutputHandler {
    pub fn new(verbosity: u32) -> Self {
        Self { verbosity }
    }
}

impl OutputHandler for TerminalOutputHandler {
    fn on_parse_start(&self, source_path: &str) {
        if self.verbosity >= 1 {
            eprintln!("{color_green}PARSE{color_reset} => {}", source_path);
        }
    }

    fn on_fetch_start(&self, url: &str) {
        if self.verbosity >= 2 {
            eprintln!("{color_green}GET{color_reset} => {}", url);
        }
    }

    fn on_fetch_complete(&self, record_count: usize) {
        self.info(&format!("received {} machine records", record_count));
    }

    fn on_record_skipped(&self, index: usize, reason: &str) {
        eprintln!("{color_yellow}SKIPPED{color_reset} => record {}: {}", index, reason);
    }

    fn on_parse_end(&self, summary: &ParseSummary) {
        if self.verbosity >= 1 {
            eprintln!("records={} hosts={} groups={} skipped={}",
                summary.records,
                summary.hosts,
                summary.groups,
                summary.skipped
            );
        }
    }

    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug if self.verbosity >= 3 => eprintln!("DEBUG: {}", message),
            LogLevel::Info if self.verbosity >= 1 => eprintln!("INFO: {}", message),
            LogLevel::Warning => eprintln!("{color_yellow}WARNING{color_reset}: {}", message),
            LogLevel::Error => eprintln!("{color_red}ERROR{color_reset}: {}", message),
            _ => {}
        }
    }
}

/// Records every message, used by tests and by library callers that want to
/// inspect what happened during a parse.
#[derive(Default)]
pub struct CaptureOutputHandler {
    messages: Mutex<Vec<(LogLevel, String)>>,
}

impl CaptureOutputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(LogLevel, String)> {
        match self.messages.lock() {
            Ok(m) => m.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.messages().into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }

    fn push(&self, level: LogLevel, message: String) {
        match self.messages.lock() {
            Ok(mut m) => m.push((level, message)),
            Err(poisoned) => poisoned.into_inner().push((level, message)),
        }
    }
}

impl OutputHandler for CaptureOutputHandler {
    fn on_parse_start(&self, source_path: &str) {
        self.push(LogLevel::Debug, format!("parse {}", source_path));
    }
    fn on_fetch_start(&self, url: &str) {
        self.push(LogLevel::Debug, format!("GET {}", url));
    }
    fn on_fetch_complete(&self, record_count: usize) {
        self.push(LogLevel::Info, format!("received {} machine records", record_count));
    }
    fn on_record_skipped(&self, index: usize, reason: &str) {
        self.push(LogLevel::Warning, format!("record {}: {}", index, reason));
    }
    fn on_parse_end(&self, summary: &ParseSummary) {
        self.push(LogLevel::Info, format!("hosts={} skipped={}", summary.hosts, summary.skipped));
    }
    fn log(&self, level: LogLevel, message: &str) {
        self.push(level, message.to_string());
    }
}

/// Thread-safe wrapper for output handlers
pub type OutputHandlerRef = Arc<dyn OutputHandler>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_records_levels() {
        let capture = CaptureOutputHandler::new();
        capture.warning("careful");
        capture.debug("details");
        capture.on_record_skipped(3, "missing Name");

        let warnings = capture.messages_at(LogLevel::Warning);
        assert_eq!(warnings, vec!["careful".to_string(), "record 3: missing Name".to_string()]);
        assert_eq!(capture.messages_at(LogLevel::Debug), vec!["details".to_string()]);
    }

    #[test]
    fn test_terminal_handler_does_not_panic() {
        let handler = TerminalOutputHandler::new(3);
        handler.on_parse_start("/tmp/site.rackn.yml");
        handler.on_fetch_start("https://drp:8092/api/v3/machines");
        handler.on_fetch_complete(2);
        handler.on_parse_end(&ParseSummary::default());
        handler.log(LogLevel::Debug, "debug line");
    }
}
