use std::io::IsTerminal;

use crate::format::LoggerFormat;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// `EnvFilter` directive, e.g. `info` or `surge_core=debug,info`.
    pub filter: String,
    /// Print the emitting module next to each event.
    pub show_target: bool,
    /// ANSI colors for text output; ignored for JSON.
    pub ansi: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::Text,
            filter: "info".to_string(),
            show_target: true,
            ansi: std::io::stderr().is_terminal(),
        }
    }
}
