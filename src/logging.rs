// File: ./src/logging.rs
use anyhow::Result;
use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config as LogConfig, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::File;
use std::path::Path;

/// Initializes the global logger: terminal output always, plus a log file
/// when a path is given. Call once, early; a second call fails.
pub fn init(level: LevelFilter, log_file: Option<&Path>) -> Result<()> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        LogConfig::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];

    if let Some(path) = log_file {
        loggers.push(WriteLogger::new(level, LogConfig::default(), File::create(path)?));
    }

    CombinedLogger::init(loggers)?;
    Ok(())
}
