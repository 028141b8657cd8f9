use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::{Error, Result};

pub const DEFAULT_LOG_FILE: &str = "logs/pipeline.log";

/// Modules kept at `warn` so HTTP client chatter stays out of the run log.
const NOISY_MODULES: &[&str] = &["hyper", "reqwest", "h2", "rustls", "tower_http"];

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: String,
    /// `None` logs to the console only.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: Some(PathBuf::from(DEFAULT_LOG_FILE)),
        }
    }
}

/// Keeps the log file open for the lifetime of a run and flushes it to disk
/// when dropped.
#[derive(Debug)]
pub struct LogGuard {
    file: Option<Arc<File>>,
}

impl LogGuard {
    pub fn flush(&self) -> Result<()> {
        if let Some(file) = &self.file {
            let mut handle: &File = file;
            handle.flush()?;
            handle.sync_all()?;
        }
        Ok(())
    }
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            eprintln!("Failed to flush log file: {}", e);
        }
    }
}

fn build_filter(level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let mut directives = String::from(level);
    for module in NOISY_MODULES {
        directives.push_str(&format!(",{}=warn", module));
    }
    EnvFilter::new(directives)
}

fn open_log_file(path: &PathBuf) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Installs the process-wide subscriber: console output plus an append-only
/// log file. Must be called once per process.
pub fn init_logging(config: &LogConfig) -> Result<LogGuard> {
    let file = config.file.as_ref().map(open_log_file).transpose()?.map(Arc::new);

    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);
    let file_layer = file.clone().map(|file| {
        tracing_subscriber::fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(build_filter(&config.level))
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Config(format!("logging already initialized: {}", e)))?;

    Ok(LogGuard { file })
}

/// Prefix-carrying handle passed down the pipeline so every line names the
/// article it belongs to.
#[derive(Debug, Clone, Default)]
pub struct Logger {
    prefixes: VecDeque<String>,
}

impl Logger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(&self, prefix: impl Into<String>) -> Self {
        let mut logger = self.clone();
        logger.prefixes.push_back(prefix.into());
        logger
    }

    fn prefix(&self) -> String {
        self.prefixes.iter().map(|p| format!("{} ", p)).collect()
    }

    pub fn info(&self, message: &str) {
        tracing::info!("{}{}", self.prefix(), message);
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!("{}{}", self.prefix(), message);
    }

    pub fn error(&self, message: &str) {
        tracing::error!("{}{}", self.prefix(), message);
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!("{}{}", self.prefix(), message);
    }
}
