use indicatif::MultiProgress;
use log::{Log, Metadata, Record};

use crate::cli::LogLevel;

/// Routes log records around the progress display: bars are hidden while a
/// record is written and redrawn afterwards, so spinner frames and log lines
/// never share a terminal row.
pub struct ProgressLogger {
    inner: env_logger::Logger,
    progress: MultiProgress,
}

impl ProgressLogger {
    pub fn new(inner: env_logger::Logger, progress: MultiProgress) -> Self {
        Self { inner, progress }
    }
}

impl Log for ProgressLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if self.inner.matches(record) {
            self.progress.suspend(|| self.inner.log(record));
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

pub fn init(log_level: LogLevel, progress: &MultiProgress) -> Result<(), log::SetLoggerError> {
    let inner = env_logger::Builder::from_default_env()
        .filter_level(log_level.into())
        .format_timestamp_secs()
        .build();
    let max_level = inner.filter();

    log::set_boxed_logger(Box::new(ProgressLogger::new(inner, progress.clone())))?;
    log::set_max_level(max_level);
    Ok(())
}
