use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::writer::MakeWriterExt as _;

pub const LOG_DIR: &str = "logs";
pub const LOG_FILE_SUFFIX: &str = "listing_books.log";

/// Log sink for one run: console (stderr) plus an optional timestamped file.
///
/// The subscriber is never installed globally. Work that should be logged
/// runs inside [`RunLog::in_scope`]; the file handle is released when the
/// `RunLog` is dropped.
pub struct RunLog {
    dispatch: tracing::Dispatch,
    path: Option<PathBuf>,
}

impl RunLog {
    /// Opens `<dir>/<YYYYMMDDHHMMSS>_listing_books.log` and tees every line to stderr.
    pub fn init(dir: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create log dir: {}", dir.display()))?;

        let path = dir.join(log_file_name(chrono::Local::now()));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("open log file: {}", path.display()))?;

        let dispatch = build_dispatch(std::io::stderr.and(Arc::new(file)))?;
        Ok(Self {
            dispatch,
            path: Some(path),
        })
    }

    /// Same formatting as [`RunLog::init`], written to an arbitrary sink.
    pub fn from_writer<W>(make_writer: W) -> anyhow::Result<Self>
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        Ok(Self {
            dispatch: build_dispatch(make_writer)?,
            path: None,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}

fn build_dispatch<W>(make_writer: W) -> anyhow::Result<tracing::Dispatch>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = tracing_subscriber::EnvFilter::try_new("info").context("build log filter")?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(make_writer)
        .finish();

    Ok(tracing::Dispatch::new(subscriber))
}

fn log_file_name<Tz>(now: chrono::DateTime<Tz>) -> String
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("{}_{LOG_FILE_SUFFIX}", now.format("%Y%m%d%H%M%S"))
}
