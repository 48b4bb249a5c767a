//! Tracing subscriber setup: console, log file, remote syslog

use crate::config::{LoggingConfig, SyslogConfig};
use crate::error::{Error, Result};
use std::io::{self, Write};
use std::net::UdpSocket;
use std::path::Path;
use std::sync::Arc;
use tracing::{Level, Metadata};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "tv_post=info";

/// Keeps background log writers alive; drop it last
#[must_use = "dropping the guard stops the file writer"]
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Install the global subscriber
///
/// Console output always goes to stdout. A log file and a syslog receiver
/// are added when configured.
pub fn init_logging(config: &LoggingConfig) -> Result<LogGuard> {
    let mut file_guard = None;
    let file_layer = match &config.log_file {
        Some(path) => {
            let (writer, guard) = file_writer(path)?;
            file_guard = Some(guard);
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_filter(env_filter()),
            )
        }
        None => None,
    };

    let syslog_layer = match &config.syslog {
        Some(syslog) => Some(
            tracing_subscriber::fmt::layer()
                .with_writer(SyslogMakeWriter::connect(syslog)?)
                .with_ansi(false)
                .without_time()
                .with_level(false)
                .with_target(false)
                .with_filter(env_filter()),
        ),
        None => None,
    };

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_filter(env_filter());

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(syslog_layer)
        .try_init()
        .map_err(|e| Error::Other(format!("failed to install log subscriber: {}", e)))?;

    Ok(LogGuard {
        _file_guard: file_guard,
    })
}

/// Append-only, never-rotating file writer on a background thread
fn file_writer(
    path: &Path,
) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let file_name = path.file_name().ok_or_else(|| {
        Error::config(
            format!("log file {} has no file name", path.display()),
            "log_file",
        )
    })?;
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| {
        Error::config(
            format!("failed to create log directory {}: {}", dir.display(), e),
            "log_file",
        )
    })?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}

/// Sends each formatted event as an RFC 3164 datagram
#[derive(Clone, Debug)]
pub struct SyslogMakeWriter {
    socket: Arc<UdpSocket>,
    hostname: Arc<str>,
    tag: Arc<str>,
}

impl SyslogMakeWriter {
    /// Bind an ephemeral UDP socket and connect it to the receiver
    pub fn connect(config: &SyslogConfig) -> Result<Self> {
        let socket = UdpSocket::bind(("0.0.0.0", 0))
            .and_then(|socket| socket.connect(config.address.as_str()).map(|()| socket))
            .map_err(|e| {
                Error::config(
                    format!("cannot reach syslog receiver {}: {}", config.address, e),
                    "syslog.address",
                )
            })?;
        Ok(Self {
            socket: Arc::new(socket),
            hostname: config.hostname.as_str().into(),
            tag: config.tag.as_str().into(),
        })
    }

    fn writer(&self, severity: u8) -> SyslogWriter {
        SyslogWriter {
            socket: Arc::clone(&self.socket),
            hostname: Arc::clone(&self.hostname),
            tag: Arc::clone(&self.tag),
            severity,
        }
    }
}

/// Syslog severity for a tracing level
fn severity(level: &Level) -> u8 {
    match *level {
        Level::ERROR => 3,
        Level::WARN => 4,
        Level::INFO => 6,
        _ => 7,
    }
}

/// Facility "user"
const FACILITY_USER: u8 = 1;

impl<'a> MakeWriter<'a> for SyslogMakeWriter {
    type Writer = SyslogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.writer(severity(&Level::INFO))
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        self.writer(severity(meta.level()))
    }
}

/// One-shot writer handed out per event
pub struct SyslogWriter {
    socket: Arc<UdpSocket>,
    hostname: Arc<str>,
    tag: Arc<str>,
    severity: u8,
}

impl SyslogWriter {
    fn format(&self, message: &str) -> String {
        format!(
            "<{}>{} {} {}: {}",
            FACILITY_USER * 8 + self.severity,
            chrono::Local::now().format("%b %e %H:%M:%S"),
            self.hostname,
            self.tag,
            message.trim_end()
        )
    }
}

impl Write for SyslogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let message = String::from_utf8_lossy(buf);
        if !message.trim().is_empty() {
            self.socket.send(self.format(&message).as_bytes())?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
