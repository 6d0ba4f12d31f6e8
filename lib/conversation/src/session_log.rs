//! Per-conversation log files.
//!
//! Every call to [`SessionLogger::open`] starts a fresh sink whose file is
//! named after the label, the session id, and the time it was opened. Lines
//! are also mirrored to `tracing` so they show up in the process log.
//!
//! Session ids come from clients. Only `[A-Za-z0-9_-]` reaches the file name;
//! anything else is replaced with `_`, so every file lands directly in the
//! log directory.

use chrono::{DateTime, Local};
use std::io::Write;
use std::path::PathBuf;
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

/// Label used when nothing is known about the user.
pub const ANONYMOUS_USER: &str = "anonymous_user";

/// Opens session log sinks under one directory.
#[derive(Debug, Clone)]
pub struct SessionLogger {
    dir: PathBuf,
    label: String,
}

impl SessionLogger {
    /// Creates a logger writing into `dir` with the given user label.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, label: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            label: label.into(),
        }
    }

    /// Returns the file stem for a session opened at `opened_at`.
    #[must_use]
    pub fn file_stem(&self, session_id: &str, opened_at: DateTime<Local>) -> String {
        format!(
            "{}_{}_{}",
            file_safe(&self.label),
            file_safe(session_id),
            opened_at.format("%Y%m%d_%H%M%S")
        )
    }

    /// Opens a new sink for `session_id`.
    ///
    /// If the file cannot be created the sink still mirrors to `tracing`.
    #[must_use]
    pub fn open(&self, session_id: &str) -> SessionLog {
        let stem = self.file_stem(session_id, Local::now());
        let writer = RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(&stem)
            .filename_suffix("log")
            .build(&self.dir);

        let writer = match writer {
            Ok(writer) => Some(writer),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    dir = %self.dir.display(),
                    session = %session_id,
                    "Failed to open session log file"
                );
                None
            }
        };

        SessionLog {
            session: session_id.to_string(),
            writer,
        }
    }
}

fn file_safe(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// An append-only sink for one conversation.
pub struct SessionLog {
    session: String,
    writer: Option<RollingFileAppender>,
}

impl SessionLog {
    pub fn info(&mut self, message: impl AsRef<str>) {
        self.write(Level::INFO, message.as_ref());
    }

    pub fn warn(&mut self, message: impl AsRef<str>) {
        self.write(Level::WARN, message.as_ref());
    }

    fn write(&mut self, level: Level, message: &str) {
        if level == Level::WARN {
            tracing::warn!(session = %self.session, "{message}");
        } else {
            tracing::info!(session = %self.session, "{message}");
        }

        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        let line = format!(
            "{} - {} - {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
            level,
            message
        );
        let written = writer
            .write_all(line.as_bytes())
            .and_then(|()| writer.flush());
        if let Err(e) = written {
            tracing::warn!(error = %e, session = %self.session, "Failed to write session log");
            self.writer = None;
        }
    }
}
