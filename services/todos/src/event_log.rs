//! Side-channel event log.
//!
//! Handlers record operational events (requests received, failures) through the
//! [`EventLog`] capability they are handed. Recording never blocks on I/O and
//! never fails from the caller's point of view.

use std::{
    fs::{OpenOptions, create_dir_all},
    io::Write,
    path::{Path, PathBuf},
    sync::mpsc,
    thread::JoinHandle,
};

use chrono::{DateTime, SecondsFormat, Utc};

pub trait EventLog: Send + Sync {
    fn record(&self, message: &str);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledEventLog;

impl EventLog for DisabledEventLog {
    fn record(&self, _message: &str) {}
}

/// Appends `<timestamp> - <message>` lines to a file from a background thread.
///
/// The timestamp is taken when the event is recorded, not when it is written.
/// Dropping the log drains the queue and joins the writer.
pub struct FileEventLog {
    path: PathBuf,
    sender: Option<mpsc::Sender<String>>,
    writer: Option<JoinHandle<()>>,
}

impl FileEventLog {
    pub fn spawn(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let (sender, receiver) = mpsc::channel::<String>();
        let writer_path = path.clone();
        let writer = std::thread::Builder::new()
            .name("todos-event-log".into())
            .spawn(move || {
                for entry in receiver {
                    if let Err(err) = append_entry(&writer_path, &entry) {
                        tracing::error!(
                            path = %writer_path.display(),
                            error = %err,
                            "failed to write event log entry"
                        );
                    }
                }
            })?;
        Ok(Self {
            path,
            sender: Some(sender),
            writer: Some(writer),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventLog for FileEventLog {
    fn record(&self, message: &str) {
        let entry = format_entry(Utc::now(), message);
        let Some(sender) = self.sender.as_ref() else {
            return;
        };
        if sender.send(entry).is_err() {
            tracing::error!(path = %self.path.display(), "event log writer is gone");
        }
    }
}

impl Drop for FileEventLog {
    fn drop(&mut self) {
        drop(self.sender.take());
        if let Some(writer) = self.writer.take()
            && writer.join().is_err()
        {
            tracing::error!(path = %self.path.display(), "event log writer panicked");
        }
    }
}

pub fn format_entry(timestamp: DateTime<Utc>, message: &str) -> String {
    format!(
        "{} - {message}",
        timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

fn append_entry(path: &Path, entry: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{entry}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn entry_uses_iso8601_utc_with_millis() {
        let timestamp = Utc
            .with_ymd_and_hms(2024, 3, 9, 14, 5, 7)
            .single()
            .unwrap();
        assert_eq!(
            format_entry(timestamp, "GET /todos"),
            "2024-03-09T14:05:07.000Z - GET /todos"
        );
    }

    #[test]
    fn file_log_appends_one_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("events.txt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "earlier - entry\n").unwrap();

        let log = FileEventLog::spawn(&path).unwrap();
        log.record("GET /todos");
        log.record("POST /todos");
        drop(log);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "earlier - entry");
        assert!(lines[1].ends_with("Z - GET /todos"));
        assert!(lines[2].ends_with("Z - POST /todos"));
    }

    #[test]
    fn write_failures_stay_inside_the_writer() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let log = FileEventLog::spawn(blocker.join("events.txt")).unwrap();
        log.record("DELETE /todos/1");
        drop(log);

        assert_eq!(std::fs::read_to_string(&blocker).unwrap(), "not a directory");
    }
}
