//! Append-only wire log for HTTP traffic.
//!
//! Every request/response the client sends is mirrored here in redacted
//! form, one timestamped line each. The log rotates once it crosses a size
//! threshold, keeping a single `<name>.1` predecessor. Logging is
//! best-effort throughout: a failed write never disturbs the request path.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::debug;

/// Default wire log filename, relative to the working directory.
pub const DEFAULT_HTTP_LOG: &str = "anycloud_http.log";

const ROTATE_BYTES: u64 = 5 * 1024 * 1024;

pub struct HttpLog {
    path: PathBuf,
    max_bytes: u64,
}

impl HttpLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_bytes: ROTATE_BYTES,
        }
    }

    #[cfg(test)]
    fn with_max_bytes(path: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self {
            path: path.into(),
            max_bytes,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one timestamped line, rotating first if the file has grown
    /// past the threshold.
    pub fn append(&self, line: &str) {
        self.rotate_if_needed();

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| writeln!(file, "[{timestamp}] {}", line.trim_end_matches('\n')));

        if let Err(e) = result {
            debug!(path = %self.path.display(), error = %e, "Wire log write failed");
        }
    }

    fn rotate_if_needed(&self) {
        let Ok(meta) = fs::metadata(&self.path) else {
            return;
        };
        if meta.len() < self.max_bytes {
            return;
        }

        let mut rotated = self.path.clone().into_os_string();
        rotated.push(".1");
        if let Err(e) = fs::rename(&self.path, PathBuf::from(rotated)) {
            debug!(path = %self.path.display(), error = %e, "Wire log rotation failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_writes_timestamped_lines() {
        let dir = tempfile::tempdir().unwrap();
        let log = HttpLog::new(dir.path().join("http.log"));
        log.append("GET /a status=200");
        log.append("POST /b status=200\n");

        let contents = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("GET /a status=200"));
        assert!(lines[1].ends_with("POST /b status=200"));
    }

    #[test]
    fn test_rotation_keeps_one_predecessor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("http.log");
        let log = HttpLog::with_max_bytes(&path, 64);

        for i in 0..8 {
            log.append(&format!("line {i} padding padding padding padding"));
        }

        let rotated = dir.path().join("http.log.1");
        assert!(rotated.is_file());
        assert!(path.is_file());
        // Only one generation is kept.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_append_to_unwritable_path_is_silent() {
        let log = HttpLog::new("/nonexistent-dir/sub/http.log");
        log.append("dropped");
    }
}
