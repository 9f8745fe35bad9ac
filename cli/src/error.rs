use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::log;

const DEFAULT_ERROR_LOG: &str = "logs/error.log";

/// Append-only error log.
///
/// Fatal events terminate the process with status 1 once they are written.
#[derive(Debug, Clone)]
pub struct ErrorLog {
    path: PathBuf,
}

impl Default for ErrorLog {
    fn default() -> Self {
        Self::new(DEFAULT_ERROR_LOG)
    }
}

impl ErrorLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Logs the event and, when `fatal`, exits the process.
    pub fn handle(&self, err: Option<&anyhow::Error>, message: &str, fatal: bool) {
        let entry = format_entry(&Local::now().format("%Y-%m-%d %H:%M:%S: ").to_string(), err, message, fatal);
        log::print_error(&entry);

        if let Err(e) = self.append(&entry) {
            log::print_warning(&format!("Could not write to {}: {}", self.path.display(), e));
        }

        if fatal {
            std::process::exit(1);
        }
    }

    pub fn fatal(&self, err: &anyhow::Error, message: &str) -> ! {
        self.handle(Some(err), message, true);
        unreachable!("fatal errors exit the process")
    }

    fn append(&self, entry: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{entry}")
    }
}

fn format_entry(timestamp: &str, err: Option<&anyhow::Error>, message: &str, fatal: bool) -> String {
    match err {
        None => format!("{timestamp}\nfatal:{fatal} | {message}"),
        Some(err) => {
            let mut entry = format!("{timestamp}\nfatal:{fatal} | {message} - {err}");
            let causes: Vec<String> = err.chain().skip(1).map(|cause| cause.to_string()).collect();
            if !causes.is_empty() {
                entry.push_str("\n\nCaused by:");
                for cause in causes {
                    entry.push_str(&format!("\n    {cause}"));
                }
            }
            entry
        }
    }
}
