use std::fs::{self, File, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use tracing::Subscriber;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "lugia=info,lugia_core=info";

/// Log to `<data dir>/lugia/lugia.log`; the terminal belongs to the UI.
/// `RUST_LOG` overrides the default filter.
pub fn configure_logging() -> Result<PathBuf> {
    let log_dir = dirs::data_dir()
        .ok_or_else(|| anyhow!("Could not determine data directory"))?
        .join("lugia");
    fs::create_dir_all(&log_dir)?;

    let log_path = log_dir.join("lugia.log");
    let file = OpenOptions::new().create(true).append(true).open(&log_path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing::subscriber::set_global_default(file_subscriber(file, filter))?;

    Ok(log_path)
}

fn file_subscriber(file: File, filter: EnvFilter) -> impl Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .compact()
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
        .with_env_filter(filter)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_records_are_plain_and_timestamped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lugia.log");
        let file = File::create(&path).unwrap();
        let subscriber = file_subscriber(file, EnvFilter::new(DEFAULT_FILTER));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "lugia", conversation = "a.json", "switched conversation");
            tracing::debug!(target: "lugia", "filtered out");
            tracing::info!(target: "hyper", "other crates stay quiet");
        });

        let log = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with(|c: char| c.is_ascii_digit()));
        assert!(lines[0].contains("INFO"));
        assert!(lines[0].contains("switched conversation"));
        assert!(!lines[0].contains('\u{1b}'));
    }
}
