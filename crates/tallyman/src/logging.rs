use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log file size that triggers trimming (5 MB)
const MAX_LOG_SIZE: u64 = 5 * 1024 * 1024;
/// Most recent bytes kept after trimming (1 MB)
const KEEP_SIZE: u64 = 1024 * 1024;

/// Trim the log to its last `KEEP_SIZE` bytes once it grows past `MAX_LOG_SIZE`
fn trim_log_if_needed(log_path: &Path) -> std::io::Result<()> {
    let Ok(metadata) = fs::metadata(log_path) else {
        return Ok(());
    };
    if metadata.len() <= MAX_LOG_SIZE {
        return Ok(());
    }

    let mut file = File::open(log_path)?;
    file.seek(SeekFrom::Start(metadata.len().saturating_sub(KEEP_SIZE)))?;
    let mut tail = Vec::new();
    file.read_to_end(&mut tail)?;
    drop(file);

    // Drop the partial first line
    let skip = tail
        .iter()
        .position(|&b| b == b'\n')
        .map_or(0, |i| i + 1);

    let mut file = File::create(log_path)?;
    file.write_all(b"--- Log trimmed (older entries removed) ---\n")?;
    file.write_all(&tail[skip..])?;
    Ok(())
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tallyman={level},tallyman_core=warn")))
}

/// Initialize logging to stderr, or to `log_file` when one is given.
///
/// `RUST_LOG` overrides `level`. The returned guard flushes the file writer
/// on drop and must be held until the program exits.
pub fn init_logging(level: &str, log_file: Option<&Path>) -> color_eyre::Result<Option<WorkerGuard>> {
    let Some(log_path) = log_file else {
        tracing_subscriber::registry()
            .with(env_filter(level))
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .init();
        return Ok(None);
    };

    let dir = match log_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let file_name = log_path
        .file_name()
        .ok_or_else(|| color_eyre::eyre::eyre!("log path {} has no file name", log_path.display()))?;

    if let Err(e) = trim_log_if_needed(log_path) {
        eprintln!("Warning: Failed to trim log file: {e}");
    }

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false),
        )
        .init();

    tracing::info!(log_path = %log_path.display(), "Tallyman logging initialized");
    Ok(Some(guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_log_is_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tallyman.log");
        fs::write(&path, "one\ntwo\n").unwrap();

        trim_log_if_needed(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_missing_log_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        assert!(trim_log_if_needed(&dir.path().join("absent.log")).is_ok());
    }

    #[test]
    fn test_large_log_keeps_recent_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tallyman.log");
        let line = "x".repeat(99) + "\n";
        let lines = (MAX_LOG_SIZE / 100 + 10) as usize;
        fs::write(&path, line.repeat(lines) + "last\n").unwrap();

        trim_log_if_needed(&path).unwrap();
        let trimmed = fs::read_to_string(&path).unwrap();
        assert!(trimmed.starts_with("--- Log trimmed"));
        assert!(trimmed.ends_with("last\n"));
        assert!((trimmed.len() as u64) <= KEEP_SIZE + 64);
    }
}
