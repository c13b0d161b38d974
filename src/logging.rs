use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "MASTORADAR_LOG";
const LOG_FILE_PREFIX: &str = "mastoradar.log";

/// Installs the global subscriber writing to a daily file under `dir`.
///
/// The terminal belongs to the UI, so nothing is written to stdout. Keep the
/// returned guard alive for the life of the process or buffered lines are lost.
pub fn init(dir: &Path, verbose: bool) -> Result<WorkerGuard> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(filter(verbose))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to install log subscriber")?;

    if verbose {
        eprintln!("{}", log_location(dir));
    }
    Ok(guard)
}

/// Where log lines go. The daily appender appends the date to each file name.
fn log_location(dir: &Path) -> String {
    format!(
        "mastoradar logs: {} ({LOG_FILE_PREFIX}.YYYY-MM-DD)",
        dir.display()
    )
}

fn filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

fn default_directive(verbose: bool) -> &'static str {
    // reqwest and hyper are noisy at debug.
    if verbose {
        "debug,hyper_util=warn,hyper=warn,reqwest=warn"
    } else {
        "info"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_raises_level_but_quiets_http_internals() {
        assert_eq!(default_directive(false), "info");
        let verbose = default_directive(true);
        assert!(verbose.starts_with("debug"));
        assert!(verbose.contains("hyper=warn"));
    }

    #[test]
    fn log_location_names_directory_and_dated_files() {
        let dir = Path::new("/tmp/mastoradar/logs");
        let message = log_location(dir);
        assert!(message.contains("/tmp/mastoradar/logs "));
        assert!(message.contains("mastoradar.log.YYYY-MM-DD"));
        assert!(!message.contains("logs/mastoradar.log"));
    }

    #[test]
    fn daily_appender_writes_dated_file_in_directory() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut writer = tracing_appender::rolling::daily(temp.path(), LOG_FILE_PREFIX);
        std::io::Write::write_all(&mut writer, b"line\n").unwrap();
        std::io::Write::flush(&mut writer).unwrap();

        let names: Vec<String> = std::fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].starts_with("mastoradar.log."));
    }
}
