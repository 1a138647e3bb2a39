use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use log::{debug, warn, LevelFilter};

use crate::config::LoggingConfig;

const LOG_PREFIX: &str = "promreport";
const SECONDS_PER_DAY: u64 = 24 * 3600;

/// Daily log file, e.g. `promreport-20261019.log`.
pub fn log_file_path(dir: &Path, now: DateTime<Local>) -> PathBuf {
    dir.join(format!("{LOG_PREFIX}-{}.log", now.format("%Y%m%d")))
}

fn is_own_log(path: &Path) -> bool {
    let prefix = format!("{LOG_PREFIX}-");
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(&prefix) && name.ends_with(".log"))
}

/// Removes `promreport-*.log` files in `dir` last modified more than
/// `max_age_days` ago. Other files in the directory are never touched.
pub fn prune_old_logs(dir: &Path, max_age_days: u64, now: SystemTime) -> Result<usize> {
    if max_age_days == 0 {
        return Ok(0);
    }
    let max_age = Duration::from_secs(max_age_days * SECONDS_PER_DAY);
    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !is_own_log(&path) {
            continue;
        }
        let modified = match fs::metadata(&path).and_then(|meta| meta.modified()) {
            Ok(modified) => modified,
            Err(err) => {
                debug!("Skipping {} while pruning: {err}", path.display());
                continue;
            }
        };
        let age = now.duration_since(modified).unwrap_or_default();
        if age > max_age {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}

fn level_filter(raw: &str) -> LevelFilter {
    raw.parse().unwrap_or_else(|_| {
        eprintln!("Unknown log level {raw:?}, using info");
        LevelFilter::Info
    })
}

/// Installs the process logger. Records go to stderr, or to a daily file
/// under `logging.path` when one is configured.
pub fn configure_logging(logging: &LoggingConfig, verbose: bool) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    } else {
        builder.filter_level(level_filter(&logging.level));
    }

    match &logging.path {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let path = log_file_path(dir, Local::now());
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder
                .format(|buf, record| {
                    writeln!(
                        buf,
                        "{} {:<5} [{}] {}",
                        Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z"),
                        record.level(),
                        record.module_path().unwrap_or("-"),
                        record.args()
                    )
                })
                .target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => {
            builder.format(|buf, record| writeln!(buf, "{}", record.args()));
        }
    }
    let _ = builder.try_init();

    if let Some(dir) = &logging.path {
        match prune_old_logs(dir, logging.max_age, SystemTime::now()) {
            Ok(0) => {}
            Ok(removed) => debug!("Pruned {removed} old log file(s) from {}", dir.display()),
            Err(err) => warn!("Failed to prune logs in {}: {err}", dir.display()),
        }
    }
    Ok(())
}
