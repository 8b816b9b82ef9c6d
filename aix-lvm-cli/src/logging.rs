// SPDX-License-Identifier: GPL-3.0-only

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LogConfig;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const DEFAULT_LOG_NAME: &str = "aix-vg.log";

/// Install the global subscriber; later calls in the same process are no-ops
pub(crate) fn init(config: &LogConfig) {
    // RUST_LOG wins; otherwise keep dependencies quiet and our crates at the configured level.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,aix_vg={level},aix_lvm_sys={level}",
            level = config.level.as_directive()
        ))
    });

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let Some(path) = config.file.as_deref() else {
        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .try_init();
        return;
    };

    match file_writer(path) {
        Ok((writer, guard)) => {
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false);

            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(stderr_layer)
                .with(file_layer)
                .try_init();

            // Flushes buffered lines when the process exits.
            let _ = LOG_GUARD.set(guard);
        }
        Err(e) => {
            eprintln!("aix-vg: failed to initialize file logging: {e:#}");
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(stderr_layer)
                .try_init();
        }
    }
}

fn file_writer(
    path: &Path,
) -> anyhow::Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let (dir, name) = split_log_path(path);

    if let Err(e) = fs::create_dir_all(&dir) {
        return Err(anyhow::anyhow!(
            "create log directory failed: {} ({})",
            dir.display(),
            e
        ));
    }

    let appender = tracing_appender::rolling::never(&dir, &name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    Ok((writer, guard))
}

fn split_log_path(path: &Path) -> (PathBuf, OsString) {
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from(DEFAULT_LOG_NAME));
    (dir, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_log_path() {
        assert_eq!(
            split_log_path(Path::new("/var/log/aix-vg.log")),
            (PathBuf::from("/var/log"), OsString::from("aix-vg.log"))
        );
        assert_eq!(
            split_log_path(Path::new("run.log")),
            (PathBuf::from("."), OsString::from("run.log"))
        );
        assert_eq!(
            split_log_path(Path::new("/")),
            (PathBuf::from("."), OsString::from(DEFAULT_LOG_NAME))
        );
    }
}
