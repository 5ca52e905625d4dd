use std::{
    env, io,
    path::{Path, PathBuf},
};

use anyhow::Error;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, fmt::time::ChronoLocal, layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// `-v` count to stderr level: INFO, DEBUG, then TRACE.
pub fn level_from_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn get_tmp_dir() -> String {
    match env::var("TMPDIR").or_else(|_| env::var("TEMP")) {
        Ok(v) => v,
        Err(_) => "log".into(),
    }
}

/// `RUST_LOG` wins when set, `level` is the fallback.
fn get_env_filter(level: LevelFilter) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy()
}

pub fn setup_logging_stderr_only(stderr_log_level: LevelFilter) -> Result<(), Error> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(io::stderr);

    tracing_subscriber::registry()
        .with(
            stderr_layer
                .with_timer(ChronoLocal::rfc_3339())
                .with_file(false)
                .with_line_number(false)
                .with_target(false)
                .with_ansi(false)
                .with_filter(get_env_filter(stderr_log_level)),
        )
        .try_init()?;

    Ok(())
}

/// Logs to stderr at `stderr_log_level` and, at DEBUG, to a daily rolling file
/// `<filename_prefix>.<date>.log` under `$TMPDIR`, `$TEMP` or `./log`.
///
/// Returns the directory the log files go to.
pub fn setup_logging_to_stderr_and_rolling_file(
    filename_prefix: &str,
    stderr_log_level: LevelFilter,
) -> Result<PathBuf, Error> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(io::stderr);

    let tmp_dir = get_tmp_dir();

    let file_layer = tracing_subscriber::fmt::layer().pretty().with_writer(
        RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(filename_prefix)
            .filename_suffix("log")
            .build(&tmp_dir)?,
    );

    tracing_subscriber::registry()
        .with(
            stderr_layer
                .with_timer(ChronoLocal::rfc_3339())
                .with_file(false)
                .with_line_number(false)
                .with_target(false)
                .with_ansi(false)
                .with_filter(get_env_filter(stderr_log_level)),
        )
        .with(
            file_layer
                .with_timer(ChronoLocal::rfc_3339())
                .with_ansi(false)
                .with_filter(get_env_filter(LevelFilter::DEBUG)),
        )
        .try_init()?;

    let log_dir_abs_path = match Path::new(&tmp_dir).canonicalize() {
        Ok(v) => v,
        Err(_) => PathBuf::from(tmp_dir),
    };

    Ok(log_dir_abs_path)
}

#[cfg(test)]
mod test {
    use tracing::{Level, event};

    use super::*;

    #[test]
    fn test_level_from_verbosity() {
        assert_eq!(level_from_verbosity(0), LevelFilter::INFO);
        assert_eq!(level_from_verbosity(1), LevelFilter::DEBUG);
        assert_eq!(level_from_verbosity(2), LevelFilter::TRACE);
        assert_eq!(level_from_verbosity(9), LevelFilter::TRACE);
    }

    #[test]
    fn test_stderr_only() {
        setup_logging_stderr_only(LevelFilter::DEBUG).unwrap();

        event!(Level::TRACE, "trace!");
        event!(Level::DEBUG, "debug!");
        event!(Level::INFO, "info!");

        // a second subscriber can not be installed
        assert!(setup_logging_stderr_only(LevelFilter::INFO).is_err());
    }
}
