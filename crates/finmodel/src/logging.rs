use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging to stderr.
///
/// Stdout carries the report, so log lines never mix with it. The level
/// comes from `RUST_LOG` when set, otherwise from `level`, applied to both
/// the CLI and the engine.
pub fn init_logging(level: &str) -> color_eyre::Result<()> {
    let default_filter = format!("finmodel={level},finmodel_core={level}");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false),
        )
        .try_init()?;

    tracing::debug!("logging initialized (level={level})");
    Ok(())
}
