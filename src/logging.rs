/// Initialize structured logging with tracing.
///
/// `RUST_LOG` controls the filter (default `info`). Output is JSON unless
/// `LOG_FORMAT=pretty`. Calling this twice keeps the first subscriber.
pub fn init_logging() {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let pretty = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("pretty"));

    let result = if pretty {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            );
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .json(),
            );
        tracing::subscriber::set_global_default(subscriber)
    };

    match result {
        Ok(()) => tracing::info!(pretty, "Structured logging initialized"),
        Err(e) => tracing::debug!(error = %e, "Tracing subscriber already installed"),
    }
}
