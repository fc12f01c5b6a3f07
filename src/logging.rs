use tracing_subscriber::EnvFilter;

/// Install the global stderr subscriber.
///
/// `RUST_LOG` wins when set; otherwise `verbose` selects debug level for this
/// crate and warn level for everything else.
pub fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "warn,convo_score=debug"
    } else {
        "warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
