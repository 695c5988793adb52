use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. Filter comes from `ANNOTATE_LOG`
/// (default `warn`); `ANNOTATE_LOG_FORMAT=json` emits JSON lines.
/// Safe to call more than once.
pub fn init() {
    let filter = EnvFilter::try_from_env("ANNOTATE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let json = std::env::var("ANNOTATE_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    // stdout belongs to the hook host
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
