use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter` when set. With `json`
/// every event is written as one JSON object per line, span fields (such as
/// a call's `call_id`) included.
///
/// # Returns
/// `false` if a global subscriber was already installed; the existing one
/// is left in place.
pub fn init_tracing(default_filter: &str, json: bool) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let result = if json {
        tracing_subscriber::fmt().json().with_current_span(true).with_env_filter(filter).try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).try_init()
    };

    result.is_ok()
}
