use env_logger::{Builder, Target};
use log::LevelFilter;

/// Initialise stderr logging from `SIMON_LOG` (e.g. `debug`), default `info`.
///
/// Logs go to stderr so they do not interleave with the board on stdout.
pub fn init_from_env() {
    let level = std::env::var("SIMON_LOG")
        .ok()
        .and_then(|v| v.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info);

    let mut builder = Builder::new();
    builder
        .filter_level(level)
        .target(Target::Stderr)
        .format_timestamp_millis();
    // A second init (e.g. from tests) is harmless.
    let _ = builder.try_init();
}
