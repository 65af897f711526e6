use log::{Level, LevelFilter};
use std::io::Write;

fn glyph(level: Level) -> &'static str {
    match level {
        Level::Error => "✘",
        Level::Warn => "⚠",
        Level::Info => "✔",
        Level::Debug | Level::Trace => "·",
    }
}

/// Console logger: one line per record on stdout, info and above.
///
/// Configured in code only; `RUST_LOG` is not consulted.
pub fn init() {
    let _ = env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .target(env_logger::Target::Stdout)
        .format(|buf, record| writeln!(buf, "{} {}", glyph(record.level()), record.args()))
        .try_init();
}
