use colored::{ColoredString, Colorize};
use env_logger::Builder;
use log::{Level, LevelFilter};
use std::io::Write;

fn level_tag(level: Level) -> Option<ColoredString> {
    match level {
        Level::Error => Some("ERROR".red()),
        Level::Warn => Some("WARN".yellow()),
        Level::Debug | Level::Trace => Some("DEBUG".white()),
        Level::Info => None,
    }
}

/// Info goes out as a bare `[trawler] message`; warnings and errors carry a
/// colored level tag and the emitting target.
pub fn setup_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    Builder::from_default_env()
        .filter_level(LevelFilter::Warn) // dependencies: warnings only
        .filter_module(env!("CARGO_PKG_NAME"), level)
        .format(|buf, record| {
            let name = env!("CARGO_PKG_NAME").cyan();
            match level_tag(record.level()) {
                Some(tag) => writeln!(
                    buf,
                    "[{} {} {}] {}",
                    name,
                    tag,
                    record.target(),
                    record.args()
                ),
                None => writeln!(buf, "[{}] {}", name, record.args()),
            }
        })
        .init();
}
