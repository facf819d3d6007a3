use std::io::Write;

/// Initializes the global logger: info by default, debug when `verbose`.
///
/// Lines carry only the level and the message. `RUST_LOG` is not consulted.
pub fn init_logger(verbose: bool) {
    let level = if verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info };
    env_logger::Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            let style = buf.default_level_style(record.level());
            writeln!(buf, "{style}{:<5}{style:#} {}", record.level(), record.args())
        })
        .init();
}
