use std::io::Write as _;

struct Logger;

static LOGGER: Logger = Logger;

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // NOTE: operator-facing output, stderr keeps it out of whatever the app prints.
        _ = writeln!(
            std::io::stderr().lock(),
            "{level:<5} {file}:{line} > {text}",
            level = record.level(),
            file = record.file().unwrap_or_else(|| record.target()),
            line = record
                .line()
                .map_or_else(|| "??".to_string(), |line| line.to_string()),
            text = record.args(),
        );
    }

    fn flush(&self) {
        _ = std::io::stderr().flush();
    }
}

/// installs the logger unless some other logger was installed already, in which case only the
/// max level is adjusted.
pub fn init(max_level: log::LevelFilter) {
    if log::set_logger(&LOGGER).is_err() {
        log::debug!("logger is already set");
    }
    log::set_max_level(max_level);
}
