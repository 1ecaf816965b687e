use chrono::Local;
use colored::Colorize;
use fern::Dispatch;
use web_marker::LoggingMode;

/// Sends log records to stderr, leaving stdout to the report.
pub fn init_logger(mode: LoggingMode) -> Result<(), log::SetLoggerError> {
    Dispatch::new()
        .format(|out, message, record| {
            let level = match record.level() {
                log::Level::Error => "ERROR".red(),
                log::Level::Warn => "WARN".yellow(),
                log::Level::Info => "INFO".green(),
                log::Level::Debug => "DEBUG".cyan(),
                log::Level::Trace => "TRACE".normal(),
            };

            out.finish(format_args!(
                "[{}][{}][{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                level,
                record.target(),
                message
            ))
        })
        .level(mode.level_filter())
        .chain(std::io::stderr())
        .apply()
}
