use chrono::Local;
use fern::Dispatch;
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;
use std::fs;

const LOG_DIR: &str = "logs";
const LOG_FILE: &str = "resource_tree_wizard.log";

/// Per-page listing chatter of the data sources.
const TREE_TARGET: &str = "resource_tree_wizard::domain::tree";

/// Levels derived from `RUST_LOG`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLevels {
    /// Everything written to the log file.
    pub file: LevelFilter,
    /// What reaches stderr while the terminal prompter owns stdout.
    pub console: LevelFilter,
    /// Cap for the tree listing target. Paging output only shows at `trace`.
    pub tree: LevelFilter,
}

impl LogLevels {
    /// Without `RUST_LOG` the file logs `info` and the console only `warn`,
    /// so log lines do not interleave with prompts.
    pub fn from_env_value(rust_log: Option<&str>) -> Self {
        let requested = rust_log.and_then(|value| value.parse::<LevelFilter>().ok());
        let file = requested.unwrap_or(LevelFilter::Info);
        let console = requested.unwrap_or(LevelFilter::Warn);
        let tree = if file == LevelFilter::Trace { LevelFilter::Trace } else { file.min(LevelFilter::Info) };

        LogLevels { file, console, tree }
    }
}

/// Installs the global logger: colored stderr plus `logs/resource_tree_wizard.log`.
///
/// Call once at the start of `main`. Levels come from `RUST_LOG`, see
/// [`LogLevels::from_env_value`]. Example:
/// `RUST_LOG=debug cargo run -- --hierarchy data/hierarchy.json --recursive`
pub fn init() {
    let levels = LogLevels::from_env_value(std::env::var("RUST_LOG").ok().as_deref());

    let base_config = Dispatch::new()
        .level(levels.file.max(levels.console))
        .level_for(TREE_TARGET, levels.tree)
        .level_for("serde", LevelFilter::Warn)
        .level_for("uuid", LevelFilter::Warn);

    let colors = ColoredLevelConfig::new().error(Color::Red).warn(Color::Yellow).info(Color::Green).debug(Color::Blue).trace(Color::BrightBlack);
    let console_config = Dispatch::new()
        .level(levels.console)
        .format(move |out, message, record| {
            out.finish(format_args!("[{} {} {}] {}", Local::now().format("%H:%M:%S"), colors.color(record.level()), record.target(), message))
        })
        .chain(std::io::stderr());

    let file_config = Dispatch::new().level(levels.file).format(|out, message, record| {
        out.finish(format_args!("[{} {} {}] {}", Local::now().format("%Y-%m-%d %H:%M:%S"), record.level(), record.target(), message))
    });

    if let Err(e) = fs::create_dir_all(LOG_DIR) {
        eprintln!("Failed to create log directory at '{}': {}", LOG_DIR, e);
    }
    let log_file_path = format!("{}/{}", LOG_DIR, LOG_FILE);

    let dispatch = match fern::log_file(&log_file_path) {
        Ok(file) => base_config.chain(console_config).chain(file_config.chain(file)),
        Err(e) => {
            eprintln!("Failed to open log file '{}': {}", log_file_path, e);
            base_config.chain(console_config)
        }
    };

    if let Err(e) = dispatch.apply() {
        eprintln!("Failed to apply logger configuration: {}", e);
        return;
    }

    log::info!("Logger initialized ({:?}), writing to '{}'.", levels, log_file_path);
}
