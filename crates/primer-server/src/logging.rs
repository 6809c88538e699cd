use std::io::Write;

use env_logger::{Builder, Env};

/// Installs `env_logger` with a timestamped line format.
///
/// An explicit `filters` string (`--log-level` / `RUST_LOG`) wins; otherwise `debug`
/// selects between `debug` and `info`.
pub fn init_logging(debug: bool, filters: Option<&str>) {
    logger_builder(debug, filters).init();
}

fn logger_builder(debug: bool, filters: Option<&str>) -> Builder {
    let mut builder = match filters {
        Some(filters) => {
            let mut builder = Builder::new();
            builder.parse_filters(filters);
            builder
        }
        None => {
            let default = if debug { "debug" } else { "info" };
            Builder::from_env(Env::default().default_filter_or(default))
        }
    };

    builder.format(|buf, record| {
        writeln!(
            buf,
            "[{}] {} [{}] {} - {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.module_path().unwrap_or("unknown"),
            record.args()
        )
    });
    builder
}
