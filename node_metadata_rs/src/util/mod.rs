//! Logging setup for the node_metadata tool
use slog::{self, Drain};
use slog_async;
use slog_scope;
use slog_stdlog;
use slog_term;

lazy_static! {
    static ref HOSTNAME: String = get_hostname();
}

fn get_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .unwrap_or_else(|| "unknown".to_owned())
}

// Hold a reference to the log guards for scoped logging which requires these to stay alive
// for the implicit logger to be passed into logging calls
pub struct LogGuards {
    _scope_guard: slog_scope::GlobalLoggerGuard,
}

/// Install the global logger.
///
/// Records go to stderr so stdout stays free for the labels themselves.
pub fn init_logging(debug: bool) -> LogGuards {
    let level = if debug {
        slog::Level::Debug
    } else {
        slog::Level::Info
    };
    let decorator = slog_term::TermDecorator::new().stderr().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = slog::LevelFilter::new(drain, level).fuse();
    let logger = slog::Logger::root(
        drain,
        o!(
            "Hostname" => HOSTNAME.clone(),
            "Type" => "node_metadata:log",
            "EnvVersion" => "2.0",
            "Logger" => format!("NodeMetadata-{}", env!("CARGO_PKG_VERSION"))
        ),
    );
    let _scope_guard = slog_scope::set_global_logger(logger);
    slog_stdlog::init().ok();
    LogGuards { _scope_guard }
}
