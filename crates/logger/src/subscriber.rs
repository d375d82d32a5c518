use std::env::var;
use std::str::FromStr;

use tracing::{Subscriber, level_filters::LevelFilter, warn};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{Layer, filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Output format of the log layer, selected through `RUST_LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "compact" | "text" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Install the global subscriber at `info`, honouring `RUST_LOG` and `RUST_LOG_FORMAT`.
pub fn init() {
    let format = match var("RUST_LOG_FORMAT") {
        Ok(raw) => raw.parse().unwrap_or_else(|error| {
            eprintln!("{error}, falling back to compact output");
            LogFormat::Compact
        }),
        Err(_) => LogFormat::Compact,
    };

    init_with(LevelFilter::INFO, format);
}

/// Install the global subscriber with an explicit default level and format.
///
/// `RUST_LOG` directives still take precedence over `level`. Calling this
/// twice is harmless: the second registration is reported and ignored.
pub fn init_with(level: LevelFilter, format: LogFormat) {
    let env_filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();

    let log_layer = log_layer(format, env_filter, std::io::stderr);

    if let Err(error) = tracing_subscriber::registry().with(log_layer).try_init() {
        warn!("Tracing subscriber already installed: {error}");
    }
}

/// Formatting layer writing to `writer`; stdout stays free for command output.
fn log_layer<S, W>(
    format: LogFormat,
    env_filter: EnvFilter,
    writer: W,
) -> Box<dyn Layer<S> + Send + Sync + 'static>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    match format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .with_filter(env_filter)
            .boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(writer)
            .with_filter(env_filter)
            .boxed(),
    }
}
