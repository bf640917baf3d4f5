use anyhow::Result;
use gauntlet_config::{LogFormat, LogTarget, LoggingConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Keeps non-blocking file writers flushing; hold it for the life of the run
#[derive(Default)]
pub struct LoggingGuard {
    _guards: Vec<WorkerGuard>,
}

impl LoggingGuard {
    /// Number of file writers kept alive
    pub fn file_writers(&self) -> usize {
        self._guards.len()
    }
}

/// Initialize logging from configuration
pub fn init_logging_from_config(config: &LoggingConfig) -> Result<LoggingGuard> {
    let env_filter = EnvFilter::try_new(config.level.as_str())
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let (layers, guard) = build_layers(config)?;

    // Use try_init to avoid panic if global subscriber already set
    if tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .is_err()
    {
        tracing::debug!("Global tracing subscriber already initialized, skipping");
    }

    Ok(guard)
}

/// Initialize simple tracing for basic console output
pub fn init_simple_tracing(log_level: &str) -> Result<()> {
    let env_filter = EnvFilter::try_new(log_level)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init()
        .is_err()
    {
        tracing::debug!("Global tracing subscriber already initialized, skipping");
    }

    Ok(())
}

fn build_layers(config: &LoggingConfig) -> Result<(Vec<BoxedLayer>, LoggingGuard)> {
    let mut layers = Vec::with_capacity(config.targets.len());
    let mut guards = Vec::new();

    for target in &config.targets {
        match target {
            LogTarget::Console => {
                layers.push(fmt_layer(
                    config.format,
                    std::io::stdout,
                    true,
                    config.include_location,
                ));
            }
            LogTarget::File {
                directory,
                file_prefix,
            } => {
                std::fs::create_dir_all(directory).map_err(|e| {
                    anyhow::anyhow!("Failed to create log directory {}: {}", directory, e)
                })?;
                let appender = tracing_appender::rolling::daily(directory, file_prefix);
                let (writer, guard) = tracing_appender::non_blocking(appender);
                guards.push(guard);
                layers.push(fmt_layer(
                    config.format,
                    writer,
                    false,
                    config.include_location,
                ));
            }
        }
    }

    Ok((layers, LoggingGuard { _guards: guards }))
}

fn fmt_layer<W>(format: LogFormat, writer: W, ansi: bool, include_location: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_file(include_location)
        .with_line_number(include_location);

    match format {
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Text => layer.boxed(),
    }
}
