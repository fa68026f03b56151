//! [tracing_subscriber] setup.

use serde::{Deserialize, Serialize};
use tracing_appender::rolling::{self, RollingFileAppender};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::MakeWriter,
    prelude::__tracing_subscriber_SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

use crate::{LOG_FILE_NAME, LogConfig, LogRotation};

/// The format of the logs.
#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[clap(rename_all = "lowercase")]
pub enum LogFormat {
    /// Full format (default).
    #[default]
    Full,
    /// JSON format.
    Json,
    /// Pretty format.
    Pretty,
    /// Compact format.
    Compact,
}

impl LogFormat {
    fn layer<W>(self, writer: W) -> Box<dyn Layer<Registry> + Send + Sync>
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let layer = tracing_subscriber::fmt::layer().with_writer(writer);
        match self {
            Self::Full => layer.boxed(),
            Self::Json => layer.json().boxed(),
            Self::Pretty => layer.pretty().boxed(),
            Self::Compact => layer.compact().boxed(),
        }
    }
}

impl LogRotation {
    fn appender(self, directory: &std::path::Path) -> RollingFileAppender {
        match self {
            Self::Minutely => rolling::minutely(directory, LOG_FILE_NAME),
            Self::Hourly => rolling::hourly(directory, LOG_FILE_NAME),
            Self::Daily => rolling::daily(directory, LOG_FILE_NAME),
            Self::Never => rolling::never(directory, LOG_FILE_NAME),
        }
    }
}

impl LogConfig {
    /// Installs the global tracing subscriber.
    ///
    /// `env_filter` defaults to `RUST_LOG`. The configured level is added on top of it.
    pub fn init_tracing_subscriber(
        &self,
        env_filter: Option<EnvFilter>,
    ) -> Result<(), TryInitError> {
        let mut layers = Vec::with_capacity(2);
        if let Some(stdout) = &self.stdout_logs {
            layers.push(stdout.format.layer(std::io::stdout));
        }
        if let Some(file) = &self.file_logs {
            layers.push(file.format.layer(file.rotation.appender(&file.directory_path)));
        }

        let env_filter = env_filter
            .unwrap_or_else(EnvFilter::from_default_env)
            .add_directive(self.global_level.into());

        tracing_subscriber::registry().with(layers).with(env_filter).try_init()
    }
}

