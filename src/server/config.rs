//! Server configuration
//!
//! Layers built-in defaults, an optional `ftserver.toml`, `FTSERVER_*`
//! environment variables and command-line overrides into a validated
//! [`ServerConfig`].

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_NAME: &str = "ftserver";

/// Server configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Host the control listener binds to
    pub bind_address: String,

    /// Control connection port; normally supplied on the command line
    pub control_port: u16,

    /// Directory served by LIST and GET
    pub server_root: PathBuf,

    /// Bytes read from a file per data-channel write
    pub chunk_size: usize,

    /// Largest directory listing the server will send
    pub max_listing_bytes: usize,

    /// Longest control line accepted, `\n` or `\r\n` terminator excluded
    pub max_command_length: usize,

    /// How long to wait for `DATA_PORT` after `HELLO`
    pub negotiation_timeout_secs: u64,

    /// Per-endpoint bound on connecting the data channel
    pub connect_timeout_secs: u64,

    /// Backlog for the control listener
    pub listen_backlog: u32,
}

/// Values taken from the command line, applied last.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub control_port: Option<u16>,
    pub server_root: Option<PathBuf>,
    pub bind_address: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            control_port: 0,
            server_root: PathBuf::from("."),
            chunk_size: 8192,
            max_listing_bytes: 64 * 1024,
            max_command_length: 256,
            negotiation_timeout_secs: 30,
            connect_timeout_secs: 10,
            listen_backlog: 10,
        }
    }
}

impl ServerConfig {
    /// Load configuration with environment and command-line overrides.
    ///
    /// An explicit `path` must exist and is read as TOML whatever its
    /// extension; otherwise `ftserver.toml` is read from the working directory
    /// when present.
    pub fn load(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let defaults = ServerConfig::default();

        let mut builder = Config::builder()
            .set_default("bind_address", defaults.bind_address)?
            .set_default("control_port", i64::from(defaults.control_port))?
            .set_default("server_root", defaults.server_root.to_string_lossy().to_string())?
            .set_default("chunk_size", defaults.chunk_size as i64)?
            .set_default("max_listing_bytes", defaults.max_listing_bytes as i64)?
            .set_default("max_command_length", defaults.max_command_length as i64)?
            .set_default(
                "negotiation_timeout_secs",
                defaults.negotiation_timeout_secs as i64,
            )?
            .set_default("connect_timeout_secs", defaults.connect_timeout_secs as i64)?
            .set_default("listen_backlog", i64::from(defaults.listen_backlog))?;

        builder = match path {
            Some(path) => builder.add_source(File::new(&path.to_string_lossy(), FileFormat::Toml)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_NAME).required(false)),
        };

        builder = builder.add_source(Environment::with_prefix("FTSERVER").try_parsing(true));

        if let Some(port) = overrides.control_port {
            builder = builder.set_override("control_port", i64::from(port))?;
        }
        if let Some(root) = &overrides.server_root {
            builder = builder.set_override("server_root", root.to_string_lossy().to_string())?;
        }
        if let Some(bind) = &overrides.bind_address {
            builder = builder.set_override("bind_address", bind.clone())?;
        }

        let config: ServerConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.control_port == 0 {
            return Err(ConfigError::Message("control_port cannot be 0".into()));
        }

        if self.bind_address.is_empty() {
            return Err(ConfigError::Message("bind_address cannot be empty".into()));
        }

        if self.server_root.as_os_str().is_empty() {
            return Err(ConfigError::Message("server_root cannot be empty".into()));
        }

        if self.chunk_size == 0 {
            return Err(ConfigError::Message(
                "chunk_size must be greater than 0".into(),
            ));
        }

        if self.max_listing_bytes == 0 {
            return Err(ConfigError::Message(
                "max_listing_bytes must be greater than 0".into(),
            ));
        }

        if self.max_command_length == 0 {
            return Err(ConfigError::Message(
                "max_command_length must be greater than 0".into(),
            ));
        }

        if self.negotiation_timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "timeouts must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Get the server root as a string
    pub fn server_root_str(&self) -> String {
        self.server_root.to_string_lossy().to_string()
    }

    /// Control port as text, for the resolver
    pub fn control_port_str(&self) -> String {
        self.control_port.to_string()
    }

    pub fn negotiation_timeout(&self) -> Duration {
        Duration::from_secs(self.negotiation_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
