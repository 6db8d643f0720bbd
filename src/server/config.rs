//! Command line arguments and server settings.

use clap::Parser;

use crate::config::{Config, load_config};
use crate::error::Result;

/// CLI arguments for the server.
#[derive(Parser, Debug)]
#[command(name = "remote-read")]
#[command(about = "Prometheus remote read endpoint")]
pub struct CliArgs {
    /// Path to the YAML configuration file
    #[arg(short, long, env = "REMOTE_READ_CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(short, long, default_value = "9201", env = "REMOTE_READ_PORT")]
    pub port: u16,
}

impl CliArgs {
    /// Load the configuration file, or the defaults when none was given.
    pub fn load_config(&self) -> Result<Config> {
        match &self.config {
            Some(path) => load_config(path),
            None => Ok(Config::default()),
        }
    }
}

/// Settings of the HTTP listener.
#[derive(Debug, Clone)]
pub struct ReadServerConfig {
    pub port: u16,
    pub max_body_bytes: usize,
}

impl ReadServerConfig {
    pub fn new(args: &CliArgs, config: &Config) -> Self {
        Self {
            port: args.port,
            max_body_bytes: config.max_body_bytes,
        }
    }
}

impl Default for ReadServerConfig {
    fn default() -> Self {
        Self {
            port: 9201,
            max_body_bytes: Config::default().max_body_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_port_and_config_path() {
        // given/when
        let args = CliArgs::parse_from(["remote-read", "--port", "9999", "-c", "read.yaml"]);

        // then
        assert_eq!(args.port, 9999);
        assert_eq!(args.config.as_deref(), Some("read.yaml"));
    }

    #[test]
    fn should_use_defaults_without_config_file() {
        // given
        let args = CliArgs {
            config: None,
            port: 9201,
        };

        // when
        let config = args.load_config().unwrap();
        let server_config = ReadServerConfig::new(&args, &config);

        // then
        assert_eq!(config, Config::default());
        assert_eq!(server_config.port, 9201);
        assert_eq!(server_config.max_body_bytes, 8 * 1024 * 1024);
    }
}
