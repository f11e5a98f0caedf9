//! Application settings, read from `settings.toml` (or `--config`) and
//! overridden by `UNIFYPAY__*` environment variables, e.g.
//! `UNIFYPAY__SERVER__PORT=8080`.
use std::path::PathBuf;

use clap::Parser;
use config::{Config, ConfigError, Environment as EnvSource, File};
use serde::Deserialize;
use server::Environment;

#[derive(Debug, Parser)]
#[command(name = "unifypay", about = "Unified payments and balance service", version)]
pub struct Cli {
    /// Settings file. Missing files are ignored.
    #[arg(long, short, env = "UNIFYPAY_CONFIG", default_value = "settings.toml")]
    pub config: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Database {
    pub fn url(&self) -> String {
        match self {
            Database::Memory => String::from("sqlite::memory:"),
            Database::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Server {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub environment: Environment,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
            environment: Environment::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_level() -> String {
    "info".to_string()
}

impl Settings {
    pub fn new(cli: &Cli) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(cli.config.as_path()).required(false))
            .add_source(
                EnvSource::with_prefix("UNIFYPAY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn defaults_apply() {
        let settings = parse("[server]\ndatabase = \"memory\"\n");
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.app.environment, Environment::Development);
        let server = settings.server.unwrap();
        assert_eq!(server.bind, "127.0.0.1");
        assert_eq!(server.port, 3000);
        assert_eq!(server.database.url(), "sqlite::memory:");
    }

    #[test]
    fn sqlite_database_and_production() {
        let settings = parse(
            "[app]\nlevel = \"debug\"\nenvironment = \"production\"\n\n\
             [server]\nport = 8080\ndatabase = { sqlite = \"./unifypay.db\" }\n",
        );
        assert_eq!(settings.app.environment, Environment::Production);
        let server = settings.server.unwrap();
        assert_eq!(server.port, 8080);
        assert_eq!(server.database.url(), "sqlite:./unifypay.db?mode=rwc");
    }

    #[test]
    fn server_section_is_optional() {
        let settings = parse("[app]\nlevel = \"warn\"\n");
        assert!(settings.server.is_none());
    }
}
