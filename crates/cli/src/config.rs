use std::{
    fs, io,
    path::{Path, PathBuf},
};

use derive_more::{Display, Error, From};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// CLI configuration errors.
#[derive(Debug, Display, From, Error)]
pub enum CliConfigError {
    /// Unable to load the configuration using [`figment`].
    Figment(figment::Error),

    /// IO-related error.
    Io(io::Error),

    /// Unable to serialize the configuration using [`toml`] crate.
    Toml(toml::ser::Error),

    /// User's home directory cannot be determined.
    #[display(fmt = "unable to find home directory")]
    HomeDirNotFound,
}

/// Primary CLI config.
#[derive(Serialize, Deserialize)]
pub struct CliConfig {
    /// Code management API server path.
    server_path: String,

    /// Origin of the web UI, used to build payloads locally.
    web_origin: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            server_path: default_server_path(),
            web_origin: default_web_origin(),
        }
    }
}

/// Default server path for a locally running API server.
pub fn default_server_path() -> String {
    String::from("http://localhost:3000")
}

/// Default web origin for a locally running web UI.
pub fn default_web_origin() -> String {
    String::from("http://localhost:3000")
}

impl CliConfig {
    /// Create new CLI config using default configuration file or environment variables.
    ///
    /// See [`Env`] for more details on how to use environment variables configuration.
    ///
    /// [`Env`]: figment::providers::Env
    pub fn new() -> Result<Self, CliConfigError> {
        Self::load(&Self::config_path()?)
    }

    /// Load the configuration from the provided file, which may be missing.
    fn load(path: &Path) -> Result<Self, CliConfigError> {
        Ok(Figment::from(Serialized::defaults(CliConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("QRLINK_"))
            .extract()?)
    }

    /// Write the configuration file to the default file location.
    pub fn write(server_path: String, web_origin: String) -> Result<PathBuf, CliConfigError> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(
            &path,
            toml::to_string(&CliConfig {
                server_path,
                web_origin,
            })?,
        )?;

        Ok(path)
    }

    /// Get API server path from the current configuration.
    pub fn server_path(&self) -> &str {
        self.server_path.trim_end_matches('/')
    }

    /// Get web origin from the current configuration.
    pub fn web_origin(&self) -> &str {
        &self.web_origin
    }

    /// Get CLI configuration storage path.
    ///
    /// Returns [`Err`] if home directory cannot be determined.
    fn config_path() -> Result<PathBuf, CliConfigError> {
        let mut home_dir = home::home_dir().ok_or(CliConfigError::HomeDirNotFound)?;
        home_dir.push(".qrlink/config.toml");
        Ok(home_dir)
    }
}
