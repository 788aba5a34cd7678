use std::net::{Ipv4Addr, SocketAddr};

use figment::{
    providers::{Env, Format, Toml},
    value::{Uncased, UncasedStr},
    Figment,
};
use serde::Deserialize;

#[cfg(feature = "logging")]
use tracing_subscriber::filter::LevelFilter;

/// Database configuration.
#[derive(Deserialize)]
pub struct Database {
    /// Database URL string.
    pub url: String,
}

/// HTTP server configuration.
#[derive(Deserialize)]
pub struct Server {
    /// Address, that HTTP server will listen on.
    pub address: SocketAddr,
}

/// Implementation of [`serde`]'s deserializer for [`FromStr`] types.
#[cfg(feature = "logging")]
fn deserialize_from_str<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: std::str::FromStr,
    T::Err: std::error::Error,
    D: serde::de::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    std::str::FromStr::from_str(&s).map_err(serde::de::Error::custom)
}

/// Logging configuration.
#[cfg(feature = "logging")]
#[derive(Deserialize)]
pub struct Logging {
    /// Log level.
    #[serde(deserialize_with = "deserialize_from_str")]
    pub level: LevelFilter,
}

#[cfg(feature = "logging")]
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: LevelFilter::WARN,
        }
    }
}

/// Payload origin configuration.
///
/// Payloads embedded into optical codes are built from the origin
/// a request was made to. These values are used when such origin
/// cannot be determined or has to be overridden.
#[derive(Deserialize)]
pub struct Origin {
    /// Origin used when the request origin cannot be determined.
    #[serde(default = "default_fallback_origin")]
    pub fallback: String,

    /// LAN address substituted for loopback hosts.
    ///
    /// If not set, network interfaces are enumerated on each resolution.
    #[serde(default)]
    pub lan_address: Option<Ipv4Addr>,
}

fn default_fallback_origin() -> String {
    String::from("http://localhost:3000")
}

impl Default for Origin {
    fn default() -> Self {
        Self {
            fallback: default_fallback_origin(),
            lan_address: None,
        }
    }
}

/// Convert an environment variable name into a nested configuration key.
///
/// Underscores separate nesting levels, except for field names that contain underscores.
fn env_key(key: &UncasedStr) -> Uncased<'_> {
    if key.as_str().eq_ignore_ascii_case("origin_lan_address") {
        return Uncased::from("origin.lan_address");
    }

    key.as_str().replace('_', ".").into()
}

/// General configuration.
#[derive(Deserialize)]
pub struct Config {
    /// General database configuration.
    pub database: Database,

    /// HTTP server configuration.
    #[serde(default)]
    pub server: Option<Server>,

    /// Logging configuration.
    #[cfg(feature = "logging")]
    #[serde(default)]
    pub logging: Logging,

    /// Payload origin configuration.
    #[serde(default)]
    pub origin: Origin,
}

impl Config {
    /// Create new config using default configuration file or environment variables.
    ///
    /// See [`Env`] for more details on how to use environment variables configuration.
    ///
    /// [`Env`]: figment::providers::Env
    pub fn new() -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file("Config.toml"))
            .merge(Env::prefixed("CONFIG_").map(env_key))
            .extract()
    }

    /// Create new config suitable for running unit tests.
    #[cfg(feature = "test-utils")]
    pub fn for_tests() -> Self {
        Self {
            database: Database {
                url: String::from("sqlite::memory:"),
            },
            server: Some(Server {
                address: "127.0.0.1:3000".parse().unwrap(),
            }),
            #[cfg(feature = "logging")]
            logging: Logging::default(),
            origin: Origin::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn origin_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "Config.toml",
                r#"
                [database]
                url = "postgres://localhost/codes"
                "#,
            )?;

            let config = Config::new()?;

            assert_eq!(config.origin.fallback, "http://localhost:3000");
            assert!(config.origin.lan_address.is_none());
            assert!(config.server.is_none());

            Ok(())
        });
    }

    #[test]
    fn environment_overrides() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "Config.toml",
                r#"
                [database]
                url = "postgres://localhost/codes"

                [origin]
                fallback = "http://localhost:3000"
                lan_address = "192.168.1.50"
                "#,
            )?;

            jail.set_env("CONFIG_ORIGIN_FALLBACK", "https://codes.example.com");

            let config = Config::new()?;

            assert_eq!(config.origin.fallback, "https://codes.example.com");
            assert_eq!(
                config.origin.lan_address,
                Some(Ipv4Addr::new(192, 168, 1, 50))
            );

            Ok(())
        });
    }

    #[test]
    fn lan_address_from_environment() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "Config.toml",
                r#"
                [database]
                url = "postgres://localhost/codes"
                "#,
            )?;

            jail.set_env("CONFIG_ORIGIN_LAN_ADDRESS", "10.0.0.7");
            jail.set_env("CONFIG_DATABASE_URL", "postgres://db/codes");

            let config = Config::new()?;

            assert_eq!(config.origin.lan_address, Some(Ipv4Addr::new(10, 0, 0, 7)));
            assert_eq!(config.database.url, "postgres://db/codes");

            Ok(())
        });
    }
}
