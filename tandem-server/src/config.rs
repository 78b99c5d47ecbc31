use std::env;
use std::fmt::Display;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub db_path: PathBuf,
}

impl Config {
    /// Reads `TANDEM_HOST`, `TANDEM_PORT` and `TANDEM_DB_PATH`; a first command line argument overrides the port.
    pub fn load() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok(), env::args().nth(1))
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>, port_arg: Option<String>) -> anyhow::Result<Self> {
        let mut config = Self {
            host: try_load(&lookup, "TANDEM_HOST", "127.0.0.1")?,
            port: try_load(&lookup, "TANDEM_PORT", "8000")?,
            db_path: try_load(&lookup, "TANDEM_DB_PATH", "tandem-db")?,
        };
        if let Some(port) = port_arg {
            config.port = port
                .parse()
                .with_context(|| format!("invalid port argument {port:?}"))?;
        }
        Ok(config)
    }

    pub fn address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn try_load<T: FromStr>(lookup: impl Fn(&str) -> Option<String>, key: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    value
        .parse()
        .map_err(|err| anyhow!("invalid {key} value {value:?}: {err}"))
}
