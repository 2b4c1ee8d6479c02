// Startup configuration: where the smart-home server lives. Resolved once in
// `main` and handed to the client as an immutable value.

use anyhow::{Context, Result};
use clap::Parser;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8080;

pub const HOST_ENV: &str = "SMARTHOME_HOST";
pub const PORT_ENV: &str = "SMARTHOME_PORT";

#[derive(Parser, Debug, Default)]
#[command(name = "smarthome-cli")]
#[command(about = "Interactive client for the smart-home REST API")]
pub struct Args {
    /// Server host (falls back to SMARTHOME_HOST, then localhost)
    pub host: Option<String>,

    /// Server port (falls back to SMARTHOME_PORT, then 8080)
    pub port: Option<String>,
}

/// Host and port of the server, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
        }
    }
}

impl Endpoint {
    /// Positional arguments win over the environment, which wins over the
    /// defaults. `env` is the variable lookup, normally `std::env::var`.
    pub fn resolve<F>(args: &Args, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = args
            .host
            .clone()
            .or_else(|| env(HOST_ENV))
            .map(|host| host.trim().to_string())
            .filter(|host| !host.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.into());

        let port = match args.port.clone().or_else(|| env(PORT_ENV)) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("Porta invalida: '{raw}'"))?,
            None => DEFAULT_PORT,
        };

        Ok(Self { host, port })
    }

    pub fn from_env(args: &Args) -> Result<Self> {
        Self::resolve(args, |key| std::env::var(key).ok())
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
