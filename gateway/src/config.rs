use anyhow::{anyhow, Context, Result};
use std::net::{IpAddr, SocketAddr};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;

/// Where to listen and how to report tool failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub addr: SocketAddr,
    pub strict_status: bool,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("BENCHOP_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let ip: IpAddr = host
            .trim()
            .parse()
            .with_context(|| format!("BENCHOP_HOST is not an IP address: '{}'", host))?;

        let port = match lookup("BENCHOP_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("BENCHOP_PORT is not a valid port: '{}'", raw))?,
            None => DEFAULT_PORT,
        };

        let strict_status = match lookup("BENCHOP_STRICT_STATUS") {
            Some(raw) => parse_bool(&raw)
                .ok_or_else(|| anyhow!("BENCHOP_STRICT_STATUS must be true or false, got '{}'", raw))?,
            None => false,
        };

        Ok(Self {
            addr: SocketAddr::new(ip, port),
            strict_status,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
