//! Server configuration from environment variables
//!
//! - `PLANNER_BIND`: socket address to listen on (default `127.0.0.1:3001`)
//! - `PORT`: used as `0.0.0.0:$PORT` when `PLANNER_BIND` is unset
//! - `PLANNER_SEED_CSV`: optional CSV of records loaded at startup
//! - `PLANNER_DEFAULT_USER`: user id assumed when a request omits one
//! - `PLANNER_SEED_DEMO`: seed the default user's demo record when no CSV is given
//! - `PLANNER_LOG`: log filter used when `RUST_LOG` is unset (default `info`)

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::{PlannerError, Result};

pub const DEFAULT_BIND: &str = "127.0.0.1:3001";
pub const DEFAULT_USER_ID: &str = "user123";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub seed_csv: Option<PathBuf>,
    pub default_user_id: String,
    pub seed_demo: bool,
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3001)),
            seed_csv: None,
            default_user_id: DEFAULT_USER_ID.to_string(),
            seed_demo: true,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let bind = match (get("PLANNER_BIND"), get("PORT")) {
            (Some(bind), _) => parse_addr("PLANNER_BIND", &bind)?,
            (None, Some(port)) => {
                let port: u16 = port
                    .parse()
                    .map_err(|_| PlannerError::Internal(format!("PORT is not a valid port: {}", port)))?;
                SocketAddr::from(([0, 0, 0, 0], port))
            }
            (None, None) => defaults.bind,
        };

        let seed_demo = match get("PLANNER_SEED_DEMO") {
            None => defaults.seed_demo,
            Some(v) => !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "off" | "no"),
        };

        Ok(Self {
            bind,
            seed_csv: get("PLANNER_SEED_CSV").map(PathBuf::from),
            default_user_id: get("PLANNER_DEFAULT_USER").unwrap_or(defaults.default_user_id),
            seed_demo,
            log_filter: get("PLANNER_LOG").unwrap_or(defaults.log_filter),
        })
    }
}

fn parse_addr(var: &str, value: &str) -> Result<SocketAddr> {
    value
        .parse()
        .map_err(|_| PlannerError::Internal(format!("{} is not a socket address: {}", var, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg, ServerConfig::default());
        assert_eq!(cfg.bind.to_string(), DEFAULT_BIND);
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            ("PLANNER_BIND", "0.0.0.0:8080"),
            ("PORT", "9999"),
            ("PLANNER_SEED_CSV", "seed.csv"),
            ("PLANNER_DEFAULT_USER", "alice"),
            ("PLANNER_SEED_DEMO", "off"),
        ])
        .unwrap();
        assert_eq!(cfg.bind.port(), 8080);
        assert_eq!(cfg.seed_csv, Some(PathBuf::from("seed.csv")));
        assert_eq!(cfg.default_user_id, "alice");
        assert!(!cfg.seed_demo);
    }

    #[test]
    fn test_port_fallback() {
        let cfg = config(&[("PORT", "4000"), ("PLANNER_BIND", "  ")]).unwrap();
        assert_eq!(cfg.bind.to_string(), "0.0.0.0:4000");
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(config(&[("PORT", "http")]).unwrap_err().kind(), "internal_error");
        assert!(config(&[("PLANNER_BIND", "localhost")]).is_err());
    }
}
