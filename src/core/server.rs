//! # Server Pool Probing
//!
//! Latency ranking for the HQ/EX server pools. Each candidate is probed
//! with a plain TCP connect; probes run in parallel and the pool is
//! returned sorted fastest-first with unreachable servers last. The best
//! server can be persisted into the global configuration so later facade
//! constructions pick it up without re-probing.

use std::net::{SocketAddr, TcpStream};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::symbol::validate_server;
use crate::utils::app_config::AppConfig;
use crate::utils::error::{Error, Result};

#[cfg(feature = "cli")]
use tabled::Tabled;

/// Which pool to probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Hq,
    Ex,
}

impl Endpoint {
    fn pool_key(&self) -> &'static str {
        match self {
            Endpoint::Hq => "server.hq",
            Endpoint::Ex => "server.ex",
        }
    }

    fn bestip_key(&self) -> &'static str {
        match self {
            Endpoint::Hq => "bestip.hq",
            Endpoint::Ex => "bestip.ex",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Hq => write!(f, "hq"),
            Endpoint::Ex => write!(f, "ex"),
        }
    }
}

/// Probe result for a single pool entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Tabled))]
pub struct ServerProbe {
    pub server: String,
    /// Connect latency in milliseconds; unreachable servers report u64::MAX.
    pub latency_ms: u64,
    pub reachable: bool,
}

impl ServerProbe {
    fn unreachable(server: &str) -> Self {
        Self {
            server: server.to_string(),
            latency_ms: u64::MAX,
            reachable: false,
        }
    }
}

/// Probe one server: TCP connect with a timeout, measuring elapsed time.
fn probe(server: &str, timeout: Duration) -> ServerProbe {
    let (host, port) = match validate_server(server) {
        Ok(parts) => parts,
        Err(_) => return ServerProbe::unreachable(server),
    };

    let addr: SocketAddr = match format!("{}:{}", host, port).parse() {
        Ok(addr) => addr,
        Err(_) => return ServerProbe::unreachable(server),
    };

    let started = Instant::now();
    match TcpStream::connect_timeout(&addr, timeout) {
        Ok(_) => ServerProbe {
            server: server.to_string(),
            latency_ms: started.elapsed().as_millis() as u64,
            reachable: true,
        },
        Err(_) => ServerProbe::unreachable(server),
    }
}

/// Probe every server in `pool`, returning results sorted fastest-first.
pub fn check_server(pool: &[String], timeout: Duration) -> Vec<ServerProbe> {
    let mut probes: Vec<ServerProbe> = pool
        .par_iter()
        .map(|server| probe(server, timeout))
        .collect();

    probes.sort_by_key(|p| p.latency_ms);
    probes
}

/// Probe the configured pool for `endpoint` and persist the fastest server.
pub fn bestip(endpoint: Endpoint, timeout: Duration) -> Result<Vec<ServerProbe>> {
    let pool: Vec<String> = AppConfig::get(endpoint.pool_key())?;

    log::debug!("probing {} servers for {}", pool.len(), endpoint);
    let probes = check_server(&pool, timeout);

    let best = probes
        .iter()
        .find(|p| p.reachable)
        .ok_or_else(|| Error::new("no reachable server in pool"))?;

    log::info!("best {} server: {} ({} ms)", endpoint, best.server, best.latency_ms);
    AppConfig::set(endpoint.bestip_key(), best.server.clone())?;

    Ok(probes)
}

/// Server the facade should talk to: explicit choice, persisted bestip, or
/// the head of the pool.
pub fn default_server(endpoint: Endpoint) -> Result<(String, u16)> {
    let config = AppConfig::fetch()?;

    let persisted = match endpoint {
        Endpoint::Hq => config.bestip.hq.clone(),
        Endpoint::Ex => config.bestip.ex.clone(),
    };

    if let Some(server) = persisted {
        return validate_server(&server);
    }

    let pool = match endpoint {
        Endpoint::Hq => &config.server.hq,
        Endpoint::Ex => &config.server.ex,
    };

    let head = pool
        .first()
        .ok_or_else(|| Error::new("server pool is empty"))?;

    validate_server(head)
}
