use crate::config::{EnvLookup, parse_env_or, process_env};
use anyhow::Result;
use std::{
    net::{Ipv6Addr, SocketAddr},
    time::Duration,
};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_WORKER_THREADS: usize = 10;
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct GrpcServerConfig {
    pub port: u16,
    pub worker_threads: usize,
    pub concurrency_limit: usize,
    pub shutdown_timeout: Duration,
}

impl GrpcServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&process_env)
    }

    pub fn from_lookup(lookup: EnvLookup<'_>) -> Result<Self> {
        let port = parse_env_or(lookup, "PORT", DEFAULT_PORT)?;
        let worker_threads =
            parse_env_or(lookup, "GRPC_WORKER_THREADS", DEFAULT_WORKER_THREADS)?.max(1);
        let concurrency_limit =
            parse_env_or(lookup, "GRPC_CONCURRENCY_LIMIT", worker_threads)?.max(1);
        let shutdown_secs = parse_env_or(
            lookup,
            "SHUTDOWN_TIMEOUT_SECS",
            DEFAULT_SHUTDOWN_TIMEOUT_SECS,
        )?;

        Ok(Self {
            port,
            worker_threads,
            concurrency_limit,
            shutdown_timeout: Duration::from_secs(shutdown_secs),
        })
    }

    /// Listens on every interface, IPv4 included via the dual-stack socket.
    pub fn grpc_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv6Addr::UNSPECIFIED, self.port))
    }
}
