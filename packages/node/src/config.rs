//! Node configuration, populated from command-line flags or environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Runtime configuration for an annotation server.
///
/// Every field has a default, so the server starts with zero configuration.
///
/// | Flag | Variable | Default | Description |
/// |------|----------|---------|-------------|
/// | `--bind` | `ELUCIDATE_BIND` | `0.0.0.0:4242` | TCP socket address to listen on |
/// | `--data-dir` | `ELUCIDATE_DATA_DIR` | `.elucidate` | Directory holding one JSON file per container |
/// | `--scheme` | `ELUCIDATE_SCHEME` | `http` | Scheme used when minting IRIs |
/// | `--trust-proxy` | `ELUCIDATE_TRUST_PROXY` | `false` | Honour `X-Forwarded-Proto` / `X-Forwarded-Host` |
/// | `--memory` | `ELUCIDATE_MEMORY` | `false` | Keep containers in RAM instead of on disk |
#[derive(Debug, Clone, Parser)]
#[command(name = "elucidate-node", version, about)]
pub struct NodeConfig {
    /// Socket address the server binds to.
    #[arg(long = "bind", env = "ELUCIDATE_BIND", default_value = "0.0.0.0:4242")]
    pub bind_addr: SocketAddr,

    /// Container directory. Relative paths resolve against the working directory.
    #[arg(long, env = "ELUCIDATE_DATA_DIR", default_value = ".elucidate")]
    pub data_dir: PathBuf,

    /// Scheme for minted IRIs when no trusted proxy header says otherwise.
    #[arg(long, env = "ELUCIDATE_SCHEME", default_value = "http")]
    pub scheme: String,

    /// Take scheme and host from `X-Forwarded-*` headers.
    #[arg(long, env = "ELUCIDATE_TRUST_PROXY")]
    pub trust_proxy: bool,

    /// Use the in-memory store (data is lost on restart).
    #[arg(long, env = "ELUCIDATE_MEMORY")]
    pub memory: bool,
}

impl NodeConfig {
    /// Configuration for an in-process node storing under `data_dir`.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 4242)),
            data_dir: data_dir.into(),
            scheme: "http".into(),
            trust_proxy: false,
            memory: false,
        }
    }

    /// `data_dir` made absolute against the current working directory.
    pub fn resolved_data_dir(&self) -> std::io::Result<PathBuf> {
        if self.data_dir.is_absolute() {
            Ok(self.data_dir.clone())
        } else {
            Ok(std::env::current_dir()?.join(&self.data_dir))
        }
    }
}
