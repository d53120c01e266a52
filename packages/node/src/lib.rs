//! Public surface for the `elucidate-node` crate.
//!
//! Exposes the router builder, config, storage backends and protocol
//! operations so that external crates (e.g. the conformance test suite) can
//! spin up an in-process server without spawning a subprocess.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod protocol;
pub mod router;
pub mod storage;

pub use config::NodeConfig;
pub use router::build_router;
pub use storage::{fs::FsStorage, memory::MemoryStorage, Storage};
