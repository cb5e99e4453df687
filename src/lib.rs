pub mod achievements;
pub mod block;
pub mod client;
pub mod config;
pub mod qbank;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{ApiClient, ApiError, Transport};
pub use config::Config;
pub use store::{FileStore, KeyValueStore, MemoryStore, ProgressStore};

/// Shown whenever the server gives no message of its own.
pub const GENERIC_FAILURE: &str = "Não foi possível concluir a ação. Tente novamente.";
