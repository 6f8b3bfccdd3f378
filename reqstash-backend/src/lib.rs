//! Traits and structs for reqstash store interaction.
//!
//! The caching client reads and writes values through the [`Backend`]
//! trait. A backend only has to answer two questions: "what is stored
//! under this fingerprint?" and "store this value under this fingerprint".
//! Whether an entry exists is expressed with `Option`, so a missing key is
//! never an error.
//!
//! Implementations shipped with the workspace:
//!
//! | Backend | Crate | Use Case |
//! |---------|-------|----------|
//! | [`MemoryBackend`] | `reqstash-backend` | In-process, tests and local runs |
//! | `RemoteBackend` | `reqstash-remote` | HTTP key-value store service |
mod backend;
mod error;
mod memory;

pub use backend::{Backend, BackendResult};
pub use error::BackendError;
pub use memory::MemoryBackend;
