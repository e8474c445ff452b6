//! Trait definitions for external collaborators
//!
//! The core only ever touches the remote directory service through
//! [`DirectoryClient`]; everything behind it (transport, auth,
//! pagination, retries) belongs to the implementation.

mod directory;

pub use directory::DirectoryClient;
