// Cache module for local filesystem caching.
// Persists small JSON documents (the XApp token) between runs.

pub mod paths;
pub mod store;

pub use paths::*;
pub use store::{CachedData, delete, read_cached, write_cached};
