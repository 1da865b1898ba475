// src/registry/mod.rs
mod endpoint;
mod store;

pub use endpoint::{Endpoint, DEFAULT_SSL_THRESHOLD_DAYS};
pub use store::{duplicate_names, parse_url, Registry, RegistryError, REGISTRY_HEADER};
