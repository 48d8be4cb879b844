#![no_std]

extern crate alloc;

#[macro_use]
pub(crate) mod registry_macros;

pub(crate) mod any;
pub(crate) mod config;
pub(crate) mod entry;
pub(crate) mod errors;
pub(crate) mod loader;
pub(crate) mod post_construct;
pub(crate) mod provider;
pub(crate) mod registry;
pub(crate) mod resolution;
pub(crate) mod service;

pub use any::Value;
pub use config::Config;
pub use errors::{CyclePath, InstantiateErrorKind, LoadErrorKind, ResolveErrorKind};
pub use loader::{MemoryLoader, Script, ScriptLoader};
pub use post_construct::PostConstruct;
pub use provider::Provider;
pub use registry::Registry;
