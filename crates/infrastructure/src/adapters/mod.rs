//! Adapters for application ports that need no I/O of their own.

mod discovery;

pub use discovery::UrlPatternDiscovery;
