//! Actor implementations

pub mod module_host;

pub use module_host::{ModuleHost, ModuleHostArgs};
