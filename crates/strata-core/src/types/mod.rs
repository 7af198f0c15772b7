//! Core value types
//!
//! `Value` is what handlers decode into and what the merge operates on.
//! `ConfigValue` is what callers get back from a lookup.

mod value;
mod resolved;

pub use value::{Value, Mapping};
pub use resolved::{ConfigValue, ConfigHash, ConfigList};
