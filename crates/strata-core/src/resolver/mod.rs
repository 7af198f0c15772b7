//! Layered resolution of configuration keys
//!
//! Values for a key are collected from every overlay (lowest precedence
//! first), deep-merged, and handed back as a [`ConfigValue`](crate::types::ConfigValue).
//! [`Finder`] reads fresh on every call; [`Strata`] caches per key.

mod overlay;
mod merge;
mod finder;
mod store;

pub use overlay::Overlay;
pub use merge::{deep_merge, merge_all};
pub use finder::Finder;
pub use store::Strata;
