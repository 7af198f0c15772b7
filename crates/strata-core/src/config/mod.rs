//! Configuration of the resolver
//!
//! - `Configuration`: programmatic builder for roots, overlays, handlers and flags
//! - `ConfigFile`: the same described in YAML (`~/.config/strata/config.yaml`)

mod configuration;
mod file;

pub use configuration::{Configuration, ROOT_OVERLAY};
pub use file::{ConfigFile, RootSpec, OverlaySpec, HandlerSpec};
