//! File-format handlers
//!
//! This module provides the extension-keyed decoder registry with:
//! - `HandlerRegistry` holding ordered (extension, decoder) entries
//! - Built-in YAML, templated YAML and JSON decoders
//! - `${VAR}` template expansion used by the `*.erb` handlers

mod registry;
mod builtin;
pub mod template;

pub use registry::{HandlerRegistry, HandlerEntry, Decoder, DecodeResult};
pub use builtin::{HandlerFormat, decode_yaml, decode_yaml_template, decode_json};
