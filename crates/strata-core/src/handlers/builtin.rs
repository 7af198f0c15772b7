//! Built-in decoders for YAML, templated YAML and JSON

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::registry::{DecodeResult, Decoder};
use super::template::{self, ProcessEnv};
use crate::types::Value;

/// Parse YAML text, resolving `<<` merge keys
pub fn decode_yaml(content: &str) -> DecodeResult {
    let mut yaml: serde_yaml::Value = serde_yaml::from_str(content)?;
    yaml.apply_merge()?;
    Ok(Value::from(yaml))
}

/// Expand `<%= ENV[...] %>` and `${VAR}` directives from the process
/// environment, then parse YAML
pub fn decode_yaml_template(content: &str) -> DecodeResult {
    let erb = template::expand_erb(content, &ProcessEnv)?;
    let expanded = template::expand(&erb, &ProcessEnv)?;
    decode_yaml(&expanded)
}

/// Parse JSON text
pub fn decode_json(content: &str) -> DecodeResult {
    let json: serde_json::Value = serde_json::from_str(content)?;
    Ok(Value::from(json))
}

/// Built-in content formats, nameable from a declarative config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerFormat {
    Yaml,
    YamlTemplate,
    Json,
}

impl HandlerFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandlerFormat::Yaml => "yaml",
            HandlerFormat::YamlTemplate => "yaml_template",
            HandlerFormat::Json => "json",
        }
    }

    /// The decoder implementing this format
    pub fn decoder(&self) -> Decoder {
        match self {
            HandlerFormat::Yaml => Arc::new(decode_yaml),
            HandlerFormat::YamlTemplate => Arc::new(decode_yaml_template),
            HandlerFormat::Json => Arc::new(decode_json),
        }
    }
}
