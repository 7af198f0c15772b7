//! Template expansion for `*.erb` config files
//!
//! Raw file content is expanded before it reaches the YAML parser:
//!
//! - `${VAR}` is replaced with the value of `VAR`; an unset variable is an error
//! - `${VAR:-default}` falls back to `default` when `VAR` is unset
//! - `$$` produces a literal `$`
//!
//! Anything else (a lone `$`, an unclosed `${`) is kept as written.
//!
//! ERB-style environment lookups are expanded first by [`expand_erb`]:
//!
//! - `<%= ENV['VAR'] %>` renders `VAR`, or nothing when unset
//! - `<%= ENV.fetch('VAR') %>` renders `VAR`; an unset variable is an error
//! - `<%= ENV.fetch('VAR', 'default') %>` falls back to `default`
//! - `<%# ... %>` is a comment, `<%%` a literal `<%`, and `-%>` drops the
//!   newline that follows
//!
//! Any other directive is rejected so unevaluated template code never ends up
//! in a config value.

use std::borrow::Cow;
use std::collections::HashMap;

use thiserror::Error;

/// Errors raised while expanding a template
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("environment variable `{0}` is not set")]
    MissingVariable(String),

    #[error("unsupported template directive `<%{0}%>`")]
    UnsupportedDirective(String),

    #[error("unclosed template directive starting at byte {0}")]
    UnclosedDirective(usize),
}

/// Where template variables are looked up
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// The process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// Expand `${...}` directives in `input`
///
/// Returns the input unchanged (borrowed) when it has no directives.
pub fn expand<'a>(input: &'a str, env: &dyn EnvSource) -> Result<Cow<'a, str>, TemplateError> {
    if !input.contains('$') {
        return Ok(Cow::Borrowed(input));
    }

    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        match chars.peek() {
            Some('$') => {
                chars.next();
                result.push('$');
            }
            Some('{') => {
                chars.next();

                let mut var_name = String::new();
                let mut default_value: Option<String> = None;
                let mut closed = false;

                while let Some(ch) = chars.next() {
                    match ch {
                        '}' => {
                            closed = true;
                            break;
                        }
                        ':' if chars.peek() == Some(&'-') => {
                            chars.next();
                            let mut default = String::new();
                            for dch in chars.by_ref() {
                                if dch == '}' {
                                    closed = true;
                                    break;
                                }
                                default.push(dch);
                            }
                            default_value = Some(default);
                            break;
                        }
                        _ => var_name.push(ch),
                    }
                }

                if !closed {
                    result.push_str("${");
                    result.push_str(&var_name);
                    if let Some(default) = default_value {
                        result.push_str(":-");
                        result.push_str(&default);
                    }
                    continue;
                }

                match (env.get(&var_name), default_value) {
                    (Some(value), _) => result.push_str(&value),
                    (None, Some(default)) => result.push_str(&default),
                    (None, None) => return Err(TemplateError::MissingVariable(var_name)),
                }
            }
            _ => result.push('$'),
        }
    }

    Ok(Cow::Owned(result))
}

/// Expand `<%= ENV[...] %>` directives in `input`
///
/// Returns the input unchanged (borrowed) when it has no directives.
pub fn expand_erb<'a>(input: &'a str, env: &dyn EnvSource) -> Result<Cow<'a, str>, TemplateError> {
    if !input.contains("<%") {
        return Ok(Cow::Borrowed(input));
    }

    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("<%") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        if let Some(literal) = after.strip_prefix('%') {
            result.push_str("<%");
            rest = literal;
            continue;
        }

        let offset = input.len() - rest.len() + start;
        let end = after
            .find("%>")
            .ok_or(TemplateError::UnclosedDirective(offset))?;
        let body = &after[..end];
        rest = &after[end + 2..];

        let body = match body.strip_suffix('-') {
            Some(trimmed) => {
                rest = rest.strip_prefix('\n').unwrap_or(rest);
                trimmed
            }
            None => body,
        };
        let body = body.strip_prefix('-').unwrap_or(body);

        if body.starts_with('#') {
            continue;
        }
        let Some(expression) = body.strip_prefix('=') else {
            return Err(TemplateError::UnsupportedDirective(body.to_string()));
        };
        result.push_str(&eval_env(expression.trim(), env)?);
    }

    result.push_str(rest);
    Ok(Cow::Owned(result))
}

fn eval_env(expression: &str, env: &dyn EnvSource) -> Result<String, TemplateError> {
    let unsupported = || TemplateError::UnsupportedDirective(format!("= {expression} "));

    if let Some(index) = expression
        .strip_prefix("ENV[")
        .and_then(|rest| rest.strip_suffix(']'))
    {
        let name = unquote(index).ok_or_else(unsupported)?;
        return Ok(env.get(name).unwrap_or_default());
    }

    let args = expression
        .strip_prefix("ENV.fetch(")
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(unsupported)?;
    let (name, default) = match args.split_once(',') {
        Some((name, default)) => (name, Some(default.trim())),
        None => (args, None),
    };
    let name = unquote(name).ok_or_else(unsupported)?;

    match (env.get(name), default) {
        (Some(value), _) => Ok(value),
        (None, Some(default)) => Ok(unquote(default).unwrap_or(default).to_string()),
        (None, None) => Err(TemplateError::MissingVariable(name.to_string())),
    }
}

/// Contents of a single- or double-quoted string literal
fn unquote(literal: &str) -> Option<&str> {
    let literal = literal.trim();
    ['\'', '"'].into_iter().find_map(|quote| {
        literal
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
    })
}
