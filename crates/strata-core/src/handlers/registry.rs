//! Ordered registry of file-extension handlers

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use super::builtin::HandlerFormat;
use crate::types::Value;

/// Result of decoding raw content
pub type DecodeResult = Result<Value, Box<dyn std::error::Error + Send + Sync>>;

/// Decode function: raw content to a structured value
pub type Decoder = Arc<dyn Fn(&str) -> DecodeResult + Send + Sync>;

/// One registered (extension, decoder) pair
#[derive(Clone)]
pub struct HandlerEntry {
    /// Extension without the leading dot, e.g. `yml.erb`
    pub extension: String,
    pub decoder: Decoder,
}

impl HandlerEntry {
    /// Whether `filename` ends in `.<extension>`
    pub fn matches(&self, filename: &str) -> bool {
        filename
            .strip_suffix(self.extension.as_str())
            .is_some_and(|rest| rest.ends_with('.'))
    }
}

impl std::fmt::Debug for HandlerEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerEntry")
            .field("extension", &self.extension)
            .finish()
    }
}

/// Process-wide registry for callers that want every configuration to share handlers
static SHARED: Lazy<HandlerRegistry> = Lazy::new(HandlerRegistry::with_defaults);

/// Ordered list of handlers
///
/// Entries are only ever appended. Lookups scan in registration order and the
/// first matching extension wins, so registering an extension a second time
/// never overrides the first registration.
///
/// The registry is a shared handle: clones see the same entries. Every root
/// built by a [`Configuration`](crate::config::Configuration) holds a clone of
/// the configuration's registry.
///
/// # Example
///
/// ```
/// use strata_core::handlers::HandlerRegistry;
/// use strata_core::types::Value;
///
/// let registry = HandlerRegistry::with_defaults();
/// registry.register(["txt"], |body: &str| Ok(Value::from(body.trim())));
///
/// assert!(registry.decoder_for("motd.txt").is_some());
/// assert!(registry.decoder_for("motd.ini").is_none());
/// ```
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    entries: Arc<RwLock<Vec<HandlerEntry>>>,
}

impl HandlerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the default handlers
    ///
    /// `yml`/`yaml` parse YAML, `yml.erb`/`yaml.erb` expand templates then
    /// parse YAML, and `json` parses JSON.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register_format(["yml", "yaml"], HandlerFormat::Yaml);
        registry.register_format(["yml.erb", "yaml.erb"], HandlerFormat::YamlTemplate);
        registry.register_format(["json"], HandlerFormat::Json);
        registry
    }

    /// Handle to the process-wide registry
    pub fn shared() -> Self {
        SHARED.clone()
    }

    /// Append one entry per extension, all sharing `decoder`
    pub fn register<I, S, F>(&self, extensions: I, decoder: F)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&str) -> DecodeResult + Send + Sync + 'static,
    {
        self.register_decoder(extensions, Arc::new(decoder));
    }

    /// Append one entry per extension for an already shared decoder
    pub fn register_decoder<I, S>(&self, extensions: I, decoder: Decoder)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entries = self.entries.write();
        for extension in extensions {
            let extension = extension.into();
            tracing::trace!(extension = %extension, "registering handler");
            entries.push(HandlerEntry {
                extension,
                decoder: decoder.clone(),
            });
        }
    }

    /// Append entries for a built-in format
    pub fn register_format<I, S>(&self, extensions: I, format: HandlerFormat)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.register_decoder(extensions, format.decoder());
    }

    /// First entry (in registration order) whose extension matches `filename`
    pub fn entry_for(&self, filename: &str) -> Option<HandlerEntry> {
        self.entries
            .read()
            .iter()
            .find(|entry| entry.matches(filename))
            .cloned()
    }

    /// Decoder for `filename`, or `None` if no extension matches
    pub fn decoder_for(&self, filename: &str) -> Option<Decoder> {
        self.entry_for(filename).map(|entry| entry.decoder)
    }

    /// Strip the longest matching registered extension from `filename`
    ///
    /// `app.yml.erb` yields `app` even if a bare `erb` handler exists.
    pub fn strip_extension<'a>(&self, filename: &'a str) -> Option<&'a str> {
        self.entries
            .read()
            .iter()
            .filter(|entry| entry.matches(filename))
            .map(|entry| entry.extension.len())
            .max()
            .map(|len| &filename[..filename.len() - len - 1])
    }

    /// Registered extensions in registration order, without duplicates
    pub fn extensions(&self) -> Vec<String> {
        let entries = self.entries.read();
        let mut seen = indexmap::IndexSet::with_capacity(entries.len());
        for entry in entries.iter() {
            seen.insert(entry.extension.clone());
        }
        seen.into_iter().collect()
    }

    /// Snapshot of all entries, duplicates included
    pub fn entries(&self) -> Vec<HandlerEntry> {
        self.entries.read().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Whether both handles point at the same registry
    pub fn same_registry(&self, other: &HandlerRegistry) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let extensions: Vec<String> = self
            .entries
            .read()
            .iter()
            .map(|entry| entry.extension.clone())
            .collect();
        f.debug_struct("HandlerRegistry")
            .field("extensions", &extensions)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(value: i64) -> impl Fn(&str) -> DecodeResult + Send + Sync + 'static {
        move |_| Ok(Value::Integer(value))
    }

    #[test]
    fn test_default_extensions() {
        let registry = HandlerRegistry::with_defaults();
        assert_eq!(
            registry.extensions(),
            vec!["yml", "yaml", "yml.erb", "yaml.erb", "json"]
        );
    }

    #[test]
    fn test_suffix_matching() {
        let registry = HandlerRegistry::with_defaults();

        let entry = registry.entry_for("config/foo.yml").unwrap();
        assert_eq!(entry.extension, "yml");

        let entry = registry.entry_for("foo.yaml.erb").unwrap();
        assert_eq!(entry.extension, "yaml.erb");

        assert!(registry.entry_for("foo.toml").is_none());
        // Needs the dot: `fooyml` is not a `yml` file
        assert!(registry.entry_for("fooyml").is_none());
    }

    #[test]
    fn test_strip_extension_prefers_longest() {
        let registry = HandlerRegistry::new();
        registry.register(["erb"], constant(0));
        registry.register(["yml.erb", "yml"], constant(1));

        assert_eq!(registry.strip_extension("app.yml.erb"), Some("app"));
        assert_eq!(registry.strip_extension("app.yml"), Some("app"));
        assert_eq!(registry.strip_extension("db.primary.yml"), Some("db.primary"));
        assert_eq!(registry.strip_extension("app.toml"), None);
    }

    #[test]
    fn test_first_registration_wins() {
        let registry = HandlerRegistry::new();
        registry.register(["conf"], constant(1));
        registry.register(["conf"], constant(2));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.extensions(), vec!["conf"]);

        let decoder = registry.decoder_for("app.conf").unwrap();
        assert_eq!(decoder("").unwrap(), Value::Integer(1));
    }

    #[test]
    fn test_clones_share_entries() {
        let registry = HandlerRegistry::new();
        let clone = registry.clone();
        clone.register(["ini"], constant(0));

        assert!(registry.same_registry(&clone));
        assert!(registry.decoder_for("a.ini").is_some());
        assert!(!registry.same_registry(&HandlerRegistry::new()));
    }

    #[test]
    fn test_shared_registry_is_process_wide() {
        let a = HandlerRegistry::shared();
        let b = HandlerRegistry::shared();
        assert!(a.same_registry(&b));
        assert!(a.decoder_for("x.json").is_some());
    }
}
