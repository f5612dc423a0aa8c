use serde::Deserialize;

/// Database configuration
///
/// Builder-style, like the connection settings of a client driver:
///
/// ```
/// use rustjsondb::DbConfig;
///
/// let config = DbConfig::new().debug(true).case_sensitive(true);
/// assert!(config.debug);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DbConfig {
    /// Emit DEBUG events with timing and parameters for every operation
    pub debug: bool,

    /// Compare strings exactly for `=` / `!=` instead of ignoring case
    pub case_sensitive: bool,

    /// File extension of table blobs, without the dot
    pub extension: String,
}

impl DbConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Parse a JSON settings document, e.g. `{"debug": true, "caseSensitive": false}`.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            debug: false,
            case_sensitive: false,
            extension: "json".to_string(),
        }
    }
}
