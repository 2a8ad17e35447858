//! Configuration file support for the converter.
//!
//! Holds the tunable parts of parsing and tokenization, so they can be
//! stored next to a project and shared between runs.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::label_config::{ConfigParser, DEFAULT_EXCLUDED_OUTPUT_TAGS, DEFAULT_LABEL_TAGS};
use crate::tagging::{PunctuationRule, TreebankTokenizer};

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Converter configuration that can be saved and loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Version of the configuration file format
    #[serde(default = "default_version")]
    pub version: u32,

    /// Label config parser settings
    #[serde(default)]
    pub parser: ParserConfig,

    /// Tokenizer settings
    #[serde(default)]
    pub tokenizer: TokenizerConfig,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

/// Parser section of the config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Tag names that declare label values
    #[serde(default = "default_label_tags")]
    pub label_tags: Vec<String>,

    /// Tag names never treated as output tags
    #[serde(default = "default_excluded_output_tags")]
    pub excluded_output_tags: Vec<String>,
}

fn default_label_tags() -> Vec<String> {
    DEFAULT_LABEL_TAGS.iter().map(|t| t.to_string()).collect()
}

fn default_excluded_output_tags() -> Vec<String> {
    DEFAULT_EXCLUDED_OUTPUT_TAGS
        .iter()
        .map(|t| t.to_string())
        .collect()
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            label_tags: default_label_tags(),
            excluded_output_tags: default_excluded_output_tags(),
        }
    }
}

/// Tokenizer section of the config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizerConfig {
    /// Punctuation substitutions, applied in order
    #[serde(default = "PunctuationRule::defaults")]
    pub punctuation: Vec<PunctuationRule>,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            punctuation: PunctuationRule::defaults(),
        }
    }
}

impl ConverterConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            parser: ParserConfig::default(),
            tokenizer: TokenizerConfig::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    ///
    /// Fails if the file is newer than [`CONFIG_VERSION`] or if any
    /// punctuation rule does not compile.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        config.tokenizer()?;

        Ok(config)
    }

    /// Get the default filename for a saved config.
    pub fn default_filename() -> &'static str {
        "label-converter.json"
    }

    /// Load configuration from a file.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
        }
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Build a label config parser from the parser section.
    pub fn config_parser(&self) -> ConfigParser {
        ConfigParser::new()
            .with_label_tags(&self.parser.label_tags)
            .with_excluded_output_tags(&self.parser.excluded_output_tags)
    }

    /// Build a treebank tokenizer from the tokenizer section.
    pub fn tokenizer(&self) -> Result<TreebankTokenizer, ConfigError> {
        Ok(TreebankTokenizer::with_punctuation(&self.tokenizer.punctuation)?)
    }
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A punctuation rule pattern does not compile
    #[error("Invalid tokenizer pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagging::Tokenizer;

    #[test]
    fn test_defaults_match_parser_defaults() {
        let config = ConverterConfig::new();
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.parser.label_tags, vec!["Label", "Choice"]);
        assert_eq!(config.parser.excluded_output_tags, vec!["Filter"]);
        assert_eq!(config.tokenizer.punctuation, PunctuationRule::defaults());
    }

    #[test]
    fn test_json_roundtrip() {
        let mut config = ConverterConfig::default();
        config.parser.label_tags.push("Option".to_string());

        let json = config.to_json().unwrap();
        let loaded = ConverterConfig::from_json(&json).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let json = r#"{"parser": {"label_tags": ["Option"]}}"#;
        let config = ConverterConfig::from_json(json).unwrap();
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.parser.label_tags, vec!["Option"]);
        assert_eq!(config.parser.excluded_output_tags, vec!["Filter"]);
        assert_eq!(config.tokenizer, TokenizerConfig::default());
    }

    #[test]
    fn test_rejects_newer_version() {
        let json = format!(r#"{{"version": {}}}"#, CONFIG_VERSION + 1);
        let err = ConverterConfig::from_json(&json).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::VersionTooNew {
                file_version,
                supported_version: CONFIG_VERSION,
            } if file_version == CONFIG_VERSION + 1
        ));
    }

    #[test]
    fn test_rejects_invalid_pattern() {
        let json = r#"{"tokenizer": {"punctuation": [{"pattern": "(", "replacement": ""}]}}"#;
        let err = ConverterConfig::from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern(_)));
    }

    #[test]
    fn test_rejects_invalid_json() {
        let err = ConverterConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_config_parser_uses_label_tags() {
        let mut config = ConverterConfig::new();
        config.parser.label_tags = vec!["Option".to_string()];

        let result = config
            .config_parser()
            .parse(
                r#"<View>
                     <Text name="t" value="$t"/>
                     <Choices name="c" toName="t"><Option value="a"/><Choice value="b"/></Choices>
                   </View>"#,
            )
            .unwrap();
        assert_eq!(result.schema.get("c").unwrap().labels, vec!["a"]);
    }

    #[test]
    fn test_custom_tokenizer_rules() {
        let mut config = ConverterConfig::new();
        config.tokenizer.punctuation = vec![PunctuationRule::new("-", " - ")];

        let tokens = config.tokenizer().unwrap().tokenize("well-known");
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["well", "-", "known"]);
        assert_eq!(tokens[2].start, 5);
    }

    #[test]
    fn test_save_and_load_path() {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(ConverterConfig::default_filename());

        let mut config = ConverterConfig::new();
        config.parser.excluded_output_tags.push("Header".to_string());
        config.save_to_path(&path).unwrap();

        let loaded = ConverterConfig::load_from_path(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConverterConfig::load_from_path(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
