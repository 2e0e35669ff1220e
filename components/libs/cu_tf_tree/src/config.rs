//! Buffer configuration, serialized in the RON format.
//!
//! ```ron
//! (
//!     max_transform_history: Some(1000),
//!     save_path: "/tmp/tf",
//! )
//! ```

use crate::error::{TfError, TfResult};
use ron::extensions::Extensions;
use ron::Options;
use serde::{Deserialize, Serialize};
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Samples kept per dynamic edge, oldest dropped first. `None` keeps everything.
    pub max_transform_history: Option<usize>,
    /// Where `save_visualization` writes graph.dot / graph.pdf.
    pub save_path: PathBuf,
}

impl Default for BufferConfig {
    fn default() -> Self {
        BufferConfig {
            max_transform_history: None,
            save_path: std::env::temp_dir(),
        }
    }
}

fn get_options() -> Options {
    Options::default()
        .with_default_extension(Extensions::IMPLICIT_SOME)
        .with_default_extension(Extensions::UNWRAP_NEWTYPES)
}

impl BufferConfig {
    pub fn serialize_ron(&self) -> TfResult<String> {
        let pretty = ron::ser::PrettyConfig::default();
        get_options()
            .to_string_pretty(self, pretty)
            .map_err(|e| TfError::Config(e.to_string()))
    }

    pub fn deserialize_ron(ron: &str) -> TfResult<Self> {
        get_options()
            .from_str(ron)
            .map_err(|e| TfError::Config(format!("syntax error in config: {e}")))
    }
}

/// Read a buffer configuration from a file.
pub fn read_configuration(config_filename: impl AsRef<Path>) -> TfResult<BufferConfig> {
    let path = config_filename.as_ref();
    let content = read_to_string(path).map_err(|e| {
        TfError::Config(format!(
            "failed to read configuration file {}: {e}",
            path.display()
        ))
    })?;
    BufferConfig::deserialize_ron(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = BufferConfig::default();
        assert_eq!(config.max_transform_history, None);
        assert_eq!(config.save_path, std::env::temp_dir());
    }

    #[test]
    fn test_partial_config() {
        let config = BufferConfig::deserialize_ron("(max_transform_history: 10)").unwrap();
        assert_eq!(config.max_transform_history, Some(10));
        assert_eq!(config.save_path, std::env::temp_dir());

        let config = BufferConfig::deserialize_ron("(save_path: \"/var/tf\")").unwrap();
        assert_eq!(config.max_transform_history, None);
        assert_eq!(config.save_path, PathBuf::from("/var/tf"));
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = BufferConfig {
            max_transform_history: Some(1000),
            save_path: PathBuf::from("/tmp/tf"),
        };
        let text = config.serialize_ron().unwrap();
        assert_eq!(BufferConfig::deserialize_ron(&text).unwrap(), config);
    }

    #[test]
    fn test_syntax_error() {
        assert!(matches!(
            BufferConfig::deserialize_ron("(max_transform_history: [)"),
            Err(TfError::Config(_))
        ));
    }

    #[test]
    fn test_read_configuration() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "(max_transform_history: Some(5))").unwrap();
        let config = read_configuration(file.path()).unwrap();
        assert_eq!(config.max_transform_history, Some(5));

        assert!(matches!(
            read_configuration("/definitely/not/here.ron"),
            Err(TfError::Config(_))
        ));
    }
}
