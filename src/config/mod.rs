pub mod settings;

use crate::core::TypeFilter;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub last_directory: Option<PathBuf>,
    pub auto_load_last_directory: bool,
    pub output_directory: Option<PathBuf>,
    pub output_filename: String,
    /// The type filters offered to the user, in display order.
    pub type_filters: Vec<TypeFilter>,
    pub default_type_filter: TypeFilter,
    /// Where the folder browsing tree starts.
    pub folder_tree_root: Option<PathBuf>,
    pub folder_tree_depth: usize,
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        settings::load_config(path)
    }

    /// Default location for a saved document.
    pub fn default_output_path(&self) -> PathBuf {
        match &self.output_directory {
            Some(dir) => dir.join(&self.output_filename),
            None => PathBuf::from(&self.output_filename),
        }
    }

    /// Whether `filter` is one of the configured choices.
    pub fn offers_type_filter(&self, filter: &TypeFilter) -> bool {
        self.type_filters.contains(filter)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            last_directory: None,
            auto_load_last_directory: true,
            output_directory: dirs::desktop_dir(),
            output_filename: "parsed_output.txt".to_string(),
            type_filters: TypeFilter::defaults(),
            default_type_filter: TypeFilter::All,
            folder_tree_root: dirs::home_dir(),
            folder_tree_depth: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_offers_closed_filter_set() {
        let config = AppConfig::default();
        assert_eq!(config.type_filters.len(), 4);
        assert!(config.offers_type_filter(&TypeFilter::All));
        assert!(config.offers_type_filter(&".xml".parse().unwrap()));
        assert!(!config.offers_type_filter(&".rs".parse().unwrap()));
    }

    #[test]
    fn test_default_output_path_joins_directory() {
        let config = AppConfig {
            output_directory: Some(PathBuf::from("/tmp/out")),
            output_filename: "doc.txt".to_string(),
            ..Default::default()
        };
        assert_eq!(config.default_output_path(), PathBuf::from("/tmp/out/doc.txt"));

        let config = AppConfig {
            output_directory: None,
            ..config
        };
        assert_eq!(config.default_output_path(), PathBuf::from("doc.txt"));
    }
}
