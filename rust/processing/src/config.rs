// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parser configuration.
//!
//! Sent to a worker before parsing. Colour maps and the LOD table let a parse
//! continue the legend of an earlier one so indices and colours stay stable
//! across documents.

use citylite_geometry::{ColorMap, Legend};
use serde::{Deserialize, Serialize};

/// Objects processed between two flushes when nothing else is configured
pub const DEFAULT_CHUNK_SIZE: usize = 2000;

/// Environment variable overriding the chunk size
pub const CHUNK_SIZE_ENV: &str = "CITYLITE_CHUNK_SIZE";

/// Parser configuration; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParserConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_colors: Option<ColorMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_colors: Option<ColorMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lods: Option<Vec<String>>,
}

impl ParserConfig {
    /// Configuration with only the chunk size taken from the environment
    pub fn from_env() -> Self {
        Self {
            chunk_size: std::env::var(CHUNK_SIZE_ENV)
                .ok()
                .and_then(|value| parse_chunk_size(&value)),
            ..Self::default()
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }

    /// Continue the LOD table, object colours and class colours of `legend`
    pub fn seeded_from(legend: &Legend) -> Self {
        Self {
            chunk_size: None,
            object_colors: Some(legend.object_colors.clone()),
            class_colors: Some(legend.class_colors.clone()),
            lods: Some(legend.lods.clone()),
        }
    }

    /// Chunk size to use, if one is set and usable
    pub fn effective_chunk_size(&self) -> Option<usize> {
        self.chunk_size.filter(|&n| n > 0)
    }
}

fn parse_chunk_size(value: &str) -> Option<usize> {
    value.trim().parse().ok().filter(|&n: &usize| n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_partial_config() {
        let config: ParserConfig =
            serde_json::from_str(r#"{ "chunkSize": 500, "lods": ["1", "2"] }"#).unwrap();

        assert_eq!(config.chunk_size, Some(500));
        assert_eq!(config.lods, Some(vec!["1".to_string(), "2".to_string()]));
        assert!(config.object_colors.is_none());
        assert!(config.class_colors.is_none());
    }

    #[test]
    fn test_empty_config() {
        let config: ParserConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ParserConfig::default());
        assert_eq!(serde_json::to_string(&config).unwrap(), "{}");
    }

    #[test]
    fn test_zero_chunk_size_unusable() {
        assert_eq!(ParserConfig::default().with_chunk_size(0).effective_chunk_size(), None);
        assert_eq!(ParserConfig::default().with_chunk_size(7).effective_chunk_size(), Some(7));
    }

    #[test]
    fn test_parse_chunk_size() {
        assert_eq!(parse_chunk_size(" 250 "), Some(250));
        assert_eq!(parse_chunk_size("0"), None);
        assert_eq!(parse_chunk_size("lots"), None);
    }

    #[test]
    fn test_seeded_from_legend() {
        let mut legend = Legend::new();
        legend.object_type_index("Building");
        legend.class_index("flat");
        legend.surface_type_index("RoofSurface");

        let config = ParserConfig::seeded_from(&legend);
        assert_eq!(config.object_colors.as_ref(), Some(&legend.object_colors));
        assert_eq!(config.class_colors.as_ref(), Some(&legend.class_colors));
        assert_eq!(config.lods, Some(Vec::new()));
        assert_eq!(config.chunk_size, None);
    }
}
