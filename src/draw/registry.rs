//! Named draw tools, read-only once the orchestrator is built.

use std::collections::BTreeMap;

use crate::config::{EditorConfig, ToolConfig};
use crate::geometry::{FeatureTags, GeometryType};

#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, ToolConfig>,
}

impl ToolRegistry {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            tools: config.tools.clone(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ToolConfig> {
        self.tools.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    /// Tools drawing the given geometry kind
    pub fn tools_for(&self, geometry: GeometryType) -> Vec<&str> {
        self.tools
            .iter()
            .filter(|(_, tool)| tool.geometry == geometry)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Tags for a feature created by `name`; unknown tools get the default style
    pub fn tags_for(&self, name: &str) -> FeatureTags {
        match self.tools.get(name) {
            Some(tool) => FeatureTags {
                feature_type: name.to_string(),
                style: tool.style.clone(),
                properties: tool.properties.clone(),
            },
            None => FeatureTags {
                feature_type: name.to_string(),
                ..Default::default()
            },
        }
    }
}
