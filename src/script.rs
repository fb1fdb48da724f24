//! Edit scripts replayed by the headless binary.
//!
//! A script is a JSON document listing steps in order:
//!
//! ```json
//! {
//!   "resolution": 0.1,
//!   "steps": [
//!     { "op": "activate", "tool": "line" },
//!     { "op": "pointer", "kind": "down", "x": 0.0, "y": 0.0 },
//!     { "op": "finish" }
//!   ]
//! }
//! ```

use std::path::Path;

use bevy::math::DVec2;
use serde::{Deserialize, Serialize};

use crate::common::{Modifiers, PointerEvent, PointerKind};
use crate::constants::DEFAULT_RESOLUTION;
use crate::draw::SnapshotGeometry;
use crate::geometry::FeatureId;
use crate::plugin::{EditRequest, PointerInput};

fn default_resolution() -> f64 {
    DEFAULT_RESOLUTION
}

fn default_tool() -> String {
    "import".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptStep {
    Activate {
        #[serde(default)]
        tool: Option<String>,
    },
    Pointer {
        kind: PointerKind,
        x: f64,
        y: f64,
        /// Overrides the script resolution for this event
        #[serde(default)]
        resolution: Option<f64>,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Press and release at the same spot
    Click {
        x: f64,
        y: f64,
    },
    Finish,
    Cancel,
    Delete,
    Clear,
    RemovePoint,
    Select {
        #[serde(default)]
        feature: Option<u64>,
    },
    Import {
        geometry: SnapshotGeometry,
        #[serde(default = "default_tool")]
        tool: String,
    },
}

/// Input produced by a step, ready to be written as a Bevy message
#[derive(Debug, Clone)]
pub enum ScriptInput {
    Pointer(PointerInput),
    Request(EditRequest),
}

impl ScriptStep {
    pub fn inputs(&self, resolution: f64) -> Vec<ScriptInput> {
        match self {
            ScriptStep::Activate { tool } => vec![ScriptInput::Request(EditRequest::Activate(tool.clone()))],
            ScriptStep::Pointer {
                kind,
                x,
                y,
                resolution: own,
                modifiers,
            } => {
                let event = PointerEvent::new(*kind, DVec2::new(*x, *y), own.unwrap_or(resolution))
                    .with_modifiers(*modifiers);
                vec![ScriptInput::Pointer(PointerInput(event))]
            }
            ScriptStep::Click { x, y } => vec![
                ScriptInput::Pointer(PointerInput(PointerEvent::down(*x, *y, resolution))),
                ScriptInput::Pointer(PointerInput(PointerEvent::up(*x, *y, resolution))),
            ],
            ScriptStep::Finish => vec![ScriptInput::Request(EditRequest::FinishDrawing)],
            ScriptStep::Cancel => vec![ScriptInput::Request(EditRequest::Cancel)],
            ScriptStep::Delete => vec![ScriptInput::Request(EditRequest::DeleteSelected)],
            ScriptStep::Clear => vec![ScriptInput::Request(EditRequest::Clear)],
            ScriptStep::RemovePoint => vec![ScriptInput::Request(EditRequest::RemovePoint)],
            ScriptStep::Select { feature } => {
                vec![ScriptInput::Request(EditRequest::Select(feature.map(FeatureId)))]
            }
            ScriptStep::Import { geometry, tool } => vec![ScriptInput::Request(EditRequest::AddFeature {
                geometry: geometry.to_geometry(),
                tool: tool.clone(),
            })],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayScript {
    /// Map units per pixel for pointer steps
    #[serde(default = "default_resolution")]
    pub resolution: f64,
    pub steps: Vec<ScriptStep>,
}

impl ReplayScript {
    pub fn parse(json: &str) -> Result<Self, String> {
        let script: ReplayScript =
            serde_json::from_str(json).map_err(|e| format!("Invalid script: {}", e))?;
        if !(script.resolution.is_finite() && script.resolution > 0.0) {
            return Err(format!("Invalid script resolution {}", script.resolution));
        }
        Ok(script)
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("Could not read script {:?}: {}", path, e))?;
        Self::parse(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        let script = ReplayScript::parse(
            r#"{
                "resolution": 0.5,
                "steps": [
                    {"op": "activate", "tool": "line"},
                    {"op": "pointer", "kind": "down", "x": 1, "y": 2, "modifiers": {"alt": true}},
                    {"op": "click", "x": 3, "y": 4},
                    {"op": "remove_point"},
                    {"op": "import", "geometry": {"type": "Point", "coordinates": [0, 0]}}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(script.steps.len(), 5);
        assert_eq!(script.steps[3], ScriptStep::RemovePoint);

        let inputs = script.steps[1].inputs(script.resolution);
        let ScriptInput::Pointer(PointerInput(event)) = &inputs[0] else {
            panic!("expected pointer input");
        };
        assert_eq!(event.kind, PointerKind::Down);
        assert_eq!(event.resolution, 0.5);
        assert!(event.modifiers.alt);

        assert_eq!(script.steps[2].inputs(script.resolution).len(), 2);
        let ScriptInput::Request(EditRequest::AddFeature { tool, .. }) =
            &script.steps[4].inputs(script.resolution)[0]
        else {
            panic!("expected import request");
        };
        assert_eq!(tool, "import");
    }

    #[test]
    fn test_default_resolution_and_errors() {
        let script = ReplayScript::parse(r#"{"steps": [{"op": "clear"}]}"#).unwrap();
        assert_eq!(script.resolution, DEFAULT_RESOLUTION);

        assert!(ReplayScript::parse(r#"{"resolution": 0, "steps": []}"#).is_err());
        assert!(ReplayScript::parse(r#"{"steps": [{"op": "explode"}]}"#).is_err());
        assert!(ReplayScript::load(Path::new("/nonexistent/script.json")).is_err());
    }
}
