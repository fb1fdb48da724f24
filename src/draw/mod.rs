//! Drawing orchestration: tool activation, selection, snapping and export.
//!
//! [`DrawingOrchestrator`] owns the feature collection and routes the pointer
//! stream to exactly one consumer at a time:
//!
//! - **Draw tool active**: every press adds a (snapped) vertex to the [`Sketch`];
//!   selection and modification are suspended.
//! - **Otherwise**: the [`Modifier`] (tracking the selected feature) gets the
//!   event first; presses it does not consume fall through to the select tool.
//!
//! ## Module Structure
//!
//! - [`registry`] - Named draw tools built from [`EditorConfig`]
//! - [`sketch`] - Per-kind vertex accumulation and completion
//! - [`select`] - Click classification and feature picking
//! - [`snap`] - Vertex/edge snapping against all features
//! - [`snapshot`] - Serializable export of the current features

mod events;
mod registry;
mod select;
mod sketch;
mod snap;
mod snapshot;


use bevy::log::{debug, info};
use bevy::prelude::Resource;

use crate::common::{PointerEvent, PointerKind};
use crate::config::EditorConfig;
use crate::geometry::{FeatureCollection, FeatureId, Geometry};
use crate::modify::Modifier;

pub use events::EditEvent;
pub use registry::ToolRegistry;
pub use select::{pick_feature, SelectTool, CLICK_THRESHOLD_PIXELS};
pub use sketch::{Sketch, SketchStep};
pub use snap::SnapHelper;
pub use snapshot::{Position, Snapshot, SnapshotFeature, SnapshotGeometry};

#[derive(Resource)]
pub struct DrawingOrchestrator {
    registry: ToolRegistry,
    features: FeatureCollection,
    modifier: Modifier,
    snap: SnapHelper,
    select: SelectTool,
    sketch: Option<Sketch>,
    selected: Option<FeatureId>,
    pixel_tolerance: f64,
    circle_segments: usize,
    events: Vec<EditEvent>,
}

impl Default for DrawingOrchestrator {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl DrawingOrchestrator {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            registry: ToolRegistry::from_config(config),
            features: FeatureCollection::default(),
            modifier: Modifier::new(config.pixel_tolerance),
            snap: SnapHelper::new(config.snapping, config.snap_tolerance),
            select: SelectTool::default(),
            sketch: None,
            selected: None,
            pixel_tolerance: config.pixel_tolerance,
            circle_segments: config.circle_segments,
            events: Vec::new(),
        }
    }

    pub fn features(&self) -> &FeatureCollection {
        &self.features
    }

    pub fn selected(&self) -> Option<FeatureId> {
        self.selected
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn modifier(&self) -> &Modifier {
        &self.modifier
    }

    pub fn sketch(&self) -> Option<&Sketch> {
        self.sketch.as_ref()
    }

    /// Name of the active draw tool, `None` while selecting/modifying
    pub fn active_tool(&self) -> Option<&str> {
        self.sketch.as_ref().map(Sketch::tool)
    }

    /// Take the notifications emitted since the last call
    pub fn drain_events(&mut self) -> Vec<EditEvent> {
        std::mem::take(&mut self.events)
    }

    /// Activate a draw tool by name, or deactivate drawing with `None`.
    ///
    /// Unknown names are refused and leave the current tool active.
    pub fn activate(&mut self, tool: Option<&str>) -> bool {
        let Some(name) = tool else {
            if let Some(sketch) = self.sketch.take() {
                info!("Deactivated draw tool '{}'", sketch.tool());
            }
            return true;
        };
        let Some(config) = self.registry.get(name) else {
            debug!("Ignoring activation of unknown tool '{}'", name);
            return false;
        };

        self.sketch = Some(Sketch::new(name, config.clone()));
        self.cancel_modify();
        self.select.reset();
        info!("Activated draw tool '{}'", name);
        true
    }

    /// Feed one pointer event. Returns whether an editing operation consumed it.
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> bool {
        let consumed = if self.sketch.is_some() {
            self.sketch_pointer(event)
        } else {
            self.edit_pointer(event)
        };
        self.collect_modify_events();
        consumed
    }

    fn sketch_pointer(&mut self, event: &PointerEvent) -> bool {
        if event.kind != PointerKind::Down {
            return true;
        }
        let point = self
            .snap
            .snap(&self.features, event.coordinate, event.resolution, &[])
            .unwrap_or(event.coordinate);
        let tolerance = event.resolution * self.pixel_tolerance;

        let Some(sketch) = &mut self.sketch else {
            return false;
        };
        match sketch.add_point(point, tolerance) {
            SketchStep::Continue => {}
            SketchStep::Finished(geometry) => {
                let tool = sketch.tool().to_string();
                self.complete_draw(geometry, &tool);
            }
        }
        true
    }

    fn edit_pointer(&mut self, event: &PointerEvent) -> bool {
        let mut event = *event;
        if event.kind == PointerKind::Move && !self.modifier.session().is_idle() {
            let exclude = self.modifier.session().batch().to_vec();
            if let Some(snapped) = self.snap.snap(&self.features, event.coordinate, event.resolution, &exclude) {
                event = event.at(snapped);
            }
        }

        let consumed = self.modifier.handle_pointer(&mut self.features, &event);
        match event.kind {
            PointerKind::Down if consumed => self.select.reset(),
            PointerKind::Down => self.select.press(event.pixel),
            PointerKind::Up if !consumed && self.select.release(event.pixel) => {
                let picked = pick_feature(
                    self.snap.index(),
                    &self.features,
                    event.coordinate,
                    event.resolution,
                    self.pixel_tolerance,
                );
                self.select(picked);
            }
            _ => {}
        }
        consumed
    }

    fn complete_draw(&mut self, geometry: Geometry, tool: &str) {
        let id = self.features.insert(geometry, self.registry.tags_for(tool));
        if let Some(feature) = self.features.get(id) {
            self.snap.add_feature(feature);
        }
        self.sketch = None;
        info!("Drew '{}' feature {:?}", tool, id);
        self.events.push(EditEvent::DrawEnd(id));
        self.select(Some(id));
    }

    /// Finish the active sketch with the vertices placed so far
    pub fn finish_drawing(&mut self) -> bool {
        let Some(sketch) = &mut self.sketch else {
            return false;
        };
        let Some(geometry) = sketch.finish() else {
            debug!("Sketch for '{}' below its minimum point count", sketch.tool());
            return false;
        };
        let tool = sketch.tool().to_string();
        self.complete_draw(geometry, &tool);
        true
    }

    /// Escape: drop the sketch vertices, or abort the current drag
    pub fn cancel(&mut self) -> bool {
        if let Some(sketch) = &mut self.sketch
            && !sketch.is_empty()
        {
            sketch.reset();
            return true;
        }
        let cancelled = self.modifier.cancel(&mut self.features);
        self.collect_modify_events();
        cancelled
    }

    /// Select a feature (hands it to the modifier) or clear the selection.
    ///
    /// Returns `false` for unknown ids.
    pub fn select(&mut self, id: Option<FeatureId>) -> bool {
        if let Some(id) = id
            && self.features.get(id).is_none()
        {
            debug!("Ignoring selection of unknown feature {:?}", id);
            return false;
        }
        if id == self.selected {
            return true;
        }

        self.cancel_modify();
        self.modifier.clear();
        if let Some(feature) = id.and_then(|id| self.features.get(id)) {
            self.modifier.add_feature(feature);
        }
        self.selected = id;
        self.events.push(EditEvent::SelectionChange(id));
        true
    }

    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.selected else {
            return false;
        };
        self.cancel_modify();
        self.modifier.remove_feature(id);
        self.snap.remove_feature(id);
        self.features.remove(id);
        self.selected = None;
        info!("Deleted feature {:?}", id);
        self.events.push(EditEvent::SelectionChange(None));
        true
    }

    pub fn clear(&mut self) {
        self.cancel_modify();
        self.features.clear();
        self.modifier.clear();
        self.snap.clear();
        self.select.reset();
        if let Some(sketch) = &mut self.sketch {
            sketch.reset();
        }
        if self.selected.take().is_some() {
            self.events.push(EditEvent::SelectionChange(None));
        }
        info!("Cleared all features");
        self.events.push(EditEvent::Clear);
    }

    pub fn create_snapshot(&self) -> Snapshot {
        Snapshot::from_features(&self.features, self.circle_segments)
    }

    /// Store an externally supplied geometry tagged as if drawn by `tool`; not selected
    pub fn add_feature(&mut self, geometry: Geometry, tool: &str) -> FeatureId {
        let id = self.features.insert(geometry, self.registry.tags_for(tool));
        if let Some(feature) = self.features.get(id) {
            self.snap.add_feature(feature);
        }
        debug!("Imported '{}' feature {:?}", tool, id);
        id
    }

    /// Replace a feature's geometry wholesale and re-index it
    pub fn set_geometry(&mut self, id: FeatureId, geometry: Geometry) -> bool {
        if self.features.get(id).is_none() {
            return false;
        }
        if self.modifier.session().batch().contains(&id) {
            self.cancel_modify();
        }
        if let Some(feature) = self.features.get_mut(id) {
            feature.geometry = geometry;
        }
        let Some(feature) = self.features.get(id) else {
            return false;
        };
        if self.modifier.is_tracking(id) || self.selected == Some(id) {
            self.modifier.remove_feature(id);
            self.modifier.add_feature(feature);
        }
        self.snap.add_feature(feature);
        true
    }

    /// Replace a feature's properties, template keys included
    pub fn set_properties(
        &mut self,
        id: FeatureId,
        properties: serde_json::Map<String, serde_json::Value>,
    ) -> bool {
        let Some(feature) = self.features.get_mut(id) else {
            return false;
        };
        feature.tags.properties = properties;
        true
    }

    /// Remove the vertex under the marker of the selected feature
    pub fn remove_point(&mut self) -> bool {
        let removed = self.modifier.remove_point(&mut self.features);
        self.collect_modify_events();
        removed
    }

    /// Whether [`Self::remove_point`] would change anything
    pub fn removable(&self) -> bool {
        self.modifier.removable(&self.features)
    }

    fn cancel_modify(&mut self) {
        self.modifier.cancel(&mut self.features);
        self.collect_modify_events();
    }

    fn collect_modify_events(&mut self) {
        for event in self.modifier.drain_events() {
            for id in event.features() {
                if let Some(feature) = self.features.get(*id) {
                    self.snap.add_feature(feature);
                }
            }
            self.events.push(event.into());
        }
    }
}
