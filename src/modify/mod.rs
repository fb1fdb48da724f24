//! Vertex modification engine.
//!
//! Turns a pointer event stream into vertex drags, insertions and removals on
//! the features it tracks, keeping its [`SegmentIndex`] in sync and emitting
//! one start/end [`ModifyEvent`] pair per modification.
//!
//! ## Module Structure
//!
//! - [`hit_test`] - Pixel-tolerant vertex/segment hit testing
//! - [`marker`] - The transient [`VertexMarker`]
//! - [`drag`] - [`DragSession`] state machine and per-tick rewrite
//! - [`vertex`] - Vertex insert/remove with renumbering
//! - [`events`] - [`ModifyEvent`] lifecycle notifications
//!
//! ## Pointer Handling
//!
//! - **Down on a vertex**: arms a drag of every record touching the vertex
//! - **Down on a vertex + Alt**: removes the vertex
//! - **Down on a segment**: inserts a vertex there and starts dragging it
//! - **Move**: hovers (updates the marker) or drags
//! - **Up**: ends the drag; a click without movement changes nothing

mod drag;
mod events;
mod marker;
mod vertex;


use bevy::log::{debug, info};

use crate::common::{PointerEvent, PointerKind};
use crate::constants::DEFAULT_PIXEL_TOLERANCE;
use crate::geometry::{Coordinate, Feature, FeatureCollection, FeatureId};
use crate::index::{verify_feature, write_feature, DragSide, SegmentIndex};

pub use drag::{apply_drag, ActiveDrag, DragHandle, DragSession};
pub use events::ModifyEvent;
pub use hit_test::{hit_test, Hit, HitKind};
pub use marker::VertexMarker;
pub use vertex::{
    can_remove_vertex, insert_vertex, remove_vertex, MIN_LINE_COORDINATES, MIN_RING_COORDINATES,
};

pub struct Modifier {
    index: SegmentIndex,
    pixel_tolerance: f64,
    marker: Option<VertexMarker>,
    session: DragSession,
    events: Vec<ModifyEvent>,
}

impl Default for Modifier {
    fn default() -> Self {
        Self::new(DEFAULT_PIXEL_TOLERANCE)
    }
}

impl Modifier {
    pub fn new(pixel_tolerance: f64) -> Self {
        Self {
            index: SegmentIndex::new(),
            pixel_tolerance,
            marker: None,
            session: DragSession::Idle,
            events: Vec::new(),
        }
    }

    /// Start tracking a feature (or re-derive it after a wholesale geometry change)
    pub fn add_feature(&mut self, feature: &Feature) {
        write_feature(&mut self.index, feature);
    }

    /// Stop tracking a feature
    pub fn remove_feature(&mut self, id: FeatureId) {
        self.index.remove_feature(id);
        if self
            .marker
            .as_ref()
            .is_some_and(|marker| marker.owners.iter().any(|(f, _)| *f == id))
        {
            self.marker = None;
        }
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.marker = None;
        self.session = DragSession::Idle;
    }

    pub fn is_tracking(&self, id: FeatureId) -> bool {
        self.index.contains_feature(id)
    }

    pub fn index(&self) -> &SegmentIndex {
        &self.index
    }

    pub fn marker(&self) -> Option<&VertexMarker> {
        self.marker.as_ref()
    }

    pub fn session(&self) -> &DragSession {
        &self.session
    }

    pub fn pixel_tolerance(&self) -> f64 {
        self.pixel_tolerance
    }

    /// Take the notifications emitted since the last call
    pub fn drain_events(&mut self) -> Vec<ModifyEvent> {
        std::mem::take(&mut self.events)
    }

    /// Feed one pointer event. Returns `true` when the event was consumed by a
    /// vertex operation and should not reach other tools.
    pub fn handle_pointer(&mut self, features: &mut FeatureCollection, event: &PointerEvent) -> bool {
        match event.kind {
            PointerKind::Down => self.pointer_down(features, event),
            PointerKind::Move => self.pointer_move(features, event),
            PointerKind::Up => self.pointer_up(features, event),
        }
    }

    fn hover(&mut self, features: &FeatureCollection, coordinate: Coordinate, resolution: f64) {
        self.marker = hit_test(&self.index, features, coordinate, resolution, self.pixel_tolerance)
            .map(|hit| VertexMarker::from_hit(hit, &self.index));
    }

    fn pointer_down(&mut self, features: &mut FeatureCollection, event: &PointerEvent) -> bool {
        if !self.session.is_idle() {
            // Drags own the pointer until release
            return true;
        }

        let Some(hit) = hit_test(
            &self.index,
            features,
            event.coordinate,
            event.resolution,
            self.pixel_tolerance,
        ) else {
            self.marker = None;
            return false;
        };

        let kind = hit.kind;
        match kind {
            HitKind::Vertex if event.modifiers.alt => {
                let modified = remove_vertex(&mut self.index, features, &hit.vertex_segments);
                if !modified.is_empty() {
                    self.notify_pair(features, modified);
                }
                self.hover(features, event.coordinate, event.resolution);
                true
            }
            HitKind::Vertex => {
                let handles: Vec<DragHandle> = hit
                    .vertex_segments
                    .iter()
                    .map(|(segment, side)| DragHandle {
                        segment: *segment,
                        side: *side,
                    })
                    .collect();
                let owners = self.owners_of(&handles);
                self.session = DragSession::Armed(ActiveDrag::capture(handles, &owners, features));
                self.marker = Some(VertexMarker::from_hit(hit, &self.index));
                true
            }
            HitKind::Segment => self.insert_and_grab(features, hit, event.resolution),
        }
    }

    fn insert_and_grab(&mut self, features: &mut FeatureCollection, hit: Hit, resolution: f64) -> bool {
        let owners: Vec<FeatureId> = hit
            .edge_segments
            .iter()
            .filter_map(|id| self.index.get(*id).map(|record| record.feature))
            .collect();
        let mut drag = ActiveDrag::capture(Vec::new(), &owners, features);

        for segment in &hit.edge_segments {
            if let Some((left, right)) = insert_vertex(&mut self.index, features, *segment, hit.position) {
                drag.handles.push(DragHandle {
                    segment: left,
                    side: DragSide::End,
                });
                drag.handles.push(DragHandle {
                    segment: right,
                    side: DragSide::Start,
                });
            }
        }
        if drag.handles.is_empty() {
            return false;
        }

        debug!("Inserted vertex at {:?} into {} segments", hit.position, drag.handles.len() / 2);
        self.events.push(ModifyEvent::Start {
            features: drag.features.clone(),
        });
        self.verify_batch(features, &drag.features);
        self.hover(features, hit.position, resolution);
        self.session = DragSession::Dragging(drag);
        true
    }

    fn pointer_move(&mut self, features: &mut FeatureCollection, event: &PointerEvent) -> bool {
        let drag = match self.session.take() {
            DragSession::Idle => {
                self.hover(features, event.coordinate, event.resolution);
                return false;
            }
            DragSession::Armed(drag) => {
                self.events.push(ModifyEvent::Start {
                    features: drag.features.clone(),
                });
                drag
            }
            DragSession::Dragging(drag) => drag,
        };

        apply_drag(&mut self.index, features, &drag.handles, event.coordinate);
        if let Some(marker) = &mut self.marker {
            marker.position = event.coordinate;
        }
        self.session = DragSession::Dragging(drag);
        true
    }

    fn pointer_up(&mut self, features: &mut FeatureCollection, event: &PointerEvent) -> bool {
        let consumed = match self.session.take() {
            DragSession::Idle => false,
            // Plain click on a vertex: nothing moved
            DragSession::Armed(_) => true,
            DragSession::Dragging(drag) => {
                self.verify_batch(features, &drag.features);
                self.events.push(ModifyEvent::End {
                    features: drag.features,
                });
                true
            }
        };
        self.hover(features, event.coordinate, event.resolution);
        consumed
    }

    /// Abort the current drag, restoring the geometries captured when it armed.
    ///
    /// A drag that already fired "start" fires its "end" with the same batch,
    /// so every start stays paired. Returns whether a session was active.
    pub fn cancel(&mut self, features: &mut FeatureCollection) -> bool {
        match self.session.take() {
            DragSession::Idle => false,
            DragSession::Armed(_) => true,
            DragSession::Dragging(drag) => {
                for (id, original) in drag.originals {
                    if let Some(feature) = features.get_mut(id) {
                        feature.geometry = original;
                        write_feature(&mut self.index, feature);
                    }
                }
                info!("Drag cancelled, restored {} features", drag.features.len());
                self.marker = None;
                self.events.push(ModifyEvent::End {
                    features: drag.features,
                });
                true
            }
        }
    }

    /// Whether the vertex under the marker can be removed
    pub fn removable(&self, features: &FeatureCollection) -> bool {
        match &self.marker {
            Some(marker) if marker.is_vertex() => {
                can_remove_vertex(&self.index, features, &marker.hit.vertex_segments)
            }
            _ => false,
        }
    }

    /// Remove the vertex under the marker. Refused removals are silent no-ops.
    pub fn remove_point(&mut self, features: &mut FeatureCollection) -> bool {
        if !self.session.is_idle() {
            return false;
        }
        let Some(marker) = self.marker.take() else {
            return false;
        };
        if !marker.is_vertex() {
            self.marker = Some(marker);
            return false;
        }
        let modified = remove_vertex(&mut self.index, features, &marker.hit.vertex_segments);
        if modified.is_empty() {
            self.marker = Some(marker);
            return false;
        }
        self.notify_pair(features, modified);
        true
    }

    /// Whether every tracked feature's records match a fresh derivation
    pub fn verify(&self, features: &FeatureCollection) -> bool {
        features
            .iter()
            .filter(|feature| self.is_tracking(feature.id()))
            .all(|feature| verify_feature(&self.index, feature).is_empty())
    }

    fn owners_of(&self, handles: &[DragHandle]) -> Vec<FeatureId> {
        handles
            .iter()
            .filter_map(|handle| self.index.get(handle.segment).map(|record| record.feature))
            .collect()
    }

    fn notify_pair(&mut self, features: &FeatureCollection, modified: Vec<FeatureId>) {
        self.verify_batch(features, &modified);
        self.events.push(ModifyEvent::Start {
            features: modified.clone(),
        });
        self.events.push(ModifyEvent::End { features: modified });
    }

    #[cfg(debug_assertions)]
    fn verify_batch(&self, features: &FeatureCollection, batch: &[FeatureId]) {
        for id in batch {
            if let Some(feature) = features.get(*id) {
                verify_feature(&self.index, feature);
            }
        }
    }

    #[cfg(not(debug_assertions))]
    fn verify_batch(&self, _features: &FeatureCollection, _batch: &[FeatureId]) {}
}
