//! Spatial index of segment records.
//!
//! Records live in an arena keyed by [`SegmentId`]; the bounding-box tree (an
//! [`rstar::RTree`]) stores only `(extent, id)` pairs, so geometry mutation and
//! index updates in the same pointer frame never alias.
//!
//! ## Module Structure
//!
//! - [`record`] - [`SegmentRecord`] and its addressing helpers
//! - [`writer`] - Decomposes geometries into records ([`write_feature`])
//!
//! Only the writer, the drag session and vertex insert/remove mutate the index.

mod record;
mod writer;

#[cfg(test)]
mod tests;

use std::collections::{BTreeSet, HashMap};

use rstar::primitives::{GeomWithData, Rectangle};
use rstar::RTree;

use crate::geometry::{Coordinate, Extent, FeatureId, GeometryId};

pub use record::{
    DragSide, SegmentId, SegmentKind, SegmentRecord, CIRCLE_CENTER_INDEX,
    CIRCLE_CIRCUMFERENCE_INDEX,
};
pub use writer::{derive_records, verify_feature, write_feature, IndexMismatch};

type IndexedBox = GeomWithData<Rectangle<[f64; 2]>, SegmentId>;

struct Entry {
    record: SegmentRecord,
    /// Exact box stored in the tree, kept so removal can find it again
    indexed: IndexedBox,
}

#[derive(Default)]
pub struct SegmentIndex {
    tree: RTree<IndexedBox>,
    entries: HashMap<SegmentId, Entry>,
    /// Keyed by owner as well, since a cloned geometry keeps its id
    by_geometry: HashMap<(FeatureId, GeometryId), BTreeSet<SegmentId>>,
    next_id: u64,
}

impl SegmentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record under `extent` and return its arena id
    pub fn insert(&mut self, extent: Extent, record: SegmentRecord) -> SegmentId {
        self.next_id += 1;
        let id = SegmentId(self.next_id);
        let indexed = GeomWithData::new(extent.to_rectangle(), id);
        self.tree.insert(indexed);
        self.by_geometry
            .entry((record.feature, record.geometry))
            .or_default()
            .insert(id);
        self.entries.insert(id, Entry { record, indexed });
        id
    }

    /// Remove a record. Removing an unknown id is a no-op.
    pub fn remove(&mut self, id: SegmentId) -> Option<SegmentRecord> {
        let entry = self.entries.remove(&id)?;
        self.tree.remove(&entry.indexed);
        let key = (entry.record.feature, entry.record.geometry);
        if let Some(ids) = self.by_geometry.get_mut(&key) {
            ids.remove(&id);
            if ids.is_empty() {
                self.by_geometry.remove(&key);
            }
        }
        Some(entry.record)
    }

    /// Move a record to a new extent
    pub fn update(&mut self, id: SegmentId, extent: Extent) -> bool {
        let Some(entry) = self.entries.get_mut(&id) else {
            return false;
        };
        self.tree.remove(&entry.indexed);
        entry.indexed = GeomWithData::new(extent.to_rectangle(), id);
        self.tree.insert(entry.indexed);
        true
    }

    /// Rewrite one end of a record's coordinate pair (extent is left to [`Self::update`])
    pub fn set_segment_end(&mut self, id: SegmentId, position: usize, vertex: Coordinate) -> bool {
        match self.entries.get_mut(&id) {
            Some(entry) if position < 2 => {
                entry.record.segment[position] = vertex;
                true
            }
            _ => false,
        }
    }

    /// Rewrite both ends of a record's coordinate pair
    pub fn set_segment(&mut self, id: SegmentId, segment: [Coordinate; 2]) -> bool {
        match self.entries.get_mut(&id) {
            Some(entry) => {
                entry.record.segment = segment;
                true
            }
            None => false,
        }
    }

    /// Link a circle's center and circumference records to each other
    pub fn link_siblings(&mut self, a: SegmentId, b: SegmentId) {
        if let Some(entry) = self.entries.get_mut(&a) {
            entry.record.sibling = Some(b);
        }
        if let Some(entry) = self.entries.get_mut(&b) {
            entry.record.sibling = Some(a);
        }
    }

    /// Shift the index of every record of one component whose index is greater
    /// than `after` by `delta`. Other components and other features are never touched.
    pub fn renumber_after(
        &mut self,
        feature: FeatureId,
        geometry: GeometryId,
        depth: &[usize],
        after: usize,
        delta: isize,
    ) {
        let Some(ids) = self.by_geometry.get(&(feature, geometry)) else {
            return;
        };
        for id in ids {
            let Some(entry) = self.entries.get_mut(id) else {
                continue;
            };
            let record = &mut entry.record;
            if record.depth == depth && record.index > after {
                record.index = record.index.saturating_add_signed(delta);
            }
        }
    }

    pub fn get(&self, id: SegmentId) -> Option<&SegmentRecord> {
        self.entries.get(&id).map(|entry| &entry.record)
    }

    /// Extent a record is currently indexed under
    pub fn extent_of(&self, id: SegmentId) -> Option<Extent> {
        self.entries.get(&id).map(|entry| {
            let envelope = entry.indexed.geom();
            let (min, max) = (envelope.lower(), envelope.upper());
            Extent::new(Coordinate::from_array(min), Coordinate::from_array(max))
        })
    }

    /// Ids of all records whose extent intersects `extent`, in insertion order
    pub fn query_range(&self, extent: &Extent) -> Vec<SegmentId> {
        let mut ids: Vec<SegmentId> = self
            .tree
            .locate_in_envelope_intersecting(&extent.to_aabb())
            .map(|indexed| indexed.data)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Visit every record whose extent intersects `extent`
    pub fn for_each_in_extent(&self, extent: &Extent, mut visitor: impl FnMut(SegmentId, &SegmentRecord)) {
        for id in self.query_range(extent) {
            if let Some(record) = self.get(id) {
                visitor(id, record);
            }
        }
    }

    /// Ids of all records of one feature's leaf geometry, in insertion order
    pub fn records_of_geometry(&self, feature: FeatureId, geometry: GeometryId) -> Vec<SegmentId> {
        self.by_geometry
            .get(&(feature, geometry))
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Ids of all records owned by a feature, in insertion order
    pub fn records_of_feature(&self, feature: FeatureId) -> Vec<SegmentId> {
        let mut ids: Vec<SegmentId> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.record.feature == feature)
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Drop every record owned by a feature; returns how many were removed
    pub fn remove_feature(&mut self, feature: FeatureId) -> usize {
        let ids = self.records_of_feature(feature);
        for id in &ids {
            self.remove(*id);
        }
        ids.len()
    }

    pub fn contains_feature(&self, feature: FeatureId) -> bool {
        self.entries.values().any(|entry| entry.record.feature == feature)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.tree = RTree::new();
        self.entries.clear();
        self.by_geometry.clear();
    }
}
