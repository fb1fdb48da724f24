//! Features and the collection that owns them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::shape::{Geometry, GeometryId};

/// Handle of a feature inside its [`FeatureCollection`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeatureId(pub u64);

/// Stroke and fill used when the feature is painted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub stroke_color: [f32; 4],
    pub stroke_width: f32,
    #[serde(default)]
    pub fill_color: Option<[f32; 4]>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            stroke_color: [1.0, 0.0, 0.0, 1.0],
            stroke_width: 3.0,
            fill_color: None,
        }
    }
}

/// Caller-defined tags carried by a feature
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureTags {
    /// Name of the tool that created the feature ("line", "marker", ...)
    pub feature_type: String,
    pub style: Style,
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    id: FeatureId,
    pub geometry: Geometry,
    pub tags: FeatureTags,
}

impl Feature {
    pub fn id(&self) -> FeatureId {
        self.id
    }

    /// Whether `geometry` is this feature's geometry or one of its collection members
    pub fn owns_geometry(&self, geometry: GeometryId) -> bool {
        self.geometry.find(geometry).is_some()
    }
}

/// Sole owner of the features being edited
#[derive(Debug, Default)]
pub struct FeatureCollection {
    features: BTreeMap<FeatureId, Feature>,
    next_id: u64,
}

impl FeatureCollection {
    pub fn insert(&mut self, geometry: Geometry, tags: FeatureTags) -> FeatureId {
        self.next_id += 1;
        let id = FeatureId(self.next_id);
        self.features.insert(id, Feature { id, geometry, tags });
        id
    }

    pub fn remove(&mut self, id: FeatureId) -> Option<Feature> {
        self.features.remove(&id)
    }

    pub fn get(&self, id: FeatureId) -> Option<&Feature> {
        self.features.get(&id)
    }

    pub fn get_mut(&mut self, id: FeatureId) -> Option<&mut Feature> {
        self.features.get_mut(&id)
    }

    /// Geometry (or collection member) `geometry` of feature `feature`
    pub fn geometry(&self, feature: FeatureId, geometry: GeometryId) -> Option<&Geometry> {
        self.features.get(&feature)?.geometry.find(geometry)
    }

    pub fn geometry_mut(&mut self, feature: FeatureId, geometry: GeometryId) -> Option<&mut Geometry> {
        self.features.get_mut(&feature)?.geometry.find_mut(geometry)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.values()
    }

    pub fn ids(&self) -> Vec<FeatureId> {
        self.features.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn clear(&mut self) {
        self.features.clear();
    }
}

#[cfg(test)]
mod tests {
    use bevy::math::DVec2;

    use super::*;

    #[test]
    fn test_collection_insert_and_lookup() {
        let mut features = FeatureCollection::default();
        assert!(features.is_empty());

        let geometry = Geometry::point(DVec2::ONE);
        let geometry_id = geometry.id();
        let id = features.insert(geometry, FeatureTags::default());

        assert_eq!(features.len(), 1);
        assert_eq!(features.get(id).unwrap().id(), id);
        assert!(features.geometry(id, geometry_id).is_some());
        assert!(features.get(id).unwrap().owns_geometry(geometry_id));
    }

    #[test]
    fn test_ids_are_not_reused_after_removal() {
        let mut features = FeatureCollection::default();
        let a = features.insert(Geometry::point(DVec2::ZERO), FeatureTags::default());
        features.remove(a);
        let b = features.insert(Geometry::point(DVec2::ZERO), FeatureTags::default());
        assert_ne!(a, b);
    }

    #[test]
    fn test_style_default() {
        let style = Style::default();
        assert_eq!(style.stroke_color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(style.stroke_width, 3.0);
        assert!(style.fill_color.is_none());
    }

    #[test]
    fn test_tags_serialization() {
        let mut tags = FeatureTags {
            feature_type: "line".to_string(),
            ..Default::default()
        };
        tags.properties
            .insert("name".to_string(), serde_json::Value::from("trail"));

        let json = serde_json::to_string(&tags).unwrap();
        let parsed: FeatureTags = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, tags);
    }
}
