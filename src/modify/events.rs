//! Modification lifecycle notifications.

use crate::geometry::FeatureId;

/// Emitted in pairs: exactly one `Start` and one `End` per modification, with the same batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModifyEvent {
    Start { features: Vec<FeatureId> },
    End { features: Vec<FeatureId> },
}

impl ModifyEvent {
    pub fn features(&self) -> &[FeatureId] {
        match self {
            ModifyEvent::Start { features } | ModifyEvent::End { features } => features,
        }
    }

    pub fn is_start(&self) -> bool {
        matches!(self, ModifyEvent::Start { .. })
    }
}
