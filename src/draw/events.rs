//! Notifications emitted by the drawing orchestrator.

use crate::geometry::FeatureId;
use crate::modify::ModifyEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditEvent {
    ModifyStart(Vec<FeatureId>),
    ModifyEnd(Vec<FeatureId>),
    DrawEnd(FeatureId),
    SelectionChange(Option<FeatureId>),
    Clear,
}

impl From<ModifyEvent> for EditEvent {
    fn from(event: ModifyEvent) -> Self {
        match event {
            ModifyEvent::Start { features } => EditEvent::ModifyStart(features),
            ModifyEvent::End { features } => EditEvent::ModifyEnd(features),
        }
    }
}
