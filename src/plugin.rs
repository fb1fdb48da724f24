//! Bevy integration: the orchestrator as a resource driven by messages.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::common::PointerEvent;
use crate::config::EditorConfig;
use crate::draw::{DrawingOrchestrator, EditEvent};
use crate::geometry::{FeatureId, Geometry};

/// System set for the editing systems (other plugins can order around it)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeoEditSystems;

/// Pointer sample to feed the orchestrator
#[derive(Message, Debug, Clone, Copy)]
pub struct PointerInput(pub PointerEvent);

/// Command for the orchestrator
#[derive(Message, Debug, Clone)]
pub enum EditRequest {
    Activate(Option<String>),
    FinishDrawing,
    Cancel,
    DeleteSelected,
    Clear,
    RemovePoint,
    Select(Option<FeatureId>),
    AddFeature { geometry: Geometry, tool: String },
    SetGeometry { id: FeatureId, geometry: Geometry },
}

#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct ModifyStarted {
    pub features: Vec<FeatureId>,
}

#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct ModifyEnded {
    pub features: Vec<FeatureId>,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawEnded {
    pub feature: FeatureId,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionChanged {
    pub feature: Option<FeatureId>,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeaturesCleared;

#[derive(SystemParam)]
pub(crate) struct EditEventWriters<'w> {
    pub modify_started: MessageWriter<'w, ModifyStarted>,
    pub modify_ended: MessageWriter<'w, ModifyEnded>,
    pub draw_ended: MessageWriter<'w, DrawEnded>,
    pub selection_changed: MessageWriter<'w, SelectionChanged>,
    pub cleared: MessageWriter<'w, FeaturesCleared>,
}

fn handle_edit_requests(
    mut requests: MessageReader<EditRequest>,
    mut orchestrator: ResMut<DrawingOrchestrator>,
) {
    for request in requests.read() {
        let applied = match request.clone() {
            EditRequest::Activate(tool) => orchestrator.activate(tool.as_deref()),
            EditRequest::FinishDrawing => orchestrator.finish_drawing(),
            EditRequest::Cancel => orchestrator.cancel(),
            EditRequest::DeleteSelected => orchestrator.delete_selected(),
            EditRequest::Clear => {
                orchestrator.clear();
                true
            }
            EditRequest::RemovePoint => orchestrator.remove_point(),
            EditRequest::Select(feature) => orchestrator.select(feature),
            EditRequest::AddFeature { geometry, tool } => {
                orchestrator.add_feature(geometry, &tool);
                true
            }
            EditRequest::SetGeometry { id, geometry } => orchestrator.set_geometry(id, geometry),
        };
        if !applied {
            debug!("Edit request had no effect: {:?}", request);
        }
    }
}

fn handle_pointer_input(
    mut inputs: MessageReader<PointerInput>,
    mut orchestrator: ResMut<DrawingOrchestrator>,
) {
    for PointerInput(event) in inputs.read() {
        orchestrator.handle_pointer(event);
    }
}

fn publish_edit_events(mut orchestrator: ResMut<DrawingOrchestrator>, mut writers: EditEventWriters) {
    for event in orchestrator.drain_events() {
        match event {
            EditEvent::ModifyStart(features) => {
                writers.modify_started.write(ModifyStarted { features });
            }
            EditEvent::ModifyEnd(features) => {
                writers.modify_ended.write(ModifyEnded { features });
            }
            EditEvent::DrawEnd(feature) => {
                writers.draw_ended.write(DrawEnded { feature });
            }
            EditEvent::SelectionChange(feature) => {
                writers.selection_changed.write(SelectionChanged { feature });
            }
            EditEvent::Clear => {
                writers.cleared.write(FeaturesCleared);
            }
        }
    }
}

#[derive(Default)]
pub struct GeoEditPlugin {
    pub config: EditorConfig,
}

impl Plugin for GeoEditPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone())
            .insert_resource(DrawingOrchestrator::new(&self.config))
            .add_message::<PointerInput>()
            .add_message::<EditRequest>()
            .add_message::<ModifyStarted>()
            .add_message::<ModifyEnded>()
            .add_message::<DrawEnded>()
            .add_message::<SelectionChanged>()
            .add_message::<FeaturesCleared>()
            .add_systems(
                Update,
                (
                    handle_edit_requests.run_if(on_message::<EditRequest>),
                    handle_pointer_input.run_if(on_message::<PointerInput>),
                    publish_edit_events,
                )
                    .chain()
                    .in_set(GeoEditSystems),
            );
    }
}
