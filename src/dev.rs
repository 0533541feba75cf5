//! Developer hotkeys for inspecting the controller while playing.
//!
//! - F1 logs the controller snapshot as JSON
//! - F2 resets the controller to its scene-entry values
//! - F3 toggles wall sliding

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;

use crate::controller::{
    ActorCollidedEvent, Controller, ScriptRequestedEvent, StateKind, TriggerFiredEvent,
};

pub struct DevPlugin;

impl Plugin for DevPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (handle_dev_hotkeys, log_controller_messages));
    }
}

fn handle_dev_hotkeys(keyboard: Res<ButtonInput<KeyCode>>, controller: Option<ResMut<Controller>>) {
    let Some(mut controller) = controller else {
        return;
    };

    if keyboard.just_pressed(KeyCode::F1) {
        match serde_json::to_string_pretty(&controller.snapshot()) {
            Ok(json) => info!("controller snapshot:\n{}", json),
            Err(e) => warn!("could not serialize controller snapshot: {}", e),
        }
    }

    if keyboard.just_pressed(KeyCode::F2) {
        controller.reset();
        controller.set_state(StateKind::Fall);
        info!("controller reset");
    }

    if keyboard.just_pressed(KeyCode::F3) {
        let enabled = !controller.context().wall_slide;
        controller.set_wall_slide(enabled);
        info!("wall slide {}", if enabled { "on" } else { "off" });
    }
}

fn log_controller_messages(
    mut scripts: MessageReader<ScriptRequestedEvent>,
    mut collisions: MessageReader<ActorCollidedEvent>,
    mut triggers: MessageReader<TriggerFiredEvent>,
) {
    for event in scripts.read() {
        info!("script {:?} requested by {:?}", event.script, event.origin);
    }
    for event in collisions.read() {
        debug!("collided with actor {:?}", event.actor);
    }
    for event in triggers.read() {
        info!("trigger {:?} fired script {:?}", event.trigger, event.script);
    }
}
