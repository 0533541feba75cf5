//! Controller domain: requests the tick hands to the rest of the game.

use bevy::ecs::message::Message;
use bevy::prelude::*;

use crate::world::{ActorId, ScriptOrigin, ScriptRef};

/// A state hook or interact press asked for a script to run
#[derive(Debug, Clone, Copy)]
pub struct ScriptRequestedEvent {
    pub script: ScriptRef,
    pub origin: ScriptOrigin,
}

impl Message for ScriptRequestedEvent {}

/// The avatar touched a colliding actor this tick
#[derive(Debug, Clone, Copy)]
pub struct ActorCollidedEvent {
    pub actor: ActorId,
}

impl Message for ActorCollidedEvent {}

/// The avatar set off a trigger zone; the controller skipped the rest of its tick
#[derive(Debug, Clone, Copy)]
pub struct TriggerFiredEvent {
    pub trigger: Entity,
    pub script: ScriptRef,
}

impl Message for TriggerFiredEvent {}
