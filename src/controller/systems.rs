//! Controller domain: bevy systems and the ECS-backed host.

use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;
use std::collections::HashSet;
use std::path::Path;

use super::config::{ControllerConfig, load_config};
use super::driver::Controller;
use super::events::{ActorCollidedEvent, ScriptRequestedEvent, TriggerFiredEvent};
use super::input::PendingInput;
use crate::level::{ActorBody, TileMap, TriggerZone};
use crate::world::{
    ActorId, ActorQuery, ActorView, Avatar, Bounds, ControllerHost, Facing, ScriptOrigin,
    ScriptRef, TileFlags, TileQuery, Viewport, find_in_front, find_overlapping,
};

const CONFIG_PATH: &str = "assets/data/controller.ron";

/// Trigger zones the avatar was inside at the end of the last checked tick.
#[derive(Resource, Debug, Default)]
pub struct TriggerOccupancy(HashSet<Entity>);

pub(crate) struct TriggerView {
    pub entity: Entity,
    pub pos: IVec2,
    pub bounds: Bounds,
    pub script: ScriptRef,
    pub needs_interact: bool,
}

impl TriggerView {
    fn from_zone(entity: Entity, zone: &TriggerZone) -> Self {
        Self {
            entity,
            pos: zone.pos,
            bounds: zone.bounds,
            script: zone.script,
            needs_interact: zone.needs_interact,
        }
    }
}

/// One tick's view of the ECS world. Requests are buffered and written out
/// as messages once the tick returns.
pub(crate) struct EcsHost<'a> {
    tile_map: &'a TileMap,
    viewport: Viewport,
    actors: Vec<ActorView>,
    triggers: Vec<TriggerView>,
    occupancy: &'a mut HashSet<Entity>,
    pub scripts: Vec<ScriptRequestedEvent>,
    pub collisions: Vec<ActorCollidedEvent>,
    pub fired: Vec<TriggerFiredEvent>,
}

impl<'a> EcsHost<'a> {
    pub fn new(
        tile_map: &'a TileMap,
        viewport: Viewport,
        actors: Vec<ActorView>,
        triggers: Vec<TriggerView>,
        occupancy: &'a mut HashSet<Entity>,
    ) -> Self {
        Self {
            tile_map,
            viewport,
            actors,
            triggers,
            occupancy,
            scripts: Vec::new(),
            collisions: Vec::new(),
            fired: Vec::new(),
        }
    }
}

impl TileQuery for EcsHost<'_> {
    fn tile_at(&self, x: i32, y: i32) -> TileFlags {
        self.tile_map.tile_at(x, y)
    }
}

impl ActorQuery for EcsHost<'_> {
    fn actor(&self, id: ActorId) -> Option<ActorView> {
        self.actors.iter().find(|actor| actor.id == id).copied()
    }

    fn overlapping(&self, pos: IVec2, bounds: &Bounds) -> Option<ActorView> {
        find_overlapping(&self.actors, pos, bounds)
    }

    fn in_front(
        &self,
        pos: IVec2,
        bounds: &Bounds,
        facing: Facing,
        distance: i32,
    ) -> Option<ActorView> {
        find_in_front(&self.actors, pos, bounds, facing, distance)
    }
}

impl ControllerHost for EcsHost<'_> {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn register_collision(&mut self, actor: ActorId) {
        self.collisions.push(ActorCollidedEvent { actor });
    }

    /// Walk-in zones fire once on entry; interact zones fire on every
    /// interact press while inside. Only the first firing zone runs.
    fn activate_triggers(&mut self, pos: IVec2, bounds: &Bounds, interact: bool) -> bool {
        let mut fired = false;
        for trigger in &self.triggers {
            if !bounds.overlaps(pos, &trigger.bounds, trigger.pos) {
                self.occupancy.remove(&trigger.entity);
                continue;
            }
            let entering = self.occupancy.insert(trigger.entity);
            let fires = if trigger.needs_interact {
                interact
            } else {
                entering
            };
            if fires && !fired {
                debug!("trigger {:?} fired", trigger.entity);
                self.fired.push(TriggerFiredEvent {
                    trigger: trigger.entity,
                    script: trigger.script,
                });
                fired = true;
            }
        }
        fired
    }

    fn execute_script(&mut self, script: ScriptRef, origin: ScriptOrigin) {
        self.scripts.push(ScriptRequestedEvent { script, origin });
    }
}

/// Load the controller config, falling back to defaults on failure.
pub(crate) fn setup_controller(mut commands: Commands) {
    let config = match load_config(Path::new(CONFIG_PATH)) {
        Ok(config) => {
            info!("loaded controller config from {}", CONFIG_PATH);
            config
        }
        Err(e) => {
            warn!("{}; using default controller config", e);
            ControllerConfig::default()
        }
    };
    commands.insert_resource(Controller::new(config));
}

/// Run one controller tick against the current ECS state.
#[allow(clippy::too_many_arguments)]
pub(crate) fn run_controller(
    mut controller: ResMut<Controller>,
    mut pending: ResMut<PendingInput>,
    tile_map: Res<TileMap>,
    viewport: Res<Viewport>,
    mut occupancy: ResMut<TriggerOccupancy>,
    mut avatars: Query<&mut Avatar>,
    actors: Query<(&ActorId, &ActorBody)>,
    triggers: Query<(Entity, &TriggerZone)>,
    mut script_events: MessageWriter<ScriptRequestedEvent>,
    mut collision_events: MessageWriter<ActorCollidedEvent>,
    mut trigger_events: MessageWriter<TriggerFiredEvent>,
) {
    let Ok(mut avatar) = avatars.single_mut() else {
        return;
    };
    let input = pending.take();

    let mut host = EcsHost::new(
        &tile_map,
        *viewport,
        actors
            .iter()
            .map(|(id, body)| ActorView {
                id: *id,
                pos: body.pos,
                bounds: body.bounds,
                collision_group: body.collision_group,
                disabled: body.disabled,
                script: body.script,
            })
            .collect(),
        triggers
            .iter()
            .map(|(entity, zone)| TriggerView::from_zone(entity, zone))
            .collect(),
        &mut occupancy.0,
    );

    let report = controller.tick(&mut avatar, &input, &mut host);
    if report.stopped {
        debug!("tick in {:?} stopped by a trigger", report.state);
    }

    for event in host.scripts {
        script_events.write(event);
    }
    for event in host.collisions {
        collision_events.write(event);
    }
    for event in host.fired {
        trigger_events.write(event);
    }
}

/// Mirror the avatar's fixed-point position into its transform.
pub(crate) fn sync_avatar_transform(
    mut avatars: Query<(&Avatar, &mut Transform, Option<&mut Sprite>), Changed<Avatar>>,
) {
    for (avatar, mut transform, sprite) in &mut avatars {
        transform.translation = avatar.bounds.translation(avatar.pos, 1.0);
        if let Some(mut sprite) = sprite {
            sprite.flip_x = avatar.facing == Facing::Left;
        }
    }
}
