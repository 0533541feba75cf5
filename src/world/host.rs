//! World domain: collaborator contracts consumed by the controller.
//!
//! The controller never owns actors, triggers, or scripts. It reaches them
//! through these traits once per tick, so any host (the bevy world, a test
//! fixture, a replay harness) can drive it.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{Bounds, Facing, SUBPIXEL_SHIFT, TileFlags};
use crate::controller::ScriptSlot;

/// Stable handle for an externally owned actor.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u32);

/// Bank/address pair naming a script in the host's script store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScriptRef {
    pub bank: u8,
    pub addr: u16,
}

impl ScriptRef {
    pub const fn new(bank: u8, addr: u16) -> Self {
        Self { bank, addr }
    }
}

/// Why a script is being dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptOrigin {
    /// Per-state hook for the slot the tick ended in.
    State(ScriptSlot),
    /// Interact press aimed at a non-colliding actor.
    Interact(ActorId),
}

/// Read-only view of an actor at the moment of the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorView {
    pub id: ActorId,
    /// Position in sub-pixel units.
    pub pos: IVec2,
    pub bounds: Bounds,
    /// 0 means the actor takes no part in collision.
    pub collision_group: u8,
    pub disabled: bool,
    pub script: Option<ScriptRef>,
}

impl ActorView {
    /// Sub-pixel y of the actor's top edge.
    pub fn top(&self) -> i32 {
        self.pos.y + (self.bounds.top << SUBPIXEL_SHIFT)
    }

    /// Sub-pixel y of the actor's bottom edge.
    pub fn bottom(&self) -> i32 {
        self.pos.y + (self.bounds.bottom << SUBPIXEL_SHIFT)
    }
}

/// First enabled actor overlapping the box at `pos`.
pub fn find_overlapping<'a>(
    actors: impl IntoIterator<Item = &'a ActorView>,
    pos: IVec2,
    bounds: &Bounds,
) -> Option<ActorView> {
    actors
        .into_iter()
        .find(|actor| !actor.disabled && bounds.overlaps(pos, &actor.bounds, actor.pos))
        .copied()
}

/// [`find_overlapping`] with the box moved `distance` pixels along `facing`.
pub fn find_in_front<'a>(
    actors: impl IntoIterator<Item = &'a ActorView>,
    pos: IVec2,
    bounds: &Bounds,
    facing: Facing,
    distance: i32,
) -> Option<ActorView> {
    let ahead = pos + IVec2::new(facing.sign() * (distance << SUBPIXEL_SHIFT), 0);
    find_overlapping(actors, ahead, bounds)
}

/// Camera and level extents used for edge locking, in pixels.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Horizontal centre of the camera.
    pub camera_x: i32,
    /// Left edge of the visible window.
    pub scroll_x: i32,
    pub screen_width: i32,
    pub level_width: i32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            camera_x: 80,
            scroll_x: 0,
            screen_width: 160,
            level_width: 160,
        }
    }
}

impl Viewport {
    pub fn fixed(level_width: i32, screen_width: i32) -> Self {
        Self {
            camera_x: screen_width / 2,
            scroll_x: 0,
            screen_width,
            level_width,
        }
    }
}

pub trait TileQuery {
    fn tile_at(&self, x: i32, y: i32) -> TileFlags;
}

pub trait ActorQuery {
    /// Current view of a previously seen actor, if it still exists.
    fn actor(&self, id: ActorId) -> Option<ActorView>;

    /// At most one actor overlapping the given box.
    fn overlapping(&self, pos: IVec2, bounds: &Bounds) -> Option<ActorView>;

    /// Nearest actor within `distance` pixels in front of the box.
    fn in_front(
        &self,
        pos: IVec2,
        bounds: &Bounds,
        facing: Facing,
        distance: i32,
    ) -> Option<ActorView>;
}

/// Everything the controller needs from the surrounding game for one tick.
pub trait ControllerHost: TileQuery + ActorQuery {
    fn viewport(&self) -> Viewport;

    /// Report a non-blocking collision with an actor to its owner.
    fn register_collision(&mut self, actor: ActorId);

    /// Fire triggers intersecting the box. Returns true if the rest of the
    /// tick must be skipped.
    fn activate_triggers(&mut self, pos: IVec2, bounds: &Bounds, interact: bool) -> bool;

    fn execute_script(&mut self, script: ScriptRef, origin: ScriptOrigin);
}
