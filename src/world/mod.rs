//! World domain: the avatar, geometry helpers, and the collaborator contracts
//! the controller consumes.

mod host;
mod tiles;

#[cfg(test)]
mod tests;

pub use host::{
    ActorId, ActorQuery, ActorView, ControllerHost, ScriptOrigin, ScriptRef, TileQuery, Viewport,
    find_in_front, find_overlapping,
};
pub use tiles::{TILE_SHIFT, TileFlags, tile_of};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Sub-pixel units per pixel, as a shift.
pub const SUBPIXEL_SHIFT: i32 = 4;

/// Velocity units per sub-pixel unit, as a shift.
pub const VELOCITY_SHIFT: i32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn sign(self) -> i32 {
        match self {
            Facing::Left => -1,
            Facing::Right => 1,
        }
    }
}

/// Animation tag published for the renderer. The controller only writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Animation {
    #[default]
    Idle,
    Walk,
    Jump,
    Climb,
    ClimbIdle,
}

/// Hitbox offsets in pixels from the anchor. `top` is negative and measured
/// from the sprite's vertical centre; pixel edges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            left: 0,
            right: 15,
            top: -8,
            bottom: 7,
        }
    }
}

impl Bounds {
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    /// Pixel rectangle `(left, top, right, bottom)` occupied at `pos`.
    pub fn pixel_rect(&self, pos: IVec2) -> (i32, i32, i32, i32) {
        let px = pos.x >> SUBPIXEL_SHIFT;
        let py = pos.y >> SUBPIXEL_SHIFT;
        (
            px + self.left,
            py + self.top,
            px + self.right,
            py + self.bottom,
        )
    }

    /// Render-space centre of the box at `pos`, with y pointing up.
    pub fn translation(&self, pos: IVec2, z: f32) -> Vec3 {
        let (left, top, right, bottom) = self.pixel_rect(pos);
        Vec3::new(
            (left + right + 1) as f32 / 2.0,
            -((top + bottom + 1) as f32) / 2.0,
            z,
        )
    }

    /// Inclusive overlap test between two placed hitboxes.
    pub fn overlaps(&self, pos: IVec2, other: &Bounds, other_pos: IVec2) -> bool {
        let (al, at, ar, ab) = self.pixel_rect(pos);
        let (bl, bt, br, bb) = other.pixel_rect(other_pos);
        al <= br && ar >= bl && at <= bb && ab >= bt
    }

    /// Tile rows covered by the box at sub-pixel height `y`, end exclusive.
    pub fn tile_rows(&self, y: i32) -> std::ops::Range<i32> {
        let py = y >> SUBPIXEL_SHIFT;
        tile_of(py + self.top)..tile_of(py + self.bottom) + 1
    }

    /// Tile columns covered by the box at sub-pixel x, end exclusive.
    pub fn tile_columns(&self, x: i32) -> std::ops::Range<i32> {
        let px = x >> SUBPIXEL_SHIFT;
        tile_of(px + self.left)..tile_of(px + self.right) + 1
    }
}

/// The controlled character.
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Avatar {
    /// Position in sub-pixel units.
    pub pos: IVec2,
    pub facing: Facing,
    pub bounds: Bounds,
    pub animation: Animation,
}

impl Avatar {
    pub fn new(pos: IVec2, bounds: Bounds) -> Self {
        Self {
            pos,
            facing: Facing::Right,
            bounds,
            animation: Animation::Idle,
        }
    }

    /// Place the avatar with its anchor at a pixel coordinate.
    pub fn at_pixel(x: i32, y: i32, bounds: Bounds) -> Self {
        Self::new(IVec2::new(x << SUBPIXEL_SHIFT, y << SUBPIXEL_SHIFT), bounds)
    }

    pub fn pixel_pos(&self) -> IVec2 {
        IVec2::new(self.pos.x >> SUBPIXEL_SHIFT, self.pos.y >> SUBPIXEL_SHIFT)
    }

    pub fn overlaps(&self, other: &ActorView) -> bool {
        self.bounds.overlaps(self.pos, &other.bounds, other.pos)
    }
}
