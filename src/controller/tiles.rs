//! Controller domain: axis-separated sweep against the tile grid.
//!
//! X is resolved and applied before Y is computed from the post-X position.
//! Each axis moves at most 127 sub-pixels per tick so the leading edge can
//! never skip a tile. Snaps land one sub-pixel short of the blocking tile.

use bevy::prelude::*;

use super::config::DropThrough;
use super::context::ControllerContext;
use super::driver::Step;
use super::input::Buttons;
use super::state::{Next, StateKind, WallSide};
use crate::world::{
    ActorQuery, Avatar, SUBPIXEL_SHIFT, TILE_SHIFT, TileFlags, TileQuery, tile_of,
};

/// Largest per-axis move in one tick, in sub-pixels.
pub const MAX_AXIS_STEP: i32 = 127;

/// Horizontal confinement in sub-pixels: level bounds, or the camera window
/// on sides where camera blocking is enabled.
pub(crate) fn edge_limits(step: &Step) -> (i32, i32) {
    let viewport = step.viewport;
    let block = step.config.camera_block;
    let left = if block.left { viewport.scroll_x } else { 0 };
    let right = if block.right {
        viewport.scroll_x + viewport.screen_width
    } else {
        viewport.level_width
    };
    (left << SUBPIXEL_SHIFT, (right - 16) << SUBPIXEL_SHIFT)
}

pub(crate) fn collide_x(
    step: &mut Step,
    cx: &mut ControllerContext,
    avatar: &mut Avatar,
    tile_map: &impl TileQuery,
) {
    let delta = cx.delta.x.clamp(-MAX_AXIS_STEP, MAX_AXIS_STEP);
    let pos_x = avatar.pos.x;
    let mut new_x = pos_x + delta;

    let (left_edge, right_edge) = edge_limits(step);
    if new_x > right_edge {
        if new_x > pos_x {
            new_x = pos_x;
            cx.velocity.set_x(0);
        } else {
            // Already outside: ease back in a pixel at a time.
            new_x = pos_x - (pos_x - right_edge).min(16);
        }
    } else if new_x < left_edge {
        if delta < 0 {
            new_x = pos_x;
            cx.velocity.set_x(0);
        } else {
            new_x = pos_x + (left_edge - pos_x).min(16);
        }
    }

    let bounds = avatar.bounds;
    let rows = bounds.tile_rows(avatar.pos.y);
    if new_x > pos_x {
        let column = tile_of((new_x >> SUBPIXEL_SHIFT) + bounds.right);
        if rows
            .clone()
            .any(|row| tile_map.tile_at(column, row).contains(TileFlags::LEFT))
        {
            new_x = right_snap(column, bounds.right);
            cx.velocity.set_x(0);
            step.touch_wall(cx, WallSide::Right);
        }
    } else if new_x < pos_x {
        let column = tile_of((new_x >> SUBPIXEL_SHIFT) + bounds.left);
        if rows
            .clone()
            .any(|row| tile_map.tile_at(column, row).contains(TileFlags::RIGHT))
        {
            new_x = left_snap(column, bounds.left);
            cx.velocity.set_x(0);
            step.touch_wall(cx, WallSide::Left);
        }
    }
    avatar.pos.x = new_x;
}

/// Avatar x whose right edge sits just left of `column`.
pub(crate) fn right_snap(column: i32, right: i32) -> i32 {
    (((column << TILE_SHIFT) - right) << SUBPIXEL_SHIFT) - 1
}

/// Avatar x whose left edge sits just right of `column`.
pub(crate) fn left_snap(column: i32, left: i32) -> i32 {
    ((((column + 1) << TILE_SHIFT) - left) << SUBPIXEL_SHIFT) + 1
}

/// Avatar y whose feet rest just above `row`.
pub(crate) fn floor_snap(row: i32, bottom: i32) -> i32 {
    (((row << TILE_SHIFT) - bottom) << SUBPIXEL_SHIFT) - 1
}

/// Avatar y whose head sits just below `row`.
pub(crate) fn ceiling_snap(row: i32, top: i32) -> i32 {
    ((((row + 1) << TILE_SHIFT) - top) << SUBPIXEL_SHIFT) + 1
}

pub(crate) fn drop_pressed(step: &Step) -> bool {
    let input = step.input;
    match step.config.drop_through {
        DropThrough::Off => false,
        DropThrough::HoldDown => input.down(),
        DropThrough::PressDown => input.pressed(Buttons::DOWN),
        DropThrough::HoldDownAndJump => input.down() && input.jump(),
        DropThrough::DownJumpCombo => input.down_jump_combo(),
    }
}

/// Land: snap onto the floor, drop any ridden actor, and settle into Ground.
pub(crate) fn land(step: &mut Step, cx: &mut ControllerContext, row: i32, bottom: i32) -> i32 {
    cx.detach();
    cx.velocity.set_y(step.config.ground_rest_vel);
    step.next = if step.current == StateKind::Ground {
        Next::stay(StateKind::Ground)
    } else {
        Next::enter(StateKind::Ground)
    };
    floor_snap(row, bottom)
}

pub(crate) fn collide_y<H: TileQuery + ActorQuery>(
    step: &mut Step,
    cx: &mut ControllerContext,
    avatar: &mut Avatar,
    host: &H,
) {
    let delta = cx.delta.y.clamp(-MAX_AXIS_STEP, MAX_AXIS_STEP);
    let bounds = avatar.bounds;
    let columns = bounds.tile_columns(avatar.pos.x);
    let mut new_y = avatar.pos.y + delta;

    if delta > 0 {
        let row = tile_of((new_y >> SUBPIXEL_SHIFT) + bounds.bottom);
        let floor = columns
            .clone()
            .any(|column| host.tile_at(column, row).contains(TileFlags::TOP));
        if cx.timers.drop_through == 0 && floor {
            let one_way = !columns
                .clone()
                .any(|column| host.tile_at(column, row).contains(TileFlags::BOTTOM));
            if one_way && drop_pressed(step) {
                debug!("dropping through platform row {}", row);
                cx.timers.drop_through = step.config.drop_frames;
                cx.velocity.add_y(step.config.grav);
            } else {
                new_y = land(step, cx, row, bounds.bottom);
            }
        }
    } else if delta < 0 {
        let row = tile_of((new_y >> SUBPIXEL_SHIFT) + bounds.top);
        let ceiling = columns
            .clone()
            .any(|column| host.tile_at(column, row).contains(TileFlags::BOTTOM));
        if ceiling {
            new_y = ceiling_snap(row, bounds.top);
            cx.velocity.set_y(0);
            // A ridden actor carried the avatar into the ceiling: stay on its
            // surface rather than the tile's.
            if let Some(actor) = cx.attachment.and_then(|a| host.actor(a.actor)) {
                new_y = actor.pos.y;
                if actor.bounds.top > 0 {
                    new_y += (actor.bounds.top + actor.bounds.bottom) << 5;
                }
            }
            cx.timers.coyote = 0;
            step.next = Next::enter(StateKind::Fall);
        }
    }
    avatar.pos.y = new_y;
}

/// Tile column under the avatar's horizontal centre.
pub(crate) fn ladder_column(avatar: &Avatar) -> i32 {
    let bounds = &avatar.bounds;
    let half_width = bounds.width() >> 1;
    tile_of((avatar.pos.x >> SUBPIXEL_SHIFT) + bounds.left + half_width)
}

/// Any tile in `column` across the avatar's height carries `flag`.
pub(crate) fn column_blocked(
    tile_map: &impl TileQuery,
    avatar: &Avatar,
    column: i32,
    flag: TileFlags,
) -> bool {
    avatar
        .bounds
        .tile_rows(avatar.pos.y)
        .any(|row| tile_map.tile_at(column, row).contains(flag))
}
