//! Controller domain: dash triggers, start-up, and per-frame stepping.
//!
//! A dash bypasses the shared sweep. It moves a fixed step per frame,
//! checking every tile column it crosses, unless it was cleared at start-up
//! to pass through walls.

use bevy::prelude::*;

use super::config::{ControllerConfig, DashInput, DashThrough};
use super::context::{ControllerContext, Timers};
use super::driver::Step;
use super::input::{Buttons, InputSnapshot};
use super::state::{DashState, JumpType, Next, RunStage, StateKind, WallSide};
use super::tiles::{MAX_AXIS_STEP, ceiling_snap, floor_snap, left_snap, right_snap};
use crate::world::{Avatar, Facing, SUBPIXEL_SHIFT, TILE_SHIFT, TileFlags, TileQuery, tile_of};

/// Whether this tick's input asks for a dash. Double-tap detection arms and
/// consumes the signed tap timer.
pub(crate) fn detect_input(
    config: &ControllerConfig,
    input: &InputSnapshot,
    timers: &mut Timers,
) -> bool {
    match config.dash_input {
        DashInput::Off => false,
        DashInput::Interact => input.pressed(Buttons::INTERACT),
        DashInput::DoubleTap => {
            if input.pressed(Buttons::LEFT) {
                if timers.tap < 0 {
                    return true;
                }
                timers.tap = -config.tap_window;
            } else if input.pressed(Buttons::RIGHT) {
                if timers.tap > 0 {
                    return true;
                }
                timers.tap = config.tap_window;
            }
            false
        }
        DashInput::DownJump => input.down_jump_combo(),
    }
}

/// Dash setup: pick a direction, validate a pass-through landing, and arm
/// the cooldown.
pub(crate) fn start(
    step: &mut Step,
    cx: &mut ControllerContext,
    avatar: &mut Avatar,
    tile_map: &impl TileQuery,
) -> DashState {
    let config = step.config;
    if step.input.right() {
        avatar.facing = Facing::Right;
    } else if step.input.left() {
        avatar.facing = Facing::Left;
    }

    let travel = step.tuning.dash_step * i32::from(config.dash_frames);
    let end_clear = config.dash_through == DashThrough::Walls
        && !config.dash_momentum.vertical()
        && landing_clear(step, avatar, tile_map, travel);

    cx.detach();
    cx.camera_deadzone = config.dash_deadzone;
    cx.timers.dash_ready = u16::from(config.dash_ready_max) + u16::from(config.dash_frames);
    if !config.dash_momentum.vertical() {
        cx.velocity.set_y(0);
    }
    cx.timers.tap = 0;
    cx.jump_type = JumpType::None;
    cx.run_stage = RunStage::Base;

    debug!(
        "dash started facing {:?}, {} frames, end clear: {}",
        avatar.facing, config.dash_frames, end_clear
    );
    DashState {
        frames_left: config.dash_frames,
        end_clear,
    }
}

/// The box at the dash's final position is inside the level and free of any
/// solid tile edge.
// TODO: when the landing box is blocked, scan back towards the start for the
// nearest free box instead of falling back to a wall-stopped dash.
pub(crate) fn landing_clear(
    step: &Step,
    avatar: &Avatar,
    tile_map: &impl TileQuery,
    travel: i32,
) -> bool {
    let bounds = avatar.bounds;
    let pos = avatar.pos;
    let level_right = (step.viewport.level_width - 16) << SUBPIXEL_SHIFT;
    let end_x = match avatar.facing {
        Facing::Right => {
            if pos.x + (bounds.right << SUBPIXEL_SHIFT) + travel > level_right {
                return false;
            }
            pos.x + travel
        }
        Facing::Left => {
            if pos.x <= travel + (bounds.left << SUBPIXEL_SHIFT) + (8 << SUBPIXEL_SHIFT) {
                return false;
            }
            pos.x - travel
        }
    };

    let rows = bounds.tile_rows(pos.y);
    !bounds.tile_columns(end_x).any(|column| {
        rows.clone().any(|row| tile_map.tile_at(column, row).blocks_any())
    })
}

/// One dash frame: horizontal step with its own column scan, then optional
/// ballistic vertical motion.
pub(crate) fn advance(
    step: &mut Step,
    cx: &mut ControllerContext,
    avatar: &mut Avatar,
    dash: &mut DashState,
    tile_map: &impl TileQuery,
) {
    let config = step.config;
    let bounds = avatar.bounds;
    let pos = avatar.pos;
    let rows = bounds.tile_rows(pos.y);
    let viewport = step.viewport;
    let ignore_walls = config.dash_through == DashThrough::Walls && dash.end_clear;
    let dash_step = step.tuning.dash_step;
    let mut stopped = false;

    match avatar.facing {
        Facing::Right => {
            let camera_limit = (viewport.camera_x + viewport.screen_width / 2 - 16) >> TILE_SHIFT;
            let mut new_x = pos.x + dash_step;
            let end = tile_of((new_x >> SUBPIXEL_SHIFT) + bounds.right) + 1;
            let mut column = tile_of((pos.x >> SUBPIXEL_SHIFT) + bounds.right);
            while column < end {
                if config.camera_block.right && column > camera_limit {
                    new_x = right_snap(column, bounds.right);
                    stopped = true;
                    break;
                }
                if !ignore_walls
                    && rows
                        .clone()
                        .any(|row| tile_map.tile_at(column, row).contains(TileFlags::LEFT))
                {
                    new_x = right_snap(column, bounds.right);
                    step.touch_wall(cx, WallSide::Right);
                    stopped = true;
                    break;
                }
                column += 1;
            }
            let momentum = if config.dash_momentum.horizontal() {
                config.run_vel
            } else {
                0
            };
            cx.velocity.set_x(momentum);
            avatar.pos.x = new_x.min((viewport.level_width - 16) << SUBPIXEL_SHIFT);
        }
        Facing::Left => {
            let camera_limit = (viewport.camera_x - viewport.screen_width / 2) >> TILE_SHIFT;
            let mut new_x = pos.x - dash_step;
            let end = tile_of((new_x >> SUBPIXEL_SHIFT) + bounds.left) - 1;
            let mut column = tile_of((pos.x >> SUBPIXEL_SHIFT) + bounds.left);
            while column > end {
                if config.camera_block.left && column < camera_limit {
                    new_x = left_snap(column, bounds.left);
                    stopped = true;
                    break;
                }
                if !ignore_walls
                    && rows
                        .clone()
                        .any(|row| tile_map.tile_at(column, row).contains(TileFlags::RIGHT))
                {
                    new_x = left_snap(column, bounds.left);
                    step.touch_wall(cx, WallSide::Left);
                    stopped = true;
                    break;
                }
                column -= 1;
            }
            let momentum = if config.dash_momentum.horizontal() {
                -config.run_vel
            } else {
                0
            };
            cx.velocity.set_x(momentum);
            avatar.pos.x = new_x.max(0);
        }
    }

    if stopped {
        debug!("dash stopped at x {}", avatar.pos.x);
        dash.frames_left = 0;
    }

    if config.dash_momentum.vertical() {
        ballistic(step, cx, avatar, tile_map);
    }
    cx.delta = IVec2::ZERO;
}

/// Vertical half of a dash with vertical momentum: light gravity, jump
/// cancels, and a direct floor/ceiling sweep.
fn ballistic(
    step: &mut Step,
    cx: &mut ControllerContext,
    avatar: &mut Avatar,
    tile_map: &impl TileQuery,
) {
    let config = step.config;
    cx.velocity.add_y(config.hold_grav);

    if step.input.pressed(Buttons::JUMP) {
        if cx.timers.coyote != 0 {
            cx.timers.coyote = 0;
            cx.jump_type = JumpType::Ground;
            step.next = Next::enter(StateKind::Jump);
        } else if cx.spend_extra_jump(step.tuning) {
            cx.jump_type = JumpType::Double;
            step.next = Next::enter(StateKind::Jump);
        }
    }

    let bounds = avatar.bounds;
    let delta = (cx.delta.y + cx.velocity.step_y()).clamp(-MAX_AXIS_STEP, MAX_AXIS_STEP);
    let columns = bounds.tile_columns(avatar.pos.x);
    let mut new_y = avatar.pos.y + delta;
    if delta > 0 {
        let row = tile_of((new_y >> SUBPIXEL_SHIFT) + bounds.bottom);
        if columns
            .clone()
            .any(|column| tile_map.tile_at(column, row).contains(TileFlags::TOP))
        {
            new_y = floor_snap(row, bounds.bottom);
            cx.detach();
            cx.velocity.set_y(config.ground_rest_vel);
        }
    } else if delta < 0 {
        let row = tile_of((new_y >> SUBPIXEL_SHIFT) + bounds.top);
        if columns
            .clone()
            .any(|column| tile_map.tile_at(column, row).contains(TileFlags::BOTTOM))
        {
            new_y = ceiling_snap(row, bounds.top);
            cx.velocity.set_y(0);
        }
    }
    avatar.pos.y = new_y;

    let fall = config.max_fall_vel;
    cx.velocity.set_y(cx.velocity.y().clamp(-fall, fall));
}
