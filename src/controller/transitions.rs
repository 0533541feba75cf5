//! Controller domain: animation, transition checks, and state-local counters.
//!
//! Each source state checks its exits in a fixed priority order. Dash and
//! jump exits return straight away, skipping the remaining checks and that
//! state's counters for the tick.

use bevy::prelude::*;

use super::context::{ControllerContext, count_down};
use super::driver::Step;
use super::input::Buttons;
use super::state::{ControllerState, DashState, JumpType, Next, StateKind, WallSide};
use super::tiles;
use crate::world::{Animation, Avatar, Facing, SUBPIXEL_SHIFT, TILE_SHIFT, TileQuery, tile_of};

pub(crate) fn run(
    step: &mut Step,
    state: &mut ControllerState,
    cx: &mut ControllerContext,
    avatar: &mut Avatar,
    tile_map: &impl TileQuery,
) {
    match state {
        ControllerState::Fall => from_fall(step, cx, avatar, tile_map),
        ControllerState::Ground => from_ground(step, cx, avatar, tile_map),
        ControllerState::Jump(_) => from_jump(step, cx, avatar, tile_map),
        ControllerState::Dash(dash) => from_dash(step, cx, avatar, dash),
        ControllerState::Wall => from_wall(step, cx, avatar, tile_map),
        // Landing and ceilings are the only ways out; the sweeps request them.
        ControllerState::Knockback | ControllerState::Ladder | ControllerState::Blank => {}
    }
}

/// Shared by the airborne states: face the input, else the velocity.
fn airborne_animation(step: &Step, cx: &ControllerContext, avatar: &mut Avatar) {
    if step.config.turn_control {
        if let Some(facing) = facing_for(step.input.direction(), cx.velocity.x()) {
            avatar.facing = facing;
        }
    }
    avatar.animation = Animation::Jump;
}

fn facing_for(direction: i32, velocity: i32) -> Option<Facing> {
    let sign = if direction != 0 { direction } else { velocity.signum() };
    match sign {
        -1 => Some(Facing::Left),
        1 => Some(Facing::Right),
        _ => None,
    }
}

fn wall_check(step: &mut Step, cx: &ControllerContext) {
    if step.wall_touch.is_touching() && cx.velocity.y() >= 0 && cx.wall_slide {
        if !step.next.is_stay(StateKind::Wall) {
            step.next = Next::enter(StateKind::Wall);
        }
    } else if step.next.is_stay(StateKind::Wall) {
        step.next = Next::enter(StateKind::Fall);
    }
}

/// Grab a ladder under the avatar's centre while up or down is held.
fn ladder_check(
    step: &mut Step,
    cx: &mut ControllerContext,
    avatar: &mut Avatar,
    tile_map: &impl TileQuery,
) {
    if !(step.input.up() || step.input.down()) {
        return;
    }
    let column = tiles::ladder_column(avatar);
    let row = tile_of(avatar.pos.y >> SUBPIXEL_SHIFT);
    if tile_map.tile_at(column, row).is_ladder() {
        let bounds = &avatar.bounds;
        let centre = bounds.left + (bounds.width() >> 1);
        avatar.pos.x = ((column << TILE_SHIFT) + 4 - centre) << SUBPIXEL_SHIFT;
        cx.velocity.set_x(0);
        step.next = Next::enter(StateKind::Ladder);
    }
}

/// Kick away from the last wall and lock steering for a moment.
fn wall_jump(step: &mut Step, cx: &mut ControllerContext) {
    let config = step.config;
    cx.charges.wall_jumps -= 1;
    cx.timers.no_control = config.no_control_frames;
    cx.velocity.add_x((config.wall_kick + config.walk_vel) * -cx.last_wall.sign());
    cx.jump_type = JumpType::Wall;
    step.next = Next::enter(StateKind::Jump);
    debug!("wall jump off {:?}, {} left", cx.last_wall, cx.charges.wall_jumps);
}

fn dash_ready(step: &Step, cx: &ControllerContext) -> bool {
    step.dash_pressed && cx.timers.dash_ready == 0
}

/// Dashing off a wall is only allowed away from it.
fn dash_clears_wall(step: &Step) -> bool {
    match step.wall_touch {
        WallSide::None => true,
        WallSide::Right => !step.input.right(),
        WallSide::Left => !step.input.left(),
    }
}

fn from_fall(
    step: &mut Step,
    cx: &mut ControllerContext,
    avatar: &mut Avatar,
    tile_map: &impl TileQuery,
) {
    airborne_animation(step, cx, avatar);
    wall_check(step, cx);

    if dash_ready(step, cx) {
        let style = step.config.dash_style;
        let allowed = if style.allows_air() {
            dash_clears_wall(step)
        } else {
            // Ground-only dashes still fire on the landing tick.
            step.next.is_enter(StateKind::Ground)
        };
        if allowed {
            step.next = Next::enter(StateKind::Dash);
            return;
        }
    }

    if step.input.pressed(Buttons::JUMP) {
        if cx.timers.wall_coyote != 0 && cx.charges.wall_jumps != 0 {
            wall_jump(step, cx);
            return;
        } else if cx.timers.coyote != 0 {
            cx.jump_type = JumpType::Ground;
            step.next = Next::enter(StateKind::Jump);
            return;
        } else if cx.spend_extra_jump(step.tuning) {
            cx.jump_type = JumpType::Double;
            step.next = Next::enter(StateKind::Jump);
            return;
        }
        cx.timers.jump_buffer = step.config.buffer_max;
    }

    ladder_check(step, cx, avatar, tile_map);

    let timers = &mut cx.timers;
    count_down(&mut timers.jump_buffer);
    count_down(&mut timers.no_control);
    if !step.next.is_stay(StateKind::Ground) {
        count_down(&mut timers.coyote);
    }
    if !step.wall_touch.is_touching() {
        count_down(&mut timers.wall_coyote);
    }
    count_down(&mut timers.drop_through);
}

fn from_ground(
    step: &mut Step,
    cx: &mut ControllerContext,
    avatar: &mut Avatar,
    tile_map: &impl TileQuery,
) {
    // Held direction wins over velocity so sliding stops look right.
    let direction = step.input.direction();
    if let Some(facing) = facing_for(direction, cx.velocity.x()) {
        avatar.facing = facing;
    }
    avatar.animation = if direction != 0 || cx.velocity.x() != 0 {
        Animation::Walk
    } else {
        Animation::Idle
    };

    if dash_ready(step, cx) && step.config.dash_style.allows_ground() {
        step.next = Next::enter(StateKind::Dash);
        return;
    }

    let jump = step.input.pressed(Buttons::JUMP) || cx.timers.jump_buffer != 0;
    if jump && cx.timers.drop_through == 0 {
        cx.jump_type = JumpType::Ground;
        step.next = Next::enter(StateKind::Jump);
        return;
    }
    cx.timers.jump_buffer = 0;

    ladder_check(step, cx, avatar, tile_map);
    count_down(&mut cx.timers.drop_through);
}

fn from_jump(
    step: &mut Step,
    cx: &mut ControllerContext,
    avatar: &mut Avatar,
    tile_map: &impl TileQuery,
) {
    airborne_animation(step, cx, avatar);
    wall_check(step, cx);

    if dash_ready(step, cx) && (step.config.dash_style.allows_air() || cx.timers.coyote != 0) {
        step.next = Next::enter(StateKind::Dash);
        return;
    }

    ladder_check(step, cx, avatar, tile_map);
    count_down(&mut cx.timers.no_control);
}

fn from_dash(step: &mut Step, cx: &ControllerContext, avatar: &mut Avatar, dash: &mut DashState) {
    airborne_animation(step, cx, avatar);

    dash.frames_left = dash.frames_left.saturating_sub(1);
    if dash.frames_left == 0 && step.next.is_stay(StateKind::Dash) {
        debug!("dash finished at x {}", avatar.pos.x);
        step.next = Next::enter(StateKind::Fall);
    }
}

fn from_wall(
    step: &mut Step,
    cx: &mut ControllerContext,
    avatar: &mut Avatar,
    tile_map: &impl TileQuery,
) {
    match step.wall_touch {
        WallSide::Right => avatar.facing = Facing::Left,
        WallSide::Left => avatar.facing = Facing::Right,
        WallSide::None => {}
    }
    avatar.animation = Animation::Jump;

    wall_check(step, cx);

    if dash_ready(step, cx)
        && step.config.dash_style.allows_air()
        && step.wall_touch.is_touching()
        && dash_clears_wall(step)
    {
        step.next = Next::enter(StateKind::Dash);
        return;
    }

    let jump = step.input.pressed(Buttons::JUMP) || cx.timers.jump_buffer != 0;
    if jump && cx.charges.wall_jumps != 0 {
        wall_jump(step, cx);
        return;
    }

    ladder_check(step, cx, avatar, tile_map);
    count_down(&mut cx.timers.drop_through);
}
