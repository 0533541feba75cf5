//! Controller domain: per-state vertical motion and the ladder body.

use super::config::{FloatInput, VELOCITY_LIMIT};
use super::context::ControllerContext;
use super::driver::Step;
use super::input::Buttons;
use super::state::{JumpState, JumpType, Next, StateKind};
use super::tiles;
use crate::world::{
    ActorQuery, Animation, Avatar, SUBPIXEL_SHIFT, TileFlags, TileQuery, tile_of,
};

/// Descent speed while passing through a one-way platform.
pub const DROP_VELOCITY: i32 = 7000;

/// Add gravity, capped at the configured terminal velocity.
pub(crate) fn fall_by(step: &Step, cx: &mut ControllerContext, gravity: i32) {
    cx.velocity.add_y(gravity);
    cx.velocity.set_y(cx.velocity.y().min(step.config.max_fall_vel));
}

fn float_held(step: &Step) -> bool {
    match step.config.float_input {
        FloatInput::Off => false,
        FloatInput::HoldJump => step.input.jump(),
        FloatInput::HoldUp => step.input.up(),
    }
}

pub(crate) fn fall(step: &mut Step, cx: &mut ControllerContext) {
    cx.jump_type = JumpType::None;

    if float_held(step) && cx.velocity.y() >= 0 {
        cx.jump_type = JumpType::Float;
        cx.velocity.set_y(step.config.float_grav);
    } else if cx.timers.drop_through != 0 {
        cx.velocity.set_y(DROP_VELOCITY);
    } else if step.input.jump() && cx.velocity.y() < 0 {
        fall_by(step, cx, step.config.hold_grav);
    } else {
        fall_by(step, cx, step.config.grav);
    }
    cx.delta.y += cx.velocity.step_y();
}

/// Ground body: ride an attached actor, or keep pressing into the floor so
/// the tile sweep can confirm the avatar is still standing.
pub(crate) fn ground(
    step: &mut Step,
    cx: &mut ControllerContext,
    avatar: &Avatar,
    actors: &impl ActorQuery,
) {
    if let Some(mut attachment) = cx.attachment {
        let Some(actor) = actors.actor(attachment.actor) else {
            cx.detach();
            cx.velocity.set_y(0);
            step.next = Next::enter(StateKind::Fall);
            return;
        };

        let bounds = &avatar.bounds;
        let off_right = avatar.pos.x + (bounds.left << SUBPIXEL_SHIFT)
            > actor.pos.x + 16 + (actor.bounds.right << SUBPIXEL_SHIFT);
        let off_left = avatar.pos.x + 16 + (bounds.right << SUBPIXEL_SHIFT)
            < actor.pos.x + (actor.bounds.left << SUBPIXEL_SHIFT);

        if actor.disabled || off_right || off_left {
            cx.detach();
            step.next = Next::enter(StateKind::Fall);
        } else {
            cx.delta.x += actor.pos.x - attachment.last_pos.x;
            attachment.last_pos.x = actor.pos.x;
        }

        // Riding replaces gravity with the actor's own vertical motion.
        cx.velocity.set_y(0);
        cx.delta.y += actor.pos.y - attachment.last_pos.y;
        attachment.last_pos.y = actor.pos.y;
        step.reference_y = actor.pos.y;
        if cx.attachment.is_some() {
            cx.attachment = Some(attachment);
        }
    } else if cx.timers.drop_through != 0 {
        cx.velocity.set_y(DROP_VELOCITY);
    } else {
        fall_by(step, cx, step.config.grav);
        // Cancelled by the tile sweep if the floor is still there.
        step.next = Next::enter(StateKind::Fall);
    }
    cx.delta.y += cx.velocity.step_y();
}

pub(crate) fn jump(step: &mut Step, cx: &mut ControllerContext, jump: &mut JumpState) {
    let config = step.config;
    let tuning = step.tuning;
    let held = step.input.jump();

    if jump.hold_frames != 0 && held {
        let mut vy = cx.velocity.y() - tuning.jump_per_frame;
        if config.jump_vel >= cx.charges.jump_reduction {
            vy += cx.charges.jump_reduction;
        } else {
            vy = 0;
        }
        // Running speed adds lift. vy is negative here.
        let boost = ((cx.velocity.x() >> 8) * tuning.boost_per_frame).abs();
        if boost > VELOCITY_LIMIT + vy {
            vy = -VELOCITY_LIMIT;
        } else {
            vy -= boost;
        }
        cx.velocity.set_y(vy);
        jump.hold_frames -= 1;
    } else if held && cx.velocity.y() < 0 {
        fall_by(step, cx, config.hold_grav);
    } else if cx.velocity.y() >= 0 {
        step.next = Next::enter(StateKind::Fall);
        fall_by(step, cx, config.grav);
    } else {
        fall_by(step, cx, config.grav);
    }
    cx.delta.y += cx.velocity.step_y();
}

pub(crate) fn wall(step: &mut Step, cx: &mut ControllerContext) {
    if cx.timers.drop_through != 0 {
        cx.velocity.set_y(DROP_VELOCITY);
    } else if cx.velocity.y() < 0 {
        fall_by(step, cx, step.config.grav);
    } else if cx.wall_slide {
        cx.velocity.set_y(step.config.wall_grav);
    } else {
        fall_by(step, cx, step.config.grav);
    }
    cx.delta.y += cx.velocity.step_y();
}

pub(crate) fn knockback(step: &mut Step, cx: &mut ControllerContext) {
    let drag = step.config.air_dec;
    let vx = cx.velocity.x();
    if vx < 0 {
        cx.velocity.set_x((vx + drag).min(0));
    } else if vx > 0 {
        cx.velocity.set_x((vx - drag).max(0));
    }
    cx.delta.x += cx.velocity.step_x();

    fall_by(step, cx, step.config.grav);
    cx.delta.y += cx.velocity.step_y();
    cx.timers.drop_through = 0;
}

/// Ladder body: climb along ladder tiles, or step off sideways where no wall
/// blocks the way. Moves the avatar directly.
pub(crate) fn ladder(
    step: &mut Step,
    cx: &mut ControllerContext,
    avatar: &mut Avatar,
    tile_map: &impl TileQuery,
) {
    let bounds = avatar.bounds;
    let column = tiles::ladder_column(avatar);
    let py = avatar.pos.y >> SUBPIXEL_SHIFT;
    let input = step.input;

    cx.velocity.set_y(0);
    if input.up() {
        let row = tile_of(py + bounds.top + 1);
        if tile_map.tile_at(column, row).is_ladder() {
            cx.velocity.set_y(-step.config.climb_vel);
        }
    } else if input.down() {
        let row = tile_of(py + bounds.bottom + 1);
        if tile_map.tile_at(column, row).is_ladder() {
            cx.velocity.set_y(step.config.climb_vel);
        }
    } else if input.left() {
        step.next = if tiles::column_blocked(tile_map, avatar, column - 1, TileFlags::RIGHT) {
            Next::stay(StateKind::Ladder)
        } else {
            Next::enter(StateKind::Fall)
        };
    } else if input.right() {
        step.next = if tiles::column_blocked(tile_map, avatar, column + 1, TileFlags::LEFT) {
            Next::stay(StateKind::Ladder)
        } else {
            Next::enter(StateKind::Fall)
        };
    }
    avatar.pos.y += cx.velocity.step_y();

    avatar.animation = if cx.velocity.y() == 0 {
        Animation::ClimbIdle
    } else {
        Animation::Climb
    };

    if input.pressed(Buttons::JUMP) {
        step.next = Next::enter(StateKind::Fall);
    }
}
