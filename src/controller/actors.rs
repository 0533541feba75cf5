//! Controller domain: collision with solid and platform actors.

use bevy::prelude::*;

use super::context::ControllerContext;
use super::driver::Step;
use super::input::Buttons;
use super::state::{Next, StateKind, WallSide};
use crate::world::{ActorView, Avatar, ControllerHost, SUBPIXEL_SHIFT, ScriptOrigin};

/// How far ahead an interact press looks for a scriptable actor, in pixels.
pub const INTERACT_DISTANCE: i32 = 8;

/// Feet rest this many sub-pixels above a ridden actor's top.
const RIDE_GAP: i32 = 4;

/// Resolve the single overlapping actor, or fire an interact script.
///
/// Clears the queued displacement first; push-out written here is applied by
/// the next tick's tile sweep.
pub(crate) fn resolve<H: ControllerHost>(
    step: &mut Step,
    cx: &mut ControllerContext,
    avatar: &mut Avatar,
    host: &mut H,
) {
    cx.delta = IVec2::ZERO;
    let hit = host.overlapping(avatar.pos, &avatar.bounds);

    if let Some(actor) = hit.filter(|actor| actor.collision_group != 0) {
        let config = step.config;
        // TODO: an avatar riding one platform and struck by a second is
        // caught half-way onto it; apply the ridden actor's motion before
        // testing the new one.
        let fresh = !cx.is_attached_to(actor.id);
        if actor.collision_group == config.solid_group {
            if fresh && !try_attach(step, cx, avatar, &actor) {
                push_out(step, cx, avatar, &actor);
            }
        } else if actor.collision_group == config.platform_group && fresh {
            try_attach(step, cx, avatar, &actor);
        }
        host.register_collision(actor.id);
        return;
    }

    if step.input.pressed(Buttons::INTERACT) {
        let target = hit.or_else(|| {
            host.in_front(avatar.pos, &avatar.bounds, avatar.facing, INTERACT_DISTANCE)
        });
        if let Some(actor) = target {
            if actor.collision_group == 0 {
                if let Some(script) = actor.script {
                    debug!("interact script on actor {:?}", actor.id);
                    host.execute_script(script, ScriptOrigin::Interact(actor.id));
                }
            }
        }
    }
}

/// Stand on `actor` if the avatar came from above and is not rising.
fn try_attach(
    step: &mut Step,
    cx: &mut ControllerContext,
    avatar: &mut Avatar,
    actor: &ActorView,
) -> bool {
    if step.reference_y >= actor.top() || cx.velocity.y() < 0 {
        return false;
    }
    cx.attach(actor.id, actor.pos);
    avatar.pos.y = actor.top() - (avatar.bounds.bottom << SUBPIXEL_SHIFT) - RIDE_GAP;
    cx.velocity.set_y(0);
    step.next = Next::enter(StateKind::Ground);
    true
}

/// Solid actor hit from below or from the side.
fn push_out(step: &mut Step, cx: &mut ControllerContext, avatar: &Avatar, actor: &ActorView) {
    let bounds = &avatar.bounds;
    let input = step.input;

    if step.reference_y + (bounds.top << SUBPIXEL_SHIFT) > actor.bottom() {
        // Head bump: drop to 2 px under the actor.
        cx.delta.y += (actor.pos.y - avatar.pos.y)
            + ((actor.bounds.bottom - bounds.top) << SUBPIXEL_SHIFT)
            + 32;
        cx.velocity.set_y(step.config.grav);
        if step.next.is_stay(StateKind::Jump) || cx.attachment.is_some() {
            step.next = Next::enter(StateKind::Fall);
        }
    } else if avatar.pos.x < actor.pos.x {
        cx.delta.x = (actor.pos.x - avatar.pos.x)
            - ((bounds.right - actor.bounds.left) << SUBPIXEL_SHIFT);
        step.touch_wall(cx, WallSide::Right);
        if !input.right() {
            cx.velocity.set_x(0);
        }
        if step.next.is_stay(StateKind::Dash) {
            step.next = Next::enter(StateKind::Fall);
        }
    } else if avatar.pos.x > actor.pos.x {
        cx.delta.x = (actor.pos.x - avatar.pos.x)
            + ((actor.bounds.right - bounds.left) << SUBPIXEL_SHIFT)
            + 16;
        step.touch_wall(cx, WallSide::Left);
        if !input.left() {
            cx.velocity.set_x(0);
        }
        if step.next.is_stay(StateKind::Dash) {
            step.next = Next::enter(StateKind::Fall);
        }
    }
}
