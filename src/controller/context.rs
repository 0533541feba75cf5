//! Controller domain: mutable per-scene data threaded through every stage.

use bevy::prelude::*;
use serde::Serialize;

use super::config::{ControllerConfig, Tuning, VELOCITY_LIMIT};
use super::state::{JumpType, RunStage, WallSide};
use crate::world::{ActorId, VELOCITY_SHIFT};

/// Vertical velocity on scene entry so the avatar settles onto the floor.
pub const SETTLE_VELOCITY: i32 = 4000;

/// Fixed-point velocity, 256 units per sub-pixel. Every write saturates at
/// [`VELOCITY_LIMIT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Velocity {
    x: i32,
    y: i32,
}

impl Velocity {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            x: Self::saturate(x),
            y: Self::saturate(y),
        }
    }

    pub fn saturate(value: i32) -> i32 {
        value.clamp(-VELOCITY_LIMIT, VELOCITY_LIMIT)
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn set_x(&mut self, x: i32) {
        self.x = Self::saturate(x);
    }

    pub fn set_y(&mut self, y: i32) {
        self.y = Self::saturate(y);
    }

    pub fn add_x(&mut self, dx: i32) {
        self.set_x(self.x.saturating_add(dx));
    }

    pub fn add_y(&mut self, dy: i32) {
        self.set_y(self.y.saturating_add(dy));
    }

    /// This tick's horizontal displacement in sub-pixels.
    pub fn step_x(&self) -> i32 {
        self.x >> VELOCITY_SHIFT
    }

    pub fn step_y(&self) -> i32 {
        self.y >> VELOCITY_SHIFT
    }
}

/// Countdown windows. All stop at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Timers {
    pub coyote: u8,
    pub wall_coyote: u8,
    pub jump_buffer: u8,
    pub no_control: u8,
    /// Ticks left with downward tile collision suspended.
    pub drop_through: u8,
    pub dash_ready: u16,
    /// Positive after a right tap, negative after a left tap.
    pub tap: i8,
}

pub(crate) fn count_down(timer: &mut u8) {
    *timer = timer.saturating_sub(1);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Charges {
    /// 255 never runs out.
    pub extra_jumps: u8,
    pub wall_jumps: u8,
    /// Per-frame jump force removed by earlier air jumps.
    pub jump_reduction: i32,
}

pub const UNLIMITED_JUMPS: u8 = u8::MAX;

/// Ridden actor and where it was last tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub actor: ActorId,
    pub last_pos: IVec2,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControllerContext {
    pub velocity: Velocity,
    pub timers: Timers,
    pub charges: Charges,
    pub attachment: Option<Attachment>,
    /// Sub-pixel displacement queued for the tile sweep. Actor push-out
    /// leaves it for the next tick.
    pub delta: IVec2,
    pub last_wall: WallSide,
    pub jump_type: JumpType,
    pub run_stage: RunStage,
    pub camera_deadzone: u8,
    pub wall_slide: bool,
}

impl ControllerContext {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            velocity: Velocity::new(0, SETTLE_VELOCITY),
            timers: Timers::default(),
            charges: Charges {
                extra_jumps: config.extra_jumps,
                wall_jumps: config.wall_jump_max,
                jump_reduction: 0,
            },
            attachment: None,
            delta: IVec2::ZERO,
            last_wall: WallSide::None,
            jump_type: JumpType::None,
            run_stage: RunStage::Base,
            camera_deadzone: config.camera_deadzone_x,
            wall_slide: config.wall_slide,
        }
    }

    pub fn detach(&mut self) {
        if let Some(attachment) = self.attachment.take() {
            debug!("detached from actor {:?}", attachment.actor);
        }
    }

    pub fn attach(&mut self, actor: ActorId, pos: IVec2) {
        debug!("attached to actor {:?}", actor);
        self.attachment = Some(Attachment {
            actor,
            last_pos: pos,
        });
    }

    pub fn is_attached_to(&self, actor: ActorId) -> bool {
        self.attachment.is_some_and(|a| a.actor == actor)
    }

    /// Spend an air jump. Returns false when none remain.
    pub fn spend_extra_jump(&mut self, tuning: &Tuning) -> bool {
        if self.charges.extra_jumps == 0 {
            return false;
        }
        if self.charges.extra_jumps != UNLIMITED_JUMPS {
            self.charges.extra_jumps -= 1;
        }
        self.charges.jump_reduction += tuning.jump_reduction_per_frame;
        true
    }
}
