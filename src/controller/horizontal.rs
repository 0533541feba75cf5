//! Controller domain: horizontal acceleration profiles and drag.
//!
//! Curves are written for rightward travel. Leftward input mirrors the
//! velocity, runs the same curve, and mirrors the result back.

use super::config::{ControllerConfig, RunProfile};
use super::context::ControllerContext;
use super::driver::Step;
use super::state::{RunStage, StateKind};

/// Result of one curve evaluation on a mirrored (rightward) velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Curve {
    pub velocity: i32,
    pub stage: RunStage,
    /// Speed to move this tick instead of the new velocity, used where a
    /// tier boundary must not be overshot in a single step.
    pub capped_speed: Option<i32>,
}

impl Curve {
    fn to(velocity: i32, stage: RunStage) -> Self {
        Self {
            velocity,
            stage,
            capped_speed: None,
        }
    }

    fn capped(velocity: i32, stage: RunStage, speed: i32) -> Self {
        Self {
            velocity,
            stage,
            capped_speed: Some(speed),
        }
    }
}

fn clamp_speed(value: i32, low: i32, high: i32) -> i32 {
    value.max(low).min(high)
}

fn turn(velocity: i32, config: &ControllerConfig) -> Option<Curve> {
    (velocity < 0 && config.turn_acc != 0).then(|| {
        Curve::to(
            (velocity + config.turn_acc).min(config.walk_vel),
            RunStage::Turning,
        )
    })
}

pub(crate) fn walk_curve(velocity: i32, config: &ControllerConfig) -> Curve {
    turn(velocity, config).unwrap_or_else(|| {
        Curve::to(
            clamp_speed(velocity + config.walk_acc, config.min_vel, config.walk_vel),
            RunStage::Base,
        )
    })
}

/// Lower tier shared by the tiered profiles.
fn walk_tier(velocity: i32, config: &ControllerConfig) -> Curve {
    Curve::to(
        (velocity + config.walk_acc).max(config.min_vel),
        RunStage::Tier(1),
    )
}

pub(crate) fn run_curve(velocity: i32, config: &ControllerConfig) -> Curve {
    if let Some(turning) = turn(velocity, config) {
        return turning;
    }

    let walk = config.walk_vel;
    let run = config.run_vel;
    match config.run_profile {
        RunProfile::Walk => walk_curve(velocity, config),
        RunProfile::Smooth => Curve::to(
            clamp_speed(velocity + config.run_acc, config.min_vel, run),
            RunStage::Tier(1),
        ),
        RunProfile::TwoTier => {
            if velocity < walk {
                walk_tier(velocity, config)
            } else {
                Curve::to((velocity + config.run_acc).min(run), RunStage::Tier(2))
            }
        }
        RunProfile::TwoTierCapped => {
            if velocity < walk {
                walk_tier(velocity, config)
            } else if velocity < run {
                Curve::capped(
                    (velocity + config.run_acc).min(run),
                    RunStage::Tier(2),
                    walk,
                )
            } else {
                Curve::to(velocity.min(run), RunStage::Tier(3))
            }
        }
        RunProfile::ThreeTier => {
            let mid = ((run - walk) >> 1) + walk;
            if velocity < walk {
                walk_tier(velocity, config)
            } else if velocity < mid {
                Curve::capped(
                    (velocity + config.run_acc).min(run),
                    RunStage::Tier(2),
                    walk,
                )
            } else if velocity < run {
                Curve::capped(
                    (velocity + config.run_acc).min(run),
                    RunStage::Tier(3),
                    mid,
                )
            } else {
                Curve::to(velocity.min(run), RunStage::Tier(4))
            }
        }
        RunProfile::Instant => Curve::to(run, RunStage::Tier(1)),
    }
}

/// Accelerate towards `dir` (-1 or 1) and queue this tick's displacement.
pub(crate) fn accelerate(step: &Step, cx: &mut ControllerContext, dir: i32) {
    let config = step.config;
    let mirrored = cx.velocity.x() * dir;
    let curve = if step.input.run() {
        run_curve(mirrored, config)
    } else {
        walk_curve(mirrored, config)
    };

    cx.velocity.set_x(curve.velocity * dir);
    cx.run_stage = curve.stage;
    cx.delta.x += match curve.capped_speed {
        Some(speed) => dir * (speed >> 8),
        None => cx.velocity.step_x(),
    };
}

/// Drag towards zero without crossing it.
pub(crate) fn decelerate(step: &Step, cx: &mut ControllerContext) {
    let drag = if step.current == StateKind::Ground {
        step.config.dec
    } else {
        step.config.air_dec
    };
    let vx = cx.velocity.x();
    let slowed = if vx > 0 {
        (vx - drag).max(0)
    } else if vx < 0 {
        (vx + drag).min(0)
    } else {
        0
    };
    cx.velocity.set_x(slowed);
    cx.run_stage = RunStage::Base;
    cx.delta.x += cx.velocity.step_x();
}

pub(crate) fn update(step: &Step, cx: &mut ControllerContext) {
    match step.input.direction() {
        0 => decelerate(step, cx),
        dir => accelerate(step, cx, dir),
    }
}
