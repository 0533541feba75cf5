//! Controller domain: the per-tick stage pipeline and its external controls.

use bevy::prelude::*;
use bitflags::bitflags;
use serde::Serialize;
use std::collections::HashMap;

use super::config::{ConfigError, ControllerConfig, DashThrough, Tuning};
use super::context::{ControllerContext, count_down};
use super::input::{Buttons, InputSnapshot};
use super::state::{
    ControllerState, JumpState, JumpType, Next, Phase, RunStage, ScriptSlot, StateKind, WallSide,
};
use super::{actors, dash, horizontal, tiles, transitions, vertical};
use crate::world::{Avatar, ControllerHost, ScriptOrigin, ScriptRef, Viewport};

bitflags! {
    /// Shared pipeline stages a state body asks the driver to run after it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Stages: u8 {
        const ACCELERATE  = 1 << 0;
        const TILE_X      = 1 << 1;
        const TILE_Y      = 1 << 2;
        const ACTORS      = 1 << 3;
        const TRANSITIONS = 1 << 4;
        const TRIGGERS    = 1 << 5;

        const COAST = Self::TILE_X.bits()
            | Self::TILE_Y.bits()
            | Self::ACTORS.bits()
            | Self::TRANSITIONS.bits()
            | Self::TRIGGERS.bits();
        const STEER = Self::COAST.bits() | Self::ACCELERATE.bits();
    }
}

/// Read-only inputs and per-tick scratch shared by every stage.
pub(crate) struct Step<'a> {
    pub config: &'a ControllerConfig,
    pub tuning: &'a Tuning,
    pub input: &'a InputSnapshot,
    pub viewport: Viewport,
    /// State whose body runs this tick.
    pub current: StateKind,
    /// The body's one-time setup ran this tick.
    pub entered: bool,
    /// Request for the next tick. Starts as "stay in `current`".
    pub next: Next,
    /// Wall contact found this tick.
    pub wall_touch: WallSide,
    /// Avatar y before this tick's movement; decides landing on actors.
    pub reference_y: i32,
    pub dash_pressed: bool,
}

impl Step<'_> {
    pub fn touch_wall(&mut self, cx: &mut ControllerContext, side: WallSide) {
        self.wall_touch = side;
        cx.last_wall = side;
        cx.timers.wall_coyote = self.config.wall_coyote_max;
    }

    pub fn leaving(&self) -> bool {
        !self.next.is_stay(self.current)
    }
}

/// What a tick did, for hosts and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub state: StateKind,
    pub next: Next,
    pub slot: ScriptSlot,
    /// A trigger cut the tick short before counters and scripts.
    pub stopped: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ControllerSnapshot {
    pub state: ControllerState,
    pub pending: Next,
    pub context: ControllerContext,
    pub tuning: Tuning,
}

/// The platformer controller for one avatar in one scene.
#[derive(Resource, Debug, Clone)]
pub struct Controller {
    config: ControllerConfig,
    tuning: Tuning,
    state: ControllerState,
    pending: Next,
    cx: ControllerContext,
    scripts: HashMap<ScriptSlot, ScriptRef>,
}

impl Controller {
    /// Build a controller for a scene. The config is expected to have
    /// passed [`ControllerConfig::validate`]; see [`Controller::try_new`].
    pub fn new(config: ControllerConfig) -> Self {
        let tuning = Tuning::derive(&config);
        let cx = ControllerContext::new(&config);
        Self {
            config,
            tuning,
            state: ControllerState::Ground,
            pending: Next::stay(StateKind::Ground),
            cx,
            scripts: HashMap::new(),
        }
    }

    pub fn try_new(config: ControllerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Reset velocities, timers and attachment for a new scene. State
    /// scripts survive.
    pub fn reset(&mut self) {
        self.state = ControllerState::Ground;
        self.pending = Next::stay(StateKind::Ground);
        self.cx = ControllerContext::new(&self.config);
    }

    /// Advance one simulation frame.
    pub fn tick<H: ControllerHost>(
        &mut self,
        avatar: &mut Avatar,
        input: &InputSnapshot,
        host: &mut H,
    ) -> TickReport {
        let Controller {
            config,
            tuning,
            state,
            pending,
            cx,
            scripts,
        } = self;
        let config = &*config;
        let tuning = &*tuning;

        let dash_pressed = dash::detect_input(config, input, &mut cx.timers);
        let entered = pending.phase == Phase::Init;
        let mut step = Step {
            config,
            tuning,
            input,
            viewport: host.viewport(),
            current: pending.kind,
            entered,
            next: Next::stay(pending.kind),
            wall_touch: WallSide::None,
            reference_y: avatar.pos.y,
            dash_pressed,
        };

        if entered {
            *state = enter(&mut step, cx, avatar, &*host);
        }
        let stages = run_body(&mut step, state, cx, avatar, &*host);

        if stages.contains(Stages::ACCELERATE) {
            horizontal::update(&step, cx);
        }
        if stages.contains(Stages::TILE_X) {
            tiles::collide_x(&mut step, cx, avatar, &*host);
        }
        if stages.contains(Stages::TILE_Y) {
            tiles::collide_y(&mut step, cx, avatar, &*host);
        }
        if stages.contains(Stages::ACTORS) {
            actors::resolve(&mut step, cx, avatar, host);
        }
        if stages.contains(Stages::TRANSITIONS) {
            transitions::run(&mut step, state, cx, avatar, &*host);
        }

        let stopped = stages.contains(Stages::TRIGGERS)
            && host.activate_triggers(avatar.pos, &avatar.bounds, input.pressed(Buttons::UP));

        let slot = ScriptSlot::for_tick(step.current, step.entered, step.leaving());
        if !stopped {
            count_down_globals(config, cx);
            if let Some(script) = scripts.get(&slot) {
                debug!("dispatching state script {:?} for {:?}", script, slot);
                host.execute_script(*script, ScriptOrigin::State(slot));
            }
        }

        if step.leaving() {
            debug!("controller {:?} -> {:?}", step.current, step.next);
        }
        *pending = step.next;

        TickReport {
            state: step.current,
            next: step.next,
            slot,
            stopped,
        }
    }

    // ------------------------------------------------------------------
    // External controls

    /// Queue `kind`'s setup for the next tick.
    pub fn set_state(&mut self, kind: StateKind) {
        debug!("state {:?} requested externally", kind);
        self.pending = Next::enter(kind);
    }

    pub fn detach(&mut self) {
        self.cx.detach();
    }

    /// End an active dash; the next tick falls.
    pub fn interrupt_dash(&mut self) {
        if self.pending.kind == StateKind::Dash {
            debug!("dash interrupted");
            self.pending = Next::enter(StateKind::Fall);
        }
    }

    pub fn set_wall_slide(&mut self, enabled: bool) {
        self.cx.wall_slide = enabled;
    }

    pub fn set_extra_jumps(&mut self, count: u8) {
        self.cx.charges.extra_jumps = count;
    }

    pub fn set_wall_jumps(&mut self, count: u8) {
        self.cx.charges.wall_jumps = count;
    }

    pub fn set_state_script(&mut self, slot: ScriptSlot, script: ScriptRef) {
        self.scripts.insert(slot, script);
    }

    pub fn clear_state_script(&mut self, slot: ScriptSlot) {
        self.scripts.remove(&slot);
    }

    // ------------------------------------------------------------------
    // Queries

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn pending(&self) -> Next {
        self.pending
    }

    pub fn context(&self) -> &ControllerContext {
        &self.cx
    }

    pub fn jump_type(&self) -> JumpType {
        self.cx.jump_type
    }

    pub fn run_stage(&self) -> RunStage {
        self.cx.run_stage
    }

    pub fn coyote_frames(&self) -> u8 {
        self.cx.timers.coyote
    }

    pub fn extra_jumps(&self) -> u8 {
        self.cx.charges.extra_jumps
    }

    pub fn wall_jumps(&self) -> u8 {
        self.cx.charges.wall_jumps
    }

    pub fn touching_wall(&self) -> WallSide {
        self.cx.last_wall
    }

    pub fn is_attached(&self) -> bool {
        self.cx.attachment.is_some()
    }

    pub fn camera_deadzone(&self) -> u8 {
        self.cx.camera_deadzone
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            state: self.state,
            pending: self.pending,
            context: self.cx.clone(),
            tuning: self.tuning,
        }
    }

    #[cfg(test)]
    pub(crate) fn context_mut(&mut self) -> &mut ControllerContext {
        &mut self.cx
    }
}

/// One-time setup for the state being entered.
fn enter<H: ControllerHost>(
    step: &mut Step,
    cx: &mut ControllerContext,
    avatar: &mut Avatar,
    host: &H,
) -> ControllerState {
    let config = step.config;
    match step.current {
        StateKind::Fall => {
            cx.detach();
            ControllerState::Fall
        }
        StateKind::Ground => {
            cx.velocity.set_y(config.ground_rest_vel);
            cx.jump_type = JumpType::None;
            cx.timers.wall_coyote = 0;
            cx.timers.coyote = config.coyote_max;
            cx.charges.extra_jumps = config.extra_jumps;
            cx.charges.wall_jumps = config.wall_jump_max;
            cx.charges.jump_reduction = 0;
            ControllerState::Ground
        }
        StateKind::Jump => {
            cx.detach();
            cx.velocity.set_y(-config.jump_min);
            cx.timers.jump_buffer = 0;
            cx.timers.coyote = 0;
            cx.timers.wall_coyote = 0;
            ControllerState::Jump(JumpState {
                hold_frames: step.tuning.hold_jump_max,
            })
        }
        StateKind::Dash => ControllerState::Dash(dash::start(step, cx, avatar, host)),
        StateKind::Ladder => {
            cx.jump_type = JumpType::None;
            ControllerState::Ladder
        }
        StateKind::Wall => {
            cx.jump_type = JumpType::None;
            cx.run_stage = RunStage::Base;
            ControllerState::Wall
        }
        StateKind::Knockback => {
            cx.jump_type = JumpType::None;
            cx.run_stage = RunStage::Base;
            ControllerState::Knockback
        }
        StateKind::Blank => {
            cx.velocity.set_x(0);
            cx.velocity.set_y(0);
            cx.jump_type = JumpType::None;
            cx.run_stage = RunStage::Base;
            ControllerState::Blank
        }
    }
}

/// Steady body of the active state. Returns the shared stages to run after it.
fn run_body<H: ControllerHost>(
    step: &mut Step,
    state: &mut ControllerState,
    cx: &mut ControllerContext,
    avatar: &mut Avatar,
    host: &H,
) -> Stages {
    match state {
        ControllerState::Fall => {
            vertical::fall(step, cx);
            airborne_stages(step, cx)
        }
        ControllerState::Ground => {
            vertical::ground(step, cx, avatar, host);
            Stages::STEER
        }
        ControllerState::Jump(jump) => {
            vertical::jump(step, cx, jump);
            airborne_stages(step, cx)
        }
        ControllerState::Dash(dash) => {
            dash::advance(step, cx, avatar, dash, host);
            let mut stages = Stages::TRANSITIONS | Stages::TRIGGERS | Stages::ACTORS;
            if step.config.dash_through >= DashThrough::Actors {
                stages.remove(Stages::ACTORS);
            }
            if step.config.dash_through >= DashThrough::ActorsAndTriggers {
                stages.remove(Stages::TRIGGERS);
            }
            stages
        }
        ControllerState::Ladder => {
            vertical::ladder(step, cx, avatar, host);
            Stages::ACTORS | Stages::TRIGGERS
        }
        ControllerState::Wall => {
            vertical::wall(step, cx);
            Stages::STEER
        }
        ControllerState::Knockback => {
            vertical::knockback(step, cx);
            Stages::COAST
        }
        ControllerState::Blank => Stages::ACTORS | Stages::TRIGGERS,
    }
}

/// Air control is lost during a wall-jump lockout or when disabled outright;
/// the avatar then coasts on its current velocity.
fn airborne_stages(step: &Step, cx: &mut ControllerContext) -> Stages {
    if cx.timers.no_control != 0 || !step.config.air_control {
        cx.delta.x += cx.velocity.step_x();
        Stages::COAST
    } else {
        Stages::STEER
    }
}

fn count_down_globals(config: &ControllerConfig, cx: &mut ControllerContext) {
    cx.timers.dash_ready = cx.timers.dash_ready.saturating_sub(1);
    cx.timers.tap -= cx.timers.tap.signum();
    if cx.camera_deadzone > config.camera_deadzone_x {
        count_down(&mut cx.camera_deadzone);
    }
}
