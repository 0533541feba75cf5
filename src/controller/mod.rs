//! Controller domain: the tile platformer state machine and its bevy plugin.
//!
//! [`Controller::tick`] advances one avatar by one frame against any
//! [`ControllerHost`](crate::world::ControllerHost). [`ControllerPlugin`]
//! drives it from `FixedUpdate` against the ECS world.

mod actors;
mod config;
mod context;
mod dash;
mod driver;
mod events;
mod horizontal;
mod input;
mod state;
mod systems;
mod tiles;
mod transitions;
mod vertical;


pub use config::{
    CameraBlock, ConfigError, ControllerConfig, DashInput, DashMomentum, DashStyle, DashThrough,
    DropThrough, FloatInput, RunProfile, Tuning, VELOCITY_LIMIT, load_config, parse_config,
};
pub use context::{
    Attachment, Charges, ControllerContext, SETTLE_VELOCITY, Timers, UNLIMITED_JUMPS, Velocity,
};
pub use driver::{Controller, ControllerSnapshot, TickReport};
pub use events::{ActorCollidedEvent, ScriptRequestedEvent, TriggerFiredEvent};
pub use input::{Buttons, InputSnapshot, PendingInput};
pub use state::{
    ControllerState, DashState, JumpState, JumpType, Next, Phase, RunStage, ScriptSlot, SlotPhase,
    StateKind, WallSide,
};
pub use systems::TriggerOccupancy;

use bevy::prelude::*;

use input::sample_keyboard;
use systems::{run_controller, setup_controller, sync_avatar_transform};

/// Simulation rate of the controller tick.
pub const TICK_HZ: f64 = 60.0;

/// Schedule label for the controller tick. Actor movers run before it.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ControllerTick;

pub struct ControllerPlugin;

impl Plugin for ControllerPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_hz(TICK_HZ))
            .init_resource::<PendingInput>()
            .init_resource::<TriggerOccupancy>()
            .add_message::<ScriptRequestedEvent>()
            .add_message::<ActorCollidedEvent>()
            .add_message::<TriggerFiredEvent>()
            .add_systems(Startup, setup_controller)
            .add_systems(Update, (sample_keyboard, sync_avatar_transform))
            .add_systems(FixedUpdate, run_controller.in_set(ControllerTick));
    }
}
