//! Controller domain: state machine vocabulary.

use serde::{Deserialize, Serialize};

/// Logical controller states. Exactly one is active per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateKind {
    Fall,
    Ground,
    Jump,
    Dash,
    Ladder,
    Wall,
    Knockback,
    Blank,
}

impl StateKind {
    pub const ALL: [StateKind; 8] = [
        StateKind::Fall,
        StateKind::Ground,
        StateKind::Jump,
        StateKind::Dash,
        StateKind::Ladder,
        StateKind::Wall,
        StateKind::Knockback,
        StateKind::Blank,
    ];

    /// Externally driven states never report an `End` script slot.
    pub fn has_end_slot(self) -> bool {
        !matches!(self, StateKind::Knockback | StateKind::Blank)
    }
}

/// Jump hold window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JumpState {
    pub hold_frames: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashState {
    /// Steps still to run, including the current one.
    pub frames_left: u8,
    /// The landing box was free when the dash started, so walls are ignored.
    pub end_clear: bool,
}

/// Active state together with the data only that state needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ControllerState {
    Fall,
    Ground,
    Jump(JumpState),
    Dash(DashState),
    Ladder,
    Wall,
    Knockback,
    Blank,
}

impl ControllerState {
    pub fn kind(&self) -> StateKind {
        match self {
            ControllerState::Fall => StateKind::Fall,
            ControllerState::Ground => StateKind::Ground,
            ControllerState::Jump(_) => StateKind::Jump,
            ControllerState::Dash(_) => StateKind::Dash,
            ControllerState::Ladder => StateKind::Ladder,
            ControllerState::Wall => StateKind::Wall,
            ControllerState::Knockback => StateKind::Knockback,
            ControllerState::Blank => StateKind::Blank,
        }
    }
}

/// Whether the requested state runs its one-time setup first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Init,
    Steady,
}

/// Transition request consumed at the start of the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Next {
    pub kind: StateKind,
    pub phase: Phase,
}

impl Next {
    pub const fn enter(kind: StateKind) -> Self {
        Self {
            kind,
            phase: Phase::Init,
        }
    }

    pub const fn stay(kind: StateKind) -> Self {
        Self {
            kind,
            phase: Phase::Steady,
        }
    }

    pub fn is_enter(&self, kind: StateKind) -> bool {
        *self == Self::enter(kind)
    }

    pub fn is_stay(&self, kind: StateKind) -> bool {
        *self == Self::stay(kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotPhase {
    Start,
    Active,
    End,
}

/// Key for a per-state user script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScriptSlot {
    pub state: StateKind,
    pub phase: SlotPhase,
}

impl ScriptSlot {
    pub const fn new(state: StateKind, phase: SlotPhase) -> Self {
        Self { state, phase }
    }

    /// Slot a finished tick reports: `End` when leaving, `Start` when the
    /// state was entered this tick, `Active` otherwise.
    pub fn for_tick(state: StateKind, entered: bool, leaving: bool) -> Self {
        let phase = if leaving && state.has_end_slot() {
            SlotPhase::End
        } else if entered {
            SlotPhase::Start
        } else {
            SlotPhase::Active
        };
        Self::new(state, phase)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JumpType {
    #[default]
    None,
    Ground,
    Double,
    Wall,
    Float,
}

/// Which acceleration tier the last horizontal update used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunStage {
    /// Braking against the current direction of travel.
    Turning,
    /// Walking, decelerating, or standing.
    #[default]
    Base,
    /// Run tier 1-4; meaning depends on the run profile.
    Tier(u8),
}

impl RunStage {
    pub fn as_i8(self) -> i8 {
        match self {
            RunStage::Turning => -1,
            RunStage::Base => 0,
            RunStage::Tier(tier) => tier as i8,
        }
    }
}

/// Horizontal side of a wall contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WallSide {
    #[default]
    None,
    Left,
    Right,
}

impl WallSide {
    pub fn sign(self) -> i32 {
        match self {
            WallSide::None => 0,
            WallSide::Left => -1,
            WallSide::Right => 1,
        }
    }

    pub fn is_touching(self) -> bool {
        self != WallSide::None
    }
}
