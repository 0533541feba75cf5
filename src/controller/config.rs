//! Controller domain: tuning surface, derived per-frame constants, and RON loading.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::level::ron_options;

/// Largest magnitude a velocity component may hold.
pub const VELOCITY_LIMIT: i32 = 32767;

/// Headroom the overflow search keeps below [`VELOCITY_LIMIT`].
const OVERFLOW_HEADROOM: i32 = 32000;

/// Hold-jump force is never spread over more than this many frames.
const MAX_JUMP_SPREAD: u8 = 15;

/// Acceleration curve used while the run button is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunProfile {
    /// Run behaves like walking.
    Walk,
    /// One curve from standstill to run speed.
    #[default]
    Smooth,
    /// Walk acceleration up to walk speed, then run acceleration.
    TwoTier,
    /// Straight to run speed.
    Instant,
    /// Two tiers; the step that crosses the walk cap only moves at walk speed.
    TwoTierCapped,
    /// Walk, mid-run, run tiers with capped crossing steps.
    ThreeTier,
}

impl RunProfile {
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Walk),
            1 => Some(Self::Smooth),
            2 => Some(Self::TwoTier),
            3 => Some(Self::Instant),
            4 => Some(Self::TwoTierCapped),
            5 => Some(Self::ThreeTier),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FloatInput {
    #[default]
    Off,
    HoldJump,
    HoldUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DashInput {
    Off,
    #[default]
    Interact,
    /// Two presses of the same direction inside `tap_window` ticks.
    DoubleTap,
    /// Down and jump together, pressed in either order.
    DownJump,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DashStyle {
    Ground,
    Air,
    #[default]
    Both,
}

impl DashStyle {
    pub fn allows_ground(self) -> bool {
        self != DashStyle::Air
    }

    pub fn allows_air(self) -> bool {
        self != DashStyle::Ground
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DashMomentum {
    #[default]
    None,
    Horizontal,
    Vertical,
    Both,
}

impl DashMomentum {
    pub fn horizontal(self) -> bool {
        matches!(self, DashMomentum::Horizontal | DashMomentum::Both)
    }

    pub fn vertical(self) -> bool {
        matches!(self, DashMomentum::Vertical | DashMomentum::Both)
    }
}

/// What a dash ignores. Each level includes everything before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum DashThrough {
    #[default]
    Block,
    Actors,
    ActorsAndTriggers,
    Walls,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DropThrough {
    Off,
    HoldDown,
    #[default]
    PressDown,
    HoldDownAndJump,
    /// Down and jump together, pressed in either order.
    DownJumpCombo,
}

/// Confine horizontal motion to the camera window instead of the level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CameraBlock {
    pub left: bool,
    pub right: bool,
}

/// Every tunable of the controller. Velocities are in 1/256 sub-pixel units
/// per tick; windows and counts are in ticks.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    // Walking and running
    pub min_vel: i32,
    pub walk_vel: i32,
    pub run_vel: i32,
    pub walk_acc: i32,
    pub run_acc: i32,
    pub turn_acc: i32,
    pub dec: i32,
    pub air_dec: i32,
    pub run_profile: RunProfile,
    pub air_control: bool,
    pub turn_control: bool,

    // Gravity
    pub grav: i32,
    pub hold_grav: i32,
    pub max_fall_vel: i32,
    pub ground_rest_vel: i32,
    pub float_input: FloatInput,
    pub float_grav: i32,

    // Jumping
    pub jump_vel: i32,
    pub jump_min: i32,
    pub jump_reduction: i32,
    pub hold_jump_max: u8,
    /// Air jumps per landing; 255 never runs out.
    pub extra_jumps: u8,
    pub run_boost: i32,
    pub coyote_max: u8,
    pub buffer_max: u8,

    // Walls
    pub wall_slide: bool,
    pub wall_grav: i32,
    pub wall_kick: i32,
    pub wall_jump_max: u8,
    pub wall_coyote_max: u8,
    pub no_control_frames: u8,

    // Ladders
    pub climb_vel: i32,

    // Dashing
    pub dash_input: DashInput,
    pub dash_style: DashStyle,
    pub dash_momentum: DashMomentum,
    pub dash_through: DashThrough,
    /// Total dash distance in sub-pixel units.
    pub dash_dist: i32,
    pub dash_frames: u8,
    pub dash_ready_max: u8,
    pub tap_window: i8,

    // Drop-through platforms
    pub drop_through: DropThrough,
    pub drop_frames: u8,

    // Actors
    pub solid_group: u8,
    pub platform_group: u8,

    // Camera
    pub camera_deadzone_x: u8,
    pub dash_deadzone: u8,
    pub camera_block: CameraBlock,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            min_vel: 304,
            walk_vel: 4000,
            run_vel: 6500,
            walk_acc: 152,
            run_acc: 228,
            turn_acc: 258,
            dec: 208,
            air_dec: 208,
            run_profile: RunProfile::Smooth,
            air_control: true,
            turn_control: true,

            grav: 1792,
            hold_grav: 512,
            max_fall_vel: 19200,
            ground_rest_vel: 256,
            float_input: FloatInput::Off,
            float_grav: 1000,

            jump_vel: 12000,
            jump_min: 9000,
            jump_reduction: 0,
            hold_jump_max: 8,
            extra_jumps: 1,
            run_boost: 0,
            coyote_max: 3,
            buffer_max: 5,

            wall_slide: true,
            wall_grav: 1024,
            wall_kick: 2000,
            wall_jump_max: 1,
            wall_coyote_max: 3,
            no_control_frames: 5,

            climb_vel: 4000,

            dash_input: DashInput::Interact,
            dash_style: DashStyle::Both,
            dash_momentum: DashMomentum::None,
            dash_through: DashThrough::Block,
            dash_dist: 384,
            dash_frames: 6,
            dash_ready_max: 20,
            tap_window: 15,

            drop_through: DropThrough::PressDown,
            drop_frames: 5,

            solid_group: 1,
            platform_group: 2,

            camera_deadzone_x: 4,
            dash_deadzone: 32,
            camera_block: CameraBlock::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {file}: {message}")]
    Parse { file: String, message: String },
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ControllerConfig {
    /// Reject configurations the tick does not guard against.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dash_frames == 0 {
            return Err(invalid("dash_frames", "must be at least 1"));
        }
        if self.hold_jump_max == 0 {
            return Err(invalid("hold_jump_max", "must be at least 1"));
        }
        if self.walk_vel > self.run_vel {
            return Err(invalid(
                "walk_vel",
                format!("{} exceeds run_vel {}", self.walk_vel, self.run_vel),
            ));
        }
        if self.max_fall_vel <= 0 {
            return Err(invalid("max_fall_vel", "must be positive"));
        }
        if self.tap_window <= 0 {
            return Err(invalid("tap_window", "must be positive"));
        }
        for (field, value) in [
            ("walk_vel", self.walk_vel),
            ("run_vel", self.run_vel),
            ("max_fall_vel", self.max_fall_vel),
            ("jump_vel", self.jump_vel),
            ("jump_min", self.jump_min),
            ("climb_vel", self.climb_vel),
            ("wall_grav", self.wall_grav),
            ("float_grav", self.float_grav),
        ] {
            if !(0..=VELOCITY_LIMIT).contains(&value) {
                return Err(invalid(field, format!("{value} outside 0..={VELOCITY_LIMIT}")));
            }
        }
        if self.jump_vel / i32::from(MAX_JUMP_SPREAD) + self.jump_min > OVERFLOW_HEADROOM {
            return Err(invalid(
                "jump_min",
                "jump impulse overflows even when spread over 15 frames",
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Per-frame constants derived once at controller initialisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tuning {
    /// `hold_jump_max` after the overflow search.
    pub hold_jump_max: u8,
    /// `run_boost` after the overflow search.
    pub run_boost: i32,
    pub jump_per_frame: i32,
    pub jump_reduction_per_frame: i32,
    pub boost_per_frame: i32,
    pub dash_step: i32,
}

impl Tuning {
    /// Spread jump and dash totals over their frame counts, first growing the
    /// hold-jump window and shrinking the run boost until no single frame can
    /// overflow a velocity.
    ///
    /// The config must have passed [`ControllerConfig::validate`].
    pub fn derive(config: &ControllerConfig) -> Self {
        let mut hold = config.hold_jump_max.max(1);
        while hold < MAX_JUMP_SPREAD
            && OVERFLOW_HEADROOM
                - config.jump_vel / i32::from(hold.min(MAX_JUMP_SPREAD))
                - config.jump_min
                < 0
        {
            hold += 1;
        }
        if hold != config.hold_jump_max {
            warn!(
                "hold_jump_max raised from {} to {} to keep jump velocity in range",
                config.hold_jump_max, hold
            );
        }

        let mut boost = config.run_boost.max(0);
        let run_per_hold = (config.run_vel >> 8) / i32::from(hold);
        while boost > 0 && OVERFLOW_HEADROOM / boost < run_per_hold {
            boost -= 1;
        }
        if boost != config.run_boost {
            warn!(
                "run_boost lowered from {} to {} to keep jump velocity in range",
                config.run_boost, boost
            );
        }

        Self {
            hold_jump_max: hold,
            run_boost: boost,
            jump_per_frame: config.jump_vel / i32::from(hold.min(MAX_JUMP_SPREAD)),
            jump_reduction_per_frame: config.jump_reduction / i32::from(hold),
            boost_per_frame: boost / i32::from(hold),
            dash_step: config.dash_dist / i32::from(config.dash_frames),
        }
    }
}

/// Parse a controller config from RON text and validate it.
pub fn parse_config(source: &str, file: &str) -> Result<ControllerConfig, ConfigError> {
    let config: ControllerConfig = ron_options().from_str(source).map_err(|e| ConfigError::Parse {
        file: file.to_string(),
        message: e.to_string(),
    })?;
    config.validate()?;
    Ok(config)
}

/// Load a controller config from a RON file.
pub fn load_config(path: &Path) -> Result<ControllerConfig, ConfigError> {
    let file = path.display().to_string();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        file: file.clone(),
        source,
    })?;
    parse_config(&contents, &file)
}
