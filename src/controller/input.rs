//! Controller domain: button snapshot and keyboard sampling.

use bevy::prelude::*;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Buttons: u8 {
        const UP       = 1 << 0;
        const DOWN     = 1 << 1;
        const LEFT     = 1 << 2;
        const RIGHT    = 1 << 3;
        const JUMP     = 1 << 4;
        const RUN      = 1 << 5;
        const INTERACT = 1 << 6;
    }
}

/// Level-held and edge-triggered buttons for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub held: Buttons,
    pub pressed: Buttons,
}

impl InputSnapshot {
    pub fn new(held: Buttons, pressed: Buttons) -> Self {
        Self { held, pressed }
    }

    /// Snapshot for `held` given last tick's held set; new buttons count as pressed.
    pub fn after(previous: Buttons, held: Buttons) -> Self {
        Self {
            held,
            pressed: held & !previous,
        }
    }

    pub fn held(&self, buttons: Buttons) -> bool {
        self.held.contains(buttons)
    }

    pub fn pressed(&self, buttons: Buttons) -> bool {
        self.pressed.intersects(buttons)
    }

    pub fn left(&self) -> bool {
        self.held(Buttons::LEFT)
    }

    pub fn right(&self) -> bool {
        self.held(Buttons::RIGHT)
    }

    pub fn up(&self) -> bool {
        self.held(Buttons::UP)
    }

    pub fn down(&self) -> bool {
        self.held(Buttons::DOWN)
    }

    pub fn jump(&self) -> bool {
        self.held(Buttons::JUMP)
    }

    pub fn run(&self) -> bool {
        self.held(Buttons::RUN)
    }

    /// `-1` for left, `1` for right, `0` for neither. Left wins ties.
    pub fn direction(&self) -> i32 {
        if self.left() {
            -1
        } else if self.right() {
            1
        } else {
            0
        }
    }

    /// Down and jump together, with either one pressed this tick.
    pub fn down_jump_combo(&self) -> bool {
        (self.pressed(Buttons::DOWN) && self.jump()) || (self.down() && self.pressed(Buttons::JUMP))
    }
}

/// Presses gathered across render frames until the next fixed tick consumes them.
#[derive(Resource, Debug, Default)]
pub struct PendingInput {
    held: Buttons,
    pressed: Buttons,
}

impl PendingInput {
    /// Hand out the tick snapshot and forget the presses it carried.
    pub fn take(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot::new(self.held, self.pressed);
        self.pressed = Buttons::empty();
        snapshot
    }
}

const BINDINGS: [(Buttons, [KeyCode; 2]); 7] = [
    (Buttons::UP, [KeyCode::KeyW, KeyCode::ArrowUp]),
    (Buttons::DOWN, [KeyCode::KeyS, KeyCode::ArrowDown]),
    (Buttons::LEFT, [KeyCode::KeyA, KeyCode::ArrowLeft]),
    (Buttons::RIGHT, [KeyCode::KeyD, KeyCode::ArrowRight]),
    (Buttons::JUMP, [KeyCode::Space, KeyCode::KeyK]),
    (Buttons::RUN, [KeyCode::ShiftLeft, KeyCode::KeyJ]),
    (Buttons::INTERACT, [KeyCode::KeyE, KeyCode::KeyL]),
];

pub(crate) fn sample_keyboard(keyboard: Res<ButtonInput<KeyCode>>, mut input: ResMut<PendingInput>) {
    let mut held = Buttons::empty();
    for (button, keys) in BINDINGS {
        if keyboard.any_pressed(keys) {
            held |= button;
        }
        if keyboard.any_just_pressed(keys) {
            input.pressed |= button;
        }
    }
    input.held = held;
}
