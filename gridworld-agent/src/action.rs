//! The agent's action space and the keyboard it acts through.
//!
//! Learners encode one block of four neurons per step; neuron `step * 4 + a`
//! stands for action `a`. The random and vision-input demos instead drive the
//! keyboard directly through six press/release neurons.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Neurons per step in the actor-critic populations.
pub const ACTIONS_PER_STEP: usize = 4;

/// Keys the environment understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Right,
    Left,
    Space,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Action {
    Right = 0,
    Left = 1,
    JumpRight = 2,
    JumpLeft = 3,
}

impl Action {
    pub const ALL: [Action; ACTIONS_PER_STEP] =
        [Action::Right, Action::Left, Action::JumpRight, Action::JumpLeft];

    /// Decode a neuron id from any step's block.
    pub fn from_neuron(neuron_id: usize) -> Self {
        Self::ALL[neuron_id % ACTIONS_PER_STEP]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Neuron standing for this action in the given step.
    pub fn neuron(self, step: usize) -> usize {
        step * ACTIONS_PER_STEP + self.index()
    }

    /// The move that heads toward a target at pixel offset (dx, dy).
    ///
    /// Screen y grows downward, so `dy < 0` means the target is above and
    /// calls for a jump. Ties on `dx` go left.
    pub fn suggest(dx: i64, dy: i64) -> Self {
        match (dy < 0, dx > 0) {
            (true, true) => Action::JumpRight,
            (true, false) => Action::JumpLeft,
            (false, true) => Action::Right,
            (false, false) => Action::Left,
        }
    }

    /// Keys held down while the action is performed.
    pub fn keys(self) -> &'static [Key] {
        match self {
            Action::Right => &[Key::Right],
            Action::Left => &[Key::Left],
            Action::JumpRight => &[Key::Space, Key::Right],
            Action::JumpLeft => &[Key::Space, Key::Left],
        }
    }

    /// Horizontal class. Exploration always switches class.
    pub fn is_rightward(self) -> bool {
        self.index() % 2 == 0
    }

    /// Past-tense phrase used in the episode log.
    pub fn describe(self) -> &'static str {
        match self {
            Action::Right => "went right",
            Action::Left => "went left",
            Action::JumpRight => "jumped right",
            Action::JumpLeft => "jumped left",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Right => "right",
            Action::Left => "left",
            Action::JumpRight => "jump right",
            Action::JumpLeft => "jump left",
        };
        f.write_str(name)
    }
}

/// One of the six keyboard neurons of the state population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCommand {
    Press(Key),
    Release(Key),
}

impl KeyCommand {
    /// Number of keyboard neurons.
    pub const COUNT: usize = 6;

    /// 0/1 press/release right, 2/3 press/release left, 4/5 press/release space.
    pub fn from_neuron(neuron_id: usize) -> Option<Self> {
        match neuron_id {
            0 => Some(KeyCommand::Press(Key::Right)),
            1 => Some(KeyCommand::Release(Key::Right)),
            2 => Some(KeyCommand::Press(Key::Left)),
            3 => Some(KeyCommand::Release(Key::Left)),
            4 => Some(KeyCommand::Press(Key::Space)),
            5 => Some(KeyCommand::Release(Key::Space)),
            _ => None,
        }
    }

    pub fn neuron(self) -> Option<usize> {
        match self {
            KeyCommand::Press(Key::Right) => Some(0),
            KeyCommand::Release(Key::Right) => Some(1),
            KeyCommand::Press(Key::Left) => Some(2),
            KeyCommand::Release(Key::Left) => Some(3),
            KeyCommand::Press(Key::Space) => Some(4),
            KeyCommand::Release(Key::Space) => Some(5),
            _ => None,
        }
    }

    pub fn key(self) -> Key {
        match self {
            KeyCommand::Press(k) | KeyCommand::Release(k) => k,
        }
    }
}
