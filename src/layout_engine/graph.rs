use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use strum::Display;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

bitflags! {
    /// A compass direction. The four cardinal directions are single bits and
    /// the diagonals are the union of one horizontal and one vertical bit.
    ///
    /// Any other combination of bits is representable but invalid, and every
    /// operation taking a direction treats it as a no-op.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
    #[repr(transparent)]
    pub struct Direction: u8 {
        const LEFT  = 1 << 0;
        const RIGHT = 1 << 1;
        const UP    = 1 << 2;
        const DOWN  = 1 << 3;

        const LEFT_UP    = Self::LEFT.bits() | Self::UP.bits();
        const LEFT_DOWN  = Self::LEFT.bits() | Self::DOWN.bits();
        const RIGHT_UP   = Self::RIGHT.bits() | Self::UP.bits();
        const RIGHT_DOWN = Self::RIGHT.bits() | Self::DOWN.bits();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum DirectionKind {
    Horizontal,
    Vertical,
    Diagonal,
    Invalid,
}

impl Direction {
    pub const CARDINAL: [Direction; 4] =
        [Direction::LEFT, Direction::RIGHT, Direction::UP, Direction::DOWN];

    pub const DIAGONAL: [Direction; 4] = [
        Direction::LEFT_UP,
        Direction::LEFT_DOWN,
        Direction::RIGHT_UP,
        Direction::RIGHT_DOWN,
    ];

    const NAMES: [(Direction, &'static str); 8] = [
        (Direction::LEFT, "left"),
        (Direction::RIGHT, "right"),
        (Direction::UP, "up"),
        (Direction::DOWN, "down"),
        (Direction::LEFT_UP, "left_up"),
        (Direction::LEFT_DOWN, "left_down"),
        (Direction::RIGHT_UP, "right_up"),
        (Direction::RIGHT_DOWN, "right_down"),
    ];

    pub fn kind(self) -> DirectionKind {
        if self == Direction::LEFT || self == Direction::RIGHT {
            DirectionKind::Horizontal
        } else if self == Direction::UP || self == Direction::DOWN {
            DirectionKind::Vertical
        } else if Self::DIAGONAL.contains(&self) {
            DirectionKind::Diagonal
        } else {
            DirectionKind::Invalid
        }
    }

    pub fn is_valid(self) -> bool { self.kind() != DirectionKind::Invalid }

    pub fn is_cardinal(self) -> bool {
        matches!(self.kind(), DirectionKind::Horizontal | DirectionKind::Vertical)
    }

    /// The axis a cardinal direction moves along.
    pub fn orientation(self) -> Option<Orientation> {
        match self.kind() {
            DirectionKind::Horizontal => Some(Orientation::Horizontal),
            DirectionKind::Vertical => Some(Orientation::Vertical),
            DirectionKind::Diagonal | DirectionKind::Invalid => None,
        }
    }

    /// Whether something placed in this direction goes after its anchor in a
    /// split's child list.
    pub fn insert_after(self) -> bool { self.intersects(Direction::RIGHT | Direction::DOWN) }

    /// The horizontal and vertical halves of a valid direction. Cardinal
    /// directions have a single component.
    pub fn components(self) -> Vec<Direction> {
        if !self.is_valid() {
            return Vec::new();
        }
        Self::CARDINAL
            .into_iter()
            .filter(|d| self.contains(*d))
            .collect()
    }

    pub fn name(self) -> Option<&'static str> {
        Self::NAMES.iter().find(|(d, _)| *d == self).map(|(_, name)| *name)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "invalid({:#06b})", self.bits()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid direction string: {0}")]
pub struct ParseDirectionError(String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::NAMES
            .iter()
            .find(|(_, name)| *name == wanted)
            .map(|(d, _)| *d)
            .ok_or_else(|| ParseDirectionError(s.to_string()))
    }
}
