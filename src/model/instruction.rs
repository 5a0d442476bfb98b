//! Human-facing step instructions.
//!
//! The enum is the source of truth; the text is produced by `Display` and
//! that is also how an instruction serializes.

use serde::{Serialize, Serializer};

/// Vertical transport used for a floor change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transit {
    Stairs,
    Elevator,
}

/// Direction of a floor change, by floor number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerticalDirection {
    Up,
    Down,
    /// Floors differ but share (or lack) a floor number.
    Level,
}

/// Bearing change bucket at a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Turn {
    Straight,
    Left,
    Right,
    Back,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Instruction {
    Start,
    Arrived,
    ChangeFloor {
        via: Transit,
        direction: VerticalDirection,
        /// Floor number of the floor being entered, when known.
        floor_number: Option<i32>,
    },
    Turn {
        turn: Turn,
        /// Set on the first step after leaving stairs or an elevator.
        exiting_transit: bool,
    },
}

impl Instruction {
    pub const STRAIGHT: Instruction = Instruction::Turn { turn: Turn::Straight, exiting_transit: false };

    pub fn turn(turn: Turn) -> Self {
        Instruction::Turn { turn, exiting_transit: false }
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instruction::Start => f.write_str("Start here"),
            Instruction::Arrived => f.write_str("You have arrived at your destination"),
            Instruction::ChangeFloor { via, direction, floor_number } => {
                let via = match via {
                    Transit::Stairs => "stairs",
                    Transit::Elevator => "elevator",
                };
                let direction = match direction {
                    VerticalDirection::Up => " up",
                    VerticalDirection::Down => " down",
                    VerticalDirection::Level => "",
                };
                match floor_number {
                    Some(n) => write!(f, "Take the {via}{direction} to floor {n}"),
                    None => write!(f, "Take the {via}{direction}"),
                }
            }
            Instruction::Turn { turn, exiting_transit } => {
                let phrase = match turn {
                    Turn::Straight => "continue straight",
                    Turn::Left => "turn left",
                    Turn::Right => "turn right",
                    Turn::Back => "turn around",
                };
                if *exiting_transit {
                    write!(f, "Exit into the hallway and {phrase}")
                } else {
                    let mut chars = phrase.chars();
                    if let Some(first) = chars.next() {
                        write!(f, "{}{}", first.to_ascii_uppercase(), chars.as_str())?;
                    }
                    Ok(())
                }
            }
        }
    }
}

impl Serialize for Instruction {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
