//! Turn-by-turn instruction synthesis.
//!
//! Works purely on an ordered list of `PathStep`s; the only outside input
//! is a floor-number lookup so that "up" and "down" are decided by floor
//! ordering and never by floor identifiers.

use crate::model::{FloorId, Instruction, PathStep, Transit, Turn, VerticalDirection, WaypointType};

/// Annotate every step of a route with its instruction, in place.
///
/// Routes of zero or one step are left untouched.
pub fn annotate<F>(steps: &mut [PathStep], floor_number: F)
where
    F: Fn(FloorId) -> Option<i32>,
{
    let n = steps.len();
    if n <= 1 {
        return;
    }

    for i in 0..n {
        let instruction = if i == 0 {
            Instruction::Start
        } else if i == n - 1 {
            Instruction::Arrived
        } else {
            step_instruction(steps, i, &floor_number)
        };
        steps[i].instruction = Some(instruction);
    }

    suppress_repeated_straights(steps);
}

/// Instruction for an interior step `0 < i < n - 1`.
fn step_instruction<F>(steps: &[PathStep], i: usize, floor_number: &F) -> Instruction
where
    F: Fn(FloorId) -> Option<i32>,
{
    let prev = &steps[i - 1];
    let step = &steps[i];
    let next = &steps[i + 1];

    if step.kind.is_vertical() && next.floor_id != step.floor_id {
        let via = match step.kind {
            WaypointType::Elevator => Transit::Elevator,
            _ => Transit::Stairs,
        };
        let here = floor_number(step.floor_id);
        let there = floor_number(next.floor_id);
        let direction = match (here, there) {
            (Some(a), Some(b)) if b > a => VerticalDirection::Up,
            (Some(a), Some(b)) if b < a => VerticalDirection::Down,
            _ => VerticalDirection::Level,
        };
        return Instruction::ChangeFloor { via, direction, floor_number: there };
    }

    let turn = classify_turn(prev.position(), step.position(), next.position());
    let exiting_transit = i >= 2
        && prev.kind.is_vertical()
        && steps[i - 2].floor_id != prev.floor_id
        && turn != Turn::Back;

    Instruction::Turn { turn, exiting_transit }
}

/// Bucket the bearing change at `b` when walking `a -> b -> c`.
pub fn classify_turn(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Turn {
    let angle1 = (b.1 - a.1).atan2(b.0 - a.0);
    let angle2 = (c.1 - b.1).atan2(c.0 - b.0);
    let delta = (angle2 - angle1).to_degrees().rem_euclid(360.0);

    if delta < 45.0 || delta > 315.0 {
        Turn::Straight
    } else if delta < 135.0 {
        Turn::Left
    } else if delta > 225.0 {
        Turn::Right
    } else {
        Turn::Back
    }
}

/// Drop a "continue straight" that repeats the previous non-empty instruction.
fn suppress_repeated_straights(steps: &mut [PathStep]) {
    let mut last: Option<Instruction> = None;
    for step in steps.iter_mut() {
        let Some(current) = step.instruction.take() else {
            continue;
        };
        if current == Instruction::STRAIGHT && last.as_ref() == Some(&current) {
            continue;
        }
        last = Some(current.clone());
        step.instruction = Some(current);
    }
}
