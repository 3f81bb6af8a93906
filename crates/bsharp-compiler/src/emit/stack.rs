//! Operand-stack simulation over an emitted instruction sequence.
//!
//! Walks the sequence once in order, carrying the depth along fall-through
//! edges and recording the depth at every branch target. Straight-line code
//! after a `goto` or `return` with no label in front of it starts empty.

use rustc_hash::FxHashMap;
use thiserror::Error;

use super::{Instruction, Label};

/// A sequence whose stack use is inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StackError {
    #[error("instruction {index} pops from an empty operand stack")]
    Underflow { index: usize },

    #[error("{label} is reached with stack depths {first} and {second}")]
    Mismatch {
        label: Label,
        first: u32,
        second: u32,
    },
}

/// The deepest operand stack reached by `code`.
pub fn max_stack_depth(code: &[Instruction]) -> Result<u32, StackError> {
    let mut at_label: FxHashMap<Label, u32> = FxHashMap::default();
    let mut depth = Some(0u32);
    let mut max = 0;

    for (index, instruction) in code.iter().enumerate() {
        if let Instruction::Label(label) = instruction {
            depth = Some(merge(&mut at_label, *label, depth)?);
            continue;
        }

        let current = depth.unwrap_or(0);
        let (pops, pushes) = instruction.stack_effect();
        let after_pop = current
            .checked_sub(pops)
            .ok_or(StackError::Underflow { index })?;
        let after = after_pop + pushes;
        max = max.max(after).max(current);

        if let Some(target) = instruction.jump_target() {
            merge(&mut at_label, target, Some(after))?;
        }
        depth = if instruction.is_terminal() {
            None
        } else {
            Some(after)
        };
    }

    Ok(max)
}

/// Record that `label` is reached with `incoming` and return its depth.
fn merge(
    at_label: &mut FxHashMap<Label, u32>,
    label: Label,
    incoming: Option<u32>,
) -> Result<u32, StackError> {
    match (at_label.get(&label).copied(), incoming) {
        (Some(first), Some(second)) if first != second => Err(StackError::Mismatch {
            label,
            first,
            second,
        }),
        (Some(known), _) => Ok(known),
        (None, incoming) => {
            let depth = incoming.unwrap_or(0);
            at_label.insert(label, depth);
            Ok(depth)
        }
    }
}
