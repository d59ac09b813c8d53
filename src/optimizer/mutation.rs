//! Invariant-preserving mutations.
//!
//! Two mutation kinds are allowed:
//!
//! 1. Swap the (day, period) of two theory/tutorial allocations of the
//!    same class.
//! 2. Move an entire lab block to another valid lab start.
//!
//! Elective allocations, fixed (locked) slots, and lab continuations
//! are never mutated. Every mutation applies through before-images:
//! the touched allocations are removed, feasibility is re-checked at
//! the new slots against the reduced state, and on any failure the
//! before-images are restored so the state stays pristine.

use std::collections::BTreeMap;

use rand::Rng;

use crate::models::slot::{lab_block_slots, Day, Period};
use crate::models::{Allocation, Component, LabBlock, Teacher, TeacherId};
use crate::state::WorldState;

/// Before-images of an applied mutation, for fitness-based rollback.
#[derive(Debug)]
pub(crate) enum MoveUndo {
    /// Two same-class units had their slots exchanged.
    Swap {
        first: Allocation,
        second: Allocation,
    },
    /// A lab block moved to a new (day, start).
    LabMove {
        start: Allocation,
        continuation: Allocation,
        block: LabBlock,
        new_day: Day,
        new_start: Period,
    },
}

impl MoveUndo {
    /// Reverts the mutation, restoring the saved before-images.
    pub(crate) fn revert(self, state: &mut WorldState) {
        match self {
            MoveUndo::Swap { first, second } => {
                // The applied allocations live at each other's slots.
                state.remove_allocation(first.class_id, second.day, second.period);
                state.remove_allocation(second.class_id, first.day, first.period);
                state.add_allocation(first);
                state.add_allocation(second);
            }
            MoveUndo::LabMove {
                start,
                continuation,
                block,
                new_day,
                new_start,
            } => {
                state.remove_allocation(start.class_id, new_day, new_start);
                state.remove_allocation(start.class_id, new_day, new_start + 1);
                state.unregister_lab_block(start.class_id, new_day, new_start);
                state.register_lab_block(block);
                state.add_allocation(start);
                state.add_allocation(continuation);
            }
        }
    }
}

fn teacher_available(
    teachers: &BTreeMap<TeacherId, &Teacher>,
    teacher_id: TeacherId,
    day: Day,
) -> bool {
    teachers
        .get(&teacher_id)
        .is_some_and(|t| t.is_available_on(day))
}

/// Whether the (already removed) unit can sit at (day, period).
fn unit_fits(
    state: &WorldState,
    teachers: &BTreeMap<TeacherId, &Teacher>,
    unit: &Allocation,
    day: Day,
    period: Period,
) -> bool {
    teacher_available(teachers, unit.teacher_id, day)
        && state.is_teacher_free(unit.teacher_id, day, period)
        && !state.is_teacher_locked(unit.teacher_id, day, period)
        && state.is_room_free(unit.room_id, day, period)
        && !state.has_subject_on_day(unit.class_id, day, unit.subject_id)
}

/// Attempts to swap the slots of two mutable units of one class.
///
/// Returns the before-images when the swap was applied, `None` when no
/// candidate pair exists or the post-swap checks fail (the state is
/// then untouched).
pub(crate) fn try_swap_units<R: Rng>(
    state: &mut WorldState,
    teachers: &BTreeMap<TeacherId, &Teacher>,
    rng: &mut R,
) -> Option<MoveUndo> {
    let mutable: Vec<Allocation> = state
        .allocations()
        .iter()
        .filter(|a| {
            matches!(a.component, Component::Theory | Component::Tutorial)
                && !a.is_elective
                && !a.is_lab_continuation
                && !state.is_locked(a.class_id, a.day, a.period)
        })
        .cloned()
        .collect();
    if mutable.len() < 2 {
        return None;
    }

    let first = mutable[rng.random_range(0..mutable.len())].clone();
    let partners: Vec<&Allocation> = mutable
        .iter()
        .filter(|a| a.class_id == first.class_id && a.slot() != first.slot())
        .collect();
    if partners.is_empty() {
        return None;
    }
    let second = partners[rng.random_range(0..partners.len())].clone();

    let first = state.remove_allocation(first.class_id, first.day, first.period)?;
    let second = match state.remove_allocation(second.class_id, second.day, second.period) {
        Some(a) => a,
        None => {
            state.add_allocation(first);
            return None;
        }
    };

    let fits = unit_fits(state, teachers, &first, second.day, second.period)
        && unit_fits(state, teachers, &second, first.day, first.period);
    if !fits {
        state.add_allocation(first);
        state.add_allocation(second);
        return None;
    }

    let mut moved_first = first.clone();
    moved_first.day = second.day;
    moved_first.period = second.period;
    let mut moved_second = second.clone();
    moved_second.day = first.day;
    moved_second.period = first.period;
    state.add_allocation(moved_first);
    state.add_allocation(moved_second);

    Some(MoveUndo::Swap { first, second })
}

/// Attempts to relocate a non-elective lab block to another valid
/// start slot.
pub(crate) fn try_move_lab<R: Rng>(
    state: &mut WorldState,
    teachers: &BTreeMap<TeacherId, &Teacher>,
    rng: &mut R,
) -> Option<MoveUndo> {
    let mut blocks: Vec<LabBlock> = state
        .lab_blocks()
        .filter(|b| {
            !state.is_locked(b.class_id, b.day, b.start)
                && !state.is_locked(b.class_id, b.day, b.end())
        })
        .cloned()
        .collect();
    blocks.sort_by_key(|b| (b.class_id, b.day, b.start));
    // Elective blocks are immutable; check the underlying allocation.
    blocks.retain(|b| {
        state
            .allocations()
            .iter()
            .any(|a| a.class_id == b.class_id && a.day == b.day && a.period == b.start && !a.is_elective)
    });
    if blocks.is_empty() {
        return None;
    }
    let block = blocks[rng.random_range(0..blocks.len())].clone();

    let targets: Vec<(Day, Period)> = lab_block_slots()
        .into_iter()
        .filter(|&(d, s)| (d, s) != (block.day, block.start))
        .collect();
    let (new_day, new_start) = targets[rng.random_range(0..targets.len())];

    let start = state.remove_allocation(block.class_id, block.day, block.start)?;
    let continuation = match state.remove_allocation(block.class_id, block.day, block.end()) {
        Some(a) => a,
        None => {
            state.add_allocation(start);
            return None;
        }
    };
    state.unregister_lab_block(block.class_id, block.day, block.start);

    let new_end = new_start + 1;
    let fits = teacher_available(teachers, block.teacher_id, new_day)
        && [new_start, new_end].iter().all(|&p| {
            state.is_class_free(block.class_id, new_day, p)
                && !state.is_locked(block.class_id, new_day, p)
                && state.is_teacher_free(block.teacher_id, new_day, p)
                && !state.is_teacher_locked(block.teacher_id, new_day, p)
                && state.is_room_free(block.room_id, new_day, p)
        })
        && !state.has_subject_on_day(block.class_id, new_day, block.subject_id);
    if !fits {
        state.register_lab_block(block);
        state.add_allocation(start);
        state.add_allocation(continuation);
        return None;
    }

    let mut moved_start = start.clone();
    moved_start.day = new_day;
    moved_start.period = new_start;
    let mut moved_cont = continuation.clone();
    moved_cont.day = new_day;
    moved_cont.period = new_end;
    state.add_allocation(moved_start);
    state.add_allocation(moved_cont);
    state.register_lab_block(LabBlock::new(
        block.class_id,
        new_day,
        new_start,
        block.subject_id,
        block.teacher_id,
        block.room_id,
    ));

    Some(MoveUndo::LabMove {
        start,
        continuation,
        block,
        new_day,
        new_start,
    })
}
