//! In-memory world state for a generation run.
//!
//! Single source of truth while the phased scheduler runs: an
//! append-only record of committed allocations plus O(1) busy-slot
//! indices per class, teacher, and room, a per-(class, day) subject
//! count, a lab-block registry, and elective basket reservations with
//! temporary teacher locks.
//!
//! Append operations are unchecked — callers establish feasibility
//! through the query methods first. The exact-inverse removal
//! operations exist for the optimizer's before-image rollback;
//! committed allocations are never mutated in place.

use std::collections::{HashMap, HashSet};

use crate::models::slot::{Day, Period};
use crate::models::{Allocation, BasketId, ClassId, LabBlock, RoomId, SubjectId, TeacherId};

/// Mutable scheduling state owned by a single run.
#[derive(Debug, Clone, Default)]
pub struct WorldState {
    allocations: Vec<Allocation>,
    class_slots: HashMap<ClassId, HashSet<(Day, Period)>>,
    teacher_slots: HashMap<TeacherId, HashSet<(Day, Period)>>,
    room_slots: HashMap<RoomId, HashSet<(Day, Period)>>,
    // (class, day) → subject → committed row count. A lab pair counts 2
    // here; `has_subject_on_day` only asks for presence.
    day_subjects: HashMap<(ClassId, Day), HashMap<SubjectId, u32>>,
    lab_blocks: HashMap<(ClassId, Day, Period), LabBlock>,
    basket_owner: HashMap<(Day, Period), BasketId>,
    basket_slots: HashMap<BasketId, Vec<(Day, Period)>>,
    elective_locks: HashMap<(Day, Period), HashSet<TeacherId>>,
    locked: HashSet<(ClassId, Day, Period)>,
}

/// A full-state snapshot for coarse rollback.
#[derive(Debug, Clone)]
pub struct Snapshot(WorldState);

impl WorldState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the class has no allocation at (day, period).
    pub fn is_class_free(&self, class_id: ClassId, day: Day, period: Period) -> bool {
        self.class_slots
            .get(&class_id)
            .is_none_or(|s| !s.contains(&(day, period)))
    }

    /// Whether the teacher has no allocation at (day, period).
    pub fn is_teacher_free(&self, teacher_id: TeacherId, day: Day, period: Period) -> bool {
        self.teacher_slots
            .get(&teacher_id)
            .is_none_or(|s| !s.contains(&(day, period)))
    }

    /// Whether the room has no allocation at (day, period).
    pub fn is_room_free(&self, room_id: RoomId, day: Day, period: Period) -> bool {
        self.room_slots
            .get(&room_id)
            .is_none_or(|s| !s.contains(&(day, period)))
    }

    /// Whether an elective reservation at (day, period) locks this teacher.
    pub fn is_teacher_locked(&self, teacher_id: TeacherId, day: Day, period: Period) -> bool {
        self.elective_locks
            .get(&(day, period))
            .is_some_and(|t| t.contains(&teacher_id))
    }

    /// Whether the class already has the subject on the given day.
    ///
    /// A lab block counts as a single occurrence.
    pub fn has_subject_on_day(&self, class_id: ClassId, day: Day, subject_id: SubjectId) -> bool {
        self.day_subjects
            .get(&(class_id, day))
            .is_some_and(|m| m.get(&subject_id).copied().unwrap_or(0) > 0)
    }

    /// Whether the period is the start or continuation of a registered
    /// lab block for the class.
    pub fn is_in_lab_block(&self, class_id: ClassId, day: Day, period: Period) -> bool {
        if self.lab_blocks.contains_key(&(class_id, day, period)) {
            return true;
        }
        period > 0
            && self
                .lab_blocks
                .get(&(class_id, day, period - 1))
                .is_some_and(|b| b.covers(period))
    }

    /// Whether the slot is locked (fixed pre-allocation or elective
    /// reservation) for the class.
    pub fn is_locked(&self, class_id: ClassId, day: Day, period: Period) -> bool {
        self.locked.contains(&(class_id, day, period))
    }

    /// Marks a (class, day, period) slot as locked.
    pub fn lock_slot(&mut self, class_id: ClassId, day: Day, period: Period) {
        self.locked.insert((class_id, day, period));
    }

    /// Appends an allocation and updates every index. Unchecked: the
    /// caller guarantees feasibility.
    pub fn add_allocation(&mut self, entry: Allocation) {
        let slot = (entry.day, entry.period);
        self.class_slots.entry(entry.class_id).or_default().insert(slot);
        self.teacher_slots
            .entry(entry.teacher_id)
            .or_default()
            .insert(slot);
        self.room_slots.entry(entry.room_id).or_default().insert(slot);
        *self
            .day_subjects
            .entry((entry.class_id, entry.day))
            .or_default()
            .entry(entry.subject_id)
            .or_insert(0) += 1;
        self.allocations.push(entry);
    }

    /// Removes the allocation at (class, day, period), unwinding every
    /// index. Exact inverse of [`WorldState::add_allocation`].
    pub fn remove_allocation(
        &mut self,
        class_id: ClassId,
        day: Day,
        period: Period,
    ) -> Option<Allocation> {
        let idx = self
            .allocations
            .iter()
            .position(|a| a.class_id == class_id && a.day == day && a.period == period)?;
        let entry = self.allocations.swap_remove(idx);

        let slot = (day, period);
        if let Some(s) = self.class_slots.get_mut(&entry.class_id) {
            s.remove(&slot);
        }
        if let Some(s) = self.teacher_slots.get_mut(&entry.teacher_id) {
            s.remove(&slot);
        }
        if let Some(s) = self.room_slots.get_mut(&entry.room_id) {
            s.remove(&slot);
        }
        if let Some(m) = self.day_subjects.get_mut(&(entry.class_id, day)) {
            if let Some(count) = m.get_mut(&entry.subject_id) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    m.remove(&entry.subject_id);
                }
            }
        }
        Some(entry)
    }

    /// Records an atomic lab pair starting at `start`.
    pub fn register_lab_block(&mut self, block: LabBlock) {
        self.lab_blocks
            .insert((block.class_id, block.day, block.start), block);
    }

    /// Removes a lab pair record. Exact inverse of
    /// [`WorldState::register_lab_block`].
    pub fn unregister_lab_block(
        &mut self,
        class_id: ClassId,
        day: Day,
        start: Period,
    ) -> Option<LabBlock> {
        self.lab_blocks.remove(&(class_id, day, start))
    }

    /// The lab block starting at (class, day, start), if any.
    pub fn lab_block_at(&self, class_id: ClassId, day: Day, start: Period) -> Option<&LabBlock> {
        self.lab_blocks.get(&(class_id, day, start))
    }

    /// All registered lab blocks, in unspecified order.
    pub fn lab_blocks(&self) -> impl Iterator<Item = &LabBlock> {
        self.lab_blocks.values()
    }

    /// Marks (day, period) as owned by the basket and locks the given
    /// teachers there so no other scheduling can claim them.
    pub fn reserve_elective(
        &mut self,
        basket_id: BasketId,
        day: Day,
        period: Period,
        teacher_ids: &[TeacherId],
    ) {
        self.basket_owner.insert((day, period), basket_id);
        let slots = self.basket_slots.entry(basket_id).or_default();
        if !slots.contains(&(day, period)) {
            slots.push((day, period));
        }
        self.elective_locks
            .entry((day, period))
            .or_default()
            .extend(teacher_ids.iter().copied());
    }

    /// Whether (day, period) is reserved by a basket other than the
    /// given one.
    pub fn is_reserved_by_other_basket(&self, day: Day, period: Period, basket_id: BasketId) -> bool {
        self.basket_owner
            .get(&(day, period))
            .is_some_and(|&owner| owner != basket_id)
    }

    /// Slots reserved by a basket, in reservation order.
    pub fn basket_reserved_slots(&self, basket_id: BasketId) -> &[(Day, Period)] {
        self.basket_slots
            .get(&basket_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Committed time units for (class, subject, component); a lab
    /// block counts once.
    pub fn committed_units(
        &self,
        class_id: ClassId,
        subject_id: SubjectId,
        component: crate::models::Component,
    ) -> u32 {
        self.allocations
            .iter()
            .filter(|a| {
                a.class_id == class_id
                    && a.subject_id == subject_id
                    && a.component == component
                    && !a.is_lab_continuation
            })
            .count() as u32
    }

    /// Committed allocations, in commit order.
    pub fn allocations(&self) -> &[Allocation] {
        &self.allocations
    }

    /// Number of committed allocations.
    pub fn len(&self) -> usize {
        self.allocations.len()
    }

    /// Whether nothing has been committed yet.
    pub fn is_empty(&self) -> bool {
        self.allocations.is_empty()
    }

    /// Consumes the state and returns the allocations canonically
    /// sorted by (class, day, period).
    pub fn into_allocations(self) -> Vec<Allocation> {
        let mut allocations = self.allocations;
        allocations.sort_by_key(|a| a.sort_key());
        allocations
    }

    /// Captures a full-state snapshot.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot(self.clone())
    }

    /// Restores a previously captured snapshot.
    pub fn restore(&mut self, snapshot: Snapshot) {
        *self = snapshot.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Component;

    fn alloc(class: ClassId, day: Day, period: Period, subject: SubjectId) -> Allocation {
        Allocation::new(class, day, period, subject, 1, 1, Component::Theory)
    }

    #[test]
    fn test_free_queries_empty_state() {
        let state = WorldState::new();
        assert!(state.is_class_free(1, 0, 0));
        assert!(state.is_teacher_free(1, 0, 0));
        assert!(state.is_room_free(1, 0, 0));
        assert!(!state.has_subject_on_day(1, 0, 10));
        assert!(state.is_empty());
    }

    #[test]
    fn test_add_allocation_updates_indices() {
        let mut state = WorldState::new();
        state.add_allocation(alloc(1, 0, 2, 10));

        assert!(!state.is_class_free(1, 0, 2));
        assert!(!state.is_teacher_free(1, 0, 2));
        assert!(!state.is_room_free(1, 0, 2));
        assert!(state.has_subject_on_day(1, 0, 10));
        assert!(state.is_class_free(1, 0, 3));
        assert!(state.is_class_free(2, 0, 2));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_remove_allocation_unwinds_indices() {
        let mut state = WorldState::new();
        state.add_allocation(alloc(1, 0, 2, 10));

        let removed = state.remove_allocation(1, 0, 2).unwrap();
        assert_eq!(removed.subject_id, 10);
        assert!(state.is_class_free(1, 0, 2));
        assert!(state.is_teacher_free(1, 0, 2));
        assert!(state.is_room_free(1, 0, 2));
        assert!(!state.has_subject_on_day(1, 0, 10));
        assert!(state.is_empty());

        assert!(state.remove_allocation(1, 0, 2).is_none());
    }

    #[test]
    fn test_subject_count_survives_partial_lab_removal() {
        let mut state = WorldState::new();
        let a = Allocation::new(1, 0, 3, 10, 1, 1, Component::Lab);
        state.add_allocation(a.clone());
        state.add_allocation(
            Allocation::new(1, 0, 4, 10, 1, 1, Component::Lab).as_continuation(),
        );

        // Removing one row of the pair keeps the subject on the day.
        state.remove_allocation(1, 0, 4);
        assert!(state.has_subject_on_day(1, 0, 10));
        state.remove_allocation(1, 0, 3);
        assert!(!state.has_subject_on_day(1, 0, 10));
    }

    #[test]
    fn test_lab_block_registry() {
        let mut state = WorldState::new();
        state.register_lab_block(LabBlock::new(1, 2, 3, 10, 7, 4));

        assert!(state.is_in_lab_block(1, 2, 3));
        assert!(state.is_in_lab_block(1, 2, 4));
        assert!(!state.is_in_lab_block(1, 2, 5));
        assert!(!state.is_in_lab_block(2, 2, 3));
        assert!(state.lab_block_at(1, 2, 3).is_some());

        let removed = state.unregister_lab_block(1, 2, 3).unwrap();
        assert_eq!(removed.subject_id, 10);
        assert!(!state.is_in_lab_block(1, 2, 3));
    }

    #[test]
    fn test_elective_reservation() {
        let mut state = WorldState::new();
        state.reserve_elective(5, 1, 2, &[7, 8]);

        assert!(!state.is_reserved_by_other_basket(1, 2, 5));
        assert!(state.is_reserved_by_other_basket(1, 2, 6));
        assert!(!state.is_reserved_by_other_basket(1, 3, 6));
        assert!(state.is_teacher_locked(7, 1, 2));
        assert!(state.is_teacher_locked(8, 1, 2));
        assert!(!state.is_teacher_locked(9, 1, 2));
        assert!(!state.is_teacher_locked(7, 1, 3));
        assert_eq!(state.basket_reserved_slots(5), &[(1, 2)]);
    }

    #[test]
    fn test_locked_slots() {
        let mut state = WorldState::new();
        state.lock_slot(1, 0, 0);
        assert!(state.is_locked(1, 0, 0));
        assert!(!state.is_locked(1, 0, 1));
        assert!(!state.is_locked(2, 0, 0));
    }

    #[test]
    fn test_committed_units_counts_blocks_once() {
        let mut state = WorldState::new();
        state.add_allocation(Allocation::new(1, 0, 3, 10, 1, 1, Component::Lab));
        state.add_allocation(
            Allocation::new(1, 0, 4, 10, 1, 1, Component::Lab).as_continuation(),
        );
        state.add_allocation(alloc(1, 1, 0, 10));

        assert_eq!(state.committed_units(1, 10, Component::Lab), 1);
        assert_eq!(state.committed_units(1, 10, Component::Theory), 1);
        assert_eq!(state.committed_units(1, 10, Component::Tutorial), 0);
    }

    #[test]
    fn test_snapshot_restore() {
        let mut state = WorldState::new();
        state.add_allocation(alloc(1, 0, 0, 10));
        let snap = state.snapshot();

        state.add_allocation(alloc(1, 1, 1, 11));
        state.lock_slot(1, 1, 1);
        assert_eq!(state.len(), 2);

        state.restore(snap);
        assert_eq!(state.len(), 1);
        assert!(state.is_class_free(1, 1, 1));
        assert!(!state.is_locked(1, 1, 1));
    }

    #[test]
    fn test_into_allocations_sorted() {
        let mut state = WorldState::new();
        state.add_allocation(alloc(2, 0, 0, 10));
        state.add_allocation(alloc(1, 4, 6, 11));
        state.add_allocation(alloc(1, 0, 3, 12));

        let sorted = state.into_allocations();
        assert_eq!(sorted[0].class_id, 1);
        assert_eq!(sorted[0].slot(), (0, 3));
        assert_eq!(sorted[1].slot(), (4, 6));
        assert_eq!(sorted[2].class_id, 2);
    }
}
