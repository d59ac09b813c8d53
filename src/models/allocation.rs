//! Allocation output records and lab blocks.
//!
//! An allocation is the atomic output unit of the engine: one (class,
//! day, period, subject, teacher, room, component) tuple. Allocations
//! are created only by the engine and never mutated once committed
//! within a run.
//!
//! A lab session spans two allocations at consecutive periods; the
//! second carries `is_lab_continuation = true` and the pair is tracked
//! as a [`LabBlock`]. For subject-per-day accounting a block counts as
//! one occurrence.

use serde::{Deserialize, Serialize};

use super::slot::{Day, Period};
use super::{BasketId, ClassId, Component, RoomId, SubjectId, TeacherId};

/// A single committed timetable entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    /// Class receiving the session.
    pub class_id: ClassId,
    /// Day of week (0..=4).
    pub day: Day,
    /// Period within the day (0..=6).
    pub period: Period,
    /// Subject taught.
    pub subject_id: SubjectId,
    /// Teacher delivering the session.
    pub teacher_id: TeacherId,
    /// Room hosting the session.
    pub room_id: RoomId,
    /// Pedagogical component.
    pub component: Component,
    /// Second period of a two-period lab block.
    pub is_lab_continuation: bool,
    /// Part of a synchronized elective unit.
    pub is_elective: bool,
    /// Owning elective basket, when elective.
    pub basket_id: Option<BasketId>,
}

impl Allocation {
    /// Creates a regular (non-elective, non-continuation) allocation.
    pub fn new(
        class_id: ClassId,
        day: Day,
        period: Period,
        subject_id: SubjectId,
        teacher_id: TeacherId,
        room_id: RoomId,
        component: Component,
    ) -> Self {
        Self {
            class_id,
            day,
            period,
            subject_id,
            teacher_id,
            room_id,
            component,
            is_lab_continuation: false,
            is_elective: false,
            basket_id: None,
        }
    }

    /// Marks this allocation as the second period of a lab block.
    pub fn as_continuation(mut self) -> Self {
        self.is_lab_continuation = true;
        self
    }

    /// Marks this allocation as part of a synchronized elective.
    pub fn as_elective(mut self, basket_id: BasketId) -> Self {
        self.is_elective = true;
        self.basket_id = Some(basket_id);
        self
    }

    /// The (day, period) slot of this allocation.
    #[inline]
    pub fn slot(&self) -> (Day, Period) {
        (self.day, self.period)
    }

    /// Canonical sort key: (class, day, period).
    #[inline]
    pub fn sort_key(&self) -> (ClassId, Day, Period) {
        (self.class_id, self.day, self.period)
    }
}

/// An atomic two-period lab session.
///
/// `end = start + 1`; both periods exist in the world state as two
/// allocations, the second marked as a continuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabBlock {
    /// Class receiving the lab.
    pub class_id: ClassId,
    /// Day of week.
    pub day: Day,
    /// First period of the block.
    pub start: Period,
    /// Subject taught.
    pub subject_id: SubjectId,
    /// Teacher delivering the lab.
    pub teacher_id: TeacherId,
    /// Lab room.
    pub room_id: RoomId,
}

impl LabBlock {
    /// Creates a lab block record.
    pub fn new(
        class_id: ClassId,
        day: Day,
        start: Period,
        subject_id: SubjectId,
        teacher_id: TeacherId,
        room_id: RoomId,
    ) -> Self {
        Self {
            class_id,
            day,
            start,
            subject_id,
            teacher_id,
            room_id,
        }
    }

    /// Second period of the block.
    #[inline]
    pub fn end(&self) -> Period {
        self.start + 1
    }

    /// Whether the block occupies the given period.
    #[inline]
    pub fn covers(&self, period: Period) -> bool {
        period == self.start || period == self.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_builders() {
        let a = Allocation::new(1, 0, 3, 10, 7, 2, Component::Lab);
        assert!(!a.is_lab_continuation);
        assert!(!a.is_elective);
        assert_eq!(a.slot(), (0, 3));

        let cont = a.clone().as_continuation();
        assert!(cont.is_lab_continuation);

        let e = Allocation::new(2, 1, 2, 11, 8, 3, Component::Theory).as_elective(5);
        assert!(e.is_elective);
        assert_eq!(e.basket_id, Some(5));
    }

    #[test]
    fn test_sort_key_ordering() {
        let a = Allocation::new(1, 0, 6, 10, 7, 2, Component::Theory);
        let b = Allocation::new(1, 1, 0, 10, 7, 2, Component::Theory);
        assert!(a.sort_key() < b.sort_key());
    }

    #[test]
    fn test_lab_block_coverage() {
        let block = LabBlock::new(1, 2, 3, 10, 7, 4);
        assert_eq!(block.end(), 4);
        assert!(block.covers(3));
        assert!(block.covers(4));
        assert!(!block.covers(5));
    }
}
