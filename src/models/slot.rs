//! The weekly slot grid and pre-locked slots.
//!
//! A teaching week is a fixed 5 × 7 grid: five weekdays, seven periods
//! per day, both zero-indexed. Break and lunch boundaries between
//! periods are presentational only and play no role in constraint
//! checking.
//!
//! Lab sessions occupy two consecutive periods and may only start at a
//! post-lunch block boundary: period 3 (pair 3–4) or period 5 (pair 5–6).

use serde::{Deserialize, Serialize};

use super::{ClassId, Component, RoomId, SubjectId, TeacherId};

/// Weekday index, 0 = Monday .. 4 = Friday.
pub type Day = u8;
/// Period index within a day, 0..=6.
pub type Period = u8;

/// Number of teaching days per week.
pub const DAYS_PER_WEEK: u8 = 5;
/// Number of periods per day.
pub const PERIODS_PER_DAY: u8 = 7;
/// Total placeable periods per week for one class.
pub const SLOTS_PER_WEEK: u32 = DAYS_PER_WEEK as u32 * PERIODS_PER_DAY as u32;
/// Periods at which a two-period lab block may start.
pub const LAB_STARTS: [Period; 2] = [3, 5];

/// Whether a period is a valid lab block start.
#[inline]
pub fn is_lab_start(period: Period) -> bool {
    LAB_STARTS.contains(&period)
}

/// All (day, period) pairs of the week, in row-major order.
pub fn week_slots() -> Vec<(Day, Period)> {
    let mut slots = Vec::with_capacity(SLOTS_PER_WEEK as usize);
    for day in 0..DAYS_PER_WEEK {
        for period in 0..PERIODS_PER_DAY {
            slots.push((day, period));
        }
    }
    slots
}

/// All (day, start) pairs at which a lab block may be placed.
pub fn lab_block_slots() -> Vec<(Day, Period)> {
    let mut slots = Vec::with_capacity(DAYS_PER_WEEK as usize * LAB_STARTS.len());
    for day in 0..DAYS_PER_WEEK {
        for &start in &LAB_STARTS {
            slots.push((day, start));
        }
    }
    slots
}

/// A user-locked pre-allocation.
///
/// Fixed slots are honored verbatim by the scheduler: the named teacher
/// teaches the named subject to the named class at exactly this (day,
/// period). When `room_id` is absent, the engine resolves a suitable
/// free room at installation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedSlot {
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
    /// Pedagogical component of the session.
    pub component: Component,
    /// Pinned room. `None` = engine picks a free room of matching kind.
    pub room_id: Option<RoomId>,
}

impl FixedSlot {
    /// Creates a fixed slot without a pinned room.
    pub fn new(
        class_id: ClassId,
        day: Day,
        period: Period,
        subject_id: SubjectId,
        teacher_id: TeacherId,
        component: Component,
    ) -> Self {
        Self {
            class_id,
            day,
            period,
            subject_id,
            teacher_id,
            component,
            room_id: None,
        }
    }

    /// Pins a specific room.
    pub fn with_room(mut self, room_id: RoomId) -> Self {
        self.room_id = Some(room_id);
        self
    }

    /// Whether the slot coordinates fall inside the weekly grid.
    pub fn in_grid(&self) -> bool {
        self.day < DAYS_PER_WEEK && self.period < PERIODS_PER_DAY
    }
}
