//! Timetabling domain models.
//!
//! Value records describing the entities the engine schedules:
//! teachers, subjects, classes, rooms, elective baskets, pre-locked
//! fixed slots, and the allocation records it emits.
//!
//! All identifiers are opaque integers. Entities live in flat vectors
//! inside the input snapshot and refer to each other by id; the engine
//! precomputes lookup maps once at the start of a run.

mod allocation;
mod basket;
mod class;
mod room;
pub mod slot;
mod subject;
mod teacher;

pub use allocation::{Allocation, LabBlock};
pub use basket::ElectiveBasket;
pub use class::Class;
pub use room::{Room, RoomKind};
pub use slot::{Day, FixedSlot, Period};
pub use subject::{Component, Subject};
pub use teacher::{FixedAssignment, Qualification, Teacher};

/// Teacher identifier.
pub type TeacherId = u32;
/// Subject identifier.
pub type SubjectId = u32;
/// Class identifier.
pub type ClassId = u32;
/// Room identifier.
pub type RoomId = u32;
/// Elective basket identifier.
pub type BasketId = u32;
