//! Weekly academic timetable generation engine.
//!
//! Assigns every required (class, subject, component) teaching
//! obligation of a department to a concrete (day, period, teacher,
//! room) tuple under hard constraints (no double-booking, atomic lab
//! blocks, synchronized electives, honored fixed slots) and soft
//! preferences (spread loads, avoid last periods and gaps).
//!
//! # Modules
//!
//! - **`models`**: Domain types — `Teacher`, `Subject`, `Class`,
//!   `Room`, `ElectiveBasket`, `FixedSlot`, `Allocation`, and the
//!   5 × 7 weekly slot grid
//! - **`state`**: In-memory world state with O(1) busy-slot indices
//! - **`validation`**: Input integrity checks and the output invariant
//!   audit
//! - **`engine`**: The phased scheduler and its entry point,
//!   [`engine::TimetableEngine`]
//! - **`optimizer`**: Genetic post-optimization under preserved hard
//!   constraints
//!
//! # Architecture
//!
//! A run is a pure, single-threaded function of an input snapshot, a
//! seed, and an options record: the engine reads the snapshot, places
//! allocations phase by phase into its own world state, optionally
//! optimizes, audits, and emits the allocation list plus a report.
//! Partial coverage is a first-class result — unplaceable units are
//! reported, never raised.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

pub mod engine;
pub mod models;
pub mod optimizer;
pub mod state;
pub mod validation;
