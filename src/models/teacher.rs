//! Teacher model, subject qualifications, and fixed teaching assignments.
//!
//! A teacher carries a weekly hour cap, a set of available weekdays, and
//! a qualification list with an effectiveness score per subject. The
//! effectiveness score (0.0..=1.0) breaks ties when the binding step
//! chooses among equally-loaded qualified teachers.

use serde::{Deserialize, Serialize};

use super::slot::Day;
use super::{ClassId, Component, SubjectId, TeacherId};

/// A subject a teacher is qualified to teach, with effectiveness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Qualification {
    /// Subject the teacher may be bound to.
    pub subject_id: SubjectId,
    /// Teaching effectiveness for this subject (0.0..=1.0).
    pub effectiveness: f64,
}

impl Qualification {
    /// Creates a qualification, clamping effectiveness to [0, 1].
    pub fn new(subject_id: SubjectId, effectiveness: f64) -> Self {
        Self {
            subject_id,
            effectiveness: effectiveness.clamp(0.0, 1.0),
        }
    }
}

/// A teacher available for binding and placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    /// Unique teacher identifier.
    pub id: TeacherId,
    /// Human-readable name.
    pub name: String,
    /// Maximum teaching hours per week.
    pub max_hours_per_week: u32,
    /// Weekdays the teacher may be scheduled on (0..=4).
    pub available_days: Vec<Day>,
    /// Subjects the teacher is qualified for.
    pub qualifications: Vec<Qualification>,
}

impl Teacher {
    /// Creates a teacher with default availability (all five days)
    /// and a 20-hour weekly cap.
    pub fn new(id: TeacherId) -> Self {
        Self {
            id,
            name: String::new(),
            max_hours_per_week: 20,
            available_days: vec![0, 1, 2, 3, 4],
            qualifications: Vec::new(),
        }
    }

    /// Sets the teacher name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the weekly hour cap.
    pub fn with_max_hours(mut self, hours: u32) -> Self {
        self.max_hours_per_week = hours;
        self
    }

    /// Restricts availability to the given weekdays.
    pub fn with_available_days(mut self, days: Vec<Day>) -> Self {
        self.available_days = days;
        self
    }

    /// Adds a subject qualification.
    pub fn with_qualification(mut self, subject_id: SubjectId, effectiveness: f64) -> Self {
        self.qualifications
            .push(Qualification::new(subject_id, effectiveness));
        self
    }

    /// Whether the teacher may be scheduled on the given day.
    #[inline]
    pub fn is_available_on(&self, day: Day) -> bool {
        self.available_days.contains(&day)
    }

    /// Whether the teacher is qualified for the subject.
    pub fn is_qualified_for(&self, subject_id: SubjectId) -> bool {
        self.qualifications.iter().any(|q| q.subject_id == subject_id)
    }

    /// Effectiveness score for a subject (0.0 if not qualified).
    pub fn effectiveness_for(&self, subject_id: SubjectId) -> f64 {
        self.qualifications
            .iter()
            .find(|q| q.subject_id == subject_id)
            .map(|q| q.effectiveness)
            .unwrap_or(0.0)
    }
}

/// An operator-fixed (class, subject, component) → teacher assignment.
///
/// When present, the binding step uses this teacher unconditionally;
/// the qualified-candidate fallback never overrides it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedAssignment {
    /// Class the assignment applies to.
    pub class_id: ClassId,
    /// Subject taught.
    pub subject_id: SubjectId,
    /// Component taught.
    pub component: Component,
    /// Assigned teacher.
    pub teacher_id: TeacherId,
}

impl FixedAssignment {
    /// Creates a fixed assignment.
    pub fn new(
        class_id: ClassId,
        subject_id: SubjectId,
        component: Component,
        teacher_id: TeacherId,
    ) -> Self {
        Self {
            class_id,
            subject_id,
            component,
            teacher_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teacher_builder() {
        let t = Teacher::new(1)
            .with_name("Dr. Rao")
            .with_max_hours(16)
            .with_available_days(vec![0, 1, 2])
            .with_qualification(10, 0.9)
            .with_qualification(11, 0.7);

        assert_eq!(t.id, 1);
        assert_eq!(t.max_hours_per_week, 16);
        assert!(t.is_available_on(2));
        assert!(!t.is_available_on(4));
        assert!(t.is_qualified_for(10));
        assert!(!t.is_qualified_for(99));
    }

    #[test]
    fn test_default_availability() {
        let t = Teacher::new(2);
        for day in 0..5 {
            assert!(t.is_available_on(day));
        }
    }

    #[test]
    fn test_effectiveness_lookup() {
        let t = Teacher::new(3).with_qualification(10, 0.85);
        assert!((t.effectiveness_for(10) - 0.85).abs() < 1e-10);
        assert!((t.effectiveness_for(11) - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_effectiveness_clamping() {
        let t = Teacher::new(4)
            .with_qualification(10, 1.5)
            .with_qualification(11, -0.2);
        assert!((t.effectiveness_for(10) - 1.0).abs() < 1e-10);
        assert!((t.effectiveness_for(11) - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_fixed_assignment() {
        let fa = FixedAssignment::new(1, 10, Component::Theory, 7);
        assert_eq!(fa.teacher_id, 7);
        assert_eq!(fa.component, Component::Theory);
    }
}
