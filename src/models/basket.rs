//! Elective basket model.
//!
//! A basket groups interchangeable elective subjects offered to several
//! classes of the same semester. All subjects in a basket carry the same
//! weekly hour budgets, and every participating class takes exactly one
//! subject from the basket. The scheduler places all participants of a
//! basket at the same (day, period) — or, for labs, the same (day,
//! start) block — so the cohort splits across rooms simultaneously.

use serde::{Deserialize, Serialize};

use super::{BasketId, ClassId, SubjectId};

/// A group of interchangeable elective subjects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElectiveBasket {
    /// Unique basket identifier.
    pub id: BasketId,
    /// Human-readable name (e.g. "Professional Elective I").
    pub name: String,
    /// Semester the basket is offered in.
    pub semester: u32,
    /// Weekly theory hours (identical for all member subjects).
    pub theory_hours: u32,
    /// Weekly lab hours (identical for all member subjects; even).
    pub lab_hours: u32,
    /// Weekly tutorial hours (identical for all member subjects).
    pub tutorial_hours: u32,
    /// Classes that take an elective from this basket.
    pub classes: Vec<ClassId>,
    /// Member subjects.
    pub subjects: Vec<SubjectId>,
}

impl ElectiveBasket {
    /// Creates an empty basket.
    pub fn new(id: BasketId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            semester: 1,
            theory_hours: 0,
            lab_hours: 0,
            tutorial_hours: 0,
            classes: Vec::new(),
            subjects: Vec::new(),
        }
    }

    /// Sets the semester number.
    pub fn with_semester(mut self, semester: u32) -> Self {
        self.semester = semester;
        self
    }

    /// Sets weekly theory hours.
    pub fn with_theory_hours(mut self, hours: u32) -> Self {
        self.theory_hours = hours;
        self
    }

    /// Sets weekly lab hours.
    pub fn with_lab_hours(mut self, hours: u32) -> Self {
        self.lab_hours = hours;
        self
    }

    /// Sets weekly tutorial hours.
    pub fn with_tutorial_hours(mut self, hours: u32) -> Self {
        self.tutorial_hours = hours;
        self
    }

    /// Adds a participating class.
    pub fn with_class(mut self, class_id: ClassId) -> Self {
        self.classes.push(class_id);
        self
    }

    /// Adds several participating classes.
    pub fn with_classes(mut self, class_ids: Vec<ClassId>) -> Self {
        self.classes.extend(class_ids);
        self
    }

    /// Adds a member subject.
    pub fn with_subject(mut self, subject_id: SubjectId) -> Self {
        self.subjects.push(subject_id);
        self
    }

    /// Adds several member subjects.
    pub fn with_subjects(mut self, subject_ids: Vec<SubjectId>) -> Self {
        self.subjects.extend(subject_ids);
        self
    }

    /// Whether the class participates in this basket.
    pub fn has_class(&self, class_id: ClassId) -> bool {
        self.classes.contains(&class_id)
    }

    /// Whether the subject belongs to this basket.
    pub fn has_subject(&self, subject_id: SubjectId) -> bool {
        self.subjects.contains(&subject_id)
    }

    /// Number of two-period lab blocks per week.
    pub fn lab_blocks(&self) -> u32 {
        self.lab_hours / 2
    }

    /// Total weekly hours across all components.
    pub fn weekly_hours(&self) -> u32 {
        self.theory_hours + self.lab_hours + self.tutorial_hours
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basket_builder() {
        let b = ElectiveBasket::new(1, "Professional Elective I")
            .with_semester(5)
            .with_theory_hours(3)
            .with_lab_hours(2)
            .with_classes(vec![1, 2, 3])
            .with_subjects(vec![10, 11, 12]);

        assert_eq!(b.id, 1);
        assert_eq!(b.semester, 5);
        assert_eq!(b.weekly_hours(), 5);
        assert_eq!(b.lab_blocks(), 1);
        assert!(b.has_class(2));
        assert!(!b.has_class(9));
        assert!(b.has_subject(11));
        assert!(!b.has_subject(99));
    }

    #[test]
    fn test_empty_basket() {
        let b = ElectiveBasket::new(2, "Open Elective");
        assert!(b.classes.is_empty());
        assert!(b.subjects.is_empty());
        assert_eq!(b.weekly_hours(), 0);
    }
}
