//! Subject model and component kinds.
//!
//! A subject carries separate weekly hour budgets for its theory, lab,
//! and tutorial components. Lab hours come in two-period blocks, so
//! `lab_hours` must be even; odd values are rejected during input
//! validation.
//!
//! A subject is an elective iff it belongs to an elective basket.

use serde::{Deserialize, Serialize};

use super::BasketId;

/// Pedagogical kind of a teaching hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Component {
    /// Classroom lecture.
    Theory,
    /// Two-period practical session in a lab room.
    Lab,
    /// Problem-solving / discussion hour.
    Tutorial,
}

impl Component {
    /// Short lowercase label for log and report messages.
    pub fn label(&self) -> &'static str {
        match self {
            Component::Theory => "theory",
            Component::Lab => "lab",
            Component::Tutorial => "tutorial",
        }
    }
}

/// A subject (course) offered to one or more classes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    /// Unique subject identifier.
    pub id: super::SubjectId,
    /// Course code (e.g. "CS301").
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// Weekly theory hours.
    pub theory_hours: u32,
    /// Weekly lab hours. Must be even (labs are 2-period blocks).
    pub lab_hours: u32,
    /// Weekly tutorial hours.
    pub tutorial_hours: u32,
    /// Semester the subject belongs to. `None` = unrestricted.
    pub semester: Option<u32>,
    /// Elective basket membership. `None` = regular (non-elective) subject.
    pub basket_id: Option<BasketId>,
}

impl Subject {
    /// Creates a new subject with the given id and code.
    pub fn new(id: super::SubjectId, code: impl Into<String>) -> Self {
        Self {
            id,
            code: code.into(),
            name: String::new(),
            theory_hours: 0,
            lab_hours: 0,
            tutorial_hours: 0,
            semester: None,
            basket_id: None,
        }
    }

    /// Sets the subject name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets weekly theory hours.
    pub fn with_theory_hours(mut self, hours: u32) -> Self {
        self.theory_hours = hours;
        self
    }

    /// Sets weekly lab hours (must be even; validated at run start).
    pub fn with_lab_hours(mut self, hours: u32) -> Self {
        self.lab_hours = hours;
        self
    }

    /// Sets weekly tutorial hours.
    pub fn with_tutorial_hours(mut self, hours: u32) -> Self {
        self.tutorial_hours = hours;
        self
    }

    /// Sets the semester number.
    pub fn with_semester(mut self, semester: u32) -> Self {
        self.semester = Some(semester);
        self
    }

    /// Places the subject in an elective basket.
    pub fn with_basket(mut self, basket_id: BasketId) -> Self {
        self.basket_id = Some(basket_id);
        self
    }

    /// Whether this subject is an elective.
    #[inline]
    pub fn is_elective(&self) -> bool {
        self.basket_id.is_some()
    }

    /// Total weekly hours across all components.
    pub fn weekly_hours(&self) -> u32 {
        self.theory_hours + self.lab_hours + self.tutorial_hours
    }

    /// Weekly hours of a single component.
    pub fn component_hours(&self, component: Component) -> u32 {
        match component {
            Component::Theory => self.theory_hours,
            Component::Lab => self.lab_hours,
            Component::Tutorial => self.tutorial_hours,
        }
    }

    /// Number of two-period lab blocks per week.
    pub fn lab_blocks(&self) -> u32 {
        self.lab_hours / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_builder() {
        let s = Subject::new(1, "CS301")
            .with_name("Operating Systems")
            .with_theory_hours(3)
            .with_lab_hours(2)
            .with_tutorial_hours(1)
            .with_semester(5);

        assert_eq!(s.id, 1);
        assert_eq!(s.code, "CS301");
        assert_eq!(s.weekly_hours(), 6);
        assert_eq!(s.lab_blocks(), 1);
        assert_eq!(s.semester, Some(5));
        assert!(!s.is_elective());
    }

    #[test]
    fn test_elective_membership() {
        let s = Subject::new(2, "CS351").with_theory_hours(3).with_basket(9);
        assert!(s.is_elective());
        assert_eq!(s.basket_id, Some(9));
    }

    #[test]
    fn test_component_hours() {
        let s = Subject::new(3, "MA201")
            .with_theory_hours(4)
            .with_tutorial_hours(1);
        assert_eq!(s.component_hours(Component::Theory), 4);
        assert_eq!(s.component_hours(Component::Lab), 0);
        assert_eq!(s.component_hours(Component::Tutorial), 1);
    }

    #[test]
    fn test_component_labels() {
        assert_eq!(Component::Theory.label(), "theory");
        assert_eq!(Component::Lab.label(), "lab");
        assert_eq!(Component::Tutorial.label(), "tutorial");
    }
}
