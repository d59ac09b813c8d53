//! Class (student group) model.
//!
//! A class is a cohort that receives a timetable: a semester number, a
//! section, a student count (drives minimum room capacity), and the set
//! of subjects it takes.

use serde::{Deserialize, Serialize};

use super::{ClassId, SubjectId};

/// A class/section of students.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Class {
    /// Unique class identifier.
    pub id: ClassId,
    /// Human-readable name (e.g. "3rd Semester - Section A").
    pub name: String,
    /// Semester number (1..=8).
    pub semester: u32,
    /// Section label.
    pub section: String,
    /// Number of enrolled students.
    pub student_count: u32,
    /// Subjects this class takes (regular and elective candidates).
    pub subjects: Vec<SubjectId>,
}

impl Class {
    /// Creates a class with the given id.
    pub fn new(id: ClassId) -> Self {
        Self {
            id,
            name: String::new(),
            semester: 1,
            section: "A".to_string(),
            student_count: 60,
            subjects: Vec::new(),
        }
    }

    /// Sets the class name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the semester number.
    pub fn with_semester(mut self, semester: u32) -> Self {
        self.semester = semester;
        self
    }

    /// Sets the section label.
    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = section.into();
        self
    }

    /// Sets the student count.
    pub fn with_student_count(mut self, count: u32) -> Self {
        self.student_count = count;
        self
    }

    /// Adds a subject to the class.
    pub fn with_subject(mut self, subject_id: SubjectId) -> Self {
        self.subjects.push(subject_id);
        self
    }

    /// Adds several subjects to the class.
    pub fn with_subjects(mut self, subject_ids: Vec<SubjectId>) -> Self {
        self.subjects.extend(subject_ids);
        self
    }

    /// Whether the class takes the given subject.
    pub fn has_subject(&self, subject_id: SubjectId) -> bool {
        self.subjects.contains(&subject_id)
    }
}
