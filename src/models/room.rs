//! Room model.
//!
//! Rooms are classified by kind: lab components require lab rooms,
//! while theory and tutorial sessions accept lecture or seminar rooms.
//! A room must hold at least the class's student count.

use serde::{Deserialize, Serialize};

use super::{Component, RoomId};

/// Room classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomKind {
    /// Standard lecture hall.
    Lecture,
    /// Practical lab room.
    Lab,
    /// Seminar room (usable for theory/tutorial sessions).
    Seminar,
}

/// A physical room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier.
    pub id: RoomId,
    /// Human-readable name.
    pub name: String,
    /// Seating capacity.
    pub capacity: u32,
    /// Room classification.
    pub kind: RoomKind,
    /// Whether the room may be scheduled at all.
    pub available: bool,
}

impl Room {
    /// Creates a room of the given kind.
    pub fn new(id: RoomId, kind: RoomKind) -> Self {
        Self {
            id,
            name: String::new(),
            capacity: 60,
            kind,
            available: true,
        }
    }

    /// Creates a lecture room.
    pub fn lecture(id: RoomId) -> Self {
        Self::new(id, RoomKind::Lecture)
    }

    /// Creates a lab room.
    pub fn lab(id: RoomId) -> Self {
        Self::new(id, RoomKind::Lab)
    }

    /// Creates a seminar room.
    pub fn seminar(id: RoomId) -> Self {
        Self::new(id, RoomKind::Seminar)
    }

    /// Sets the room name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the seating capacity.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    /// Marks the room unavailable.
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Whether this room kind suits the given component.
    pub fn suits(&self, component: Component) -> bool {
        match component {
            Component::Lab => self.kind == RoomKind::Lab,
            Component::Theory | Component::Tutorial => {
                matches!(self.kind, RoomKind::Lecture | RoomKind::Seminar)
            }
        }
    }

    /// Whether the room can seat the given number of students.
    #[inline]
    pub fn fits(&self, students: u32) -> bool {
        self.capacity >= students
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_builder() {
        let r = Room::lecture(1).with_name("LH-101").with_capacity(90);
        assert_eq!(r.kind, RoomKind::Lecture);
        assert_eq!(r.capacity, 90);
        assert!(r.available);
        assert!(r.fits(90));
        assert!(!r.fits(91));
    }

    #[test]
    fn test_room_suits_component() {
        let lecture = Room::lecture(1);
        let lab = Room::lab(2);
        let seminar = Room::seminar(3);

        assert!(lecture.suits(Component::Theory));
        assert!(lecture.suits(Component::Tutorial));
        assert!(!lecture.suits(Component::Lab));

        assert!(lab.suits(Component::Lab));
        assert!(!lab.suits(Component::Theory));

        assert!(seminar.suits(Component::Theory));
        assert!(!seminar.suits(Component::Lab));
    }

    #[test]
    fn test_room_unavailable() {
        let r = Room::lab(4).unavailable();
        assert!(!r.available);
    }
}
