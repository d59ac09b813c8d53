//! Input validation and output auditing.
//!
//! [`validate_input`] runs before any scheduling work and rejects
//! malformed or a-priori infeasible snapshots: duplicate ids, dangling
//! references, odd lab hours, weekly demand beyond the 35-period grid.
//!
//! [`audit_timetable`] re-checks every global invariant against the
//! committed allocations after scheduling. Findings there indicate an
//! engine defect: they are reported but the timetable is still emitted.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::engine::TimetableInput;
use crate::models::slot::{is_lab_start, DAYS_PER_WEEK, PERIODS_PER_DAY, SLOTS_PER_WEEK};
use crate::models::{Allocation, Component, FixedSlot};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error or audit finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors and audit findings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A record references an entity that doesn't exist.
    UnknownReference,
    /// A subject or basket declares an odd number of lab hours.
    OddLabHours,
    /// Weekly demand exceeds the placeable periods of the grid.
    ExcessiveHours,
    /// A subject or basket semester doesn't match its class.
    SemesterMismatch,
    /// Basket member subjects declare differing weekly hours.
    UnevenBasketHours,
    /// A fixed slot lies outside the weekly grid or at an invalid
    /// lab start.
    InvalidSlot,
    /// Two allocations collide on (class, day, period).
    ClassOverlap,
    /// Two allocations collide on (teacher, day, period).
    TeacherOverlap,
    /// Two allocations collide on (room, day, period).
    RoomOverlap,
    /// A lab allocation lacks its continuation (or vice versa).
    BrokenLabPair,
    /// A subject appears more than once on a (class, day).
    SubjectRepeat,
    /// Allocations of a basket unit are not synchronized across its
    /// participating classes.
    ElectiveDesync,
    /// An honored fixed slot has no matching allocation.
    MissingFixedSlot,
    /// An allocation uses a teacher outside their available days.
    UnavailableTeacherDay,
    /// A room hosts more students than its capacity.
    RoomOverCapacity,
    /// A room of the wrong kind hosts a session (e.g. a lab in a
    /// lecture room).
    RoomKindMismatch,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the input snapshot before scheduling.
///
/// Checks:
/// 1. No duplicate teacher/subject/class/room/basket IDs
/// 2. All id references resolve (class subjects, basket members,
///    fixed assignments, fixed slots)
/// 3. Lab hours are even (subjects and baskets)
/// 4. No subject, class, or basket demands more than 35 weekly periods
/// 5. Semester numbers agree between classes and their non-elective
///    subjects, and between baskets and their participants
/// 6. Basket member subjects carry identical weekly hours
/// 7. Fixed slots lie inside the grid; fixed Lab slots start at a
///    valid block boundary
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(input: &TimetableInput) -> ValidationResult {
    let mut errors = Vec::new();

    let mut teacher_ids = HashSet::new();
    for t in &input.teachers {
        if !teacher_ids.insert(t.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate teacher ID: {}", t.id),
            ));
        }
    }
    let mut subject_ids = HashSet::new();
    for s in &input.subjects {
        if !subject_ids.insert(s.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate subject ID: {}", s.id),
            ));
        }
    }
    let mut class_ids = HashSet::new();
    for c in &input.classes {
        if !class_ids.insert(c.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate class ID: {}", c.id),
            ));
        }
    }
    let mut room_ids = HashSet::new();
    for r in &input.rooms {
        if !room_ids.insert(r.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate room ID: {}", r.id),
            ));
        }
    }
    let mut basket_ids = HashSet::new();
    for b in &input.baskets {
        if !basket_ids.insert(b.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate basket ID: {}", b.id),
            ));
        }
    }

    let subject_by_id: HashMap<_, _> = input.subjects.iter().map(|s| (s.id, s)).collect();

    // Per-subject checks
    for s in &input.subjects {
        if s.lab_hours % 2 != 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::OddLabHours,
                format!("Subject '{}' has odd lab hours ({})", s.code, s.lab_hours),
            ));
        }
        if s.weekly_hours() > SLOTS_PER_WEEK {
            errors.push(ValidationError::new(
                ValidationErrorKind::ExcessiveHours,
                format!(
                    "Subject '{}' demands {} weekly hours, grid has {}",
                    s.code,
                    s.weekly_hours(),
                    SLOTS_PER_WEEK
                ),
            ));
        }
    }

    // Per-class checks: references, semester agreement, total demand
    for c in &input.classes {
        let mut demand: u32 = 0;
        for &sid in &c.subjects {
            match subject_by_id.get(&sid) {
                None => {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::UnknownReference,
                        format!("Class {} references unknown subject {}", c.id, sid),
                    ));
                }
                Some(s) => {
                    if !s.is_elective() {
                        demand += s.weekly_hours();
                        if let Some(sem) = s.semester {
                            if sem != c.semester {
                                errors.push(ValidationError::new(
                                    ValidationErrorKind::SemesterMismatch,
                                    format!(
                                        "Subject '{}' (semester {}) listed by class {} (semester {})",
                                        s.code, sem, c.id, c.semester
                                    ),
                                ));
                            }
                        }
                    }
                }
            }
        }
        for b in &input.baskets {
            if b.has_class(c.id) {
                demand += b.weekly_hours();
            }
        }
        if demand > SLOTS_PER_WEEK {
            errors.push(ValidationError::new(
                ValidationErrorKind::ExcessiveHours,
                format!(
                    "Class {} demands {} weekly hours, grid has {}",
                    c.id, demand, SLOTS_PER_WEEK
                ),
            ));
        }
    }

    // Per-basket checks
    for b in &input.baskets {
        if b.lab_hours % 2 != 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::OddLabHours,
                format!("Basket '{}' has odd lab hours ({})", b.name, b.lab_hours),
            ));
        }
        if b.weekly_hours() > SLOTS_PER_WEEK {
            errors.push(ValidationError::new(
                ValidationErrorKind::ExcessiveHours,
                format!(
                    "Basket '{}' demands {} weekly hours, grid has {}",
                    b.name,
                    b.weekly_hours(),
                    SLOTS_PER_WEEK
                ),
            ));
        }
        for &cid in &b.classes {
            if !class_ids.contains(&cid) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownReference,
                    format!("Basket '{}' references unknown class {}", b.name, cid),
                ));
            } else if let Some(c) = input.classes.iter().find(|c| c.id == cid) {
                if c.semester != b.semester {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::SemesterMismatch,
                        format!(
                            "Basket '{}' (semester {}) includes class {} (semester {})",
                            b.name, b.semester, cid, c.semester
                        ),
                    ));
                }
            }
        }
        for &sid in &b.subjects {
            match subject_by_id.get(&sid) {
                None => {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::UnknownReference,
                        format!("Basket '{}' references unknown subject {}", b.name, sid),
                    ));
                }
                Some(s) => {
                    if s.theory_hours != b.theory_hours
                        || s.lab_hours != b.lab_hours
                        || s.tutorial_hours != b.tutorial_hours
                    {
                        errors.push(ValidationError::new(
                            ValidationErrorKind::UnevenBasketHours,
                            format!(
                                "Subject '{}' hours differ from basket '{}'",
                                s.code, b.name
                            ),
                        ));
                    }
                }
            }
        }
    }

    // Fixed assignment references
    for fa in &input.assignments {
        if !class_ids.contains(&fa.class_id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownReference,
                format!("Fixed assignment references unknown class {}", fa.class_id),
            ));
        }
        if !subject_ids.contains(&fa.subject_id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownReference,
                format!(
                    "Fixed assignment references unknown subject {}",
                    fa.subject_id
                ),
            ));
        }
        if !teacher_ids.contains(&fa.teacher_id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownReference,
                format!(
                    "Fixed assignment references unknown teacher {}",
                    fa.teacher_id
                ),
            ));
        }
    }

    // Fixed slot references and grid position
    for fs in &input.fixed_slots {
        if !class_ids.contains(&fs.class_id)
            || !subject_ids.contains(&fs.subject_id)
            || !teacher_ids.contains(&fs.teacher_id)
        {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownReference,
                format!(
                    "Fixed slot at (day {}, period {}) references unknown entities",
                    fs.day, fs.period
                ),
            ));
        }
        if let Some(rid) = fs.room_id {
            match input.rooms.iter().find(|r| r.id == rid) {
                None => {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::UnknownReference,
                        format!("Fixed slot references unknown room {}", rid),
                    ));
                }
                Some(room) if !room.suits(fs.component) => {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::RoomKindMismatch,
                        format!(
                            "Fixed {} slot for class {} pins unsuitable room {}",
                            fs.component.label(),
                            fs.class_id,
                            rid
                        ),
                    ));
                }
                Some(_) => {}
            }
        }
        if !fs.in_grid() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidSlot,
                format!(
                    "Fixed slot at (day {}, period {}) lies outside the weekly grid",
                    fs.day, fs.period
                ),
            ));
        } else if fs.component == Component::Lab && !is_lab_start(fs.period) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidSlot,
                format!(
                    "Fixed lab slot for class {} starts at period {}, labs start at 3 or 5",
                    fs.class_id, fs.period
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Re-checks every global invariant against committed allocations.
///
/// `honored_fixed` is the subset of input fixed slots the scheduler
/// actually installed (conflicting slots are excluded by the caller).
/// Any finding indicates an engine defect; the caller reports it but
/// keeps the timetable.
pub fn audit_timetable(
    allocations: &[Allocation],
    input: &TimetableInput,
    honored_fixed: &[FixedSlot],
) -> Vec<ValidationError> {
    let mut findings = Vec::new();

    let teacher_by_id: HashMap<_, _> = input.teachers.iter().map(|t| (t.id, t)).collect();
    let class_by_id: HashMap<_, _> = input.classes.iter().map(|c| (c.id, c)).collect();
    let room_by_id: HashMap<_, _> = input.rooms.iter().map(|r| (r.id, r)).collect();

    // Uniqueness over (class|teacher|room, day, period)
    let mut class_seen = HashSet::new();
    let mut teacher_seen = HashSet::new();
    let mut room_seen = HashSet::new();
    for a in allocations {
        if !class_seen.insert((a.class_id, a.day, a.period)) {
            findings.push(ValidationError::new(
                ValidationErrorKind::ClassOverlap,
                format!(
                    "Class {} double-booked at (day {}, period {})",
                    a.class_id, a.day, a.period
                ),
            ));
        }
        if !teacher_seen.insert((a.teacher_id, a.day, a.period)) {
            findings.push(ValidationError::new(
                ValidationErrorKind::TeacherOverlap,
                format!(
                    "Teacher {} double-booked at (day {}, period {})",
                    a.teacher_id, a.day, a.period
                ),
            ));
        }
        if !room_seen.insert((a.room_id, a.day, a.period)) {
            findings.push(ValidationError::new(
                ValidationErrorKind::RoomOverlap,
                format!(
                    "Room {} double-booked at (day {}, period {})",
                    a.room_id, a.day, a.period
                ),
            ));
        }
    }

    // Lab atomicity and placement
    for a in allocations {
        if a.component != Component::Lab {
            continue;
        }
        if a.is_lab_continuation {
            let has_start = a.period > 0
                && allocations.iter().any(|b| {
                    b.class_id == a.class_id
                        && b.day == a.day
                        && b.period == a.period - 1
                        && b.subject_id == a.subject_id
                        && b.teacher_id == a.teacher_id
                        && b.room_id == a.room_id
                        && !b.is_lab_continuation
                });
            if !has_start {
                findings.push(ValidationError::new(
                    ValidationErrorKind::BrokenLabPair,
                    format!(
                        "Lab continuation for class {} at (day {}, period {}) has no start",
                        a.class_id, a.day, a.period
                    ),
                ));
            }
        } else {
            if !is_lab_start(a.period) {
                findings.push(ValidationError::new(
                    ValidationErrorKind::BrokenLabPair,
                    format!(
                        "Lab for class {} starts at period {}, labs start at 3 or 5",
                        a.class_id, a.period
                    ),
                ));
            }
            let has_continuation = allocations.iter().any(|b| {
                b.class_id == a.class_id
                    && b.day == a.day
                    && b.period == a.period + 1
                    && b.subject_id == a.subject_id
                    && b.teacher_id == a.teacher_id
                    && b.room_id == a.room_id
                    && b.is_lab_continuation
            });
            if !has_continuation {
                findings.push(ValidationError::new(
                    ValidationErrorKind::BrokenLabPair,
                    format!(
                        "Lab for class {} at (day {}, period {}) has no continuation",
                        a.class_id, a.day, a.period
                    ),
                ));
            }
        }
    }

    // Subject-per-day (lab blocks count once: continuations skipped)
    let mut per_day: BTreeMap<(u32, u8), BTreeMap<u32, u32>> = BTreeMap::new();
    for a in allocations {
        if a.is_lab_continuation {
            continue;
        }
        *per_day
            .entry((a.class_id, a.day))
            .or_default()
            .entry(a.subject_id)
            .or_insert(0) += 1;
    }
    for ((class_id, day), subjects) in &per_day {
        for (subject_id, count) in subjects {
            if *count > 1 {
                findings.push(ValidationError::new(
                    ValidationErrorKind::SubjectRepeat,
                    format!(
                        "Subject {} appears {} times for class {} on day {}",
                        subject_id, count, class_id, day
                    ),
                ));
            }
        }
    }

    // Elective synchronization: every (basket, day, start) unit must
    // cover exactly the basket's participating classes.
    for basket in &input.baskets {
        let mut units: BTreeMap<(u8, u8), BTreeSet<u32>> = BTreeMap::new();
        for a in allocations {
            if a.basket_id == Some(basket.id) && !a.is_lab_continuation {
                units.entry((a.day, a.period)).or_default().insert(a.class_id);
            }
        }
        let participants: BTreeSet<u32> = basket.classes.iter().copied().collect();
        for ((day, period), classes) in &units {
            if *classes != participants {
                findings.push(ValidationError::new(
                    ValidationErrorKind::ElectiveDesync,
                    format!(
                        "Basket '{}' at (day {}, period {}) covers {} of {} classes",
                        basket.name,
                        day,
                        period,
                        classes.len(),
                        participants.len()
                    ),
                ));
            }
        }
    }

    // Honored fixed slots must appear verbatim
    for fs in honored_fixed {
        let found = allocations.iter().any(|a| {
            a.class_id == fs.class_id
                && a.day == fs.day
                && a.period == fs.period
                && a.subject_id == fs.subject_id
                && a.teacher_id == fs.teacher_id
                && a.component == fs.component
        });
        if !found {
            findings.push(ValidationError::new(
                ValidationErrorKind::MissingFixedSlot,
                format!(
                    "Fixed slot for class {} at (day {}, period {}) missing from output",
                    fs.class_id, fs.day, fs.period
                ),
            ));
        }
    }

    // Teacher availability, room capacity, and room kind
    for a in allocations {
        if let Some(t) = teacher_by_id.get(&a.teacher_id) {
            if !t.is_available_on(a.day) {
                findings.push(ValidationError::new(
                    ValidationErrorKind::UnavailableTeacherDay,
                    format!(
                        "Teacher {} scheduled on unavailable day {}",
                        a.teacher_id, a.day
                    ),
                ));
            }
        }
        if let Some(room) = room_by_id.get(&a.room_id) {
            if let Some(class) = class_by_id.get(&a.class_id) {
                if room.capacity < class.student_count {
                    findings.push(ValidationError::new(
                        ValidationErrorKind::RoomOverCapacity,
                        format!(
                            "Room {} (capacity {}) hosts class {} ({} students)",
                            room.id, room.capacity, class.id, class.student_count
                        ),
                    ));
                }
            }
            if !room.suits(a.component) {
                findings.push(ValidationError::new(
                    ValidationErrorKind::RoomKindMismatch,
                    format!(
                        "Room {} hosts a {} session for class {} at (day {}, period {})",
                        room.id,
                        a.component.label(),
                        a.class_id,
                        a.day,
                        a.period
                    ),
                ));
            }
        }
    }

    // Grid bounds, as a final sanity net
    for a in allocations {
        if a.day >= DAYS_PER_WEEK || a.period >= PERIODS_PER_DAY {
            findings.push(ValidationError::new(
                ValidationErrorKind::InvalidSlot,
                format!(
                    "Allocation for class {} outside grid at (day {}, period {})",
                    a.class_id, a.day, a.period
                ),
            ));
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Class, ElectiveBasket, Room, Subject, Teacher};

    fn sample_input() -> TimetableInput {
        TimetableInput::new()
            .with_teachers(vec![Teacher::new(1).with_qualification(10, 0.8)])
            .with_subjects(vec![Subject::new(10, "CS101").with_theory_hours(3)])
            .with_classes(vec![Class::new(1).with_semester(3).with_subject(10)])
            .with_rooms(vec![Room::lecture(1)])
    }

    #[test]
    fn test_valid_input() {
        assert!(validate_input(&sample_input()).is_ok());
    }

    #[test]
    fn test_duplicate_ids() {
        let mut input = sample_input();
        input.teachers.push(Teacher::new(1));
        input.rooms.push(Room::lab(1));

        let errors = validate_input(&input).unwrap_err();
        assert_eq!(
            errors
                .iter()
                .filter(|e| e.kind == ValidationErrorKind::DuplicateId)
                .count(),
            2
        );
    }

    #[test]
    fn test_unknown_subject_reference() {
        let mut input = sample_input();
        input.classes[0].subjects.push(99);

        let errors = validate_input(&input).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::UnknownReference));
    }

    #[test]
    fn test_odd_lab_hours_rejected() {
        let mut input = sample_input();
        input.subjects[0].lab_hours = 3;

        let errors = validate_input(&input).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::OddLabHours));
    }

    #[test]
    fn test_excessive_subject_hours() {
        let mut input = sample_input();
        input.subjects[0].theory_hours = 36;

        let errors = validate_input(&input).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::ExcessiveHours));
    }

    #[test]
    fn test_class_demand_at_grid_limit_passes() {
        let mut input = sample_input();
        input.subjects[0].theory_hours = 35;
        assert!(validate_input(&input).is_ok());
    }

    #[test]
    fn test_semester_mismatch() {
        let mut input = sample_input();
        input.subjects[0].semester = Some(5); // class is semester 3

        let errors = validate_input(&input).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::SemesterMismatch));
    }

    #[test]
    fn test_uneven_basket_hours() {
        let mut input = sample_input();
        input
            .subjects
            .push(Subject::new(11, "EL1").with_theory_hours(3).with_basket(5));
        input
            .subjects
            .push(Subject::new(12, "EL2").with_theory_hours(2).with_basket(5));
        input.baskets.push(
            ElectiveBasket::new(5, "PE-I")
                .with_semester(3)
                .with_theory_hours(3)
                .with_class(1)
                .with_subjects(vec![11, 12]),
        );

        let errors = validate_input(&input).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::UnevenBasketHours));
    }

    #[test]
    fn test_fixed_lab_slot_invalid_start() {
        let mut input = sample_input();
        input.subjects[0].lab_hours = 2;
        input
            .fixed_slots
            .push(FixedSlot::new(1, 0, 2, 10, 1, Component::Lab));

        let errors = validate_input(&input).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidSlot));
    }

    #[test]
    fn test_fixed_slot_pinned_room_wrong_kind() {
        let mut input = sample_input();
        input.subjects[0].lab_hours = 2;
        input.rooms.push(Room::lab(2));
        // Pins the lecture room for a lab session.
        input
            .fixed_slots
            .push(FixedSlot::new(1, 0, 3, 10, 1, Component::Lab).with_room(1));

        let errors = validate_input(&input).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::RoomKindMismatch));
    }

    #[test]
    fn test_audit_clean_timetable() {
        let input = sample_input();
        let allocations = vec![
            Allocation::new(1, 0, 0, 10, 1, 1, Component::Theory),
            Allocation::new(1, 1, 0, 10, 1, 1, Component::Theory),
        ];
        assert!(audit_timetable(&allocations, &input, &[]).is_empty());
    }

    #[test]
    fn test_audit_detects_overlaps() {
        let input = sample_input();
        let allocations = vec![
            Allocation::new(1, 0, 0, 10, 1, 1, Component::Theory),
            Allocation::new(1, 0, 0, 10, 1, 1, Component::Theory),
        ];
        let findings = audit_timetable(&allocations, &input, &[]);
        let kinds: Vec<_> = findings.iter().map(|f| f.kind.clone()).collect();
        assert!(kinds.contains(&ValidationErrorKind::ClassOverlap));
        assert!(kinds.contains(&ValidationErrorKind::TeacherOverlap));
        assert!(kinds.contains(&ValidationErrorKind::RoomOverlap));
        // Same subject twice on one day as well
        assert!(kinds.contains(&ValidationErrorKind::SubjectRepeat));
    }

    #[test]
    fn test_audit_detects_broken_lab_pair() {
        let mut input = sample_input();
        input.subjects[0].lab_hours = 2;
        input.rooms.push(Room::lab(2));
        let allocations = vec![Allocation::new(1, 0, 3, 10, 1, 2, Component::Lab)];

        let findings = audit_timetable(&allocations, &input, &[]);
        assert!(findings
            .iter()
            .any(|f| f.kind == ValidationErrorKind::BrokenLabPair));
    }

    #[test]
    fn test_audit_accepts_complete_lab_pair() {
        let mut input = sample_input();
        input.subjects[0].lab_hours = 2;
        input.rooms.push(Room::lab(2).with_capacity(60));
        let allocations = vec![
            Allocation::new(1, 0, 3, 10, 1, 2, Component::Lab),
            Allocation::new(1, 0, 4, 10, 1, 2, Component::Lab).as_continuation(),
        ];
        assert!(audit_timetable(&allocations, &input, &[]).is_empty());
    }

    #[test]
    fn test_audit_detects_unavailable_day() {
        let mut input = sample_input();
        input.teachers[0].available_days = vec![0, 1];
        let allocations = vec![Allocation::new(1, 4, 0, 10, 1, 1, Component::Theory)];

        let findings = audit_timetable(&allocations, &input, &[]);
        assert!(findings
            .iter()
            .any(|f| f.kind == ValidationErrorKind::UnavailableTeacherDay));
    }

    #[test]
    fn test_audit_detects_room_over_capacity() {
        let mut input = sample_input();
        input.rooms[0].capacity = 30;
        input.classes[0].student_count = 60;
        let allocations = vec![Allocation::new(1, 0, 0, 10, 1, 1, Component::Theory)];

        let findings = audit_timetable(&allocations, &input, &[]);
        assert!(findings
            .iter()
            .any(|f| f.kind == ValidationErrorKind::RoomOverCapacity));
    }

    #[test]
    fn test_audit_detects_lab_in_lecture_room() {
        let mut input = sample_input();
        input.subjects[0].lab_hours = 2;
        // Room 1 is a lecture room; the lab pair must be flagged.
        let allocations = vec![
            Allocation::new(1, 0, 3, 10, 1, 1, Component::Lab),
            Allocation::new(1, 0, 4, 10, 1, 1, Component::Lab).as_continuation(),
        ];

        let findings = audit_timetable(&allocations, &input, &[]);
        assert_eq!(
            findings
                .iter()
                .filter(|f| f.kind == ValidationErrorKind::RoomKindMismatch)
                .count(),
            2
        );
    }

    #[test]
    fn test_audit_detects_missing_fixed_slot() {
        let input = sample_input();
        let honored = vec![FixedSlot::new(1, 0, 0, 10, 1, Component::Theory)];

        let findings = audit_timetable(&[], &input, &honored);
        assert!(findings
            .iter()
            .any(|f| f.kind == ValidationErrorKind::MissingFixedSlot));
    }

    #[test]
    fn test_audit_detects_elective_desync() {
        let mut input = sample_input();
        input
            .subjects
            .push(Subject::new(11, "EL1").with_theory_hours(3).with_basket(5));
        input
            .subjects
            .push(Subject::new(12, "EL2").with_theory_hours(3).with_basket(5));
        input
            .classes
            .push(Class::new(2).with_semester(3).with_subject(12));
        input.baskets.push(
            ElectiveBasket::new(5, "PE-I")
                .with_semester(3)
                .with_theory_hours(3)
                .with_classes(vec![1, 2])
                .with_subjects(vec![11, 12]),
        );

        // Only one of the two participating classes got the unit.
        let allocations =
            vec![Allocation::new(1, 0, 0, 11, 1, 1, Component::Theory).as_elective(5)];
        let findings = audit_timetable(&allocations, &input, &[]);
        assert!(findings
            .iter()
            .any(|f| f.kind == ValidationErrorKind::ElectiveDesync));
    }
}
