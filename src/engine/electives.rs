//! Elective plan builder.
//!
//! For every basket, builds an atomic scheduling plan mapping each
//! participating class to the one basket subject it takes and each
//! chosen subject to its bound teacher. A plan commits all-or-nothing:
//! one allocation per participating class at the same (day, period) —
//! or, for labs, the same two-period block — with the slot reserved for
//! the basket and the plan's teachers locked there.
//!
//! When the input does not name which basket subject a class takes,
//! the choice falls back to the intersection of the class's subject
//! list with the basket's; ambiguity resolves to the lowest subject id.

use crate::models::slot::{is_lab_start, Day, Period};
use crate::models::{
    Allocation, BasketId, ClassId, Component, ElectiveBasket, LabBlock, SubjectId, TeacherId,
};
use crate::state::WorldState;

use super::binding::BindingTable;
use super::requirements::BasketRequirement;
use super::Catalog;

/// Shape of an elective plan: a single synchronized period, or an
/// atomic two-period lab block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanKind {
    /// One period for every participant (theory or tutorial).
    Unit(Component),
    /// Two consecutive periods for every participant.
    LabBlock,
}

/// One participating class within a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    /// Participating class.
    pub class_id: ClassId,
    /// The basket subject this class takes.
    pub subject_id: SubjectId,
    /// Teacher bound to (class, subject, component).
    pub teacher_id: TeacherId,
    /// Minimum room capacity (class student count).
    pub min_room_capacity: u32,
}

/// An uncommitted intent to place one basket unit for all participants.
#[derive(Debug, Clone)]
pub struct ElectivePlan {
    /// Owning basket.
    pub basket_id: BasketId,
    /// Plan shape.
    pub kind: PlanKind,
    /// Instances of this plan to place (hours, or lab blocks).
    pub units: u32,
    /// Participants, in ascending class id order.
    pub entries: Vec<PlanEntry>,
}

impl ElectivePlan {
    /// Component the plan places.
    pub fn component(&self) -> Component {
        match self.kind {
            PlanKind::Unit(component) => component,
            PlanKind::LabBlock => Component::Lab,
        }
    }

    /// Periods a single instance occupies when started at `start`.
    fn periods(&self, start: Period) -> Vec<Period> {
        match self.kind {
            PlanKind::Unit(_) => vec![start],
            PlanKind::LabBlock => vec![start, start + 1],
        }
    }

    /// All bound teacher ids of the plan.
    pub fn teacher_ids(&self) -> Vec<TeacherId> {
        self.entries.iter().map(|e| e.teacher_id).collect()
    }

    /// Whether one instance of the plan can be committed at (day, start).
    pub(crate) fn can_allocate_at(
        &self,
        state: &WorldState,
        catalog: &Catalog,
        day: Day,
        start: Period,
    ) -> bool {
        self.conflict_at(state, catalog, day, start).is_none()
    }

    /// First blocking condition at (day, start), if any.
    pub(crate) fn conflict_at(
        &self,
        state: &WorldState,
        catalog: &Catalog,
        day: Day,
        start: Period,
    ) -> Option<String> {
        if self.kind == PlanKind::LabBlock && !is_lab_start(start) {
            return Some(format!("period {} is not a lab start", start));
        }
        let periods = self.periods(start);
        for &period in &periods {
            if state.is_reserved_by_other_basket(day, period, self.basket_id) {
                return Some(format!(
                    "(day {}, period {}) reserved by another basket",
                    day, period
                ));
            }
        }
        for entry in &self.entries {
            for &period in &periods {
                if !state.is_class_free(entry.class_id, day, period)
                    || state.is_locked(entry.class_id, day, period)
                {
                    return Some(format!(
                        "class {} busy at (day {}, period {})",
                        entry.class_id, day, period
                    ));
                }
                if !state.is_teacher_free(entry.teacher_id, day, period)
                    || state.is_teacher_locked(entry.teacher_id, day, period)
                {
                    return Some(format!(
                        "teacher {} busy at (day {}, period {})",
                        entry.teacher_id, day, period
                    ));
                }
            }
            let available = catalog
                .teacher(entry.teacher_id)
                .is_some_and(|t| t.is_available_on(day));
            if !available {
                return Some(format!(
                    "teacher {} unavailable on day {}",
                    entry.teacher_id, day
                ));
            }
            if state.has_subject_on_day(entry.class_id, day, entry.subject_id) {
                return Some(format!(
                    "class {} already has subject {} on day {}",
                    entry.class_id, entry.subject_id, day
                ));
            }
        }
        None
    }

    /// Commits one instance at (day, start).
    ///
    /// Resolves a capacity-sufficient room per participant from the
    /// appropriate pool first; if any participant lacks a room the
    /// commit is abandoned with no state mutated. On success every
    /// participant gets its allocation(s), the slot is reserved for
    /// the basket with the plan's teachers locked, and lab blocks are
    /// registered.
    ///
    /// Returns the number of allocations added.
    pub(crate) fn commit_at(
        &self,
        state: &mut WorldState,
        catalog: &Catalog,
        day: Day,
        start: Period,
    ) -> Result<usize, String> {
        let periods = self.periods(start);
        let pool = match self.kind {
            PlanKind::Unit(_) => &catalog.lecture_rooms,
            PlanKind::LabBlock => &catalog.lab_rooms,
        };

        // All-or-nothing: pick every room before touching any index.
        let mut picked = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let room = pool.iter().find(|r| {
                r.fits(entry.min_room_capacity)
                    && !picked.contains(&r.id)
                    && periods.iter().all(|&p| state.is_room_free(r.id, day, p))
            });
            match room {
                Some(room) => picked.push(room.id),
                None => {
                    return Err(format!(
                        "no {} room for class {} in basket {} at (day {}, period {})",
                        self.component().label(),
                        entry.class_id,
                        self.basket_id,
                        day,
                        start
                    ))
                }
            }
        }

        let teachers = self.teacher_ids();
        for &period in &periods {
            state.reserve_elective(self.basket_id, day, period, &teachers);
        }

        let mut added = 0;
        for (entry, &room_id) in self.entries.iter().zip(&picked) {
            let first = Allocation::new(
                entry.class_id,
                day,
                start,
                entry.subject_id,
                entry.teacher_id,
                room_id,
                self.component(),
            )
            .as_elective(self.basket_id);
            state.add_allocation(first);
            state.lock_slot(entry.class_id, day, start);
            added += 1;

            if self.kind == PlanKind::LabBlock {
                let continuation = Allocation::new(
                    entry.class_id,
                    day,
                    start + 1,
                    entry.subject_id,
                    entry.teacher_id,
                    room_id,
                    Component::Lab,
                )
                .as_elective(self.basket_id)
                .as_continuation();
                state.add_allocation(continuation);
                state.lock_slot(entry.class_id, day, start + 1);
                state.register_lab_block(LabBlock::new(
                    entry.class_id,
                    day,
                    start,
                    entry.subject_id,
                    entry.teacher_id,
                    room_id,
                ));
                added += 1;
            }
        }
        Ok(added)
    }
}

/// The basket subject a class takes: the explicit intersection of the
/// class's subject list with the basket's members, lowest id on
/// ambiguity.
pub fn choose_subject(basket: &ElectiveBasket, class_subjects: &[SubjectId]) -> Option<SubjectId> {
    basket
        .subjects
        .iter()
        .filter(|sid| class_subjects.contains(sid))
        .copied()
        .min()
}

/// Builds all plans for the given elective requirements.
///
/// A basket whose participants cannot be fully resolved (no subject
/// choice, unbound teacher, or one teacher serving two participants)
/// yields no plan for that component; the reason is returned for the
/// report.
pub(crate) fn build_elective_plans(
    catalog: &Catalog,
    elective_reqs: &[BasketRequirement],
    binding: &BindingTable,
) -> (Vec<ElectivePlan>, Vec<String>) {
    let mut plans = Vec::new();
    let mut failures = Vec::new();

    'reqs: for req in elective_reqs {
        let Some(basket) = catalog.basket(req.basket_id) else {
            continue;
        };
        let mut class_ids = basket.classes.clone();
        class_ids.sort_unstable();

        let mut entries = Vec::with_capacity(class_ids.len());
        for class_id in class_ids {
            let Some(class) = catalog.class(class_id) else {
                continue 'reqs;
            };
            let Some(subject_id) = choose_subject(basket, &class.subjects) else {
                failures.push(format!(
                    "class {} lists no subject of basket '{}'",
                    class_id, basket.name
                ));
                continue 'reqs;
            };
            let Some(teacher_id) = binding.teacher_for(class_id, subject_id, req.component) else {
                failures.push(format!(
                    "no bound teacher for subject {} ({}) in basket '{}'",
                    subject_id,
                    req.component.label(),
                    basket.name
                ));
                continue 'reqs;
            };
            if entries
                .iter()
                .any(|e: &PlanEntry| e.teacher_id == teacher_id)
            {
                failures.push(format!(
                    "teacher {} serves two participants of basket '{}'",
                    teacher_id, basket.name
                ));
                continue 'reqs;
            }
            entries.push(PlanEntry {
                class_id,
                subject_id,
                teacher_id,
                min_room_capacity: class.student_count,
            });
        }
        if entries.is_empty() {
            continue;
        }

        let kind = match req.component {
            Component::Lab => PlanKind::LabBlock,
            component => PlanKind::Unit(component),
        };
        plans.push(ElectivePlan {
            basket_id: req.basket_id,
            kind,
            units: req.units,
            entries,
        });
    }

    (plans, failures)
}
