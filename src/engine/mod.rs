//! Phased timetable generation engine.
//!
//! The engine is a deterministic state machine over an in-memory
//! [`WorldState`]: each phase appends allocations or records soft
//! failures, and later phases observe earlier commitments only through
//! the state.
//!
//! # Pipeline
//!
//! | Phase | Work |
//! |-------|------|
//! | 0 | Input validation (hard reject) |
//! | 1 | Teacher binding |
//! | 2 | Elective theory/tutorial units |
//! | 3 | Elective lab blocks |
//! | 4 | Fixed slot installation |
//! | 5 | Regular lab blocks |
//! | 6 | Theory & tutorial fill |
//! | — | Genetic optimizer (optional) |
//! | 7 | Invariant audit (soft) |
//! | 8 | Emit allocations + report |
//!
//! Fixed slots are pre-locked before Phase 2 so electives never claim
//! them; their allocations are committed in Phase 4. Lock semantics
//! never override electives: a fixed slot that cannot be installed is
//! reported and skipped.
//!
//! A run is a pure function of its input snapshot, seed, and options:
//! identical inputs and seed yield identical allocation lists and
//! reports. All randomized orderings flow through one seeded ChaCha
//! generator.

pub mod binding;
pub mod electives;
mod phases;
pub mod report;
pub mod requirements;

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::{
    Allocation, BasketId, Class, ClassId, Component, ElectiveBasket, FixedAssignment, FixedSlot,
    LabBlock, Room, Subject, SubjectId, Teacher, TeacherId,
};
use crate::state::WorldState;
use crate::validation::{audit_timetable, validate_input};

use binding::{bind_teachers, BindingDemand, BindingKey};
use electives::{build_elective_plans, choose_subject, PlanKind};
use report::{PhaseResult, Report};
use requirements::{build_requirements, Requirements};

pub use crate::optimizer::OptimizerConfig;

/// Read-only snapshot of the domain consumed by a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimetableInput {
    /// Teachers available for binding.
    pub teachers: Vec<Teacher>,
    /// All subjects (regular and elective).
    pub subjects: Vec<Subject>,
    /// Classes to timetable.
    pub classes: Vec<Class>,
    /// Rooms available for placement.
    pub rooms: Vec<Room>,
    /// Elective baskets.
    pub baskets: Vec<ElectiveBasket>,
    /// Operator-fixed (class, subject, component) → teacher table.
    pub assignments: Vec<FixedAssignment>,
    /// User-locked pre-allocations.
    pub fixed_slots: Vec<FixedSlot>,
    /// Previously persisted allocations; preloaded as committed state
    /// when `clear_existing` is false, ignored otherwise.
    pub existing: Vec<Allocation>,
}

impl TimetableInput {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the teachers.
    pub fn with_teachers(mut self, teachers: Vec<Teacher>) -> Self {
        self.teachers = teachers;
        self
    }

    /// Sets the subjects.
    pub fn with_subjects(mut self, subjects: Vec<Subject>) -> Self {
        self.subjects = subjects;
        self
    }

    /// Sets the classes.
    pub fn with_classes(mut self, classes: Vec<Class>) -> Self {
        self.classes = classes;
        self
    }

    /// Sets the rooms.
    pub fn with_rooms(mut self, rooms: Vec<Room>) -> Self {
        self.rooms = rooms;
        self
    }

    /// Sets the elective baskets.
    pub fn with_baskets(mut self, baskets: Vec<ElectiveBasket>) -> Self {
        self.baskets = baskets;
        self
    }

    /// Sets the fixed teacher assignments.
    pub fn with_assignments(mut self, assignments: Vec<FixedAssignment>) -> Self {
        self.assignments = assignments;
        self
    }

    /// Sets the fixed slots.
    pub fn with_fixed_slots(mut self, fixed_slots: Vec<FixedSlot>) -> Self {
        self.fixed_slots = fixed_slots;
        self
    }

    /// Sets previously persisted allocations.
    pub fn with_existing(mut self, existing: Vec<Allocation>) -> Self {
        self.existing = existing;
        self
    }
}

/// Options for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Ignore `existing` allocations and build from scratch.
    pub clear_existing: bool,
    /// Restrict the run to these classes. `None` = all classes.
    pub restrict_to_classes: Option<HashSet<ClassId>>,
    /// Run the genetic optimizer after placement.
    pub run_optimizer: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            clear_existing: true,
            restrict_to_classes: None,
            run_optimizer: false,
        }
    }
}

/// Precomputed lookup maps over the input snapshot, built once per run.
///
/// Entity vectors are sorted by id so every iteration below is
/// deterministic.
pub(crate) struct Catalog<'a> {
    pub teachers: Vec<&'a Teacher>,
    pub classes: Vec<&'a Class>,
    pub baskets: Vec<&'a ElectiveBasket>,
    pub lecture_rooms: Vec<&'a Room>,
    pub lab_rooms: Vec<&'a Room>,
    pub assignment_map: HashMap<BindingKey, TeacherId>,
    subject_map: HashMap<SubjectId, &'a Subject>,
    teacher_map: HashMap<TeacherId, &'a Teacher>,
    class_map: HashMap<ClassId, &'a Class>,
    basket_map: HashMap<BasketId, &'a ElectiveBasket>,
}

impl<'a> Catalog<'a> {
    pub(crate) fn build(
        input: &'a TimetableInput,
        restrict_to_classes: &Option<HashSet<ClassId>>,
    ) -> Self {
        let mut teachers: Vec<_> = input.teachers.iter().collect();
        teachers.sort_by_key(|t| t.id);

        let mut classes: Vec<_> = input
            .classes
            .iter()
            .filter(|c| {
                restrict_to_classes
                    .as_ref()
                    .is_none_or(|set| set.contains(&c.id))
            })
            .collect();
        classes.sort_by_key(|c| c.id);
        let class_ids: HashSet<ClassId> = classes.iter().map(|c| c.id).collect();

        // A basket is schedulable only when every participant is in
        // the run; otherwise its synchronization cannot be honored.
        let mut baskets: Vec<_> = input
            .baskets
            .iter()
            .filter(|b| b.classes.iter().all(|cid| class_ids.contains(cid)))
            .collect();
        baskets.sort_by_key(|b| b.id);

        let mut rooms: Vec<_> = input.rooms.iter().filter(|r| r.available).collect();
        rooms.sort_by_key(|r| r.id);
        let lecture_rooms: Vec<_> = rooms
            .iter()
            .copied()
            .filter(|r| r.suits(Component::Theory))
            .collect();
        // Labs strictly require Lab-kind rooms; with none available,
        // every lab block becomes a reported coverage gap.
        let lab_rooms: Vec<_> = rooms
            .iter()
            .copied()
            .filter(|r| r.suits(Component::Lab))
            .collect();

        let assignment_map = input
            .assignments
            .iter()
            .map(|fa| ((fa.class_id, fa.subject_id, fa.component), fa.teacher_id))
            .collect();

        Self {
            subject_map: input.subjects.iter().map(|s| (s.id, s)).collect(),
            teacher_map: input.teachers.iter().map(|t| (t.id, t)).collect(),
            class_map: classes.iter().map(|c| (c.id, *c)).collect(),
            basket_map: baskets.iter().map(|b| (b.id, *b)).collect(),
            teachers,
            classes,
            baskets,
            lecture_rooms,
            lab_rooms,
            assignment_map,
        }
    }

    pub(crate) fn subject(&self, id: SubjectId) -> Option<&'a Subject> {
        self.subject_map.get(&id).copied()
    }

    pub(crate) fn teacher(&self, id: TeacherId) -> Option<&'a Teacher> {
        self.teacher_map.get(&id).copied()
    }

    pub(crate) fn class(&self, id: ClassId) -> Option<&'a Class> {
        self.class_map.get(&id).copied()
    }

    pub(crate) fn basket(&self, id: BasketId) -> Option<&'a ElectiveBasket> {
        self.basket_map.get(&id).copied()
    }

    pub(crate) fn has_class(&self, id: ClassId) -> bool {
        self.class_map.contains_key(&id)
    }

    pub(crate) fn rooms_for(&self, component: Component) -> &Vec<&'a Room> {
        match component {
            Component::Lab => &self.lab_rooms,
            _ => &self.lecture_rooms,
        }
    }
}

/// Binding demands for all regular requirements, in requirement order.
pub(crate) fn regular_binding_demands(
    _catalog: &Catalog,
    requirements: &Requirements,
) -> Vec<BindingDemand> {
    requirements
        .regular
        .iter()
        .map(|r| BindingDemand {
            class_id: r.class_id,
            subject_id: r.subject_id,
            component: r.component,
            weekly_hours: match r.component {
                Component::Lab => r.units * 2,
                _ => r.units,
            },
        })
        .collect()
}

/// Binding demands for elective requirements: one per participating
/// class, using its chosen basket subject.
pub(crate) fn elective_binding_demands(
    catalog: &Catalog,
    requirements: &Requirements,
) -> Vec<BindingDemand> {
    let mut demands = Vec::new();
    for req in &requirements.elective {
        let Some(basket) = catalog.basket(req.basket_id) else {
            continue;
        };
        let mut class_ids = basket.classes.clone();
        class_ids.sort_unstable();
        for class_id in class_ids {
            let Some(class) = catalog.class(class_id) else {
                continue;
            };
            let Some(subject_id) = choose_subject(basket, &class.subjects) else {
                continue;
            };
            demands.push(BindingDemand {
                class_id,
                subject_id,
                component: req.component,
                weekly_hours: match req.component {
                    Component::Lab => req.units * 2,
                    _ => req.units,
                },
            });
        }
    }
    demands
}

/// The timetable generation engine.
///
/// Stateless between runs; holds only the optimizer configuration.
///
/// # Example
///
/// ```
/// use timetable_engine::engine::{GenerateOptions, TimetableEngine, TimetableInput};
/// use timetable_engine::models::{Class, Room, Subject, Teacher};
///
/// let input = TimetableInput::new()
///     .with_teachers(vec![Teacher::new(1).with_qualification(10, 0.9)])
///     .with_subjects(vec![Subject::new(10, "CS101").with_theory_hours(3)])
///     .with_classes(vec![Class::new(1).with_subject(10)])
///     .with_rooms(vec![Room::lecture(1)]);
///
/// let engine = TimetableEngine::new();
/// let (allocations, report) = engine.generate(&input, 42, &GenerateOptions::default());
/// assert!(report.success);
/// assert_eq!(allocations.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TimetableEngine {
    optimizer: OptimizerConfig,
}

impl TimetableEngine {
    /// Creates an engine with default optimizer settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the optimizer configuration.
    pub fn with_optimizer(mut self, config: OptimizerConfig) -> Self {
        self.optimizer = config;
        self
    }

    /// Runs the full generation pipeline.
    ///
    /// Returns the committed allocations (canonically sorted by class,
    /// day, period) and the run report. The allocation list is empty
    /// only when Phase 0 validation fails; every other outcome is a
    /// (possibly partial) timetable.
    pub fn generate(
        &self,
        input: &TimetableInput,
        seed: u64,
        options: &GenerateOptions,
    ) -> (Vec<Allocation>, Report) {
        let started = Instant::now();
        let mut report = Report::new();

        // Phase 0: hard validation
        if let Err(errors) = validate_input(input) {
            info!(errors = errors.len(), "input rejected by validation");
            report.success = false;
            report.validation_errors = errors;
            report.push_phase(PhaseResult::new("validation"));
            report.elapsed = started.elapsed();
            return (Vec::new(), report);
        }
        report.push_phase(PhaseResult::new("validation"));

        let catalog = Catalog::build(input, &options.restrict_to_classes);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut state = WorldState::new();

        // Preload persisted allocations when the caller keeps them.
        if !options.clear_existing {
            for a in &input.existing {
                if !catalog.has_class(a.class_id) {
                    continue;
                }
                if a.component == Component::Lab && !a.is_lab_continuation {
                    state.register_lab_block(LabBlock::new(
                        a.class_id,
                        a.day,
                        a.period,
                        a.subject_id,
                        a.teacher_id,
                        a.room_id,
                    ));
                }
                state.lock_slot(a.class_id, a.day, a.period);
                state.add_allocation(a.clone());
            }
            debug!(preloaded = state.len(), "kept existing allocations");
        }

        // Pre-lock fixed slots so electives cannot claim them; the
        // allocations themselves are committed in Phase 4.
        for fs in &input.fixed_slots {
            if catalog.has_class(fs.class_id) && fs.in_grid() {
                state.lock_slot(fs.class_id, fs.day, fs.period);
                if fs.component == Component::Lab {
                    state.lock_slot(fs.class_id, fs.day, fs.period + 1);
                }
            }
        }

        let requirements = build_requirements(&catalog);

        // Phase 1: teacher binding
        let mut demands = regular_binding_demands(&catalog, &requirements);
        demands.extend(elective_binding_demands(&catalog, &requirements));
        let binding = bind_teachers(&demands, &catalog);
        let mut phase1 = PhaseResult::new("teacher-binding");
        phase1.failures = binding.unbound.iter().map(|(_, r)| r.clone()).collect();
        info!(
            bindings = binding.len(),
            unbound = phase1.failures.len(),
            "teacher binding resolved"
        );
        report.push_phase(phase1);

        // Phases 2–3: synchronized electives
        let unit_reqs: Vec<_> = requirements
            .elective
            .iter()
            .filter(|r| r.component != Component::Lab)
            .cloned()
            .collect();
        let lab_reqs: Vec<_> = requirements
            .elective
            .iter()
            .filter(|r| r.component == Component::Lab)
            .cloned()
            .collect();

        let (unit_plans, unit_plan_failures) =
            build_elective_plans(&catalog, &unit_reqs, &binding);
        let mut phase2 =
            phases::run_elective_plans(&mut state, &catalog, &unit_plans, &mut rng, "elective-theory");
        phase2.failures.splice(0..0, unit_plan_failures);
        info!(added = phase2.added, "elective theory placed");
        report.push_phase(phase2);

        let (lab_plans, lab_plan_failures) = build_elective_plans(&catalog, &lab_reqs, &binding);
        debug_assert!(lab_plans.iter().all(|p| p.kind == PlanKind::LabBlock));
        let mut phase3 =
            phases::run_elective_plans(&mut state, &catalog, &lab_plans, &mut rng, "elective-lab");
        phase3.failures.splice(0..0, lab_plan_failures);
        info!(added = phase3.added, "elective labs placed");
        report.push_phase(phase3);

        // Phase 4: fixed slots
        let (phase4, honored_fixed) =
            phases::install_fixed_slots(&mut state, &catalog, &input.fixed_slots);
        info!(
            added = phase4.added,
            conflicts = phase4.failures.len(),
            "fixed slots installed"
        );
        report.push_phase(phase4);

        // Phase 5: regular labs
        let (phase5, lab_gaps) =
            phases::run_regular_labs(&mut state, &catalog, &requirements.regular, &binding, &mut rng);
        info!(added = phase5.added, "regular labs placed");
        report.push_phase(phase5);
        report.coverage_gaps.extend(lab_gaps);

        // Phase 6: theory & tutorial fill
        let (phase6, theory_gaps) =
            phases::run_theory_fill(&mut state, &catalog, &requirements.regular, &binding, &mut rng);
        info!(added = phase6.added, "theory and tutorials placed");
        report.push_phase(phase6);
        report.coverage_gaps.extend(theory_gaps);

        // Optional genetic post-optimization
        if options.run_optimizer {
            let stats =
                crate::optimizer::optimize(&mut state, &input.teachers, &self.optimizer, &mut rng);
            info!(
                accepted = stats.moves_accepted,
                initial_penalty = stats.initial_penalty,
                final_penalty = stats.final_penalty,
                "optimizer finished"
            );
            report.push_phase(PhaseResult::new("optimizer"));
        }

        // Phases 7–8: audit, emit
        let allocations = state.into_allocations();
        let findings = audit_timetable(&allocations, input, &honored_fixed);
        let mut audit_phase = PhaseResult::new("audit");
        audit_phase.failures = findings.iter().map(|f| f.message.clone()).collect();
        report.push_phase(audit_phase);
        report.audit_findings = findings;

        report.success = true;
        report.elapsed = started.elapsed();
        info!(
            allocations = allocations.len(),
            gaps = report.coverage_gaps.len(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "generation complete"
        );
        (allocations, report)
    }
}
