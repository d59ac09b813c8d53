//! Scheduler phase bodies.
//!
//! Each phase appends allocations to the world state or records soft
//! failures; later phases observe earlier commitments only through the
//! state. Candidate slot orders are shuffled with the run RNG so the
//! same inputs and seed reproduce the same timetable.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::models::slot::{lab_block_slots, week_slots, PERIODS_PER_DAY};
use crate::models::{Allocation, Component, FixedSlot, LabBlock};
use crate::state::WorldState;

use super::binding::BindingTable;
use super::electives::ElectivePlan;
use super::report::{CoverageGap, PhaseResult};
use super::requirements::Requirement;
use super::Catalog;

/// Places every unit of the given elective plans.
///
/// For each plan, each unit takes the first allocatable slot of a
/// freshly shuffled candidate order. Once a unit finds no slot, the
/// remaining units of that plan are recorded as unsatisfied and the
/// plan is abandoned (the state they would see is identical).
pub(crate) fn run_elective_plans<R: Rng>(
    state: &mut WorldState,
    catalog: &Catalog,
    plans: &[ElectivePlan],
    rng: &mut R,
    phase: &str,
) -> PhaseResult {
    let mut result = PhaseResult::new(phase);

    for plan in plans {
        let candidates = match plan.component() {
            Component::Lab => lab_block_slots(),
            _ => week_slots(),
        };

        let mut placed = 0;
        let mut last_conflict: Option<String> = None;
        for _ in 0..plan.units {
            let mut order = candidates.clone();
            order.shuffle(rng);

            let mut committed = false;
            for &(day, start) in &order {
                match plan.conflict_at(state, catalog, day, start) {
                    Some(reason) => {
                        last_conflict.get_or_insert(reason);
                    }
                    None => match plan.commit_at(state, catalog, day, start) {
                        Ok(added) => {
                            result.added += added;
                            placed += 1;
                            committed = true;
                            break;
                        }
                        Err(reason) => {
                            last_conflict.get_or_insert(reason);
                        }
                    },
                }
            }
            if !committed {
                break;
            }
        }

        if placed < plan.units {
            let why = last_conflict.unwrap_or_else(|| "no candidate slots".to_string());
            let failure = format!(
                "no common slot for basket {}: {} {} unit(s) unsatisfied ({})",
                plan.basket_id,
                plan.units - placed,
                plan.component().label(),
                why
            );
            debug!(basket = plan.basket_id, %failure, "elective shortfall");
            result.failures.push(failure);
        }
    }

    result
}

/// Installs every fixed slot that is still free and non-conflicting.
///
/// Returns the phase result and the honored subset (for the final
/// audit). Fixed Lab slots install as atomic pairs. Locks are never
/// allowed to override electives: a conflicting slot is reported and
/// skipped.
pub(crate) fn install_fixed_slots(
    state: &mut WorldState,
    catalog: &Catalog,
    fixed_slots: &[FixedSlot],
) -> (PhaseResult, Vec<FixedSlot>) {
    let mut result = PhaseResult::new("fixed-slots");
    let mut honored = Vec::new();

    for fs in fixed_slots {
        if !catalog.has_class(fs.class_id) {
            continue; // outside the restricted class set
        }
        let periods: Vec<u8> = if fs.component == Component::Lab {
            vec![fs.period, fs.period + 1]
        } else {
            vec![fs.period]
        };

        let available = catalog
            .teacher(fs.teacher_id)
            .is_some_and(|t| t.is_available_on(fs.day));
        if !available {
            result.failures.push(format!(
                "fixed slot for class {} at (day {}, period {}): teacher {} unavailable that day",
                fs.class_id, fs.day, fs.period, fs.teacher_id
            ));
            continue;
        }

        let class_blocked = periods
            .iter()
            .any(|&p| !state.is_class_free(fs.class_id, fs.day, p));
        if class_blocked {
            let elective = state.allocations().iter().any(|a| {
                a.class_id == fs.class_id
                    && a.day == fs.day
                    && periods.contains(&a.period)
                    && a.is_elective
            });
            let why = if elective {
                "conflicts with already-committed elective"
            } else {
                "slot already occupied"
            };
            result.failures.push(format!(
                "fixed slot for class {} at (day {}, period {}): {}",
                fs.class_id, fs.day, fs.period, why
            ));
            continue;
        }

        let teacher_blocked = periods.iter().any(|&p| {
            !state.is_teacher_free(fs.teacher_id, fs.day, p)
                || state.is_teacher_locked(fs.teacher_id, fs.day, p)
        });
        if teacher_blocked {
            result.failures.push(format!(
                "fixed slot for class {} at (day {}, period {}): teacher {} busy or locked",
                fs.class_id, fs.day, fs.period, fs.teacher_id
            ));
            continue;
        }

        let students = catalog.class(fs.class_id).map(|c| c.student_count).unwrap_or(0);
        let room_id = match fs.room_id {
            Some(rid) => {
                let free = periods.iter().all(|&p| state.is_room_free(rid, fs.day, p));
                if free {
                    Some(rid)
                } else {
                    None
                }
            }
            None => catalog
                .rooms_for(fs.component)
                .iter()
                .find(|r| {
                    r.fits(students)
                        && periods.iter().all(|&p| state.is_room_free(r.id, fs.day, p))
                })
                .map(|r| r.id),
        };
        let Some(room_id) = room_id else {
            result.failures.push(format!(
                "fixed slot for class {} at (day {}, period {}): no free room",
                fs.class_id, fs.day, fs.period
            ));
            continue;
        };

        let first = Allocation::new(
            fs.class_id,
            fs.day,
            fs.period,
            fs.subject_id,
            fs.teacher_id,
            room_id,
            fs.component,
        );
        state.add_allocation(first);
        state.lock_slot(fs.class_id, fs.day, fs.period);
        result.added += 1;

        if fs.component == Component::Lab {
            let continuation = Allocation::new(
                fs.class_id,
                fs.day,
                fs.period + 1,
                fs.subject_id,
                fs.teacher_id,
                room_id,
                Component::Lab,
            )
            .as_continuation();
            state.add_allocation(continuation);
            state.lock_slot(fs.class_id, fs.day, fs.period + 1);
            state.register_lab_block(LabBlock::new(
                fs.class_id,
                fs.day,
                fs.period,
                fs.subject_id,
                fs.teacher_id,
                room_id,
            ));
            result.added += 1;
        }
        honored.push(fs.clone());
    }

    (result, honored)
}

/// Places regular lab blocks.
///
/// Heavier requirements go first; each block takes the first feasible
/// (day, start) of a shuffled candidate order. Units already covered
/// by fixed slots are subtracted.
pub(crate) fn run_regular_labs<R: Rng>(
    state: &mut WorldState,
    catalog: &Catalog,
    requirements: &[Requirement],
    binding: &BindingTable,
    rng: &mut R,
) -> (PhaseResult, Vec<CoverageGap>) {
    let mut result = PhaseResult::new("regular-labs");
    let mut gaps = Vec::new();

    let mut labs: Vec<&Requirement> = requirements
        .iter()
        .filter(|r| r.component == Component::Lab)
        .collect();
    labs.shuffle(rng);
    labs.sort_by(|a, b| b.units.cmp(&a.units));

    for req in labs {
        let remaining = req
            .units
            .saturating_sub(state.committed_units(req.class_id, req.subject_id, Component::Lab));
        if remaining == 0 {
            continue;
        }
        let Some(teacher_id) = binding.teacher_for(req.class_id, req.subject_id, Component::Lab)
        else {
            gaps.push(CoverageGap {
                class_id: req.class_id,
                subject_id: req.subject_id,
                component: Component::Lab,
                missing_units: remaining,
            });
            continue;
        };
        let teacher = catalog.teacher(teacher_id);

        let mut placed = 0;
        'blocks: for _ in 0..remaining {
            let mut order = lab_block_slots();
            order.shuffle(rng);

            for &(day, start) in &order {
                let end = start + 1;
                let available = teacher.is_some_and(|t| t.is_available_on(day));
                if !available {
                    continue;
                }
                let class_free = state.is_class_free(req.class_id, day, start)
                    && state.is_class_free(req.class_id, day, end)
                    && !state.is_locked(req.class_id, day, start)
                    && !state.is_locked(req.class_id, day, end);
                let teacher_free = state.is_teacher_free(teacher_id, day, start)
                    && state.is_teacher_free(teacher_id, day, end)
                    && !state.is_teacher_locked(teacher_id, day, start)
                    && !state.is_teacher_locked(teacher_id, day, end);
                if !class_free
                    || !teacher_free
                    || state.has_subject_on_day(req.class_id, day, req.subject_id)
                {
                    continue;
                }
                let room = catalog.lab_rooms.iter().find(|r| {
                    r.fits(req.min_room_capacity)
                        && state.is_room_free(r.id, day, start)
                        && state.is_room_free(r.id, day, end)
                });
                let Some(room) = room else {
                    continue;
                };

                state.add_allocation(Allocation::new(
                    req.class_id,
                    day,
                    start,
                    req.subject_id,
                    teacher_id,
                    room.id,
                    Component::Lab,
                ));
                state.add_allocation(
                    Allocation::new(
                        req.class_id,
                        day,
                        end,
                        req.subject_id,
                        teacher_id,
                        room.id,
                        Component::Lab,
                    )
                    .as_continuation(),
                );
                state.register_lab_block(LabBlock::new(
                    req.class_id,
                    day,
                    start,
                    req.subject_id,
                    teacher_id,
                    room.id,
                ));
                result.added += 2;
                placed += 1;
                continue 'blocks;
            }
            break; // no slot for this block; the rest see the same state
        }

        if placed < remaining {
            let missing = remaining - placed;
            result.failures.push(format!(
                "could not place {} lab block(s) for class {} subject {}",
                missing, req.class_id, req.subject_id
            ));
            gaps.push(CoverageGap {
                class_id: req.class_id,
                subject_id: req.subject_id,
                component: Component::Lab,
                missing_units: missing,
            });
        }
    }

    (result, gaps)
}

/// Fills remaining theory and tutorial units.
///
/// Slots held by a lab block or locked are skipped. Last-period slots
/// are deferred to the end of the candidate order so they are used
/// only when nothing else fits.
pub(crate) fn run_theory_fill<R: Rng>(
    state: &mut WorldState,
    catalog: &Catalog,
    requirements: &[Requirement],
    binding: &BindingTable,
    rng: &mut R,
) -> (PhaseResult, Vec<CoverageGap>) {
    let mut result = PhaseResult::new("theory-fill");
    let mut gaps = Vec::new();

    let mut units: Vec<&Requirement> = requirements
        .iter()
        .filter(|r| r.component != Component::Lab)
        .collect();
    units.shuffle(rng);

    for req in units {
        let remaining = req
            .units
            .saturating_sub(state.committed_units(req.class_id, req.subject_id, req.component));
        if remaining == 0 {
            continue;
        }
        let Some(teacher_id) = binding.teacher_for(req.class_id, req.subject_id, req.component)
        else {
            gaps.push(CoverageGap {
                class_id: req.class_id,
                subject_id: req.subject_id,
                component: req.component,
                missing_units: remaining,
            });
            continue;
        };
        let teacher = catalog.teacher(teacher_id);

        let mut placed = 0;
        'units: for _ in 0..remaining {
            let mut order = week_slots();
            order.shuffle(rng);
            // Defer last-period slots: use them only when nothing else fits.
            let last = PERIODS_PER_DAY - 1;
            let (preferred, deferred): (Vec<_>, Vec<_>) =
                order.into_iter().partition(|&(_, p)| p != last);

            for (day, period) in preferred.into_iter().chain(deferred) {
                let available = teacher.is_some_and(|t| t.is_available_on(day));
                if !available {
                    continue;
                }
                if state.is_in_lab_block(req.class_id, day, period)
                    || state.is_locked(req.class_id, day, period)
                    || !state.is_class_free(req.class_id, day, period)
                {
                    continue;
                }
                if !state.is_teacher_free(teacher_id, day, period)
                    || state.is_teacher_locked(teacher_id, day, period)
                    || state.has_subject_on_day(req.class_id, day, req.subject_id)
                {
                    continue;
                }
                let room = catalog.lecture_rooms.iter().find(|r| {
                    r.fits(req.min_room_capacity) && state.is_room_free(r.id, day, period)
                });
                let Some(room) = room else {
                    continue;
                };

                state.add_allocation(Allocation::new(
                    req.class_id,
                    day,
                    period,
                    req.subject_id,
                    teacher_id,
                    room.id,
                    req.component,
                ));
                result.added += 1;
                placed += 1;
                continue 'units;
            }
            break;
        }

        if placed < remaining {
            let missing = remaining - placed;
            result.failures.push(format!(
                "could not place {} {} unit(s) for class {} subject {}",
                missing,
                req.component.label(),
                req.class_id,
                req.subject_id
            ));
            gaps.push(CoverageGap {
                class_id: req.class_id,
                subject_id: req.subject_id,
                component: req.component,
                missing_units: missing,
            });
        }
    }

    (result, gaps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TimetableInput;
    use crate::models::slot::is_lab_start;
    use crate::models::{Class, Room, Subject, Teacher};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn lab_input() -> TimetableInput {
        TimetableInput::new()
            .with_teachers(vec![Teacher::new(1).with_qualification(10, 0.8)])
            .with_subjects(vec![Subject::new(10, "CS-L").with_lab_hours(2)])
            .with_classes(vec![Class::new(1).with_subject(10)])
            .with_rooms(vec![Room::lecture(1), Room::lab(2)])
    }

    fn bind_all(catalog: &Catalog, reqs: &super::super::requirements::Requirements) -> BindingTable {
        let demands = super::super::regular_binding_demands(catalog, reqs);
        super::super::binding::bind_teachers(&demands, catalog)
    }

    #[test]
    fn test_lab_phase_places_atomic_pair() {
        let input = lab_input();
        let catalog = Catalog::build(&input, &None);
        let reqs = super::super::requirements::build_requirements(&catalog);
        let binding = bind_all(&catalog, &reqs);
        let mut state = WorldState::new();
        let mut rng = SmallRng::seed_from_u64(7);

        let (result, gaps) = run_regular_labs(&mut state, &catalog, &reqs.regular, &binding, &mut rng);
        assert_eq!(result.added, 2);
        assert!(gaps.is_empty());

        let allocs = state.allocations();
        assert_eq!(allocs.len(), 2);
        let start = allocs.iter().find(|a| !a.is_lab_continuation).unwrap();
        let cont = allocs.iter().find(|a| a.is_lab_continuation).unwrap();
        assert!(is_lab_start(start.period));
        assert_eq!(cont.period, start.period + 1);
        assert_eq!(cont.day, start.day);
        assert_eq!(cont.room_id, start.room_id);
    }

    #[test]
    fn test_lab_phase_requires_lab_room() {
        let mut input = lab_input();
        input.rooms = vec![Room::lecture(1)]; // no lab room at all
        let catalog = Catalog::build(&input, &None);
        let reqs = super::super::requirements::build_requirements(&catalog);
        let binding = bind_all(&catalog, &reqs);
        let mut state = WorldState::new();
        let mut rng = SmallRng::seed_from_u64(7);

        let (result, gaps) = run_regular_labs(&mut state, &catalog, &reqs.regular, &binding, &mut rng);
        assert_eq!(result.added, 0);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].missing_units, 1);
    }

    #[test]
    fn test_theory_fill_defers_last_period() {
        let input = TimetableInput::new()
            .with_teachers(vec![Teacher::new(1).with_qualification(10, 0.8)])
            .with_subjects(vec![Subject::new(10, "CS101").with_theory_hours(3)])
            .with_classes(vec![Class::new(1).with_subject(10)])
            .with_rooms(vec![Room::lecture(1)]);
        let catalog = Catalog::build(&input, &None);
        let reqs = super::super::requirements::build_requirements(&catalog);
        let binding = bind_all(&catalog, &reqs);

        for seed in 0..8 {
            let mut state = WorldState::new();
            let mut rng = SmallRng::seed_from_u64(seed);
            let (result, gaps) =
                run_theory_fill(&mut state, &catalog, &reqs.regular, &binding, &mut rng);
            assert_eq!(result.added, 3);
            assert!(gaps.is_empty());
            // Plenty of non-last slots free, so period 6 must stay empty.
            assert!(state.allocations().iter().all(|a| a.period != 6));
        }
    }

    #[test]
    fn test_theory_fill_respects_subject_per_day() {
        let input = TimetableInput::new()
            .with_teachers(vec![Teacher::new(1).with_qualification(10, 0.8)])
            .with_subjects(vec![Subject::new(10, "CS101").with_theory_hours(4)])
            .with_classes(vec![Class::new(1).with_subject(10)])
            .with_rooms(vec![Room::lecture(1)]);
        let catalog = Catalog::build(&input, &None);
        let reqs = super::super::requirements::build_requirements(&catalog);
        let binding = bind_all(&catalog, &reqs);
        let mut state = WorldState::new();
        let mut rng = SmallRng::seed_from_u64(3);

        run_theory_fill(&mut state, &catalog, &reqs.regular, &binding, &mut rng);
        let mut days: Vec<u8> = state.allocations().iter().map(|a| a.day).collect();
        days.sort_unstable();
        days.dedup();
        assert_eq!(days.len(), 4, "each unit must land on a distinct day");
    }

    #[test]
    fn test_fixed_slot_installation_and_conflict() {
        let input = TimetableInput::new()
            .with_teachers(vec![Teacher::new(1), Teacher::new(2)])
            .with_subjects(vec![Subject::new(10, "CS101").with_theory_hours(3)])
            .with_classes(vec![Class::new(1).with_subject(10)])
            .with_rooms(vec![Room::lecture(1)]);
        let catalog = Catalog::build(&input, &None);
        let mut state = WorldState::new();

        let slots = vec![
            FixedSlot::new(1, 0, 0, 10, 1, Component::Theory),
            // Same class, same slot: must be reported, not installed.
            FixedSlot::new(1, 0, 0, 10, 2, Component::Theory),
        ];
        let (result, honored) = install_fixed_slots(&mut state, &catalog, &slots);
        assert_eq!(result.added, 1);
        assert_eq!(honored.len(), 1);
        assert_eq!(result.failures.len(), 1);
        assert!(result.failures[0].contains("already occupied"));
        assert!(state.is_locked(1, 0, 0));
    }

    #[test]
    fn test_fixed_lab_slot_installs_pair() {
        let input = lab_input();
        let catalog = Catalog::build(&input, &None);
        let mut state = WorldState::new();

        let slots = vec![FixedSlot::new(1, 2, 3, 10, 1, Component::Lab)];
        let (result, honored) = install_fixed_slots(&mut state, &catalog, &slots);
        assert_eq!(result.added, 2);
        assert_eq!(honored.len(), 1);
        assert!(state.is_in_lab_block(1, 2, 3));
        assert!(state.is_in_lab_block(1, 2, 4));
        assert!(state.is_locked(1, 2, 4));
    }

    #[test]
    fn test_fixed_slot_unavailable_teacher_reported() {
        let input = TimetableInput::new()
            .with_teachers(vec![Teacher::new(1).with_available_days(vec![1, 2])])
            .with_subjects(vec![Subject::new(10, "CS101").with_theory_hours(1)])
            .with_classes(vec![Class::new(1).with_subject(10)])
            .with_rooms(vec![Room::lecture(1)]);
        let catalog = Catalog::build(&input, &None);
        let mut state = WorldState::new();

        let slots = vec![FixedSlot::new(1, 0, 0, 10, 1, Component::Theory)];
        let (result, honored) = install_fixed_slots(&mut state, &catalog, &slots);
        assert_eq!(result.added, 0);
        assert!(honored.is_empty());
        assert!(result.failures[0].contains("unavailable"));
    }
}
