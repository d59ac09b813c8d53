//! Genetic post-optimization of a committed timetable.
//!
//! Runs a short elitist evolutionary loop over the world state after
//! placement: each generation draws a fixed number of candidate
//! mutations, applies each through before-image rollback, and keeps
//! only those that strictly lower the soft-constraint penalty. Hard
//! constraints are re-checked inside every mutation, so the committed
//! state always satisfies them.
//!
//! The optimizer is optional and may be skipped; zero generations is
//! a no-op.
//!
//! # Submodules
//!
//! - [`fitness`]: weighted penalty terms over classes and teachers
//! - `mutation`: the two invariant-preserving mutation kinds

pub mod fitness;
mod mutation;

use std::collections::BTreeMap;

use rand::Rng;
use tracing::debug;

use crate::models::Teacher;
use crate::state::WorldState;

pub use fitness::{penalty, FitnessWeights};

/// Optimizer configuration.
#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    /// Number of generations to run.
    pub generations: u32,
    /// Candidate mutations per generation.
    pub moves_per_generation: u32,
    /// Penalty weights.
    pub weights: FitnessWeights,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            generations: 40,
            moves_per_generation: 24,
            weights: FitnessWeights::default(),
        }
    }
}

/// Outcome statistics of an optimizer run.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerStats {
    /// Generations executed.
    pub generations: u32,
    /// Mutations drawn.
    pub moves_attempted: u32,
    /// Mutations kept (strict improvements).
    pub moves_accepted: u32,
    /// Penalty before optimization.
    pub initial_penalty: f64,
    /// Penalty after optimization.
    pub final_penalty: f64,
}

/// Optimizes the committed timetable in place.
///
/// Elitist acceptance: a mutation survives only when it strictly
/// lowers the penalty; otherwise its before-images are restored and
/// the state is byte-identical to before the attempt.
pub fn optimize<R: Rng>(
    state: &mut WorldState,
    teachers: &[Teacher],
    config: &OptimizerConfig,
    rng: &mut R,
) -> OptimizerStats {
    let directory: BTreeMap<_, _> = teachers.iter().map(|t| (t.id, t)).collect();
    let initial_penalty = penalty(state.allocations(), &config.weights);
    let mut current = initial_penalty;
    let mut stats = OptimizerStats {
        generations: 0,
        moves_attempted: 0,
        moves_accepted: 0,
        initial_penalty,
        final_penalty: initial_penalty,
    };

    for generation in 0..config.generations {
        for _ in 0..config.moves_per_generation {
            stats.moves_attempted += 1;
            let undo = if rng.random_bool(0.7) {
                mutation::try_swap_units(state, &directory, rng)
            } else {
                mutation::try_move_lab(state, &directory, rng)
            };
            let Some(undo) = undo else {
                continue;
            };

            let candidate = penalty(state.allocations(), &config.weights);
            if candidate < current {
                current = candidate;
                stats.moves_accepted += 1;
            } else {
                undo.revert(state);
            }
        }
        stats.generations = generation + 1;
    }

    stats.final_penalty = current;
    debug!(
        accepted = stats.moves_accepted,
        attempted = stats.moves_attempted,
        initial_penalty = stats.initial_penalty,
        final_penalty = stats.final_penalty,
        "optimizer pass done"
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Allocation, Component};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn theory(class: u32, day: u8, period: u8, subject: u32, teacher: u32) -> Allocation {
        Allocation::new(class, day, period, subject, teacher, 1, Component::Theory)
    }

    fn lumpy_state() -> (WorldState, Vec<Teacher>) {
        // One teacher crammed into four consecutive periods on one day,
        // with the rest of the week empty: plenty to improve.
        let mut state = WorldState::new();
        for p in 0..4 {
            state.add_allocation(theory(1, 0, p, 10 + u32::from(p), 1));
        }
        (state, vec![Teacher::new(1)])
    }

    #[test]
    fn test_zero_generations_is_noop() {
        let (mut state, teachers) = lumpy_state();
        let before = state.allocations().to_vec();
        let config = OptimizerConfig {
            generations: 0,
            ..OptimizerConfig::default()
        };
        let mut rng = SmallRng::seed_from_u64(42);

        let stats = optimize(&mut state, &teachers, &config, &mut rng);
        assert_eq!(stats.moves_attempted, 0);
        assert_eq!(stats.initial_penalty, stats.final_penalty);
        assert_eq!(state.allocations(), before.as_slice());
    }

    #[test]
    fn test_penalty_never_worsens() {
        let (mut state, teachers) = lumpy_state();
        let config = OptimizerConfig::default();
        let mut rng = SmallRng::seed_from_u64(42);

        let stats = optimize(&mut state, &teachers, &config, &mut rng);
        assert!(stats.final_penalty <= stats.initial_penalty);
        assert_eq!(
            penalty(state.allocations(), &config.weights),
            stats.final_penalty
        );
    }

    #[test]
    fn test_units_preserved_across_optimization() {
        let (mut state, teachers) = lumpy_state();
        let mut rng = SmallRng::seed_from_u64(7);
        optimize(&mut state, &teachers, &OptimizerConfig::default(), &mut rng);
        assert_eq!(state.len(), 4);
        // Subjects unchanged, one allocation each.
        for subject in 10..14 {
            assert_eq!(
                state
                    .allocations()
                    .iter()
                    .filter(|a| a.subject_id == subject)
                    .count(),
                1
            );
        }
    }

    #[test]
    fn test_hard_constraints_hold_after_optimization() {
        // Two teachers sharing one class: swapping units across days
        // changes teacher occupancy, so conflicts would surface here
        // if a mutation ever skipped its feasibility checks.
        let mut state = WorldState::new();
        state.add_allocation(theory(1, 0, 0, 10, 1));
        state.add_allocation(theory(1, 0, 1, 11, 2));
        state.add_allocation(theory(1, 0, 2, 12, 1));
        state.add_allocation(theory(1, 1, 0, 13, 2));
        state.add_allocation(theory(1, 1, 1, 14, 1));
        state.add_allocation(theory(2, 0, 0, 15, 2));
        let teachers = vec![Teacher::new(1), Teacher::new(2)];
        let config = OptimizerConfig::default();

        let before = penalty(state.allocations(), &config.weights);
        let mut rng = SmallRng::seed_from_u64(11);
        let stats = optimize(&mut state, &teachers, &config, &mut rng);
        assert!(stats.final_penalty <= before);
        assert_eq!(state.len(), 6);

        let mut teacher_slots: Vec<_> = state
            .allocations()
            .iter()
            .map(|a| (a.teacher_id, a.day, a.period))
            .collect();
        let mut class_slots: Vec<_> = state
            .allocations()
            .iter()
            .map(|a| (a.class_id, a.day, a.period))
            .collect();
        teacher_slots.sort_unstable();
        class_slots.sort_unstable();
        let unique = |v: &[(u32, u8, u8)]| {
            let mut d = v.to_vec();
            d.dedup();
            d.len()
        };
        assert_eq!(unique(&teacher_slots), teacher_slots.len());
        assert_eq!(unique(&class_slots), class_slots.len());
    }
}
