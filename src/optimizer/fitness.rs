//! Soft-constraint penalty function.
//!
//! Scores a committed timetable by summing weighted penalties over
//! classes and teachers. Lower is better; hard constraints are never
//! part of the score because mutations preserve them by construction.
//!
//! # Penalty terms
//!
//! | Term | Definition |
//! |------|-----------|
//! | Consecutive runs | Each maximal run of ≥3 back-to-back teaching periods for a teacher, weighted by its excess length |
//! | Daily variance | Population variance of a teacher's per-day load |
//! | Last period | Every allocation in the final period of a day |
//! | Fragmentation | Free-period islands between a class's first and last busy period of a day |

use std::collections::{BTreeMap, BTreeSet};

use crate::models::slot::{Day, Period, DAYS_PER_WEEK, PERIODS_PER_DAY};
use crate::models::{Allocation, ClassId, TeacherId};

/// Weights of the penalty terms.
#[derive(Debug, Clone)]
pub struct FitnessWeights {
    /// Weight per excess period of a ≥3 consecutive teaching run.
    pub consecutive_run: f64,
    /// Weight of the per-teacher daily load variance.
    pub daily_variance: f64,
    /// Weight per last-period allocation.
    pub last_period: f64,
    /// Weight per free-period island inside a class day.
    pub fragmentation: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            consecutive_run: 4.0,
            daily_variance: 2.0,
            last_period: 1.0,
            fragmentation: 1.5,
        }
    }
}

/// Total weighted penalty of a timetable. Lower is better.
pub fn penalty(allocations: &[Allocation], weights: &FitnessWeights) -> f64 {
    let mut teacher_days: BTreeMap<(TeacherId, Day), BTreeSet<Period>> = BTreeMap::new();
    let mut class_days: BTreeMap<(ClassId, Day), BTreeSet<Period>> = BTreeMap::new();
    let mut last_period_count = 0u32;

    for a in allocations {
        teacher_days
            .entry((a.teacher_id, a.day))
            .or_default()
            .insert(a.period);
        class_days
            .entry((a.class_id, a.day))
            .or_default()
            .insert(a.period);
        if a.period == PERIODS_PER_DAY - 1 {
            last_period_count += 1;
        }
    }

    let mut total = weights.last_period * f64::from(last_period_count);

    // Consecutive teaching runs per (teacher, day)
    for periods in teacher_days.values() {
        let mut run = 0u32;
        let mut prev: Option<Period> = None;
        for &p in periods {
            run = match prev {
                Some(q) if p == q + 1 => run + 1,
                _ => {
                    if run >= 3 {
                        total += weights.consecutive_run * f64::from(run - 2);
                    }
                    1
                }
            };
            prev = Some(p);
        }
        if run >= 3 {
            total += weights.consecutive_run * f64::from(run - 2);
        }
    }

    // Daily load variance per teacher
    let mut teacher_loads: BTreeMap<TeacherId, [u32; DAYS_PER_WEEK as usize]> = BTreeMap::new();
    for ((teacher_id, day), periods) in &teacher_days {
        teacher_loads.entry(*teacher_id).or_default()[*day as usize] = periods.len() as u32;
    }
    for loads in teacher_loads.values() {
        let mean = loads.iter().sum::<u32>() as f64 / DAYS_PER_WEEK as f64;
        let variance = loads
            .iter()
            .map(|&l| {
                let d = f64::from(l) - mean;
                d * d
            })
            .sum::<f64>()
            / DAYS_PER_WEEK as f64;
        total += weights.daily_variance * variance;
    }

    // Free-period islands between first and last busy period of a class day
    for periods in class_days.values() {
        let (Some(&first), Some(&last)) = (periods.first(), periods.last()) else {
            continue;
        };
        let mut in_gap = false;
        for p in first..=last {
            if periods.contains(&p) {
                in_gap = false;
            } else if !in_gap {
                in_gap = true;
                total += weights.fragmentation;
            }
        }
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Component;

    fn alloc(class: ClassId, teacher: TeacherId, day: Day, period: Period) -> Allocation {
        Allocation::new(class, day, period, 10, teacher, 1, Component::Theory)
    }

    #[test]
    fn test_empty_timetable_zero_penalty() {
        let w = FitnessWeights::default();
        assert_eq!(penalty(&[], &w), 0.0);
    }

    #[test]
    fn test_consecutive_run_penalized() {
        let w = FitnessWeights {
            consecutive_run: 1.0,
            daily_variance: 0.0,
            last_period: 0.0,
            fragmentation: 0.0,
        };
        // Teacher 1 teaches periods 0..3 back to back on one day.
        let allocations: Vec<_> = (0..3).map(|p| alloc(1, 1, 0, p)).collect();
        assert_eq!(penalty(&allocations, &w), 1.0); // run of 3 → excess 1

        let allocations: Vec<_> = (0..4).map(|p| alloc(1, 1, 0, p)).collect();
        assert_eq!(penalty(&allocations, &w), 2.0); // run of 4 → excess 2

        // Two periods with a gap: no run penalty.
        let allocations = vec![alloc(1, 1, 0, 0), alloc(1, 1, 0, 2)];
        assert_eq!(penalty(&allocations, &w), 0.0);
    }

    #[test]
    fn test_last_period_penalized() {
        let w = FitnessWeights {
            consecutive_run: 0.0,
            daily_variance: 0.0,
            last_period: 1.0,
            fragmentation: 0.0,
        };
        let allocations = vec![alloc(1, 1, 0, 6), alloc(1, 1, 1, 6), alloc(1, 1, 2, 0)];
        assert_eq!(penalty(&allocations, &w), 2.0);
    }

    #[test]
    fn test_fragmentation_counts_islands() {
        let w = FitnessWeights {
            consecutive_run: 0.0,
            daily_variance: 0.0,
            last_period: 0.0,
            fragmentation: 1.0,
        };
        // Busy 0, 2, 5 → gaps {1} and {3,4}: two islands.
        let allocations = vec![alloc(1, 1, 0, 0), alloc(1, 2, 0, 2), alloc(1, 3, 0, 5)];
        assert_eq!(penalty(&allocations, &w), 2.0);

        // Contiguous day: no islands.
        let allocations = vec![alloc(1, 1, 0, 0), alloc(1, 2, 0, 1), alloc(1, 3, 0, 2)];
        assert_eq!(penalty(&allocations, &w), 0.0);
    }

    #[test]
    fn test_variance_prefers_even_load() {
        let w = FitnessWeights {
            consecutive_run: 0.0,
            daily_variance: 1.0,
            last_period: 0.0,
            fragmentation: 0.0,
        };
        // Even: one period on each of 5 days (distinct classes/days keep
        // other terms silent).
        let even: Vec<_> = (0..5).map(|d| alloc(1, 1, d, 0)).collect();
        // Lumped: five periods on one day.
        let lumped: Vec<_> = (0..5).map(|p| alloc(1, 1, 0, p + 1)).collect();
        assert!(penalty(&even, &w) < penalty(&lumped, &w));
    }
}
