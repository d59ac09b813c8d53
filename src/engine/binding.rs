//! Teacher binding.
//!
//! Resolves the single teacher responsible for each (class, subject,
//! component) before any placement happens. The binding holds for the
//! entire run: every unit of a bound key is delivered by the same
//! teacher across all days and periods.
//!
//! # Algorithm
//!
//! 1. An operator-fixed assignment wins unconditionally.
//! 2. Otherwise pick among qualified teachers the one with the least
//!    projected load (weekly hours of bindings already granted in this
//!    run), skipping candidates whose load would exceed their weekly
//!    cap. Ties break by higher effectiveness score, then lower id.
//! 3. With no viable candidate the key stays unbound; the scheduler
//!    leaves its units free and reports them.

use std::collections::HashMap;

use crate::models::{ClassId, Component, SubjectId, Teacher, TeacherId};

use super::Catalog;

/// Identity of a binding: (class, subject, component).
pub type BindingKey = (ClassId, SubjectId, Component);

/// A teaching obligation to bind, with its weekly hour weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingDemand {
    /// Class taught.
    pub class_id: ClassId,
    /// Subject taught.
    pub subject_id: SubjectId,
    /// Component taught.
    pub component: Component,
    /// Weekly hours this binding adds to the teacher's load.
    pub weekly_hours: u32,
}

impl BindingDemand {
    fn key(&self) -> BindingKey {
        (self.class_id, self.subject_id, self.component)
    }
}

/// The resolved (class, subject, component) → teacher table for a run.
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    bindings: HashMap<BindingKey, TeacherId>,
    projected_load: HashMap<TeacherId, u32>,
    /// Demands left without a teacher, with reason strings.
    pub unbound: Vec<(BindingKey, String)>,
}

impl BindingTable {
    /// The bound teacher for a key, if any.
    pub fn teacher_for(
        &self,
        class_id: ClassId,
        subject_id: SubjectId,
        component: Component,
    ) -> Option<TeacherId> {
        self.bindings
            .get(&(class_id, subject_id, component))
            .copied()
    }

    /// Weekly hours already granted to a teacher in this run.
    pub fn projected_load(&self, teacher_id: TeacherId) -> u32 {
        self.projected_load.get(&teacher_id).copied().unwrap_or(0)
    }

    /// Number of resolved bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether no binding was resolved.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn grant(&mut self, key: BindingKey, teacher_id: TeacherId, hours: u32) {
        self.bindings.insert(key, teacher_id);
        *self.projected_load.entry(teacher_id).or_insert(0) += hours;
    }
}

/// Resolves teachers for all demands, in input order.
///
/// Demand order is significant for the load heuristic, so the caller
/// passes demands in a deterministic order.
pub(crate) fn bind_teachers(demands: &[BindingDemand], catalog: &Catalog) -> BindingTable {
    let mut table = BindingTable::default();

    for demand in demands {
        let key = demand.key();
        if table.bindings.contains_key(&key) {
            continue;
        }

        // Operator-fixed assignments win unconditionally.
        if let Some(&teacher_id) = catalog.assignment_map.get(&key) {
            table.grant(key, teacher_id, demand.weekly_hours);
            continue;
        }

        // Least projected load among qualified, unsaturated teachers.
        let mut best: Option<(&Teacher, u32, f64)> = None;
        let mut any_qualified = false;
        for &teacher in &catalog.teachers {
            if !teacher.is_qualified_for(demand.subject_id) {
                continue;
            }
            any_qualified = true;
            let load = table.projected_load(teacher.id);
            if load + demand.weekly_hours > teacher.max_hours_per_week {
                continue;
            }
            let effectiveness = teacher.effectiveness_for(demand.subject_id);
            let better = match best {
                None => true,
                Some((b, b_load, b_eff)) => {
                    load < b_load
                        || (load == b_load && effectiveness > b_eff)
                        || (load == b_load && effectiveness == b_eff && teacher.id < b.id)
                }
            };
            if better {
                best = Some((teacher, load, effectiveness));
            }
        }

        match best {
            Some((teacher, _, _)) => table.grant(key, teacher.id, demand.weekly_hours),
            None => {
                let reason = if any_qualified {
                    format!(
                        "all qualified teachers saturated for (class {}, subject {}, {})",
                        demand.class_id,
                        demand.subject_id,
                        demand.component.label()
                    )
                } else {
                    format!(
                        "no qualified teacher for (class {}, subject {}, {})",
                        demand.class_id,
                        demand.subject_id,
                        demand.component.label()
                    )
                };
                table.unbound.push((key, reason));
            }
        }
    }

    table
}
