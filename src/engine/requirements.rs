//! Requirement builder.
//!
//! Expands the subject hour budgets of each class into atomic
//! placement units: one unit per theory/tutorial hour, one block per
//! two lab hours. Regular requirements are emitted per (class,
//! subject, component); elective requirements are emitted once per
//! basket per component and consumed by the elective plan builder.
//!
//! `min_room_capacity` is the class's student count — room selection
//! later filters on it.

use serde::{Deserialize, Serialize};

use crate::models::{BasketId, ClassId, Component, SubjectId};

use super::Catalog;

/// An atomic placement obligation for a regular (non-elective) subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Class the units belong to.
    pub class_id: ClassId,
    /// Subject to place.
    pub subject_id: SubjectId,
    /// Component kind.
    pub component: Component,
    /// Units to place: hours for theory/tutorial, blocks for labs.
    pub units: u32,
    /// Minimum room capacity (the class's student count).
    pub min_room_capacity: u32,
}

/// Placement demand of an elective basket, per component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketRequirement {
    /// Owning basket.
    pub basket_id: BasketId,
    /// Component kind.
    pub component: Component,
    /// Units to place: hours for theory/tutorial, blocks for labs.
    pub units: u32,
}

/// All placement obligations of a run.
#[derive(Debug, Clone, Default)]
pub struct Requirements {
    /// Per-class regular requirements, in (class, subject) order.
    pub regular: Vec<Requirement>,
    /// Per-basket elective requirements, in basket order.
    pub elective: Vec<BasketRequirement>,
}

/// Builds all requirements from the run catalog.
///
/// Classes and subjects are walked in ascending id order so the output
/// is deterministic. Subjects a class lists but that belong to a basket
/// are skipped here — the basket requirement covers them.
pub(crate) fn build_requirements(catalog: &Catalog) -> Requirements {
    let mut requirements = Requirements::default();

    for class in &catalog.classes {
        let mut subject_ids = class.subjects.clone();
        subject_ids.sort_unstable();
        for sid in subject_ids {
            let Some(subject) = catalog.subject(sid) else {
                continue;
            };
            if subject.is_elective() {
                continue;
            }
            for component in [Component::Theory, Component::Tutorial] {
                let hours = subject.component_hours(component);
                if hours > 0 {
                    requirements.regular.push(Requirement {
                        class_id: class.id,
                        subject_id: sid,
                        component,
                        units: hours,
                        min_room_capacity: class.student_count,
                    });
                }
            }
            if subject.lab_blocks() > 0 {
                requirements.regular.push(Requirement {
                    class_id: class.id,
                    subject_id: sid,
                    component: Component::Lab,
                    units: subject.lab_blocks(),
                    min_room_capacity: class.student_count,
                });
            }
        }
    }

    for basket in &catalog.baskets {
        if basket.classes.is_empty() {
            continue;
        }
        for component in [Component::Theory, Component::Tutorial] {
            let hours = match component {
                Component::Theory => basket.theory_hours,
                Component::Tutorial => basket.tutorial_hours,
                Component::Lab => unreachable!(),
            };
            if hours > 0 {
                requirements.elective.push(BasketRequirement {
                    basket_id: basket.id,
                    component,
                    units: hours,
                });
            }
        }
        if basket.lab_blocks() > 0 {
            requirements.elective.push(BasketRequirement {
                basket_id: basket.id,
                component: Component::Lab,
                units: basket.lab_blocks(),
            });
        }
    }

    requirements
}
