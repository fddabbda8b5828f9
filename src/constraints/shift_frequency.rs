//! Shift-frequency constraint: per-worker recurring duty requirements.

use std::collections::BTreeSet;

use crate::constraints::context::ConstraintContext;
use crate::constraints::frequency::apply_windows;
use crate::constraints::ConstraintInstance;
use crate::solver::model::CpModel;
use crate::solver::variables::SolverVariables;

/// Applies each [`ShiftFrequencyRequirement`]: in every sliding window of
/// `min(max_periods_between, num_periods)` consecutive periods the worker
/// works at least one shift type from the requirement's set.
///
/// Shift types the worker is restricted from do not count as candidates;
/// a worker restricted from the whole set gets a constant violation per
/// window (soft) or an unsatisfiable constraint (hard).
///
/// [`ShiftFrequencyRequirement`]: crate::models::ShiftFrequencyRequirement
pub(crate) fn apply(
    instance: &mut ConstraintInstance,
    model: &mut CpModel,
    variables: &SolverVariables,
    ctx: &ConstraintContext<'_>,
) {
    if ctx.shift_frequency_requirements.is_empty() {
        return;
    }

    let catalog: BTreeSet<&str> = ctx.shift_types.iter().map(|s| s.id.as_str()).collect();
    let is_hard = instance.is_hard();

    for requirement in ctx.shift_frequency_requirements {
        let Some(worker) = ctx.workers.iter().find(|w| w.id == requirement.worker_id) else {
            continue;
        };

        let candidate_ids: Vec<String> = requirement
            .shift_types
            .iter()
            .filter(|id| catalog.contains(id.as_str()))
            .filter(|id| worker.can_work_shift(id))
            .cloned()
            .collect();
        if requirement
            .shift_types
            .iter()
            .all(|id| !catalog.contains(id.as_str()))
        {
            // Requirement references nothing in the catalog.
            continue;
        }

        apply_windows(
            instance,
            model,
            variables,
            &requirement.worker_id,
            &candidate_ids,
            requirement.max_periods_between,
            ctx.num_periods,
            is_hard,
            "sf",
        );
    }
}
