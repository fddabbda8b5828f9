//! Frequency constraint: workers must appear regularly.

use crate::constraints::context::ConstraintContext;
use crate::constraints::ConstraintInstance;
use crate::solver::model::{CmpOp, CpModel, LinearExpr, Literal, VarId};
use crate::solver::variables::SolverVariables;

pub(crate) const DEFAULT_WINDOW: usize = 4;

/// For every worker and every sliding window of `max_periods_between`
/// consecutive periods, requires at least one assignment to a shift type in
/// scope (`parameters.shift_types`, defaulting to the whole catalog).
/// Soft posture emits one violation indicator per empty window.
pub(crate) fn apply(
    instance: &mut ConstraintInstance,
    model: &mut CpModel,
    variables: &SolverVariables,
    ctx: &ConstraintContext<'_>,
) {
    let window = instance
        .config()
        .usize_parameter("max_periods_between", DEFAULT_WINDOW);
    let shift_ids: Vec<String> = match instance.config().string_list_parameter("shift_types") {
        Some(filter) => ctx
            .shift_types
            .iter()
            .filter(|s| filter.iter().any(|f| f == &s.id))
            .map(|s| s.id.clone())
            .collect(),
        None => ctx.shift_types.iter().map(|s| s.id.clone()).collect(),
    };
    if shift_ids.is_empty() {
        return;
    }

    let is_hard = instance.is_hard();
    let worker_ids: Vec<String> = ctx.workers.iter().map(|w| w.id.clone()).collect();
    for worker_id in worker_ids {
        apply_windows(
            instance,
            model,
            variables,
            &worker_id,
            &shift_ids,
            window,
            ctx.num_periods,
            is_hard,
            "freq",
        );
    }
}

/// Shared sliding-window engine, also used by the absence constraint.
#[allow(clippy::too_many_arguments)]
pub(crate) fn apply_windows(
    instance: &mut ConstraintInstance,
    model: &mut CpModel,
    variables: &SolverVariables,
    worker_id: &str,
    shift_ids: &[String],
    window: usize,
    num_periods: usize,
    is_hard: bool,
    prefix: &str,
) {
    let window = window.min(num_periods);
    if window == 0 {
        return;
    }

    for window_start in 0..=(num_periods - window) {
        let vars: Vec<VarId> = (window_start..window_start + window)
            .flat_map(|period| {
                shift_ids
                    .iter()
                    .filter_map(move |shift_id| variables.assignment(worker_id, period, shift_id).ok())
            })
            .collect();

        let violation_name = format!("{prefix}_viol_{worker_id}_w{window_start}");
        if vars.is_empty() {
            if is_hard {
                // No candidate assignments: unsatisfiable window.
                model.add_linear(LinearExpr::new(), CmpOp::Ge, 1);
            } else {
                let violation = model.new_constant(1);
                instance.record_violation(violation_name, violation);
            }
            continue;
        }

        if is_hard {
            model.add_linear(LinearExpr::sum(vars), CmpOp::Ge, 1);
        } else {
            let has = model.new_bool_var(format!("{prefix}_has_{worker_id}_w{window_start}"));
            model.add_linear_enforced(
                LinearExpr::sum(vars.clone()),
                CmpOp::Ge,
                1,
                Literal::from(has),
            );
            model.add_linear_enforced(
                LinearExpr::sum(vars),
                CmpOp::Eq,
                0,
                Literal::from(has).negate(),
            );

            // violation == !has
            let violation = model.new_bool_var(violation_name.clone());
            let mut link = LinearExpr::from(violation);
            link.add_term(1, has);
            model.add_linear(link, CmpOp::Eq, 1);
            instance.record_violation(violation_name, violation);
        }
    }
}
