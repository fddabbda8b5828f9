//! Sequence constraint: discourage back-to-back periods in one category.

use crate::constraints::context::ConstraintContext;
use crate::constraints::ConstraintInstance;
use crate::solver::model::{CmpOp, CpModel, LinearExpr, Literal, VarId};
use crate::solver::variables::SolverVariables;

/// For each worker, category in scope, and adjacent period pair, emits
/// `v = in_c[p] AND in_c[p+1]` where `in_c[p]` reifies "the worker has at
/// least one assignment in category c during period p".
///
/// `parameters.categories` narrows the scope; without it every category in
/// the catalog is discouraged from repeating.
pub(crate) fn apply(
    instance: &mut ConstraintInstance,
    model: &mut CpModel,
    variables: &SolverVariables,
    ctx: &ConstraintContext<'_>,
) {
    if ctx.num_periods < 2 {
        return;
    }

    let scope = instance.config().string_list_parameter("categories");
    let by_category = ctx.shifts_by_category();

    for (category, members) in by_category {
        if let Some(scope) = &scope {
            if !scope.iter().any(|c| c == category) {
                continue;
            }
        }
        let member_ids: Vec<&str> = members.iter().map(|s| s.id.as_str()).collect();

        for worker in ctx.workers {
            // One reified indicator per period, shared by both adjacent
            // pairs that touch it.
            let indicators: Vec<Option<VarId>> = (0..ctx.num_periods)
                .map(|period| {
                    category_indicator(
                        model,
                        variables,
                        &worker.id,
                        category,
                        &member_ids,
                        period,
                    )
                })
                .collect();

            for period in 0..ctx.num_periods - 1 {
                let (Some(first), Some(second)) = (indicators[period], indicators[period + 1])
                else {
                    continue;
                };
                let violation_name =
                    format!("seq_viol_{}_{}_p{}", worker.id, category, period);
                let violation = model.new_bool_var(violation_name.clone());
                model.add_bool_and_iff(
                    &[Literal::from(first), Literal::from(second)],
                    violation,
                );
                instance.record_violation(violation_name, violation);
            }
        }
    }
}

fn category_indicator(
    model: &mut CpModel,
    variables: &SolverVariables,
    worker_id: &str,
    category: &str,
    member_ids: &[&str],
    period: usize,
) -> Option<VarId> {
    let vars: Vec<VarId> = member_ids
        .iter()
        .filter_map(|shift_id| variables.assignment(worker_id, period, shift_id).ok())
        .collect();
    if vars.is_empty() {
        return None;
    }

    let indicator = model.new_bool_var(format!("seq_in_{worker_id}_{category}_p{period}"));
    model.add_linear_enforced(
        LinearExpr::sum(vars.clone()),
        CmpOp::Ge,
        1,
        Literal::from(indicator),
    );
    model.add_linear_enforced(
        LinearExpr::sum(vars),
        CmpOp::Eq,
        0,
        Literal::from(indicator).negate(),
    );
    Some(indicator)
}
