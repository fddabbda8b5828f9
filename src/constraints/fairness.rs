//! Fairness constraint: balance the undesirable load across workers.

use crate::constraints::context::ConstraintContext;
use crate::constraints::ConstraintInstance;
use crate::solver::model::{CmpOp, CpModel, LinearExpr};
use crate::solver::variables::SolverVariables;

/// Emits a `spread = max - min` violation over per-worker totals.
///
/// By default the balanced quantity is each worker's undesirable total.
/// When `parameters.categories` names one or more categories, the totals
/// are restricted to shift types in those categories instead; an empty
/// list silently falls back to the undesirable totals (long-standing
/// behavior, kept on purpose).
///
/// With one worker or none there is nothing to balance and nothing is
/// emitted.
pub(crate) fn apply(
    instance: &mut ConstraintInstance,
    model: &mut CpModel,
    variables: &SolverVariables,
    ctx: &ConstraintContext<'_>,
) {
    if ctx.workers.len() <= 1 {
        return;
    }

    let categories = instance
        .config()
        .string_list_parameter("categories")
        .filter(|list| !list.is_empty());

    let (totals, bound) = match categories {
        Some(categories) => {
            let matching: Vec<&str> = ctx
                .shift_types
                .iter()
                .filter(|s| categories.iter().any(|c| c == &s.category))
                .map(|s| s.id.as_str())
                .collect();
            if matching.is_empty() {
                return;
            }
            let bound = (ctx.num_periods * matching.len()) as i64;
            let totals: Vec<LinearExpr> = ctx
                .workers
                .iter()
                .map(|worker| {
                    let mut total = LinearExpr::new();
                    for period in 0..ctx.num_periods {
                        for shift_id in &matching {
                            if let Ok(var) = variables.assignment(&worker.id, period, shift_id) {
                                total.add_term(1, var);
                            }
                        }
                    }
                    total
                })
                .collect();
            (totals, bound)
        }
        None => {
            let undesirable = ctx.shift_types.iter().filter(|s| s.is_undesirable).count();
            let bound = (ctx.num_periods * undesirable.max(1)) as i64;
            let totals: Vec<LinearExpr> = ctx
                .workers
                .iter()
                .filter_map(|worker| variables.undesirable_total(&worker.id).ok())
                .map(LinearExpr::from)
                .collect();
            (totals, bound)
        }
    };

    if totals.len() <= 1 {
        return;
    }

    let max_total = model.new_int_var(0, bound, "fairness_max");
    let min_total = model.new_int_var(0, bound, "fairness_min");
    for total in &totals {
        // max >= T_w and min <= T_w
        let mut ge = LinearExpr::from(max_total);
        ge.add_expr(-1, total);
        model.add_linear(ge, CmpOp::Ge, 0);

        let mut le = LinearExpr::from(min_total);
        le.add_expr(-1, total);
        model.add_linear(le, CmpOp::Le, 0);
    }

    let spread = model.new_int_var(0, bound, "fairness_spread");
    let mut link = LinearExpr::from(spread);
    link.add_term(-1, max_total);
    link.add_term(1, min_total);
    model.add_linear(link, CmpOp::Eq, 0);

    instance.record_violation("fairness_spread".to_string(), spread);
}
