//! Coverage constraint: every active (period, shift type) is staffed.

use crate::constraints::context::ConstraintContext;
use crate::constraints::ConstraintInstance;
use crate::solver::model::{CmpOp, CpModel, LinearExpr};
use crate::solver::variables::SolverVariables;

/// Posts `sum_w x[w, p, s] >= workers_required` for every period and shift
/// type. When a shift type's `applicable_days` excludes every calendar day
/// of a period, the staffing sum is pinned to zero instead.
pub(crate) fn apply(
    _instance: &mut ConstraintInstance,
    model: &mut CpModel,
    variables: &SolverVariables,
    ctx: &ConstraintContext<'_>,
) {
    for period in 0..ctx.num_periods {
        let weekdays = ctx.period_weekdays(period);
        for shift_type in ctx.shift_types {
            let vars: Vec<_> = ctx
                .workers
                .iter()
                .filter_map(|w| variables.assignment(&w.id, period, &shift_type.id).ok())
                .collect();
            if vars.is_empty() {
                continue;
            }

            let active = weekdays
                .iter()
                .any(|day| shift_type.applies_on_weekday(*day));
            if active {
                model.add_linear(
                    LinearExpr::sum(vars),
                    CmpOp::Ge,
                    shift_type.workers_required as i64,
                );
            } else {
                model.add_linear(LinearExpr::sum(vars), CmpOp::Eq, 0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::testing::{build_context, date, solve, vars_for, TestSetup};
    use crate::constraints::{ConstraintConfig, ConstraintKind};

    #[test]
    fn coverage_is_met_for_every_period() {
        let setup = TestSetup::default();
        let mut model = CpModel::new();
        let variables = vars_for(&mut model, &setup);
        let ctx = build_context(&setup);

        let mut instance =
            ConstraintInstance::new(ConstraintKind::Coverage, ConstraintConfig::hard());
        instance.apply(&mut model, &variables, &ctx);

        let solver = solve(&model);
        for period in 0..setup.num_periods() {
            for shift_type in &setup.shift_types {
                let staffed: i64 = setup
                    .workers
                    .iter()
                    .map(|w| {
                        let x = variables.assignment(&w.id, period, &shift_type.id).unwrap();
                        solver.value(x).unwrap()
                    })
                    .sum();
                assert!(
                    staffed >= shift_type.workers_required as i64,
                    "period {} shift {} staffed {}",
                    period,
                    shift_type.id,
                    staffed
                );
            }
        }
    }

    #[test]
    fn inapplicable_weekday_pins_staffing_to_zero() {
        // Single-day periods on Sat/Sun with a weekday-only shift type.
        let mut setup = TestSetup::default();
        setup.period_dates = vec![
            (date(2026, 1, 10), date(2026, 1, 10)),
            (date(2026, 1, 11), date(2026, 1, 11)),
        ];
        setup.shift_types = vec![setup.shift_types[0]
            .clone()
            .with_applicable_days([0, 1, 2, 3, 4])];

        let mut model = CpModel::new();
        let variables = vars_for(&mut model, &setup);
        let ctx = build_context(&setup);

        let mut instance =
            ConstraintInstance::new(ConstraintKind::Coverage, ConstraintConfig::hard());
        instance.apply(&mut model, &variables, &ctx);

        let solver = solve(&model);
        for period in 0..2 {
            for worker in &setup.workers {
                let x = variables
                    .assignment(&worker.id, period, &setup.shift_types[0].id)
                    .unwrap();
                assert_eq!(solver.value(x), Some(0));
            }
        }
    }
}
