//! Max-absence constraint: bound consecutive idle periods per worker.

use crate::constraints::context::ConstraintContext;
use crate::constraints::frequency::apply_windows;
use crate::constraints::ConstraintInstance;
use crate::solver::model::CpModel;
use crate::solver::variables::SolverVariables;

pub(crate) const DEFAULT_WINDOW: usize = 4;

/// Requires at least one assignment of any shift type in every sliding
/// window of `parameters.max_consecutive_absences` periods. Same window
/// machinery as the frequency constraint, with the predicate widened to
/// the whole catalog.
pub(crate) fn apply(
    instance: &mut ConstraintInstance,
    model: &mut CpModel,
    variables: &SolverVariables,
    ctx: &ConstraintContext<'_>,
) {
    let window = instance
        .config()
        .usize_parameter("max_consecutive_absences", DEFAULT_WINDOW);
    let shift_ids: Vec<String> = ctx.shift_types.iter().map(|s| s.id.clone()).collect();
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
            "absence",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::testing::{build_context, solve, vars_for, weekly_setup};
    use crate::constraints::{ConstraintConfig, ConstraintKind};
    use crate::solver::model::{CmpOp, LinearExpr};
    use crate::solver::objective::ObjectiveBuilder;

    #[test]
    fn long_idle_stretch_is_flagged() {
        let mut setup = weekly_setup(6);
        setup.workers.truncate(1);
        setup.shift_types.truncate(1);

        let mut model = CpModel::new();
        let variables = vars_for(&mut model, &setup);
        let ctx = build_context(&setup);

        // Idle in periods 1..=4, working at the edges.
        for (period, value) in [(0, 1), (1, 0), (2, 0), (3, 0), (4, 0), (5, 1)] {
            let x = variables.assignment("W001", period, "day").unwrap();
            model.add_linear(LinearExpr::from(x), CmpOp::Eq, value);
        }

        let config = ConstraintConfig::soft(true, 100)
            .with_parameter("max_consecutive_absences", serde_json::json!(3));
        let mut instance = ConstraintInstance::new(ConstraintKind::MaxAbsence, config);
        instance.apply(&mut model, &variables, &ctx);

        let mut objective = ObjectiveBuilder::new();
        objective.add_constraint(&instance);
        objective.build(&mut model);

        let solver = solve(&model);
        // Windows [1..4) and [2..5) are fully idle.
        let violated: i64 = instance
            .violation_variables()
            .values()
            .map(|v| solver.value(*v).unwrap())
            .sum();
        assert_eq!(violated, 2);
    }

    #[test]
    fn regular_attendance_has_no_violations() {
        let mut setup = weekly_setup(6);
        setup.workers.truncate(1);
        setup.shift_types.truncate(1);

        let mut model = CpModel::new();
        let variables = vars_for(&mut model, &setup);
        let ctx = build_context(&setup);

        for period in 0..6 {
            let x = variables.assignment("W001", period, "day").unwrap();
            model.add_linear(LinearExpr::from(x), CmpOp::Eq, i64::from(period % 2 == 0));
        }

        let config = ConstraintConfig::soft(true, 100)
            .with_parameter("max_consecutive_absences", serde_json::json!(3));
        let mut instance = ConstraintInstance::new(ConstraintKind::MaxAbsence, config);
        instance.apply(&mut model, &variables, &ctx);

        let mut objective = ObjectiveBuilder::new();
        objective.add_constraint(&instance);
        objective.build(&mut model);

        let solver = solve(&model);
        for var in instance.violation_variables().values() {
            assert_eq!(solver.value(*var), Some(0));
        }
    }
}
