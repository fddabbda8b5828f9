//! Availability constraint: unavailable workers get no assignments.

use crate::constraints::context::ConstraintContext;
use crate::constraints::ConstraintInstance;
use crate::models::AvailabilityType;
use crate::solver::model::{CmpOp, CpModel, LinearExpr};
use crate::solver::variables::SolverVariables;

/// Pins `x[w, p, t] = 0` for every period overlapping an `Unavailable`
/// entry: all shift types when the entry has no shift filter, only the
/// named shift type otherwise. `Preferred` and `Required` entries are
/// hints and emit nothing here.
pub(crate) fn apply(
    _instance: &mut ConstraintInstance,
    model: &mut CpModel,
    variables: &SolverVariables,
    ctx: &ConstraintContext<'_>,
) {
    for avail in ctx.availabilities {
        if avail.availability_type != AvailabilityType::Unavailable {
            continue;
        }
        let periods = ctx.overlapping_periods(avail.start_date, avail.end_date);
        for period in periods {
            match &avail.shift_type_id {
                Some(shift_type_id) => {
                    if let Ok(var) = variables.assignment(&avail.worker_id, period, shift_type_id)
                    {
                        model.add_linear(LinearExpr::from(var), CmpOp::Eq, 0);
                    }
                }
                None => {
                    for shift_type in ctx.shift_types {
                        if let Ok(var) =
                            variables.assignment(&avail.worker_id, period, &shift_type.id)
                        {
                            model.add_linear(LinearExpr::from(var), CmpOp::Eq, 0);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::testing::{build_context, date, solve, vars_for, TestSetup};
    use crate::constraints::{ConstraintConfig, ConstraintKind};
    use crate::models::Availability;

    #[test]
    fn blanket_unavailability_blocks_all_shifts_in_overlap() {
        let mut setup = TestSetup::default();
        setup.availabilities.push(
            Availability::new(
                "W001",
                date(2026, 1, 6),
                date(2026, 1, 8),
                AvailabilityType::Unavailable,
                None,
            )
            .unwrap(),
        );

        let mut model = CpModel::new();
        let variables = vars_for(&mut model, &setup);
        let ctx = build_context(&setup);

        let mut instance =
            ConstraintInstance::new(ConstraintKind::Availability, ConstraintConfig::hard());
        instance.apply(&mut model, &variables, &ctx);

        // Push toward maximum assignment so the pins do the work.
        let mut objective = LinearExpr::new();
        for (_, _, _, var) in variables.assignment_tuples() {
            objective.add_term(-1, var);
        }
        model.minimize(objective);

        let solver = solve(&model);
        for shift_id in ["day", "night"] {
            let x = variables.assignment("W001", 0, shift_id).unwrap();
            assert_eq!(solver.value(x), Some(0), "period 0 {shift_id}");
            let x = variables.assignment("W001", 1, shift_id).unwrap();
            assert_eq!(solver.value(x), Some(1), "period 1 {shift_id}");
        }
    }

    #[test]
    fn shift_scoped_unavailability_blocks_only_that_shift() {
        let mut setup = TestSetup::default();
        setup.availabilities.push(
            Availability::new(
                "W002",
                date(2026, 1, 5),
                date(2026, 1, 18),
                AvailabilityType::Unavailable,
                Some("night".to_string()),
            )
            .unwrap(),
        );

        let mut model = CpModel::new();
        let variables = vars_for(&mut model, &setup);
        let ctx = build_context(&setup);

        let mut instance =
            ConstraintInstance::new(ConstraintKind::Availability, ConstraintConfig::hard());
        instance.apply(&mut model, &variables, &ctx);

        let mut objective = LinearExpr::new();
        for (_, _, _, var) in variables.assignment_tuples() {
            objective.add_term(-1, var);
        }
        model.minimize(objective);

        let solver = solve(&model);
        for period in 0..setup.num_periods() {
            let night = variables.assignment("W002", period, "night").unwrap();
            assert_eq!(solver.value(night), Some(0));
            let day = variables.assignment("W002", period, "day").unwrap();
            assert_eq!(solver.value(day), Some(1));
        }
    }

    #[test]
    fn preferred_hint_emits_nothing() {
        let mut setup = TestSetup::default();
        setup.availabilities.push(
            Availability::new(
                "W001",
                date(2026, 1, 5),
                date(2026, 1, 11),
                AvailabilityType::Preferred,
                None,
            )
            .unwrap(),
        );

        let mut model = CpModel::new();
        let variables = vars_for(&mut model, &setup);
        let ctx = build_context(&setup);
        let before = model.num_constraints();

        let mut instance =
            ConstraintInstance::new(ConstraintKind::Availability, ConstraintConfig::hard());
        instance.apply(&mut model, &variables, &ctx);
        assert_eq!(model.num_constraints(), before);
    }
}
