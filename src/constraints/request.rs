//! Request constraint: honor worker scheduling requests.

use std::collections::BTreeSet;

use crate::constraints::context::ConstraintContext;
use crate::constraints::ConstraintInstance;
use crate::solver::model::{CmpOp, CpModel, LinearExpr, Literal};
use crate::solver::variables::SolverVariables;

/// Applies positive (want to work) and negative (want to avoid) requests.
///
/// The posture is per request: `request.is_hard` overrides the configured
/// posture when present. Hard requests pin the assignment; soft requests
/// emit a violation indicator per overlapping period, weighted later by
/// `request.priority`. Requests naming unknown workers or shift types are
/// skipped.
pub(crate) fn apply(
    instance: &mut ConstraintInstance,
    model: &mut CpModel,
    variables: &SolverVariables,
    ctx: &ConstraintContext<'_>,
) {
    if ctx.requests.is_empty() {
        return;
    }

    let worker_ids: BTreeSet<&str> = ctx.workers.iter().map(|w| w.id.as_str()).collect();
    let shift_ids: BTreeSet<&str> = ctx.shift_types.iter().map(|s| s.id.as_str()).collect();
    let config_is_hard = instance.is_hard();

    for (request_idx, request) in ctx.requests.iter().enumerate() {
        if !worker_ids.contains(request.worker_id.as_str()) {
            continue;
        }
        if !shift_ids.contains(request.shift_type_id.as_str()) {
            continue;
        }

        let periods = ctx.overlapping_periods(request.start_date, request.end_date);
        let is_hard = request.is_hard.unwrap_or(config_is_hard);

        for period in periods {
            let Ok(var) =
                variables.assignment(&request.worker_id, period, &request.shift_type_id)
            else {
                continue;
            };

            if is_hard {
                let pinned = i64::from(request.is_positive());
                model.add_linear(LinearExpr::from(var), CmpOp::Eq, pinned);
                continue;
            }

            let violation_name = format!(
                "req_viol_{}_{}_p{}_r{}",
                request.worker_id, request.shift_type_id, period, request_idx
            );
            let violation = model.new_bool_var(violation_name.clone());
            if request.is_positive() {
                // violation <=> (x == 0)
                model.add_linear_enforced(
                    LinearExpr::from(var),
                    CmpOp::Eq,
                    0,
                    Literal::from(violation),
                );
                model.add_linear_enforced(
                    LinearExpr::from(var),
                    CmpOp::Ge,
                    1,
                    Literal::from(violation).negate(),
                );
            } else {
                // violation <=> (x == 1)
                model.add_linear_enforced(
                    LinearExpr::from(var),
                    CmpOp::Ge,
                    1,
                    Literal::from(violation),
                );
                model.add_linear_enforced(
                    LinearExpr::from(var),
                    CmpOp::Eq,
                    0,
                    Literal::from(violation).negate(),
                );
            }
            instance.record_violation_with_priority(violation_name, violation, request.priority);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::testing::{build_context, date, solve, vars_for, TestSetup};
    use crate::constraints::{ConstraintConfig, ConstraintKind};
    use crate::models::{RequestKind, SchedulingRequest};
    use crate::solver::objective::ObjectiveBuilder;

    fn request_config() -> ConstraintConfig {
        ConstraintConfig::soft(true, 150)
    }

    #[test]
    fn soft_positive_request_is_fulfilled_when_possible() {
        let mut setup = TestSetup::default();
        setup.requests.push(
            SchedulingRequest::new(
                "W003",
                date(2026, 1, 5),
                date(2026, 1, 11),
                RequestKind::Positive,
                "day",
                5,
            )
            .unwrap(),
        );

        let mut model = CpModel::new();
        let variables = vars_for(&mut model, &setup);
        let ctx = build_context(&setup);

        let mut instance = ConstraintInstance::new(ConstraintKind::Request, request_config());
        instance.apply(&mut model, &variables, &ctx);
        assert_eq!(instance.violation_variables().len(), 1);
        assert_eq!(instance.violation_priority("req_viol_W003_day_p0_r0"), 5);

        let mut objective = ObjectiveBuilder::new();
        objective.add_constraint(&instance);
        objective.build(&mut model);

        let solver = solve(&model);
        let x = variables.assignment("W003", 0, "day").unwrap();
        assert_eq!(solver.value(x), Some(1));
        let violation = instance.violation_variables()["req_viol_W003_day_p0_r0"];
        assert_eq!(solver.value(violation), Some(0));
    }

    #[test]
    fn soft_negative_request_flags_assignment() {
        let mut setup = TestSetup::default();
        setup.requests.push(
            SchedulingRequest::new(
                "W001",
                date(2026, 1, 5),
                date(2026, 1, 18),
                RequestKind::Negative,
                "night",
                1,
            )
            .unwrap(),
        );

        let mut model = CpModel::new();
        let variables = vars_for(&mut model, &setup);
        let ctx = build_context(&setup);

        // Force the assignment the request tries to avoid in period 0.
        let x = variables.assignment("W001", 0, "night").unwrap();
        model.add_linear(LinearExpr::from(x), CmpOp::Eq, 1);

        let mut instance = ConstraintInstance::new(ConstraintKind::Request, request_config());
        instance.apply(&mut model, &variables, &ctx);

        let mut objective = ObjectiveBuilder::new();
        objective.add_constraint(&instance);
        objective.build(&mut model);

        let solver = solve(&model);
        let violated = instance.violation_variables()["req_viol_W001_night_p0_r0"];
        assert_eq!(solver.value(violated), Some(1));
        let clean = instance.violation_variables()["req_viol_W001_night_p1_r0"];
        assert_eq!(solver.value(clean), Some(0));
    }

    #[test]
    fn hard_negative_request_pins_to_zero() {
        let mut setup = TestSetup::default();
        setup.requests.push(
            SchedulingRequest::new(
                "W001",
                date(2026, 1, 5),
                date(2026, 1, 18),
                RequestKind::Negative,
                "day",
                1,
            )
            .unwrap()
            .hard(),
        );

        let mut model = CpModel::new();
        let variables = vars_for(&mut model, &setup);
        let ctx = build_context(&setup);

        let mut instance = ConstraintInstance::new(ConstraintKind::Request, request_config());
        instance.apply(&mut model, &variables, &ctx);
        // Hard requests create no violation indicators.
        assert!(instance.violation_variables().is_empty());

        // Pressure toward assigning everyone everywhere.
        let mut objective = LinearExpr::new();
        for (_, _, _, var) in variables.assignment_tuples() {
            objective.add_term(-1, var);
        }
        model.minimize(objective);

        let solver = solve(&model);
        for period in 0..setup.num_periods() {
            let x = variables.assignment("W001", period, "day").unwrap();
            assert_eq!(solver.value(x), Some(0));
        }
    }

    #[test]
    fn unknown_ids_are_skipped() {
        let mut setup = TestSetup::default();
        setup.requests.push(
            SchedulingRequest::new(
                "W404",
                date(2026, 1, 5),
                date(2026, 1, 11),
                RequestKind::Positive,
                "day",
                1,
            )
            .unwrap(),
        );
        setup.requests.push(
            SchedulingRequest::new(
                "W001",
                date(2026, 1, 5),
                date(2026, 1, 11),
                RequestKind::Positive,
                "ghost",
                1,
            )
            .unwrap(),
        );

        let mut model = CpModel::new();
        let variables = vars_for(&mut model, &setup);
        let ctx = build_context(&setup);

        let mut instance = ConstraintInstance::new(ConstraintKind::Request, request_config());
        instance.apply(&mut model, &variables, &ctx);
        assert!(instance.violation_variables().is_empty());
    }

    #[test]
    fn request_outside_horizon_emits_nothing() {
        let mut setup = TestSetup::default();
        setup.requests.push(
            SchedulingRequest::new(
                "W001",
                date(2026, 3, 1),
                date(2026, 3, 7),
                RequestKind::Positive,
                "day",
                1,
            )
            .unwrap(),
        );

        let mut model = CpModel::new();
        let variables = vars_for(&mut model, &setup);
        let ctx = build_context(&setup);

        let mut instance = ConstraintInstance::new(ConstraintKind::Request, request_config());
        instance.apply(&mut model, &variables, &ctx);
        assert!(instance.violation_variables().is_empty());
    }
}
