//! Shift-order preference constraint: encourage transitions between
//! adjacent periods.

use std::collections::{BTreeMap, BTreeSet};

use crate::constraints::context::ConstraintContext;
use crate::constraints::ConstraintInstance;
use crate::models::{
    AvailabilityType, Direction, OrderTarget, OrderTrigger, ShiftOrderPreference, Worker,
};
use crate::solver::model::{CmpOp, CpModel, LinearExpr, Literal, VarId};
use crate::solver::variables::SolverVariables;

/// The trigger side of a rule at a given period.
enum TriggerIndicator {
    /// The trigger is known to hold (unavailability at that period).
    Constant,
    Var(VarId),
}

/// Applies each [`ShiftOrderPreference`]: when the trigger fires at period
/// N, the preferred shift or category should appear at N+1 (`after`) or the
/// rule is read right-to-left (`before`). Violations are
/// `trigger AND NOT preferred` with the rule's priority.
///
/// [`ShiftOrderPreference`]: crate::models::ShiftOrderPreference
pub(crate) fn apply(
    instance: &mut ConstraintInstance,
    model: &mut CpModel,
    variables: &SolverVariables,
    ctx: &ConstraintContext<'_>,
) {
    if ctx.shift_order_preferences.is_empty() || ctx.num_periods < 2 {
        return;
    }

    let shift_ids: BTreeSet<&str> = ctx.shift_types.iter().map(|s| s.id.as_str()).collect();
    let by_category: BTreeMap<&str, Vec<&str>> = {
        let mut map: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for shift_type in ctx.shift_types {
            map.entry(shift_type.category.as_str())
                .or_default()
                .push(shift_type.id.as_str());
        }
        map
    };

    // Period indices with any unavailable overlap, shift-scoped or not;
    // the trigger asks "was the worker out", not "was every shift blocked".
    let mut unavailable_periods: BTreeMap<&str, BTreeSet<usize>> = BTreeMap::new();
    for avail in ctx.availabilities {
        if avail.availability_type != AvailabilityType::Unavailable {
            continue;
        }
        let periods = ctx.overlapping_periods(avail.start_date, avail.end_date);
        unavailable_periods
            .entry(avail.worker_id.as_str())
            .or_default()
            .extend(periods);
    }

    let no_periods = BTreeSet::new();
    for rule in ctx.shift_order_preferences {
        if !trigger_exists(&rule.trigger, &shift_ids, &by_category) {
            continue;
        }
        if !target_exists(&rule.preferred, &shift_ids, &by_category) {
            continue;
        }

        for worker in ctx.workers {
            if !rule.applies_to(&worker.id) {
                continue;
            }
            apply_rule_for_worker(
                instance,
                model,
                variables,
                rule,
                worker,
                &by_category,
                unavailable_periods
                    .get(worker.id.as_str())
                    .unwrap_or(&no_periods),
                ctx.num_periods,
            );
        }
    }
}

fn trigger_exists(
    trigger: &OrderTrigger,
    shift_ids: &BTreeSet<&str>,
    by_category: &BTreeMap<&str, Vec<&str>>,
) -> bool {
    match trigger {
        OrderTrigger::ShiftType(id) => shift_ids.contains(id.as_str()),
        OrderTrigger::Category(name) => by_category.contains_key(name.as_str()),
        OrderTrigger::Unavailability => true,
    }
}

fn target_exists(
    target: &OrderTarget,
    shift_ids: &BTreeSet<&str>,
    by_category: &BTreeMap<&str, Vec<&str>>,
) -> bool {
    match target {
        OrderTarget::ShiftType(id) => shift_ids.contains(id.as_str()),
        OrderTarget::Category(name) => by_category.contains_key(name.as_str()),
    }
}

#[allow(clippy::too_many_arguments)]
fn apply_rule_for_worker(
    instance: &mut ConstraintInstance,
    model: &mut CpModel,
    variables: &SolverVariables,
    rule: &ShiftOrderPreference,
    worker: &Worker,
    by_category: &BTreeMap<&str, Vec<&str>>,
    unavailable: &BTreeSet<usize>,
    num_periods: usize,
) {
    for period in 0..num_periods - 1 {
        let (trigger_period, preferred_period) = match rule.direction {
            Direction::After => (period, period + 1),
            Direction::Before => (period + 1, period),
        };

        let Some(trigger) = trigger_indicator(
            model,
            variables,
            rule,
            worker,
            trigger_period,
            by_category,
            unavailable,
        ) else {
            continue;
        };
        let Some(preferred) = preferred_indicator(
            model,
            variables,
            rule,
            worker,
            preferred_period,
            by_category,
        ) else {
            continue;
        };

        let violation_name = format!(
            "sop_viol_{}_{}_p{}",
            worker.id, rule.rule_id, trigger_period
        );
        let violation = model.new_bool_var(violation_name.clone());
        match trigger {
            TriggerIndicator::Constant => {
                // violation == !preferred
                let mut link = LinearExpr::from(violation);
                link.add_term(1, preferred);
                model.add_linear(link, CmpOp::Eq, 1);
            }
            TriggerIndicator::Var(trigger_var) => {
                model.add_bool_and_iff(
                    &[Literal::from(trigger_var), Literal::from(preferred).negate()],
                    violation,
                );
            }
        }
        instance.record_violation_with_priority(violation_name, violation, rule.priority);
    }
}

fn trigger_indicator(
    model: &mut CpModel,
    variables: &SolverVariables,
    rule: &ShiftOrderPreference,
    worker: &Worker,
    period: usize,
    by_category: &BTreeMap<&str, Vec<&str>>,
    unavailable: &BTreeSet<usize>,
) -> Option<TriggerIndicator> {
    match &rule.trigger {
        OrderTrigger::ShiftType(shift_id) => variables
            .assignment(&worker.id, period, shift_id)
            .ok()
            .map(TriggerIndicator::Var),
        OrderTrigger::Category(name) => {
            let members = by_category.get(name.as_str())?;
            let label = format!("sop_trig_{}_{}_p{}", worker.id, rule.rule_id, period);
            or_indicator(model, variables, &worker.id, members, period, label, |_| true)
                .map(TriggerIndicator::Var)
        }
        OrderTrigger::Unavailability => {
            if unavailable.contains(&period) {
                Some(TriggerIndicator::Constant)
            } else {
                None
            }
        }
    }
}

fn preferred_indicator(
    model: &mut CpModel,
    variables: &SolverVariables,
    rule: &ShiftOrderPreference,
    worker: &Worker,
    period: usize,
    by_category: &BTreeMap<&str, Vec<&str>>,
) -> Option<VarId> {
    match &rule.preferred {
        OrderTarget::ShiftType(shift_id) => {
            if !worker.can_work_shift(shift_id) {
                return None;
            }
            variables.assignment(&worker.id, period, shift_id).ok()
        }
        OrderTarget::Category(name) => {
            let members = by_category.get(name.as_str())?;
            let label = format!("sop_pref_{}_{}_p{}", worker.id, rule.rule_id, period);
            or_indicator(model, variables, &worker.id, members, period, label, |id| {
                worker.can_work_shift(id)
            })
        }
    }
}

/// Reifies "any of these shifts assigned in this period" into a fresh
/// boolean, filtering members first.
fn or_indicator(
    model: &mut CpModel,
    variables: &SolverVariables,
    worker_id: &str,
    member_ids: &[&str],
    period: usize,
    label: String,
    keep: impl Fn(&str) -> bool,
) -> Option<VarId> {
    let vars: Vec<VarId> = member_ids
        .iter()
        .filter(|id| keep(id))
        .filter_map(|id| variables.assignment(worker_id, period, id).ok())
        .collect();
    if vars.is_empty() {
        return None;
    }

    let indicator = model.new_bool_var(label);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::testing::{build_context, date, solve, vars_for, weekly_setup};
    use crate::constraints::{ConstraintConfig, ConstraintKind};
    use crate::models::Availability;
    use crate::solver::objective::ObjectiveBuilder;

    fn order_config() -> ConstraintConfig {
        ConstraintConfig::soft(true, 200)
    }

    fn after_night_prefer_day(priority: i64) -> ShiftOrderPreference {
        ShiftOrderPreference {
            rule_id: "night-then-day".to_string(),
            trigger: OrderTrigger::ShiftType("night".to_string()),
            direction: Direction::After,
            preferred: OrderTarget::ShiftType("day".to_string()),
            priority,
            worker_ids: None,
        }
    }

    #[test]
    fn after_trigger_without_preferred_is_violated() {
        let mut setup = weekly_setup(2);
        setup.workers.truncate(1);
        setup.shift_order_preferences.push(after_night_prefer_day(3));

        let mut model = CpModel::new();
        let variables = vars_for(&mut model, &setup);
        let ctx = build_context(&setup);

        // Night at period 0, idle at period 1.
        let night0 = variables.assignment("W001", 0, "night").unwrap();
        model.add_linear(LinearExpr::from(night0), CmpOp::Eq, 1);
        let day1 = variables.assignment("W001", 1, "day").unwrap();
        model.add_linear(LinearExpr::from(day1), CmpOp::Eq, 0);

        let mut instance =
            ConstraintInstance::new(ConstraintKind::ShiftOrderPreference, order_config());
        instance.apply(&mut model, &variables, &ctx);

        let mut objective = ObjectiveBuilder::new();
        objective.add_constraint(&instance);
        objective.build(&mut model);

        let solver = solve(&model);
        let violation = instance.violation_variables()["sop_viol_W001_night-then-day_p0"];
        assert_eq!(solver.value(violation), Some(1));
        assert_eq!(
            instance.violation_priority("sop_viol_W001_night-then-day_p0"),
            3
        );
    }

    #[test]
    fn satisfied_preference_has_no_violation() {
        let mut setup = weekly_setup(2);
        setup.workers.truncate(1);
        setup.shift_order_preferences.push(after_night_prefer_day(1));

        let mut model = CpModel::new();
        let variables = vars_for(&mut model, &setup);
        let ctx = build_context(&setup);

        let night0 = variables.assignment("W001", 0, "night").unwrap();
        model.add_linear(LinearExpr::from(night0), CmpOp::Eq, 1);
        let day1 = variables.assignment("W001", 1, "day").unwrap();
        model.add_linear(LinearExpr::from(day1), CmpOp::Eq, 1);

        let mut instance =
            ConstraintInstance::new(ConstraintKind::ShiftOrderPreference, order_config());
        instance.apply(&mut model, &variables, &ctx);

        let mut objective = ObjectiveBuilder::new();
        objective.add_constraint(&instance);
        objective.build(&mut model);

        let solver = solve(&model);
        let violation = instance.violation_variables()["sop_viol_W001_night-then-day_p0"];
        assert_eq!(solver.value(violation), Some(0));
    }

    #[test]
    fn unavailability_trigger_uses_constant() {
        let mut setup = weekly_setup(2);
        setup.workers.truncate(1);
        setup.availabilities.push(
            Availability::new(
                "W001",
                date(2026, 1, 5),
                date(2026, 1, 11),
                AvailabilityType::Unavailable,
                None,
            )
            .unwrap(),
        );
        setup.shift_order_preferences.push(ShiftOrderPreference {
            rule_id: "back-from-leave".to_string(),
            trigger: OrderTrigger::Unavailability,
            direction: Direction::After,
            preferred: OrderTarget::Category("day".to_string()),
            priority: 1,
            worker_ids: None,
        });

        let mut model = CpModel::new();
        let variables = vars_for(&mut model, &setup);
        let ctx = build_context(&setup);

        // Do not work day after the leave period.
        let day1 = variables.assignment("W001", 1, "day").unwrap();
        model.add_linear(LinearExpr::from(day1), CmpOp::Eq, 0);

        let mut instance =
            ConstraintInstance::new(ConstraintKind::ShiftOrderPreference, order_config());
        instance.apply(&mut model, &variables, &ctx);
        assert_eq!(instance.violation_variables().len(), 1);

        let mut objective = ObjectiveBuilder::new();
        objective.add_constraint(&instance);
        objective.build(&mut model);

        let solver = solve(&model);
        let violation = instance.violation_variables()["sop_viol_W001_back-from-leave_p0"];
        assert_eq!(solver.value(violation), Some(1));
    }

    #[test]
    fn restricted_preferred_shift_skips_pair() {
        let mut setup = weekly_setup(2);
        setup.workers.truncate(1);
        setup.workers[0].restricted_shifts.insert("day".to_string());
        setup.shift_order_preferences.push(after_night_prefer_day(1));

        let mut model = CpModel::new();
        let variables = vars_for(&mut model, &setup);
        let ctx = build_context(&setup);

        let mut instance =
            ConstraintInstance::new(ConstraintKind::ShiftOrderPreference, order_config());
        instance.apply(&mut model, &variables, &ctx);
        assert!(instance.violation_variables().is_empty());
    }

    #[test]
    fn worker_filter_respected() {
        let mut setup = weekly_setup(2);
        let mut rule = after_night_prefer_day(1);
        rule.worker_ids = Some(["W002".to_string()].into_iter().collect());
        setup.shift_order_preferences.push(rule);

        let mut model = CpModel::new();
        let variables = vars_for(&mut model, &setup);
        let ctx = build_context(&setup);

        let mut instance =
            ConstraintInstance::new(ConstraintKind::ShiftOrderPreference, order_config());
        instance.apply(&mut model, &variables, &ctx);

        for name in instance.violation_variables().keys() {
            assert!(name.contains("W002"), "unexpected violation {name}");
        }
    }

    #[test]
    fn before_direction_swaps_periods() {
        let mut setup = weekly_setup(2);
        setup.workers.truncate(1);
        setup.shift_order_preferences.push(ShiftOrderPreference {
            rule_id: "day-before-night".to_string(),
            trigger: OrderTrigger::ShiftType("night".to_string()),
            direction: Direction::Before,
            preferred: OrderTarget::ShiftType("day".to_string()),
            priority: 1,
            worker_ids: None,
        });

        let mut model = CpModel::new();
        let variables = vars_for(&mut model, &setup);
        let ctx = build_context(&setup);

        // Night at period 1, no day at period 0.
        let night1 = variables.assignment("W001", 1, "night").unwrap();
        model.add_linear(LinearExpr::from(night1), CmpOp::Eq, 1);
        let day0 = variables.assignment("W001", 0, "day").unwrap();
        model.add_linear(LinearExpr::from(day0), CmpOp::Eq, 0);

        let mut instance =
            ConstraintInstance::new(ConstraintKind::ShiftOrderPreference, order_config());
        instance.apply(&mut model, &variables, &ctx);

        let mut objective = ObjectiveBuilder::new();
        objective.add_constraint(&instance);
        objective.build(&mut model);

        let solver = solve(&model);
        // Trigger period is 1 for the before direction.
        let violation = instance.violation_variables()["sop_viol_W001_day-before-night_p1"];
        assert_eq!(solver.value(violation), Some(1));
    }
}
