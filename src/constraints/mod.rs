//! Business-rule constraint library.
//!
//! Each rule lives in its own module and is addressed by a stable
//! constraint id. Rules are represented as a tagged sum
//! ([`ConstraintKind`]) dispatched by [`ConstraintInstance::apply`];
//! soft rules accumulate violation indicators that the objective builder
//! later folds into one weighted minimization term.

pub mod availability;
pub mod config;
pub mod context;
pub mod coverage;
pub mod fairness;
pub mod frequency;
pub mod max_absence;
pub mod request;
pub mod restriction;
pub mod sequence;
pub mod shift_frequency;
pub mod shift_order;

use std::collections::BTreeMap;

pub use config::{ConstraintConfig, ConstraintParameters};
pub use context::ConstraintContext;

use crate::solver::model::{CpModel, VarId};
use crate::solver::variables::SolverVariables;

/// Every built-in business rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    Coverage,
    Restriction,
    Availability,
    Fairness,
    Frequency,
    Request,
    Sequence,
    MaxAbsence,
    ShiftFrequency,
    ShiftOrderPreference,
}

impl ConstraintKind {
    /// Stable identifier used by the registry and configuration overlays.
    pub fn id(&self) -> &'static str {
        match self {
            ConstraintKind::Coverage => "coverage",
            ConstraintKind::Restriction => "restriction",
            ConstraintKind::Availability => "availability",
            ConstraintKind::Fairness => "fairness",
            ConstraintKind::Frequency => "frequency",
            ConstraintKind::Request => "request",
            ConstraintKind::Sequence => "sequence",
            ConstraintKind::MaxAbsence => "max_absence",
            ConstraintKind::ShiftFrequency => "shift_frequency",
            ConstraintKind::ShiftOrderPreference => "shift_order_preference",
        }
    }
}

/// One configured constraint, ready to emit model constraints.
///
/// Soft postures record their violation indicators here; the objective
/// builder reads them back out. Names are unique within an instance and
/// double as debugging labels.
#[derive(Debug)]
pub struct ConstraintInstance {
    kind: ConstraintKind,
    config: ConstraintConfig,
    violation_variables: BTreeMap<String, VarId>,
    violation_priorities: BTreeMap<String, i64>,
}

impl ConstraintInstance {
    pub fn new(kind: ConstraintKind, config: ConstraintConfig) -> Self {
        Self {
            kind,
            config,
            violation_variables: BTreeMap::new(),
            violation_priorities: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> ConstraintKind {
        self.kind
    }

    pub fn constraint_id(&self) -> &'static str {
        self.kind.id()
    }

    pub fn config(&self) -> &ConstraintConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn is_hard(&self) -> bool {
        self.config.is_hard
    }

    pub fn weight(&self) -> i64 {
        self.config.weight
    }

    /// Emits this constraint's model constraints and indicators.
    ///
    /// A disabled constraint is a no-op.
    pub fn apply(
        &mut self,
        model: &mut CpModel,
        variables: &SolverVariables,
        ctx: &ConstraintContext<'_>,
    ) {
        if !self.is_enabled() {
            return;
        }
        match self.kind {
            ConstraintKind::Coverage => coverage::apply(self, model, variables, ctx),
            ConstraintKind::Restriction => restriction::apply(self, model, variables, ctx),
            ConstraintKind::Availability => availability::apply(self, model, variables, ctx),
            ConstraintKind::Fairness => fairness::apply(self, model, variables, ctx),
            ConstraintKind::Frequency => frequency::apply(self, model, variables, ctx),
            ConstraintKind::Request => request::apply(self, model, variables, ctx),
            ConstraintKind::Sequence => sequence::apply(self, model, variables, ctx),
            ConstraintKind::MaxAbsence => max_absence::apply(self, model, variables, ctx),
            ConstraintKind::ShiftFrequency => shift_frequency::apply(self, model, variables, ctx),
            ConstraintKind::ShiftOrderPreference => {
                shift_order::apply(self, model, variables, ctx)
            }
        }
    }

    /// Violation indicators recorded by the last `apply`, keyed by name.
    pub fn violation_variables(&self) -> &BTreeMap<String, VarId> {
        &self.violation_variables
    }

    /// Per-violation priority multiplier; 1 when none was recorded.
    pub fn violation_priority(&self, name: &str) -> i64 {
        self.violation_priorities.get(name).copied().unwrap_or(1)
    }

    pub(crate) fn record_violation(&mut self, name: String, var: VarId) {
        self.violation_variables.insert(name, var);
    }

    pub(crate) fn record_violation_with_priority(
        &mut self,
        name: String,
        var: VarId,
        priority: i64,
    ) {
        self.violation_priorities.insert(name.clone(), priority);
        self.violation_variables.insert(name, var);
    }
}
