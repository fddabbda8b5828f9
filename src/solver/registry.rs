//! Constraint registry: catalog of built-in rules and their defaults.

use std::sync::RwLock;

use once_cell::sync::Lazy;

use crate::constraints::{ConstraintConfig, ConstraintInstance, ConstraintKind};

/// Registration entry: a rule plus the configuration it runs with unless a
/// per-run overlay says otherwise.
#[derive(Debug, Clone)]
pub struct ConstraintRegistration {
    pub constraint_id: &'static str,
    pub kind: ConstraintKind,
    pub is_hard: bool,
    pub default_config: ConstraintConfig,
}

/// Ordered catalog of hard and soft constraints.
///
/// Registration order is application order; hard constraints always run
/// before soft ones.
#[derive(Debug, Default)]
pub struct ConstraintRegistry {
    hard: Vec<ConstraintRegistration>,
    soft: Vec<ConstraintRegistration>,
}

impl ConstraintRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry populated with every built-in rule.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.seed_builtins();
        registry
    }

    pub fn register_hard(&mut self, kind: ConstraintKind) {
        self.register_hard_with_config(kind, ConstraintConfig::hard());
    }

    pub fn register_hard_with_config(&mut self, kind: ConstraintKind, config: ConstraintConfig) {
        self.hard.retain(|r| r.constraint_id != kind.id());
        self.hard.push(ConstraintRegistration {
            constraint_id: kind.id(),
            kind,
            is_hard: true,
            default_config: config,
        });
    }

    pub fn register_soft(&mut self, kind: ConstraintKind, default_config: ConstraintConfig) {
        self.soft.retain(|r| r.constraint_id != kind.id());
        self.soft.push(ConstraintRegistration {
            constraint_id: kind.id(),
            kind,
            is_hard: false,
            default_config,
        });
    }

    pub fn hard_constraints(&self) -> &[ConstraintRegistration] {
        &self.hard
    }

    pub fn soft_constraints(&self) -> &[ConstraintRegistration] {
        &self.soft
    }

    pub fn get(&self, constraint_id: &str) -> Option<&ConstraintRegistration> {
        self.hard
            .iter()
            .chain(self.soft.iter())
            .find(|r| r.constraint_id == constraint_id)
    }

    pub fn clear(&mut self) {
        self.hard.clear();
        self.soft.clear();
    }

    fn seed_builtins(&mut self) {
        self.register_hard(ConstraintKind::Coverage);
        self.register_hard(ConstraintKind::Restriction);
        self.register_hard(ConstraintKind::Availability);

        self.register_soft(ConstraintKind::Fairness, ConstraintConfig::soft(true, 1000));
        self.register_soft(ConstraintKind::Frequency, ConstraintConfig::soft(false, 100));
        self.register_soft(ConstraintKind::Request, ConstraintConfig::soft(true, 150));
        self.register_soft(ConstraintKind::Sequence, ConstraintConfig::soft(false, 100));
        self.register_soft(ConstraintKind::MaxAbsence, ConstraintConfig::soft(false, 100));
        self.register_soft(
            ConstraintKind::ShiftFrequency,
            ConstraintConfig::soft(false, 500),
        );
        self.register_soft(
            ConstraintKind::ShiftOrderPreference,
            ConstraintConfig::soft(false, 200),
        );
    }
}

impl ConstraintRegistration {
    /// Instantiates the rule with the given configuration (usually the
    /// default merged with a per-run overlay).
    pub fn instantiate(&self, config: ConstraintConfig) -> ConstraintInstance {
        ConstraintInstance::new(self.kind, config)
    }
}

static GLOBAL_REGISTRY: Lazy<RwLock<ConstraintRegistry>> =
    Lazy::new(|| RwLock::new(ConstraintRegistry::with_builtins()));

/// Runs `f` against the process-wide registry.
///
/// The registry is seeded once on first use and treated as read-only
/// afterwards; embedders that need isolation (tests, plug-in rules) go
/// through [`clear_and_reseed`] or [`with_global_registry_mut`] between
/// runs, not during one.
pub fn with_global_registry<T>(f: impl FnOnce(&ConstraintRegistry) -> T) -> T {
    let guard = GLOBAL_REGISTRY.read().unwrap_or_else(|e| e.into_inner());
    f(&guard)
}

pub fn with_global_registry_mut<T>(f: impl FnOnce(&mut ConstraintRegistry) -> T) -> T {
    let mut guard = GLOBAL_REGISTRY.write().unwrap_or_else(|e| e.into_inner());
    f(&mut guard)
}

/// Restores the process-wide registry to the built-in seed.
pub fn clear_and_reseed() {
    with_global_registry_mut(|registry| {
        registry.clear();
        registry.seed_builtins();
    });
}
