//! Mixed-integer model layer with a CP-SAT-shaped surface.
//!
//! Constraints are recorded symbolically (linear expressions over integer
//! variables, optionally guarded by an enforcement literal) and compiled to
//! a plain MILP at solve time. Reified forms use exact indicator encodings
//! whose big-M values come from the variables' declared domains, so the
//! relaxation stays tight for the 0/1 variables this crate creates.

use good_lp::{constraint, default_solver, variable, variables, Expression, Solution, SolverModel};

/// Handle to a model variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarId(usize);

/// A variable or its negation, used to guard enforced constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Literal {
    var: VarId,
    negated: bool,
}

impl Literal {
    pub fn negate(self) -> Self {
        Self {
            var: self.var,
            negated: !self.negated,
        }
    }

    pub fn var(&self) -> VarId {
        self.var
    }

    /// The literal as a 0/1 linear expression (`v` or `1 - v`).
    fn as_expr(&self) -> LinearExpr {
        if self.negated {
            let mut expr = LinearExpr::constant(1);
            expr.add_term(-1, self.var);
            expr
        } else {
            LinearExpr::from(self.var)
        }
    }
}

impl From<VarId> for Literal {
    fn from(var: VarId) -> Self {
        Self {
            var,
            negated: false,
        }
    }
}

/// Integer-coefficient affine expression.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearExpr {
    terms: Vec<(i64, VarId)>,
    constant: i64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constant(value: i64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    pub fn sum<I: IntoIterator<Item = VarId>>(vars: I) -> Self {
        Self {
            terms: vars.into_iter().map(|v| (1, v)).collect(),
            constant: 0,
        }
    }

    pub fn add_term(&mut self, coefficient: i64, var: VarId) -> &mut Self {
        self.terms.push((coefficient, var));
        self
    }

    pub fn add_expr(&mut self, coefficient: i64, other: &LinearExpr) -> &mut Self {
        for (c, v) in &other.terms {
            self.terms.push((coefficient * c, *v));
        }
        self.constant += coefficient * other.constant;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[(i64, VarId)] {
        &self.terms
    }

    /// Evaluates the expression against a value assignment.
    pub fn evaluate(&self, value_of: impl Fn(VarId) -> i64) -> i64 {
        self.constant
            + self
                .terms
                .iter()
                .map(|(c, v)| c * value_of(*v))
                .sum::<i64>()
    }
}

impl From<VarId> for LinearExpr {
    fn from(var: VarId) -> Self {
        Self {
            terms: vec![(1, var)],
            constant: 0,
        }
    }
}

/// Comparison operator of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ge,
    Le,
}

#[derive(Debug, Clone)]
struct VarData {
    lo: i64,
    hi: i64,
    name: String,
}

#[derive(Debug, Clone)]
struct LinearConstraint {
    expr: LinearExpr,
    op: CmpOp,
    rhs: i64,
    enforcement: Option<Literal>,
}

/// Builder for the constraint model handed to the solver.
#[derive(Debug, Default)]
pub struct CpModel {
    vars: Vec<VarData>,
    constraints: Vec<LinearConstraint>,
    objective: Option<LinearExpr>,
}

impl CpModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a 0/1 variable. Names are for debugging only.
    pub fn new_bool_var(&mut self, name: impl Into<String>) -> VarId {
        self.push_var(0, 1, name.into())
    }

    /// Creates an integer variable with inclusive bounds `lo..=hi`.
    pub fn new_int_var(&mut self, lo: i64, hi: i64, name: impl Into<String>) -> VarId {
        debug_assert!(lo <= hi, "integer variable with empty domain");
        self.push_var(lo, hi, name.into())
    }

    /// Creates a variable pinned to a single value.
    pub fn new_constant(&mut self, value: i64) -> VarId {
        self.push_var(value, value, format!("const_{value}"))
    }

    fn push_var(&mut self, lo: i64, hi: i64, name: String) -> VarId {
        let id = VarId(self.vars.len());
        self.vars.push(VarData { lo, hi, name });
        id
    }

    /// Posts `expr op rhs` unconditionally.
    pub fn add_linear(&mut self, expr: LinearExpr, op: CmpOp, rhs: i64) {
        self.constraints.push(LinearConstraint {
            expr,
            op,
            rhs,
            enforcement: None,
        });
    }

    /// Posts the implication `literal => (expr op rhs)`.
    ///
    /// Pairing two calls with opposite literals and complementary
    /// comparisons yields a reified equivalence.
    pub fn add_linear_enforced(&mut self, expr: LinearExpr, op: CmpOp, rhs: i64, literal: Literal) {
        self.constraints.push(LinearConstraint {
            expr,
            op,
            rhs,
            enforcement: Some(literal),
        });
    }

    /// Posts `literal => OR(lits)`.
    pub fn add_bool_or_enforced(&mut self, lits: &[Literal], literal: Literal) {
        let mut expr = LinearExpr::new();
        for lit in lits {
            expr.add_expr(1, &lit.as_expr());
        }
        self.add_linear_enforced(expr, CmpOp::Ge, 1, literal);
    }

    /// Posts `literal => AND(lits)`.
    pub fn add_bool_and_enforced(&mut self, lits: &[Literal], literal: Literal) {
        for lit in lits {
            self.add_linear_enforced(lit.as_expr(), CmpOp::Ge, 1, literal);
        }
    }

    /// Posts `indicator <=> AND(lits)` directly as linear constraints.
    pub fn add_bool_and_iff(&mut self, lits: &[Literal], indicator: VarId) {
        // indicator <= each literal
        for lit in lits {
            let mut expr = lit.as_expr();
            expr.add_term(-1, indicator);
            self.add_linear(expr, CmpOp::Ge, 0);
        }
        // indicator >= sum(lits) - (n - 1)
        let mut expr = LinearExpr::from(indicator);
        for lit in lits {
            expr.add_expr(-1, &lit.as_expr());
        }
        self.add_linear(expr, CmpOp::Ge, 1 - lits.len() as i64);
    }

    /// Posts `indicator <=> OR(lits)` directly as linear constraints.
    pub fn add_bool_or_iff(&mut self, lits: &[Literal], indicator: VarId) {
        // sum(lits) >= indicator
        let mut expr = LinearExpr::new();
        for lit in lits {
            expr.add_expr(1, &lit.as_expr());
        }
        expr.add_term(-1, indicator);
        self.add_linear(expr, CmpOp::Ge, 0);
        // sum(lits) <= n * indicator
        let mut expr = LinearExpr::new();
        for lit in lits {
            expr.add_expr(1, &lit.as_expr());
        }
        expr.add_term(-(lits.len() as i64), indicator);
        self.add_linear(expr, CmpOp::Le, 0);
    }

    /// Sets the objective to minimize. Later calls replace earlier ones.
    pub fn minimize(&mut self, expr: LinearExpr) {
        self.objective = Some(expr);
    }

    pub fn has_objective(&self) -> bool {
        self.objective.is_some()
    }

    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn var_name(&self, var: VarId) -> &str {
        &self.vars[var.0].name
    }

    pub fn var_bounds(&self, var: VarId) -> (i64, i64) {
        let data = &self.vars[var.0];
        (data.lo, data.hi)
    }

    fn expr_bounds(&self, expr: &LinearExpr) -> (i64, i64) {
        let mut lo = expr.constant;
        let mut hi = expr.constant;
        for (c, v) in &expr.terms {
            let (vlo, vhi) = self.var_bounds(*v);
            if *c >= 0 {
                lo += c * vlo;
                hi += c * vhi;
            } else {
                lo += c * vhi;
                hi += c * vlo;
            }
        }
        (lo, hi)
    }

    /// Flattens enforced constraints into plain linear ones via indicator
    /// big-M terms derived from domain bounds.
    fn compiled_constraints(&self) -> Vec<(LinearExpr, CmpOp, i64)> {
        let mut out = Vec::with_capacity(self.constraints.len());
        for constraint in &self.constraints {
            match constraint.enforcement {
                None => out.push((
                    constraint.expr.clone(),
                    constraint.op,
                    constraint.rhs,
                )),
                Some(lit) => {
                    let ops: &[CmpOp] = match constraint.op {
                        CmpOp::Eq => &[CmpOp::Ge, CmpOp::Le],
                        CmpOp::Ge => &[CmpOp::Ge],
                        CmpOp::Le => &[CmpOp::Le],
                    };
                    let (lo, hi) = self.expr_bounds(&constraint.expr);
                    for op in ops {
                        match op {
                            CmpOp::Ge => {
                                let slack = constraint.rhs - lo;
                                if slack <= 0 {
                                    continue; // holds for every assignment
                                }
                                // expr - slack * lit >= rhs - slack
                                let mut expr = constraint.expr.clone();
                                expr.add_expr(-slack, &lit.as_expr());
                                out.push((expr, CmpOp::Ge, constraint.rhs - slack));
                            }
                            CmpOp::Le => {
                                let slack = hi - constraint.rhs;
                                if slack <= 0 {
                                    continue;
                                }
                                // expr + slack * lit <= rhs + slack
                                let mut expr = constraint.expr.clone();
                                expr.add_expr(slack, &lit.as_expr());
                                out.push((expr, CmpOp::Le, constraint.rhs + slack));
                            }
                            CmpOp::Eq => unreachable!(),
                        }
                    }
                }
            }
        }
        out
    }
}

/// Outcome of a solver invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    Optimal,
    Feasible,
    Infeasible,
    ModelInvalid,
    Unknown,
    /// The pre-solve feasibility checker ruled the inputs out before the
    /// solver ran.
    InfeasiblePreSolve,
}

impl SolveStatus {
    pub fn name(&self) -> &'static str {
        match self {
            SolveStatus::Optimal => "OPTIMAL",
            SolveStatus::Feasible => "FEASIBLE",
            SolveStatus::Infeasible => "INFEASIBLE",
            SolveStatus::ModelInvalid => "MODEL_INVALID",
            SolveStatus::Unknown => "UNKNOWN",
            SolveStatus::InfeasiblePreSolve => "INFEASIBLE_PRE_SOLVE",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

/// Knobs forwarded to the backing solver.
///
/// The bundled microlp backend honors none of the optional knobs; they are
/// accepted so embedders can swap in a backend that does without changing
/// call sites.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverParameters {
    pub max_time_in_seconds: f64,
    pub num_search_workers: Option<u32>,
    pub relative_gap_limit: Option<f64>,
    pub log_search_progress: bool,
    pub random_seed: Option<u64>,
}

impl Default for SolverParameters {
    fn default() -> Self {
        Self {
            max_time_in_seconds: 300.0,
            num_search_workers: None,
            relative_gap_limit: None,
            log_search_progress: false,
            random_seed: None,
        }
    }
}

/// Solves a [`CpModel`] and exposes the resulting value assignment.
#[derive(Debug, Default)]
pub struct CpSolver {
    pub parameters: SolverParameters,
    values: Option<Vec<i64>>,
    objective_value: Option<f64>,
}

impl CpSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn solve(&mut self, model: &CpModel) -> SolveStatus {
        self.values = None;
        self.objective_value = None;

        if self.parameters.num_search_workers.is_some()
            || self.parameters.relative_gap_limit.is_some()
            || self.parameters.random_seed.is_some()
        {
            log::debug!("backend does not expose search workers, gap limit, or seed; ignoring");
        }
        if self.parameters.log_search_progress {
            log::debug!(
                "solving model: {} variables, {} constraints",
                model.num_vars(),
                model.num_constraints()
            );
        }

        let mut problem_vars = variables!();
        let handles: Vec<_> = model
            .vars
            .iter()
            .map(|data| {
                problem_vars.add(
                    variable()
                        .integer()
                        .min(data.lo as f64)
                        .max(data.hi as f64)
                        .name(data.name.clone()),
                )
            })
            .collect();

        let to_expression = |expr: &LinearExpr| -> Expression {
            let sum: Expression = expr
                .terms()
                .iter()
                .map(|(c, v)| (*c as f64) * handles[v.0])
                .sum();
            sum + expr.constant as f64
        };

        let objective = match &model.objective {
            Some(expr) => to_expression(expr),
            None => to_expression(&LinearExpr::new()),
        };

        let mut problem = problem_vars.minimise(objective).using(default_solver);
        for (expr, op, rhs) in model.compiled_constraints() {
            let lhs = to_expression(&expr);
            let rhs = rhs as f64;
            problem = match op {
                CmpOp::Eq => problem.with(constraint!(lhs == rhs)),
                CmpOp::Ge => problem.with(constraint!(lhs >= rhs)),
                CmpOp::Le => problem.with(constraint!(lhs <= rhs)),
            };
        }

        match problem.solve() {
            Ok(solution) => {
                let values: Vec<i64> = handles
                    .iter()
                    .map(|h| solution.value(*h).round() as i64)
                    .collect();
                if let Some(expr) = &model.objective {
                    let value = expr.evaluate(|v| values[v.0]);
                    self.objective_value = Some(value as f64);
                }
                self.values = Some(values);
                SolveStatus::Optimal
            }
            Err(good_lp::ResolutionError::Infeasible) => SolveStatus::Infeasible,
            Err(good_lp::ResolutionError::Unbounded) => SolveStatus::ModelInvalid,
            Err(error) => {
                log::warn!("solver backend failure: {error}");
                SolveStatus::Unknown
            }
        }
    }

    /// Value of a variable in the last solution, if one exists.
    pub fn value(&self, var: VarId) -> Option<i64> {
        self.values.as_ref().map(|values| values[var.0])
    }

    pub fn objective_value(&self) -> Option<f64> {
        self.objective_value
    }
}
