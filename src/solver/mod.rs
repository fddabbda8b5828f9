//! Model construction, constraint orchestration, and solving.

pub mod extractor;
pub mod model;
pub mod objective;
pub mod registry;
pub mod result;
pub mod shift_solver;
pub mod variables;

pub use extractor::SolutionExtractor;
pub use model::{CmpOp, CpModel, CpSolver, LinearExpr, Literal, SolveStatus, SolverParameters, VarId};
pub use objective::ObjectiveBuilder;
pub use registry::{
    clear_and_reseed, with_global_registry, with_global_registry_mut, ConstraintRegistration,
    ConstraintRegistry,
};
pub use result::{SolverError, SolverResult};
pub use shift_solver::{ShiftSolver, SolverOptions};
pub use variables::{SolverVariables, VariableBuilder, VariableLookupError};
