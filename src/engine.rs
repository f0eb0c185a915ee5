//! Contract between the model builder and a MILP backend.
//!
//! The model builder only declares binary variables, adds linear constraints
//! and sets an objective; any backend that can do that and report primal
//! values can stand behind [`SolvingEngine`]. [`HighsEngine`] is the HiGHS
//! implementation through `good_lp`.

use good_lp::solvers::SolutionStatus;
use good_lp::{
    Constraint, Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable,
    constraint, default_solver, variable,
};
use log::{debug, info};
use std::time::Duration;

use crate::data::EngineOptions;
use crate::error::EngineError;

/// Opaque reference to a variable declared with [`SolvingEngine::declare_binary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableHandle(usize);

impl VariableHandle {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    LessOrEqual,
    Equal,
    GreaterOrEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Maximise,
    Minimise,
}

/// Weighted sum of variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpression {
    terms: Vec<(VariableHandle, f64)>,
}

impl LinearExpression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_term(&mut self, variable: VariableHandle, coefficient: f64) {
        self.terms.push((variable, coefficient));
    }

    pub fn terms(&self) -> &[(VariableHandle, f64)] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn evaluate(&self, values: &PrimalValues) -> f64 {
        self.terms
            .iter()
            .map(|&(variable, coefficient)| coefficient * values.primal_value(variable))
            .sum()
    }
}

impl FromIterator<VariableHandle> for LinearExpression {
    fn from_iter<I: IntoIterator<Item = VariableHandle>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().map(|v| (v, 1.0)).collect(),
        }
    }
}

impl FromIterator<(VariableHandle, f64)> for LinearExpression {
    fn from_iter<I: IntoIterator<Item = (VariableHandle, f64)>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().collect(),
        }
    }
}

/// Primal values indexed by variable handle.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimalValues(Vec<f64>);

impl PrimalValues {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn primal_value(&self, variable: VariableHandle) -> f64 {
        self.0.get(variable.index()).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// What the backend reports after solving.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineOutcome {
    Optimal(PrimalValues),
    /// The deadline was hit; the values are whatever the backend had at that point.
    LimitReached(PrimalValues),
    /// Stopped once the relative MIP gap fell below tolerance, without a deadline.
    GapReached(PrimalValues),
    /// The deadline was hit with nothing to report.
    TimedOut,
    Infeasible,
}

pub trait SolvingEngine {
    fn declare_binary(&mut self, name: &str) -> VariableHandle;

    fn add_constraint(&mut self, expression: LinearExpression, relation: Relation, bound: f64);

    fn set_objective(&mut self, expression: LinearExpression, direction: Direction);

    /// Solves the model. Consumes the engine: a solved model is never re-solved.
    fn solve(self, time_limit: Option<Duration>) -> Result<EngineOutcome, EngineError>
    where
        Self: Sized;
}

/// HiGHS backend.
pub struct HighsEngine {
    problem: ProblemVariables,
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
    objective: Option<(Expression, Direction)>,
    options: EngineOptions,
}

impl HighsEngine {
    pub fn new(options: EngineOptions) -> Self {
        Self {
            problem: ProblemVariables::new(),
            variables: Vec::new(),
            constraints: Vec::new(),
            objective: None,
            options,
        }
    }

    fn to_expression(&self, expression: &LinearExpression) -> Expression {
        expression
            .terms()
            .iter()
            .map(|&(handle, coefficient)| coefficient * self.variables[handle.index()])
            .fold(Expression::from(0.0), |acc, term| acc + term)
    }
}

impl Default for HighsEngine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}

impl SolvingEngine for HighsEngine {
    fn declare_binary(&mut self, name: &str) -> VariableHandle {
        let handle = VariableHandle::new(self.variables.len());
        let var = self.problem.add(variable().binary().name(name));
        self.variables.push(var);
        handle
    }

    fn add_constraint(&mut self, expression: LinearExpression, relation: Relation, bound: f64) {
        let lhs = self.to_expression(&expression);
        let c = match relation {
            Relation::LessOrEqual => constraint!(lhs <= bound),
            Relation::Equal => constraint!(lhs == bound),
            Relation::GreaterOrEqual => constraint!(lhs >= bound),
        };
        self.constraints.push(c);
    }

    fn set_objective(&mut self, expression: LinearExpression, direction: Direction) {
        let objective = self.to_expression(&expression);
        self.objective = Some((objective, direction));
    }

    fn solve(self, time_limit: Option<Duration>) -> Result<EngineOutcome, EngineError> {
        let HighsEngine {
            problem,
            variables,
            constraints,
            objective,
            options,
        } = self;
        let (objective, direction) =
            objective.unwrap_or_else(|| (Expression::from(0.0), Direction::Maximise));

        let unsolved = match direction {
            Direction::Maximise => problem.maximise(objective),
            Direction::Minimise => problem.minimise(objective),
        };
        let mut model = unsolved
            .using(default_solver)
            .set_option("threads", options.threads)
            .set_option("random_seed", options.random_seed)
            .set_option(
                "log_to_console",
                if options.log_to_console { "true" } else { "false" },
            );
        if let Some(limit) = time_limit {
            model = model.set_option("time_limit", limit.as_secs_f64());
        }

        debug!(
            "Handing {} variables and {} constraints to HiGHS.",
            variables.len(),
            constraints.len()
        );
        for c in constraints {
            model.add_constraint(c);
        }

        match model.solve() {
            Ok(solution) => {
                let values =
                    PrimalValues::new(variables.iter().map(|v| solution.value(*v)).collect());
                match solution.status() {
                    SolutionStatus::Optimal => Ok(EngineOutcome::Optimal(values)),
                    SolutionStatus::GapLimit => {
                        info!("HiGHS stopped within its MIP gap tolerance.");
                        Ok(EngineOutcome::GapReached(values))
                    }
                    _ => {
                        info!("HiGHS hit the time limit before proving optimality.");
                        Ok(EngineOutcome::LimitReached(values))
                    }
                }
            }
            Err(ResolutionError::Infeasible) => Ok(EngineOutcome::Infeasible),
            // good_lp reports a deadline with no feasible point as a generic error
            Err(ResolutionError::Other("NoSolutionFound")) if time_limit.is_some() => {
                info!("HiGHS hit the time limit without a feasible assignment.");
                Ok(EngineOutcome::TimedOut)
            }
            Err(e) => Err(EngineError(e.to_string())),
        }
    }
}
