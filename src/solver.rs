use log::{info, trace, warn};
use std::time::{Duration, Instant};

use crate::constraints::{self, ConstraintCounts};
use crate::data::{ClassId, DayIndex, HourIndex, ProfessorId, TimetableConfig, TimetableInput, TimetableReport};
use crate::engine::{Direction, EngineOutcome, HighsEngine, PrimalValues, SolvingEngine};
use crate::error::{ConfigurationError, EngineError, TimetableError};
use crate::interpret::{self, ClassGrid, ProfessorAgenda, ProfessorSatisfaction, SatisfactionSummary};
use crate::objective::Objective;
use crate::solution::{Solution, SolveStatus};
use crate::validation;
use crate::variables::VariableSpace;

enum State<E> {
    Unsolved(E),
    /// The engine has been consumed but produced no solution.
    Attempted,
    Solved(Solution),
}

/// One weekly timetable model: built once, solved at most once.
pub struct Timetable<'a, E: SolvingEngine = HighsEngine> {
    input: &'a TimetableInput,
    config: &'a TimetableConfig,
    space: VariableSpace,
    objective: Objective,
    constraints: ConstraintCounts,
    state: State<E>,
}

impl<'a> Timetable<'a, HighsEngine> {
    /// Builds the model on a fresh HiGHS engine.
    pub fn build(
        input: &'a TimetableInput,
        config: &'a TimetableConfig,
    ) -> Result<Self, ConfigurationError> {
        Self::with_engine(input, config, HighsEngine::new(config.engine.clone()))
    }
}

impl<'a, E: SolvingEngine> Timetable<'a, E> {
    /// Validates the dataset, then declares variables, constraints and the
    /// objective on `engine`.
    pub fn with_engine(
        input: &'a TimetableInput,
        config: &'a TimetableConfig,
        mut engine: E,
    ) -> Result<Self, ConfigurationError> {
        let dims = validation::validate(input, config)?;
        info!(
            "Setting up timetable model with {} professors, {} days, {} slots and {} classes...",
            dims.professors(),
            dims.days(),
            dims.slots(),
            dims.classes()
        );

        let space = VariableSpace::create(&mut engine, dims);
        let constraints = constraints::add_all(&mut engine, &space, input, config.coverage_mode);
        // every variable exists by now
        let objective = Objective::build(&space, input, config);
        engine.set_objective(objective.expression(&space), Direction::Maximise);

        Ok(Self {
            input,
            config,
            space,
            objective,
            constraints,
            state: State::Unsolved(engine),
        })
    }

    pub fn variables(&self) -> &VariableSpace {
        &self.space
    }

    pub fn constraint_counts(&self) -> ConstraintCounts {
        self.constraints
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn is_solved(&self) -> bool {
        matches!(self.state, State::Solved(_))
    }

    /// Hands the model to the engine. Only the first call reaches the engine;
    /// later calls fail with [`TimetableError::AlreadySolved`].
    pub fn solve(&mut self) -> Result<SolveStatus, TimetableError> {
        let engine = match std::mem::replace(&mut self.state, State::Attempted) {
            State::Unsolved(engine) => engine,
            previous => {
                self.state = previous;
                return Err(TimetableError::AlreadySolved);
            }
        };

        let time_limit = self.config.time_limit();
        info!("Starting MILP solver...");
        let start_time = Instant::now();
        let outcome = engine.solve(time_limit)?;
        info!("Solver finished in {:.2?}", start_time.elapsed());

        let solution = match outcome {
            EngineOutcome::Optimal(values) => self.solution_from(&values, SolveStatus::Optimal),
            EngineOutcome::LimitReached(values) | EngineOutcome::GapReached(values) => {
                let candidate = self.solution_from(&values, SolveStatus::Suboptimal);
                match interpret::verify(&candidate, self.input, self.config.coverage_mode) {
                    Ok(()) => candidate,
                    Err(violations) => {
                        trace!("Early-stopped assignment breaks {} constraints.", violations.len());
                        return Err(no_usable_solution(time_limit));
                    }
                }
            }
            EngineOutcome::TimedOut => return Err(no_usable_solution(time_limit)),
            EngineOutcome::Infeasible => {
                warn!("Solver reports the timetable model is infeasible.");
                return Err(TimetableError::Infeasible);
            }
        };

        let status = solution.status();
        info!(
            "{:?} timetable assigns {} hours, objective value {}.",
            status,
            solution.total_assigned(),
            solution.objective_value()
        );
        self.state = State::Solved(solution);
        Ok(status)
    }

    fn solution_from(&self, values: &PrimalValues, status: SolveStatus) -> Solution {
        let assigned = Solution::assignment_from_primal(&self.space, values);
        let objective_value = self.objective.evaluate(&assigned);
        Solution::new(self.space.dimensions().clone(), assigned, status, objective_value)
    }

    pub fn solution(&self) -> Result<&Solution, TimetableError> {
        match &self.state {
            State::Solved(solution) => Ok(solution),
            _ => Err(TimetableError::NotSolved),
        }
    }

    /// Raw lookup by tuple; `Ok(None)` for a tuple outside the grid.
    pub fn value(
        &self,
        p: ProfessorId,
        d: DayIndex,
        h: HourIndex,
        c: ClassId,
    ) -> Result<Option<bool>, TimetableError> {
        Ok(self.solution()?.value(p, d, h, c))
    }

    pub fn class_grids(&self) -> Result<Vec<ClassGrid>, TimetableError> {
        Ok(interpret::class_grids(self.solution()?, self.input))
    }

    pub fn professor_agendas(&self) -> Result<Vec<ProfessorAgenda>, TimetableError> {
        Ok(interpret::professor_agendas(self.solution()?, self.input))
    }

    pub fn satisfaction(&self) -> Result<Vec<ProfessorSatisfaction>, TimetableError> {
        Ok(interpret::satisfaction(self.solution()?, self.input))
    }

    pub fn summary(&self) -> Result<SatisfactionSummary, TimetableError> {
        Ok(interpret::summarize(&self.satisfaction()?))
    }

    pub fn report(&self) -> Result<TimetableReport, TimetableError> {
        let solution = self.solution()?;
        let satisfaction = interpret::satisfaction(solution, self.input);
        let summary = interpret::summarize(&satisfaction);
        Ok(TimetableReport {
            status: solution.status(),
            objective_value: solution.objective_value(),
            assigned_hours: summary.assigned_hours,
            required_hours: summary.required_hours,
            days: (0..self.input.number_of_days)
                .map(|d| self.input.day_name(d))
                .collect(),
            classes: interpret::class_grids(solution, self.input),
            professors: interpret::professor_agendas(solution, self.input),
            satisfaction,
            summary,
        })
    }
}

/// Builds, solves and interprets a timetable with the HiGHS backend.
pub fn solve(
    input: &TimetableInput,
    config: &TimetableConfig,
) -> Result<TimetableReport, TimetableError> {
    let mut timetable = Timetable::build(input, config)?;
    timetable.solve()?;
    timetable.report()
}

// only a run with a deadline can time out; otherwise the backend misbehaved
fn no_usable_solution(time_limit: Option<Duration>) -> TimetableError {
    match time_limit {
        Some(limit) => {
            warn!("No usable solution within the time limit.");
            TimetableError::Timeout(limit)
        }
        None => {
            warn!("Solver stopped early without a usable solution.");
            TimetableError::Engine(EngineError(
                "solver stopped early without a usable assignment".into(),
            ))
        }
    }
}
