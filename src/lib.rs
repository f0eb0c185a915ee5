//! Weekly teaching timetables as a 0-1 integer program.
//!
//! A [`Timetable`] declares one binary variable per (professor, day, hour,
//! class), adds the hard scheduling rules as linear constraints, maximises a
//! weighted coverage and preference objective through a [`SolvingEngine`]
//! and turns the solved assignment back into class grids, professor agendas
//! and preference statistics.

pub mod constraints;
pub mod data;
pub mod engine;
pub mod error;
pub mod interpret;
pub mod objective;
pub mod server;
pub mod solution;
pub mod solver;
pub mod validation;
pub mod variables;

pub use data::{
    CoverageMode, EngineOptions, HoursPerDay, Professor, Slot, TimetableConfig, TimetableInput,
    TimetableReport, WeightTable,
};
pub use engine::{HighsEngine, SolvingEngine};
pub use error::{ConfigurationError, EngineError, TimetableError};
pub use solution::{Solution, SolveStatus};
pub use solver::{Timetable, solve};
