use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::interpret::{ClassGrid, ProfessorAgenda, ProfessorSatisfaction, SatisfactionSummary};
use crate::solution::SolveStatus;

// Type aliases for clarity
pub type ProfessorId = usize;
pub type ClassId = usize;
pub type DayIndex = usize;
pub type HourIndex = usize;

/// A single teaching slot in the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub struct Slot {
    pub day: DayIndex,
    pub hour: HourIndex,
}

impl Slot {
    pub fn new(day: DayIndex, hour: HourIndex) -> Self {
        Self { day, hour }
    }
}

/// Number of teaching hours in each day, either the same for every day or
/// given day by day.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum HoursPerDay {
    Uniform(usize),
    PerDay(Vec<usize>),
}

impl Default for HoursPerDay {
    fn default() -> Self {
        HoursPerDay::Uniform(0)
    }
}

/// A professor with their teaching load, hard unavailability and soft preferences.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Professor {
    /// Weekly hours this professor should teach each class, indexed by class.
    pub required_hours: Vec<u32>,
    /// Maximum hours of each class this professor may teach in a single day.
    pub daily_caps: Vec<u32>,
    #[serde(default)]
    pub unavailable: Vec<Slot>,
    #[serde(default)]
    pub preferred_days: Vec<DayIndex>,
    #[serde(default)]
    pub avoided_days: Vec<DayIndex>,
    #[serde(default)]
    pub preferred_hours: Vec<HourIndex>,
    #[serde(default)]
    pub avoided_hours: Vec<HourIndex>,
}

impl Professor {
    pub fn total_required_hours(&self) -> u32 {
        self.required_hours.iter().sum()
    }
}

/// The complete dataset for one timetable.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableInput {
    pub professors: Vec<Professor>,
    pub number_of_days: usize,
    pub hours_per_day: HoursPerDay,
    pub number_of_classes: usize,
    #[serde(default)]
    pub class_names: Vec<String>,
    #[serde(default)]
    pub day_names: Vec<String>,
}

impl TimetableInput {
    pub fn number_of_professors(&self) -> usize {
        self.professors.len()
    }

    pub fn class_name(&self, class: ClassId) -> String {
        self.class_names
            .get(class)
            .cloned()
            .unwrap_or_else(|| format!("Class {class}"))
    }

    pub fn day_name(&self, day: DayIndex) -> String {
        self.day_names
            .get(day)
            .cloned()
            .unwrap_or_else(|| format!("Day {day}"))
    }
}

/// How the weekly required hours bound a professor's assignments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageMode {
    /// Assigned hours may fall short of the requirement; always feasible.
    #[default]
    Relaxed,
    /// Assigned hours must equal the requirement; may be infeasible.
    Strict,
}

/// Objective weights. Avoidance weights are subtracted when the objective is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WeightTable {
    pub coverage: f64,
    pub preferred_days: f64,
    pub avoided_days: f64,
    pub preferred_hours: f64,
    pub avoided_hours: f64,
}

impl Default for WeightTable {
    fn default() -> Self {
        Self {
            coverage: 100.0,
            preferred_days: 2.0,
            avoided_days: 2.0,
            preferred_hours: 0.5,
            avoided_hours: 0.5,
        }
    }
}

impl WeightTable {
    pub fn named(&self) -> [(&'static str, f64); 5] {
        [
            ("coverage", self.coverage),
            ("preferredDays", self.preferred_days),
            ("avoidedDays", self.avoided_days),
            ("preferredHours", self.preferred_hours),
            ("avoidedHours", self.avoided_hours),
        ]
    }

    /// Largest amount a single assigned hour can gain or lose through
    /// preference terms, before priority multipliers.
    pub fn preference_swing(&self) -> f64 {
        self.preferred_days.abs()
            + self.avoided_days.abs()
            + self.preferred_hours.abs()
            + self.avoided_hours.abs()
    }
}

/// Options forwarded to the HiGHS backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineOptions {
    pub threads: i32,
    pub random_seed: i32,
    pub log_to_console: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        // single thread and a fixed seed keep runs reproducible
        Self {
            threads: 1,
            random_seed: 1234,
            log_to_console: false,
        }
    }
}

/// Model configuration, built once and never mutated by the model builder.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimetableConfig {
    pub coverage_mode: CoverageMode,
    pub weights: WeightTable,
    /// Per-professor multipliers on preference and avoidance terms; missing entries are 1.
    pub priorities: HashMap<ProfessorId, f64>,
    pub time_limit_secs: Option<f64>,
    pub engine: EngineOptions,
}

impl TimetableConfig {
    pub fn priority(&self, professor: ProfessorId) -> f64 {
        self.priorities.get(&professor).copied().unwrap_or(1.0)
    }

    pub fn max_priority(&self) -> f64 {
        self.priorities.values().copied().fold(1.0, f64::max)
    }

    /// Solve deadline; `None` when unset or not representable.
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}

/// The final output of the solver.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableReport {
    pub status: SolveStatus,
    pub objective_value: f64,
    pub assigned_hours: u32,
    pub required_hours: u32,
    pub days: Vec<String>,
    pub classes: Vec<ClassGrid>,
    pub professors: Vec<ProfessorAgenda>,
    pub satisfaction: Vec<ProfessorSatisfaction>,
    pub summary: SatisfactionSummary,
}
