//! Views derived from a solved timetable.
//!
//! Nothing here mutates the [`Solution`]; every view is recomputed on demand,
//! so calling any of these twice on the same solution gives the same result.

use itertools::iproduct;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::data::{ClassId, CoverageMode, DayIndex, HourIndex, ProfessorId, Professor, TimetableInput};
use crate::solution::Solution;

/// Weekly grid of one class: `cells[day][hour]` is the professor teaching it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassGrid {
    pub class: ClassId,
    pub name: String,
    pub cells: Vec<Vec<Option<ProfessorId>>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "state", content = "class")]
pub enum AgendaCell {
    Teaching(ClassId),
    Free,
    Unavailable,
}

/// Weekly agenda of one professor: `cells[day][hour]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessorAgenda {
    pub professor: ProfessorId,
    pub cells: Vec<Vec<AgendaCell>>,
}

/// Hours a professor teaches on preferred/avoided days and hours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SatisfactionCounts {
    pub preferred_days: u32,
    pub avoided_days: u32,
    pub preferred_hours: u32,
    pub avoided_hours: u32,
}

/// Counts as a share of the professor's assigned hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SatisfactionRatios {
    pub preferred_days: f64,
    pub avoided_days: f64,
    pub preferred_hours: f64,
    pub avoided_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessorSatisfaction {
    pub professor: ProfessorId,
    pub assigned_hours: u32,
    pub required_hours: u32,
    pub counts: SatisfactionCounts,
    pub ratios: Option<SatisfactionRatios>,
}

impl ProfessorSatisfaction {
    /// Ratios are left out for professors with nothing to teach or nothing assigned.
    fn ratios(counts: &SatisfactionCounts, assigned: u32, required: u32) -> Option<SatisfactionRatios> {
        if required == 0 || assigned == 0 {
            return None;
        }
        let share = |count: u32| f64::from(count) / f64::from(assigned);
        Some(SatisfactionRatios {
            preferred_days: share(counts.preferred_days),
            avoided_days: share(counts.avoided_days),
            preferred_hours: share(counts.preferred_hours),
            avoided_hours: share(counts.avoided_hours),
        })
    }
}

/// Totals across all professors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SatisfactionSummary {
    pub assigned_hours: u32,
    pub required_hours: u32,
    pub counts: SatisfactionCounts,
}

pub fn class_grids(solution: &Solution, input: &TimetableInput) -> Vec<ClassGrid> {
    let dims = solution.dimensions();
    (0..dims.classes())
        .map(|c| {
            let mut cells: Vec<Vec<Option<ProfessorId>>> = (0..dims.days())
                .map(|d| vec![None; dims.hours_in_day(d)])
                .collect();
            for (p, d, h, class) in solution.assignments() {
                if class != c {
                    continue;
                }
                let cell = &mut cells[d][h];
                debug_assert!(cell.is_none(), "class {c} taught twice at ({d}, {h})");
                cell.get_or_insert(p);
            }
            ClassGrid {
                class: c,
                name: input.class_name(c),
                cells,
            }
        })
        .collect()
}

pub fn professor_agendas(solution: &Solution, input: &TimetableInput) -> Vec<ProfessorAgenda> {
    let dims = solution.dimensions();
    input
        .professors
        .iter()
        .enumerate()
        .map(|(p, professor)| {
            let cells = (0..dims.days())
                .map(|d| {
                    (0..dims.hours_in_day(d))
                        .map(|h| match solution.class_at(p, d, h) {
                            Some(c) => AgendaCell::Teaching(c),
                            None if is_unavailable(professor, d, h) => AgendaCell::Unavailable,
                            None => AgendaCell::Free,
                        })
                        .collect()
                })
                .collect();
            ProfessorAgenda { professor: p, cells }
        })
        .collect()
}

pub fn satisfaction(solution: &Solution, input: &TimetableInput) -> Vec<ProfessorSatisfaction> {
    let mut stats: Vec<(SatisfactionCounts, u32)> =
        vec![(SatisfactionCounts::default(), 0); input.number_of_professors()];

    let preferences: Vec<PreferenceSets> = input.professors.iter().map(PreferenceSets::of).collect();

    for (p, d, h, _) in solution.assignments() {
        let sets = &preferences[p];
        let (counts, assigned) = &mut stats[p];
        *assigned += 1;
        counts.preferred_days += u32::from(sets.preferred_days.contains(&d));
        counts.avoided_days += u32::from(sets.avoided_days.contains(&d));
        counts.preferred_hours += u32::from(sets.preferred_hours.contains(&h));
        counts.avoided_hours += u32::from(sets.avoided_hours.contains(&h));
    }

    stats
        .into_iter()
        .zip(&input.professors)
        .enumerate()
        .map(|(p, ((counts, assigned), professor))| {
            let required = professor.total_required_hours();
            ProfessorSatisfaction {
                professor: p,
                assigned_hours: assigned,
                required_hours: required,
                ratios: ProfessorSatisfaction::ratios(&counts, assigned, required),
                counts,
            }
        })
        .collect()
}

/// A professor's preference lists as sets; repeated entries count once.
struct PreferenceSets {
    preferred_days: BTreeSet<DayIndex>,
    avoided_days: BTreeSet<DayIndex>,
    preferred_hours: BTreeSet<HourIndex>,
    avoided_hours: BTreeSet<HourIndex>,
}

impl PreferenceSets {
    fn of(professor: &Professor) -> Self {
        Self {
            preferred_days: professor.preferred_days.iter().copied().collect(),
            avoided_days: professor.avoided_days.iter().copied().collect(),
            preferred_hours: professor.preferred_hours.iter().copied().collect(),
            avoided_hours: professor.avoided_hours.iter().copied().collect(),
        }
    }
}

pub fn summarize(per_professor: &[ProfessorSatisfaction]) -> SatisfactionSummary {
    per_professor
        .iter()
        .fold(SatisfactionSummary::default(), |mut acc, s| {
            acc.assigned_hours += s.assigned_hours;
            acc.required_hours += s.required_hours;
            acc.counts.preferred_days += s.counts.preferred_days;
            acc.counts.avoided_days += s.counts.avoided_days;
            acc.counts.preferred_hours += s.counts.preferred_hours;
            acc.counts.avoided_hours += s.counts.avoided_hours;
            acc
        })
}

fn is_unavailable(professor: &Professor, day: DayIndex, hour: HourIndex) -> bool {
    professor
        .unavailable
        .iter()
        .any(|slot| slot.day == day && slot.hour == hour)
}

/// A hard constraint the assignment breaks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    ProfessorDoubleBooked { professor: ProfessorId, day: DayIndex, hour: HourIndex },
    ClassDoubleBooked { class: ClassId, day: DayIndex, hour: HourIndex },
    Coverage { professor: ProfessorId, class: ClassId, assigned: u32, required: u32 },
    DailyCap { professor: ProfessorId, day: DayIndex, class: ClassId, assigned: u32, cap: u32 },
    Unavailable { professor: ProfessorId, day: DayIndex, hour: HourIndex },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::ProfessorDoubleBooked { professor, day, hour } => {
                write!(f, "professor {professor} teaches more than one class at day {day}, hour {hour}")
            }
            Violation::ClassDoubleBooked { class, day, hour } => {
                write!(f, "class {class} has more than one professor at day {day}, hour {hour}")
            }
            Violation::Coverage { professor, class, assigned, required } => write!(
                f,
                "professor {professor} teaches class {class} for {assigned} hours against a requirement of {required}"
            ),
            Violation::DailyCap { professor, day, class, assigned, cap } => write!(
                f,
                "professor {professor} teaches class {class} for {assigned} hours on day {day}, cap is {cap}"
            ),
            Violation::Unavailable { professor, day, hour } => {
                write!(f, "professor {professor} is scheduled while unavailable at day {day}, hour {hour}")
            }
        }
    }
}

/// Re-checks every hard constraint against the assignment.
pub fn verify(
    solution: &Solution,
    input: &TimetableInput,
    mode: CoverageMode,
) -> Result<(), Vec<Violation>> {
    let dims = solution.dimensions();
    let week: Vec<_> = dims.week().collect();
    let mut violations = Vec::new();

    for (p, professor) in input.professors.iter().enumerate() {
        for slot in &week {
            let classes = (0..dims.classes())
                .filter(|&c| solution.is_assigned(p, slot.day, slot.hour, c))
                .count();
            if classes > 1 {
                violations.push(Violation::ProfessorDoubleBooked {
                    professor: p,
                    day: slot.day,
                    hour: slot.hour,
                });
            }
        }

        for (c, &required) in professor.required_hours.iter().enumerate() {
            let assigned = week
                .iter()
                .filter(|slot| solution.is_assigned(p, slot.day, slot.hour, c))
                .count() as u32;
            let broken = match mode {
                CoverageMode::Relaxed => assigned > required,
                CoverageMode::Strict => assigned != required,
            };
            if broken {
                violations.push(Violation::Coverage {
                    professor: p,
                    class: c,
                    assigned,
                    required,
                });
            }
        }

        for (d, (c, &cap)) in iproduct!(0..dims.days(), professor.daily_caps.iter().enumerate()) {
            let assigned = (0..dims.hours_in_day(d))
                .filter(|&h| solution.is_assigned(p, d, h, c))
                .count() as u32;
            if assigned > cap {
                violations.push(Violation::DailyCap {
                    professor: p,
                    day: d,
                    class: c,
                    assigned,
                    cap,
                });
            }
        }

        let unavailable: BTreeSet<_> = professor.unavailable.iter().collect();
        for slot in unavailable {
            if solution.class_at(p, slot.day, slot.hour).is_some() {
                violations.push(Violation::Unavailable {
                    professor: p,
                    day: slot.day,
                    hour: slot.hour,
                });
            }
        }
    }

    for slot in &week {
        for c in 0..dims.classes() {
            let professors = (0..dims.professors())
                .filter(|&p| solution.is_assigned(p, slot.day, slot.hour, c))
                .count();
            if professors > 1 {
                violations.push(Violation::ClassDoubleBooked {
                    class: c,
                    day: slot.day,
                    hour: slot.hour,
                });
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}
