//! Hard constraints of the timetable.
//!
//! Each family only reads the variable space and the dataset and emits its
//! own rows, so the families can be added in any order.

use itertools::{Itertools, iproduct};
use log::info;

use crate::data::{CoverageMode, TimetableInput};
use crate::engine::{LinearExpression, Relation, SolvingEngine};
use crate::variables::VariableSpace;

/// Number of rows each family emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConstraintCounts {
    pub professor_exclusivity: usize,
    pub class_exclusivity: usize,
    pub coverage: usize,
    pub daily_caps: usize,
    pub unavailability: usize,
}

impl ConstraintCounts {
    pub fn total(&self) -> usize {
        self.professor_exclusivity
            + self.class_exclusivity
            + self.coverage
            + self.daily_caps
            + self.unavailability
    }
}

pub fn add_all<E: SolvingEngine>(
    engine: &mut E,
    space: &VariableSpace,
    input: &TimetableInput,
    mode: CoverageMode,
) -> ConstraintCounts {
    let counts = ConstraintCounts {
        professor_exclusivity: add_professor_exclusivity(engine, space),
        class_exclusivity: add_class_exclusivity(engine, space),
        coverage: add_material_coverage(engine, space, input, mode),
        daily_caps: add_daily_caps(engine, space, input),
        unavailability: add_unavailability(engine, space, input),
    };
    info!("Added {} hard constraints.", counts.total());
    counts
}

/// No professor teaches two classes in the same slot.
pub fn add_professor_exclusivity<E: SolvingEngine>(engine: &mut E, space: &VariableSpace) -> usize {
    info!("Adding 'no professor overlap' constraints...");
    let dims = space.dimensions();
    let mut added = 0;
    for p in 0..dims.professors() {
        for slot in dims.week() {
            let busy: LinearExpression = space.slot(p, slot.day, slot.hour).iter().copied().collect();
            engine.add_constraint(busy, Relation::LessOrEqual, 1.0);
            added += 1;
        }
    }
    added
}

/// No class is taught by two professors in the same slot.
pub fn add_class_exclusivity<E: SolvingEngine>(engine: &mut E, space: &VariableSpace) -> usize {
    info!("Adding 'no class overlap' constraints...");
    let dims = space.dimensions();
    let slots = dims.week().collect_vec();
    let mut added = 0;
    for (slot, c) in iproduct!(slots, 0..dims.classes()) {
        let taught: LinearExpression = space.class_slot(slot.day, slot.hour, c).collect();
        engine.add_constraint(taught, Relation::LessOrEqual, 1.0);
        added += 1;
    }
    added
}

/// Weekly hours of a class per professor are bounded by (or, in strict mode,
/// equal to) the professor's requirement.
pub fn add_material_coverage<E: SolvingEngine>(
    engine: &mut E,
    space: &VariableSpace,
    input: &TimetableInput,
    mode: CoverageMode,
) -> usize {
    info!("Adding '{mode:?} material coverage' constraints...");
    let relation = match mode {
        CoverageMode::Relaxed => Relation::LessOrEqual,
        CoverageMode::Strict => Relation::Equal,
    };
    let mut added = 0;
    for (p, professor) in input.professors.iter().enumerate() {
        for (c, &required) in professor.required_hours.iter().enumerate() {
            let week: LinearExpression = space.class_week(p, c).collect();
            engine.add_constraint(week, relation, f64::from(required));
            added += 1;
        }
    }
    added
}

/// Hours of a class a professor teaches in one day stay under the daily cap.
pub fn add_daily_caps<E: SolvingEngine>(
    engine: &mut E,
    space: &VariableSpace,
    input: &TimetableInput,
) -> usize {
    info!("Adding 'max hours per day' constraints...");
    let dims = space.dimensions();
    let mut added = 0;
    for (p, professor) in input.professors.iter().enumerate() {
        for (d, (c, &cap)) in iproduct!(0..dims.days(), professor.daily_caps.iter().enumerate()) {
            let day: LinearExpression = space.class_day(p, d, c).collect();
            engine.add_constraint(day, Relation::LessOrEqual, f64::from(cap));
            added += 1;
        }
    }
    added
}

/// Nothing is scheduled in a slot the professor is unavailable for.
pub fn add_unavailability<E: SolvingEngine>(
    engine: &mut E,
    space: &VariableSpace,
    input: &TimetableInput,
) -> usize {
    info!("Adding 'unavailable hours' constraints...");
    let mut added = 0;
    for (p, professor) in input.professors.iter().enumerate() {
        // duplicates would only repeat the same row
        for slot in professor.unavailable.iter().sorted().dedup() {
            let busy: LinearExpression = space.slot(p, slot.day, slot.hour).iter().copied().collect();
            engine.add_constraint(busy, Relation::Equal, 0.0);
            added += 1;
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{HoursPerDay, Professor, Slot};
    use crate::engine::testing::RecordingEngine;
    use crate::variables::Dimensions;

    fn input() -> TimetableInput {
        TimetableInput {
            professors: vec![
                Professor {
                    required_hours: vec![3, 0],
                    daily_caps: vec![2, 0],
                    unavailable: vec![Slot::new(0, 1), Slot::new(0, 1), Slot::new(1, 0)],
                    ..Default::default()
                },
                Professor {
                    required_hours: vec![1, 2],
                    daily_caps: vec![1, 1],
                    ..Default::default()
                },
            ],
            number_of_days: 2,
            hours_per_day: HoursPerDay::PerDay(vec![3, 2]),
            number_of_classes: 2,
            ..Default::default()
        }
    }

    fn build(mode: CoverageMode) -> (RecordingEngine, VariableSpace, ConstraintCounts) {
        let data = input();
        let dims = Dimensions::new(2, 2, &data.hours_per_day, 2).unwrap();
        let mut engine = RecordingEngine::default();
        let space = VariableSpace::create(&mut engine, dims);
        let counts = add_all(&mut engine, &space, &data, mode);
        (engine, space, counts)
    }

    #[test]
    fn test_family_row_counts() {
        let (engine, _, counts) = build(CoverageMode::Relaxed);
        // 2 professors x 5 slots
        assert_eq!(counts.professor_exclusivity, 10);
        // 5 slots x 2 classes
        assert_eq!(counts.class_exclusivity, 10);
        assert_eq!(counts.coverage, 4);
        // 2 professors x 2 days x 2 classes
        assert_eq!(counts.daily_caps, 8);
        // the duplicated (0, 1) entry yields a single row
        assert_eq!(counts.unavailability, 2);
        assert_eq!(engine.constraints.len(), counts.total());
    }

    #[test]
    fn test_exclusivity_rows_cover_the_right_variables() {
        let (engine, space, _) = build(CoverageMode::Relaxed);
        let (first, relation, bound) = &engine.constraints[0];
        assert_eq!(*relation, Relation::LessOrEqual);
        assert_eq!(*bound, 1.0);
        let vars: Vec<_> = first.terms().iter().map(|(v, _)| *v).collect();
        assert_eq!(vars, space.slot(0, 0, 0).to_vec());

        let (class_row, _, _) = &engine.constraints[10];
        let vars: Vec<_> = class_row.terms().iter().map(|(v, _)| *v).collect();
        assert_eq!(vars, vec![space.get(0, 0, 0, 0), space.get(1, 0, 0, 0)]);
    }

    #[test]
    fn test_coverage_relation_follows_mode() {
        let (relaxed, _, _) = build(CoverageMode::Relaxed);
        let (strict, _, _) = build(CoverageMode::Strict);
        let coverage_rows = 20..24;

        assert!(relaxed.constraints[coverage_rows.clone()]
            .iter()
            .all(|(_, r, _)| *r == Relation::LessOrEqual));
        assert!(strict.constraints[coverage_rows.clone()]
            .iter()
            .all(|(_, r, _)| *r == Relation::Equal));

        let bounds: Vec<f64> = strict.constraints[coverage_rows]
            .iter()
            .map(|(_, _, b)| *b)
            .collect();
        assert_eq!(bounds, vec![3.0, 0.0, 1.0, 2.0]);
        // each coverage row spans the whole week
        assert_eq!(strict.constraints[20].0.len(), 5);
    }

    #[test]
    fn test_daily_cap_rows_follow_day_length() {
        let (engine, space, _) = build(CoverageMode::Relaxed);
        let daily = &engine.constraints[24..32];
        assert_eq!(daily[0].0.len(), 3);
        assert_eq!(daily[0].2, 2.0);
        // professor 0, day 1 has only two hours
        assert_eq!(daily[2].0.len(), 2);
        let vars: Vec<_> = daily[2].0.terms().iter().map(|(v, _)| *v).collect();
        assert_eq!(vars, vec![space.get(0, 1, 0, 0), space.get(0, 1, 1, 0)]);
    }

    #[test]
    fn test_unavailability_rows_force_zero() {
        let (engine, space, _) = build(CoverageMode::Relaxed);
        let rows = &engine.constraints[32..];
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|(_, r, b)| *r == Relation::Equal && *b == 0.0));
        let vars: Vec<_> = rows[0].0.terms().iter().map(|(v, _)| *v).collect();
        assert_eq!(vars, space.slot(0, 0, 1).to_vec());
    }
}
