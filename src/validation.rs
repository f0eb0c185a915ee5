//! Dataset and configuration checks.
//!
//! Every index used by the model builder is checked here, so constraint and
//! objective generation can index the variable space without failing.

use log::{debug, warn};

use crate::data::{ProfessorId, TimetableConfig, TimetableInput};
use crate::error::ConfigurationError;
use crate::variables::Dimensions;

/// Validates the dataset and configuration and returns the grid they describe.
pub fn validate(
    input: &TimetableInput,
    config: &TimetableConfig,
) -> Result<Dimensions, ConfigurationError> {
    let dims = Dimensions::new(
        input.number_of_professors(),
        input.number_of_days,
        &input.hours_per_day,
        input.number_of_classes,
    )?;

    check_labels(input)?;
    for (p, professor) in input.professors.iter().enumerate() {
        check_len(
            format!("professor {p} requiredHours"),
            dims.classes(),
            professor.required_hours.len(),
        )?;
        check_len(
            format!("professor {p} dailyCaps"),
            dims.classes(),
            professor.daily_caps.len(),
        )?;

        for slot in &professor.unavailable {
            check_index(format!("professor {p} unavailable day"), slot.day, dims.days())?;
            check_index(
                format!("professor {p} unavailable hour (day {})", slot.day),
                slot.hour,
                dims.hours_in_day(slot.day),
            )?;
        }
        for &day in professor.preferred_days.iter().chain(&professor.avoided_days) {
            check_index(format!("professor {p} preference day"), day, dims.days())?;
        }
        for &hour in professor.preferred_hours.iter().chain(&professor.avoided_hours) {
            check_index(format!("professor {p} preference hour"), hour, dims.max_hours())?;
        }
        note_overlaps(p, &professor.preferred_days, &professor.avoided_days, "day");
        note_overlaps(p, &professor.preferred_hours, &professor.avoided_hours, "hour");
    }

    check_config(config, dims.professors())?;
    Ok(dims)
}

fn check_labels(input: &TimetableInput) -> Result<(), ConfigurationError> {
    if !input.class_names.is_empty() {
        check_len("classNames".into(), input.number_of_classes, input.class_names.len())?;
    }
    if !input.day_names.is_empty() {
        check_len("dayNames".into(), input.number_of_days, input.day_names.len())?;
    }
    Ok(())
}

fn check_config(config: &TimetableConfig, professors: usize) -> Result<(), ConfigurationError> {
    for (name, value) in config.weights.named() {
        if !value.is_finite() {
            return Err(ConfigurationError::InvalidWeight { name, value });
        }
    }

    for (&professor, &value) in &config.priorities {
        check_index("priority professor".into(), professor, professors)?;
        if !value.is_finite() || value <= 0.0 {
            return Err(ConfigurationError::InvalidPriority { professor, value });
        }
    }

    if let Some(secs) = config.time_limit_secs {
        if !secs.is_finite() || secs <= 0.0 {
            return Err(ConfigurationError::InvalidTimeLimit(secs));
        }
    }

    // a dominated coverage weight lets the optimizer drop hours to satisfy preferences
    let swing = config.max_priority() * config.weights.preference_swing();
    if config.weights.coverage <= swing {
        warn!(
            "Coverage weight {} does not dominate the per-hour preference swing {}; classes may be left uncovered to satisfy preferences.",
            config.weights.coverage, swing
        );
    }
    Ok(())
}

fn check_len(field: String, expected: usize, actual: usize) -> Result<(), ConfigurationError> {
    if expected != actual {
        return Err(ConfigurationError::ShapeMismatch {
            field,
            expected,
            actual,
        });
    }
    Ok(())
}

fn check_index(field: String, index: usize, limit: usize) -> Result<(), ConfigurationError> {
    if index >= limit {
        return Err(ConfigurationError::IndexOutOfRange {
            field,
            index,
            limit,
        });
    }
    Ok(())
}

// overlapping preferred and avoided entries are allowed; their weights net out
fn note_overlaps(professor: ProfessorId, preferred: &[usize], avoided: &[usize], kind: &str) {
    for value in preferred.iter().filter(|v| avoided.contains(v)) {
        debug!("Professor {professor} both prefers and avoids {kind} {value}; contributions will net out.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{HoursPerDay, Professor, Slot};
    use crate::variables::MAX_VARIABLES;

    fn input() -> TimetableInput {
        TimetableInput {
            professors: vec![Professor {
                required_hours: vec![2, 1],
                daily_caps: vec![1, 1],
                unavailable: vec![Slot::new(1, 2)],
                preferred_days: vec![0],
                avoided_days: vec![1],
                preferred_hours: vec![0],
                avoided_hours: vec![2],
            }],
            number_of_days: 2,
            hours_per_day: HoursPerDay::Uniform(3),
            number_of_classes: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_input_yields_dimensions() {
        let dims = validate(&input(), &TimetableConfig::default()).unwrap();
        assert_eq!(dims.professors(), 1);
        assert_eq!(dims.days(), 2);
        assert_eq!(dims.classes(), 2);
        assert_eq!(dims.len(), 12);
    }

    #[test]
    fn test_rejects_empty_dimensions() {
        let mut data = input();
        data.professors.clear();
        assert_eq!(
            validate(&data, &TimetableConfig::default()),
            Err(ConfigurationError::EmptyDimension("professors"))
        );

        let mut data = input();
        data.hours_per_day = HoursPerDay::PerDay(vec![3, 0]);
        assert_eq!(
            validate(&data, &TimetableConfig::default()),
            Err(ConfigurationError::EmptyDimension("hours"))
        );
    }

    #[test]
    fn test_rejects_grid_too_large_to_declare() {
        let mut data = input();
        data.number_of_days = 100_000;
        data.hours_per_day = HoursPerDay::Uniform(100_000);
        assert_eq!(
            validate(&data, &TimetableConfig::default()),
            Err(ConfigurationError::TooLarge {
                limit: MAX_VARIABLES
            })
        );

        let mut data = input();
        data.hours_per_day = HoursPerDay::PerDay(vec![usize::MAX, 2]);
        assert!(matches!(
            validate(&data, &TimetableConfig::default()),
            Err(ConfigurationError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_rejects_requirement_shape_mismatch() {
        let mut data = input();
        data.professors[0].required_hours = vec![2];
        assert!(matches!(
            validate(&data, &TimetableConfig::default()),
            Err(ConfigurationError::ShapeMismatch { expected: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn test_rejects_unavailable_hour_past_short_day() {
        let mut data = input();
        data.hours_per_day = HoursPerDay::PerDay(vec![3, 2]);
        // (1, 2) no longer exists once day 1 has only two hours
        assert!(matches!(
            validate(&data, &TimetableConfig::default()),
            Err(ConfigurationError::IndexOutOfRange { index: 2, limit: 2, .. })
        ));
    }

    #[test]
    fn test_preference_hour_checked_against_longest_day() {
        let mut data = input();
        data.hours_per_day = HoursPerDay::PerDay(vec![3, 2]);
        data.professors[0].unavailable.clear();
        assert!(validate(&data, &TimetableConfig::default()).is_ok());

        data.professors[0].preferred_hours = vec![3];
        assert!(matches!(
            validate(&data, &TimetableConfig::default()),
            Err(ConfigurationError::IndexOutOfRange { index: 3, limit: 3, .. })
        ));
    }

    #[test]
    fn test_rejects_bad_priority_and_weights() {
        let mut config = TimetableConfig::default();
        config.priorities.insert(0, 0.0);
        assert!(matches!(
            validate(&input(), &config),
            Err(ConfigurationError::InvalidPriority { professor: 0, .. })
        ));

        let mut config = TimetableConfig::default();
        config.priorities.insert(5, 2.0);
        assert!(matches!(
            validate(&input(), &config),
            Err(ConfigurationError::IndexOutOfRange { index: 5, .. })
        ));

        let mut config = TimetableConfig::default();
        config.weights.avoided_hours = f64::NAN;
        assert!(matches!(
            validate(&input(), &config),
            Err(ConfigurationError::InvalidWeight { name: "avoidedHours", .. })
        ));
    }

    #[test]
    fn test_rejects_non_positive_time_limit() {
        let config = TimetableConfig {
            time_limit_secs: Some(0.0),
            ..Default::default()
        };
        assert_eq!(
            validate(&input(), &config),
            Err(ConfigurationError::InvalidTimeLimit(0.0))
        );
    }

    #[test]
    fn test_overlapping_preferences_are_accepted() {
        let mut data = input();
        data.professors[0].avoided_days = vec![0];
        data.professors[0].avoided_hours = vec![0];
        assert!(validate(&data, &TimetableConfig::default()).is_ok());
    }

    #[test]
    fn test_label_lengths_must_match() {
        let mut data = input();
        data.class_names = vec!["A".into()];
        assert!(matches!(
            validate(&data, &TimetableConfig::default()),
            Err(ConfigurationError::ShapeMismatch { expected: 2, actual: 1, .. })
        ));
    }
}
