use itertools::Itertools;
use log::{debug, info};

use crate::data::{TimetableConfig, TimetableInput};
use crate::engine::LinearExpression;
use crate::variables::VariableSpace;

/// Net objective coefficient of every decision variable.
///
/// Term groups are accumulated one after another onto the same coefficient
/// vector, so a slot that is both preferred and avoided simply nets out.
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    coefficients: Vec<f64>,
}

impl Objective {
    /// Assembles
    /// `coverage * sum(x) + pd * sum(x on preferred days) - ad * sum(x on avoided days)
    ///  + ph * sum(x on preferred hours) - ah * sum(x on avoided hours)`,
    /// with every preference term scaled by the professor's priority.
    pub fn build(space: &VariableSpace, input: &TimetableInput, config: &TimetableConfig) -> Self {
        let dims = space.dimensions();
        let weights = &config.weights;
        let mut coefficients = vec![weights.coverage; space.len()];

        for (p, professor) in input.professors.iter().enumerate() {
            let priority = config.priority(p);

            // a set: listing a day twice does not double its weight
            for d in professor.preferred_days.iter().copied().unique() {
                for (h, c) in (0..dims.hours_in_day(d)).cartesian_product(0..dims.classes()) {
                    coefficients[dims.index(p, d, h, c)] += weights.preferred_days * priority;
                }
            }
            for d in professor.avoided_days.iter().copied().unique() {
                for (h, c) in (0..dims.hours_in_day(d)).cartesian_product(0..dims.classes()) {
                    coefficients[dims.index(p, d, h, c)] -= weights.avoided_days * priority;
                }
            }
            // an hour only exists on days long enough to have it
            for h in professor.preferred_hours.iter().copied().unique() {
                for (d, c) in (0..dims.days()).cartesian_product(0..dims.classes()) {
                    if h < dims.hours_in_day(d) {
                        coefficients[dims.index(p, d, h, c)] += weights.preferred_hours * priority;
                    }
                }
            }
            for h in professor.avoided_hours.iter().copied().unique() {
                for (d, c) in (0..dims.days()).cartesian_product(0..dims.classes()) {
                    if h < dims.hours_in_day(d) {
                        coefficients[dims.index(p, d, h, c)] -= weights.avoided_hours * priority;
                    }
                }
            }
        }

        info!("Objective defined with coverage, preferred/avoided day and preferred/avoided hour terms.");
        debug!("Objective weights: {weights:?}");
        Self { coefficients }
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// The objective as a sum over the variable space, skipping zero coefficients.
    pub fn expression(&self, space: &VariableSpace) -> LinearExpression {
        space
            .handles()
            .iter()
            .zip(&self.coefficients)
            .filter(|(_, coefficient)| **coefficient != 0.0)
            .map(|(handle, coefficient)| (*handle, *coefficient))
            .collect()
    }

    /// Objective value of an assignment given in flat variable order.
    pub fn evaluate(&self, assigned: &[bool]) -> f64 {
        self.coefficients
            .iter()
            .zip(assigned)
            .filter(|(_, on)| **on)
            .map(|(coefficient, _)| coefficient)
            .sum()
    }
}
