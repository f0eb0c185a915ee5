use serde::Serialize;

use crate::data::{ClassId, DayIndex, HourIndex, ProfessorId};
use crate::engine::PrimalValues;
use crate::variables::{Dimensions, VariableSpace};

/// How much trust to put in a solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SolveStatus {
    Optimal,
    /// Feasible, but the engine stopped at its deadline before proving optimality.
    Suboptimal,
}

/// Solved assignment of every decision variable. Never mutated once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    dims: Dimensions,
    assigned: Vec<bool>,
    status: SolveStatus,
    objective_value: f64,
}

impl Solution {
    pub fn new(
        dims: Dimensions,
        assigned: Vec<bool>,
        status: SolveStatus,
        objective_value: f64,
    ) -> Self {
        debug_assert_eq!(dims.len(), assigned.len());
        Self {
            dims,
            assigned,
            status,
            objective_value,
        }
    }

    /// Reads the engine's primal values; anything above one half counts as taught.
    pub fn assignment_from_primal(space: &VariableSpace, values: &PrimalValues) -> Vec<bool> {
        space
            .handles()
            .iter()
            .map(|&handle| values.primal_value(handle) > 0.5)
            .collect()
    }

    pub fn dimensions(&self) -> &Dimensions {
        &self.dims
    }

    pub fn status(&self) -> SolveStatus {
        self.status
    }

    pub fn objective_value(&self) -> f64 {
        self.objective_value
    }

    /// Whether professor `p` teaches class `c` at day `d`, hour `h`; `None` for a tuple outside the grid.
    pub fn value(&self, p: ProfessorId, d: DayIndex, h: HourIndex, c: ClassId) -> Option<bool> {
        self.dims
            .checked_index(p, d, h, c)
            .map(|index| self.assigned[index])
    }

    pub(crate) fn is_assigned(&self, p: ProfessorId, d: DayIndex, h: HourIndex, c: ClassId) -> bool {
        self.assigned[self.dims.index(p, d, h, c)]
    }

    /// Class taught by `p` in a slot, if any.
    pub fn class_at(&self, p: ProfessorId, d: DayIndex, h: HourIndex) -> Option<ClassId> {
        if !self.dims.contains(p, d, h, 0) {
            return None;
        }
        (0..self.dims.classes()).find(|&c| self.is_assigned(p, d, h, c))
    }

    /// Every assigned tuple in flat order.
    pub fn assignments(
        &self,
    ) -> impl Iterator<Item = (ProfessorId, DayIndex, HourIndex, ClassId)> + '_ {
        self.dims
            .tuples()
            .zip(&self.assigned)
            .filter(|(_, on)| **on)
            .map(|(tuple, _)| tuple)
    }

    pub fn total_assigned(&self) -> u32 {
        self.assigned.iter().filter(|on| **on).count() as u32
    }
}
