use itertools::iproduct;
use log::{info, trace};

use crate::data::{ClassId, DayIndex, HourIndex, HoursPerDay, ProfessorId, Slot};
use crate::engine::{SolvingEngine, VariableHandle};
use crate::error::ConfigurationError;

/// Largest (professor, day, hour, class) grid accepted before any variable is declared.
pub const MAX_VARIABLES: usize = 2_000_000;

/// Shape of the (professor, day, hour, class) grid.
///
/// Days may have different numbers of hours; variables are laid out flat,
/// professor-major, then by slot of the week, then by class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimensions {
    professors: usize,
    classes: usize,
    hours: Vec<usize>,
    day_offsets: Vec<usize>,
    slots: usize,
}

impl Dimensions {
    pub fn new(
        professors: usize,
        days: usize,
        hours_per_day: &HoursPerDay,
        classes: usize,
    ) -> Result<Self, ConfigurationError> {
        if professors == 0 {
            return Err(ConfigurationError::EmptyDimension("professors"));
        }
        if days == 0 {
            return Err(ConfigurationError::EmptyDimension("days"));
        }
        if classes == 0 {
            return Err(ConfigurationError::EmptyDimension("classes"));
        }
        let too_large = ConfigurationError::TooLarge {
            limit: MAX_VARIABLES,
        };
        // every day contributes at least one variable
        if days > MAX_VARIABLES {
            return Err(too_large);
        }

        let hours = match hours_per_day {
            HoursPerDay::Uniform(h) => vec![*h; days],
            HoursPerDay::PerDay(per_day) => {
                if per_day.len() != days {
                    return Err(ConfigurationError::ShapeMismatch {
                        field: "hoursPerDay".into(),
                        expected: days,
                        actual: per_day.len(),
                    });
                }
                per_day.clone()
            }
        };
        if hours.contains(&0) {
            return Err(ConfigurationError::EmptyDimension("hours"));
        }

        let mut day_offsets = Vec::with_capacity(hours.len());
        let mut slots: usize = 0;
        for &h in &hours {
            day_offsets.push(slots);
            slots = slots.checked_add(h).ok_or_else(|| too_large.clone())?;
        }
        let variables = professors
            .checked_mul(slots)
            .and_then(|n| n.checked_mul(classes))
            .filter(|&n| n <= MAX_VARIABLES)
            .ok_or(too_large)?;
        trace!("Grid holds {variables} decision variables.");

        Ok(Self {
            professors,
            classes,
            hours,
            day_offsets,
            slots,
        })
    }

    pub fn professors(&self) -> usize {
        self.professors
    }

    pub fn days(&self) -> usize {
        self.hours.len()
    }

    pub fn classes(&self) -> usize {
        self.classes
    }

    /// Hours in `day`, or 0 for a day outside the week.
    pub fn hours_in_day(&self, day: DayIndex) -> usize {
        self.hours.get(day).copied().unwrap_or(0)
    }

    pub fn max_hours(&self) -> usize {
        self.hours.iter().copied().max().unwrap_or(0)
    }

    /// Number of (day, hour) slots in the week.
    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Total number of decision variables.
    pub fn len(&self) -> usize {
        self.professors * self.slots * self.classes
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, p: ProfessorId, d: DayIndex, h: HourIndex, c: ClassId) -> bool {
        p < self.professors && d < self.days() && h < self.hours[d] && c < self.classes
    }

    /// Flat index of a tuple. The tuple must be in range.
    pub fn index(&self, p: ProfessorId, d: DayIndex, h: HourIndex, c: ClassId) -> usize {
        debug_assert!(self.contains(p, d, h, c), "({p}, {d}, {h}, {c}) out of range");
        (p * self.slots + self.day_offsets[d] + h) * self.classes + c
    }

    pub fn checked_index(
        &self,
        p: ProfessorId,
        d: DayIndex,
        h: HourIndex,
        c: ClassId,
    ) -> Option<usize> {
        self.contains(p, d, h, c).then(|| self.index(p, d, h, c))
    }

    /// Every (day, hour) slot of the week, day by day.
    pub fn week(&self) -> impl Iterator<Item = Slot> + '_ {
        self.hours
            .iter()
            .enumerate()
            .flat_map(|(d, &hours)| (0..hours).map(move |h| Slot::new(d, h)))
    }

    /// Every (professor, day, hour, class) tuple in flat index order.
    pub fn tuples(&self) -> impl Iterator<Item = (ProfessorId, DayIndex, HourIndex, ClassId)> + '_ {
        iproduct!(0..self.professors, self.week().collect::<Vec<_>>(), 0..self.classes)
            .map(|(p, slot, c)| (p, slot.day, slot.hour, c))
    }
}

/// The grid of binary decision variables, "professor teaches class at day, hour".
#[derive(Debug, Clone)]
pub struct VariableSpace {
    dims: Dimensions,
    handles: Vec<VariableHandle>,
}

impl VariableSpace {
    /// Declares one binary variable per tuple with the engine.
    pub fn create<E: SolvingEngine>(engine: &mut E, dims: Dimensions) -> Self {
        info!(
            "Declaring {} decision variables ({} professors, {} slots, {} classes)...",
            dims.len(),
            dims.professors(),
            dims.slots(),
            dims.classes()
        );
        let handles: Vec<VariableHandle> = dims
            .tuples()
            .map(|(p, d, h, c)| engine.declare_binary(&format!("teach_p{p}_d{d}_h{h}_c{c}")))
            .collect();
        trace!("Declared {} variables.", handles.len());
        Self { dims, handles }
    }

    pub fn dimensions(&self) -> &Dimensions {
        &self.dims
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn handles(&self) -> &[VariableHandle] {
        &self.handles
    }

    pub fn get(&self, p: ProfessorId, d: DayIndex, h: HourIndex, c: ClassId) -> VariableHandle {
        self.handles[self.dims.index(p, d, h, c)]
    }

    /// All class variables of one professor in one slot.
    pub fn slot(&self, p: ProfessorId, d: DayIndex, h: HourIndex) -> &[VariableHandle] {
        let start = self.dims.index(p, d, h, 0);
        &self.handles[start..start + self.dims.classes()]
    }

    /// All professor variables for one class in one slot.
    pub fn class_slot(
        &self,
        d: DayIndex,
        h: HourIndex,
        c: ClassId,
    ) -> impl Iterator<Item = VariableHandle> + '_ {
        (0..self.dims.professors()).map(move |p| self.get(p, d, h, c))
    }

    /// All hours of one day for one professor and class.
    pub fn class_day(
        &self,
        p: ProfessorId,
        d: DayIndex,
        c: ClassId,
    ) -> impl Iterator<Item = VariableHandle> + '_ {
        (0..self.dims.hours_in_day(d)).map(move |h| self.get(p, d, h, c))
    }

    /// All slots of the week for one professor and class.
    pub fn class_week(&self, p: ProfessorId, c: ClassId) -> impl Iterator<Item = VariableHandle> + '_ {
        self.dims
            .week()
            .map(move |slot| self.get(p, slot.day, slot.hour, c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::RecordingEngine;

    #[test]
    fn test_uniform_dimensions() {
        let dims = Dimensions::new(2, 3, &HoursPerDay::Uniform(4), 2).unwrap();
        assert_eq!(dims.days(), 3);
        assert_eq!(dims.slots(), 12);
        assert_eq!(dims.len(), 2 * 12 * 2);
        assert_eq!(dims.max_hours(), 4);
    }

    #[test]
    fn test_ragged_days_are_laid_out_contiguously() {
        let dims = Dimensions::new(2, 3, &HoursPerDay::PerDay(vec![2, 3, 1]), 2).unwrap();
        assert_eq!(dims.slots(), 6);
        assert_eq!(dims.len(), 24);
        assert_eq!(dims.index(0, 0, 0, 0), 0);
        assert_eq!(dims.index(0, 1, 0, 0), 4);
        assert_eq!(dims.index(0, 2, 0, 1), 11);
        assert_eq!(dims.index(1, 0, 0, 0), 12);
        assert_eq!(dims.checked_index(0, 2, 1, 0), None);
        assert_eq!(dims.hours_in_day(7), 0);

        let indices: Vec<usize> = dims
            .tuples()
            .map(|(p, d, h, c)| dims.index(p, d, h, c))
            .collect();
        assert_eq!(indices, (0..24).collect::<Vec<_>>());
    }

    #[test]
    fn test_rejects_empty_axes() {
        assert_eq!(
            Dimensions::new(0, 1, &HoursPerDay::Uniform(1), 1),
            Err(ConfigurationError::EmptyDimension("professors"))
        );
        assert_eq!(
            Dimensions::new(1, 0, &HoursPerDay::Uniform(1), 1),
            Err(ConfigurationError::EmptyDimension("days"))
        );
        assert_eq!(
            Dimensions::new(1, 1, &HoursPerDay::Uniform(1), 0),
            Err(ConfigurationError::EmptyDimension("classes"))
        );
        assert!(matches!(
            Dimensions::new(1, 2, &HoursPerDay::PerDay(vec![1]), 1),
            Err(ConfigurationError::ShapeMismatch { expected: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn test_rejects_oversized_grids() {
        let too_large = Err(ConfigurationError::TooLarge {
            limit: MAX_VARIABLES,
        });
        // hour counts whose sum wraps around usize
        assert_eq!(
            Dimensions::new(1, 2, &HoursPerDay::PerDay(vec![usize::MAX, 2]), 1),
            too_large
        );
        assert_eq!(
            Dimensions::new(1, 100_000, &HoursPerDay::Uniform(100_000), 1),
            too_large
        );
        assert_eq!(
            Dimensions::new(1, usize::MAX, &HoursPerDay::Uniform(1), 1),
            too_large
        );
        assert_eq!(
            Dimensions::new(usize::MAX / 2, 1, &HoursPerDay::Uniform(3), 1),
            too_large
        );

        let dims = Dimensions::new(1, 1, &HoursPerDay::Uniform(MAX_VARIABLES), 1).unwrap();
        assert_eq!(dims.len(), MAX_VARIABLES);
    }

    #[test]
    fn test_create_names_and_accessors() {
        let dims = Dimensions::new(2, 2, &HoursPerDay::PerDay(vec![2, 1]), 3).unwrap();
        let mut engine = RecordingEngine::default();
        let space = VariableSpace::create(&mut engine, dims);

        assert_eq!(space.len(), 2 * 3 * 3);
        assert_eq!(engine.names.len(), space.len());
        assert_eq!(engine.names[space.get(1, 1, 0, 2).index()], "teach_p1_d1_h0_c2");

        let slot = space.slot(1, 0, 1);
        assert_eq!(slot.len(), 3);
        assert_eq!(slot[2], space.get(1, 0, 1, 2));

        let by_class: Vec<_> = space.class_slot(0, 1, 1).collect();
        assert_eq!(by_class, vec![space.get(0, 0, 1, 1), space.get(1, 0, 1, 1)]);

        assert_eq!(space.class_day(0, 0, 2).count(), 2);
        assert_eq!(space.class_day(0, 1, 2).count(), 1);
        assert_eq!(space.class_week(1, 0).count(), 3);
    }
}
