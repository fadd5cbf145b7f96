use ndarray::{Array1, Array2};
use std::collections::BTreeSet;

use super::{CoordinateKind, DataReaderError, DataSource, DatasetAccessor, ModelKind};
use crate::windowing::TimeWindow;

/// Several files of one model presented as a single dataset
///
/// Models such as CLUBB split output by grid (`zm` momentum levels, `zt`
/// thermodynamic levels, `sfc` surface). A variable is read from the first part
/// that holds it, and keeps the height and time grids of that part.
pub struct CompositeDataset {
    source: DataSource,
    parts: Vec<(String, Box<dyn DatasetAccessor>)>,
}

impl CompositeDataset {
    pub fn new(model: ModelKind, identifier: impl Into<String>) -> Self {
        Self {
            source: DataSource::new(model, identifier),
            parts: Vec::new(),
        }
    }

    /// Append a named part; earlier parts win when names collide
    pub fn with_part(mut self, name: impl Into<String>, part: Box<dyn DatasetAccessor>) -> Self {
        self.parts.push((name.into(), part));
        self
    }

    pub fn push_part(&mut self, name: impl Into<String>, part: Box<dyn DatasetAccessor>) {
        self.parts.push((name.into(), part));
    }

    pub fn part_names(&self) -> Vec<&str> {
        self.parts.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    fn part_holding(&self, variable: &str) -> Option<&dyn DatasetAccessor> {
        self.parts
            .iter()
            .find(|(_, part)| part.has_variable(variable))
            .map(|(_, part)| part.as_ref())
    }
}

impl DatasetAccessor for CompositeDataset {
    fn source(&self) -> &DataSource {
        &self.source
    }

    fn variable_names(&self) -> BTreeSet<String> {
        self.parts
            .iter()
            .flat_map(|(_, part)| part.variable_names())
            .collect()
    }

    fn has_variable(&self, name: &str) -> bool {
        self.part_holding(name).is_some()
    }

    fn read_variable(
        &self,
        name: &str,
        window: TimeWindow,
    ) -> Result<Array2<f64>, DataReaderError> {
        self.part_holding(name)
            .ok_or_else(|| DataReaderError::MissingVariable(name.to_string()))?
            .read_variable(name, window)
    }

    /// Coordinate of the first part that has one
    fn coordinate(&self, kind: CoordinateKind) -> Result<Array1<f64>, DataReaderError> {
        for (_, part) in &self.parts {
            match part.coordinate(kind) {
                Ok(values) => return Ok(values),
                Err(e) if e.is_absence() => continue,
                Err(e) => return Err(e),
            }
        }
        Err(DataReaderError::MissingCoordinate(kind))
    }

    fn height_for(&self, variable: &str) -> Result<Array1<f64>, DataReaderError> {
        match self.part_holding(variable) {
            Some(part) => part.height_for(variable),
            None => self.coordinate(CoordinateKind::Height),
        }
    }

    fn time_for(&self, variable: &str) -> Result<Array1<f64>, DataReaderError> {
        let part = match self.part_holding(variable) {
            Some(part) => part,
            None => return self.coordinate(CoordinateKind::Time),
        };
        match part.time_for(variable) {
            Err(e) if e.is_absence() => self.coordinate(CoordinateKind::Time),
            result => result,
        }
    }
}
