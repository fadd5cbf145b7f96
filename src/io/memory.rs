use ndarray::{Array1, Array2, Axis};
use std::collections::{BTreeSet, HashMap};

use super::{CoordinateKind, DataReaderError, DataSource, DatasetAccessor, ModelKind};
use crate::windowing::TimeWindow;

/// Array-backed dataset
///
/// Holds fields already in memory, shaped `(time, level)`. Used by tests and by
/// callers that assemble model output themselves.
#[derive(Debug, Clone)]
pub struct InMemoryDataset {
    source: DataSource,
    height: Option<Array1<f64>>,
    /// Time coordinate in minutes
    time: Option<Array1<f64>>,
    fields: HashMap<String, Array2<f64>>,
}

impl InMemoryDataset {
    pub fn new(model: ModelKind, identifier: impl Into<String>) -> Self {
        Self {
            source: DataSource::new(model, identifier),
            height: None,
            time: None,
            fields: HashMap::new(),
        }
    }

    /// Set the height coordinate (metres)
    pub fn with_height(mut self, height: Vec<f64>) -> Self {
        self.height = Some(Array1::from(height));
        self
    }

    /// Set the time coordinate (minutes)
    pub fn with_time_minutes(mut self, time: Vec<f64>) -> Self {
        self.time = Some(Array1::from(time));
        self
    }

    /// Add a `(time, level)` field
    pub fn with_field(mut self, name: &str, values: Array2<f64>) -> Self {
        self.fields.insert(name.to_string(), values);
        self
    }

    /// Add a field that is the same profile at every time record
    pub fn with_profile(self, name: &str, profile: Vec<f64>) -> Self {
        let nt = self.time.as_ref().map(|t| t.len()).unwrap_or(1).max(1);
        let nz = profile.len();
        let mut values = Array2::<f64>::zeros((nt, nz));
        for mut row in values.rows_mut() {
            row.assign(&Array1::from(profile.clone()));
        }
        self.with_field(name, values)
    }

    /// Add a single-level field varying in time
    pub fn with_series(self, name: &str, series: Vec<f64>) -> Self {
        let values = Array1::from(series).insert_axis(Axis(1));
        self.with_field(name, values)
    }
}

impl DatasetAccessor for InMemoryDataset {
    fn source(&self) -> &DataSource {
        &self.source
    }

    fn variable_names(&self) -> BTreeSet<String> {
        self.fields.keys().cloned().collect()
    }

    fn has_variable(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    fn read_variable(
        &self,
        name: &str,
        window: TimeWindow,
    ) -> Result<Array2<f64>, DataReaderError> {
        let values = self
            .fields
            .get(name)
            .ok_or_else(|| DataReaderError::MissingVariable(name.to_string()))?;

        let nt = values.nrows();
        if nt == 1 {
            return Ok(values.clone());
        }
        match window.clamp(nt) {
            Some(w) => Ok(values.slice(ndarray::s![w.start..=w.end, ..]).to_owned()),
            None => Ok(Array2::zeros((0, values.ncols()))),
        }
    }

    fn coordinate(&self, kind: CoordinateKind) -> Result<Array1<f64>, DataReaderError> {
        let coordinate = match kind {
            CoordinateKind::Height => self.height.as_ref(),
            CoordinateKind::Time => self.time.as_ref(),
        };
        coordinate
            .cloned()
            .ok_or(DataReaderError::MissingCoordinate(kind))
    }
}
