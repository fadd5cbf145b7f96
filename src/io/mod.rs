use ndarray::{Array1, Array2};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::windowing::{ConfigurationError, TimeWindow};

pub mod composite;
pub mod memory;
pub mod netcdf_dataset;

pub use composite::CompositeDataset;
pub use memory::InMemoryDataset;
pub use netcdf_dataset::NetCdfDataset;

/// Names used for the vertical coordinate across model output conventions
pub const HEIGHT_NAMES: &[&str] = &["z", "Z3", "altitude", "lev"];

/// Names used for the time coordinate across model output conventions
pub const TIME_NAMES: &[&str] = &["time", "XTIME"];

/// Values at or above this magnitude are fill values, not data
pub const FILL_THRESHOLD: f64 = 1.0e30;

/// Generic error type for dataset accessors
#[derive(Error, Debug)]
pub enum DataReaderError {
    #[error("NetCDF error: {0}")]
    Netcdf(#[from] netcdf::Error),

    #[error("Variable not found: {0}")]
    MissingVariable(String),

    #[error("Coordinate not found: {0}")]
    MissingCoordinate(CoordinateKind),

    #[error("Shape mismatch: {0}")]
    Shape(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dataset lock poisoned: {0}")]
    Poisoned(String),

    #[error("Invalid window: {0}")]
    Window(#[from] ConfigurationError),
}

impl DataReaderError {
    /// True when the error means "the data is not there" rather than "the file is broken".
    ///
    /// Absence is an expected coverage gap; everything else is an I/O failure.
    pub fn is_absence(&self) -> bool {
        matches!(
            self,
            DataReaderError::MissingVariable(_)
                | DataReaderError::MissingCoordinate(_)
                | DataReaderError::Shape(_)
        )
    }
}

/// Which coordinate axis to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CoordinateKind {
    Height,
    Time,
}

impl fmt::Display for CoordinateKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CoordinateKind::Height => write!(f, "height"),
            CoordinateKind::Time => write!(f, "time"),
        }
    }
}

/// The model a dataset was produced by
///
/// `Host` is the simulation being evaluated; everything else is a reference
/// model plotted alongside it. The declaration order of the reference kinds is
/// the order their lines appear in a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModelKind {
    Host,
    SamLes,
    Coamps,
    R408,
    Hoc,
    E3sm,
    Cam,
    Wrf,
}

impl ModelKind {
    /// Reference models in panel order
    pub const REFERENCES: [ModelKind; 7] = [
        ModelKind::SamLes,
        ModelKind::Coamps,
        ModelKind::R408,
        ModelKind::Hoc,
        ModelKind::E3sm,
        ModelKind::Cam,
        ModelKind::Wrf,
    ];

    /// Short identifier used in logs and on the command line
    pub fn tag(&self) -> &'static str {
        match self {
            ModelKind::Host => "host",
            ModelKind::SamLes => "sam",
            ModelKind::Coamps => "coamps",
            ModelKind::R408 => "r408",
            ModelKind::Hoc => "hoc",
            ModelKind::E3sm => "e3sm",
            ModelKind::Cam => "cam",
            ModelKind::Wrf => "wrf",
        }
    }

    /// Default legend label for lines from this model
    pub fn label(&self) -> &'static str {
        match self {
            ModelKind::Host => "current clubb",
            ModelKind::SamLes => "SAM-LES",
            ModelKind::Coamps => "COAMPS-LES",
            ModelKind::R408 => "CLUBB r408",
            ModelKind::Hoc => "HOC 12/17/2005",
            ModelKind::E3sm => "E3SM",
            ModelKind::Cam => "CAM",
            ModelKind::Wrf => "WRF-CLUBB",
        }
    }

    pub fn is_reference(&self) -> bool {
        !matches!(self, ModelKind::Host)
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Identity of one opened data source
#[derive(Debug, Clone, PartialEq)]
pub struct DataSource {
    /// Model that produced the data
    pub model: ModelKind,
    /// Human-readable identifier (usually the file path)
    pub identifier: String,
}

impl DataSource {
    pub fn new(model: ModelKind, identifier: impl Into<String>) -> Self {
        Self {
            model,
            identifier: identifier.into(),
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.model, self.identifier)
    }
}

/// Read-only access to one model's output
///
/// Implementations are opened once per case and never mutated afterwards, so
/// they must be shareable across worker threads.
pub trait DatasetAccessor: Send + Sync {
    /// Identity of the data source (model kind and file)
    fn source(&self) -> &DataSource;

    /// List all variable names in the dataset
    ///
    /// # Returns
    /// * `BTreeSet<String>` - Every variable name the dataset exposes
    fn variable_names(&self) -> BTreeSet<String>;

    /// Check if a variable exists in the dataset
    ///
    /// # Arguments
    /// * `name` - Name of the variable to check
    fn has_variable(&self, name: &str) -> bool {
        self.variable_names().contains(name)
    }

    /// Read a variable over an inclusive time-index window
    ///
    /// The result is shaped `(time, level)`. Variables without a time
    /// dimension produce a single row; the window is clamped to the stored
    /// record count. Fill values are returned as NaN.
    ///
    /// # Arguments
    /// * `name` - Name of the variable to read
    /// * `window` - Inclusive range of time indices
    ///
    /// # Returns
    /// * `Result<Array2<f64>, DataReaderError>` - Values or error
    fn read_variable(&self, name: &str, window: TimeWindow) -> Result<Array2<f64>, DataReaderError>;

    /// Read a coordinate array
    ///
    /// Heights are in metres, times in minutes.
    ///
    /// # Arguments
    /// * `kind` - Height or time
    fn coordinate(&self, kind: CoordinateKind) -> Result<Array1<f64>, DataReaderError>;

    /// Height grid the given variable lives on
    ///
    /// Single-file datasets have one grid; composites answer with the grid of
    /// the file holding `variable`.
    fn height_for(&self, _variable: &str) -> Result<Array1<f64>, DataReaderError> {
        self.coordinate(CoordinateKind::Height)
    }

    /// Time coordinate (minutes) the given variable is sampled on
    ///
    /// Composites answer with the time axis of the file holding `variable`,
    /// which need not match the other files of the same model.
    fn time_for(&self, _variable: &str) -> Result<Array1<f64>, DataReaderError> {
        self.coordinate(CoordinateKind::Time)
    }

    /// Output interval in seconds, derived from the time coordinate
    fn timestep_seconds(&self) -> Result<f64, DataReaderError> {
        Ok(timestep_of(&self.coordinate(CoordinateKind::Time)?))
    }

    /// Output interval in seconds of the file holding `variable`
    fn timestep_for(&self, variable: &str) -> Result<f64, DataReaderError> {
        Ok(timestep_of(&self.time_for(variable)?))
    }

    /// Number of time records
    fn time_len(&self) -> Result<usize, DataReaderError> {
        Ok(self.coordinate(CoordinateKind::Time)?.len())
    }

    /// Path on disk, if the dataset is file-backed
    fn path(&self) -> Option<PathBuf> {
        None
    }
}

/// Sampling interval of a time coordinate in minutes; one record means 60 s
fn timestep_of(time: &Array1<f64>) -> f64 {
    if time.len() < 2 {
        return 60.0;
    }
    (time[1] - time[0]) * 60.0
}

/// Replace fill values with NaN
pub fn mask_fill_values(values: &mut [f64]) {
    for v in values.iter_mut() {
        if !v.is_finite() || v.abs() >= FILL_THRESHOLD {
            *v = f64::NAN;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absence_classification() {
        assert!(DataReaderError::MissingVariable("wp2".to_string()).is_absence());
        assert!(DataReaderError::MissingCoordinate(CoordinateKind::Height).is_absence());
        assert!(DataReaderError::Shape("3 vs 4".to_string()).is_absence());
        assert!(!DataReaderError::FileNotFound("a.nc".to_string()).is_absence());
        assert!(!DataReaderError::Poisoned("arm".to_string()).is_absence());
        let late_start = ConfigurationError::StartBeyondData {
            start_minutes: 481.0,
            start_index: 480,
            len: 100,
        };
        assert!(!DataReaderError::from(late_start).is_absence());
    }

    #[test]
    fn test_mask_fill_values() {
        let mut values = vec![1.0, 9.96921e36, f64::INFINITY, -2.5];
        mask_fill_values(&mut values);
        assert_eq!(values[0], 1.0);
        assert!(values[1].is_nan());
        assert!(values[2].is_nan());
        assert_eq!(values[3], -2.5);
    }

    #[test]
    fn test_reference_order_excludes_host() {
        assert!(!ModelKind::REFERENCES.contains(&ModelKind::Host));
        assert_eq!(ModelKind::REFERENCES[0], ModelKind::SamLes);
        assert!(ModelKind::Coamps.is_reference());
        assert!(!ModelKind::Host.is_reference());
    }

    #[test]
    fn test_data_source_display() {
        let source = DataSource::new(ModelKind::SamLes, "/runs/bomex.nc");
        assert_eq!(format!("{}", source), "sam (/runs/bomex.nc)");
    }
}
