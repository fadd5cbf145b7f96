use ndarray::{Array1, Array2, ArrayD, Axis, IxDyn};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use super::{
    mask_fill_values, CoordinateKind, DataReaderError, DataSource, DatasetAccessor, ModelKind,
    HEIGHT_NAMES, TIME_NAMES,
};
use crate::time_utils::{parse_time_units, to_minutes, TimeUnits};
use crate::windowing::{time_average, TimeWindow};

/// Dimension name and length, in file order
type DimensionShape = Vec<(String, usize)>;

/// One opened NetCDF model-output file
///
/// The variable list is read when the file is opened. Coordinates are read on
/// first use and cached for the life of the dataset; the cache is filled under a
/// lock so concurrent readers never read a coordinate twice.
pub struct NetCdfDataset {
    source: DataSource,
    path: PathBuf,
    file: Mutex<netcdf::File>,
    names: BTreeSet<String>,
    coordinates: Mutex<HashMap<CoordinateKind, Array1<f64>>>,
}

impl NetCdfDataset {
    /// Open a NetCDF file for reading
    pub fn open(model: ModelKind, path: impl AsRef<Path>) -> Result<Self, DataReaderError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(DataReaderError::FileNotFound(path.display().to_string()));
        }

        let file = netcdf::open(path)?;
        let names: BTreeSet<String> = file.variables().map(|v| v.name()).collect();
        debug!(model = %model, path = %path.display(), variables = names.len(), "opened dataset");

        Ok(Self {
            source: DataSource::new(model, path.display().to_string()),
            path: path.to_path_buf(),
            file: Mutex::new(file),
            names,
            coordinates: Mutex::new(HashMap::new()),
        })
    }

    fn lock_file(&self) -> Result<MutexGuard<'_, netcdf::File>, DataReaderError> {
        self.file
            .lock()
            .map_err(|_| DataReaderError::Poisoned(self.source.identifier.clone()))
    }

    /// Read a variable's raw values and dimension layout
    ///
    /// With a window, only the records inside it are read and the time
    /// dimension in the returned layout is shortened to match. Variables
    /// without a time dimension are always read whole.
    fn read_raw(
        &self,
        name: &str,
        window: Option<TimeWindow>,
    ) -> Result<(DimensionShape, Vec<f64>), DataReaderError> {
        let file = self.lock_file()?;
        let var = file
            .variable(name)
            .ok_or_else(|| DataReaderError::MissingVariable(name.to_string()))?;

        let mut dims: DimensionShape = var
            .dimensions()
            .iter()
            .map(|d| (d.name(), d.len()))
            .collect();

        let mut raw: Vec<f64> = match (window, time_axis(&dims)) {
            (Some(window), Some(axis)) => {
                let records = match window.clamp(dims[axis].1) {
                    Some(w) => w,
                    None => {
                        dims[axis].1 = 0;
                        return Ok((dims, Vec::new()));
                    }
                };
                let mut start = vec![0; dims.len()];
                let mut count: Vec<usize> = dims.iter().map(|(_, len)| *len).collect();
                start[axis] = records.start;
                count[axis] = records.end - records.start + 1;
                dims[axis].1 = count[axis];
                var.get_values::<f64, _>((start, count))?
            }
            _ => var.get_values::<f64, _>(..)?,
        };
        mask_fill_values(&mut raw);

        Ok((dims, raw))
    }

    /// Read the `units` attribute of a variable, if it is a string
    fn read_units(&self, name: &str) -> Result<Option<String>, DataReaderError> {
        let file = self.lock_file()?;
        let units = file
            .variable(name)
            .and_then(|var| var.attribute("units").and_then(|attr| attr.value().ok()))
            .and_then(|value| match value {
                netcdf::AttributeValue::Str(s) => Some(s),
                _ => None,
            });
        Ok(units)
    }

    fn first_present(&self, candidates: &[&str]) -> Option<String> {
        candidates
            .iter()
            .find(|name| self.names.contains(**name))
            .map(|name| name.to_string())
    }

    fn read_height(&self) -> Result<Array1<f64>, DataReaderError> {
        let name = self
            .first_present(HEIGHT_NAMES)
            .ok_or(DataReaderError::MissingCoordinate(CoordinateKind::Height))?;
        let (dims, raw) = self.read_raw(&name, None)?;
        let values = to_time_level(&dims, raw)?;

        // Time-varying heights (e.g. Z3) are averaged onto one grid
        if values.nrows() > 1 {
            Ok(time_average(&values))
        } else {
            Ok(values.row(0).to_owned())
        }
    }

    fn read_time(&self) -> Result<Array1<f64>, DataReaderError> {
        let name = self
            .first_present(TIME_NAMES)
            .ok_or(DataReaderError::MissingCoordinate(CoordinateKind::Time))?;
        let (_, raw) = self.read_raw(&name, None)?;

        let units = match self.read_units(&name)? {
            Some(units) => parse_time_units(&units).unwrap_or_else(|e| {
                warn!(dataset = %self.source, "{}; assuming seconds", e);
                TimeUnits::default()
            }),
            None => TimeUnits::default(),
        };

        Ok(Array1::from(to_minutes(&raw, &units)))
    }
}

impl DatasetAccessor for NetCdfDataset {
    fn source(&self) -> &DataSource {
        &self.source
    }

    fn variable_names(&self) -> BTreeSet<String> {
        self.names.clone()
    }

    fn has_variable(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    fn read_variable(
        &self,
        name: &str,
        window: TimeWindow,
    ) -> Result<Array2<f64>, DataReaderError> {
        let (dims, raw) = self.read_raw(name, Some(window))?;
        to_time_level(&dims, raw)
    }

    fn coordinate(&self, kind: CoordinateKind) -> Result<Array1<f64>, DataReaderError> {
        let mut cache = self
            .coordinates
            .lock()
            .map_err(|_| DataReaderError::Poisoned(self.source.identifier.clone()))?;
        if let Some(values) = cache.get(&kind) {
            return Ok(values.clone());
        }

        let values = match kind {
            CoordinateKind::Height => self.read_height()?,
            CoordinateKind::Time => self.read_time()?,
        };
        cache.insert(kind, values.clone());
        Ok(values)
    }

    fn path(&self) -> Option<PathBuf> {
        Some(self.path.clone())
    }
}

/// Index of the time dimension, if the variable has one
fn time_axis(dims: &[(String, usize)]) -> Option<usize> {
    dims.iter()
        .position(|(name, _)| TIME_NAMES.contains(&name.as_str()))
}

/// Reshape raw values into `(time, level)`
///
/// The time dimension moves to the front; every other dimension is flattened
/// into levels, so singleton lat/lon axes disappear.
pub(crate) fn to_time_level(
    dims: &[(String, usize)],
    raw: Vec<f64>,
) -> Result<Array2<f64>, DataReaderError> {
    let shape: Vec<usize> = dims.iter().map(|(_, len)| *len).collect();
    let expected: usize = shape.iter().product();
    if expected != raw.len() {
        return Err(DataReaderError::Shape(format!(
            "dimensions {:?} hold {} values, read {}",
            shape,
            expected,
            raw.len()
        )));
    }

    let array = ArrayD::from_shape_vec(IxDyn(&shape), raw)
        .map_err(|e| DataReaderError::Shape(e.to_string()))?;

    let (nt, array) = match time_axis(dims) {
        Some(axis) => {
            let mut order: Vec<usize> = (0..shape.len()).collect();
            order.remove(axis);
            order.insert(0, axis);
            (shape[axis], array.permuted_axes(IxDyn(&order)))
        }
        None => (1, array.insert_axis(Axis(0))),
    };
    let nz: usize = match time_axis(dims) {
        Some(axis) => shape
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != axis)
            .map(|(_, len)| *len)
            .product(),
        None => expected,
    };

    let flat: Vec<f64> = array.iter().copied().collect();
    Array2::from_shape_vec((nt, nz), flat).map_err(|e| DataReaderError::Shape(e.to_string()))
}
