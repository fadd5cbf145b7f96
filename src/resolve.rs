//! Resolution of one variable descriptor against one dataset.
//!
//! Sources are tried in a fixed order, each only when the previous produced
//! nothing:
//!
//! 1. the descriptor's computation for this dataset's model
//! 2. the first alias present in the dataset, scaled by the conversion factor
//! 3. the descriptor's fallback computation
//! 4. zeros over the cropped coordinate, for zero-fill descriptors
//!
//! Anything else is [`Resolution::Unavailable`]. A computation whose inputs
//! are missing counts as "nothing" and resolution continues; only unreadable
//! files and bad windows are errors.

use ndarray::{Array1, Array2, Axis};
use thiserror::Error;
use tracing::{debug, error};

use crate::io::{DataReaderError, DatasetAccessor};
use crate::series::{Line, PanelKind, Series};
use crate::variables::{Computation, VariableDescriptor};
use crate::windowing::{time_average, ConfigurationError, DatasetWindow, WindowBounds};

/// Errors that abort the case being resolved
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Invalid window: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Failed to read {variable} from {dataset}: {source}")]
    Io {
        dataset: String,
        variable: String,
        #[source]
        source: DataReaderError,
    },
}

/// Outcome of resolving one descriptor against one dataset
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved(Line),
    /// The dataset has no source for the variable; a coverage gap, not an error
    Unavailable,
}

impl Resolution {
    pub fn line(&self) -> Option<&Line> {
        match self {
            Resolution::Resolved(line) => Some(line),
            Resolution::Unavailable => None,
        }
    }

    pub fn into_line(self) -> Option<Line> {
        match self {
            Resolution::Resolved(line) => Some(line),
            Resolution::Unavailable => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Resolution::Unavailable)
    }
}

/// Resolve case bounds against a dataset's time sampling
///
/// # Returns
/// * `Ok(None)` - The dataset has no time coordinate, so nothing in it can be windowed
/// * `Err(ResolveError::Configuration)` - The case asks for time the dataset does not hold
pub fn dataset_window(
    bounds: &WindowBounds,
    dataset: &dyn DatasetAccessor,
) -> Result<Option<DatasetWindow>, ResolveError> {
    let sampling = dataset
        .timestep_seconds()
        .and_then(|dt| Ok((dt, dataset.time_len()?)));

    match sampling {
        Ok((timestep, len)) => Ok(Some(bounds.apply(timestep, len)?)),
        Err(e) if e.is_absence() => {
            debug!(dataset = %dataset.source(), "no time coordinate: {}", e);
            Ok(None)
        }
        Err(e) => Err(io_error(dataset, "time", e)),
    }
}

/// Resolve a descriptor against a dataset under case bounds
pub fn resolve(
    descriptor: &VariableDescriptor,
    dataset: &dyn DatasetAccessor,
    bounds: &WindowBounds,
) -> Result<Resolution, ResolveError> {
    match dataset_window(bounds, dataset)? {
        Some(window) => resolve_in_window(descriptor, dataset, &window),
        None => Ok(Resolution::Unavailable),
    }
}

/// Resolve a descriptor against a dataset whose window is already known
pub fn resolve_in_window(
    descriptor: &VariableDescriptor,
    dataset: &dyn DatasetAccessor,
    window: &DatasetWindow,
) -> Result<Resolution, ResolveError> {
    let model = dataset.source().model;

    if let Some(computation) = descriptor.override_for(model) {
        let series = run_computation(computation, descriptor, dataset, window, "model override")?;
        if let Some(series) = series {
            return Ok(resolved(series, dataset));
        }
    }

    if let Some(alias) = descriptor
        .alias_list()
        .iter()
        .find(|alias| dataset.has_variable(alias))
    {
        let factor = descriptor.conversion_factor(model);
        let series = match descriptor.kind() {
            PanelKind::Profile => read_profile(dataset, alias, window, factor),
            PanelKind::TimeSeries => read_time_series(dataset, alias, window, factor),
        };
        match series {
            Ok(Some(series)) => return Ok(resolved(zero_filled(series, descriptor), dataset)),
            Ok(None) => debug!(
                variable = descriptor.name(),
                alias = alias.as_str(),
                dataset = %dataset.source(),
                "alias has no values inside the window"
            ),
            Err(e) if e.is_absence() => debug!(
                variable = descriptor.name(),
                alias = alias.as_str(),
                dataset = %dataset.source(),
                "alias unusable: {}",
                e
            ),
            Err(e) => return Err(io_error(dataset, alias, e)),
        }
    }

    if let Some(computation) = descriptor.fallback_computation() {
        let series = run_computation(computation, descriptor, dataset, window, "fallback")?;
        if let Some(series) = series {
            return Ok(resolved(zero_filled(series, descriptor), dataset));
        }
    }

    if descriptor.is_zero_fill() {
        match zeros(descriptor, dataset, window) {
            Ok(Some(series)) => return Ok(resolved(series, dataset)),
            Ok(None) => {}
            Err(e) if e.is_absence() => {}
            Err(e) => return Err(io_error(dataset, descriptor.name(), e)),
        }
    }

    debug!(variable = descriptor.name(), dataset = %dataset.source(), "variable unavailable");
    Ok(Resolution::Unavailable)
}

fn resolved(series: Series, dataset: &dyn DatasetAccessor) -> Resolution {
    Resolution::Resolved(Line::from_series(series, dataset.source()))
}

fn zero_filled(series: Series, descriptor: &VariableDescriptor) -> Series {
    if descriptor.is_zero_fill() {
        series.nan_to_zero()
    } else {
        series
    }
}

fn io_error(
    dataset: &dyn DatasetAccessor,
    variable: &str,
    source: DataReaderError,
) -> ResolveError {
    if let DataReaderError::Window(e) = source {
        error!(dataset = %dataset.source(), variable, "window does not fit: {}", e);
        return ResolveError::Configuration(e);
    }
    error!(dataset = %dataset.source(), variable, "read failed: {}", source);
    ResolveError::Io {
        dataset: dataset.source().to_string(),
        variable: variable.to_string(),
        source,
    }
}

/// Run a computation; missing inputs count as no result
fn run_computation(
    computation: &dyn Computation,
    descriptor: &VariableDescriptor,
    dataset: &dyn DatasetAccessor,
    window: &DatasetWindow,
    step: &str,
) -> Result<Option<Series>, ResolveError> {
    match computation.compute(dataset, window) {
        Ok(Some(series)) if !series.is_empty() => Ok(Some(series)),
        Ok(_) => Ok(None),
        Err(e) if e.is_absence() => {
            debug!(
                variable = descriptor.name(),
                dataset = %dataset.source(),
                step,
                "computation inputs missing: {}",
                e
            );
            Ok(None)
        }
        Err(e) => Err(io_error(dataset, descriptor.name(), e)),
    }
}

/// Time-averaged, scaled, height-cropped profile of one field
fn read_profile(
    dataset: &dyn DatasetAccessor,
    name: &str,
    window: &DatasetWindow,
    factor: f64,
) -> Result<Option<Series>, DataReaderError> {
    let window = window.for_variable(dataset, name)?;
    let values = dataset.read_variable(name, window.profile)?;
    if values.nrows() == 0 {
        return Ok(None);
    }
    let profile = time_average(&values) * factor;
    let height = dataset.height_for(name)?;
    if height.len() != profile.len() {
        return Err(DataReaderError::Shape(format!(
            "{} has {} levels on a {}-level height grid",
            name,
            profile.len(),
            height.len()
        )));
    }

    let (z, v) = window.crop(&height.to_vec(), &profile.to_vec());
    if v.is_empty() {
        return Ok(None);
    }
    Series::new(v, z).map(Some)
}

/// Scaled time series of one field over the series window
fn read_time_series(
    dataset: &dyn DatasetAccessor,
    name: &str,
    window: &DatasetWindow,
    factor: f64,
) -> Result<Option<Series>, DataReaderError> {
    let window = window.for_variable(dataset, name)?;
    let values = dataset.read_variable(name, window.series)?;
    let time = dataset.time_for(name)?;
    let clamped = match window.series.clamp(time.len()) {
        Some(w) => w,
        None => return Ok(None),
    };
    let time = time.slice(ndarray::s![clamped.start..=clamped.end]).to_vec();

    let series = vertical_average(&values) * factor;
    if series.len() != time.len() {
        return Err(DataReaderError::Shape(format!(
            "{} has {} records against {} times",
            name,
            series.len(),
            time.len()
        )));
    }
    Series::new(series.to_vec(), time).map(Some)
}

/// Collapse levels of a `(time, level)` field, skipping NaN
fn vertical_average(values: &Array2<f64>) -> Array1<f64> {
    if values.ncols() == 1 {
        return values.column(0).to_owned();
    }
    values.map_axis(Axis(1), |row| {
        let (sum, count) = row
            .iter()
            .filter(|v| !v.is_nan())
            .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
        if count == 0 {
            f64::NAN
        } else {
            sum / count as f64
        }
    })
}

/// Zeros over the cropped coordinate of the panel kind
fn zeros(
    descriptor: &VariableDescriptor,
    dataset: &dyn DatasetAccessor,
    window: &DatasetWindow,
) -> Result<Option<Series>, DataReaderError> {
    let coordinate = match descriptor.kind() {
        PanelKind::Profile => {
            let height = dataset.height_for(descriptor.name())?.to_vec();
            let zeros = vec![0.0; height.len()];
            window.crop(&height, &zeros).0
        }
        PanelKind::TimeSeries => {
            let time = dataset.time_for(descriptor.name())?;
            let window = window.for_variable(dataset, descriptor.name())?;
            match window.series.clamp(time.len()) {
                Some(w) => time.slice(ndarray::s![w.start..=w.end]).to_vec(),
                None => Vec::new(),
            }
        }
    };

    if coordinate.is_empty() {
        return Ok(None);
    }
    Ok(Some(Series::zeros(coordinate)))
}
