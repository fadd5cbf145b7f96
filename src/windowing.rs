//! Cropping of model output to a case's height and time window.
//!
//! Case windows are given in model minutes and metres. Each dataset samples
//! time at its own interval, so the minute window is turned into record
//! indices per dataset with [`resolve_time_window`] before anything is read.

use ndarray::{Array1, Array2, Axis};
use thiserror::Error;

use crate::io::{DataReaderError, DatasetAccessor};

/// Malformed window configuration. Fatal to the case it belongs to.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("Time window is inverted: start {start} min > end {end} min")]
    InvertedTime { start: f64, end: f64 },

    #[error("Height window is inverted: min {min} m > max {max} m")]
    InvertedHeight { min: f64, max: f64 },

    #[error("Window bound {name} is not a finite number: {value}")]
    NonFiniteBound { name: &'static str, value: f64 },

    #[error("Timestep must be positive, got {0} s")]
    NonPositiveTimestep(f64),

    #[error("Start minute {start_minutes} is record {start_index}; only {len} records exist")]
    StartBeyondData {
        start_minutes: f64,
        start_index: usize,
        len: usize,
    },
}

/// Inclusive range of time-record indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: usize,
    pub end: usize,
}

impl TimeWindow {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Every record, whatever the file holds
    pub fn all() -> Self {
        Self {
            start: 0,
            end: usize::MAX,
        }
    }

    /// Clamp to `len` stored records; `None` when nothing remains
    pub fn clamp(&self, len: usize) -> Option<TimeWindow> {
        if len == 0 || self.start >= len || self.start > self.end {
            return None;
        }
        Some(TimeWindow {
            start: self.start,
            end: self.end.min(len - 1),
        })
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start) + 1
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

/// Case-level window: time in model minutes, height in metres
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowBounds {
    pub start_minutes: f64,
    pub end_minutes: f64,
    pub height_min: f64,
    pub height_max: f64,
}

impl WindowBounds {
    /// Build validated bounds
    pub fn new(
        start_minutes: f64,
        end_minutes: f64,
        height_min: f64,
        height_max: f64,
    ) -> Result<Self, ConfigurationError> {
        check_finite("start_minutes", start_minutes)?;
        check_finite("end_minutes", end_minutes)?;
        check_finite("height_min", height_min)?;
        check_finite("height_max", height_max)?;
        if start_minutes > end_minutes {
            return Err(ConfigurationError::InvertedTime {
                start: start_minutes,
                end: end_minutes,
            });
        }
        if height_min > height_max {
            return Err(ConfigurationError::InvertedHeight {
                min: height_min,
                max: height_max,
            });
        }
        Ok(Self {
            start_minutes,
            end_minutes,
            height_min,
            height_max,
        })
    }

    /// Resolve the bounds against one dataset's sampling
    pub fn apply(
        &self,
        timestep_seconds: f64,
        len: usize,
    ) -> Result<DatasetWindow, ConfigurationError> {
        let profile =
            resolve_time_window(self.start_minutes, self.end_minutes, timestep_seconds, len)?;
        Ok(DatasetWindow {
            bounds: *self,
            height_min: self.height_min,
            height_max: self.height_max,
            profile,
            series: TimeWindow::new(0, profile.end),
        })
    }
}

fn check_finite(name: &'static str, value: f64) -> Result<(), ConfigurationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigurationError::NonFiniteBound { name, value })
    }
}

/// Case bounds resolved against one dataset
///
/// `profile` is the averaging interval for vertical profiles; `series` runs
/// from the first record to the end of the averaging interval and bounds
/// time-series panels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatasetWindow {
    /// Case bounds this window was resolved from
    pub bounds: WindowBounds,
    pub height_min: f64,
    pub height_max: f64,
    pub profile: TimeWindow,
    pub series: TimeWindow,
}

impl DatasetWindow {
    /// Crop a profile to this window's height range
    pub fn crop(&self, coordinate: &[f64], values: &[f64]) -> (Vec<f64>, Vec<f64>) {
        crop_to_height(coordinate, values, self.height_min, self.height_max)
    }

    /// The same case bounds resolved against the sampling of `variable`
    ///
    /// Files of one composite model may be written at different intervals,
    /// so record indices are only valid for the file they were computed on.
    pub fn for_variable(
        &self,
        dataset: &dyn DatasetAccessor,
        variable: &str,
    ) -> Result<DatasetWindow, DataReaderError> {
        let time = dataset.time_for(variable)?;
        let timestep = dataset.timestep_for(variable)?;
        Ok(self.bounds.apply(timestep, time.len())?)
    }
}

/// Crop parallel coordinate/value vectors to `[min_height, max_height]`
///
/// The coordinate must be monotonic. Returns the contiguous run from the first
/// to the last in-range coordinate; empty vectors when nothing is in range.
pub fn crop_to_height(
    coordinate: &[f64],
    values: &[f64],
    min_height: f64,
    max_height: f64,
) -> (Vec<f64>, Vec<f64>) {
    debug_assert_eq!(coordinate.len(), values.len());
    let n = coordinate.len().min(values.len());
    let in_range = |z: f64| z >= min_height && z <= max_height;

    let first = coordinate[..n].iter().position(|&z| in_range(z));
    let last = coordinate[..n].iter().rposition(|&z| in_range(z));

    match (first, last) {
        (Some(first), Some(last)) => (
            coordinate[first..=last].to_vec(),
            values[first..=last].to_vec(),
        ),
        _ => (Vec::new(), Vec::new()),
    }
}

/// Map a window in 1-based model minutes to inclusive record indices
///
/// Minute `m` lands on record `round(m * 60 / timestep) - 1`. The end index is
/// clamped to the last record; a start past the last record means the case asks
/// for time the file does not contain.
pub fn resolve_time_window(
    start_minutes: f64,
    end_minutes: f64,
    timestep_seconds: f64,
    len: usize,
) -> Result<TimeWindow, ConfigurationError> {
    check_finite("start_minutes", start_minutes)?;
    check_finite("end_minutes", end_minutes)?;
    if !(timestep_seconds > 0.0) {
        return Err(ConfigurationError::NonPositiveTimestep(timestep_seconds));
    }
    if start_minutes > end_minutes {
        return Err(ConfigurationError::InvertedTime {
            start: start_minutes,
            end: end_minutes,
        });
    }

    let to_index = |minutes: f64| -> usize {
        let record = (minutes * 60.0 / timestep_seconds).round();
        if record < 1.0 {
            0
        } else {
            record as usize - 1
        }
    };

    let start_index = to_index(start_minutes);
    if start_index >= len {
        return Err(ConfigurationError::StartBeyondData {
            start_minutes,
            start_index,
            len,
        });
    }
    let end_index = to_index(end_minutes).min(len - 1);

    Ok(TimeWindow::new(start_index, end_index))
}

/// Average `(time, level)` values over time, skipping NaN records per level
pub fn time_average(values: &Array2<f64>) -> Array1<f64> {
    values.map_axis(Axis(0), |column| {
        let (sum, count) = column
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
