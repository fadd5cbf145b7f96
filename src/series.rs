use std::fmt;

use crate::io::{DataReaderError, DataSource, ModelKind};

/// Whether a panel shows a vertical profile or a time series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PanelKind {
    /// Time-averaged values indexed by height
    #[default]
    Profile,
    /// Values indexed by time in minutes
    TimeSeries,
}

impl fmt::Display for PanelKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PanelKind::Profile => write!(f, "profile"),
            PanelKind::TimeSeries => write!(f, "timeseries"),
        }
    }
}

/// Values paired with the coordinate they are indexed by
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    data: Vec<f64>,
    coordinate: Vec<f64>,
}

impl Series {
    /// Pair values with a coordinate of the same length
    pub fn new(data: Vec<f64>, coordinate: Vec<f64>) -> Result<Self, DataReaderError> {
        if data.len() != coordinate.len() {
            return Err(DataReaderError::Shape(format!(
                "{} values against {} coordinates",
                data.len(),
                coordinate.len()
            )));
        }
        Ok(Self { data, coordinate })
    }

    /// Zeros over the given coordinate
    pub fn zeros(coordinate: Vec<f64>) -> Self {
        Self {
            data: vec![0.0; coordinate.len()],
            coordinate,
        }
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn coordinate(&self) -> &[f64] {
        &self.coordinate
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Multiply every value by `factor`
    pub fn scaled(mut self, factor: f64) -> Self {
        if factor != 1.0 {
            self.data.iter_mut().for_each(|v| *v *= factor);
        }
        self
    }

    /// Replace NaN values with zero
    pub fn nan_to_zero(mut self) -> Self {
        self.data.iter_mut().filter(|v| v.is_nan()).for_each(|v| *v = 0.0);
        self
    }

    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.data, self.coordinate)
    }
}

/// Presentation token handed to the rendering layer (matplotlib format string)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineStyle(pub &'static str);

impl LineStyle {
    pub fn for_model(model: ModelKind) -> Self {
        match model {
            ModelKind::Host => LineStyle("r-"),
            ModelKind::SamLes => LineStyle("k-"),
            ModelKind::Coamps => LineStyle("k--"),
            ModelKind::R408 => LineStyle("g-"),
            ModelKind::Hoc => LineStyle("m--"),
            ModelKind::E3sm => LineStyle("c-"),
            ModelKind::Cam => LineStyle("y-"),
            ModelKind::Wrf => LineStyle("b--"),
        }
    }
}

impl fmt::Display for LineStyle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One model's contribution to a panel
///
/// Immutable once built; `data` and `coordinate` always have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    series: Series,
    style: LineStyle,
    label: String,
    source: ModelKind,
}

impl Line {
    /// Wrap a series with the default style and label of its source model
    pub fn from_series(series: Series, source: &DataSource) -> Self {
        Self {
            series,
            style: LineStyle::for_model(source.model),
            label: source.model.label().to_string(),
            source: source.model,
        }
    }

    pub fn data(&self) -> &[f64] {
        self.series.data()
    }

    pub fn coordinate(&self) -> &[f64] {
        self.series.coordinate()
    }

    pub fn style(&self) -> LineStyle {
        self.style
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn source(&self) -> ModelKind {
        self.source
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Every model's line for one variable
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub name: String,
    pub title: String,
    pub kind: PanelKind,
    pub axis_title: Option<String>,
    pub lines: Vec<Line>,
}

impl Panel {
    /// No model produced a line; rendering skips these
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line from the given model, if it contributed
    pub fn line_from(&self, model: ModelKind) -> Option<&Line> {
        self.lines.iter().find(|line| line.source() == model)
    }
}
