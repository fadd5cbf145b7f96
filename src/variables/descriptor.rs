use std::collections::HashMap;
use std::fmt;

use crate::io::{DataReaderError, DatasetAccessor, ModelKind};
use crate::series::Series;
use crate::windowing::DatasetWindow;

pub use crate::series::PanelKind;

/// A derived quantity computed from raw fields of one dataset
///
/// Implementations read whatever fields they need at full resolution, do their
/// own arithmetic, then crop the result to the window's height range.
/// `Ok(None)` means the inputs are there but yield nothing plottable;
/// absence errors (missing field, mismatched grids) mean the inputs are not
/// there. Either way the engine moves on to the next resolution step.
pub trait Computation: Send + Sync {
    /// Compute the quantity for one dataset
    ///
    /// # Arguments
    /// * `dataset` - Dataset to read raw fields from
    /// * `window` - Case window resolved against this dataset
    ///
    /// # Returns
    /// * `Result<Option<Series>, DataReaderError>` - Cropped series, nothing, or error
    fn compute(
        &self,
        dataset: &dyn DatasetAccessor,
        window: &DatasetWindow,
    ) -> Result<Option<Series>, DataReaderError>;
}

impl<F> Computation for F
where
    F: Fn(&dyn DatasetAccessor, &DatasetWindow) -> Result<Option<Series>, DataReaderError>
        + Send
        + Sync,
{
    fn compute(
        &self,
        dataset: &dyn DatasetAccessor,
        window: &DatasetWindow,
    ) -> Result<Option<Series>, DataReaderError> {
        self(dataset, window)
    }
}

/// Declarative description of one physical quantity
///
/// Built once with the chained setters below and read-only afterwards.
pub struct VariableDescriptor {
    name: String,
    aliases: Vec<String>,
    conversion_factor: f64,
    model_factors: HashMap<ModelKind, f64>,
    zero_fill: bool,
    kind: PanelKind,
    fallback: Option<Box<dyn Computation>>,
    overrides: HashMap<ModelKind, Box<dyn Computation>>,
    title: Option<String>,
    axis_title: Option<String>,
}

impl VariableDescriptor {
    /// Descriptor whose canonical name is also its first alias
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            aliases: vec![name.to_string()],
            conversion_factor: 1.0,
            model_factors: HashMap::new(),
            zero_fill: false,
            kind: PanelKind::Profile,
            fallback: None,
            overrides: HashMap::new(),
            title: None,
            axis_title: None,
        }
    }

    /// Append aliases, lowest priority last
    pub fn aliases(mut self, aliases: &[&str]) -> Self {
        for alias in aliases {
            if !self.aliases.iter().any(|a| a == alias) {
                self.aliases.push(alias.to_string());
            }
        }
        self
    }

    /// Factor applied to values read directly through an alias
    pub fn factor(mut self, factor: f64) -> Self {
        self.conversion_factor = factor;
        self
    }

    /// Factor for one model, replacing the descriptor-wide factor for it
    pub fn model_factor(mut self, model: ModelKind, factor: f64) -> Self {
        self.model_factors.insert(model, factor);
        self
    }

    /// Plot zeros rather than nothing when no source is found
    pub fn zero_fill(mut self) -> Self {
        self.zero_fill = true;
        self
    }

    pub fn time_series(mut self) -> Self {
        self.kind = PanelKind::TimeSeries;
        self
    }

    /// Computation tried when no alias is present
    pub fn fallback(mut self, computation: impl Computation + 'static) -> Self {
        self.fallback = Some(Box::new(computation));
        self
    }

    /// Computation used for one model ahead of any alias lookup
    pub fn model_override(
        mut self,
        model: ModelKind,
        computation: impl Computation + 'static,
    ) -> Self {
        self.overrides.insert(model, Box::new(computation));
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn axis_title(mut self, axis_title: &str) -> Self {
        self.axis_title = Some(axis_title.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias_list(&self) -> &[String] {
        &self.aliases
    }

    /// Conversion factor for direct reads from the given model
    pub fn conversion_factor(&self, model: ModelKind) -> f64 {
        self.model_factors
            .get(&model)
            .copied()
            .unwrap_or(self.conversion_factor)
    }

    pub fn is_zero_fill(&self) -> bool {
        self.zero_fill
    }

    pub fn kind(&self) -> PanelKind {
        self.kind
    }

    pub fn fallback_computation(&self) -> Option<&dyn Computation> {
        self.fallback.as_deref()
    }

    pub fn override_for(&self, model: ModelKind) -> Option<&dyn Computation> {
        self.overrides.get(&model).map(|c| c.as_ref())
    }

    /// Panel title; the canonical name unless overridden
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    pub fn axis_title_override(&self) -> Option<&str> {
        self.axis_title.as_deref()
    }
}

impl fmt::Debug for VariableDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut overrides: Vec<_> = self.overrides.keys().map(|m| m.tag()).collect();
        overrides.sort_unstable();
        f.debug_struct("VariableDescriptor")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("conversion_factor", &self.conversion_factor)
            .field("model_factors", &self.model_factors)
            .field("zero_fill", &self.zero_fill)
            .field("kind", &self.kind)
            .field("fallback", &self.fallback.is_some())
            .field("overrides", &overrides)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_name_is_first_alias() {
        let d = VariableDescriptor::new("rcm").aliases(&["QCL", "qcm", "rcm"]);
        assert_eq!(d.name(), "rcm");
        assert_eq!(d.alias_list(), &["rcm", "QCL", "qcm"]);
    }

    #[test]
    fn test_model_factor_overrides_default() {
        let d = VariableDescriptor::new("radht")
            .aliases(&["RADQR"])
            .model_factor(ModelKind::SamLes, 1.0 / 86400.0);
        assert_eq!(d.conversion_factor(ModelKind::Host), 1.0);
        assert_eq!(d.conversion_factor(ModelKind::SamLes), 1.0 / 86400.0);
    }

    #[test]
    fn test_defaults() {
        let d = VariableDescriptor::new("wp2");
        assert_eq!(d.kind(), PanelKind::Profile);
        assert!(!d.is_zero_fill());
        assert!(d.fallback_computation().is_none());
        assert!(d.override_for(ModelKind::SamLes).is_none());
        assert_eq!(d.display_title(), "wp2");
        assert!(d.axis_title_override().is_none());
    }

    fn nothing(
        _: &dyn DatasetAccessor,
        _: &DatasetWindow,
    ) -> Result<Option<Series>, DataReaderError> {
        Ok(None)
    }

    #[test]
    fn test_function_as_computation() {
        let d = VariableDescriptor::new("Skw_zt").model_override(ModelKind::Coamps, nothing);
        assert!(d.override_for(ModelKind::Coamps).is_some());
        assert!(d.override_for(ModelKind::SamLes).is_none());
    }
}
