use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::io::DatasetAccessor;
use crate::resolve::{dataset_window, resolve_in_window, ResolveError};
use crate::series::Panel;
use crate::variables::VariableDescriptor;
use crate::windowing::{DatasetWindow, WindowBounds};

/// Everything a variable group needs from the case it runs in
pub struct CaseInputs<'a> {
    pub bounds: WindowBounds,
    /// Canonical names to skip for this case
    pub blacklist: &'a BTreeSet<String>,
    pub host: &'a dyn DatasetAccessor,
    /// Reference datasets in any order; panels list them in model order
    pub references: Vec<&'a dyn DatasetAccessor>,
}

impl<'a> CaseInputs<'a> {
    /// Host first, then references ordered by model kind
    pub fn datasets(&self) -> Vec<&'a dyn DatasetAccessor> {
        let mut references = self.references.clone();
        references.sort_by_key(|ds| ds.source().model);

        let mut datasets = Vec::with_capacity(references.len() + 1);
        datasets.push(self.host);
        datasets.extend(references);
        datasets
    }

    pub fn is_blacklisted(&self, name: &str) -> bool {
        self.blacklist.contains(name)
    }
}

/// An ordered table of descriptors for one thematic set of variables
#[derive(Debug)]
pub struct VariableGroup {
    name: String,
    descriptors: Vec<VariableDescriptor>,
}

impl VariableGroup {
    pub fn new(name: &str, descriptors: Vec<VariableDescriptor>) -> Self {
        Self {
            name: name.to_string(),
            descriptors,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptors(&self) -> &[VariableDescriptor] {
        &self.descriptors
    }

    pub fn descriptor(&self, name: &str) -> Option<&VariableDescriptor> {
        self.descriptors.iter().find(|d| d.name() == name)
    }

    /// Resolve every descriptor against every dataset of the case
    ///
    /// One panel per non-blacklisted descriptor, in declaration order. Lines
    /// within a panel follow the dataset order of [`CaseInputs::datasets`].
    /// Panels nobody could fill are kept and report `is_empty()`.
    ///
    /// # Arguments
    /// * `inputs` - Case bounds, blacklist and datasets
    ///
    /// # Returns
    /// * `Result<Vec<Panel>, ResolveError>` - Panels, or the error that aborts the case
    pub fn build_panels(&self, inputs: &CaseInputs) -> Result<Vec<Panel>, ResolveError> {
        let windows: Vec<(&dyn DatasetAccessor, Option<DatasetWindow>)> = inputs
            .datasets()
            .into_iter()
            .map(|ds| dataset_window(&inputs.bounds, ds).map(|window| (ds, window)))
            .collect::<Result<_, ResolveError>>()?;

        let mut panels = Vec::with_capacity(self.descriptors.len());
        for descriptor in &self.descriptors {
            if inputs.is_blacklisted(descriptor.name()) {
                debug!(group = %self.name, variable = descriptor.name(), "blacklisted, skipping");
                continue;
            }

            let mut lines = Vec::new();
            for (dataset, window) in &windows {
                let window = match window {
                    Some(window) => window,
                    None => continue,
                };
                if let Some(line) = resolve_in_window(descriptor, *dataset, window)?.into_line() {
                    lines.push(line);
                }
            }

            if lines.is_empty() {
                info!(
                    group = %self.name,
                    variable = descriptor.name(),
                    "no model provides this variable"
                );
            }
            panels.push(Panel {
                name: descriptor.name().to_string(),
                title: descriptor.display_title().to_string(),
                kind: descriptor.kind(),
                axis_title: descriptor.axis_title_override().map(str::to_string),
                lines,
            });
        }

        Ok(panels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{InMemoryDataset, ModelKind};

    fn dataset(model: ModelKind) -> InMemoryDataset {
        InMemoryDataset::new(model, model.tag())
            .with_height(vec![0.0, 100.0])
            .with_time_minutes(vec![1.0, 2.0])
            .with_profile("wp2", vec![0.1, 0.2])
    }

    #[test]
    fn test_reference_order_is_model_order() {
        let host = dataset(ModelKind::Host);
        let wrf = dataset(ModelKind::Wrf);
        let sam = dataset(ModelKind::SamLes);
        let blacklist = BTreeSet::new();
        let inputs = CaseInputs {
            bounds: WindowBounds::new(1.0, 2.0, 0.0, 1000.0).unwrap(),
            blacklist: &blacklist,
            host: &host,
            references: vec![&wrf as &dyn DatasetAccessor, &sam],
        };

        let group = VariableGroup::new("test", vec![VariableDescriptor::new("wp2")]);
        let panels = group.build_panels(&inputs).unwrap();
        let order: Vec<ModelKind> = panels[0].lines.iter().map(|l| l.source()).collect();
        assert_eq!(order, vec![ModelKind::Host, ModelKind::SamLes, ModelKind::Wrf]);
    }

    #[test]
    fn test_descriptor_lookup() {
        let group = VariableGroup::new(
            "test",
            vec![VariableDescriptor::new("thlm"), VariableDescriptor::new("rtm")],
        );
        assert_eq!(group.name(), "test");
        assert!(group.descriptor("rtm").is_some());
        assert!(group.descriptor("wp2").is_none());
        assert_eq!(group.descriptors().len(), 2);
    }
}
