use chrono::{DateTime, Local};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::cases::{find_case, BenchmarkRoots, CaseDefinition, FileLayout};
use crate::group::{CaseInputs, VariableGroup};
use crate::io::{CompositeDataset, DataReaderError, DatasetAccessor, ModelKind, NetCdfDataset};
use crate::resolve::ResolveError;
use crate::series::Panel;
use crate::windowing::ConfigurationError;

/// Errors that abort one case; other cases keep running
#[derive(Error, Debug)]
pub enum CaseError {
    #[error("Invalid case configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("I/O failure on {dataset} ({context}): {source}")]
    Io {
        dataset: String,
        context: String,
        #[source]
        source: DataReaderError,
    },

    #[error("No host output found for case {0}")]
    MissingHostDataset(String),

    #[error("Unknown case: {0}")]
    UnknownCase(String),
}

impl From<ResolveError> for CaseError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Configuration(e) => CaseError::Configuration(e),
            ResolveError::Io {
                dataset,
                variable,
                source,
            } => CaseError::Io {
                dataset,
                context: format!("reading {}", variable),
                source,
            },
        }
    }
}

/// Panels produced by one variable group
#[derive(Debug, Clone)]
pub struct GroupPanels {
    pub group: String,
    pub panels: Vec<Panel>,
}

/// Result of running one case
#[derive(Debug, Clone)]
pub struct CaseReport {
    pub case: String,
    pub generated_at: DateTime<Local>,
    pub groups: Vec<GroupPanels>,
}

impl CaseReport {
    pub fn panels(&self) -> impl Iterator<Item = &Panel> {
        self.groups.iter().flat_map(|g| g.panels.iter())
    }

    /// First panel with the given canonical name
    pub fn panel(&self, name: &str) -> Option<&Panel> {
        self.panels().find(|p| p.name == name)
    }

    pub fn panel_count(&self) -> usize {
        self.panels().count()
    }

    pub fn empty_panel_count(&self) -> usize {
        self.panels().filter(|p| p.is_empty()).count()
    }

    pub fn line_count(&self) -> usize {
        self.panels().map(|p| p.lines.len()).sum()
    }
}

impl fmt::Display for CaseReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "{} ({}): {} panels, {} empty, {} lines",
            self.case,
            self.generated_at.format("%Y-%m-%d %H:%M:%S"),
            self.panel_count(),
            self.empty_panel_count(),
            self.line_count()
        )?;
        for group in &self.groups {
            let filled = group.panels.iter().filter(|p| !p.is_empty()).count();
            writeln!(f, "  {}: {}/{} panels with data", group.group, filled, group.panels.len())?;
        }
        Ok(())
    }
}

/// One benchmark case with its datasets opened
pub struct Case {
    definition: CaseDefinition,
    host: Box<dyn DatasetAccessor>,
    references: Vec<Box<dyn DatasetAccessor>>,
    groups: Vec<VariableGroup>,
}

impl Case {
    /// Open a catalog case by name
    pub fn open_by_name(
        name: &str,
        roots: &BenchmarkRoots,
        plot_references: bool,
    ) -> Result<Self, CaseError> {
        let definition = find_case(name).ok_or_else(|| CaseError::UnknownCase(name.to_string()))?;
        Self::open(*definition, roots, plot_references)
    }

    /// Open the host output and every reference file that exists on disk
    ///
    /// Missing reference files are skipped. A host with none of its files
    /// present fails the case.
    pub fn open(
        definition: CaseDefinition,
        roots: &BenchmarkRoots,
        plot_references: bool,
    ) -> Result<Self, CaseError> {
        let host_paths = definition.host_paths(&roots.host_output);
        let host = open_parts(ModelKind::Host, definition.name, host_paths)?
            .ok_or_else(|| CaseError::MissingHostDataset(definition.name.to_string()))?;

        let mut references = Vec::new();
        if plot_references {
            for reference in definition.references {
                let root = match roots.root_for(reference.model) {
                    Some(root) => root,
                    None => {
                        debug!(
                            case = definition.name,
                            model = %reference.model,
                            "no root configured"
                        );
                        continue;
                    }
                };
                let paths = reference.layout.paths(root);
                let dataset = match reference.layout {
                    FileLayout::Single(_) => open_single(reference.model, paths)?,
                    FileLayout::Parts(_) => open_parts(reference.model, definition.name, paths)?,
                };
                match dataset {
                    Some(dataset) => references.push(dataset),
                    None => info!(
                        case = definition.name,
                        model = %reference.model,
                        "reference output not found"
                    ),
                }
            }
        }

        Ok(Self::from_datasets(definition, host, references))
    }

    /// Assemble a case from datasets opened elsewhere
    pub fn from_datasets(
        definition: CaseDefinition,
        host: Box<dyn DatasetAccessor>,
        references: Vec<Box<dyn DatasetAccessor>>,
    ) -> Self {
        let groups = definition.groups.iter().map(|kind| kind.build()).collect();
        Self {
            definition,
            host,
            references,
            groups,
        }
    }

    pub fn name(&self) -> &str {
        self.definition.name
    }

    pub fn definition(&self) -> &CaseDefinition {
        &self.definition
    }

    /// Models with a dataset in this case, host first
    pub fn models(&self) -> Vec<ModelKind> {
        std::iter::once(self.host.source().model)
            .chain(self.references.iter().map(|r| r.source().model))
            .collect()
    }

    /// Resolve every group of the case
    pub fn run(&self) -> Result<CaseReport, CaseError> {
        let bounds = self.definition.bounds()?;
        let blacklist = self.definition.blacklist_set();
        let inputs = CaseInputs {
            bounds,
            blacklist: &blacklist,
            host: self.host.as_ref(),
            references: self.references.iter().map(|r| r.as_ref()).collect(),
        };

        info!(case = self.name(), references = self.references.len(), "running case");
        let mut groups = Vec::with_capacity(self.groups.len());
        for group in &self.groups {
            let panels = group.build_panels(&inputs)?;
            debug!(
                case = self.name(),
                group = group.name(),
                panels = panels.len(),
                "group resolved"
            );
            groups.push(GroupPanels {
                group: group.name().to_string(),
                panels,
            });
        }

        let report = CaseReport {
            case: self.name().to_string(),
            generated_at: Local::now(),
            groups,
        };
        if report.empty_panel_count() > 0 {
            info!(
                case = self.name(),
                empty = report.empty_panel_count(),
                "some panels have no data from any model"
            );
        }
        Ok(report)
    }
}

fn open_error(path: &Path, source: DataReaderError) -> CaseError {
    CaseError::Io {
        dataset: path.display().to_string(),
        context: "opening".to_string(),
        source,
    }
}

fn open_single(
    model: ModelKind,
    paths: Vec<(&str, PathBuf)>,
) -> Result<Option<Box<dyn DatasetAccessor>>, CaseError> {
    for (_, path) in paths {
        if !path.is_file() {
            continue;
        }
        let dataset = NetCdfDataset::open(model, &path).map_err(|e| open_error(&path, e))?;
        return Ok(Some(Box::new(dataset)));
    }
    Ok(None)
}

/// Open the parts that exist; `None` when none do
fn open_parts(
    model: ModelKind,
    case: &str,
    paths: Vec<(&str, PathBuf)>,
) -> Result<Option<Box<dyn DatasetAccessor>>, CaseError> {
    let mut composite = CompositeDataset::new(model, format!("{}/{}", model, case));
    for (part, path) in paths {
        if !path.is_file() {
            debug!(case, model = %model, part, path = %path.display(), "part not found");
            continue;
        }
        let dataset = NetCdfDataset::open(model, &path).map_err(|e| open_error(&path, e))?;
        composite.push_part(part, Box::new(dataset));
    }

    if composite.is_empty() {
        Ok(None)
    } else {
        Ok(Some(Box::new(composite)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_case() {
        let roots = BenchmarkRoots::from_benchmark_root("/nonexistent", "/nonexistent");
        assert!(matches!(
            Case::open_by_name("lba", &roots, false),
            Err(CaseError::UnknownCase(_))
        ));
    }

    #[test]
    fn test_missing_host_output() {
        let roots = BenchmarkRoots::from_benchmark_root("/nonexistent", "/nonexistent");
        assert!(matches!(
            Case::open_by_name("bomex", &roots, true),
            Err(CaseError::MissingHostDataset(_))
        ));
    }

    #[test]
    fn test_resolve_error_conversion_keeps_context() {
        let err: CaseError = ResolveError::Io {
            dataset: "host (bomex)".to_string(),
            variable: "thlm".to_string(),
            source: DataReaderError::Poisoned("bomex".to_string()),
        }
        .into();
        let message = err.to_string();
        assert!(message.contains("host (bomex)"));
        assert!(message.contains("thlm"));
    }
}
