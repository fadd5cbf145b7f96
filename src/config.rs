use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

use crate::cases::{case_names, find_case, BenchmarkRoots, DEFAULT_BENCHMARK_ROOT};

/// Settings for one `run` invocation
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub roots: BenchmarkRoots,
    /// Cases to process; empty means every catalog case
    pub cases: Vec<String>,
    /// Plot reference models alongside the host
    pub plot_references: bool,
    /// Worker threads; 1 processes cases sequentially
    pub num_threads: usize,
    pub verbose: bool,
}

impl RunConfig {
    /// Configuration for a host output directory with default roots
    pub fn new(host_output: impl Into<PathBuf>) -> Self {
        let host_output: PathBuf = host_output.into();
        Self {
            roots: BenchmarkRoots::from_benchmark_root(DEFAULT_BENCHMARK_ROOT, host_output),
            cases: Vec::new(),
            plot_references: true,
            num_threads: 1,
            verbose: false,
        }
    }

    /// The `run` subcommand
    pub fn command() -> Command {
        Command::new("run")
            .about("Resolve every variable group of the selected cases")
            .arg(
                Arg::new("host-output")
                    .short('o')
                    .long("host-output")
                    .value_name("DIR")
                    .help("Directory holding the host model's <case>_zm/zt/sfc.nc files")
                    .value_parser(value_parser!(PathBuf))
                    .required(true),
            )
            .arg(
                Arg::new("case")
                    .short('c')
                    .long("case")
                    .value_name("NAME")
                    .help("Case to process (repeatable); all cases when omitted")
                    .action(ArgAction::Append),
            )
            .arg(
                Arg::new("benchmark-root")
                    .long("benchmark-root")
                    .value_name("DIR")
                    .help("Root of the archived benchmark runs")
                    .value_parser(value_parser!(PathBuf))
                    .default_value(DEFAULT_BENCHMARK_ROOT),
            )
            .arg(root_arg(
                "sam-root",
                "SAM benchmark runs (default: <benchmark-root>/sam_benchmark_runs)",
            ))
            .arg(root_arg(
                "les-root",
                "LES runs incl. COAMPS (default: <benchmark-root>/les_runs)",
            ))
            .arg(root_arg("r408-root", "CLUBB r408 runs (default: <benchmark-root>)"))
            .arg(root_arg("hoc-root", "HOC runs (default: <benchmark-root>/HOC_20051217)"))
            .arg(root_arg("e3sm-root", "E3SM output"))
            .arg(root_arg("cam-root", "CAM output"))
            .arg(root_arg("wrf-root", "WRF-CLUBB output"))
            .arg(
                Arg::new("no-references")
                    .long("no-references")
                    .help("Plot the host model only")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("threads")
                    .short('j')
                    .long("threads")
                    .value_name("COUNT")
                    .help("Number of cases processed in parallel")
                    .value_parser(value_parser!(usize))
                    .default_value("1"),
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .help("Enable debug logging")
                    .action(ArgAction::SetTrue),
            )
    }

    /// Build and validate a configuration from parsed `run` arguments
    pub fn from_matches(matches: &ArgMatches) -> Result<Self, String> {
        let host_output = matches
            .get_one::<PathBuf>("host-output")
            .cloned()
            .ok_or("Missing --host-output")?;
        let benchmark_root = matches
            .get_one::<PathBuf>("benchmark-root")
            .cloned()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BENCHMARK_ROOT));

        let mut roots = BenchmarkRoots::from_benchmark_root(&benchmark_root, &host_output);
        let root = |name: &str| matches.get_one::<PathBuf>(name).cloned();
        if let Some(dir) = root("sam-root") {
            roots.sam_benchmark = dir;
        }
        if let Some(dir) = root("les-root") {
            roots.les = dir;
        }
        if let Some(dir) = root("r408-root") {
            roots.r408 = dir;
        }
        if let Some(dir) = root("hoc-root") {
            roots.hoc = dir;
        }
        roots.e3sm = root("e3sm-root");
        roots.cam = root("cam-root");
        roots.wrf = root("wrf-root");

        let cases = matches
            .get_many::<String>("case")
            .map(|values| values.cloned().collect())
            .unwrap_or_default();

        let config = Self {
            roots,
            cases,
            plot_references: !matches.get_flag("no-references"),
            num_threads: matches.get_one::<usize>("threads").copied().unwrap_or(1),
            verbose: matches.get_flag("verbose"),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if !self.roots.host_output.is_dir() {
            return Err(format!(
                "Host output directory does not exist: {}",
                self.roots.host_output.display()
            ));
        }
        if self.num_threads == 0 {
            return Err("Thread count must be at least 1".to_string());
        }
        for name in &self.cases {
            if find_case(name).is_none() {
                return Err(format!(
                    "Unknown case: {}. Known cases: {}",
                    name,
                    case_names().join(", ")
                ));
            }
        }
        Ok(())
    }

    /// Cases to process, in catalog order when none were named
    pub fn selected_cases(&self) -> Vec<String> {
        if self.cases.is_empty() {
            case_names().into_iter().map(str::to_string).collect()
        } else {
            self.cases.clone()
        }
    }
}

fn root_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name("DIR")
        .help(help)
        .value_parser(value_parser!(PathBuf))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<RunConfig, String> {
        let matches = RunConfig::command()
            .try_get_matches_from(std::iter::once("run").chain(args.iter().copied()))
            .map_err(|e| e.to_string())?;
        RunConfig::from_matches(&matches)
    }

    #[test]
    fn test_parse_run_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let host = dir.path().to_str().unwrap();
        let config = parse(&[
            "--host-output",
            host,
            "--case",
            "bomex",
            "--case",
            "fire",
            "--wrf-root",
            "/data/wrf",
            "-j",
            "4",
        ])
        .unwrap();

        assert_eq!(config.cases, vec!["bomex", "fire"]);
        assert_eq!(config.num_threads, 4);
        assert!(config.plot_references);
        assert_eq!(config.roots.wrf, Some(PathBuf::from("/data/wrf")));
        assert_eq!(config.roots.cam, None);
    }

    #[test]
    fn test_unknown_case_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let host = dir.path().to_str().unwrap();
        let err = parse(&["--host-output", host, "--case", "lba"]).unwrap_err();
        assert!(err.contains("Unknown case"));
    }

    #[test]
    fn test_missing_host_directory_rejected() {
        let err = parse(&["--host-output", "/nonexistent/clubb/output"]).unwrap_err();
        assert!(err.contains("does not exist"));
    }

    #[test]
    fn test_selected_cases_defaults_to_catalog() {
        let config = RunConfig::new("/tmp");
        assert_eq!(config.selected_cases().len(), crate::cases::ALL_CASES.len());
    }

    #[test]
    fn test_zero_threads_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = RunConfig::new(dir.path());
        config.num_threads = 0;
        assert!(config.validate().is_err());
    }
}
