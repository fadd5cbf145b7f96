//! Benchmark case catalog and the directories its files live under.
//!
//! Case definitions are plain static data. File locations are relative to a
//! per-model root held in [`BenchmarkRoots`], which callers build explicitly.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::groups::GroupKind;
use crate::io::ModelKind;
use crate::windowing::{ConfigurationError, WindowBounds};

/// Default location of the archived benchmark simulations
pub const DEFAULT_BENCHMARK_ROOT: &str = "/usr/local/les_and_clubb_benchmark_runs";

/// Root directories for host and reference model output
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkRoots {
    /// Output of the host simulation being evaluated
    pub host_output: PathBuf,
    pub sam_benchmark: PathBuf,
    /// LES runs, including COAMPS
    pub les: PathBuf,
    pub r408: PathBuf,
    pub hoc: PathBuf,
    pub e3sm: Option<PathBuf>,
    pub cam: Option<PathBuf>,
    pub wrf: Option<PathBuf>,
}

impl BenchmarkRoots {
    /// Roots laid out the way the benchmark archive is organised
    pub fn from_benchmark_root(
        benchmark_root: impl AsRef<Path>,
        host_output: impl AsRef<Path>,
    ) -> Self {
        let root = benchmark_root.as_ref();
        Self {
            host_output: host_output.as_ref().to_path_buf(),
            sam_benchmark: root.join("sam_benchmark_runs"),
            les: root.join("les_runs"),
            r408: root.to_path_buf(),
            hoc: root.join("HOC_20051217"),
            e3sm: None,
            cam: None,
            wrf: None,
        }
    }

    /// Root directory for a model's files, if one is configured
    pub fn root_for(&self, model: ModelKind) -> Option<&Path> {
        match model {
            ModelKind::Host => Some(self.host_output.as_path()),
            ModelKind::SamLes => Some(self.sam_benchmark.as_path()),
            ModelKind::Coamps => Some(self.les.as_path()),
            ModelKind::R408 => Some(self.r408.as_path()),
            ModelKind::Hoc => Some(self.hoc.as_path()),
            ModelKind::E3sm => self.e3sm.as_deref(),
            ModelKind::Cam => self.cam.as_deref(),
            ModelKind::Wrf => self.wrf.as_deref(),
        }
    }
}

/// How one model's output for a case is split across files
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileLayout {
    Single(&'static str),
    /// Named parts, e.g. `zm`/`zt`/`sfc`; earlier parts win on name collisions
    Parts(&'static [(&'static str, &'static str)]),
}

impl FileLayout {
    /// `(part name, absolute path)` pairs under `root`
    pub fn paths(&self, root: &Path) -> Vec<(&'static str, PathBuf)> {
        match self {
            FileLayout::Single(path) => vec![("", root.join(path))],
            FileLayout::Parts(parts) => parts
                .iter()
                .map(|(part, path)| (*part, root.join(path)))
                .collect(),
        }
    }
}

/// Where a reference model's output for a case lives
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceFile {
    pub model: ModelKind,
    pub layout: FileLayout,
}

/// Static description of one benchmark case
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaseDefinition {
    pub name: &'static str,
    pub description: &'static str,
    /// First minute of the averaging interval (1-based model minutes)
    pub start_minutes: f64,
    /// Last minute of the averaging interval; also ends time-series panels
    pub end_minutes: f64,
    pub height_min: f64,
    pub height_max: f64,
    /// Canonical variable names not plotted for this case
    pub blacklist: &'static [&'static str],
    pub groups: &'static [GroupKind],
    pub references: &'static [ReferenceFile],
}

impl CaseDefinition {
    pub fn bounds(&self) -> Result<WindowBounds, ConfigurationError> {
        WindowBounds::new(self.start_minutes, self.end_minutes, self.height_min, self.height_max)
    }

    pub fn blacklist_set(&self) -> BTreeSet<String> {
        self.blacklist.iter().map(|name| name.to_string()).collect()
    }

    /// Host output split by grid: `<case>_zt.nc`, `<case>_zm.nc`, `<case>_sfc.nc`
    pub fn host_paths(&self, host_output: &Path) -> Vec<(&'static str, PathBuf)> {
        ["zt", "zm", "sfc"]
            .iter()
            .map(|part| (*part, host_output.join(format!("{}_{}.nc", self.name, part))))
            .collect()
    }
}

/// Look up a case by name
pub fn find_case(name: &str) -> Option<&'static CaseDefinition> {
    ALL_CASES.iter().find(|case| case.name == name)
}

pub fn case_names() -> Vec<&'static str> {
    ALL_CASES.iter().map(|case| case.name).collect()
}

const BASE: &[GroupKind] = &[GroupKind::Base];
const BASE_AND_MICROPHYSICS: &[GroupKind] =
    &[GroupKind::Base, GroupKind::LiquidMp, GroupKind::IceMp];

pub static ALL_CASES: &[CaseDefinition] =
    &[ARM, ARM_97, ATEX, BOMEX, DYCOMS2_RF01, FIRE, GABLS2, WANGARA];

pub const ARM: CaseDefinition = CaseDefinition {
    name: "arm",
    description: "Output may differ in some models (e.g. WRF) due to a difference in the time averaging interval.",
    start_minutes: 481.0,
    end_minutes: 540.0,
    height_min: 0.0,
    height_max: 3500.0,
    blacklist: &["radht"],
    groups: BASE,
    references: &[
        ReferenceFile {
            model: ModelKind::SamLes,
            layout: FileLayout::Single("JULY_2017/ARM_96x96x110/GCSSARM_96x96x110_67m_40m_1s.nc"),
        },
        ReferenceFile {
            model: ModelKind::Coamps,
            layout: FileLayout::Parts(&[("sm", "arm_coamps_sm.nc"), ("sw", "arm_coamps_sw.nc")]),
        },
        ReferenceFile {
            model: ModelKind::R408,
            layout: FileLayout::Parts(&[
                ("zt", "Chris_Golaz_best_ever/arm_zt.nc"),
                ("zm", "Chris_Golaz_best_ever/arm_zm.nc"),
                ("sfc", "Chris_Golaz_best_ever/arm_sfc.nc"),
            ]),
        },
        ReferenceFile {
            model: ModelKind::Hoc,
            layout: FileLayout::Parts(&[
                ("zt", "arm_zt.nc"),
                ("zm", "arm_zm.nc"),
                ("sfc", "arm_sfc.nc"),
            ]),
        },
        ReferenceFile {
            model: ModelKind::E3sm,
            layout: FileLayout::Single("arm.nc"),
        },
        ReferenceFile {
            model: ModelKind::Wrf,
            layout: FileLayout::Parts(&[
                ("zt", "arm_zt_wrf.nc"),
                ("zm", "arm_zm_wrf.nc"),
                ("sfc", "arm_sfc_wrf.nc"),
            ]),
        },
    ],
};

pub const ARM_97: CaseDefinition = CaseDefinition {
    name: "arm_97",
    description: "",
    start_minutes: 4321.0,
    end_minutes: 5580.0,
    height_min: 0.0,
    height_max: 18000.0,
    blacklist: &["rtp3", "Skrt_zt", "Skthl_zt", "thlp3", "rtpthvp", "thlpthvp"],
    groups: BASE_AND_MICROPHYSICS,
    references: &[ReferenceFile {
        model: ModelKind::SamLes,
        layout: FileLayout::Single("ARM97_r1315_128x128x128_1km_Morrison/ARM9707.nc"),
    }],
};

pub const ATEX: CaseDefinition = CaseDefinition {
    name: "atex",
    description: "",
    start_minutes: 421.0,
    end_minutes: 480.0,
    height_min: 0.0,
    height_max: 2500.0,
    blacklist: &[],
    groups: BASE_AND_MICROPHYSICS,
    references: &[
        ReferenceFile {
            model: ModelKind::Coamps,
            layout: FileLayout::Parts(&[("sm", "atex_coamps_sm.nc"), ("sw", "atex_coamps_sw.nc")]),
        },
        ReferenceFile {
            model: ModelKind::R408,
            layout: FileLayout::Parts(&[
                ("zt", "Chris_Golaz_best_ever/atex_zt.nc"),
                ("zm", "Chris_Golaz_best_ever/atex_zm.nc"),
                ("sfc", "Chris_Golaz_best_ever/atex_sfc.nc"),
            ]),
        },
        ReferenceFile {
            model: ModelKind::Hoc,
            layout: FileLayout::Parts(&[
                ("zt", "atex_zt.nc"),
                ("zm", "atex_zm.nc"),
                ("sfc", "atex_sfc.nc"),
            ]),
        },
        ReferenceFile {
            model: ModelKind::Cam,
            layout: FileLayout::Single("atex_cam.nc"),
        },
        ReferenceFile {
            model: ModelKind::Wrf,
            layout: FileLayout::Parts(&[
                ("zt", "atex_zt_wrf.nc"),
                ("zm", "atex_zm_wrf.nc"),
                ("sfc", "atex_sfc_wrf.nc"),
            ]),
        },
    ],
};

pub const BOMEX: CaseDefinition = CaseDefinition {
    name: "bomex",
    description: "",
    start_minutes: 181.0,
    end_minutes: 360.0,
    height_min: 0.0,
    height_max: 2500.0,
    blacklist: &[],
    groups: BASE,
    references: &[
        ReferenceFile {
            model: ModelKind::SamLes,
            layout: FileLayout::Single("JULY_2017/BOMEX_64x64x75/BOMEX_64x64x75_100m_40m_1s.nc"),
        },
        ReferenceFile {
            model: ModelKind::Coamps,
            layout: FileLayout::Parts(&[
                ("sm", "bomex_coamps_sm.nc"),
                ("sw", "bomex_coamps_sw.nc"),
            ]),
        },
        ReferenceFile {
            model: ModelKind::R408,
            layout: FileLayout::Parts(&[
                ("zt", "Chris_Golaz_best_ever/bomex_zt.nc"),
                ("zm", "Chris_Golaz_best_ever/bomex_zm.nc"),
                ("sfc", "Chris_Golaz_best_ever/bomex_sfc.nc"),
            ]),
        },
        ReferenceFile {
            model: ModelKind::Hoc,
            layout: FileLayout::Parts(&[
                ("zt", "bomex_zt.nc"),
                ("zm", "bomex_zm.nc"),
                ("sfc", "bomex_sfc.nc"),
            ]),
        },
        ReferenceFile {
            model: ModelKind::E3sm,
            layout: FileLayout::Single("bomex.nc"),
        },
        ReferenceFile {
            model: ModelKind::Wrf,
            layout: FileLayout::Parts(&[
                ("zt", "bomex_zt_wrf.nc"),
                ("zm", "bomex_zm_wrf.nc"),
                ("sfc", "bomex_sfc_wrf.nc"),
            ]),
        },
    ],
};

pub const DYCOMS2_RF01: CaseDefinition = CaseDefinition {
    name: "dycoms2_rf01",
    description: "",
    start_minutes: 181.0,
    end_minutes: 240.0,
    height_min: 0.0,
    height_max: 1200.0,
    blacklist: &[],
    groups: BASE,
    references: &[
        ReferenceFile {
            model: ModelKind::SamLes,
            layout: FileLayout::Single("JULY_2017/DYCOMS_RF01_96x96x320/DYCOMS_RF01_96x96x320.nc"),
        },
        ReferenceFile {
            model: ModelKind::R408,
            layout: FileLayout::Parts(&[
                ("zt", "Chris_Golaz_best_ever/dycoms2_rf01_zt.nc"),
                ("zm", "Chris_Golaz_best_ever/dycoms2_rf01_zm.nc"),
                ("sfc", "Chris_Golaz_best_ever/dycoms2_rf01_sfc.nc"),
            ]),
        },
        ReferenceFile {
            model: ModelKind::Hoc,
            layout: FileLayout::Parts(&[
                ("zt", "dycoms2_rf01_zt.nc"),
                ("zm", "dycoms2_rf01_zm.nc"),
                ("sfc", "dycoms2_rf01_sfc.nc"),
            ]),
        },
        ReferenceFile {
            model: ModelKind::E3sm,
            layout: FileLayout::Single("dycoms2_rf01.nc"),
        },
    ],
};

pub const FIRE: CaseDefinition = CaseDefinition {
    name: "fire",
    description: "",
    start_minutes: 61.0,
    end_minutes: 120.0,
    height_min: 0.0,
    height_max: 1000.0,
    blacklist: &[],
    groups: BASE,
    references: &[
        ReferenceFile {
            model: ModelKind::Coamps,
            layout: FileLayout::Parts(&[("sm", "fire_coamps_sm.nc"), ("sw", "fire_coamps_sw.nc")]),
        },
        ReferenceFile {
            model: ModelKind::R408,
            layout: FileLayout::Parts(&[
                ("zt", "Chris_Golaz_best_ever/fire_zt.nc"),
                ("zm", "Chris_Golaz_best_ever/fire_zm.nc"),
                ("sfc", "Chris_Golaz_best_ever/fire_sfc.nc"),
            ]),
        },
        ReferenceFile {
            model: ModelKind::Hoc,
            layout: FileLayout::Parts(&[
                ("zt", "fire_zt.nc"),
                ("zm", "fire_zm.nc"),
                ("sfc", "fire_sfc.nc"),
            ]),
        },
        ReferenceFile {
            model: ModelKind::Wrf,
            layout: FileLayout::Parts(&[
                ("zt", "fire_zt_wrf.nc"),
                ("zm", "fire_zm_wrf.nc"),
                ("sfc", "fire_sfc_wrf.nc"),
            ]),
        },
    ],
};

pub const GABLS2: CaseDefinition = CaseDefinition {
    name: "gabls2",
    description: "",
    start_minutes: 2101.0,
    end_minutes: 2160.0,
    height_min: 0.0,
    height_max: 2500.0,
    blacklist: &[
        "tau_zm",
        "radht",
        "Skw_zt",
        "Skrt_zt",
        "Skthl_zt",
        "corr_w_chi_1",
        "corr_chi_eta_1",
        "rcp2",
        "thlpthvp",
        "rtpthvp",
    ],
    groups: BASE,
    references: &[ReferenceFile {
        model: ModelKind::Coamps,
        layout: FileLayout::Parts(&[
            ("sm", "gabls2_coamps_sm.nc"),
            ("sw", "gabls2_coamps_sw.nc"),
            ("sfc", "gabls2_coamps_sfc.nc"),
        ]),
    }],
};

pub const WANGARA: CaseDefinition = CaseDefinition {
    name: "wangara",
    description: "",
    start_minutes: 181.0,
    end_minutes: 240.0,
    height_min: 0.0,
    height_max: 1900.0,
    blacklist: &["Ngm"],
    groups: BASE,
    references: &[
        // RAMS output stands in for COAMPS; one file holds both grids
        ReferenceFile {
            model: ModelKind::Coamps,
            layout: FileLayout::Single("wangara_rams.nc"),
        },
        ReferenceFile {
            model: ModelKind::R408,
            layout: FileLayout::Parts(&[
                ("zt", "Chris_Golaz_best_ever/wangara_zt.nc"),
                ("zm", "Chris_Golaz_best_ever/wangara_zm.nc"),
                ("sfc", "Chris_Golaz_best_ever/wangara_sfc.nc"),
            ]),
        },
        ReferenceFile {
            model: ModelKind::Hoc,
            layout: FileLayout::Parts(&[
                ("zt", "wangara_zt.nc"),
                ("zm", "wangara_zm.nc"),
                ("sfc", "wangara_sfc.nc"),
            ]),
        },
        ReferenceFile {
            model: ModelKind::Wrf,
            layout: FileLayout::Parts(&[
                ("zt", "wangara_zt_wrf.nc"),
                ("zm", "wangara_zm_wrf.nc"),
                ("sfc", "wangara_sfc_wrf.nc"),
            ]),
        },
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_case_has_valid_bounds() {
        for case in ALL_CASES {
            assert!(case.bounds().is_ok(), "{} has invalid bounds", case.name);
        }
    }

    #[test]
    fn test_case_names_unique() {
        let names: BTreeSet<&str> = ALL_CASES.iter().map(|c| c.name).collect();
        assert_eq!(names.len(), ALL_CASES.len());
    }

    #[test]
    fn test_find_case() {
        let bomex = find_case("bomex").unwrap();
        assert_eq!(bomex.start_minutes, 181.0);
        assert_eq!(bomex.end_minutes, 360.0);
        assert!(find_case("lba").is_none());
    }

    #[test]
    fn test_blacklist_set() {
        let arm = find_case("arm").unwrap();
        assert!(arm.blacklist_set().contains("radht"));
    }

    #[test]
    fn test_host_paths() {
        let paths = BOMEX.host_paths(Path::new("/out"));
        assert_eq!(paths[0], ("zt", PathBuf::from("/out/bomex_zt.nc")));
        assert_eq!(paths.len(), 3);
    }

    #[test]
    fn test_roots_layout() {
        let roots = BenchmarkRoots::from_benchmark_root("/bench", "/out");
        assert_eq!(roots.root_for(ModelKind::SamLes), Some(Path::new("/bench/sam_benchmark_runs")));
        assert_eq!(roots.root_for(ModelKind::Hoc), Some(Path::new("/bench/HOC_20051217")));
        assert_eq!(roots.root_for(ModelKind::Wrf), None);
    }
}
