use plotgen_rust::group::{CaseInputs, VariableGroup};
use plotgen_rust::groups::GroupKind;
use plotgen_rust::io::{DatasetAccessor, InMemoryDataset, ModelKind};
use plotgen_rust::series::PanelKind;
use plotgen_rust::variables::VariableDescriptor;
use plotgen_rust::windowing::WindowBounds;
use std::collections::BTreeSet;

fn host() -> InMemoryDataset {
    InMemoryDataset::new(ModelKind::Host, "bomex_zt.nc")
        .with_height(vec![0.0, 500.0, 1000.0, 1500.0])
        .with_time_minutes(vec![1.0, 2.0, 3.0, 4.0])
        .with_profile("thlm", vec![298.0, 299.0, 300.0, 301.0])
        .with_profile("radht", vec![-1.0e-5, -2.0e-5, -1.5e-5, 0.0])
}

fn bounds() -> WindowBounds {
    WindowBounds::new(2.0, 4.0, 0.0, 1000.0).unwrap()
}

#[test]
fn test_blacklisted_variable_has_no_panel() {
    let host = host();
    let blacklist: BTreeSet<String> = ["radht".to_string()].into_iter().collect();
    let inputs = CaseInputs {
        bounds: bounds(),
        blacklist: &blacklist,
        host: &host,
        references: Vec::new(),
    };

    let group = GroupKind::Base.build();
    let panels = group.build_panels(&inputs).unwrap();

    assert!(panels.iter().all(|p| p.name != "radht"));
    let thlm = panels.iter().find(|p| p.name == "thlm").unwrap();
    assert_eq!(thlm.lines.len(), 1);
    assert_eq!(thlm.lines[0].len(), 3);
    assert_eq!(panels.len(), group.descriptors().len() - 1);
}

#[test]
fn test_unblacklisted_variable_resolves() {
    let host = host();
    let blacklist = BTreeSet::new();
    let inputs = CaseInputs {
        bounds: bounds(),
        blacklist: &blacklist,
        host: &host,
        references: Vec::new(),
    };

    let panels = GroupKind::Base.build().build_panels(&inputs).unwrap();
    let radht = panels.iter().find(|p| p.name == "radht").unwrap();
    assert!(!radht.is_empty());
}

#[test]
fn test_panel_with_no_source_is_kept_empty() {
    let host = host();
    let blacklist = BTreeSet::new();
    let inputs = CaseInputs {
        bounds: bounds(),
        blacklist: &blacklist,
        host: &host,
        references: Vec::new(),
    };
    let group = VariableGroup::new(
        "test",
        vec![
            VariableDescriptor::new("thlm"),
            VariableDescriptor::new("Ngm").aliases(&["NG"]),
        ],
    );

    let panels = group.build_panels(&inputs).unwrap();
    assert_eq!(panels.len(), 2);
    assert!(!panels[0].is_empty());
    assert!(panels[1].is_empty());
    assert_eq!(panels[1].kind, PanelKind::Profile);
}

#[test]
fn test_reference_lines_follow_host() {
    let host = host();
    let sam = InMemoryDataset::new(ModelKind::SamLes, "BOMEX_64x64x75_100m_40m_1s.nc")
        .with_height(vec![0.0, 400.0, 800.0])
        .with_time_minutes(vec![1.0, 2.0, 3.0, 4.0, 5.0])
        .with_profile("QCL", vec![0.0, 0.25, 0.5]);
    let coamps = InMemoryDataset::new(ModelKind::Coamps, "bomex_coamps_sm.nc")
        .with_height(vec![0.0, 250.0, 750.0])
        .with_time_minutes(vec![1.0, 2.0, 3.0, 4.0])
        .with_profile("qcm", vec![0.0, 1.0e-5, 2.0e-5]);

    let blacklist = BTreeSet::new();
    let inputs = CaseInputs {
        bounds: bounds(),
        blacklist: &blacklist,
        host: &host,
        references: vec![&coamps as &dyn DatasetAccessor, &sam],
    };
    let group = VariableGroup::new(
        "test",
        vec![VariableDescriptor::new("rcm")
            .aliases(&["QCL", "qcm"])
            .model_factor(ModelKind::SamLes, 1.0 / 1000.0)],
    );

    let panels = group.build_panels(&inputs).unwrap();
    let rcm = &panels[0];
    let models: Vec<ModelKind> = rcm.lines.iter().map(|l| l.source()).collect();
    assert_eq!(models, vec![ModelKind::SamLes, ModelKind::Coamps]);
    assert_eq!(
        rcm.line_from(ModelKind::SamLes).unwrap().data(),
        &[0.0, 0.25 * (1.0 / 1000.0), 0.5 * (1.0 / 1000.0)]
    );
}
