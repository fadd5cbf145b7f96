use crate::group::VariableGroup;
use crate::io::ModelKind;
use crate::variables::formulas::{NumberConcentration, ScaledField};
use crate::variables::VariableDescriptor;

const G_PER_KG: f64 = 1.0 / 1000.0;

/// Ice-phase microphysics
pub fn group() -> VariableGroup {
    let descriptors = vec![
        VariableDescriptor::new("rim")
            .aliases(&["QI"])
            .model_factor(ModelKind::SamLes, G_PER_KG)
            .fallback(ScaledField::new("QCI", G_PER_KG)),
        VariableDescriptor::new("Nim")
            .model_override(ModelKind::SamLes, NumberConcentration::new("NI")),
        VariableDescriptor::new("rsm")
            .aliases(&["QS"])
            .model_factor(ModelKind::SamLes, G_PER_KG)
            .fallback(ScaledField::new("QPI", G_PER_KG)),
        VariableDescriptor::new("Nsm")
            .model_override(ModelKind::SamLes, NumberConcentration::new("NS")),
        VariableDescriptor::new("iwp")
            .aliases(&["IWP"])
            .time_series()
            .model_factor(ModelKind::SamLes, G_PER_KG),
        VariableDescriptor::new("swp")
            .aliases(&["SWP"])
            .time_series()
            .model_factor(ModelKind::SamLes, G_PER_KG),
        VariableDescriptor::new("ice_supersat_frac"),
        VariableDescriptor::new("Ngm")
            .aliases(&["NG"])
            .model_factor(ModelKind::SamLes, 1.0e6)
            .zero_fill(),
        VariableDescriptor::new("rgm")
            .aliases(&["QG"])
            .model_factor(ModelKind::SamLes, G_PER_KG),
    ];

    VariableGroup::new("ice mp variables", descriptors)
}
