use crate::group::VariableGroup;
use crate::io::ModelKind;
use crate::variables::formulas::NumberConcentration;
use crate::variables::VariableDescriptor;

/// Warm-rain microphysics
pub fn group() -> VariableGroup {
    let descriptors = vec![
        VariableDescriptor::new("Ncm")
            .model_override(ModelKind::SamLes, NumberConcentration::zero_filled("NC")),
        VariableDescriptor::new("Nc_in_cloud"),
        VariableDescriptor::new("precip_frac"),
        VariableDescriptor::new("rrm")
            .aliases(&["QPL"])
            .model_factor(ModelKind::SamLes, 1.0 / 1000.0),
        VariableDescriptor::new("Nrm")
            .model_override(ModelKind::SamLes, NumberConcentration::zero_filled("NR")),
        VariableDescriptor::new("rwp")
            .aliases(&["RWP"])
            .model_factor(ModelKind::SamLes, 1.0 / 1000.0)
            .time_series(),
    ];

    VariableGroup::new("liquid mp variables", descriptors)
}
