use crate::group::VariableGroup;
use crate::io::ModelKind;
use crate::math::physics::{SKRT_EPSILON, SKTHL_EPSILON_UNRESOLVED, SKW_EPSILON};
use crate::variables::formulas::{
    CloudWaterContribution, FieldProduct, FieldSum, FirstOf, KinematicFlux, SamThetaL,
    SamTotalWater, ScaledField, Skewness,
};
use crate::variables::VariableDescriptor;

const W_THIRD: &[&str] = &["WP3", "W3", "wp3"];
const W_SECOND: &[&str] = &["WP2", "W2", "wp2"];
const RT_THIRD: &[&str] = &["RTP3", "qtp3"];
const RT_SECOND: &[&str] = &["RTP2", "qtp2"];
const THL_THIRD: &[&str] = &["THLP3", "thlp3"];
const THL_SECOND: &[&str] = &["THLP2", "thlp2"];

/// Mean state, fluxes, variances and higher moments
pub fn group() -> VariableGroup {
    let skw = Skewness {
        third: W_THIRD,
        second: W_SECOND,
        epsilon: SKW_EPSILON,
    };
    let skrt = Skewness {
        third: RT_THIRD,
        second: RT_SECOND,
        epsilon: SKRT_EPSILON,
    };
    let skthl = Skewness {
        third: THL_THIRD,
        second: THL_SECOND,
        epsilon: SKTHL_EPSILON_UNRESOLVED,
    };

    let descriptors = vec![
        VariableDescriptor::new("thlm").model_override(ModelKind::SamLes, SamThetaL),
        VariableDescriptor::new("rtm")
            .aliases(&["qtm"])
            .model_override(ModelKind::SamLes, SamTotalWater),
        VariableDescriptor::new("wpthlp")
            .aliases(&["WPTHLP"])
            .fallback(KinematicFlux::heat("TLFLUX")),
        VariableDescriptor::new("wprtp")
            .aliases(&["WPRTP", "wpqtp"])
            .fallback(KinematicFlux::moisture("QTFLUX")),
        VariableDescriptor::new("cloud_frac").aliases(&["cf", "CLD"]),
        VariableDescriptor::new("rcm")
            .aliases(&["QCL", "qcm"])
            .model_factor(ModelKind::SamLes, 1.0 / 1000.0),
        VariableDescriptor::new("wp2").aliases(&["W2", "WP2"]),
        VariableDescriptor::new("wp3").aliases(&["W3", "WP3"]),
        VariableDescriptor::new("thlp2")
            .aliases(&["THLP2"])
            .fallback(ScaledField::new("TL2", 1.0)),
        VariableDescriptor::new("rtp2")
            .aliases(&["RTP2", "qtp2"])
            .fallback(ScaledField::new("QT2", 1.0e-6)),
        VariableDescriptor::new("rtpthlp")
            .aliases(&["RTPTHLP", "qtpthlp"])
            .fallback(ScaledField::new("TQ", 1.0)),
        VariableDescriptor::new("rtp3").aliases(&["RTP3", "qtp3"]).fallback(
            FirstOf::new()
                .or(FieldProduct::new("rc_coef_zm", "rtprcp"))
                .or(CloudWaterContribution {
                    flux: "QCFLUX",
                    density: Some("RHO"),
                    zero_fill: false,
                }),
        ),
        VariableDescriptor::new("thlp3").aliases(&["THLP3"]),
        VariableDescriptor::new("Skw_zt")
            .model_override(ModelKind::SamLes, skw)
            .model_override(ModelKind::Coamps, skw)
            .zero_fill(),
        VariableDescriptor::new("Skrt_zt")
            .model_override(ModelKind::SamLes, skrt)
            .model_override(ModelKind::Coamps, skrt)
            .zero_fill(),
        VariableDescriptor::new("Skthl_zt")
            .model_override(ModelKind::SamLes, skthl)
            .model_override(ModelKind::Coamps, skthl)
            .zero_fill(),
        VariableDescriptor::new("wm").aliases(&["WOBS", "wlsm"]),
        VariableDescriptor::new("um").aliases(&["U"]),
        VariableDescriptor::new("vm").aliases(&["V"]),
        VariableDescriptor::new("upwp").aliases(&["UW"]).model_override(
            ModelKind::Coamps,
            FieldSum {
                fields: &["wpup", "wpup_sgs"],
            },
        ),
        // TODO: COAMPS vpwp is wpvp + wpvp_sgs once the sw files carry both
        VariableDescriptor::new("vpwp").aliases(&["VW"]),
        VariableDescriptor::new("up2").aliases(&["U2"]),
        VariableDescriptor::new("vp2").aliases(&["V2"]),
        VariableDescriptor::new("rcp2")
            .aliases(&["QC2", "qcp2"])
            .model_factor(ModelKind::SamLes, 1.0e-6),
        VariableDescriptor::new("lwp")
            .aliases(&["CWP"])
            .time_series()
            .model_factor(ModelKind::SamLes, 1.0 / 1000.0),
        VariableDescriptor::new("wp2_vert_avg")
            .aliases(&["CWP"])
            .time_series()
            .zero_fill(),
        VariableDescriptor::new("tau_zm").zero_fill(),
        VariableDescriptor::new("Lscale").zero_fill(),
        VariableDescriptor::new("wpthvp")
            .aliases(&["WPTHVP"])
            .fallback(KinematicFlux::heat("TVFLUX")),
        VariableDescriptor::new("radht")
            .aliases(&["RADQR"])
            .model_factor(ModelKind::SamLes, 1.0 / 86400.0),
        VariableDescriptor::new("rtpthvp").aliases(&["RTPTHVP", "qtpthvp"]),
        VariableDescriptor::new("corr_w_chi_1").zero_fill(),
        VariableDescriptor::new("corr_chi_eta_1").zero_fill(),
        VariableDescriptor::new("thlpthvp").aliases(&["THLPTHVP"]),
        VariableDescriptor::new("rc_coef_zm * wprcp")
            .fallback(FieldProduct::zero_filled("rc_coef_zm", "wprcp"))
            .model_override(
                ModelKind::SamLes,
                CloudWaterContribution {
                    flux: "WPRCP",
                    density: None,
                    zero_fill: true,
                },
            )
            .title("Contribution of Cloud Water Flux to wpthvp")
            .axis_title("rc_coef_zm * wprcp [K m/s]"),
        VariableDescriptor::new("rc_coef_zm * thlprcp")
            .fallback(FieldProduct::new("rc_coef_zm", "thlprcp"))
            .title("Contribution of Cloud Water Flux to thlprcp")
            .axis_title("rc_coef_zm * thlprcp [K^2]"),
        VariableDescriptor::new("rc_coef_zm * rtprcp")
            .fallback(FieldProduct::new("rc_coef_zm", "rtprcp"))
            .title("Contribution of Cloud Water Flux to rtprcp")
            .axis_title("rc_coef_zm * rtprcp [kg/kg K]"),
    ];

    VariableGroup::new("base variables", descriptors)
}
