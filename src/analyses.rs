//! The concrete validation analyses, each a cut configuration plus its bookings.

use crate::analysis::{AnalysisDefinition, HistogramBooking};
use crate::cluster_sequence::JetDefinition;
use crate::config::{AnalysisConfig, DeltaRWindow, VbfCuts};
use crate::constants::{GEV, PI, TWO_PI};
use crate::derived::{Observable, Region};
use crate::event::RunInfo;
use crate::histogram::{Binning, Transform};
use crate::kinematics::DeltaEtaConvention;

pub const MC_2TO2_JETS: &str = "MC_2To2Jets";
pub const MC_DM_VBF: &str = "MC_DM_VBF";
pub const MC_3JET_COLOR_COHERENCE: &str = "MC_3JetColorCoherence";
pub const MC_3JET_DELTAS: &str = "MC_3JetDeltas";

pub const ALL: [&str; 4] = [MC_2TO2_JETS, MC_DM_VBF, MC_3JET_COLOR_COHERENCE, MC_3JET_DELTAS];

/// Looks up an analysis by name.
pub fn by_name(name: &str, run: &RunInfo) -> Option<AnalysisDefinition> {
    match name {
        MC_2TO2_JETS => Some(mc_2to2_jets(run)),
        MC_DM_VBF => Some(mc_dm_vbf(run)),
        MC_3JET_COLOR_COHERENCE => Some(mc_3jet_color_coherence(run)),
        MC_3JET_DELTAS => Some(mc_3jet_deltas(run)),
        _ => None,
    }
}

/// Leading-jet spectra and inter-jet separations of generic 2 -> 2 jet events.
///
/// No cuts. The pt spectra are log-binned up to a fraction of the beam energy,
/// filled unweighted and normalized; the separations are scaled to the cross
/// section.
pub fn mc_2to2_jets(run: &RunInfo) -> AnalysisDefinition {
    let config = AnalysisConfig {
        name: MC_2TO2_JETS.to_string(),
        jet_definition: JetDefinition::anti_kt(0.4),
        ..AnalysisConfig::default()
    };

    let mut histograms = Vec::new();
    for i in 0..3 {
        let pt_max = 1.0 / (i as f64 + 2.0) * run.sqrt_s / GEV / 2.0;
        let n_bins = 100 / (i + 1);
        histograms.push(
            HistogramBooking::new(
                format!("Jet_{}_p_T", i + 1),
                Observable::JetPt { jet: i },
                Binning::log(n_bins, 10.0, pt_max),
                Transform::Normalize,
            )
            .unit_weight(),
        );
    }
    histograms.extend(pair_bookings(
        Binning::linear(100, 0.0, 10.0),
        Transform::ScaleByCrossSection,
    ));

    AnalysisDefinition { config, histograms }
}

/// Dark-matter VBF selection: two hard, widely separated, back-to-back-in-eta
/// jets.
pub fn mc_dm_vbf(_run: &RunInfo) -> AnalysisDefinition {
    let config = AnalysisConfig {
        name: MC_DM_VBF.to_string(),
        jet_definition: JetDefinition::anti_kt(0.5),
        min_jet_pt: 30.0 * GEV,
        min_jets: 2,
        vbf: Some(VbfCuts {
            max_delta_phi: 2.5,
            min_delta_eta: 4.8,
            opposite_hemispheres: true,
        }),
        ..AnalysisConfig::default()
    };

    let mut histograms = Vec::new();
    for i in 0..3 {
        let n = i + 1;
        histograms.push(HistogramBooking::new(
            format!("Eta{n}"),
            Observable::JetEta { jet: i },
            Binning::linear(50, -5.0, 5.0),
            Transform::Normalize,
        ));
        histograms.push(HistogramBooking::new(
            format!("Phi{n}"),
            Observable::JetPhi { jet: i },
            Binning::linear(50, 0.0, TWO_PI),
            Transform::Normalize,
        ));
        histograms.push(HistogramBooking::new(
            format!("pT_{n}"),
            Observable::JetPt { jet: i },
            Binning::linear(80, 0.0, 200.0 * GEV),
            Transform::None,
        ));
    }
    histograms.push(
        HistogramBooking::new(
            "VBFDijetInvtMass",
            Observable::VbfMass,
            Binning::linear(50, 0.0, 3000.0 * GEV),
            Transform::Normalize,
        )
        .unit_weight(),
    );
    histograms.push(HistogramBooking::new(
        "DeltaPhi_VBF",
        Observable::VbfDeltaPhi,
        Binning::linear(50, 0.0, PI),
        Transform::Normalize,
    ));
    histograms.push(HistogramBooking::new(
        "DeltaEta_VBF",
        Observable::VbfDeltaEta,
        Binning::linear(73, 4.7, 7.0),
        Transform::Normalize,
    ));

    AnalysisDefinition { config, histograms }
}

/// Colour coherence in three-jet events: the angle beta of the third jet
/// around the second, split by whether the second jet is central or forward.
pub fn mc_3jet_color_coherence(run: &RunInfo) -> AnalysisDefinition {
    let config = AnalysisConfig {
        name: MC_3JET_COLOR_COHERENCE.to_string(),
        jet_definition: JetDefinition::anti_kt(0.5),
        min_jet_pt: 30.0 * GEV,
        min_jets: 3,
        leading_pt_floors: vec![100.0 * GEV],
        max_abs_eta: Some(2.5),
        eta_cut_jets: 2,
        min_dijet_mass: Some(220.0 * GEV),
        delta_r_window: Some(DeltaRWindow {
            pair: (1, 2),
            min: 0.5,
            max: 1.5,
        }),
        delta_eta_convention: DeltaEtaConvention::Signed,
        ..AnalysisConfig::default()
    };

    let mut histograms = Vec::new();
    for i in 0..3 {
        histograms.push(HistogramBooking::new(
            format!("Jet_{}_p_T", i + 1),
            Observable::JetPt { jet: i },
            Binning::log(50, 30.0 * GEV, run.sqrt_s / 2.0),
            Transform::Normalize,
        ));
    }
    histograms.push(HistogramBooking::new(
        "Jet_23_DeltaR",
        Observable::PairDeltaR { i: 1, j: 2 },
        Binning::linear(20, 0.5, 1.5),
        Transform::Normalize,
    ));
    for (region, suffix) in [(Region::Central, "Central"), (Region::Forward, "Forward")] {
        histograms.push(HistogramBooking::new(
            format!("Jet_23_DeltaEta_{suffix}"),
            Observable::SecondThirdDeltaEta { region },
            Binning::linear(30, -1.5, 1.5),
            Transform::Normalize,
        ));
        histograms.push(HistogramBooking::new(
            format!("Jet_23_DeltaPhi_{suffix}"),
            Observable::SecondThirdDeltaPhi { region },
            Binning::linear(30, 0.0, 1.5),
            Transform::Normalize,
        ));
        histograms.push(HistogramBooking::new(
            format!("Beta_{suffix}"),
            Observable::Beta { region },
            Binning::linear(20, 0.0, PI),
            Transform::Normalize,
        ));
    }

    AnalysisDefinition { config, histograms }
}

/// The three-jet separations of [`mc_2to2_jets`] with the signed delta eta,
/// on events with at least three jets.
pub fn mc_3jet_deltas(run: &RunInfo) -> AnalysisDefinition {
    let config = AnalysisConfig {
        name: MC_3JET_DELTAS.to_string(),
        jet_definition: JetDefinition::anti_kt(0.4),
        min_jet_pt: 20.0 * GEV,
        min_jets: 3,
        delta_eta_convention: DeltaEtaConvention::Signed,
        ..AnalysisConfig::default()
    };

    let mut histograms = Vec::new();
    for i in 0..3 {
        let n = i + 1;
        histograms.push(HistogramBooking::new(
            format!("Jet_{n}_p_T"),
            Observable::JetPt { jet: i },
            Binning::log(50, 20.0 * GEV, run.sqrt_s / 2.0),
            Transform::Normalize,
        ));
        histograms.push(HistogramBooking::new(
            format!("Jet_{n}_Eta"),
            Observable::JetEta { jet: i },
            Binning::linear(50, -5.0, 5.0),
            Transform::Normalize,
        ));
        histograms.push(HistogramBooking::new(
            format!("Jet_{n}_Phi"),
            Observable::JetPhi { jet: i },
            Binning::linear(50, 0.0, TWO_PI),
            Transform::Normalize,
        ));
    }
    histograms.extend(pair_bookings(
        Binning::linear(100, -10.0, 10.0),
        Transform::Normalize,
    ));

    AnalysisDefinition { config, histograms }
}

/// Delta eta, delta phi and delta R of every leading-jet pair.
fn pair_bookings(delta_eta_binning: Binning, transform: Transform) -> Vec<HistogramBooking> {
    let mut bookings = Vec::new();
    for i in 0..3 {
        for j in (i + 1)..3 {
            let ij = format!("{}{}", i + 1, j + 1);
            bookings.push(HistogramBooking::new(
                format!("Jet_{ij}_DeltaEta"),
                Observable::PairDeltaEta { i, j },
                delta_eta_binning.clone(),
                transform,
            ));
            bookings.push(HistogramBooking::new(
                format!("Jet_{ij}_DeltaPhi"),
                Observable::PairDeltaPhi { i, j },
                Binning::linear(100, 0.0, PI),
                transform,
            ));
            bookings.push(HistogramBooking::new(
                format!("Jet_{ij}_DeltaR"),
                Observable::PairDeltaR { i, j },
                Binning::linear(100, 0.0, 15.0),
                transform,
            ));
        }
    }
    bookings
}
