//! Per-analysis cut constants.
//!
//! An [`AnalysisConfig`] is built once, either by one of the presets in
//! [`crate::analyses`] or from JSON, and is never mutated during a run.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cluster_sequence::JetDefinition;
use crate::error::{Error, Result};
use crate::kinematics::DeltaEtaConvention;

/// Most leading jets any analysis looks at.
pub const MAX_LEADING_JETS: usize = 3;

/// Exclusive window on the ΔR of one leading-jet pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeltaRWindow {
    /// Leading-jet indices, `pair.0 < pair.1`.
    pub pair: (usize, usize),
    pub min: f64,
    pub max: f64,
}

/// Cuts on the two leading jets of a VBF topology.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VbfCuts {
    /// Veto above this Δφ.
    pub max_delta_phi: f64,
    /// Veto at or below this |Δη|.
    pub min_delta_eta: f64,
    /// Require the two jets in opposite η hemispheres.
    #[serde(default = "default_true")]
    pub opposite_hemispheres: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub name: String,
    pub jet_definition: JetDefinition,
    /// Jets below this pt are dropped before any cut.
    pub min_jet_pt: f64,
    pub min_jets: usize,
    /// `leading_pt_floors[i]` is the pt the i-th jet must exceed.
    pub leading_pt_floors: Vec<f64>,
    pub max_abs_eta: Option<f64>,
    /// Number of leading jets the |η| ceiling applies to.
    pub eta_cut_jets: usize,
    /// Floor on the invariant mass of the two leading jets.
    pub min_dijet_mass: Option<f64>,
    pub delta_r_window: Option<DeltaRWindow>,
    pub vbf: Option<VbfCuts>,
    /// Leading jets the observables are computed for.
    pub n_leading: usize,
    pub delta_eta_convention: DeltaEtaConvention,
    /// `|eta|` of the second jet above which the (2, 3) pair counts as forward.
    pub forward_eta_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            name: String::new(),
            jet_definition: JetDefinition::default(),
            min_jet_pt: 0.0,
            min_jets: 0,
            leading_pt_floors: Vec::new(),
            max_abs_eta: None,
            eta_cut_jets: 2,
            min_dijet_mass: None,
            delta_r_window: None,
            vbf: None,
            n_leading: MAX_LEADING_JETS,
            delta_eta_convention: DeltaEtaConvention::Plain,
            forward_eta_threshold: 0.8,
        }
    }
}

impl AnalysisConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: AnalysisConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.jet_definition.r > 0.0) {
            return Err(Error::config(format!(
                "jet radius must be positive, got {}",
                self.jet_definition.r
            )));
        }
        if !(1..=MAX_LEADING_JETS).contains(&self.n_leading) {
            return Err(Error::config(format!(
                "n_leading must be between 1 and {MAX_LEADING_JETS}, got {}",
                self.n_leading
            )));
        }
        check_finite("min_jet_pt", self.min_jet_pt)?;
        check_finite("forward_eta_threshold", self.forward_eta_threshold)?;
        for (i, &floor) in self.leading_pt_floors.iter().enumerate() {
            check_finite(&format!("leading_pt_floors[{i}]"), floor)?;
        }
        if let Some(max_abs_eta) = self.max_abs_eta {
            check_finite("max_abs_eta", max_abs_eta)?;
            if self.eta_cut_jets == 0 {
                return Err(Error::config("max_abs_eta is set but eta_cut_jets is 0"));
            }
        }
        if let Some(min_mass) = self.min_dijet_mass {
            check_finite("min_dijet_mass", min_mass)?;
        }
        if let Some(window) = &self.delta_r_window {
            let (i, j) = window.pair;
            if i >= j {
                return Err(Error::config(format!(
                    "delta_r_window pair must be ordered, got ({i}, {j})"
                )));
            }
            if j >= MAX_LEADING_JETS {
                return Err(Error::config(format!(
                    "delta_r_window pair ({i}, {j}) is beyond the {MAX_LEADING_JETS} leading jets"
                )));
            }
            check_finite("delta_r_window.min", window.min)?;
            check_finite("delta_r_window.max", window.max)?;
            if window.min >= window.max {
                return Err(Error::config(format!(
                    "empty delta_r_window ({}, {})",
                    window.min, window.max
                )));
            }
        }
        if let Some(vbf) = &self.vbf {
            check_finite("vbf.max_delta_phi", vbf.max_delta_phi)?;
            check_finite("vbf.min_delta_eta", vbf.min_delta_eta)?;
        }
        Ok(())
    }
}

fn check_finite(field: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::config(format!("{field} must be finite, got {value}")))
    }
}
