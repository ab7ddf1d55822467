//! Secondary observables of an accepted event's leading jets.
//!
//! Everything is computed from the pt-ordered jet list handed over by the
//! selector. A quantity that needs more jets than the event has is `None`, and
//! the histograms fed by it are simply not filled.

use serde::{Deserialize, Serialize};

use crate::config::{AnalysisConfig, MAX_LEADING_JETS};
use crate::error::{Error, Result};
use crate::kinematics::{DeltaEtaConvention, beta_from_deltas, delta_phi, delta_r, invariant_mass};
use crate::pseudo_jet::PseudoJet;

const N: usize = MAX_LEADING_JETS;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JetObservables {
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PairObservables {
    /// Oriented according to the analysis' [`DeltaEtaConvention`].
    pub delta_eta: f64,
    pub delta_phi: f64,
    pub delta_r: f64,
}

/// Where the second jet of a three-jet event sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Central,
    Forward,
}

/// The (second, third) jet pair, split by the |eta| of the second jet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SecondThirdObservables {
    pub region: Region,
    pub delta_eta: f64,
    pub delta_phi: f64,
    pub beta: f64,
}

/// The two leading jets of a VBF candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VbfObservables {
    /// `|eta_0 - eta_1|`
    pub delta_eta: f64,
    pub delta_phi: f64,
    pub mass: f64,
}

/// A scalar read off [`DerivedQuantities`]; jet indices are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Observable {
    JetPt { jet: usize },
    JetEta { jet: usize },
    JetPhi { jet: usize },
    PairDeltaEta { i: usize, j: usize },
    PairDeltaPhi { i: usize, j: usize },
    PairDeltaR { i: usize, j: usize },
    SecondThirdDeltaEta { region: Region },
    SecondThirdDeltaPhi { region: Region },
    Beta { region: Region },
    VbfDeltaEta,
    VbfDeltaPhi,
    VbfMass,
}

impl Observable {
    /// Rejects observables that can never be filled with `n_leading` leading
    /// jets derived.
    pub fn validate(&self, n_leading: usize) -> Result<()> {
        let needed = match *self {
            Observable::JetPt { jet } | Observable::JetEta { jet } | Observable::JetPhi { jet } => {
                jet + 1
            }
            Observable::PairDeltaEta { i, j }
            | Observable::PairDeltaPhi { i, j }
            | Observable::PairDeltaR { i, j } => {
                if i >= j {
                    return Err(Error::config(format!(
                        "pair observable needs i < j, got ({i}, {j})"
                    )));
                }
                j + 1
            }
            Observable::SecondThirdDeltaEta { .. }
            | Observable::SecondThirdDeltaPhi { .. }
            | Observable::Beta { .. } => 3,
            Observable::VbfDeltaEta | Observable::VbfDeltaPhi | Observable::VbfMass => 0,
        };
        if needed > n_leading {
            return Err(Error::config(format!(
                "{self:?} needs {needed} leading jets but only {n_leading} are derived"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DerivedQuantities {
    leading: [Option<JetObservables>; N],
    // upper triangle only, pairs[i][j] with i < j
    pairs: [[Option<PairObservables>; N]; N],
    second_third: Option<SecondThirdObservables>,
    vbf: Option<VbfObservables>,
}

impl DerivedQuantities {
    pub fn compute(jets: &[PseudoJet], config: &AnalysisConfig) -> Self {
        let n_leading = config.n_leading.min(N).min(jets.len());
        let convention = config.delta_eta_convention;
        let mut derived = DerivedQuantities::default();

        for (i, jet) in jets[..n_leading].iter().enumerate() {
            derived.leading[i] = Some(JetObservables {
                pt: jet.pt(),
                eta: jet.eta(),
                phi: jet.phi(),
            });
            for j in (i + 1)..n_leading {
                derived.pairs[i][j] = Some(pair_observables(jet, &jets[j], convention));
            }
        }

        if n_leading >= 3 {
            derived.second_third = Some(second_third_observables(
                &jets[1],
                &jets[2],
                convention,
                config.forward_eta_threshold,
            ));
        }

        if jets.len() >= 2 {
            derived.vbf = Some(VbfObservables {
                delta_eta: (jets[0].eta() - jets[1].eta()).abs(),
                delta_phi: delta_phi(&jets[0], &jets[1]),
                mass: invariant_mass(&jets[..2]),
            });
        }

        derived
    }

    pub fn jet(&self, i: usize) -> Option<&JetObservables> {
        self.leading.get(i)?.as_ref()
    }

    pub fn pair(&self, i: usize, j: usize) -> Option<&PairObservables> {
        if i >= j {
            return None;
        }
        self.pairs.get(i)?.get(j)?.as_ref()
    }

    pub fn second_third(&self) -> Option<&SecondThirdObservables> {
        self.second_third.as_ref()
    }

    pub fn vbf(&self) -> Option<&VbfObservables> {
        self.vbf.as_ref()
    }

    /// Value of `observable` for this event, if it exists.
    pub fn value(&self, observable: Observable) -> Option<f64> {
        let in_region = |region: Region| {
            self.second_third
                .as_ref()
                .filter(|st| st.region == region)
        };
        match observable {
            Observable::JetPt { jet } => self.jet(jet).map(|o| o.pt),
            Observable::JetEta { jet } => self.jet(jet).map(|o| o.eta),
            Observable::JetPhi { jet } => self.jet(jet).map(|o| o.phi),
            Observable::PairDeltaEta { i, j } => self.pair(i, j).map(|p| p.delta_eta),
            Observable::PairDeltaPhi { i, j } => self.pair(i, j).map(|p| p.delta_phi),
            Observable::PairDeltaR { i, j } => self.pair(i, j).map(|p| p.delta_r),
            Observable::SecondThirdDeltaEta { region } => in_region(region).map(|st| st.delta_eta),
            Observable::SecondThirdDeltaPhi { region } => in_region(region).map(|st| st.delta_phi),
            Observable::Beta { region } => in_region(region).map(|st| st.beta),
            Observable::VbfDeltaEta => self.vbf.map(|v| v.delta_eta),
            Observable::VbfDeltaPhi => self.vbf.map(|v| v.delta_phi),
            Observable::VbfMass => self.vbf.map(|v| v.mass),
        }
    }
}

fn pair_observables(a: &PseudoJet, b: &PseudoJet, convention: DeltaEtaConvention) -> PairObservables {
    PairObservables {
        delta_eta: convention.delta_eta(a, b),
        delta_phi: delta_phi(a, b),
        delta_r: delta_r(a, b),
    }
}

fn second_third_observables(
    second: &PseudoJet,
    third: &PseudoJet,
    convention: DeltaEtaConvention,
    forward_eta_threshold: f64,
) -> SecondThirdObservables {
    let region = if second.eta().abs() > forward_eta_threshold {
        Region::Forward
    } else {
        Region::Central
    };
    let delta_eta = convention.delta_eta(second, third);
    let delta_phi = delta_phi(second, third);
    SecondThirdObservables {
        region,
        delta_eta,
        delta_phi,
        beta: beta_from_deltas(delta_eta, delta_phi),
    }
}
