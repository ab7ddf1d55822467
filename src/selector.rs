//! Ordered event selection over the pt-sorted jets of one event.

use std::fmt;

use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::kinematics::{delta_phi, delta_r, invariant_mass, sign};
use crate::pseudo_jet::PseudoJet;

/// Name of a cut, reported when it vetoes an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CutKind {
    JetCount,
    LeadingPt,
    MaxAbsEta,
    DijetMass,
    DeltaRWindow,
    VbfDeltaPhi,
    VbfDeltaEta,
    OppositeHemispheres,
}

impl fmt::Display for CutKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            CutKind::JetCount => "too few jets",
            CutKind::LeadingPt => "leading jet pt too small",
            CutKind::MaxAbsEta => "leading jet |eta| too large",
            CutKind::DijetMass => "dijet mass too low",
            CutKind::DeltaRWindow => "delta R outside window",
            CutKind::VbfDeltaPhi => "leading jet delta phi too large",
            CutKind::VbfDeltaEta => "leading jet delta eta too small",
            CutKind::OppositeHemispheres => "not in opposite hemispheres",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutResult {
    Accepted,
    Vetoed { reason: CutKind },
}

impl CutResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, CutResult::Accepted)
    }
}

/// One predicate on the jet list.
#[derive(Debug, Clone, PartialEq)]
pub enum Cut {
    /// At least this many jets.
    MinJets(usize),
    /// `jets[i].pt() > floors[i]` for every floor.
    LeadingPt(Vec<f64>),
    /// `|eta| <= max` for the first `jets` jets.
    MaxAbsEta { jets: usize, max: f64 },
    /// `m(jets[0], jets[1]) >= min`.
    DijetMass(f64),
    /// `min < dR(jets[i], jets[j]) < max`.
    DeltaRWindow { i: usize, j: usize, min: f64, max: f64 },
    /// `dphi(jets[0], jets[1]) <= max`.
    VbfDeltaPhi(f64),
    /// `|eta_0 - eta_1| > min`.
    VbfDeltaEta(f64),
    /// `eta_0` and `eta_1` have strictly opposite signs.
    OppositeHemispheres,
}

impl Cut {
    pub fn kind(&self) -> CutKind {
        match self {
            Cut::MinJets(_) => CutKind::JetCount,
            Cut::LeadingPt(_) => CutKind::LeadingPt,
            Cut::MaxAbsEta { .. } => CutKind::MaxAbsEta,
            Cut::DijetMass(_) => CutKind::DijetMass,
            Cut::DeltaRWindow { .. } => CutKind::DeltaRWindow,
            Cut::VbfDeltaPhi(_) => CutKind::VbfDeltaPhi,
            Cut::VbfDeltaEta(_) => CutKind::VbfDeltaEta,
            Cut::OppositeHemispheres => CutKind::OppositeHemispheres,
        }
    }

    /// Jets the predicate reads; an event with fewer fails the cut.
    pub fn required_jets(&self) -> usize {
        match self {
            Cut::MinJets(n) => *n,
            Cut::LeadingPt(floors) => floors.len(),
            Cut::MaxAbsEta { jets, .. } => *jets,
            Cut::DeltaRWindow { j, .. } => j + 1,
            Cut::DijetMass(_)
            | Cut::VbfDeltaPhi(_)
            | Cut::VbfDeltaEta(_)
            | Cut::OppositeHemispheres => 2,
        }
    }

    pub fn passes(&self, jets: &[PseudoJet]) -> bool {
        if jets.len() < self.required_jets() {
            return false;
        }
        match self {
            Cut::MinJets(_) => true,
            Cut::LeadingPt(floors) => jets.iter().zip(floors).all(|(jet, &floor)| jet.pt() > floor),
            Cut::MaxAbsEta { jets: n, max } => jets[..*n].iter().all(|jet| jet.eta().abs() <= *max),
            Cut::DijetMass(min) => invariant_mass(&jets[..2]) >= *min,
            Cut::DeltaRWindow { i, j, min, max } => {
                let dr = delta_r(&jets[*i], &jets[*j]);
                *min < dr && dr < *max
            }
            Cut::VbfDeltaPhi(max) => delta_phi(&jets[0], &jets[1]) <= *max,
            Cut::VbfDeltaEta(min) => (jets[0].eta() - jets[1].eta()).abs() > *min,
            Cut::OppositeHemispheres => sign(jets[0].eta()) != sign(jets[1].eta()),
        }
    }
}

/// Builds the cut list of an analysis, in evaluation order.
pub fn cuts_from_config(config: &AnalysisConfig) -> Vec<Cut> {
    let mut cuts = Vec::new();
    if config.min_jets > 0 {
        cuts.push(Cut::MinJets(config.min_jets));
    }
    if !config.leading_pt_floors.is_empty() {
        cuts.push(Cut::LeadingPt(config.leading_pt_floors.clone()));
    }
    if let Some(max) = config.max_abs_eta {
        cuts.push(Cut::MaxAbsEta {
            jets: config.eta_cut_jets,
            max,
        });
    }
    if let Some(min) = config.min_dijet_mass {
        cuts.push(Cut::DijetMass(min));
    }
    if let Some(window) = config.delta_r_window {
        cuts.push(Cut::DeltaRWindow {
            i: window.pair.0,
            j: window.pair.1,
            min: window.min,
            max: window.max,
        });
    }
    if let Some(vbf) = config.vbf {
        cuts.push(Cut::VbfDeltaPhi(vbf.max_delta_phi));
        cuts.push(Cut::VbfDeltaEta(vbf.min_delta_eta));
        if vbf.opposite_hemispheres {
            cuts.push(Cut::OppositeHemispheres);
        }
    }
    cuts
}

/// Short-circuiting chain of cuts with its own cutflow bookkeeping.
#[derive(Debug, Clone)]
pub struct Selector {
    cuts: Vec<Cut>,
    seen: u64,
    accepted: u64,
    vetoes: Vec<u64>,
}

impl Selector {
    pub fn new(cuts: Vec<Cut>) -> Self {
        let vetoes = vec![0; cuts.len()];
        Selector {
            cuts,
            seen: 0,
            accepted: 0,
            vetoes,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(cuts_from_config(config))
    }

    pub fn cuts(&self) -> &[Cut] {
        &self.cuts
    }

    /// Outcome for `jets` without touching the counters.
    pub fn evaluate(&self, jets: &[PseudoJet]) -> CutResult {
        match self.first_failure(jets) {
            Some(i) => CutResult::Vetoed {
                reason: self.cuts[i].kind(),
            },
            None => CutResult::Accepted,
        }
    }

    /// Evaluates `jets` and records the outcome.
    pub fn apply(&mut self, jets: &[PseudoJet]) -> CutResult {
        self.seen += 1;
        match self.first_failure(jets) {
            Some(i) => {
                self.vetoes[i] += 1;
                CutResult::Vetoed {
                    reason: self.cuts[i].kind(),
                }
            }
            None => {
                self.accepted += 1;
                CutResult::Accepted
            }
        }
    }

    fn first_failure(&self, jets: &[PseudoJet]) -> Option<usize> {
        self.cuts.iter().position(|cut| !cut.passes(jets))
    }

    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    pub fn seen(&self) -> u64 {
        self.seen
    }

    pub fn reset(&mut self) {
        self.seen = 0;
        self.accepted = 0;
        self.vetoes.iter_mut().for_each(|v| *v = 0);
    }

    pub fn cutflow(&self) -> Cutflow {
        Cutflow {
            seen: self.seen,
            accepted: self.accepted,
            vetoes: self
                .cuts
                .iter()
                .zip(&self.vetoes)
                .map(|(cut, &n)| (cut.kind(), n))
                .collect(),
        }
    }
}

/// Events seen, accepted, and vetoed by each cut.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cutflow {
    pub seen: u64,
    pub accepted: u64,
    pub vetoes: Vec<(CutKind, u64)>,
}

impl fmt::Display for Cutflow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{:<35} {:>10}", "events", self.seen)?;
        for (kind, n) in &self.vetoes {
            writeln!(f, "{:<35} {:>10}", kind.to_string(), n)?;
        }
        write!(f, "{:<35} {:>10}", "accepted", self.accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DeltaRWindow, VbfCuts};

    fn jets(kinematics: &[(f64, f64, f64)]) -> Vec<PseudoJet> {
        kinematics.iter()
            .map(|&(pt, eta, phi)| PseudoJet::from_pt_eta_phi(pt, eta, phi))
            .collect()
    }

    fn vbf_config() -> AnalysisConfig {
        AnalysisConfig {
            min_jets: 2,
            vbf: Some(VbfCuts {
                max_delta_phi: 2.5,
                min_delta_eta: 4.8,
                opposite_hemispheres: true,
            }),
            ..AnalysisConfig::default()
        }
    }

    #[test]
    fn cuts_follow_config_order() {
        let config = AnalysisConfig {
            min_jets: 3,
            leading_pt_floors: vec![100.0],
            max_abs_eta: Some(2.5),
            min_dijet_mass: Some(220.0),
            delta_r_window: Some(DeltaRWindow {
                pair: (1, 2),
                min: 0.5,
                max: 1.5,
            }),
            ..vbf_config()
        };
        let kinds: Vec<CutKind> = cuts_from_config(&config).iter().map(Cut::kind).collect();
        assert_eq!(
            kinds,
            vec![
                CutKind::JetCount,
                CutKind::LeadingPt,
                CutKind::MaxAbsEta,
                CutKind::DijetMass,
                CutKind::DeltaRWindow,
                CutKind::VbfDeltaPhi,
                CutKind::VbfDeltaEta,
                CutKind::OppositeHemispheres,
            ]
        );
    }

    #[test]
    fn small_delta_eta_is_vetoed() {
        let mut selector = Selector::from_config(&vbf_config());
        let event = jets(&[(150.0, 1.0, 0.0), (120.0, 1.2, 1.0), (40.0, 2.0, 2.0)]);
        assert_eq!(
            selector.apply(&event),
            CutResult::Vetoed {
                reason: CutKind::VbfDeltaEta
            }
        );
        assert_eq!(selector.accepted(), 0);
        assert_eq!(selector.seen(), 1);
    }

    #[test]
    fn vbf_topology_is_accepted_once() {
        let mut selector = Selector::from_config(&vbf_config());
        let event = jets(&[(150.0, 2.6, 0.0), (120.0, -2.5, 1.0)]);
        assert!(selector.apply(&event).is_accepted());
        assert_eq!(selector.accepted(), 1);
    }

    #[test]
    fn hemisphere_cut_compares_eta_signs() {
        let selector = Selector::new(vec![Cut::OppositeHemispheres]);
        let reason = CutKind::OppositeHemispheres;
        let both_negative = jets(&[(50.0, -3.0, 0.0), (40.0, -2.0, 0.0)]);
        let both_central = jets(&[(50.0, 0.0, 0.0), (40.0, 0.0, 1.0)]);
        let one_central = jets(&[(50.0, 0.0, 0.0), (40.0, -2.0, 0.0)]);
        assert_eq!(selector.evaluate(&both_negative), CutResult::Vetoed { reason });
        assert_eq!(selector.evaluate(&both_central), CutResult::Vetoed { reason });
        assert_eq!(selector.evaluate(&one_central), CutResult::Accepted);
    }

    #[test]
    fn missing_jets_veto_instead_of_panicking() {
        let selector = Selector::new(vec![
            Cut::DeltaRWindow {
                i: 1,
                j: 2,
                min: 0.5,
                max: 1.5,
            },
            Cut::DijetMass(10.0),
        ]);
        assert_eq!(
            selector.evaluate(&jets(&[(50.0, 0.0, 0.0), (40.0, 1.0, 0.0)])),
            CutResult::Vetoed {
                reason: CutKind::DeltaRWindow
            }
        );
        assert_eq!(
            selector.evaluate(&[]),
            CutResult::Vetoed {
                reason: CutKind::DeltaRWindow
            }
        );
    }

    #[test]
    fn delta_r_window_is_exclusive() {
        let cut = Cut::DeltaRWindow {
            i: 0,
            j: 1,
            min: 0.5,
            max: 1.5,
        };
        assert!(!cut.passes(&jets(&[(50.0, 0.0, 0.0), (40.0, 0.5, 0.0)])));
        assert!(cut.passes(&jets(&[(50.0, 0.0, 0.0), (40.0, 1.0, 0.0)])));
        assert!(!cut.passes(&jets(&[(50.0, 0.0, 0.0), (40.0, 1.5, 0.0)])));
    }

    #[test]
    fn loosening_a_threshold_never_loses_events() {
        let events: Vec<Vec<PseudoJet>> = (0..60)
            .map(|k| {
                let k = k as f64;
                jets(&[
                    (200.0 - k, 3.0 - 0.1 * k, 0.05 * k),
                    (150.0 - 2.0 * k, -2.9 + 0.07 * k, 1.0 + 0.11 * k),
                    (60.0 - 0.5 * k, 0.3 * k - 1.0, 0.2 * k),
                ])
            })
            .collect();
        let tight = AnalysisConfig {
            leading_pt_floors: vec![170.0, 100.0],
            max_abs_eta: Some(2.95),
            min_dijet_mass: Some(400.0),
            ..vbf_config()
        };
        let loose_variants = [
            AnalysisConfig {
                leading_pt_floors: vec![150.0, 100.0],
                ..tight.clone()
            },
            AnalysisConfig {
                max_abs_eta: Some(4.0),
                ..tight.clone()
            },
            AnalysisConfig {
                min_dijet_mass: Some(100.0),
                ..tight.clone()
            },
            AnalysisConfig {
                vbf: Some(VbfCuts {
                    max_delta_phi: 3.0,
                    min_delta_eta: 3.0,
                    opposite_hemispheres: true,
                }),
                ..tight.clone()
            },
        ];
        let tight = Selector::from_config(&tight);
        for loose in &loose_variants {
            let loose = Selector::from_config(loose);
            for event in &events {
                if tight.evaluate(event).is_accepted() {
                    assert!(loose.evaluate(event).is_accepted());
                }
            }
        }
    }

    #[test]
    fn cutflow_counts_each_veto_once() {
        let mut selector = Selector::from_config(&vbf_config());
        selector.apply(&jets(&[(50.0, 0.0, 0.0)]));
        selector.apply(&jets(&[(150.0, 1.0, 0.0), (120.0, 1.2, 1.0)]));
        selector.apply(&jets(&[(150.0, 2.6, 0.0), (120.0, -2.5, 1.0)]));
        let cutflow = selector.cutflow();
        assert_eq!(cutflow.seen, 3);
        assert_eq!(cutflow.accepted, 1);
        assert_eq!(
            cutflow.vetoes,
            vec![
                (CutKind::JetCount, 1),
                (CutKind::VbfDeltaPhi, 0),
                (CutKind::VbfDeltaEta, 1),
                (CutKind::OppositeHemispheres, 0),
            ]
        );
        selector.reset();
        assert_eq!(selector.cutflow().seen, 0);
    }
}
