//! Event records consumed by the analyses, and the run-level bookkeeping they
//! are normalized against.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cluster_sequence::{JetClusterer, JetDefinition};
use crate::pseudo_jet::PseudoJet;

/// One generated event: its jets, hardest first, and its weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    jets: Vec<PseudoJet>,
    weight: f64,
}

impl Event {
    /// `jets` are expected in decreasing pt order and are never re-sorted.
    /// Out-of-order input is kept as given and logged.
    pub fn new(jets: Vec<PseudoJet>, weight: f64) -> Self {
        if !jets.windows(2).all(|w| w[0].pt2() >= w[1].pt2()) {
            warn!(n_jets = jets.len(), "event jets are not ordered by decreasing pt");
        }
        Event { jets, weight }
    }

    /// Clusters `particles` and keeps the jets as the clusterer orders them.
    pub fn from_particles<C: JetClusterer + ?Sized>(
        particles: &[PseudoJet],
        clusterer: &C,
        jet_def: &JetDefinition,
        weight: f64,
    ) -> Self {
        Event::new(clusterer.cluster(particles, jet_def), weight)
    }

    pub fn jets(&self) -> &[PseudoJet] {
        &self.jets
    }

    /// The leading jets with `pt >= min_pt`.
    pub fn jets_by_pt(&self, min_pt: f64) -> &[PseudoJet] {
        let n = self.jets.partition_point(|j| j.pt() >= min_pt);
        &self.jets[..n]
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }
}

/// Run-level constants that fix the binning at configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunInfo {
    /// Centre-of-mass energy in GeV.
    pub sqrt_s: f64,
}

impl RunInfo {
    pub fn new(sqrt_s: f64) -> Self {
        RunInfo { sqrt_s }
    }
}

/// Cross-section bookkeeping, only meaningful once the event source is exhausted.
pub trait CrossSectionProvider {
    /// Total cross section of the generated sample.
    fn cross_section(&self) -> f64;

    /// Sum of the weights of every processed event.
    fn sum_of_weights(&self) -> f64;
}

/// Fixed cross-section numbers, e.g. read from the generator's run summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossSection {
    pub cross_section: f64,
    pub sum_of_weights: f64,
}

impl CrossSection {
    pub fn new(cross_section: f64, sum_of_weights: f64) -> Self {
        CrossSection {
            cross_section,
            sum_of_weights,
        }
    }
}

impl CrossSectionProvider for CrossSection {
    fn cross_section(&self) -> f64 {
        self.cross_section
    }

    fn sum_of_weights(&self) -> f64 {
        self.sum_of_weights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jets_by_pt_is_a_prefix() {
        let jets = [120.0, 40.0, 30.0, 10.0]
            .iter()
            .map(|&pt| PseudoJet::from_pt_eta_phi(pt, 0.0, 0.0))
            .collect();
        let event = Event::new(jets, 1.0);
        assert_eq!(event.jets_by_pt(30.0).len(), 3);
        assert_eq!(event.jets_by_pt(0.0).len(), 4);
        assert_eq!(event.jets_by_pt(500.0).len(), 0);
    }

    #[test]
    fn unordered_clusterer_output_is_kept_as_given() {
        let clusterer = |particles: &[PseudoJet], _def: &JetDefinition| particles.to_vec();
        let particles = [
            PseudoJet::from_pt_eta_phi(20.0, 0.0, 0.0),
            PseudoJet::from_pt_eta_phi(90.0, 1.0, 1.0),
        ];
        let event = Event::from_particles(&particles, &clusterer, &JetDefinition::default(), 1.0);
        assert_eq!(event.jets()[0].pt(), 20.0);
        assert_eq!(event.jets_by_pt(30.0).len(), 0);
    }
}
