use serde::{Deserialize, Serialize};

use crate::pseudo_jet::PseudoJet;

/// Which jet definition an analysis asks its clusterer for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JetDefinition {
    pub algorithm: Algorithm,
    pub r: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    AntiKt,
    Kt,
    Cambridge,
}

impl JetDefinition {
    pub fn new(algorithm: Algorithm, r: f64) -> Self {
        JetDefinition { algorithm, r }
    }

    pub fn anti_kt(r: f64) -> Self {
        JetDefinition::new(Algorithm::AntiKt, r)
    }
}

impl Default for JetDefinition {
    fn default() -> Self {
        JetDefinition::anti_kt(0.4)
    }
}

/// Jet finding, provided by an external clustering implementation.
///
/// Implementations return the jets ordered by decreasing pt; callers rely on
/// that order and never sort again.
pub trait JetClusterer {
    fn cluster(&self, particles: &[PseudoJet], jet_def: &JetDefinition) -> Vec<PseudoJet>;
}

impl<F> JetClusterer for F
where
    F: Fn(&[PseudoJet], &JetDefinition) -> Vec<PseudoJet>,
{
    fn cluster(&self, particles: &[PseudoJet], jet_def: &JetDefinition) -> Vec<PseudoJet> {
        self(particles, jet_def)
    }
}
