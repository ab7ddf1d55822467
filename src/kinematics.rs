//! Stateless kinematic functions on jets.

use serde::{Deserialize, Serialize};

use crate::constants::{PI, TWO_PI};
use crate::pseudo_jet::PseudoJet;

/// How the pseudorapidity separation of a jet pair is oriented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaEtaConvention {
    /// `eta_i - eta_j`
    #[default]
    Plain,
    /// `sign(eta_i) * (eta_j - eta_i)`, so that moving away from the centre is positive.
    Signed,
}

impl DeltaEtaConvention {
    /// Separation of `b` from `a`, where `a` is the harder of the two jets.
    #[inline]
    pub fn delta_eta(self, a: &PseudoJet, b: &PseudoJet) -> f64 {
        match self {
            DeltaEtaConvention::Plain => a.eta() - b.eta(),
            DeltaEtaConvention::Signed => signed_delta_eta(a, b),
        }
    }
}

/// Returns -1, 0 or +1.
#[inline]
pub fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Azimuthal separation of two angles, wrapped into [0, π].
#[inline]
pub fn delta_phi_angles(phi_a: f64, phi_b: f64) -> f64 {
    let dphi = (phi_a - phi_b).abs() % TWO_PI;
    dphi.min(TWO_PI - dphi)
}

/// Azimuthal separation of two jets in [0, π].
#[inline]
pub fn delta_phi(a: &PseudoJet, b: &PseudoJet) -> f64 {
    delta_phi_angles(a.phi(), b.phi())
}

/// `sqrt(deta^2 + dphi^2)` with the wrapped azimuthal separation.
#[inline]
pub fn delta_r(a: &PseudoJet, b: &PseudoJet) -> f64 {
    let deta = a.eta() - b.eta();
    let dphi = delta_phi(a, b);
    (deta * deta + dphi * dphi).sqrt()
}

#[inline]
pub fn signed_delta_eta(a: &PseudoJet, b: &PseudoJet) -> f64 {
    sign(a.eta()) * (b.eta() - a.eta())
}

/// Invariant mass of the summed four-momenta.
pub fn invariant_mass<'a, I>(jets: I) -> f64
where
    I: IntoIterator<Item = &'a PseudoJet>,
{
    jets.into_iter().sum::<PseudoJet>().m()
}

/// Boost angle from a (delta eta, delta phi) pair.
///
/// `atan2(|dphi|, deta)`, with the degenerate directions pinned: a zero `deta`
/// is exactly π/2, and a zero `dphi` is 0 going forward and π going backward.
pub fn beta_from_deltas(deta: f64, dphi: f64) -> f64 {
    if deta == 0.0 {
        PI / 2.0
    } else if dphi == 0.0 {
        if deta > 0.0 { 0.0 } else { PI }
    } else {
        dphi.abs().atan2(deta)
    }
}

/// Boost angle of the third jet around the second jet of a pt-ordered triplet.
/// The leading jet does not enter.
pub fn beta(triplet: [&PseudoJet; 3], convention: DeltaEtaConvention) -> f64 {
    let [_, second, third] = triplet;
    beta_from_deltas(
        convention.delta_eta(second, third),
        delta_phi(second, third),
    )
}
