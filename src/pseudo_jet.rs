use crate::constants::{MAX_RAP, TWO_PI};
use std::ops;

/// A four-momentum produced by jet clustering.
///
/// The transverse quantities and angles are computed once at construction, so
/// a jet is immutable and cheap to query from the selection and observable code.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy)]
pub struct PseudoJet {
    _px: f64,
    _py: f64,
    _pz: f64,
    _E: f64,
    _kt2: f64,
    _rap: f64,
    _eta: f64,
    _phi: f64,
}

#[allow(non_snake_case)]
impl PseudoJet {
    pub fn new(px: f64, py: f64, pz: f64, E: f64) -> Self {
        let kt2 = px * px + py * py;
        PseudoJet {
            _px: px,
            _py: py,
            _pz: pz,
            _E: E,
            _kt2: kt2,
            _rap: Self::compute_rap(pz, E, kt2),
            _eta: Self::compute_eta(pz, kt2),
            _phi: Self::compute_phi(px, py),
        }
    }

    /// Builds a jet from collider coordinates. The given `eta` and `phi` are kept
    /// as-is (phi folded into [0, 2π)) instead of being recomputed from the
    /// cartesian components.
    pub fn from_pt_eta_phi_m(pt: f64, eta: f64, phi: f64, m: f64) -> Self {
        let pt = pt.abs();
        let px = pt * phi.cos();
        let py = pt * phi.sin();
        let pz = pt * eta.sinh();
        let E = (px * px + py * py + pz * pz + m * m).sqrt();
        let kt2 = pt * pt;
        PseudoJet {
            _px: px,
            _py: py,
            _pz: pz,
            _E: E,
            _kt2: kt2,
            _rap: Self::compute_rap(pz, E, kt2),
            _eta: eta,
            _phi: fold_phi(phi),
        }
    }

    /// A massless jet.
    pub fn from_pt_eta_phi(pt: f64, eta: f64, phi: f64) -> Self {
        Self::from_pt_eta_phi_m(pt, eta, phi, 0.0)
    }

    #[inline]
    pub fn E(&self) -> f64 {
        self._E
    }

    #[inline]
    pub fn e(&self) -> f64 {
        self._E
    }

    #[inline]
    pub fn px(&self) -> f64 {
        self._px
    }

    #[inline]
    pub fn py(&self) -> f64 {
        self._py
    }

    #[inline]
    pub fn pz(&self) -> f64 {
        self._pz
    }

    #[inline]
    pub fn rap(&self) -> f64 {
        self._rap
    }

    /// pseudorapidity, -ln(tan(theta/2))
    #[inline]
    pub fn eta(&self) -> f64 {
        self._eta
    }

    #[inline]
    pub fn pseudorapidity(&self) -> f64 {
        self._eta
    }

    /// azimuth in [0, 2π)
    #[inline]
    pub fn phi(&self) -> f64 {
        self._phi
    }

    #[inline]
    pub fn kt2(&self) -> f64 {
        self._kt2
    }

    #[inline]
    pub fn pt2(&self) -> f64 {
        self._kt2
    }

    #[inline]
    pub fn pt(&self) -> f64 {
        self._kt2.sqrt()
    }

    /// returns the invariant mass squared
    #[inline]
    pub fn m2(&self) -> f64 {
        (self._E + self._pz) * (self._E - self._pz) - self._kt2
    }

    /// returns the invariant mass, negative when `m2()` is negative
    #[inline]
    pub fn m(&self) -> f64 {
        // taken literally from CLHEP
        let mm: f64 = self.m2();
        if mm < 0.0 { -((-mm).sqrt()) } else { mm.sqrt() }
    }

    /// returns the squared transverse mass = kt^2+m^2
    #[inline]
    pub fn mt2(&self) -> f64 {
        (self._E + self._pz) * (self._E - self._pz)
    }

    #[inline]
    pub fn mt(&self) -> f64 {
        self.mt2().abs().sqrt()
    }

    /// return the squared 3-vector modulus = px^2+py^2+pz^2
    #[inline]
    pub fn modp2(&self) -> f64 {
        self._kt2 + self._pz * self._pz
    }

    #[inline]
    pub fn modp(&self) -> f64 {
        self.modp2().sqrt()
    }

    /// Sorts jets by decreasing transverse momentum, in place.
    pub fn sorted_by_pt(jets: &mut [PseudoJet]) -> &mut [PseudoJet] {
        jets.sort_by(|a, b| b.pt2().total_cmp(&a.pt2()));
        jets
    }

    fn compute_phi(px: f64, py: f64) -> f64 {
        if px == 0.0 && py == 0.0 {
            0.0
        } else {
            fold_phi(py.atan2(px))
        }
    }

    fn compute_rap(pz: f64, E: f64, kt2: f64) -> f64 {
        if E == pz.abs() && kt2 == 0.0 {
            // purely longitudinal and massless: push it out of any physical range
            let max_rap = MAX_RAP + pz.abs();
            return if pz >= 0.0 { max_rap } else { -max_rap };
        }
        let m2_eff = ((E + pz) * (E - pz) - kt2).max(0.0);
        let e_plus_pz = E + pz.abs();
        let rap = 0.5 * ((kt2 + m2_eff) / (e_plus_pz * e_plus_pz)).ln();
        if pz > 0.0 { -rap } else { rap }
    }

    fn compute_eta(pz: f64, kt2: f64) -> f64 {
        if kt2 == 0.0 {
            let max_eta = MAX_RAP + pz.abs();
            return if pz >= 0.0 { max_eta } else { -max_eta };
        }
        (pz / kt2.sqrt()).asinh()
    }
}

/// Folds an azimuth into [0, 2π).
pub(crate) fn fold_phi(phi: f64) -> f64 {
    let mut folded = phi % TWO_PI;
    if folded < 0.0 {
        folded += TWO_PI;
    }
    if folded >= TWO_PI {
        folded -= TWO_PI;
    }
    folded
}

impl ops::Add<PseudoJet> for PseudoJet {
    type Output = PseudoJet;

    fn add(self, other: PseudoJet) -> PseudoJet {
        PseudoJet::new(
            self._px + other._px,
            self._py + other._py,
            self._pz + other._pz,
            self._E + other._E,
        )
    }
}

impl ops::AddAssign<PseudoJet> for PseudoJet {
    fn add_assign(&mut self, other: PseudoJet) {
        *self = *self + other;
    }
}

impl ops::Sub<PseudoJet> for PseudoJet {
    type Output = PseudoJet;

    fn sub(self, other: PseudoJet) -> PseudoJet {
        PseudoJet::new(
            self._px - other._px,
            self._py - other._py,
            self._pz - other._pz,
            self._E - other._E,
        )
    }
}

impl ops::Mul<f64> for PseudoJet {
    type Output = PseudoJet;

    fn mul(self, scalar: f64) -> PseudoJet {
        PseudoJet::new(
            self._px * scalar,
            self._py * scalar,
            self._pz * scalar,
            self._E * scalar,
        )
    }
}

impl ops::Mul<PseudoJet> for f64 {
    type Output = PseudoJet;

    fn mul(self, jet: PseudoJet) -> PseudoJet {
        jet * self
    }
}

impl ops::Div<f64> for PseudoJet {
    type Output = PseudoJet;

    fn div(self, rhs: f64) -> PseudoJet {
        self * (1.0 / rhs)
    }
}

impl std::iter::Sum for PseudoJet {
    fn sum<I: Iterator<Item = PseudoJet>>(iter: I) -> PseudoJet {
        iter.fold(PseudoJet::new(0.0, 0.0, 0.0, 0.0), |acc, jet| acc + jet)
    }
}

impl<'a> std::iter::Sum<&'a PseudoJet> for PseudoJet {
    fn sum<I: Iterator<Item = &'a PseudoJet>>(iter: I) -> PseudoJet {
        iter.copied().sum()
    }
}

impl PartialEq<PseudoJet> for PseudoJet {
    fn eq(&self, other: &PseudoJet) -> bool {
        self._px == other._px
            && self._py == other._py
            && self._pz == other._pz
            && self._E == other._E
    }
}
