use mc_jet_analyses::kinematics::{delta_phi, delta_r, invariant_mass};
use mc_jet_analyses::pseudo_jet::PseudoJet;

fn approx_eq(a: f64, b: f64) {
    let diff = (a - b).abs();
    assert!(diff < 1e-12, "left={a}, right={b}, diff={diff}");
}

#[test]
fn accessors_return_expected_components() {
    let jet = PseudoJet::new(3.0, 4.0, 12.0, 15.0);
    assert_eq!(jet.E(), 15.0);
    assert_eq!(jet.e(), 15.0);
    assert_eq!(jet.px(), 3.0);
    assert_eq!(jet.py(), 4.0);
    assert_eq!(jet.pz(), 12.0);
    approx_eq(jet.rap(), 1.0986122886681098);
    approx_eq(jet.phi(), 0.9272952180016122);
    assert_eq!(jet.kt2(), 25.0);
    assert_eq!(jet.pt2(), 25.0);
}

#[test]
fn transverse_quantities_are_consistent() {
    let jet = PseudoJet::new(3.0, 4.0, 12.0, 15.0);
    assert_eq!(jet.pt(), 5.0);
    assert_eq!(jet.m2(), 56.0);
    approx_eq(jet.m(), 56.0f64.sqrt());
    assert_eq!(jet.mt2(), 81.0);
    assert_eq!(jet.mt(), 9.0);
    assert_eq!(jet.modp2(), 169.0);
    assert_eq!(jet.modp(), 13.0);
}

#[test]
fn add_recomputes_cached_values() {
    let a = PseudoJet::new(1.0, 2.0, 3.0, 4.0);
    let b = PseudoJet::new(0.5, 1.5, 2.5, 3.5);
    let c = a + b;
    assert_eq!(c.px(), 1.5);
    assert_eq!(c.py(), 3.5);
    assert_eq!(c.pz(), 5.5);
    assert_eq!(c.e(), 7.5);
    assert_eq!(c.kt2(), 14.5);
    approx_eq(c.phi(), 1.1659045405098132);
    approx_eq(c.rap(), 0.9359010884507957);

    let mut d = a;
    d += b;
    assert_eq!(d, c);
}

#[test]
fn sub_recomputes_cached_values() {
    let a = PseudoJet::new(1.0, 2.0, 3.0, 4.0);
    let b = PseudoJet::new(0.5, 1.5, 2.5, 3.5);
    let c = a - b;
    assert_eq!(c.px(), 0.5);
    assert_eq!(c.e(), 0.5);
    assert_eq!(c.kt2(), 0.5);
    approx_eq(c.phi(), 0.7853981633974483);
    approx_eq(c.rap(), 0.34657359027997264);
}

#[test]
fn scalar_multiplication_and_division() {
    let jet = PseudoJet::new(1.0, 2.0, 3.0, 4.0);
    let out = jet * 3.0;
    assert_eq!(out.e(), 12.0);
    assert_eq!(out.kt2(), 45.0);
    approx_eq(out.phi(), 1.1071487177940904);
    approx_eq(out.rap(), 0.9729550745276567);

    let left = 2.0 * jet;
    assert_eq!(left.px(), 2.0);
    assert_eq!(left.kt2(), 20.0);

    let halved = PseudoJet::new(2.0, 4.0, 6.0, 8.0) / 2.0;
    assert_eq!(halved, jet);
}

#[test]
fn partial_eq_compares_four_momentum() {
    let a = PseudoJet::new(1.0, 2.0, 3.0, 4.0);
    let b = PseudoJet::new(1.0, 2.0, 3.0, 4.0);
    let c = PseudoJet::new(1.0, 2.0, 3.0, 5.0);
    assert!(a == b);
    assert!(a != c);
}

#[test]
fn separations_ignore_the_phi_branch_cut() {
    let a = PseudoJet::new(1.0, 0.01, 0.0, 1.0);
    let b = PseudoJet::new(1.0, -0.01, 0.0, 1.0);
    approx_eq(delta_phi(&a, &b), 2.0 * 0.01f64.atan());
    approx_eq(delta_r(&a, &b), delta_phi(&a, &b));
}

#[test]
fn dijet_mass_from_cartesian_jets() {
    let a = PseudoJet::new(30.0, 40.0, 0.0, 50.0);
    let b = PseudoJet::new(-30.0, -40.0, 0.0, 50.0);
    approx_eq(invariant_mass([&a, &b]), 100.0);
}
