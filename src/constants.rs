pub const PI: f64 = std::f64::consts::PI;
pub const TWO_PI: f64 = std::f64::consts::TAU;

/// rapidity reported for jets with no transverse momentum
pub const MAX_RAP: f64 = 1e5;

pub const GEV: f64 = 1.0;
