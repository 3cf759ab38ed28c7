/// Absolute tolerance for parameter-space comparisons (in knot units).
///
/// Curve evaluation snaps parameters within this distance of the right
/// domain boundary onto the boundary itself, so the closed end of the
/// knot domain stays reachable despite floating point noise.
pub const ABS_TOL: f64 = 1e-12;

/// Check two parameter values for equality within [`ABS_TOL`].
pub fn param_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < ABS_TOL
}
