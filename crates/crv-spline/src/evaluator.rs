//! Curve evaluation: contracts basis function values against control
//! points, with the quotient-rule correction for rational curves.

use std::sync::Arc;

use crv_core::tolerance::param_eq;
use crv_core::{CrvError, Point3, Result, Vector3};

use crate::basis::{binomial, Basis};

/// Evaluates points and derivatives of a (possibly rational) B-spline
/// curve.
///
/// Holds a shared [`Basis`] and its own copy of the control points. Every
/// evaluation is a pure function of `u`, so an evaluator may be shared
/// across threads, and one basis may back many evaluators.
#[derive(Debug, Clone)]
pub struct Evaluator {
    basis: Arc<Basis>,
    control_points: Vec<Point3>,
}

impl Evaluator {
    /// Pair a basis with its control points.
    ///
    /// The control point count must match `basis.count()`; a mismatch is
    /// rejected here rather than surfacing as out-of-range access during
    /// evaluation.
    pub fn new(basis: Arc<Basis>, control_points: Vec<Point3>) -> Result<Self> {
        if control_points.len() != basis.count() {
            return Err(CrvError::InvalidControlPointCount {
                got: control_points.len(),
                expected: basis.count(),
            });
        }
        Ok(Self {
            basis,
            control_points,
        })
    }

    pub fn basis(&self) -> &Basis {
        &self.basis
    }

    pub fn control_points(&self) -> &[Point3] {
        &self.control_points
    }

    // Snap onto the closed right boundary of the knot domain, so span
    // search never lands one past the last valid span.
    fn snap(&self, u: f64) -> f64 {
        let max_t = self.basis.max_t();
        if param_eq(u, max_t) {
            max_t
        } else {
            u
        }
    }

    /// Curve point at parameter `u`.
    ///
    /// Rational weighting is already folded into the basis values, so no
    /// separate branch is needed here.
    pub fn point(&self, u: f64) -> Point3 {
        let u = self.snap(u);
        let p = self.basis.degree();
        let span = self.basis.find_span(u);
        let funcs = self.basis.basis_funcs(span, u);

        let mut point = Point3::ZERO;
        for (i, &value) in funcs.iter().enumerate() {
            point += value * self.control_points[span - p + i];
        }
        point
    }

    /// One curve point per parameter, evaluated lazily in input order.
    ///
    /// Each element is an independent call to [`point`](Self::point);
    /// re-iterating a fresh parameter sequence restarts cleanly.
    pub fn points<'a, I>(&'a self, params: I) -> impl Iterator<Item = Point3> + 'a
    where
        I: IntoIterator<Item = f64>,
        I::IntoIter: 'a,
    {
        params.into_iter().map(move |u| self.point(u))
    }

    /// Position and derivatives `1..=n` at `u`, as `min(n, degree) + 1`
    /// vectors (derivatives past the degree vanish identically).
    ///
    /// Rational curves use the binomial unwinding of `C(u) = Cw(u)/w(u)`
    /// differentiated `k` times: the homogeneous derivatives and the
    /// weight function derivatives are contracted first, then each
    /// Euclidean derivative is recovered by peeling off the lower-order
    /// terms and dividing by the curve weight at `u`.
    pub fn derivative(&self, u: f64, n: usize) -> Vec<Vector3> {
        let u = self.snap(u);
        let p = self.basis.degree();
        let span = self.basis.find_span(u);
        let derivs = self.basis.basis_funcs_derivatives(span, u, n);

        if self.basis.is_rational() {
            let weights = self.basis.weights();

            let mut ckw: Vec<Vector3> = Vec::with_capacity(derivs.len());
            let mut wders: Vec<f64> = Vec::with_capacity(derivs.len());
            for row in &derivs {
                let mut v = Vector3::ZERO;
                let mut wd = 0.0;
                for (i, &value) in row.iter().enumerate() {
                    let idx = span - p + i;
                    let bw = value * weights[idx];
                    v += bw * self.control_points[idx];
                    wd += bw;
                }
                ckw.push(v);
                wders.push(wd);
            }

            let mut ck: Vec<Vector3> = Vec::with_capacity(ckw.len());
            for k in 0..ckw.len() {
                let mut v = ckw[k];
                for i in 1..=k {
                    v -= binomial(k, i) * wders[i] * ck[k - i];
                }
                ck.push(v / wders[0]);
            }
            ck
        } else {
            derivs
                .iter()
                .map(|row| {
                    let mut v = Vector3::ZERO;
                    for (i, &value) in row.iter().enumerate() {
                        v += value * self.control_points[span - p + i];
                    }
                    v
                })
                .collect()
        }
    }

    /// One derivative bundle per parameter, evaluated lazily in input
    /// order. Same restartability contract as [`points`](Self::points).
    pub fn derivatives<'a, I>(
        &'a self,
        params: I,
        n: usize,
    ) -> impl Iterator<Item = Vec<Vector3>> + 'a
    where
        I: IntoIterator<Item = f64>,
        I::IntoIter: 'a,
    {
        params.into_iter().map(move |u| self.derivative(u, n))
    }
}
