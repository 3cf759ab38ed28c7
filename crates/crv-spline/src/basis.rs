//! B-spline basis functions: knot span search, the Cox–de Boor recurrence,
//! basis function derivatives, and rational span weighting.

use serde::{Deserialize, Serialize};

use crv_core::{CrvError, Result};

/// Hard upper bound on the spline order (degree + 1).
///
/// Scratch buffers for the recurrences are stack arrays with this
/// capacity, so the bound is a system limit, not a tuning knob.
pub const MAX_ORDER: usize = 12;

/// Factorials 0!..18!, enough for every binomial coefficient the bounded
/// order can ask for.
const FACTORIALS: [f64; 19] = [
    1.0,
    1.0,
    2.0,
    6.0,
    24.0,
    120.0,
    720.0,
    5040.0,
    40320.0,
    362880.0,
    3628800.0,
    39916800.0,
    479001600.0,
    6227020800.0,
    87178291200.0,
    1307674368000.0,
    20922789888000.0,
    355687428096000.0,
    6402373705728000.0,
];

/// Binomial coefficient `C(k, i)`, zero when `i > k`.
pub(crate) fn binomial(k: usize, i: usize) -> f64 {
    if i > k {
        0.0
    } else {
        FACTORIALS[k] / (FACTORIALS[i] * FACTORIALS[k - i])
    }
}

/// B-spline basis over a fixed knot vector, optionally rational.
///
/// Immutable after construction. Every method is a pure function of its
/// arguments with call-local scratch, so one `Basis` can back any number
/// of evaluators and be queried from multiple threads without locking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Basis {
    knots: Vec<f64>,
    weights: Vec<f64>,
    order: usize,
    count: usize,
    max_t: f64,
}

impl Basis {
    /// Build a basis from a knot vector, order (degree + 1), control point
    /// count, and rational weights (empty = non-rational).
    ///
    /// The knot vector must be non-decreasing; only its length is checked
    /// here. Fails without constructing anything when the order is outside
    /// `2..MAX_ORDER`, the count is below the order (a spline needs at
    /// least `order` control points, which also enforces the minimum of
    /// 2), the weight count is neither 0 nor `count`, or the knot count is
    /// not `order + count`.
    pub fn new(knots: Vec<f64>, order: usize, count: usize, weights: Vec<f64>) -> Result<Self> {
        if order < 2 || order >= MAX_ORDER {
            return Err(CrvError::InvalidOrder(order));
        }
        if count < order {
            return Err(CrvError::InvalidCount {
                got: count,
                min: order,
            });
        }
        if !weights.is_empty() && weights.len() != count {
            return Err(CrvError::InvalidWeightCount {
                got: weights.len(),
                expected: count,
            });
        }
        if knots.len() != order + count {
            return Err(CrvError::InvalidKnotCount {
                got: knots.len(),
                expected: order + count,
            });
        }
        let max_t = knots[knots.len() - 1];
        Ok(Self {
            knots,
            weights,
            order,
            count,
            max_t,
        })
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn degree(&self) -> usize {
        self.order - 1
    }

    /// Number of control points this basis indexes.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_rational(&self) -> bool {
        !self.weights.is_empty()
    }

    /// Upper end of the knot domain (the last knot value).
    pub fn max_t(&self) -> f64 {
        self.max_t
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Parameter domain `(knots[degree], max_t)` of a curve over this basis.
    pub fn domain(&self) -> (f64, f64) {
        (self.knots[self.degree()], self.max_t)
    }

    /// Locate the knot span holding parameter `u`.
    ///
    /// Returns `s` with `knots[s] <= u < knots[s + 1]`, the last valid span
    /// extended to include `u == max_t`. Parameters outside the knot domain
    /// clamp to the nearest valid span instead of failing.
    pub fn find_span(&self, u: f64) -> usize {
        let p = self.degree();
        let span = if self.knots[p] == 0.0 {
            // Standard clamped shape: right-bisection restricted to the
            // valid span range. `partition_point` always terminates, which
            // the textbook binary search does not on some closed knot
            // vectors.
            let shifted = self.knots[p..self.count].partition_point(|&k| k <= u);
            (p + shifted).saturating_sub(1)
        } else {
            // Anything else (shifted, closed, periodic): linear scan for
            // the first knot strictly beyond `u`. Slower but correct for
            // every knot pattern.
            match self.knots.iter().position(|&k| k > u) {
                Some(i) => i.saturating_sub(1),
                None => self.count - 1,
            }
        };
        // count >= order is guaranteed at construction, so degree <= count - 1.
        span.clamp(p, self.count - 1)
    }

    /// The `order` nonzero basis function values at `u` for `span`,
    /// computed with the triangular Cox–de Boor recurrence. Entry `r`
    /// weights control point `span + 1 - order + r`.
    ///
    /// Rational bases return the weighted, normalized values; see
    /// [`span_weighting`](Self::span_weighting).
    pub fn basis_funcs(&self, span: usize, u: f64) -> Vec<f64> {
        let p = self.degree();
        let mut n = vec![0.0; self.order];
        let mut left = [0.0_f64; MAX_ORDER];
        let mut right = [0.0_f64; MAX_ORDER];

        n[0] = 1.0;
        for j in 1..=p {
            left[j] = u - self.knots[span + 1 - j];
            right[j] = self.knots[span + j] - u;
            let mut saved = 0.0;
            for r in 0..j {
                let temp = n[r] / (right[r + 1] + left[j - r]);
                n[r] = saved + right[r + 1] * temp;
                saved = left[j - r] * temp;
            }
            n[j] = saved;
        }

        if self.is_rational() {
            self.span_weighting(&n, span)
        } else {
            n
        }
    }

    /// Reweight raw basis values by the control point weights covered by
    /// `span` and normalize them to sum 1.
    ///
    /// A weight sum of exactly zero yields an all-zero vector; degenerate
    /// weights are defined behavior, not an error.
    pub fn span_weighting(&self, values: &[f64], span: usize) -> Vec<f64> {
        let first = span + 1 - self.order;
        let mut products: Vec<f64> = values
            .iter()
            .zip(&self.weights[first..=span])
            .map(|(v, w)| v * w)
            .collect();
        let sum: f64 = products.iter().sum();
        if sum == 0.0 {
            return vec![0.0; values.len()];
        }
        for v in &mut products {
            *v /= sum;
        }
        products
    }

    /// Basis values for all `count` control points at `u`: the nonzero
    /// window from [`basis_funcs`](Self::basis_funcs) padded with zeros on
    /// both sides. Inspection path; evaluation works on the window
    /// directly.
    pub fn basis_vector(&self, u: f64) -> Vec<f64> {
        let span = self.find_span(u);
        let funcs = self.basis_funcs(span, u);
        let mut vector = vec![0.0; self.count];
        vector[span - self.degree()..=span].copy_from_slice(&funcs);
        vector
    }

    /// Basis function derivative rows `0..=n` at `u`, each of length
    /// `order`.
    ///
    /// Row 0 holds the raw (un-weighted) basis values even for rational
    /// bases; the rational correction happens downstream in the evaluator.
    /// `n` is clamped to the degree, since higher derivatives of a single
    /// polynomial span vanish identically.
    pub fn basis_funcs_derivatives(&self, span: usize, u: f64, n: usize) -> Vec<Vec<f64>> {
        let p = self.degree();
        let n = n.min(p);

        let mut left = [0.0_f64; MAX_ORDER];
        let mut right = [0.0_f64; MAX_ORDER];
        let mut ndu = [[0.0_f64; MAX_ORDER]; MAX_ORDER];

        ndu[0][0] = 1.0;
        for j in 1..=p {
            left[j] = u - self.knots[span + 1 - j];
            right[j] = self.knots[span + j] - u;
            let mut saved = 0.0;
            for r in 0..j {
                // Lower triangle: recurrence denominators.
                ndu[j][r] = right[r + 1] + left[j - r];
                let temp = ndu[r][j - 1] / ndu[j][r];
                // Upper triangle: basis values.
                ndu[r][j] = saved + right[r + 1] * temp;
                saved = left[j - r] * temp;
            }
            ndu[j][j] = saved;
        }

        let mut derivatives = vec![vec![0.0; self.order]; n + 1];
        for j in 0..=p {
            derivatives[0][j] = ndu[j][p];
        }

        // Per basis index, walk a two-row rolling buffer of derivative
        // coefficients; only rows k-1 and k of the table are ever live.
        let mut a = [[0.0_f64; MAX_ORDER]; 2];
        for r in 0..=p {
            let mut s1 = 0;
            let mut s2 = 1;
            a[0][0] = 1.0;

            for k in 1..=n {
                let mut d = 0.0;
                let pk = p - k;
                if r >= k {
                    a[s2][0] = a[s1][0] / ndu[pk + 1][r - k];
                    d = a[s2][0] * ndu[r - k][pk];
                }
                let j1 = if r + 1 >= k { 1 } else { k - r };
                let j2 = if r <= pk + 1 { k - 1 } else { p - r };
                for j in j1..=j2 {
                    let idx = r + j - k;
                    a[s2][j] = (a[s1][j] - a[s1][j - 1]) / ndu[pk + 1][idx];
                    d += a[s2][j] * ndu[idx][pk];
                }
                if r <= pk {
                    a[s2][k] = -a[s1][k - 1] / ndu[pk + 1][r];
                    d += a[s2][k] * ndu[r][pk];
                }
                derivatives[k][r] = d;
                std::mem::swap(&mut s1, &mut s2);
            }
        }

        // Scale row k by the falling factorial p * (p-1) * ... * (p-k+1).
        let mut factor = p as f64;
        for k in 1..=n {
            for value in &mut derivatives[k] {
                *value *= factor;
            }
            factor *= (p - k) as f64;
        }

        derivatives
    }
}
