//! crv B-spline/NURBS evaluation kernel.
//!
//! [`Basis`] owns a knot vector and optional rational weights and answers
//! the purely combinatorial questions: which knot span holds a parameter,
//! what are the nonzero basis function values there, and what are their
//! derivatives. [`Evaluator`] pairs a shared basis with control points and
//! turns those answers into curve points and derivative vectors, applying
//! the rational quotient-rule correction where weights are present.

pub mod basis;
pub mod evaluator;

pub use basis::{Basis, MAX_ORDER};
pub use evaluator::Evaluator;
