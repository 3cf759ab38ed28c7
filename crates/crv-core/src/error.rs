use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CrvError {
    #[error("unsupported spline order {0}, supported range is 2..12")]
    InvalidOrder(usize),

    #[error("invalid control point count {got}, at least {min} (the spline order) required")]
    InvalidCount { got: usize, min: usize },

    #[error("invalid weight count {got}, expected 0 or {expected}")]
    InvalidWeightCount { got: usize, expected: usize },

    #[error("invalid knot count {got}, expected order + count = {expected}")]
    InvalidKnotCount { got: usize, expected: usize },

    #[error("control point count {got} does not match basis count {expected}")]
    InvalidControlPointCount { got: usize, expected: usize },
}

pub type Result<T> = std::result::Result<T, CrvError>;
