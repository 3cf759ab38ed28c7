pub mod error;
pub mod tolerance;

pub use error::{CrvError, Result};
pub use tolerance::ABS_TOL;

pub use glam::DVec3;

pub type Point3 = DVec3;
pub type Vector3 = DVec3;
