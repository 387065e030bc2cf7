//! Basic numerical concepts used throughout the program

#![allow(missing_docs)]

use nalgebra::Vector3;

// Floating-point precision is configured here
#[cfg(feature = "f32")]
pub type Float = f32;
#[cfg(feature = "f32")]
pub use std::f32 as reals;
#[cfg(not(feature = "f32"))]
pub type Float = f64;
#[cfg(not(feature = "f32"))]
pub use std::f64 as reals;

/// A point in detector coordinates (cm)
pub type Position = Vector3<Float>;

/// A 3-momentum (GeV/c)
pub type Momentum = Vector3<Float>;

/// Build a 3-vector from its components
pub fn xyz(x: Float, y: Float, z: Float) -> Vector3<Float> {
    Vector3::new(x, y, z)
}
