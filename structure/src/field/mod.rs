//! Local structural fields derived from the neighborhood index.
//!
//! - **Density**: neighborhood size, an absolute count
//! - **Gradient**: mean absolute density difference to neighbors
//! - **Curvature**: neighbor-distance non-uniformity blended with gradient
//!
//! Each field is its own immutable value produced by its own function. None
//! of them carries percentile, rank or direction semantics.

mod curvature;
mod density;
mod gradient;

pub use curvature::{CurvatureIndex, COEFFICIENT_OF_VARIATION_WEIGHT, GRADIENT_WEIGHT};
pub use density::DensityMap;
pub use gradient::DensityGradient;

use std::collections::BTreeMap;

/// Arithmetic mean of a field's values, zero when empty.
pub(crate) fn mean_of(values: &BTreeMap<String, f64>) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.values().sum::<f64>() / values.len() as f64
    }
}
