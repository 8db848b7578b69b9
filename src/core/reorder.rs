//! Axis reordering into the runtime interpolator's layout.

use crate::types::LutCube;

/// Permute a reduced cube from source order `[sun][azimuth][sat]` into the
/// runtime order `[sun][sat][azimuth]`.
///
/// Pure permutation: values move, nothing is resampled. The result is
/// materialized in standard row-major layout so packaging can stream it in
/// index order.
pub fn to_runtime_order(cube: LutCube) -> LutCube {
    cube.permuted_axes([0, 2, 1])
        .as_standard_layout()
        .to_owned()
}
