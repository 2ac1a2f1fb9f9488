//! Inverse-distance push on a growing tip and the steering step that
//! applies it.

use crate::types::Point3;

/// Distances below this are treated as coincident and ignored.
const MIN_DISTANCE: f64 = 1e-12;

/// Accumulates the push a growing tip receives from nearby nodes.
///
/// Every contribution is the unit vector pointing from a neighbor to the
/// tip, scaled by the inverse distance, so closer neighbors push harder.
/// The summed vector is scaled by the repulsion weight on read-out.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Repulsion {
    sum: Point3,
    /// Number of neighbors that contributed.
    pub count: u32,
}

impl Repulsion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets to the empty state.
    pub fn clear(&mut self) {
        self.sum = Point3::ZERO;
        self.count = 0;
    }

    /// Adds the push of one neighbor at `neighbor` on a tip at `tip`.
    ///
    /// A neighbor coincident with the tip has no defined direction and
    /// contributes nothing.
    #[inline]
    pub fn add(&mut self, tip: Point3, neighbor: Point3) {
        let away = tip - neighbor;
        let d2 = away.length_squared();
        if d2 < MIN_DISTANCE * MIN_DISTANCE {
            return;
        }
        self.sum += away / d2;
        self.count += 1;
    }

    /// Returns the summed push scaled by `weight`.
    #[inline]
    pub fn displacement(&self, weight: f64) -> Point3 {
        self.sum * weight
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.count > 0
    }
}

/// Perturbs a unit `direction` by `displacement` and renormalizes.
///
/// A zero displacement returns `direction` bit for bit. The result never
/// points backwards: if the perturbed vector is degenerate or has no
/// positive component along `direction`, `direction` is returned unchanged.
pub fn steer(direction: Point3, displacement: Point3) -> Point3 {
    if displacement == Point3::ZERO {
        return direction;
    }
    let perturbed = (direction + displacement).normalize_or_zero();
    if perturbed.dot(direction) > 0.0 {
        perturbed
    } else {
        direction
    }
}
