//! Recursive ordered-dithering threshold maps.
//!
//! A map of order `n` is a `2^(n+1)` square holding every integer in
//! `[0, 4^(n+1))` exactly once. Order 0 is the fixed 2x2 base pattern; each
//! higher order tiles four copies of the previous map scaled by 4, offset by
//! the base entry of the quadrant the cell falls in.

use std::sync::Arc;

use crate::error::EngineError;

/// The order-0 pattern every larger map is built from.
pub const BASE_THRESHOLD_MAP: [[u32; 2]; 2] = [[0, 2], [3, 1]];

/// Largest order accepted by [`ThresholdMap::generate`] (a 2048x2048 map).
pub const MAX_THRESHOLD_ORDER: u32 = 10;

/// Immutable square threshold matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdMap {
    order: u32,
    side: usize,
    /// Row-major, `cells[i * side + j]` is `map[i][j]`
    cells: Vec<u32>,
}

impl ThresholdMap {
    /// Build the threshold map for `order`.
    ///
    /// # Errors
    /// * `EngineError::InvalidOrder` - If `order` exceeds [`MAX_THRESHOLD_ORDER`]
    pub fn generate(order: u32) -> Result<Self, EngineError> {
        if order > MAX_THRESHOLD_ORDER {
            return Err(EngineError::InvalidOrder(order));
        }
        Ok(Self::build(order))
    }

    fn build(order: u32) -> Self {
        if order == 0 {
            return Self {
                order: 0,
                side: 2,
                cells: BASE_THRESHOLD_MAP.iter().flatten().copied().collect(),
            };
        }

        let previous = Self::build(order - 1);
        let half = previous.side;
        let side = half * 2;

        let mut cells = Vec::with_capacity(side * side);
        for i in 0..side {
            let quadrant_x = usize::from(i >= half);
            for j in 0..side {
                let quadrant_y = usize::from(j >= half);
                cells.push(
                    4 * previous.get(i % half, j % half)
                        + BASE_THRESHOLD_MAP[quadrant_x][quadrant_y],
                );
            }
        }

        Self { order, side, cells }
    }

    /// The order this map was generated from.
    pub fn order(&self) -> u32 {
        self.order
    }

    /// Side length, `2^(order+1)`.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Entry `map[i][j]`.
    ///
    /// Panics if either index is `>= side()`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> u32 {
        self.cells[i * self.side + j]
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        self.cells.chunks_exact(self.side)
    }

    /// Normalized threshold in `[0, 1)` for a frame coordinate, tiling the
    /// map across the frame: `map[x mod side][y mod side] / side²`.
    #[inline]
    pub fn threshold_at(&self, x: usize, y: usize) -> f32 {
        let value = self.get(x % self.side, y % self.side);
        value as f32 / self.cells.len() as f32
    }
}

/// Caller-side memo of the most recently requested threshold map.
///
/// Regenerates only when the requested order differs from the cached one.
#[derive(Debug, Default)]
pub struct ThresholdCache {
    current: Option<Arc<ThresholdMap>>,
}

impl ThresholdCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the map for `order`, regenerating it if the order changed.
    pub fn get(&mut self, order: u32) -> Result<Arc<ThresholdMap>, EngineError> {
        if let Some(map) = &self.current {
            if map.order() == order {
                return Ok(Arc::clone(map));
            }
        }

        let map = Arc::new(ThresholdMap::generate(order)?);
        log::info!(
            "Generated threshold map of order {} ({}x{})",
            order,
            map.side(),
            map.side()
        );
        self.current = Some(Arc::clone(&map));
        Ok(map)
    }
}
