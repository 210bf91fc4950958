// Ingestion limits for documents loaded from JSON

pub const MAX_NODES: usize = 200_000;
pub const MAX_PATH_ITEMS: usize = 10_000;
pub const MAX_SEGMENTS_PER_ITEM: usize = 500_000;
// ids cross the JS boundary as u32
pub const MAX_NODE_ID: u64 = u32::MAX as u64;

// Numeric bounds
pub const COORD_MIN: f64 = -10_000_000.0;
pub const COORD_MAX: f64 =  10_000_000.0;

#[inline]
pub fn in_coord_bounds(x: f64) -> bool { x.is_finite() && x >= COORD_MIN && x <= COORD_MAX }
