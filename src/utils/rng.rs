use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

/// Deterministic per-unit RNG.
///
/// `stream` identifies an independent unit of work (sweep point, replica,
/// percolation trial). The same `(master, stream)` always yields the same
/// sequence, whatever thread the unit runs on.
pub fn stream_rng(master: u64, stream: u64) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(splitmix64(master ^ splitmix64(stream)))
}

/// Stream id for replica `replica` of sweep point `point`.
#[inline]
pub fn stream_id(point: usize, replica: usize) -> u64 {
    ((point as u64) << 32) | (replica as u64 & 0xFFFF_FFFF)
}

#[inline]
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D049BB133111EB);
    x ^ (x >> 31)
}
