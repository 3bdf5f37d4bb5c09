//! Parallel utilities with feature-gated implementations
//!
//! Right-hand-side columns are independent once a factorization exists, so
//! they are mapped with rayon when the `rayon` feature is enabled and
//! sequentially otherwise.

/// Check if parallel processing is available
#[cfg(feature = "rayon")]
pub fn is_parallel_available() -> bool {
    true
}

/// Check if parallel processing is available
#[cfg(not(feature = "rayon"))]
pub fn is_parallel_available() -> bool {
    false
}

/// Parallel map with index
#[cfg(feature = "rayon")]
pub fn parallel_map_indexed<U, F>(count: usize, f: F) -> Vec<U>
where
    U: Send,
    F: Fn(usize) -> U + Sync + Send,
{
    use rayon::prelude::*;
    (0..count).into_par_iter().map(f).collect()
}

/// Sequential map with index (fallback)
#[cfg(not(feature = "rayon"))]
pub fn parallel_map_indexed<U, F>(count: usize, f: F) -> Vec<U>
where
    F: Fn(usize) -> U,
{
    (0..count).map(f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_map_indexed_keeps_order() {
        let squares = parallel_map_indexed(64, |i| i * i);
        assert_eq!(squares.len(), 64);
        for (i, v) in squares.iter().enumerate() {
            assert_eq!(*v, i * i);
        }
    }

    #[test]
    fn test_parallel_map_indexed_empty() {
        let out: Vec<usize> = parallel_map_indexed(0, |i| i);
        assert!(out.is_empty());
    }

    #[test]
    fn test_availability_matches_feature() {
        assert_eq!(is_parallel_available(), cfg!(feature = "rayon"));
    }
}
