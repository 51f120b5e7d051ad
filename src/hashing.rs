use core::hash::{BuildHasher, Hash};

use rustc_hash::FxBuildHasher;

/// Deterministic hash of a single element.
///
/// Collection hashes are wrapping sums of these, so they do not depend on
/// traversal order or tree shape.
pub(crate) fn element_hash<T: ?Sized + Hash>(element: &T) -> u64 {
    FxBuildHasher.hash_one(element)
}

/// Hash contribution of one map entry.
pub(crate) fn entry_hash<K: ?Sized + Hash, V: ?Sized + Hash>(key: &K, value: &V) -> u64 {
    element_hash(key) ^ element_hash(value)
}

/// Order-independent combination of element hashes.
pub(crate) fn sum_hashes(hashes: impl Iterator<Item = u64>) -> u64 {
    hashes.fold(0, u64::wrapping_add)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn sum_ignores_order() {
        let forward = sum_hashes(["a", "b", "c"].iter().map(element_hash));
        let backward = sum_hashes(["c", "b", "a"].iter().map(element_hash));
        assert_eq!(forward, backward);
        assert_eq!(sum_hashes(core::iter::empty()), 0);
    }

    #[test]
    fn entry_hash_mixes_both_sides() {
        assert_eq!(entry_hash(&1_u32, &1_u32), 0);
        assert_ne!(entry_hash(&1_u32, &2_u32), entry_hash(&1_u32, &3_u32));
    }
}
