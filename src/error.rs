use thiserror::Error;

/// Errors reported by map views and their cursors.
///
/// A missing key is never an error: lookups and removals return `None`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum MapError {
    /// `Cursor::remove` was called before the first `next`, or twice without
    /// an intervening `next`.
    #[error("`remove()` requires a preceding `next()` that has not been removed yet")]
    InvalidIteratorState,

    /// Views can only shrink the map; they have no value to pair with a key.
    #[error("`{operation}` is not supported by a map view")]
    Unsupported { operation: &'static str },

    /// A structural invariant of the tree does not hold.
    #[error("tree invariant violated: {detail}")]
    CorruptTree { detail: &'static str },
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn messages() {
        assert_eq!(
            MapError::Unsupported { operation: "add" }.to_string(),
            "`add` is not supported by a map view"
        );
        assert_eq!(
            MapError::CorruptTree { detail: "root has a parent" }.to_string(),
            "tree invariant violated: root has a parent"
        );
    }
}
