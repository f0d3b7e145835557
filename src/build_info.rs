//! Static version and build identifiers.

/// The crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Short git hash of the commit this library was built from, or `"unknown"`.
pub fn build_hash() -> &'static str {
    env!("SYSTRAY_BUILD_HASH")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_non_empty() {
        assert_eq!(version(), env!("CARGO_PKG_VERSION"));
        assert!(!build_hash().is_empty());
    }
}
