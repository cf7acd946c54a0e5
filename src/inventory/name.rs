//! Naming conventions carried in folder names
//!
//! - `.name` - private: hidden from listing, search and recursive operations
//! - `~name` - marker ignored for display and matching
//! - `+name` - additive: attaching under it adds instead of replacing
//! - `(point)` - explicit attachment point tag

use crate::core::AttachmentPoint;

/// Whether a folder name marks a private folder
pub fn is_private(name: &str) -> bool {
    name.starts_with('.')
}

/// Whether a folder name marks an additive folder
pub fn is_additive(name: &str) -> bool {
    strip_ignored(name).starts_with('+')
}

/// Drop a leading `~`
pub fn strip_ignored(name: &str) -> &str {
    name.strip_prefix('~').unwrap_or(name)
}

/// Drop leading `~` and `+` markers for path matching
pub fn strip_markers(name: &str) -> &str {
    name.trim_start_matches(['~', '+'])
}

/// Explicit attachment point tag in a name, if any
pub fn point_tag(name: &str) -> Option<AttachmentPoint> {
    AttachmentPoint::from_name_tag(name)
}

/// Whether a folder name satisfies a path segment.
///
/// Matching is case-sensitive; `~`/`+` markers on either side are ignored.
pub fn matches_segment(name: &str, segment: &str) -> bool {
    name == segment || strip_markers(name) == strip_markers(segment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers() {
        assert!(is_private(".outfits"));
        assert!(!is_private("~.outfits"));
        assert!(is_additive("+Jewelry"));
        assert!(is_additive("~+Jewelry"));
        assert!(!is_additive("Jewelry"));
        assert_eq!(strip_ignored("~Hats"), "Hats");
        assert_eq!(strip_markers("~+Hats"), "Hats");
    }

    #[test]
    fn test_segment_matching() {
        assert!(matches_segment("Hats", "Hats"));
        assert!(matches_segment("~Hats", "Hats"));
        assert!(matches_segment("+Hats", "Hats"));
        assert!(!matches_segment("hats", "Hats"));
        assert!(!matches_segment("Hats 2", "Hats"));
    }

    #[test]
    fn test_point_tag() {
        assert_eq!(point_tag("Wings (left wing)"), Some(AttachmentPoint::LeftWing));
        assert_eq!(point_tag("Wings"), None);
    }
}
