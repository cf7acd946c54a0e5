//! Wearable (clothing layer) enumeration

use serde::{Deserialize, Serialize};

/// An enumerated clothing or body layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WearableType {
    Gloves,
    Jacket,
    Pants,
    Shirt,
    Shoes,
    Skirt,
    Socks,
    Underpants,
    Undershirt,
    Skin,
    Eyes,
    Hair,
    Shape,
    Alpha,
    Tattoo,
    Physics,
    Universe,
}

impl WearableType {
    /// Every layer, in `getoutfit` reply order
    pub const ALL: [WearableType; 17] = [
        WearableType::Gloves,
        WearableType::Jacket,
        WearableType::Pants,
        WearableType::Shirt,
        WearableType::Shoes,
        WearableType::Skirt,
        WearableType::Socks,
        WearableType::Underpants,
        WearableType::Undershirt,
        WearableType::Skin,
        WearableType::Eyes,
        WearableType::Hair,
        WearableType::Shape,
        WearableType::Alpha,
        WearableType::Tattoo,
        WearableType::Physics,
        WearableType::Universe,
    ];

    /// Protocol name
    pub fn name(self) -> &'static str {
        match self {
            WearableType::Gloves => "gloves",
            WearableType::Jacket => "jacket",
            WearableType::Pants => "pants",
            WearableType::Shirt => "shirt",
            WearableType::Shoes => "shoes",
            WearableType::Skirt => "skirt",
            WearableType::Socks => "socks",
            WearableType::Underpants => "underpants",
            WearableType::Undershirt => "undershirt",
            WearableType::Skin => "skin",
            WearableType::Eyes => "eyes",
            WearableType::Hair => "hair",
            WearableType::Shape => "shape",
            WearableType::Alpha => "alpha",
            WearableType::Tattoo => "tattoo",
            WearableType::Physics => "physics",
            WearableType::Universe => "universe",
        }
    }

    /// Parse a protocol name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|w| w.name().eq_ignore_ascii_case(name))
    }

    /// Body parts can be replaced but never removed
    pub fn is_body_part(self) -> bool {
        matches!(
            self,
            WearableType::Shape | WearableType::Skin | WearableType::Eyes | WearableType::Hair
        )
    }
}

impl std::fmt::Display for WearableType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(WearableType::from_name("pants"), Some(WearableType::Pants));
        assert_eq!(WearableType::from_name("SHIRT"), Some(WearableType::Shirt));
        assert_eq!(WearableType::from_name("spine"), None);
    }

    #[test]
    fn test_body_parts() {
        assert!(WearableType::Shape.is_body_part());
        assert!(WearableType::Hair.is_body_part());
        assert!(!WearableType::Alpha.is_body_part());
    }
}
