//! core::exemption
//!
//! Storage locations and the exemptions that tolerate their failures.
//!
//! # Location
//!
//! A [`Location`] identifies one storage item and renders as
//! `<lowerCamelModule>.<lowerCamelItem>: <TypeName>`, for example
//! `staking.erasStakers: Exposure<[u8; 32], u128>`.
//!
//! # Matching
//!
//! [`Exemption::Item`] matches on the structured `(module, item)` key, with
//! both sides compared in lower camel case. [`Exemption::Substring`] is the
//! legacy mode: it matches when the pattern occurs anywhere in the rendered
//! location, so renaming a type can silently change what it covers.
//!
//! # Example
//!
//! ```
//! use metaconform::core::exemption::{Exemption, Location};
//!
//! let loc = Location::new("Staking", "ErasStakers", "Exposure");
//! assert_eq!(loc.to_string(), "staking.erasStakers: Exposure");
//!
//! assert!(Exemption::item("Staking", "ErasStakers").matches(&loc));
//! assert!(Exemption::substring("erasStakers").matches(&loc));
//! assert!(!Exemption::item("Staking", "Ledger").matches(&loc));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::naming::lower_camel;

/// A storage item location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    /// Module name, lower camel case.
    pub module: String,
    /// Storage item name, lower camel case.
    pub item: String,
    /// Display name of the resolved type.
    pub type_name: String,
}

impl Location {
    /// Build a location from declared (upper camel) names.
    pub fn new(module: &str, item: &str, type_name: impl Into<String>) -> Self {
        Self {
            module: lower_camel(module),
            item: lower_camel(item),
            type_name: type_name.into(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}: {}", self.module, self.item, self.type_name)
    }
}

/// A pattern naming locations expected to fail default validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Exemption {
    /// Structured `(module, item)` key.
    Item { module: String, item: String },
    /// Legacy substring match on the rendered location.
    Substring(String),
}

impl Exemption {
    pub fn item(module: impl Into<String>, item: impl Into<String>) -> Self {
        Self::Item {
            module: module.into(),
            item: item.into(),
        }
    }

    pub fn substring(pattern: impl Into<String>) -> Self {
        Self::Substring(pattern.into())
    }

    pub fn matches(&self, location: &Location) -> bool {
        match self {
            Exemption::Item { module, item } => {
                lower_camel(module) == location.module && lower_camel(item) == location.item
            }
            Exemption::Substring(pattern) => location.to_string().contains(pattern.as_str()),
        }
    }
}

impl fmt::Display for Exemption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exemption::Item { module, item } => write!(f, "{module}.{item}"),
            Exemption::Substring(pattern) => write!(f, "~{pattern}"),
        }
    }
}

/// Whether any exemption in `fails` covers `location`.
pub fn is_exempt(fails: &[Exemption], location: &Location) -> bool {
    fails.iter().any(|e| e.matches(location))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> Location {
        Location::new("XcmPallet", "SupportedVersion", "Option<u32>")
    }

    #[test]
    fn renders_lower_camel() {
        assert_eq!(loc().to_string(), "xcmPallet.supportedVersion: Option<u32>");
    }

    #[test]
    fn item_match_ignores_declared_casing() {
        assert!(Exemption::item("XcmPallet", "SupportedVersion").matches(&loc()));
        assert!(Exemption::item("xcmPallet", "supportedVersion").matches(&loc()));
        assert!(!Exemption::item("XcmPallet", "Supported").matches(&loc()));
    }

    #[test]
    fn item_match_is_not_partial() {
        assert!(!Exemption::item("Xcm", "SupportedVersion").matches(&loc()));
    }

    #[test]
    fn substring_matches_anywhere() {
        assert!(Exemption::substring("xcmPallet.").matches(&loc()));
        assert!(Exemption::substring("Option<u32>").matches(&loc()));
        assert!(!Exemption::substring("XcmPallet").matches(&loc()));
    }

    #[test]
    fn empty_list_exempts_nothing() {
        assert!(!is_exempt(&[], &loc()));
        assert!(is_exempt(
            &[Exemption::substring("nope"), Exemption::substring("supported")],
            &loc()
        ));
    }

    #[test]
    fn deserializes_both_forms() {
        let parsed: Vec<Exemption> =
            serde_json::from_str(r#"["balances.", {"module": "System", "item": "Events"}]"#)
                .unwrap();
        assert_eq!(
            parsed,
            vec![
                Exemption::substring("balances."),
                Exemption::item("System", "Events")
            ]
        );
    }
}
