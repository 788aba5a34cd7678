//! Optical code identifiers.
//!
//! Identifiers are minted before a code record is persisted, so that the
//! payload embedded into a printed code can be computed right away.
//! They carry no information about the code itself and never change afterwards.

use uuid::Uuid;

/// Mint a new random code identifier.
///
/// ## Example
///
/// ```
/// let id = common::id::mint();
/// assert_eq!(common::id::parse_minted(&id.to_string()), Some(id));
/// ```
pub fn mint() -> Uuid {
    Uuid::new_v4()
}

/// Parse an identifier that follows the minting convention.
///
/// Only the canonical lower-case hyphenated form of a version 4 UUID is accepted,
/// so that each code has exactly one textual identifier.
pub fn parse_minted(value: &str) -> Option<Uuid> {
    let id = Uuid::parse_str(value).ok()?;

    if id.get_version_num() != 4 {
        return None;
    }

    if id.hyphenated().to_string() != value {
        return None;
    }

    Some(id)
}

/// Check if the provided value could be mistaken for an identifier.
///
/// Public slugs and identifiers share the same scan route,
/// thus slugs must never pass this check.
pub fn looks_like_id(value: &str) -> bool {
    Uuid::parse_str(value).is_ok()
}
