//! Sequential identifier formatting and allocation.
//!
//! Identifiers are human-readable: a namespace prefix plus a zero-padded
//! numeric suffix (`PAT000001`, `BS000001`). The next value is always
//! derived from the maximum suffix already persisted in that namespace,
//! never from an in-memory counter, so sequences survive process restarts
//! and stay correct across multiple processes. Uniqueness is ultimately
//! enforced by the store's UNIQUE constraint on the identifier column;
//! callers retry allocation when an insert loses that race.

use crate::db::{Database, DbResult};

/// Identifier namespaces, each with an independent sequence starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Patient,
    Sample,
}

impl Namespace {
    pub fn prefix(&self) -> &'static str {
        match self {
            Namespace::Patient => "PAT",
            Namespace::Sample => "BS",
        }
    }
}

/// Width of the zero-padded numeric suffix.
///
/// Persisted contract: fixed width keeps lexicographic ordering equal to
/// numeric ordering, which `MAX()`-based allocation and ID-sorted listings
/// both rely on.
pub const SUFFIX_WIDTH: usize = 6;

/// Attempts before giving up when racing another writer for an identifier.
pub const MAX_ID_RETRIES: u32 = 3;

/// Format a sequence number as a full identifier, e.g. `PAT000001`.
pub fn format_id(namespace: Namespace, sequence: u32) -> String {
    format!(
        "{}{:0width$}",
        namespace.prefix(),
        sequence,
        width = SUFFIX_WIDTH
    )
}

/// Extract the numeric suffix from an identifier in the given namespace.
///
/// Returns `None` for identifiers that do not match the persisted format
/// exactly (wrong prefix, wrong width, non-digit characters).
pub fn parse_suffix(namespace: Namespace, id: &str) -> Option<u32> {
    let digits = id.strip_prefix(namespace.prefix())?;
    if digits.len() != SUFFIX_WIDTH || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Compute the next sequence number for a namespace.
///
/// Reads the current maximum persisted suffix and adds 1. Two unserialized
/// calls can observe the same maximum; the insert's UNIQUE constraint
/// rejects the loser, which retries up to [`MAX_ID_RETRIES`] times.
pub fn next_sequence(db: &Database, namespace: Namespace) -> DbResult<u32> {
    Ok(db.max_id_suffix(namespace)? + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_format_id() {
        assert_eq!(format_id(Namespace::Patient, 1), "PAT000001");
        assert_eq!(format_id(Namespace::Sample, 42), "BS000042");
        assert_eq!(format_id(Namespace::Patient, 999_999), "PAT999999");
    }

    #[test]
    fn test_parse_suffix() {
        assert_eq!(parse_suffix(Namespace::Patient, "PAT000001"), Some(1));
        assert_eq!(parse_suffix(Namespace::Sample, "BS000042"), Some(42));
        // wrong namespace
        assert_eq!(parse_suffix(Namespace::Sample, "PAT000001"), None);
        // wrong width
        assert_eq!(parse_suffix(Namespace::Patient, "PAT001"), None);
        assert_eq!(parse_suffix(Namespace::Patient, "PAT0000001"), None);
        // non-digit suffix
        assert_eq!(parse_suffix(Namespace::Patient, "PATABCDEF"), None);
        assert_eq!(parse_suffix(Namespace::Patient, "PAT00001x"), None);
    }

    #[test]
    fn test_first_sequence_in_empty_namespace() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(next_sequence(&db, Namespace::Patient).unwrap(), 1);
        assert_eq!(next_sequence(&db, Namespace::Sample).unwrap(), 1);
    }

    proptest! {
        #[test]
        fn prop_format_parse_roundtrip(seq in 1u32..=999_999) {
            for ns in [Namespace::Patient, Namespace::Sample] {
                let id = format_id(ns, seq);
                prop_assert_eq!(parse_suffix(ns, &id), Some(seq));
            }
        }

        #[test]
        fn prop_ordering_is_lexicographic(a in 1u32..=999_999, b in 1u32..=999_999) {
            let ids = (
                format_id(Namespace::Patient, a),
                format_id(Namespace::Patient, b),
            );
            prop_assert_eq!(a.cmp(&b), ids.0.cmp(&ids.1));
        }
    }
}
