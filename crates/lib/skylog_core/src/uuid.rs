// Helpers for record identifiers.
//
// Ids are UUIDv7, generated app-side so both store backends hand out
// time-sortable keys.

use uuid::Uuid;

/// Generate a new UUIDv7 (timestamp-sortable).
pub fn uuidv7() -> Uuid {
    Uuid::now_v7()
}

/// Parse an id taken from a path segment. Anything that is not a UUID
/// yields `None` so callers can answer "not found" instead of failing.
pub fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuidv7_is_valid() {
        let id = uuidv7();
        assert_eq!(id.get_version(), Some(uuid::Version::SortRand));
    }

    #[test]
    fn uuidv7_is_monotonic() {
        let a = uuidv7();
        let b = uuidv7();
        assert!(b >= a);
    }

    #[test]
    fn parse_id_rejects_garbage() {
        assert!(parse_id("not-an-id").is_none());
        assert!(parse_id("").is_none());
        assert!(parse_id("64f0c2a1e4b0a1b2c3d4e5f6").is_none());
    }

    #[test]
    fn parse_id_accepts_uuid() {
        let id = uuidv7();
        assert_eq!(parse_id(&id.to_string()), Some(id));
    }
}
