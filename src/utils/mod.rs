/// Current time as seconds since the unix epoch.
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Booleans are stored as 0/1 integers so both sqlite and mysql decode them alike.
pub fn to_flag(value: bool) -> i64 {
    i64::from(value)
}

pub fn from_flag(value: i64) -> bool {
    value != 0
}

/// Expiry rule shared by the in-memory check and the SQL scan: a ttl of 0
/// never expires, otherwise the upload expires strictly after `creation + ttl`.
pub fn is_expired(creation: i64, ttl: i64, now: i64) -> bool {
    ttl > 0 && now > creation.saturating_add(ttl)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_ttl_never_expires() {
        assert!(!is_expired(0, 0, i64::MAX));
    }

    #[test]
    fn expiry_is_strict() {
        let t0 = 1_000;
        assert!(!is_expired(t0, 10, t0 + 5));
        assert!(!is_expired(t0, 10, t0 + 10));
        assert!(is_expired(t0, 10, t0 + 11));
    }

    #[test]
    fn flags_round_trip() {
        assert_eq!(to_flag(true), 1);
        assert_eq!(to_flag(false), 0);
        assert!(from_flag(1));
        assert!(!from_flag(0));
    }
}
