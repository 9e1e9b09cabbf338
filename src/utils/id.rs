use chrono::Utc;
use std::sync::atomic::{AtomicU32, Ordering};

static SEQUENCE: AtomicU32 = AtomicU32::new(0);

/// Short, time-ordered wish id: base36 of the current nanosecond timestamp
/// followed by a per-process sequence number.
pub fn new_wish_id() -> String {
    let nanos = Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_else(|| Utc::now().timestamp_micros().saturating_mul(1000));
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed) % 1000;
    format!("{}{:03}", to_base36(nanos.unsigned_abs()), seq)
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn base36_digits() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_295), "zz");
    }

    #[test]
    fn ids_do_not_repeat_in_a_burst() {
        let ids: HashSet<String> = (0..200).map(|_| new_wish_id()).collect();
        assert_eq!(ids.len(), 200);
    }
}
