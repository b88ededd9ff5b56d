use chrono::Utc;
use rand::{distributions::Alphanumeric, thread_rng, Rng};

const BASE36_DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub fn random_string(length: usize) -> String {
    let mut rng = thread_rng();

    std::iter::repeat(())
        .map(|_| rng.sample(Alphanumeric) as char)
        .take(length)
        .collect()
}

/// The current time in milliseconds since the epoch, which is the unit
/// every stored timestamp uses.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Generates a new playlist id token, such as `pl_lx2c41a8k3f9q1`.
/// Tokens are never reused, since the millisecond prefix only moves forward.
pub fn generate_playlist_id() -> String {
    format!(
        "pl_{}{}",
        to_base36(now_millis()),
        random_string(6).to_lowercase()
    )
}

fn to_base36(value: i64) -> String {
    let mut remaining = value.unsigned_abs();

    if remaining == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();

    while remaining > 0 {
        digits.push(BASE36_DIGITS[(remaining % 36) as usize]);
        remaining /= 36;
    }

    digits.reverse();
    String::from_utf8(digits).expect("base36 digits are ascii")
}
