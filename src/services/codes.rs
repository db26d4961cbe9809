use chrono::{DateTime, Utc};
use rand::Rng;

const BASE36_UPPER: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// `len` random characters from `[0-9A-Z]`.
pub fn random_suffix(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| BASE36_UPPER[rng.random_range(0..BASE36_UPPER.len())] as char)
        .collect()
}

/// `0x` followed by 64 random hex digits. Only a display token, not a digest.
pub fn random_hash() -> String {
    let mut rng = rand::rng();
    let digits: String = (0..64)
        .map(|_| char::from_digit(rng.random_range(0..16), 16).unwrap_or('0'))
        .collect();
    format!("0x{digits}")
}

/// `<prefix><unix millis><suffix>`, e.g. `TG1705329000000K3J9X0QZA`.
pub fn timestamped_code(prefix: &str, now: DateTime<Utc>, suffix_len: usize) -> String {
    format!("{prefix}{}{}", now.timestamp_millis(), random_suffix(suffix_len))
}
