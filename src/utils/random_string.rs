use rand::Rng;

const ALPHANUMERIC: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

pub const DEFAULT_LENGTH: usize = 12;
pub const MAX_LENGTH: usize = 4096;

/// Generate a random string drawn uniformly from letters and digits,
/// plus punctuation when `include_symbols` is set.
///
/// Length is clamped to `1..=MAX_LENGTH`.
pub fn generate(length: usize, include_symbols: bool) -> String {
    generate_with(&mut rand::thread_rng(), length, include_symbols)
}

pub fn generate_with<R: Rng + ?Sized>(rng: &mut R, length: usize, include_symbols: bool) -> String {
    let mut pool: Vec<char> = ALPHANUMERIC.chars().collect();
    if include_symbols {
        pool.extend(SYMBOLS.chars());
    }

    let n = length.clamp(1, MAX_LENGTH);
    (0..n).map(|_| pool[rng.gen_range(0..pool.len())]).collect()
}
