use rand::Rng;

/// Characters random names are drawn from (64 entries).
pub const RANDOM_STRING_ALPHABET: &[u8; 64] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_+";

/// Generate a random string of `length` characters.
///
/// Each character is picked independently and uniformly from
/// [`RANDOM_STRING_ALPHABET`] using the thread-local CSPRNG, which is seeded
/// from the operating system. Output is not reproducible.
pub fn random_string(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| RANDOM_STRING_ALPHABET[rng.random_range(0..RANDOM_STRING_ALPHABET.len())] as char)
        .collect()
}
