//! Run identifier generation.
//!
//! Run ids are short opaque strings: 21 characters sampled uniformly from
//! a 64-symbol URL-safe alphabet. With 64^21 possible ids, collisions are
//! astronomically unlikely and deliberately not checked.

use rand::Rng;

/// The URL-safe alphabet run ids are sampled from.
pub const RUN_ID_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Fixed length of every run id.
pub const RUN_ID_LEN: usize = 21;

/// Generate a fresh run id.
///
/// # Examples
///
/// ```rust
/// use dagflow::utils::run_id::{generate_run_id, RUN_ID_LEN};
///
/// let id = generate_run_id();
/// assert_eq!(id.len(), RUN_ID_LEN);
/// ```
#[must_use]
pub fn generate_run_id() -> String {
    let mut rng = rand::thread_rng();
    (0..RUN_ID_LEN)
        .map(|_| RUN_ID_ALPHABET[rng.gen_range(0..RUN_ID_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_and_alphabet() {
        for _ in 0..100 {
            let id = generate_run_id();
            assert_eq!(id.len(), RUN_ID_LEN);
            assert!(id.bytes().all(|b| RUN_ID_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn ids_are_not_repeating() {
        let a = generate_run_id();
        let b = generate_run_id();
        assert_ne!(a, b);
    }

    #[test]
    fn alphabet_has_sixty_four_distinct_symbols() {
        let mut symbols: Vec<u8> = RUN_ID_ALPHABET.to_vec();
        symbols.sort_unstable();
        symbols.dedup();
        assert_eq!(symbols.len(), 64);
    }
}
