//! Temporary access codes for password recovery.

use rand::Rng;

/// Characters codes are drawn from; `0`, `O`, `1` and `I` are left out.
pub const CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Generates a random code of `length` characters from [`CHARSET`].
pub fn generate(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_use_restricted_charset() {
        for _ in 0..50 {
            let code = generate(6);
            assert_eq!(code.len(), 6);
            assert!(code.bytes().all(|b| CHARSET.contains(&b)));
        }
    }
}
