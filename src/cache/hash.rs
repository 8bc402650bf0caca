//! Key Hashing Module
//!
//! An identity hasher for integer keys, so that set routing is simply
//! `key mod number_of_sets`.

use std::hash::{BuildHasherDefault, Hasher};

/// `BuildHasher` producing [`IdentityHasher`]s.
pub type BuildIdentityHasher = BuildHasherDefault<IdentityHasher>;

// == Identity Hasher ==
/// Hashes an integer key to its own value.
///
/// Signed integers are sign-extended to 64 bits. Anything written as raw bytes
/// (strings, slices), and every integer after the first, is folded in with
/// FNV-1a so that composite keys still spread across sets.
#[derive(Debug, Clone, Copy)]
pub struct IdentityHasher {
    state: u64,
    /// True until the first write; raw bytes then start from the FNV offset
    fresh: bool,
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

impl Default for IdentityHasher {
    fn default() -> Self {
        Self {
            state: 0,
            fresh: true,
        }
    }
}

impl IdentityHasher {
    #[inline]
    fn set(&mut self, value: u64) {
        self.state = value;
        self.fresh = false;
    }

    // Only the first integer written is taken verbatim; later ones are mixed in
    #[inline]
    fn integer(&mut self, value: u64) {
        if self.fresh {
            self.set(value);
        } else {
            self.write(&value.to_le_bytes());
        }
    }
}

impl Hasher for IdentityHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        if self.fresh {
            self.set(FNV_OFFSET);
        }
        for byte in bytes {
            self.state ^= u64::from(*byte);
            self.state = self.state.wrapping_mul(FNV_PRIME);
        }
    }

    fn write_u8(&mut self, i: u8) {
        self.integer(u64::from(i));
    }

    fn write_u16(&mut self, i: u16) {
        self.integer(u64::from(i));
    }

    fn write_u32(&mut self, i: u32) {
        self.integer(u64::from(i));
    }

    fn write_u64(&mut self, i: u64) {
        self.integer(i);
    }

    fn write_usize(&mut self, i: usize) {
        self.integer(i as u64);
    }

    fn write_i8(&mut self, i: i8) {
        self.integer(i as i64 as u64);
    }

    fn write_i16(&mut self, i: i16) {
        self.integer(i as i64 as u64);
    }

    fn write_i32(&mut self, i: i32) {
        self.integer(i as i64 as u64);
    }

    fn write_i64(&mut self, i: i64) {
        self.integer(i as u64);
    }

    fn write_isize(&mut self, i: isize) {
        self.integer(i as i64 as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::hash::BuildHasher;

    #[test]
    fn test_integers_hash_to_themselves() {
        let build = BuildIdentityHasher::default();

        assert_eq!(build.hash_one(5u32), 5);
        assert_eq!(build.hash_one(17usize), 17);
        assert_eq!(build.hash_one(42i32), 42);
        assert_eq!(build.hash_one(u64::MAX), u64::MAX);
    }

    #[test]
    fn test_negative_integers_are_sign_extended() {
        let build = BuildIdentityHasher::default();
        assert_eq!(build.hash_one(-1i32), u64::MAX);
    }

    #[test]
    fn test_composite_keys_mix_later_fields() {
        let build = BuildIdentityHasher::default();
        assert_ne!(build.hash_one((1u32, 2u32)), build.hash_one((1u32, 3u32)));
    }

    #[test]
    fn test_strings_are_stable_and_spread() {
        let build = BuildIdentityHasher::default();

        assert_eq!(build.hash_one("alpha"), build.hash_one("alpha"));
        assert_ne!(build.hash_one("alpha"), build.hash_one("beta"));
    }
}
