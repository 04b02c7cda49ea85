use std::fmt::{self, Write as _};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Seed for reproducible network initialization and data generation.
///
/// This is a 128-bit (16-byte) seed for a [`Pcg32`] generator. Using the same
/// seed for [`Network::build`](crate::Network::build) and the training data
/// generator reproduces the same weights, the same examples, and therefore
/// the same training trajectory.
///
/// Seeds serialize as 32-character hex strings.
///
/// # Example
///
/// ```
/// use neuroarena_network::Seed;
/// use rand::Rng as _;
///
/// let seed: Seed = rand::rng().random();
/// let mut rng1 = seed.rng();
/// let mut rng2 = seed.rng();
/// assert_eq!(rng1.random::<u64>(), rng2.random::<u64>());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Seed([u8; 16]);

impl Seed {
    /// Builds a seed from a small integer, convenient for tests and CLI flags.
    #[must_use]
    pub fn from_u64(value: u64) -> Self {
        Self(u128::from(value).to_be_bytes())
    }

    /// Creates a fresh generator seeded with this value.
    #[must_use]
    pub fn rng(self) -> Pcg32 {
        Pcg32::from_seed(self.0)
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl std::str::FromStr for Seed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 32 {
            return Err(format!(
                "invalid hex: expected 32 characters, got {}",
                s.len()
            ));
        }
        let num = u128::from_str_radix(s, 16).map_err(|e| format!("invalid hex: {s} ({e})"))?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for Seed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut hex_str = String::with_capacity(2 * self.0.len());
        write!(&mut hex_str, "{self}").map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&hex_str)
    }
}

impl<'de> Deserialize<'de> for Seed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `Seed` values with `rng.random()`.
impl Distribution<Seed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Seed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        Seed(seed)
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng as _;

    use super::*;

    #[test]
    fn test_roundtrip_random_seed() {
        let seed: Seed = rand::rng().random();
        let serialized = serde_json::to_string(&seed).unwrap();
        let deserialized: Seed = serde_json::from_str(&serialized).unwrap();
        assert_eq!(seed, deserialized);
    }

    #[test]
    fn test_from_u64_is_big_endian() {
        let seed = Seed::from_u64(0x0123_4567_89ab_cdef);
        let serialized = serde_json::to_string(&seed).unwrap();
        assert_eq!(serialized, "\"00000000000000000123456789abcdef\"");
    }

    #[test]
    fn test_parse_accepts_uppercase() {
        let seed: Seed = "0123456789ABCDEFFEDCBA9876543210".parse().unwrap();
        assert_eq!(seed.to_string(), "0123456789abcdeffedcba9876543210");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        for s in [
            "",
            "0123456789abcdef0123456789abcde",
            "0123456789abcdef0123456789abcdef0",
            "ghijklmnopqrstuvwxyzghijklmnopqr",
        ] {
            let err = s.parse::<Seed>().unwrap_err();
            assert!(err.contains("invalid hex"), "{s:?}: {err}");
        }
    }

    #[test]
    fn test_same_seed_same_stream() {
        let seed = Seed::from_u64(7);
        let mut rng1 = seed.rng();
        let mut rng2 = seed.rng();
        for _ in 0..16 {
            assert_eq!(rng1.random::<u32>(), rng2.random::<u32>());
        }
    }
}
