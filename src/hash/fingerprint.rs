use anyhow::{anyhow, Result};
use image::RgbaImage;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::dct::CosineTable;
use crate::vision::preprocess::{grayscale, scale_nearest};

/// Number of bits in a fingerprint.
pub const FINGERPRINT_BITS: u32 = 64;

/// Side of the grid the character art is reduced to before the DCT.
pub const HASH_INPUT_SIZE: u32 = 32;

/// Frequencies 1..=8 along both axes; the DC row and column are skipped.
const BLOCK: usize = 8;

/// 64-bit perceptual fingerprint.
///
/// Bit 63 is the first selected coefficient, so the text form reads in
/// selection order: 64 characters of `0`/`1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    pub fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub fn bits(&self) -> u64 {
        self.0
    }

    /// Hamming distance: number of differing bit positions.
    pub fn distance(&self, other: &Fingerprint) -> u32 {
        (self.0 ^ other.0).count_ones()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:064b}", self.0)
    }
}

impl FromStr for Fingerprint {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.len() != FINGERPRINT_BITS as usize {
            return Err(anyhow!(
                "Fingerprint must have {} bits, got {}",
                FINGERPRINT_BITS,
                s.len()
            ));
        }
        if !s.chars().all(|c| c == '0' || c == '1') {
            return Err(anyhow!("Fingerprint contains non-binary digits: {}", s));
        }
        u64::from_str_radix(s, 2)
            .map(Fingerprint)
            .map_err(|e| anyhow!("Failed to parse fingerprint '{}': {}", s, e))
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// DCT perceptual hasher.
///
/// Owns its cosine table, so one hasher is built per import run and reused
/// for every cell.
#[derive(Clone, Debug)]
pub struct PerceptualHasher {
    cosines: CosineTable,
}

impl Default for PerceptualHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PerceptualHasher {
    pub fn new() -> Self {
        Self {
            cosines: CosineTable::new(HASH_INPUT_SIZE as usize),
        }
    }

    /// Fingerprints a character art crop.
    ///
    /// The crop is scaled to 32x32 (nearest neighbour) and reduced to luma.
    /// The 8x8 block of coefficients at frequencies 1..=8 is thresholded
    /// against its median: above the median is 1.
    pub fn hash(&self, art: &RgbaImage) -> Fingerprint {
        if art.width() == 0 || art.height() == 0 {
            return Fingerprint(0);
        }

        let n = HASH_INPUT_SIZE as usize;
        let small = scale_nearest(art, HASH_INPUT_SIZE, HASH_INPUT_SIZE);
        let gray = grayscale(&small);

        // Row-major luma grid, centred on its mean. Only the (unused) DC
        // coefficient depends on the mean, and centring keeps the remaining
        // coefficients bit-identical under uniform brightness shifts.
        let luma: Vec<f64> = gray.pixels().map(|p| p[0] as f64).collect();
        let mean = luma.iter().sum::<f64>() / luma.len() as f64;
        let centred: Vec<f64> = luma.iter().map(|v| v - mean).collect();

        let dct = self.cosines.dct2(&centred);

        let mut selected = Vec::with_capacity(BLOCK * BLOCK);
        for u in 1..=BLOCK {
            for v in 1..=BLOCK {
                selected.push(dct[n * u + v]);
            }
        }

        let mut sorted = selected.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let median = sorted[sorted.len() / 2];

        let bits = selected
            .iter()
            .fold(0u64, |acc, &c| (acc << 1) | u64::from(c > median));
        Fingerprint(bits)
    }
}
