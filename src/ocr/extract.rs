use anyhow::Result;
use regex::Regex;

/// Level badge text, e.g. `Lv.48`. The separator is whatever OCR made of the dot.
const LEVEL_PATTERN: &str = r"Lv.(\d{1,2})";

/// Level used when the badge is unreadable.
pub const DEFAULT_LEVEL: u8 = 1;
/// Master rank used when the badge is unreadable.
pub const DEFAULT_MASTER_RANK: u8 = 0;
pub const MAX_MASTER_RANK: u8 = 5;

/// Turns raw badge OCR text into field values.
pub struct BadgeParser {
    level: Regex,
}

impl BadgeParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            level: Regex::new(LEVEL_PATTERN)?,
        })
    }

    /// First `Lv.<digits>` in the text. Missing or zero gives the default level.
    pub fn parse_level(&self, text: &str) -> u8 {
        self.level
            .captures(text)
            .and_then(|caps| caps[1].parse::<u8>().ok())
            .filter(|&level| level != 0)
            .unwrap_or(DEFAULT_LEVEL)
    }

    /// All digits in the text read as one number, capped at the highest rank.
    pub fn parse_master_rank(&self, text: &str) -> u8 {
        let digits: String = text.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return DEFAULT_MASTER_RANK;
        }
        match digits.parse::<u64>() {
            Ok(rank) => rank.min(u64::from(MAX_MASTER_RANK)) as u8,
            // Only overflow can fail here
            Err(_) => MAX_MASTER_RANK,
        }
    }
}
