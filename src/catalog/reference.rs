use anyhow::{Context, Result};

use crate::hash::Fingerprint;

/// One character art fingerprint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferenceEntry {
    /// Asset file name, e.g. `res001_no001_after_training.webp`
    pub asset_name: String,
    pub fingerprint: Fingerprint,
}

/// Ordered, read-only reference hash table.
#[derive(Clone, Debug, Default)]
pub struct ReferenceTable {
    entries: Vec<ReferenceEntry>,
}

impl ReferenceTable {
    pub fn new(entries: Vec<ReferenceEntry>) -> Self {
        Self { entries }
    }

    /// Parses the published table: a JSON array of `[asset_name, bits]` pairs.
    pub fn from_json(json: &str) -> Result<Self> {
        let pairs: Vec<(String, String)> =
            serde_json::from_str(json).context("Failed to parse reference hash table")?;

        let entries = pairs
            .into_iter()
            .map(|(asset_name, bits)| {
                let fingerprint = bits
                    .parse::<Fingerprint>()
                    .with_context(|| format!("Bad fingerprint for {}", asset_name))?;
                Ok(ReferenceEntry {
                    asset_name,
                    fingerprint,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { entries })
    }

    /// Serializes back to the published `[asset_name, bits]` form.
    pub fn to_json(&self) -> Result<String> {
        let pairs: Vec<(&str, String)> = self
            .entries
            .iter()
            .map(|e| (e.asset_name.as_str(), e.fingerprint.to_string()))
            .collect();
        serde_json::to_string(&pairs).context("Failed to serialize reference hash table")
    }

    pub fn entries(&self) -> &[ReferenceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
