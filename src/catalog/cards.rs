use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const BIRTHDAY_RARITY: &str = "rarity_birthday";

/// Card metadata from the master card list. Unknown fields are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardInfo {
    pub id: u32,
    pub assetbundle_name: String,
    pub card_rarity_type: String,
}

impl CardInfo {
    /// Star count: `rarity_1`..`rarity_4` map to 1..4, birthday cards count as 4.
    pub fn rarity(&self) -> Option<usize> {
        match self.card_rarity_type.as_str() {
            "rarity_1" => Some(1),
            "rarity_2" => Some(2),
            "rarity_3" => Some(3),
            "rarity_4" | BIRTHDAY_RARITY => Some(4),
            _ => None,
        }
    }

    pub fn is_birthday(&self) -> bool {
        self.card_rarity_type == BIRTHDAY_RARITY
    }

    /// Cards of 3 stars and up have a trained form, birthday cards excepted.
    pub fn is_trainable(&self) -> bool {
        !self.is_birthday() && self.rarity().is_some_and(|r| r >= 3)
    }
}

/// The master card list.
#[derive(Clone, Debug, Default)]
pub struct CardCatalog {
    cards: Vec<CardInfo>,
}

impl CardCatalog {
    pub fn new(cards: Vec<CardInfo>) -> Self {
        Self { cards }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let cards: Vec<CardInfo> =
            serde_json::from_str(json).context("Failed to parse card list")?;
        Ok(Self { cards })
    }

    /// First card whose asset bundle name occurs in the reference asset name.
    pub fn find_by_asset(&self, asset_name: &str) -> Option<&CardInfo> {
        if asset_name.is_empty() {
            return None;
        }
        self.cards
            .iter()
            .find(|card| asset_name.contains(card.assetbundle_name.as_str()))
    }

    pub fn get(&self, id: u32) -> Option<&CardInfo> {
        self.cards.iter().find(|card| card.id == id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
