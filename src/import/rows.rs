//! Editable import rows.
//!
//! A row is created for every cell whose fingerprint matched something.
//! Identity comes from the match candidates and the card list; level and
//! master rank come from badge OCR when available. The remaining fields are
//! derived from the card's rarity and can be corrected by the user afterwards.

use anyhow::{anyhow, Result};
use image::RgbaImage;

use crate::catalog::CardCatalog;
use crate::hash::{Candidate, Fingerprint, MatchResult};
use crate::ocr::extract::{DEFAULT_LEVEL, DEFAULT_MASTER_RANK, MAX_MASTER_RANK};
use crate::ocr::BadgeParser;

/// Level cap per rarity (index = star count).
pub const MAX_LEVELS: [u32; 5] = [0, 20, 30, 50, 60];
/// Level at which a card counts as trained, per rarity. 1 and 2 star cards never train.
pub const TRAINING_LEVELS: [u32; 5] = [0, 999, 999, 40, 50];

pub const MAX_LEVEL: u8 = 60;
pub const MAX_SKILL_LEVEL: u8 = 4;
const DEFAULT_SKILL_LEVEL: u8 = 1;

const AFTER_TRAINING: &str = "after_training";

/// A matched cell waiting to become a row.
#[derive(Clone, Debug)]
pub struct CellMatch {
    /// 1-based cell number in scan order
    pub id: usize,
    pub crop: RgbaImage,
    pub fingerprint: Fingerprint,
    pub result: MatchResult,
}

/// Raw OCR text for a cell's badges; `None` when OCR was off or failed.
#[derive(Clone, Debug, Default)]
pub struct BadgeText {
    pub level: Option<String>,
    pub master_rank: Option<String>,
}

/// One editable row.
#[derive(Clone, Debug)]
pub struct ImportRow {
    id: usize,
    crop: RgbaImage,
    fingerprint: Fingerprint,
    candidates: Vec<Candidate>,
    card_ids: Vec<Option<u32>>,
    selected_candidate_index: Option<usize>,
    level: u8,
    master_rank: u8,
    skill_level: u8,
    trained: bool,
    story1_unlock: bool,
    story2_unlock: bool,
}

impl ImportRow {
    pub fn id(&self) -> usize {
        self.id
    }

    /// The full cell crop
    pub fn crop(&self) -> &RgbaImage {
        &self.crop
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Card id per candidate; `None` where the asset is not in the card list.
    pub fn card_ids(&self) -> &[Option<u32>] {
        &self.card_ids
    }

    pub fn selected_candidate_index(&self) -> Option<usize> {
        self.selected_candidate_index
    }

    /// Card id of the selected candidate, if it resolved to a card.
    pub fn selected_card_id(&self) -> Option<u32> {
        self.selected_candidate_index
            .and_then(|i| self.card_ids.get(i).copied().flatten())
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn master_rank(&self) -> u8 {
        self.master_rank
    }

    pub fn skill_level(&self) -> u8 {
        self.skill_level
    }

    pub fn trained(&self) -> bool {
        self.trained
    }

    pub fn story1_unlock(&self) -> bool {
        self.story1_unlock
    }

    pub fn story2_unlock(&self) -> bool {
        self.story2_unlock
    }

    /// Picks another match candidate for this row.
    pub fn select_candidate(&mut self, index: usize) -> Result<()> {
        if index >= self.candidates.len() {
            return Err(anyhow!(
                "Row {}: candidate {} out of range ({} candidates)",
                self.id,
                index,
                self.candidates.len()
            ));
        }
        self.selected_candidate_index = Some(index);
        Ok(())
    }

    pub fn set_level(&mut self, level: u8) {
        self.level = level.min(MAX_LEVEL);
    }

    pub fn set_master_rank(&mut self, master_rank: u8) {
        self.master_rank = master_rank.min(MAX_MASTER_RANK);
    }

    pub fn set_skill_level(&mut self, skill_level: u8) {
        self.skill_level = skill_level.min(MAX_SKILL_LEVEL);
    }

    pub fn set_trained(&mut self, trained: bool) {
        self.trained = trained;
    }

    pub fn set_story1_unlock(&mut self, unlocked: bool) {
        self.story1_unlock = unlocked;
    }

    pub fn set_story2_unlock(&mut self, unlocked: bool) {
        self.story2_unlock = unlocked;
    }
}

/// Builds rows from match results, badge text and card metadata.
pub struct RowAssembler {
    parser: BadgeParser,
}

impl RowAssembler {
    pub fn new() -> Result<Self> {
        Ok(Self {
            parser: BadgeParser::new()?,
        })
    }

    /// Returns `None` for unmatched cells.
    pub fn assemble(
        &self,
        cell: CellMatch,
        badges: &BadgeText,
        catalog: &CardCatalog,
    ) -> Option<ImportRow> {
        let candidates = match cell.result {
            MatchResult::Unmatched => return None,
            MatchResult::Confident(best) => vec![best],
            MatchResult::Ambiguous(all) => all,
        };
        let top = candidates.first()?;

        let card_ids: Vec<Option<u32>> = candidates
            .iter()
            .map(|c| catalog.find_by_asset(&c.asset_name).map(|card| card.id))
            .collect();
        let selected_candidate_index = card_ids.iter().position(Option::is_some);

        let level = badges
            .level
            .as_deref()
            .map_or(DEFAULT_LEVEL, |text| self.parser.parse_level(text));
        let master_rank = badges
            .master_rank
            .as_deref()
            .map_or(DEFAULT_MASTER_RANK, |text| self.parser.parse_master_rank(text));

        // Rarity thresholds only apply when the top candidate is a known card
        let rarity = card_ids[0]
            .and_then(|id| catalog.get(id))
            .and_then(|card| card.rarity());
        let reaches = |table: &[u32; 5]| rarity.is_some_and(|r| u32::from(level) >= table[r]);

        let story1_unlock = card_ids[0].is_some();
        let trained = top.asset_name.contains(AFTER_TRAINING) || reaches(&TRAINING_LEVELS);
        let story2_unlock = story1_unlock && reaches(&MAX_LEVELS);

        Some(ImportRow {
            id: cell.id,
            crop: cell.crop,
            fingerprint: cell.fingerprint,
            candidates,
            card_ids,
            selected_candidate_index,
            level,
            master_rank,
            skill_level: DEFAULT_SKILL_LEVEL,
            trained,
            story1_unlock,
            story2_unlock,
        })
    }
}

/// The rows of one import, in scan order.
#[derive(Clone, Debug, Default)]
pub struct RowSet {
    rows: Vec<ImportRow>,
}

impl RowSet {
    pub fn new(rows: Vec<ImportRow>) -> Self {
        Self { rows }
    }

    pub fn get(&self, id: usize) -> Option<&ImportRow> {
        self.rows.iter().find(|row| row.id == id)
    }

    pub fn get_mut(&mut self, id: usize) -> Option<&mut ImportRow> {
        self.rows.iter_mut().find(|row| row.id == id)
    }

    /// Drops a row the user rejected.
    pub fn remove(&mut self, id: usize) -> Option<ImportRow> {
        let index = self.rows.iter().position(|row| row.id == id)?;
        Some(self.rows.remove(index))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ImportRow> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<'a> IntoIterator for &'a RowSet {
    type Item = &'a ImportRow;
    type IntoIter = std::slice::Iter<'a, ImportRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::catalog::CardInfo;

    pub(crate) fn catalog() -> CardCatalog {
        CardCatalog::new(vec![
            CardInfo {
                id: 101,
                assetbundle_name: "res001_no003".to_string(),
                card_rarity_type: "rarity_3".to_string(),
            },
            CardInfo {
                id: 102,
                assetbundle_name: "res001_no004".to_string(),
                card_rarity_type: "rarity_2".to_string(),
            },
            CardInfo {
                id: 103,
                assetbundle_name: "res002_no009".to_string(),
                card_rarity_type: "rarity_birthday".to_string(),
            },
        ])
    }

    fn candidate(asset: &str, distance: u32) -> Candidate {
        Candidate {
            asset_name: asset.to_string(),
            distance,
        }
    }

    pub(crate) fn cell(id: usize, result: MatchResult) -> CellMatch {
        CellMatch {
            id,
            crop: RgbaImage::new(4, 4),
            fingerprint: Fingerprint::from_bits(0),
            result,
        }
    }

    fn confident(asset: &str) -> MatchResult {
        MatchResult::Confident(candidate(asset, 3))
    }

    fn badges(level: &str, rank: &str) -> BadgeText {
        BadgeText {
            level: Some(level.to_string()),
            master_rank: Some(rank.to_string()),
        }
    }

    fn assemble(result: MatchResult, text: &BadgeText) -> Option<ImportRow> {
        RowAssembler::new()
            .unwrap()
            .assemble(cell(1, result), text, &catalog())
    }

    #[test]
    fn test_rarity_three_trains_at_level_forty() {
        let row = assemble(confident("res001_no003_normal.webp"), &badges("Lv.40", "2")).unwrap();
        assert!(row.trained());
        assert_eq!(row.level(), 40);
        assert_eq!(row.master_rank(), 2);
        assert!(!row.story2_unlock());

        let row = assemble(confident("res001_no003_normal.webp"), &badges("Lv.39", "2")).unwrap();
        assert!(!row.trained());
    }

    #[test]
    fn test_story2_unlocks_at_max_level() {
        let row = assemble(confident("res001_no003_normal.webp"), &badges("Lv.50", "0")).unwrap();
        assert!(row.story1_unlock());
        assert!(row.story2_unlock());
    }

    #[test]
    fn test_after_training_asset_is_trained_regardless_of_level() {
        let row = assemble(
            confident("res001_no003_after_training.webp"),
            &BadgeText::default(),
        )
        .unwrap();
        assert!(row.trained());
        assert_eq!(row.level(), DEFAULT_LEVEL);
        assert_eq!(row.master_rank(), DEFAULT_MASTER_RANK);
        assert_eq!(row.skill_level(), 1);
    }

    #[test]
    fn test_low_rarity_never_trains_by_level() {
        let row = assemble(confident("res001_no004_normal.webp"), &badges("Lv.30", "")).unwrap();
        assert!(!row.trained());
        assert!(row.story2_unlock());
    }

    #[test]
    fn test_unknown_card_skips_rarity_rules() {
        let row = assemble(confident("res099_no001_normal.webp"), &badges("Lv.60", "5")).unwrap();
        assert_eq!(row.card_ids(), &[None]);
        assert_eq!(row.selected_candidate_index(), None);
        assert_eq!(row.selected_card_id(), None);
        assert!(!row.story1_unlock());
        assert!(!row.story2_unlock());
        assert!(!row.trained());
    }

    #[test]
    fn test_ambiguous_selects_first_known_card() {
        let result = MatchResult::Ambiguous(vec![
            candidate("res099_no001_normal.webp", 14),
            candidate("res002_no009_normal.webp", 17),
            candidate("res001_no003_normal.webp", 20),
        ]);
        let row = assemble(result, &BadgeText::default()).unwrap();

        assert_eq!(row.card_ids(), &[None, Some(103), Some(101)]);
        assert_eq!(row.selected_candidate_index(), Some(1));
        assert_eq!(row.selected_card_id(), Some(103));
        // The top candidate is unknown
        assert!(!row.story1_unlock());
    }

    #[test]
    fn test_unmatched_cell_has_no_row() {
        assert!(assemble(MatchResult::Unmatched, &BadgeText::default()).is_none());
    }

    #[test]
    fn test_setters_clamp() {
        let mut row =
            assemble(confident("res001_no003_normal.webp"), &BadgeText::default()).unwrap();

        row.set_level(99);
        row.set_master_rank(9);
        row.set_skill_level(7);
        assert_eq!((row.level(), row.master_rank(), row.skill_level()), (60, 5, 4));

        row.set_level(0);
        assert_eq!(row.level(), 0);

        row.set_trained(true);
        row.set_story1_unlock(false);
        row.set_story2_unlock(true);
        assert!(row.trained() && !row.story1_unlock() && row.story2_unlock());
    }

    #[test]
    fn test_select_candidate_bounds() {
        let result = MatchResult::Ambiguous(vec![
            candidate("res001_no003_normal.webp", 12),
            candidate("res001_no004_normal.webp", 13),
        ]);
        let mut row = assemble(result, &BadgeText::default()).unwrap();

        row.select_candidate(1).unwrap();
        assert_eq!(row.selected_card_id(), Some(102));
        assert!(row.select_candidate(2).is_err());
        assert_eq!(row.selected_candidate_index(), Some(1));
    }

    #[test]
    fn test_row_set_remove() {
        let assembler = RowAssembler::new().unwrap();
        let catalog = catalog();
        let rows: Vec<ImportRow> = [1, 2, 5]
            .into_iter()
            .filter_map(|id| {
                assembler.assemble(
                    cell(id, confident("res001_no003_normal.webp")),
                    &BadgeText::default(),
                    &catalog,
                )
            })
            .collect();
        let mut set = RowSet::new(rows);

        assert_eq!(set.remove(2).map(|r| r.id()), Some(2));
        assert!(set.remove(2).is_none());
        assert_eq!(set.iter().map(ImportRow::id).collect::<Vec<_>>(), vec![1, 5]);

        set.get_mut(5).unwrap().set_level(45);
        assert_eq!(set.get(5).unwrap().level(), 45);
    }
}
