//! Import pipeline and its outputs.

pub mod export;
pub mod pipeline;
pub mod rows;

pub use export::{merge_card_states, to_card_states, write_csv, write_json, CardState};
pub use pipeline::{import_file, CellOutcome, ImportOutcome, Importer};
pub use rows::{ImportRow, RowAssembler, RowSet};
