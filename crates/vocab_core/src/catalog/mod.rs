//! Read-only word catalog.
//!
//! # Responsibility
//! - Index externally supplied word records and assign stable card ids.
//! - Serve level-filtered views in catalog order.
//!
//! # Invariants
//! - A card id is its zero-based position in the source list.
//! - The catalog is never mutated after load.

use crate::model::card::{CardId, Level, WordCard, WordRecord};
use log::{info, warn};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Catalog loading errors.
#[derive(Debug)]
pub enum CatalogError {
    /// The word list was never supplied or cannot be read.
    CatalogUnavailable(String),
    /// The word list was supplied but is not valid JSON word records.
    Parse(serde_json::Error),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CatalogUnavailable(details) => write!(f, "word catalog unavailable: {details}"),
            Self::Parse(err) => write!(f, "invalid word catalog: {err}"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CatalogUnavailable(_) => None,
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Indexed view over the supplied word records.
#[derive(Debug, Clone, Default)]
pub struct WordCatalog {
    cards: Vec<WordCard>,
}

impl WordCatalog {
    /// Assigns each record an id equal to its position.
    pub fn load(records: impl IntoIterator<Item = WordRecord>) -> Self {
        let cards = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| WordCard::from_record(index as CardId, record))
            .collect::<Vec<_>>();
        info!(
            "event=catalog_load module=catalog status=ok card_count={}",
            cards.len()
        );
        Self { cards }
    }

    /// Loads from an optional record source; `None` means it was never supplied.
    pub fn from_source(records: Option<Vec<WordRecord>>) -> CatalogResult<Self> {
        match records {
            Some(records) => Ok(Self::load(records)),
            None => {
                warn!("event=catalog_load module=catalog status=error error_code=catalog_unavailable");
                Err(CatalogError::CatalogUnavailable(
                    "no word records supplied".to_string(),
                ))
            }
        }
    }

    /// Parses a JSON array of word records.
    pub fn from_json_str(json: &str) -> CatalogResult<Self> {
        let records: Vec<WordRecord> = serde_json::from_str(json)?;
        Ok(Self::load(records))
    }

    /// Reads and parses a JSON word list file.
    ///
    /// A missing or unreadable file is reported as `CatalogUnavailable`.
    pub fn load_json_file(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|err| {
            warn!(
                "event=catalog_load module=catalog status=error error_code=catalog_unavailable path={} error={}",
                path.display(),
                err
            );
            CatalogError::CatalogUnavailable(format!("cannot read `{}`: {err}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    /// Returns the card for `id`, or `None` when out of range.
    pub fn get(&self, id: CardId) -> Option<&WordCard> {
        self.cards.get(id as usize)
    }

    pub fn contains(&self, id: CardId) -> bool {
        (id as usize) < self.cards.len()
    }

    /// Cards whose level is in `levels`, in catalog order.
    ///
    /// The iterator is `Clone`, so callers may restart it.
    pub fn by_levels<'a>(
        &'a self,
        levels: &'a BTreeSet<Level>,
    ) -> impl Iterator<Item = &'a WordCard> + Clone + 'a {
        self.cards
            .iter()
            .filter(move |card| levels.contains(&card.level))
    }

    pub fn iter(&self) -> impl Iterator<Item = &WordCard> {
        self.cards.iter()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
