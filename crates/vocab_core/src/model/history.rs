//! Answer history records.

use crate::model::card::WordCard;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Maximum number of answer records kept, newest first.
pub const HISTORY_LIMIT: usize = 50;

/// One judged answer, kept for the learner's review list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub word: String,
    pub translation: String,
    pub correct: bool,
    /// Unix epoch milliseconds.
    pub answered_at_ms: i64,
}

impl AnswerRecord {
    pub fn for_card(card: &WordCard, correct: bool) -> Self {
        Self {
            word: card.word.clone(),
            translation: card.translation.clone(),
            correct,
            answered_at_ms: now_epoch_ms(),
        }
    }
}

/// Prepends `record` and drops the oldest entries beyond `HISTORY_LIMIT`.
pub fn push_record(history: &mut Vec<AnswerRecord>, record: AnswerRecord) {
    history.insert(0, record);
    history.truncate(HISTORY_LIMIT);
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as i64)
}
