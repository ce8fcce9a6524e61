//! Plain-text rendering of drill state.

use vocab_core::{AnswerOutcome, AnswerRecord, DrillView, EmptyReason, WordCard};

/// Writes drill state to stdout.
pub struct TerminalView;

impl DrillView for TerminalView {
    fn show_card(&mut self, card: &WordCard, _saved: bool) {
        println!();
        println!("[{}] ({}) {}", card.level, card.part_of_speech, card.translation);
    }

    fn show_empty(&mut self, reason: EmptyReason) {
        let message = match reason {
            EmptyReason::NoMatchingCards => {
                "Nothing left to drill for these levels. Try :reset or another :level."
            }
            EmptyReason::NoSavedCards => "No saved cards yet. Use :mode all and :save a few.",
            EmptyReason::CatalogUnavailable => "Word list not found.",
        };
        println!();
        println!("{message}");
    }

    fn show_saved(&mut self, saved: bool) {
        if saved {
            println!("  * saved");
        }
    }

    fn show_feedback(&mut self, outcome: &AnswerOutcome, card: &WordCard) {
        let verdict = if outcome.correct { "Correct" } else { "Incorrect" };
        println!("  {verdict}: {}", outcome.expected);
        if !card.example_source.is_empty() {
            println!("  {}", card.example_source);
        }
        if !card.example_translation.is_empty() {
            println!("  {}", card.example_translation);
        }
        println!("  (press Enter for the next card)");
    }

    fn show_progress(&mut self, position: usize, total: usize) {
        println!("-- {position} / {total}");
    }
}

pub fn print_history(history: &[AnswerRecord]) {
    if history.is_empty() {
        println!("No answers yet.");
        return;
    }
    for entry in history {
        let mark = if entry.correct { "ok" } else { "miss" };
        println!("{:>4}  {} ({})", mark, entry.word, entry.translation);
    }
}

pub fn print_help() {
    println!("Type the word for the prompt and press Enter.");
    println!("  :next     next card after feedback (or just Enter)");
    println!("  :skip     move this card later without answering");
    println!("  :save     save or unsave this card");
    println!("  :mode all|saved");
    println!("  :level A1..C2   toggle a level");
    println!("  :shuffle  rebuild the deck");
    println!("  :reset    forget mastered cards");
    println!("  :history  recent answers");
    println!("  :quit");
}
