//! Prompt input parsing.

use vocab_core::{DrillMode, Level};

/// One line typed at the drill prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Answer(String),
    Next,
    Skip,
    Save,
    Mode(DrillMode),
    Level(Level),
    Reset,
    Shuffle,
    History,
    Help,
    Quit,
}

/// Parses a prompt line; anything not starting with `:` is an answer.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix(':') else {
        return Ok(Command::Answer(line.trim_end_matches(['\n', '\r']).to_string()));
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default().to_ascii_lowercase();
    let argument = parts.next();

    match (name.as_str(), argument) {
        ("next" | "n", None) => Ok(Command::Next),
        ("skip" | "s", None) => Ok(Command::Skip),
        ("save", None) => Ok(Command::Save),
        ("mode", Some("all")) => Ok(Command::Mode(DrillMode::All)),
        ("mode", Some("saved")) => Ok(Command::Mode(DrillMode::Saved)),
        ("mode", _) => Err("usage: :mode all|saved".to_string()),
        ("level", Some(level)) => level
            .parse()
            .map(Command::Level)
            .map_err(|err| err.to_string()),
        ("level", None) => Err("usage: :level A1|A2|B1|B2|C1|C2".to_string()),
        ("reset", None) => Ok(Command::Reset),
        ("shuffle", None) => Ok(Command::Shuffle),
        ("history", None) => Ok(Command::History),
        ("help" | "h", None) => Ok(Command::Help),
        ("quit" | "q", None) => Ok(Command::Quit),
        (other, _) => Err(format!("unknown command `:{other}`; try :help")),
    }
}
