//! Console command bindings
//!
//! Commands start with `:`; an empty line moves to the next field and any
//! other line is the answer for the focused field.

use std::collections::HashMap;

/// Prefix marking a line as a command
pub const COMMAND_PREFIX: char = ':';

/// Action identifier for command bindings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandAction {
    // Field navigation
    NextField,
    PrevField,
    WhereAmI,

    // Selection navigation
    OptionUp,
    OptionDown,

    // Voice toolbar
    SpeakAll,
    Stop,
    Repeat,
    ToggleAutoSpeak,

    // Form actions
    ToggleConsent,
    Submit,
    Reset,
    Retry,
    Show,
    Help,
    Quit,
}

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Action(CommandAction),
    /// Jump to a field by its 1-based number
    Goto(usize),
    /// Answer for the focused field
    Value(String),
    Unknown(String),
}

/// Create the default command map
pub fn create_default_commands() -> HashMap<&'static str, CommandAction> {
    let mut map = HashMap::new();

    map.insert("next", CommandAction::NextField);
    map.insert("n", CommandAction::NextField);
    map.insert("prev", CommandAction::PrevField);
    map.insert("p", CommandAction::PrevField);
    map.insert("where", CommandAction::WhereAmI);

    map.insert("up", CommandAction::OptionUp);
    map.insert("down", CommandAction::OptionDown);

    map.insert("all", CommandAction::SpeakAll);
    map.insert("stop", CommandAction::Stop);
    map.insert("repeat", CommandAction::Repeat);
    map.insert("r", CommandAction::Repeat);
    map.insert("auto", CommandAction::ToggleAutoSpeak);

    map.insert("consent", CommandAction::ToggleConsent);
    map.insert("submit", CommandAction::Submit);
    map.insert("reset", CommandAction::Reset);
    map.insert("retry", CommandAction::Retry);
    map.insert("show", CommandAction::Show);
    map.insert("help", CommandAction::Help);
    map.insert("quit", CommandAction::Quit);
    map.insert("q", CommandAction::Quit);

    map
}

/// Parse one line of console input
pub fn parse_line(line: &str, commands: &HashMap<&'static str, CommandAction>) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Action(CommandAction::NextField);
    }

    let Some(rest) = trimmed.strip_prefix(COMMAND_PREFIX) else {
        return Command::Value(line.trim_end_matches(['\r', '\n']).to_string());
    };

    let mut words = rest.split_whitespace();
    let word = words.next().unwrap_or("").to_lowercase();

    if let Ok(n) = word.parse::<usize>() {
        return Command::Goto(n);
    }
    if word == "goto" || word == "g" {
        if let Some(n) = words.next().and_then(|w| w.parse::<usize>().ok()) {
            return Command::Goto(n);
        }
    }

    match commands.get(word.as_str()) {
        Some(action) => Command::Action(*action),
        None => Command::Unknown(rest.to_string()),
    }
}

pub const HELP: &str = "\
Enter an answer for the focused field, or a command:
  (empty line), :next   next field        :prev        previous field
  :goto N, :N           jump to field N   :where       name the focused field
  :up, :down            move through the options of a selection
  :all                  read the whole form
  :stop                 stop speech       :repeat      repeat the current field
  :auto                 toggle automatic speech on focus
  :consent              toggle consent to personal data processing
  :submit               send the answers  :reset       clear all fields
  :show                 print the form    :retry       reload after an error
  :help                 this help         :quit        exit
Checkboxes take yes or no. Selections take an option number or its text.";
