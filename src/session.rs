use crate::charset::CharacterClass;
use crate::form::Action;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Form(Action),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Empty command, type ? for help")]
    Empty,
    #[error("Unknown command \"{0}\", type ? for help")]
    Unknown(String),
    #[error("Missing length after \"n\"")]
    MissingLength,
}

pub const HELP: &str = "\
  l          toggle lowercase
  u          toggle uppercase
  d          toggle numbers
  s          toggle symbols
  n <len>    set password length (a bare number works too)
  g          generate
  r          reset
  q          quit";

/// Parses one line typed at the interactive prompt.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let mut parts = line.splitn(2, char::is_whitespace);
    let head = parts.next().unwrap_or_default();
    let rest = parts.next().map(str::trim).unwrap_or_default();

    let command = match head.to_lowercase().as_str() {
        "" => return Err(CommandError::Empty),
        "l" | "lower" | "lowercase" => toggle(CharacterClass::Lowercase),
        "u" | "upper" | "uppercase" => toggle(CharacterClass::Uppercase),
        "d" | "digits" | "numbers" => toggle(CharacterClass::Digit),
        "s" | "symbols" => toggle(CharacterClass::Symbol),
        "n" | "len" | "length" => {
            if rest.is_empty() {
                return Err(CommandError::MissingLength);
            }
            Command::Form(Action::SetLength(rest.to_string()))
        }
        "g" | "gen" | "generate" => Command::Form(Action::Submit),
        "r" | "reset" => Command::Form(Action::Reset),
        "q" | "quit" | "exit" => Command::Quit,
        "?" | "h" | "help" => Command::Help,
        _ if rest.is_empty() && head.chars().any(|c| c.is_numeric()) => {
            // bare length, validated later by the form
            Command::Form(Action::SetLength(head.to_string()))
        }
        _ => return Err(CommandError::Unknown(line.to_string())),
    };

    Ok(command)
}

fn toggle(class: CharacterClass) -> Command {
    Command::Form(Action::ToggleClass(class))
}
