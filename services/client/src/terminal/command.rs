//! services/client/src/terminal/command.rs
//!
//! The line commands understood by the terminal front-end.

use std::path::PathBuf;

/// A single line typed by the user, parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    /// Open the n-th document of the listing (1-based).
    Open(usize),
    Upload(PathBuf),
    Ask(String),
    /// Click the n-th page marker of the last assistant reply (1-based).
    Cite(usize),
    Next,
    Prev,
    /// Click a thumbnail.
    Page(u32),
    ZoomIn,
    ZoomOut,
    Retry,
    Show,
    Close,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("`{0}` is not a positive number")]
    InvalidNumber(String),
    #[error("usage: zoom in|out")]
    InvalidZoom,
}

pub const HELP: &str = "\
Commands:
  list             show the uploaded documents
  open <n>         open the n-th document
  upload <path>    upload a PDF and open it
  ask <text>       ask about the open document (bare text works too)
  cite <n>         jump to the n-th page marker of the last reply
  next | prev      turn the page
  page <n>         jump to page n
  zoom in|out      change the zoom level
  retry            reload a document that failed to load
  show             redraw the current document
  close            close the current document
  help             show this text
  quit             leave";

fn positive<T: std::str::FromStr + PartialEq + Default>(arg: &str) -> Result<T, ParseError> {
    match arg.parse::<T>() {
        Ok(n) if n != T::default() => Ok(n),
        _ => Err(ParseError::InvalidNumber(arg.to_string())),
    }
}

/// Parses one input line. Blank lines yield `None`.
///
/// A command word only counts as a command when the rest of the line has the
/// shape that command takes. Anything else, such as "list the key findings" or
/// "page 3 says what?", is a question.
pub fn parse(line: &str) -> Result<Option<Command>, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let question = || Command::Ask(line.to_string());
    // A single token that fails to parse is a typo; more words make it prose.
    let number = |name: &'static str| {
        if rest.is_empty() {
            Err(ParseError::MissingArgument(name))
        } else if rest.contains(char::is_whitespace) {
            Ok(None)
        } else {
            Ok(Some(rest))
        }
    };

    let word = word.to_ascii_lowercase();
    let command = match word.as_str() {
        "open" => match number("open")? {
            Some(arg) => Command::Open(positive(arg)?),
            None => question(),
        },
        "cite" => match number("cite")? {
            Some(arg) => Command::Cite(positive(arg)?),
            None => question(),
        },
        "page" => match number("page")? {
            Some(arg) => Command::Page(positive(arg)?),
            None => question(),
        },
        "upload" if rest.is_empty() => return Err(ParseError::MissingArgument("upload")),
        "upload" => Command::Upload(PathBuf::from(rest)),
        "ask" if rest.is_empty() => return Err(ParseError::MissingArgument("ask")),
        "ask" => Command::Ask(rest.to_string()),
        "zoom" => match rest {
            "in" | "+" => Command::ZoomIn,
            "out" | "-" => Command::ZoomOut,
            _ if rest.contains(char::is_whitespace) => question(),
            _ => return Err(ParseError::InvalidZoom),
        },
        _ if !rest.is_empty() => question(),
        "list" | "ls" => Command::List,
        "next" | "n" => Command::Next,
        "prev" | "p" => Command::Prev,
        "retry" => Command::Retry,
        "show" => Command::Show,
        "close" => Command::Close,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        _ => question(),
    };
    Ok(Some(command))
}
