//! Directive extraction from source file headers.
//!
//! Every source file may declare its dependencies in a leading comment header:
//!
//! ```javascript
//! // = require vendor/jquery
//! // = require_tree ./widgets
//! /*
//!  = include partials/banner
//!  */
//! var app = {};
//! ```
//!
//! # Header Rules
//!
//! - The header starts at the first non-blank text of the file and is a run of
//!   `//` line comments, optionally separated by blank lines, and `/* ... */`
//!   block comments. A block comment ends the header unless another comment
//!   starts right after its closer on the same line; anything else (code, an
//!   indented comment) ends it too.
//! - Directive-looking lines after the header are ignored.
//! - A header line is a directive when it reads `<non-word prefix>= <command> <args>`,
//!   optionally followed by a block comment closer.
//! - Quotes are stripped and arguments split on whitespace. Each argument becomes
//!   its own [`Directive`] with the same command.
//! - Unknown commands are skipped so newer headers still build with older tools.

use regex::Regex;
use std::fmt;

/// Known spellings of each command, used for unknown-command suggestions.
const COMMAND_SPELLINGS: [&str; 6] = [
    "require",
    "include",
    "require_directory",
    "requireDirectory",
    "require_tree",
    "requireTree",
];

/// Maximum edit distance for a "did you mean" suggestion on unknown commands.
const SUGGESTION_DISTANCE: usize = 3;

/// Pattern of a directive line inside the header.
const DIRECTIVE_PATTERN: &str = r"^[^\w\n]*=\s*(\w+.*?)\s*(?:\*/)?\s*$";

/// How a directive pulls its target into the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Concatenate the file once per output (`require`)
    Require,
    /// Concatenate the file at every reference point (`include`)
    Include,
    /// Require every supported file directly inside a directory
    RequireDirectory,
    /// Require every supported file anywhere below a directory
    RequireTree,
}

impl Command {
    /// Parse a command word, accepting both underscore and camel case spellings.
    #[must_use]
    pub fn parse(word: &str) -> Option<Self> {
        match word {
            "require" => Some(Self::Require),
            "include" => Some(Self::Include),
            "require_directory" | "requireDirectory" => Some(Self::RequireDirectory),
            "require_tree" | "requireTree" => Some(Self::RequireTree),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Require => write!(f, "require"),
            Self::Include => write!(f, "include"),
            Self::RequireDirectory => write!(f, "require_directory"),
            Self::RequireTree => write!(f, "require_tree"),
        }
    }
}

/// One parsed header instruction with a single path argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// The command to apply
    pub command: Command,
    /// Raw path argument, relative to the declaring file's directory
    pub argument: String,
}

impl Directive {
    /// Create a directive.
    pub fn new(command: Command, argument: impl Into<String>) -> Self {
        Self {
            command,
            argument: argument.into(),
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.command, self.argument)
    }
}

/// Parse the directives declared in a file's leading comment header.
///
/// Returns directives in declaration order, one per argument.
///
/// # Examples
///
/// ```rust
/// use gcp_cli::directive::{parse_directives, Command, Directive};
///
/// let source = "// = require foo bar\n// = include 'partials/header'\nvar x = 1;\n// = require ignored\n";
/// let directives = parse_directives(source);
///
/// assert_eq!(
///     directives,
///     vec![
///         Directive::new(Command::Require, "foo"),
///         Directive::new(Command::Require, "bar"),
///         Directive::new(Command::Include, "partials/header"),
///     ]
/// );
/// ```
#[must_use]
pub fn parse_directives(source: &str) -> Vec<Directive> {
    let header = extract_header(source);
    if header.is_empty() {
        return Vec::new();
    }

    let Ok(directive_regex) = Regex::new(DIRECTIVE_PATTERN) else {
        return Vec::new();
    };

    let mut directives = Vec::new();
    for line in header.lines() {
        let Some(body) = directive_regex.captures(line).and_then(|cap| cap.get(1)) else {
            continue;
        };

        let unquoted = body.as_str().replace(['\'', '"'], "");
        let mut words = unquoted.split_whitespace();
        let Some(word) = words.next() else {
            continue;
        };

        match Command::parse(word) {
            Some(command) => {
                directives.extend(words.map(|argument| Directive::new(command, argument)));
            }
            None => match suggest_command(word) {
                Some(suggestion) => tracing::debug!(
                    "Ignoring unknown directive '{}' (did you mean '{}'?)",
                    word,
                    suggestion
                ),
                None => tracing::debug!("Ignoring unknown directive '{}'", word),
            },
        }
    }

    directives
}

/// Isolate the leading comment header of a source file.
///
/// Trailing whitespace (including `\r`) is stripped from every line first.
/// Line comments absorb the blank lines that follow them; block comments do
/// not, so a newline after `*/` closes the header.
fn extract_header(source: &str) -> String {
    let normalized: String = source
        .lines()
        .map(|line| line.trim_end_matches(['\r', '\t', ' ']))
        .collect::<Vec<_>>()
        .join("\n");

    let start = normalized.trim_start();
    let mut rest = start;

    loop {
        if rest.starts_with("//") {
            let end = rest.find('\n').unwrap_or(rest.len());
            rest = rest[end..].trim_start_matches('\n');
        } else if rest.starts_with("/*") {
            match rest[2..].find("*/") {
                Some(close) => rest = &rest[close + 4..],
                None => break,
            }
        } else {
            break;
        }
    }

    start[..start.len() - rest.len()].trim_end().to_string()
}

fn suggest_command(word: &str) -> Option<&'static str> {
    COMMAND_SPELLINGS
        .iter()
        .map(|known| (strsim::levenshtein(word, known), *known))
        .filter(|(distance, _)| *distance <= SUGGESTION_DISTANCE)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, known)| known)
}
