//! Line parser for CRASH
//!
//! Classifies a raw input line into a [`Directive`] and provides the field
//! splitting used for argument vectors and `PATH` entries.

use crash_ast::{ArgVector, Directive};
use crash_lexer::LineShape;

// Word expansion ($VAR, ~, globs)
pub mod expansion;

/// Split `line` into fields on `delimiter`.
///
/// A run of delimiters closes the current field once, so `a,,b` gives two
/// fields. A final field is always appended, which means a leading delimiter
/// yields an empty first field and an empty line yields `[""]`.
#[must_use]
pub fn split_on(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == delimiter {
            fields.push(std::mem::take(&mut field));
            while chars.peek() == Some(&delimiter) {
                chars.next();
            }
        } else {
            field.push(ch);
        }
    }
    fields.push(field);

    fields
}

/// Split a command line into its argument vector
#[must_use]
pub fn split_arguments(line: &str) -> ArgVector {
    ArgVector::new(split_on(line, ' '))
}

/// Remove leading and trailing spaces. Tabs and newlines are kept.
#[must_use]
pub fn trim(s: &str) -> &str {
    s.trim_matches(' ')
}

/// Remove every trailing `&` and space
#[must_use]
pub fn strip_background(line: &str) -> &str {
    line.trim_end_matches(['&', ' '])
}

pub struct Parser {
    input: String,
}

impl Parser {
    /// Create a new parser for the given line
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
        }
    }

    /// Classify the line.
    ///
    /// Precedence is assignment, then background marker, then chaining. An
    /// assignment anywhere on the line wins over everything else, and a
    /// chained line drops its background marker.
    #[must_use]
    pub fn parse(&self) -> Directive {
        let line = self.input.as_str();
        if trim(line).is_empty() {
            return Directive::Empty;
        }

        let shape = LineShape::scan(line);

        if shape.assignment {
            let (name, value) = parse_assignment(line);
            return Directive::Assign { name, value };
        }

        let (line, background) = if shape.background {
            (strip_background(line), true)
        } else {
            (line, false)
        };

        if shape.chained {
            let pieces = split_on(line, ';')
                .iter()
                .map(|piece| trim(piece).to_string())
                .collect();
            return Directive::Chain(pieces);
        }

        Directive::Command {
            text: trim(line).to_string(),
            background,
        }
    }
}

/// Split an assignment line on its first run of `=`.
///
/// Only the name is trimmed; the value is taken verbatim. A missing value is
/// the empty string.
fn parse_assignment(line: &str) -> (String, String) {
    match line.split_once('=') {
        Some((name, value)) => (
            trim(name).to_string(),
            value.trim_start_matches('=').to_string(),
        ),
        None => (trim(line).to_string(), String::new()),
    }
}
