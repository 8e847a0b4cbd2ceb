mod error;
mod grammar;

pub use error::ParseError;

use crate::Script;

/// Deepest container nesting accepted in script text.
pub const MAX_NESTING: usize = 64;

/// Parse JSON5 script text into a [`Script`].
///
/// # Errors
///
/// Returns [`ParseError`] if the text is not valid JSON5 or does not
/// describe a script.
pub fn parse(input: &str) -> Result<Script, ParseError> {
    let document = parse_document(input)?;
    Ok(serde_json::from_value(document)?)
}

/// Parse JSON5 text into an untyped document.
///
/// # Errors
///
/// Returns [`ParseError`] if the text is not valid JSON5 or nests deeper
/// than [`MAX_NESTING`].
pub fn parse_document(input: &str) -> Result<serde_json::Value, ParseError> {
    use winnow::Parser;
    check_nesting(input)?;
    grammar::document
        .parse(input)
        .map_err(|e| ParseError::new(e.to_string()))
}

/// Reject pathologically nested input before the recursive grammar sees it.
fn check_nesting(input: &str) -> Result<(), ParseError> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            match c {
                '\\' => {
                    chars.next();
                }
                c if c == q => quote = None,
                _ => {}
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '/' if chars.peek() == Some(&'/') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            '{' | '[' => {
                depth += 1;
                if depth > MAX_NESTING {
                    return Err(ParseError::new(format!(
                        "nesting deeper than {MAX_NESTING} levels"
                    )));
                }
            }
            '}' | ']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}
