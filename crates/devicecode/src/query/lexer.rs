//! Shell-style splitting of a filter string into statements.

use crate::error::{DeviceCodeError, Result};

/// Split `input` into lowercase tokens.
///
/// Whitespace separates tokens. Single quotes take everything literally,
/// double quotes and bare text honour backslash escapes. Quotes may appear
/// anywhere inside a token, so `brand="d-link systems"` is one token.
pub fn tokenize(input: &str) -> Result<Vec<String>> {
    let lowered = input.to_lowercase();
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut chars = lowered.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            '\'' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some((_, '\'')) => break,
                        Some((_, c)) => current.push(c),
                        None => return Err(unterminated(&lowered[pos..])),
                    }
                }
            }
            '"' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some((_, '"')) => break,
                        Some((_, '\\')) => match chars.next() {
                            // Inside double quotes only \" and \\ are escapes.
                            Some((_, e @ ('"' | '\\'))) => current.push(e),
                            Some((_, e)) => {
                                current.push('\\');
                                current.push(e);
                            }
                            None => return Err(unterminated(&lowered[pos..])),
                        },
                        Some((_, c)) => current.push(c),
                        None => return Err(unterminated(&lowered[pos..])),
                    }
                }
            }
            '\\' => {
                in_token = true;
                match chars.next() {
                    Some((_, e)) => current.push(e),
                    None => {
                        return Err(DeviceCodeError::query(
                            &lowered[pos..],
                            "no character after escape",
                        ));
                    }
                }
            }
            c => {
                in_token = true;
                current.push(c);
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

fn unterminated(rest: &str) -> DeviceCodeError {
    DeviceCodeError::query(rest, "unterminated quote")
}
