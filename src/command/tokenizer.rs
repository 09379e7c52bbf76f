use crate::error::{EngineError, Result};

/// Split a shell-like command line into argv tokens.
///
/// Supports whitespace splitting, single and double quotes, and `\` escaping.
/// A backslash escapes the next character everywhere, including inside
/// quotes. No variable expansion, globbing or operators.
pub fn tokenize(input: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut active_quote: Option<char> = None;
    let mut escaping = false;

    for ch in input.chars() {
        if escaping {
            current.push(ch);
            escaping = false;
            continue;
        }

        if ch == '\\' {
            escaping = true;
            continue;
        }

        if let Some(quote) = active_quote {
            if ch == quote {
                active_quote = None;
            } else {
                current.push(ch);
            }
            continue;
        }

        match ch {
            '\'' | '"' => active_quote = Some(ch),
            c if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }

    if escaping {
        current.push('\\');
    }

    if let Some(quote) = active_quote {
        return Err(EngineError::UnterminatedQuote(quote));
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    Ok(tokens)
}
