use crate::types::{ShellError, ShellResult};

fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n')
}

/// Strip one pair of enclosing double quotes. Anything else, including a
/// token with a quote on only one side, is returned untouched.
fn strip_quotes(token: &str) -> &str {
    if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
        &token[1..token.len() - 1]
    } else {
        token
    }
}

/// Split a raw line into argument tokens.
pub fn tokenize(line: &str) -> ShellResult<Vec<String>> {
    let tokens: Vec<String> = line
        .split(is_separator)
        .filter(|word| !word.is_empty())
        .map(|word| strip_quotes(word).to_string())
        .collect();

    if tokens.is_empty() {
        return Err(ShellError::EmptyLine);
    }
    log::debug!("tokens: {:?}", tokens);
    Ok(tokens)
}
