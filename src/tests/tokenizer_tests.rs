use crate::tokenizer::tokenize;
use crate::types::ShellError;

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

#[test]
fn test_whitespace_runs() {
    let tokens = tokenize("  ls\t-l   /tmp \n").unwrap();
    assert_eq!(tokens, words(&["ls", "-l", "/tmp"]));
}

#[test]
fn test_outer_quotes_stripped() {
    let tokens = tokenize(r#"echo "hello" "a=b" plain"#).unwrap();
    assert_eq!(tokens, words(&["echo", "hello", "a=b", "plain"]));
}

#[test]
fn test_quotes_do_not_join_tokens() {
    let tokens = tokenize(r#"echo "hello world""#).unwrap();
    assert_eq!(tokens, words(&["echo", "\"hello", "world\""]));
}

#[test]
fn test_unbalanced_quotes_untouched() {
    let tokens = tokenize(r#"echo "open close" " a"b"#).unwrap();
    assert_eq!(tokens, words(&["echo", "\"open", "close\"", "\"", "a\"b"]));
}

#[test]
fn test_empty_quotes_become_empty_token() {
    let tokens = tokenize(r#"echo """#).unwrap();
    assert_eq!(tokens, words(&["echo", ""]));
}

#[test]
fn test_blank_line_is_empty() {
    assert!(matches!(tokenize(""), Err(ShellError::EmptyLine)));
    assert!(matches!(tokenize(" \t \n"), Err(ShellError::EmptyLine)));
}
