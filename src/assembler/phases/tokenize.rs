use super::types::{Loc, Located};

const COMMENT_CHAR: char = ';';

// ASCII whitespace including vertical tab. Unicode spaces belong to tokens.
fn is_separator(c: char) -> bool {
    c.is_ascii_whitespace() || c == '\x0B'
}

fn strip_comment(line: &str) -> &str {
    match line.find(COMMENT_CHAR) {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn line_to_iter(line_no: usize, line: &str) -> impl Iterator<Item = Located<&str>> {
    let code = strip_comment(line);
    let mut chars = code.char_indices().peekable();

    std::iter::from_fn(move || {
        while chars.peek().map_or(false, |&(_, c)| is_separator(c)) {
            chars.next();
        }

        let (start_idx, _) = chars.next()?;
        let mut end_idx = code.len();
        while let Some(&(idx, c)) = chars.peek() {
            if is_separator(c) {
                end_idx = idx;
                break;
            }
            chars.next();
        }

        Some(Located::with_loc(
            Loc::new(line_no, start_idx + 1),
            &code[start_idx..end_idx],
        ))
    })
}

/// Lazily splits `source` into located tokens, in source order.
pub fn tokenize(source: &str) -> impl Iterator<Item = Located<&str>> {
    source
        .lines()
        .enumerate()
        .flat_map(|(line_no, line)| line_to_iter(line_no + 1, line))
}
