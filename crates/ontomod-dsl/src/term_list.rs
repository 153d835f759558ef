//! Term files: one identifier per line.
//!
//! Blank lines are skipped, `#` starts a comment when it opens the line or
//! follows whitespace (IRIs may contain `#`), and only the first
//! whitespace-separated token of a line is kept so that `GO:0005634 nucleus`
//! style listings work. Order and duplicates carry no meaning; callers put
//! the result into a set.

pub fn parse_term_list(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    for line in text.lines() {
        let line = strip_comment(line).trim();
        if line.is_empty() {
            continue;
        }
        if let Some(token) = line.split_whitespace().next() {
            out.push(token.to_string());
        }
    }
    out
}

fn strip_comment(line: &str) -> &str {
    let mut prev_is_space = true;
    for (i, c) in line.char_indices() {
        if c == '#' && prev_is_space {
            return &line[..i];
        }
        prev_is_space = c.is_whitespace();
    }
    line
}
