//! The screener: strips comments, splices line continuations, and yields logical lines,
//! batching non-directive content and isolating `#`-directive lines.

/// Strip `//` and `/* */` comments from `input`, replacing each with a single space.
/// String and character literals are scanned over, not treated as comment bodies.
#[must_use]
pub fn strip_comments(input: &str) -> String {
    if !input.contains('/') {
        return input.to_string();
    }

    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut quote_char = '\0';

    while let Some(ch) = chars.next() {
        if !in_string {
            if ch == '"' || ch == '\'' {
                in_string = true;
                quote_char = ch;
            } else if ch == '/' {
                if chars.peek() == Some(&'/') {
                    chars.next();
                    result.push(' ');
                    for c in chars.by_ref() {
                        if c == '\n' {
                            result.push(c);
                            break;
                        }
                    }
                    continue;
                } else if chars.peek() == Some(&'*') {
                    chars.next();
                    result.push(' ');
                    let mut prev = '\0';
                    for c in chars.by_ref() {
                        if prev == '*' && c == '/' {
                            break;
                        }
                        prev = c;
                    }
                    continue;
                }
            }
        } else if ch == quote_char {
            let mut backslashes = 0;
            for b in result.bytes().rev() {
                if b == b'\\' {
                    backslashes += 1;
                } else {
                    break;
                }
            }
            if backslashes % 2 == 0 {
                in_string = false;
                quote_char = '\0';
            }
        }
        result.push(ch);
    }
    result
}

/// Join every backslash-newline (and backslash-CRLF) pair into nothing, splicing the
/// continued line onto the next.
#[must_use]
pub fn splice_continuations(input: &str) -> String {
    if !input.contains('\\') {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.peek() {
                Some('\n') => {
                    chars.next();
                }
                Some('\r') => {
                    chars.next();
                    if chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                }
                _ => out.push(ch),
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// A lazy, forward-only source of logical lines over fully normalized text: comments
/// stripped, continuations spliced. Non-directive lines are batched into a single
/// newline-joined emission up to (but not including) the next directive line.
pub struct Screener {
    lines: std::vec::IntoIter<String>,
    pending_batch: Vec<String>,
    /// A directive line read while flushing a batch, held for the next `next()` call.
    stashed_directive: Option<String>,
}

impl Screener {
    #[must_use]
    pub fn new(text: &str) -> Self {
        let normalized = splice_continuations(&strip_comments(text));
        let lines: Vec<String> = normalized
            .split('\n')
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        Self {
            lines: lines.into_iter(),
            pending_batch: Vec::new(),
            stashed_directive: None,
        }
    }

    fn flush_batch(&mut self) -> Option<String> {
        if self.pending_batch.is_empty() {
            None
        } else {
            Some(self.pending_batch.drain(..).collect::<Vec<_>>().join("\n"))
        }
    }
}

impl Iterator for Screener {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if let Some(directive) = self.stashed_directive.take() {
            return Some(directive);
        }
        loop {
            match self.lines.next() {
                Some(line) if line.starts_with('#') => {
                    let directive = normalize_directive(&line);
                    if let Some(batch) = self.flush_batch() {
                        self.stashed_directive = Some(directive);
                        return Some(batch);
                    }
                    return Some(directive);
                }
                Some(line) => {
                    self.pending_batch.push(line);
                }
                None => return self.flush_batch(),
            }
        }
    }
}

/// Collapse whitespace between `#` and the directive keyword so every directive line
/// starts with `#keyword`.
fn normalize_directive(line: &str) -> String {
    let rest = line.trim_start_matches('#').trim_start();
    format!("#{rest}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_line_and_block_comments() {
        let out = strip_comments("int x = 1; // c\nint y = 2; /* c */ int z;");
        assert!(!out.contains("// c"));
        assert!(!out.contains("/* c */"));
        assert!(out.contains("int x = 1;"));
        assert!(out.contains("int z;"));
    }

    #[test]
    fn preserves_slashes_inside_strings() {
        let out = strip_comments(r#"const char* s = "a // not a comment";"#);
        assert!(out.contains("a // not a comment"));
    }

    #[test]
    fn splices_backslash_newline() {
        let out = splice_continuations("#define F(x) \\\n  (x+1)\n");
        assert_eq!(out, "#define F(x)   (x+1)\n");
    }

    #[test]
    fn batches_non_directive_lines_and_isolates_directives() {
        let lines: Vec<String> = Screener::new("a\nb\n#define X 1\nc\n").collect();
        assert_eq!(lines, vec!["a\nb", "#define X 1", "c"]);
    }
}
