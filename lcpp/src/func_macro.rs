//! Function-like macro compilation: `#define NAME(a, b) BODY` is compiled once into a
//! template of literal spans and positional parameter indices, then rendered against
//! captured call-site arguments. No runtime regex engine is used.

use crate::error::PreprocessError;
use crate::token::{is_identifier_continue, is_identifier_start};

/// One piece of a compiled macro body: either literal text or a parameter slot.
#[derive(Debug, Clone)]
enum Piece {
    Literal(String),
    Param(usize),
}

/// A compiled function-like macro: its parameter arity and a literal/parameter template
/// for its replacement text.
#[derive(Debug)]
pub struct FunctionMacro {
    arity: usize,
    pieces: Vec<Piece>,
}

impl FunctionMacro {
    /// Compile `params` and `body` (already comment-stripped) into a template.
    ///
    /// # Errors
    /// Never fails today; kept `Result`-shaped so a future syntax check (e.g. duplicate
    /// parameter names) can be added without changing the call signature.
    pub fn compile(params: &[String], body: &str) -> Result<Self, PreprocessError> {
        let pieces = compile_pieces(params, body);
        Ok(Self {
            arity: params.len(),
            pieces,
        })
    }

    /// Rewrite every call site of `name(...)` in `line` using this macro's template.
    /// Call sites whose argument list never closes, or that need a nested parenthesized
    /// argument (unsupported), are left untouched.
    #[must_use]
    pub fn apply_to_line(&self, name: &str, line: &str) -> String {
        let chars: Vec<char> = line.chars().collect();
        let mut out = String::with_capacity(line.len());
        let mut i = 0usize;

        while i < chars.len() {
            if let Some(call_end_after_name) = match_call_site(&chars, i, name) {
                if let Some((args, end)) = split_arguments(&chars, call_end_after_name) {
                    if args.len() == self.arity {
                        out.push_str(&self.render(&args));
                        i = end;
                        continue;
                    }
                }
            }
            out.push(chars[i]);
            i += 1;
        }

        out
    }

    fn render(&self, args: &[String]) -> String {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Literal(s) => out.push_str(s),
                Piece::Param(idx) => {
                    if let Some(arg) = args.get(*idx) {
                        out.push_str(arg.trim());
                    }
                }
            }
        }
        out
    }
}

/// If `name` appears starting at `chars[i]` followed by optional whitespace and `(`,
/// return the index just past that `(`.
fn match_call_site(chars: &[char], i: usize, name: &str) -> Option<usize> {
    let name_chars: Vec<char> = name.chars().collect();
    if i + name_chars.len() > chars.len() {
        return None;
    }
    if chars[i..i + name_chars.len()] != name_chars[..] {
        return None;
    }
    // The match must be a whole identifier, not a substring of a longer one.
    if i > 0 && is_identifier_continue(chars[i - 1]) {
        return None;
    }
    let mut j = i + name_chars.len();
    if j < chars.len() && (is_identifier_start(chars[j]) || chars[j].is_ascii_digit()) {
        return None;
    }
    while j < chars.len() && chars[j].is_whitespace() {
        j += 1;
    }
    if j < chars.len() && chars[j] == '(' {
        Some(j + 1)
    } else {
        None
    }
}

/// Split a call's argument list starting just after its opening `(`. Returns the
/// trimmed argument strings and the index just past the closing `)`. Bails out
/// (`None`) on unbalanced or nested parentheses within an argument, matching the
/// documented "no nested parens in arguments" limitation.
fn split_arguments(chars: &[char], start: usize) -> Option<(Vec<String>, usize)> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut i = start;
    let mut saw_any = false;

    // A zero-argument call site is `NAME()`.
    let mut j = start;
    while j < chars.len() && chars[j].is_whitespace() {
        j += 1;
    }
    if j < chars.len() && chars[j] == ')' {
        return Some((Vec::new(), j + 1));
    }

    while i < chars.len() {
        match chars[i] {
            '(' => return None,
            ')' => {
                args.push(current.trim().to_string());
                return Some((args, i + 1));
            }
            ',' => {
                args.push(current.trim().to_string());
                current.clear();
                saw_any = true;
            }
            c => current.push(c),
        }
        i += 1;
    }
    let _ = saw_any;
    None
}

/// Walk `body`, replacing whole-identifier occurrences of each name in `params` with a
/// positional `Piece::Param`, and collapsing the rest into `Piece::Literal` runs.
fn compile_pieces(params: &[String], body: &str) -> Vec<Piece> {
    let chars: Vec<char> = body.chars().collect();
    let mut pieces = Vec::new();
    let mut literal = String::new();
    let mut i = 0usize;

    while i < chars.len() {
        let c = chars[i];
        if is_identifier_start(c) {
            let start = i;
            i += 1;
            while i < chars.len() && is_identifier_continue(chars[i]) {
                i += 1;
            }
            let ident: String = chars[start..i].iter().collect();
            if let Some(pos) = params.iter().position(|p| p == &ident) {
                if !literal.is_empty() {
                    pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                }
                pieces.push(Piece::Param(pos));
            } else {
                literal.push_str(&ident);
            }
        } else {
            literal.push(c);
            i += 1;
        }
    }
    if !literal.is_empty() {
        pieces.push(Piece::Literal(literal));
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_and_renders_two_arg_macro() {
        let params = vec!["x".to_string(), "y".to_string()];
        let mac = FunctionMacro::compile(&params, "((x)>(y)?(x):(y))").unwrap();
        let out = mac.apply_to_line("MAX", "int z = MAX(a, b);");
        assert_eq!(out, "int z = ((a)>(b)?(a):(b));");
    }

    #[test]
    fn zero_arity_call_site() {
        let mac = FunctionMacro::compile(&[], "42").unwrap();
        let out = mac.apply_to_line("ANSWER", "int x = ANSWER();");
        assert_eq!(out, "int x = 42;");
    }

    #[test]
    fn leaves_unrelated_identifiers_alone() {
        let params = vec!["x".to_string()];
        let mac = FunctionMacro::compile(&params, "(x+1)").unwrap();
        let out = mac.apply_to_line("F", "int v = NOTF(3) + F(7);");
        assert_eq!(out, "int v = NOTF(3) + (7+1);");
    }

    #[test]
    fn mismatched_arity_is_left_untouched() {
        let params = vec!["x".to_string(), "y".to_string()];
        let mac = FunctionMacro::compile(&params, "(x+y)").unwrap();
        let out = mac.apply_to_line("ADD", "int v = ADD(1);");
        assert_eq!(out, "int v = ADD(1);");
    }
}
