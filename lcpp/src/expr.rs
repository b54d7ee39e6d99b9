//! The `#if`/`#elif` expression evaluator: `defined(X)`, `!`, `&&`, `||`, and
//! parentheses only, evaluated left-to-right with no precedence distinction between
//! `&&` and `||`.

use crate::error::PreprocessError;
use crate::macro_value::MacroTable;
use crate::token::{EXPR_KEYWORDS, Token, TokenKind, tokenize};

/// Evaluate a `#if`/`#elif` expression string against `macros`.
///
/// # Errors
/// Returns `PreprocessError::ExpressionParseError` on any syntactic deviation from the
/// grammar.
pub fn evaluate(expr: &str, macros: &MacroTable, lineno: usize) -> Result<bool, PreprocessError> {
    let tokens: Vec<Token> = tokenize(expr, EXPR_KEYWORDS)
        .into_iter()
        .filter(|t| t.kind != TokenKind::Whitespace)
        .collect();
    let mut pos = 0usize;
    let result = parse_expr(&tokens, &mut pos, macros, lineno)?;
    if pos != tokens.len() {
        return Err(parse_error(lineno, expr));
    }
    Ok(result)
}

fn parse_error(lineno: usize, expr: &str) -> PreprocessError {
    PreprocessError::ExpressionParseError {
        lineno,
        message: expr.trim().to_string(),
    }
}

// EXPR := TERM (('&&' | '||') TERM)*
//
// `&&` and `||` associate left-to-right in encounter order with no precedence
// distinction between them, so each operator is folded into the running result as soon
// as its right-hand term is parsed, rather than recursing into the remainder as a
// single right operand (which would make the last operator bind first).
fn parse_expr(
    tokens: &[Token],
    pos: &mut usize,
    macros: &MacroTable,
    lineno: usize,
) -> Result<bool, PreprocessError> {
    let mut result = parse_term(tokens, pos, macros, lineno)?;
    while let Some(tok) = tokens.get(*pos) {
        if tok.kind != TokenKind::Keyword || (tok.lexeme != "&&" && tok.lexeme != "||") {
            break;
        }
        let is_and = tok.lexeme == "&&";
        *pos += 1;
        let right = parse_term(tokens, pos, macros, lineno)?;
        result = if is_and { result && right } else { result || right };
    }
    Ok(result)
}

// TERM := '!' TERM | '(' EXPR ')' | DEFCALL
fn parse_term(
    tokens: &[Token],
    pos: &mut usize,
    macros: &MacroTable,
    lineno: usize,
) -> Result<bool, PreprocessError> {
    let tok = tokens
        .get(*pos)
        .ok_or_else(|| PreprocessError::ExpressionParseError {
            lineno,
            message: "unexpected end of expression".to_string(),
        })?;

    if tok.kind == TokenKind::Keyword && tok.lexeme == "!" {
        *pos += 1;
        let inner = parse_term(tokens, pos, macros, lineno)?;
        return Ok(!inner);
    }

    if tok.kind == TokenKind::Keyword && tok.lexeme == "(" {
        *pos += 1;
        let inner = parse_expr(tokens, pos, macros, lineno)?;
        expect_keyword(tokens, pos, ")", lineno)?;
        return Ok(inner);
    }

    parse_defined(tokens, pos, macros, lineno)
}

// DEFCALL := 'defined' '(' IDENT ')' | 'defined' IDENT
fn parse_defined(
    tokens: &[Token],
    pos: &mut usize,
    macros: &MacroTable,
    lineno: usize,
) -> Result<bool, PreprocessError> {
    let tok = tokens
        .get(*pos)
        .ok_or_else(|| PreprocessError::ExpressionParseError {
            lineno,
            message: "unexpected end of expression".to_string(),
        })?;
    if tok.kind != TokenKind::Keyword || tok.lexeme != "defined" {
        return Err(PreprocessError::ExpressionParseError {
            lineno,
            message: format!("expected 'defined', found '{}'", tok.lexeme),
        });
    }
    *pos += 1;

    let parenthesized = matches!(tokens.get(*pos), Some(t) if t.kind == TokenKind::Keyword && t.lexeme == "(");
    if parenthesized {
        *pos += 1;
    }

    let ident = tokens
        .get(*pos)
        .filter(|t| t.kind == TokenKind::Identifier)
        .ok_or_else(|| PreprocessError::ExpressionParseError {
            lineno,
            message: "expected identifier after defined".to_string(),
        })?
        .lexeme
        .clone();
    *pos += 1;

    if parenthesized {
        expect_keyword(tokens, pos, ")", lineno)?;
    }

    Ok(macros.is_defined(&ident))
}

fn expect_keyword(
    tokens: &[Token],
    pos: &mut usize,
    lexeme: &str,
    lineno: usize,
) -> Result<(), PreprocessError> {
    match tokens.get(*pos) {
        Some(t) if t.kind == TokenKind::Keyword && t.lexeme == lexeme => {
            *pos += 1;
            Ok(())
        }
        _ => Err(PreprocessError::ExpressionParseError {
            lineno,
            message: format!("expected '{lexeme}'"),
        }),
    }
}
