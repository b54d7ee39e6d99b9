//! The line processor and the `compile`/`compile_file`/`init` entry points: drive the
//! screener one logical line at a time, dispatch directives, and reabsorb an included
//! child's macro table on return.

use std::collections::HashMap;
use std::rc::Rc;

use crate::config::{Config, IncludeKind};
use crate::error::PreprocessError;
use crate::func_macro::FunctionMacro;
use crate::macro_value::{MacroTable, MacroValue};
use crate::screener::Screener;
use crate::state::{State, install_builtin_predefines};
use crate::{expr, token};

/// Run the full pipeline on `text`. `predefines` is merged after `config.env`, so
/// call-site predefines win over process-wide defaults.
///
/// # Errors
/// Propagates the first `PreprocessError` raised by any directive or expression in
/// `text`; partial output is discarded.
pub fn compile(
    text: &str,
    config: &Config,
    predefines: &HashMap<String, MacroValue>,
    current_file: &str,
) -> Result<(String, State), PreprocessError> {
    let mut state = init(text, config, predefines, current_file)?;
    let output = run(&mut state, text, config)?;
    Ok((output, state))
}

/// Load `path` via `config.include_resolver` as a top-level (quote-style) include, set
/// `__FILE__ := path`, then delegate to [`compile`].
///
/// # Errors
/// `PreprocessError::IncludeNotFound` if `config` has no resolver or the resolver cannot
/// find `path`; otherwise the same errors as [`compile`].
pub fn compile_file(
    path: &str,
    config: &Config,
    predefines: &HashMap<String, MacroValue>,
) -> Result<(String, State), PreprocessError> {
    let text = load(config, path, IncludeKind::Local, 0)?;
    compile(&text, config, predefines, path)
}

/// Construct a [`State`] and install predefines without running the driver. Used for
/// stepwise inspection or testing.
///
/// # Errors
/// Propagates a `RedefinitionError` should a predefine collide (predefines are always
/// installed with override allowed, so this currently cannot fail).
pub fn init(
    _text: &str,
    config: &Config,
    predefines: &HashMap<String, MacroValue>,
    current_file: &str,
) -> Result<State, PreprocessError> {
    let mut state = State::new(current_file);
    install_builtin_predefines(&mut state);
    for (name, value) in &config.env {
        state.defines.define(name.clone(), value.clone(), true, 0)?;
    }
    for (name, value) in predefines {
        state.defines.define(name.clone(), value.clone(), true, 0)?;
    }
    Ok(state)
}

/// Drain `text` through the screener, processing every logical line against `state`, and
/// return the concatenated output text. `state.defines`/`state.conditional` carry over
/// into and out of this call, which is how `#include` reabsorbs a child's macro table.
fn run(state: &mut State, text: &str, config: &Config) -> Result<String, PreprocessError> {
    let screener = Screener::new(text);
    let mut out_lines: Vec<String> = Vec::new();

    for line in screener {
        state.lineno += 1;
        state.refresh_line_predefines();
        if let Some(rendered) = process_line(&line, state, config)? {
            if !rendered.is_empty() {
                out_lines.push(rendered);
            }
        }
    }
    state.conditional.finish(state.lineno)?;
    Ok(out_lines.join("\n"))
}

/// Process one logical line.
fn process_line(
    line: &str,
    state: &mut State,
    config: &Config,
) -> Result<Option<String>, PreprocessError> {
    if let Some(rest) = directive_body(line) {
        return process_directive(rest, state, config);
    }

    if state.conditional.is_skipping() {
        return Ok(None);
    }

    let expanded = expand_macros(line, &state.defines);
    if let Some(rest) = directive_body(&expanded) {
        return process_directive(rest, state, config);
    }
    Ok(Some(expanded))
}

/// If `line` is a directive line, return the text after `#` and its leading whitespace.
fn directive_body(line: &str) -> Option<&str> {
    line.strip_prefix('#').map(str::trim_start)
}

/// Split a directive body into its keyword and the remaining argument text.
fn split_keyword(body: &str) -> (&str, &str) {
    match body.find(char::is_whitespace) {
        Some(idx) => (&body[..idx], body[idx..].trim_start()),
        None => (body, ""),
    }
}

fn process_directive(
    body: &str,
    state: &mut State,
    config: &Config,
) -> Result<Option<String>, PreprocessError> {
    let (keyword, args) = split_keyword(body);

    // Structural directives update conditional state even while skipping, so a skipped
    // block's own nesting still closes correctly.
    match keyword {
        "if" => {
            let cond = !state.conditional.is_skipping() && evaluate_if_condition(args, state)?;
            state.conditional.on_if(cond);
            return Ok(None);
        }
        "ifdef" => {
            let cond = !state.conditional.is_skipping() && state.defines.is_defined(args.trim());
            state.conditional.on_if(cond);
            return Ok(None);
        }
        "ifndef" => {
            let cond = !state.conditional.is_skipping() && !state.defines.is_defined(args.trim());
            state.conditional.on_if(cond);
            return Ok(None);
        }
        "elif" => {
            let outer_skipping = state
                .conditional
                .skip_level
                .is_some_and(|s| s < state.conditional.level);
            let cond = !outer_skipping && evaluate_if_condition(args, state)?;
            state.conditional.on_elif(cond, state.lineno)?;
            return Ok(None);
        }
        "else" => {
            state.conditional.on_else(state.lineno)?;
            return Ok(None);
        }
        "endif" => {
            state.conditional.on_endif(state.lineno)?;
            return Ok(None);
        }
        _ => {}
    }

    if state.conditional.is_skipping() {
        return Ok(None);
    }

    match keyword {
        "include" => process_include(args, state, config).map(Some),
        "define" => {
            process_define(args, state)?;
            Ok(None)
        }
        "undef" => {
            state.defines.undef(args.trim());
            Ok(None)
        }
        "error" => Err(PreprocessError::UserError {
            lineno: state.lineno,
            message: if args.is_empty() {
                "#error".to_string()
            } else {
                args.to_string()
            },
        }),
        "pragma" => Ok(None),
        other => Err(PreprocessError::UnknownDirective {
            lineno: state.lineno,
            message: format!("#{other}"),
        }),
    }
}

/// Expressions are only evaluated while the enclosing chain is live: a malformed
/// expression in an already-skipped arm must not fail the whole compile (this call site
/// only runs when `!state.conditional.is_skipping()` held at entry for `#if`, or always
/// for `#elif`, which still needs to decide whether to keep skipping).
fn evaluate_if_condition(args: &str, state: &State) -> Result<bool, PreprocessError> {
    expr::evaluate(args, &state.defines, state.lineno)
}

/// `#define` in its three recognized forms: bare identifier, identifier + text, or
/// identifier + parameter list + replacement.
fn process_define(args: &str, state: &mut State) -> Result<(), PreprocessError> {
    let args = args.trim();
    let name_end = args
        .find(|c: char| !token::is_identifier_continue(c))
        .unwrap_or(args.len());
    let (name, rest) = args.split_at(name_end);

    if let Some(stripped) = rest.strip_prefix('(') {
        let close = stripped.find(')').ok_or_else(|| PreprocessError::UnknownDirective {
            lineno: state.lineno,
            message: format!("#define {args} (unterminated parameter list)"),
        })?;
        let params: Vec<String> = stripped[..close]
            .split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        let body = stripped[close + 1..].trim();
        let compiled = FunctionMacro::compile(&params, body)?;
        state.defines.define(
            name,
            MacroValue::FunctionMacro(Rc::new(compiled)),
            false,
            state.lineno,
        )
    } else {
        let rest = rest.trim();
        let value = if rest.is_empty() {
            MacroValue::Flag
        } else if let Ok(n) = rest.parse::<i64>() {
            MacroValue::Number(n)
        } else {
            MacroValue::Text(rest.to_string())
        };
        state.defines.define(name, value, false, state.lineno)
    }
}

/// `#include "F"` / `#include <F>`: load the referenced text, drain it through a child
/// pipeline sharing the parent's macro table, and reabsorb that table on return.
fn process_include(args: &str, state: &mut State, config: &Config) -> Result<String, PreprocessError> {
    let args = args.trim();
    let (kind, path) = if let Some(inner) = args.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        (IncludeKind::Local, inner)
    } else if let Some(inner) = args.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
        (IncludeKind::System, inner)
    } else {
        return Err(PreprocessError::IncludeNotFound {
            lineno: state.lineno,
            message: args.to_string(),
        });
    };

    let text = load(config, path, kind, state.lineno)?;

    let mut child = State::new(path);
    child.defines = std::mem::take(&mut state.defines);
    child
        .defines
        .define("__FILE__", MacroValue::Text(path.to_string()), true, state.lineno)?;
    let output = run(&mut child, &text, config)?;
    state.defines = child.defines;
    Ok(output)
}

fn load(
    config: &Config,
    path: &str,
    kind: IncludeKind,
    lineno: usize,
) -> Result<String, PreprocessError> {
    config
        .include_resolver
        .as_ref()
        .and_then(|resolver| resolver(path, kind))
        .ok_or_else(|| PreprocessError::IncludeNotFound {
            lineno,
            message: path.to_string(),
        })
}

/// Expand object-like and function-like macros over one content line: object-like
/// identifiers substitute in the tokenizer pass; function-like macros are queued and
/// applied to the whole line afterward.
fn expand_macros(line: &str, defines: &MacroTable) -> String {
    let tokens = token::tokenize(line, &[]);
    let mut rendered = String::with_capacity(line.len());
    let mut function_macros: Vec<(String, Rc<FunctionMacro>)> = Vec::new();

    for tok in &tokens {
        if tok.kind == token::TokenKind::Identifier {
            match defines.get(&tok.lexeme) {
                Some(MacroValue::FunctionMacro(mac)) => {
                    function_macros.push((tok.lexeme.clone(), Rc::clone(mac)));
                    rendered.push_str(&tok.lexeme);
                    continue;
                }
                Some(value) => {
                    if let Some(text) = value.substitution_text() {
                        rendered.push_str(&text);
                        continue;
                    }
                }
                None => {}
            }
        }
        rendered.push_str(&tok.lexeme);
    }

    for (name, mac) in function_macros {
        rendered = mac.apply_to_line(&name, &rendered);
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_like_macro_expands() {
        let config = Config::new();
        let (out, _) = compile(
            "#define LEET 0x1337\nint x = LEET;",
            &config,
            &HashMap::new(),
            "t.c",
        )
        .unwrap();
        assert_eq!(out, "int x = 0x1337;");
    }

    #[test]
    fn function_like_macro_expands() {
        let config = Config::new();
        let (out, _) = compile(
            "#define MAX(x,y) ((x)>(y)?(x):(y))\nint z = MAX(a, b);",
            &config,
            &HashMap::new(),
            "t.c",
        )
        .unwrap();
        assert_eq!(out, "int z = ((a)>(b)?(a):(b));");
    }

    #[test]
    fn nested_conditionals_choose_right_arm() {
        let config = Config::new();
        let (out, _) = compile(
            "#define TRUE\n#ifdef TRUE\nA\n#else\nB\n#endif",
            &config,
            &HashMap::new(),
            "t.c",
        )
        .unwrap();
        assert_eq!(out, "A");
    }

    #[test]
    fn elif_with_defined_and_logical_operators() {
        let config = Config::new();
        let (out, _) = compile(
            "#define X\n#if defined(Y)\nno\n#elif defined(X) && !defined(Y)\nyes\n#else\nno\n#endif",
            &config,
            &HashMap::new(),
            "t.c",
        )
        .unwrap();
        assert_eq!(out, "yes");
    }

    #[test]
    fn continuation_and_multiline_function_macro() {
        let config = Config::new();
        let (out, _) = compile(
            "#define F(x) \\\n  (x+1)\nint v = F(7);",
            &config,
            &HashMap::new(),
            "t.c",
        )
        .unwrap();
        assert_eq!(out, "int v = (7+1);");
    }

    #[test]
    fn comments_removed_directive_still_recognized() {
        let config = Config::new();
        let (out, _) = compile(
            "/* prelude */\n#define K 5 // trailing\nK",
            &config,
            &HashMap::new(),
            "t.c",
        )
        .unwrap();
        assert_eq!(out, "5");
    }

    #[test]
    fn unknown_directive_errors() {
        let config = Config::new();
        let err = compile("#bogus\n", &config, &HashMap::new(), "t.c");
        assert!(matches!(err, Err(PreprocessError::UnknownDirective { .. })));
    }

    #[test]
    fn error_directive_fires() {
        let config = Config::new();
        let err = compile("#error boom\n", &config, &HashMap::new(), "t.c");
        assert!(matches!(err, Err(PreprocessError::UserError { .. })));
    }

    #[test]
    fn include_reabsorbs_child_macro_table() {
        let config = Config::new().with_include_resolver(|path, _kind| {
            if path == "inner.h" {
                Some("#define FROM_INCLUDE 9\n".to_string())
            } else {
                None
            }
        });
        let (out, _) = compile(
            "#include \"inner.h\"\nint x = FROM_INCLUDE;",
            &config,
            &HashMap::new(),
            "t.c",
        )
        .unwrap();
        assert_eq!(out, "int x = 9;");
    }

    #[test]
    fn unbalanced_conditional_at_eof_errors() {
        let config = Config::new();
        let err = compile("#if defined(X)\nA\n", &config, &HashMap::new(), "t.c");
        assert!(matches!(
            err,
            Err(PreprocessError::UnbalancedConditional { .. })
        ));
    }
}
