//! The macro table: a tagged `MacroValue` plus a `MacroTable` that enforces the
//! no-silent-redefinition rule.

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::PreprocessError;
use crate::func_macro::FunctionMacro;

/// A macro's bound value. Object-like macros are `Flag`/`Text`/`Number` depending on
/// whether they carry no, textual, or numeric replacement content; parameterized
/// macros are `FunctionMacro`.
#[derive(Clone)]
pub enum MacroValue {
    /// Defined with no replacement text (e.g. `#define DEBUG`).
    Flag,
    /// Object-like macro with textual replacement.
    Text(String),
    /// Object-like macro whose replacement is a bare integer literal.
    Number(i64),
    /// Function-like macro: a compiled call-site substitutor.
    FunctionMacro(Rc<FunctionMacro>),
}

impl std::fmt::Debug for MacroValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MacroValue::Flag => write!(f, "Flag"),
            MacroValue::Text(s) => write!(f, "Text({s:?})"),
            MacroValue::Number(n) => write!(f, "Number({n})"),
            MacroValue::FunctionMacro(_) => write!(f, "FunctionMacro(..)"),
        }
    }
}

impl MacroValue {
    /// The verbatim substitution text for object-like values. Function macros have no
    /// single substitution text; callers must go through their substitutor instead.
    #[must_use]
    pub fn substitution_text(&self) -> Option<String> {
        match self {
            MacroValue::Flag => Some(String::new()),
            MacroValue::Text(s) => Some(s.clone()),
            MacroValue::Number(n) => Some(n.to_string()),
            MacroValue::FunctionMacro(_) => None,
        }
    }
}

/// Mapping from identifier to [`MacroValue`]. Keys are unique: redefining an existing
/// identifier is an error unless the caller explicitly asks to override.
#[derive(Clone, Default)]
pub struct MacroTable {
    entries: HashMap<String, MacroValue>,
}

impl MacroTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Insert `name -> value`. Fails with `RedefinitionError` if `name` is already bound
    /// and `allow_override` is false.
    ///
    /// # Errors
    /// Returns `PreprocessError::RedefinitionError` when the name is already bound and
    /// `allow_override` is `false`.
    pub fn define(
        &mut self,
        name: impl Into<String>,
        value: MacroValue,
        allow_override: bool,
        lineno: usize,
    ) -> Result<(), PreprocessError> {
        let name = name.into();
        if !allow_override && self.entries.contains_key(&name) {
            return Err(PreprocessError::RedefinitionError {
                lineno,
                message: name,
            });
        }
        self.entries.insert(name, value);
        Ok(())
    }

    /// Remove a binding. No error if the name was never bound.
    pub fn undef(&mut self, name: &str) {
        self.entries.remove(name);
    }

    #[must_use]
    pub fn is_defined(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MacroValue> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MacroValue)> {
        self.entries.iter()
    }
}
