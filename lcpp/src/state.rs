//! Per-compile state: the macro table, line counter, conditional nesting, and the
//! current file name attributed to `__FILE__` and error messages.

use crate::conditional::ConditionalState;
use crate::date_time::{format_date, format_time};
use crate::macro_value::{MacroTable, MacroValue};

pub struct State {
    pub defines: MacroTable,
    pub lineno: usize,
    pub conditional: ConditionalState,
    pub current_file: String,
}

impl State {
    #[must_use]
    pub fn new(current_file: impl Into<String>) -> Self {
        Self {
            defines: MacroTable::new(),
            lineno: 0,
            conditional: ConditionalState::new(),
            current_file: current_file.into(),
        }
    }

    /// Refresh the macros whose value changes every line: `__LINE__` and `__INDENT__`.
    pub fn refresh_line_predefines(&mut self) {
        let _ = self.defines.define(
            "__LINE__",
            MacroValue::Number(self.lineno as i64),
            true,
            self.lineno,
        );
        let _ = self.defines.define(
            "__INDENT__",
            MacroValue::Number(self.conditional.level as i64),
            true,
            self.lineno,
        );
    }
}

/// Install the predefines every compile carries: `__FILE__`, `__LINE__`, `__DATE__`,
/// `__TIME__`, `__INDENT__`. Called before any user or caller-supplied predefine, so
/// those may freely override them.
pub fn install_builtin_predefines(state: &mut State) {
    let _ = state.defines.define(
        "__FILE__",
        MacroValue::Text(state.current_file.clone()),
        true,
        0,
    );
    let _ = state
        .defines
        .define("__DATE__", MacroValue::Text(format_date()), true, 0);
    let _ = state
        .defines
        .define("__TIME__", MacroValue::Text(format_time()), true, 0);
    state.refresh_line_predefines();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predefines_are_installed() {
        let mut state = State::new("test.c");
        install_builtin_predefines(&mut state);
        assert!(state.defines.is_defined("__FILE__"));
        assert!(state.defines.is_defined("__DATE__"));
        assert!(state.defines.is_defined("__TIME__"));
        assert!(state.defines.is_defined("__LINE__"));
        assert!(state.defines.is_defined("__INDENT__"));
    }
}
