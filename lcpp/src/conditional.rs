//! The conditional compilation state machine: a flat `level`/`skip_level`/
//! `else_skip_level` triple, rather than a stack of frames, since a single open arm per
//! nesting depth is all the grammar allows.

use crate::error::PreprocessError;

/// `#else if defined(X)` is intentionally NOT normalized into `#elif`: only the literal
/// `#elif` spelling opens a new arm. A bare `#else` followed by `if defined(X)` text is
/// ordinary content of the already-decided else arm.
#[derive(Debug, Default)]
pub struct ConditionalState {
    pub level: usize,
    pub skip_level: Option<usize>,
    pub else_skip_level: Option<usize>,
}

impl ConditionalState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True while content and directive side effects (other than nesting bookkeeping)
    /// must be suppressed.
    #[must_use]
    pub fn is_skipping(&self) -> bool {
        self.skip_level.is_some_and(|s| self.level >= s)
    }

    /// True when the currently open arm belongs to an ancestor level already being
    /// skipped — in that case this level's own `#if`/`#elif`/`#else` transitions are
    /// inert, since the whole nested chain is discarded regardless of its own outcome.
    fn outer_skipping(&self) -> bool {
        self.skip_level.is_some_and(|s| s < self.level)
    }

    /// `#if`/`#ifdef`/`#ifndef`: opens a new nesting level with predicate `cond`.
    pub fn on_if(&mut self, cond: bool) {
        let was_outer_skipping = self.is_skipping();
        self.level += 1;
        if !was_outer_skipping {
            if cond {
                self.else_skip_level = Some(self.level);
            } else {
                self.skip_level = Some(self.level);
            }
        }
    }

    /// `#elif`: closes the previous arm at this level and opens a new one with
    /// predicate `cond`.
    ///
    /// # Errors
    /// `UnbalancedConditional` if there is no open `#if` at all.
    pub fn on_elif(&mut self, cond: bool, lineno: usize) -> Result<(), PreprocessError> {
        if self.level == 0 {
            return Err(PreprocessError::UnbalancedConditional {
                lineno,
                message: "#elif without #if".to_string(),
            });
        }
        if self.outer_skipping() {
            return Ok(());
        }
        if self.skip_level == Some(self.level) {
            self.skip_level = None;
            if cond {
                self.else_skip_level = Some(self.level);
            } else {
                self.skip_level = Some(self.level);
            }
        } else if self.else_skip_level == Some(self.level) {
            self.skip_level = Some(self.level);
        }
        Ok(())
    }

    /// `#else`: activates this level's arm unless an earlier arm at this level already
    /// ran.
    ///
    /// # Errors
    /// `UnbalancedConditional` if there is no open `#if` at all.
    pub fn on_else(&mut self, lineno: usize) -> Result<(), PreprocessError> {
        if self.level == 0 {
            return Err(PreprocessError::UnbalancedConditional {
                lineno,
                message: "#else without #if".to_string(),
            });
        }
        if self.outer_skipping() {
            return Ok(());
        }
        if self.skip_level == Some(self.level) {
            self.skip_level = None;
        } else if self.else_skip_level == Some(self.level) {
            self.skip_level = Some(self.level);
        }
        Ok(())
    }

    /// `#endif`: closes the current nesting level.
    ///
    /// # Errors
    /// `UnbalancedConditional` if there is no open `#if` at all.
    pub fn on_endif(&mut self, lineno: usize) -> Result<(), PreprocessError> {
        if self.level == 0 {
            return Err(PreprocessError::UnbalancedConditional {
                lineno,
                message: "#endif without #if".to_string(),
            });
        }
        if self.skip_level == Some(self.level) {
            self.skip_level = None;
        }
        if self.else_skip_level == Some(self.level) {
            self.else_skip_level = None;
        }
        self.level -= 1;
        Ok(())
    }

    /// Called once at end of input: a nonzero `level` means an unclosed conditional.
    ///
    /// # Errors
    /// `UnbalancedConditional` if `level != 0`.
    pub fn finish(&self, lineno: usize) -> Result<(), PreprocessError> {
        if self.level != 0 {
            return Err(PreprocessError::UnbalancedConditional {
                lineno,
                message: format!("{} unterminated conditional(s) at end of input", self.level),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_if_else() {
        let mut state = ConditionalState::new();
        state.on_if(true);
        assert!(!state.is_skipping());
        state.on_else(1).unwrap();
        assert!(state.is_skipping());
        state.on_endif(1).unwrap();
        assert_eq!(state.level, 0);
    }

    #[test]
    fn if_false_else_active() {
        let mut state = ConditionalState::new();
        state.on_if(false);
        assert!(state.is_skipping());
        state.on_else(1).unwrap();
        assert!(!state.is_skipping());
        state.on_endif(1).unwrap();
    }

    #[test]
    fn elif_chain_picks_one_arm() {
        let mut state = ConditionalState::new();
        state.on_if(false);
        assert!(state.is_skipping());
        state.on_elif(false, 1).unwrap();
        assert!(state.is_skipping());
        state.on_elif(true, 1).unwrap();
        assert!(!state.is_skipping());
        state.on_elif(true, 1).unwrap();
        assert!(state.is_skipping(), "later elif must stay closed once an arm was taken");
        state.on_endif(1).unwrap();
        assert_eq!(state.level, 0);
    }

    #[test]
    fn nested_inside_skipped_block_stays_inert() {
        let mut state = ConditionalState::new();
        state.on_if(false);
        state.on_if(true);
        assert!(state.is_skipping());
        state.on_else(1).unwrap();
        assert!(state.is_skipping());
        state.on_endif(1).unwrap();
        assert!(state.is_skipping());
        state.on_endif(1).unwrap();
        assert_eq!(state.level, 0);
    }

    #[test]
    fn unbalanced_at_eof_errors() {
        let mut state = ConditionalState::new();
        state.on_if(true);
        assert!(state.finish(10).is_err());
    }

    #[test]
    fn endif_without_if_errors() {
        let mut state = ConditionalState::new();
        assert!(state.on_endif(1).is_err());
    }
}
