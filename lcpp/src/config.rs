//! Static configuration: default predefines, the include resolver, and the
//! `lccp_lua`/`lccp_ffi`/`lcpp_test` flags.

use std::collections::HashMap;
use std::rc::Rc;

use crate::macro_value::MacroValue;

/// Whether an `#include` used quotes or angle brackets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IncludeKind {
    /// `#include "file.h"`
    Local,
    /// `#include <file.h>`
    System,
}

/// A caller-supplied file loader: given a path and its include kind, return the file's
/// text, or `None` if it cannot be resolved. Search-path policy and circular-include
/// detection are the resolver's responsibility.
pub type IncludeResolver = Rc<dyn Fn(&str, IncludeKind) -> Option<String>>;

/// Compile-time configuration. Immutable once built; construct with `Config::new()` and
/// the `with_*` builder methods.
#[derive(Clone, Default)]
pub struct Config {
    /// Default predefines merged before the call-site `predefines` argument.
    pub env: HashMap<String, MacroValue>,
    /// The file loader `#include` delegates to. `None` means every `#include` fails
    /// with `IncludeNotFound`.
    pub include_resolver: Option<IncludeResolver>,
    /// Documented no-op: describes an optional hook for intercepting a scripting host's
    /// own compile entry point. No Rust-native analog exists, so this field is stored
    /// but never consulted.
    pub lccp_lua: bool,
    /// Gates the `ffi` module's C ABI surface being considered "enabled" by callers
    /// that check this flag before wiring up `ffi::lcpp_new` et al.
    pub lccp_ffi: bool,
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_env(mut self, env: HashMap<String, MacroValue>) -> Self {
        self.env = env;
        self
    }

    #[must_use]
    pub fn with_include_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&str, IncludeKind) -> Option<String> + 'static,
    {
        self.include_resolver = Some(Rc::new(resolver));
        self
    }

    #[must_use]
    pub const fn with_lccp_lua(mut self, enabled: bool) -> Self {
        self.lccp_lua = enabled;
        self
    }

    #[must_use]
    pub const fn with_lccp_ffi(mut self, enabled: bool) -> Self {
        self.lccp_ffi = enabled;
        self
    }

    /// Run the `lcpp_test` built-in self-check: a smoke test separate from the crate's
    /// `#[cfg(test)]` unit/integration suite.
    ///
    /// # Errors
    /// Returns the first scenario's `PreprocessError` if any canonical scenario fails to
    /// compile to its expected output.
    pub fn run_self_test(&self) -> Result<(), crate::error::PreprocessError> {
        crate::self_test::run_self_test()
    }
}
