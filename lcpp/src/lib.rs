#![warn(missing_docs)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

//! # lcpp
//!
//! A small C preprocessor engine: directive screening, conditional compilation, and
//! single-pass macro expansion.
//!
//! ## Features
//!
//! - Macro expansion (object-like and function-like macros)
//! - Conditional compilation (`#ifdef`, `#ifndef`, `#if`, `#else`, `#elif`, `#endif`)
//! - Include processing with a caller-supplied file resolver
//! - A C FFI surface behind the `ffi` feature
//!
//! ## Example
//!
//! ```rust
//! use lcpp::Config;
//!
//! let code = "#define PI 3.14\nconst double pi = PI;";
//! let config = Config::new();
//! let (output, _state) = lcpp::compile(code, &config, &Default::default(), "example.c").unwrap();
//! assert_eq!(output, "const double pi = 3.14;");
//! ```

mod conditional;
mod config;
mod date_time;
mod driver;
mod error;
mod expr;
#[cfg(feature = "ffi")]
mod ffi;
mod func_macro;
mod macro_value;
mod screener;
mod self_test;
mod state;
mod token;

pub use config::{Config, IncludeKind, IncludeResolver};
pub use driver::{compile, compile_file, init};
pub use error::PreprocessError;
pub use macro_value::{MacroTable, MacroValue};
pub use state::State;

#[cfg(feature = "ffi")]
pub use ffi::{lcpp_free, lcpp_free_result, lcpp_last_error, lcpp_new, lcpp_process, LcppHandle};

pub use self_test::run_self_test;
