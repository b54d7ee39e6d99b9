//! `lccp_ffi`: a small `extern "C"` surface so a host linking via a C ABI can run
//! [`crate::driver::compile`] before its own declaration parser.

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::Config;
use crate::driver::compile;
use crate::macro_value::MacroValue;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(message: &str) {
    LAST_ERROR.with(|error| {
        *error.borrow_mut() = CString::new(message).ok();
    });
}

/// An opaque handle wrapping a [`Config`] across repeated `lcpp_process` calls.
pub struct LcppHandle {
    config: Config,
}

/// Create a new preprocessor instance using default configuration.
///
/// # Safety
/// Always safe to call; takes no pointer arguments.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn lcpp_new() -> *mut LcppHandle {
    Box::into_raw(Box::new(LcppHandle {
        config: Config::new(),
    }))
}

/// Free an instance created by `lcpp_new`.
///
/// # Safety
/// `handle` must have been returned by `lcpp_new` and not already freed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn lcpp_free(handle: *mut LcppHandle) {
    if !handle.is_null() {
        unsafe {
            drop(Box::from_raw(handle));
        }
    }
}

/// Preprocess `input` and return the result as a newly allocated, null-terminated
/// string, or null on error (see `lcpp_last_error`).
///
/// # Safety
/// - `handle` must be a live pointer from `lcpp_new`.
/// - `input` must point to a valid null-terminated C string.
/// - The returned pointer, if non-null, must be freed with `lcpp_free_result`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn lcpp_process(handle: *mut LcppHandle, input: *const c_char) -> *mut c_char {
    if handle.is_null() || input.is_null() {
        return ptr::null_mut();
    }

    let input_str = match unsafe { CStr::from_ptr(input).to_str() } {
        Ok(s) => s,
        Err(_) => {
            set_last_error("input is not valid UTF-8");
            return ptr::null_mut();
        }
    };
    let instance = unsafe { &*handle };

    match compile(input_str, &instance.config, &HashMap::<String, MacroValue>::new(), "ffi") {
        Ok((output, _)) => match CString::new(output) {
            Ok(cstr) => cstr.into_raw(),
            Err(_) => {
                set_last_error("result contains an interior NUL byte");
                ptr::null_mut()
            }
        },
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Get the last error message set by `lcpp_process`.
///
/// # Safety
/// The returned pointer is valid only until the next call that sets an error on this
/// thread.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn lcpp_last_error() -> *const c_char {
    LAST_ERROR.with(|error| error.borrow().as_ref().map_or(ptr::null(), |s| s.as_ptr()))
}

/// Free a result string returned by `lcpp_process`.
///
/// # Safety
/// `result` must have been returned by `lcpp_process` and not already freed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn lcpp_free_result(result: *mut c_char) {
    if !result.is_null() {
        unsafe {
            drop(CString::from_raw(result));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    #[test]
    fn roundtrip_through_c_abi() {
        unsafe {
            let handle = lcpp_new();
            let input = CString::new("#define X 1\nint v = X;").unwrap();
            let result = lcpp_process(handle, input.as_ptr());
            assert!(!result.is_null());
            let out = CStr::from_ptr(result).to_str().unwrap();
            assert_eq!(out, "int v = 1;");
            lcpp_free_result(result);
            lcpp_free(handle);
        }
    }

    #[test]
    fn null_input_returns_null() {
        unsafe {
            let handle = lcpp_new();
            assert!(lcpp_process(handle, ptr::null()).is_null());
            lcpp_free(handle);
        }
    }
}
