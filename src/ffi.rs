//! FFI bindings for the Life Morale engine
//!
//! This module provides C-compatible functions for scoring from other languages.
//! All functions use C strings (null-terminated) and return allocated memory that
//! must be freed by the caller using `lmi_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::pipeline::{score_json, LmiEngine};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Score a JSON request with the built-in defaults.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `lmi_free_string`.
/// - Returns NULL on error; call `lmi_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn lmi_score_json(json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    match score_json(json_str) {
        Ok(result) => string_to_cstr(&result),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Engine API
// ============================================================================

/// Opaque handle to an LmiEngine
pub struct LmiEngineHandle {
    engine: LmiEngine,
}

/// Create an engine, optionally with a JSON config document as its defaults.
///
/// # Safety
/// - `config_json` must be NULL or a valid null-terminated C string.
/// - Returns a pointer to a newly allocated engine; free it with `lmi_engine_free`.
/// - Returns NULL when the config is invalid; call `lmi_last_error` for details.
#[no_mangle]
pub unsafe extern "C" fn lmi_engine_new(config_json: *const c_char) -> *mut LmiEngineHandle {
    clear_last_error();

    let engine = if config_json.is_null() {
        LmiEngine::new()
    } else {
        let config_str = match cstr_to_string(config_json) {
            Some(s) => s,
            None => {
                set_last_error("Invalid config string pointer");
                return ptr::null_mut();
            }
        };
        match LmiEngine::from_config_json(&config_str) {
            Ok(engine) => engine,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        }
    };

    Box::into_raw(Box::new(LmiEngineHandle { engine }))
}

/// Free an engine.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `lmi_engine_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn lmi_engine_free(engine: *mut LmiEngineHandle) {
    if !engine.is_null() {
        drop(Box::from_raw(engine));
    }
}

/// Score a JSON request with an engine's defaults.
///
/// When `envelope` is non-zero the result is wrapped in a score report.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `lmi_engine_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `lmi_free_string`.
/// - Returns NULL on error; call `lmi_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn lmi_engine_score(
    engine: *const LmiEngineHandle,
    json: *const c_char,
    envelope: i32,
) -> *mut c_char {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }

    let handle = &*engine;

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    let result = if envelope != 0 {
        handle.engine.score_report_json(&json_str)
    } else {
        handle.engine.score_json(&json_str)
    };

    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by lmi functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by an lmi function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn lmi_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next lmi function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn lmi_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the engine version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn lmi_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> CString {
        CString::new(
            r#"{
                "answers": [{"score": 8}, {"score": 4, "scenarioScore": 7}, null],
                "timeMap": [
                    {"category": "Sleep", "hours": 56, "ri": 5},
                    {"category": "Work", "hours": 45, "ri": 3}
                ],
                "ELI": 6
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_ffi_score_json() {
        let request = sample_request();

        unsafe {
            let result = lmi_score_json(request.as_ptr());
            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            let value: serde_json::Value = serde_json::from_str(result_str).unwrap();
            assert!(value["finalLMI"].is_number());
            assert!(value["scenario"]["finalLMI"].is_number());

            lmi_free_string(result);
        }
    }

    #[test]
    fn test_ffi_engine_lifecycle() {
        let config = CString::new(r#"{"crossLift": {"enabled": true}}"#).unwrap();
        let request = sample_request();

        unsafe {
            let engine = lmi_engine_new(config.as_ptr());
            assert!(!engine.is_null());

            let result = lmi_engine_score(engine, request.as_ptr(), 0);
            assert!(!result.is_null());
            lmi_free_string(result);

            let report = lmi_engine_score(engine, request.as_ptr(), 1);
            assert!(!report.is_null());
            let report_str = CStr::from_ptr(report).to_str().unwrap();
            assert!(report_str.contains("lmi.score_report.v1"));
            lmi_free_string(report);

            lmi_engine_free(engine);

            let default_engine = lmi_engine_new(ptr::null());
            assert!(!default_engine.is_null());
            lmi_engine_free(default_engine);
        }
    }

    #[test]
    fn test_ffi_invalid_config() {
        let config = CString::new(r#"{"calibration": {"max": 25}}"#).unwrap();

        unsafe {
            let engine = lmi_engine_new(config.as_ptr());
            assert!(engine.is_null());

            let error = CStr::from_ptr(lmi_last_error()).to_str().unwrap();
            assert!(error.contains("calibration.max"));
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        unsafe {
            let invalid_json = CString::new("not json").unwrap();
            let result = lmi_score_json(invalid_json.as_ptr());
            assert!(result.is_null());

            let error = lmi_last_error();
            assert!(!error.is_null());
            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(!error_str.is_empty());

            let result = lmi_engine_score(ptr::null(), invalid_json.as_ptr(), 0);
            assert!(result.is_null());
            let error_str = CStr::from_ptr(lmi_last_error()).to_str().unwrap();
            assert_eq!(error_str, "Null engine pointer");
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = lmi_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert_eq!(version_str, env!("CARGO_PKG_VERSION"));
        }
    }
}
