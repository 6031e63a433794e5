//! FFI bindings for Senz Core
//!
//! This module provides C-compatible functions for calling Senz Core from other
//! languages. All functions use C strings (null-terminated) and return allocated
//! memory that must be freed by the caller using `senz_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::encoder::Envelope;
use crate::error::SenzError;
use crate::pipeline::{
    align_timelines_json, rank_joint_json, refine_scale_json, Operation, SenzProcessor,
};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
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

/// Run a JSON-in, JSON-out operation, recording failures in `LAST_ERROR`
unsafe fn run_json(
    json: *const c_char,
    op: impl FnOnce(&str) -> Result<String, SenzError>,
) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    match op(&json_str) {
        Ok(result) => string_to_cstr(&result),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Align timelines and return a JSON array of aligned tuples.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `senz_free_string`.
/// - Returns NULL on error; call `senz_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn senz_align_timelines(json: *const c_char) -> *mut c_char {
    run_json(json, align_timelines_json)
}

/// Refine a per-scale sequence and return a JSON array of refined records.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `senz_free_string`.
/// - Returns NULL on error; call `senz_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn senz_refine_scale(json: *const c_char) -> *mut c_char {
    run_json(json, refine_scale_json)
}

/// Rank joint hypotheses and return a JSON array of `{senzList, prob}`.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `senz_free_string`.
/// - Returns NULL on error; call `senz_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn senz_rank_joint(json: *const c_char) -> *mut c_char {
    run_json(json, rank_joint_json)
}

// ============================================================================
// Envelope API
// ============================================================================

/// Run `op` (`align`, `refine` or `rank`) and return a response envelope.
///
/// Request failures are reported inside the envelope, so this only returns
/// NULL when a pointer is invalid.
///
/// # Safety
/// - `op` and `json` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `senz_free_string`.
#[no_mangle]
pub unsafe extern "C" fn senz_handle_request(op: *const c_char, json: *const c_char) -> *mut c_char {
    clear_last_error();

    let op_str = match cstr_to_string(op) {
        Some(s) => s,
        None => {
            set_last_error("Invalid operation string pointer");
            return ptr::null_mut();
        }
    };

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    let envelope = match op_str.parse::<Operation>() {
        Ok(op) => SenzProcessor::new().handle(op, &json_str, None),
        Err(e) => Envelope::from_error(&e),
    };

    match envelope.to_json() {
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

/// Free a string returned by Senz functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Senz function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn senz_free_string(ptr: *mut c_char) {
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
/// - The returned pointer is valid until the next Senz function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn senz_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the Senz Core library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn senz_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::ffi::CString;

    fn rank_json() -> CString {
        CString::new(
            r#"{
            "probSenzList": [{
                "motion": {"Running": 1.29321983128e-78},
                "location": {"school": 3.14},
                "sound": {"talk": 2.3324e-12}
            }],
            "strategy": "SELECT_MAX_PROB",
            "logFloor": -207.23265836946447
        }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_ffi_rank_joint() {
        let json = rank_json();

        unsafe {
            let result = senz_rank_joint(json.as_ptr());
            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            let value: Value = serde_json::from_str(result_str).unwrap();
            let prob = value[0]["prob"].as_f64().unwrap();
            assert!((prob - -204.9844026873817).abs() < 1e-9);
            assert_eq!(value[0]["senzList"][0]["motion"], "Running");

            senz_free_string(result);
        }
    }

    #[test]
    fn test_ffi_align_and_refine() {
        let align = CString::new(
            r#"{"filter": 1, "timelines": {"PK": [{"timestamp": 1}], "SK": []}}"#,
        )
        .unwrap();
        let refine = CString::new(
            r#"{"scaleType": "perHourScale", "startScaleValue": 5, "endScaleValue": 5, "senzList": []}"#,
        )
        .unwrap();

        unsafe {
            let result = senz_align_timelines(align.as_ptr());
            assert!(!result.is_null());
            let result_str = CStr::from_ptr(result).to_str().unwrap();
            assert!(result_str.contains("counterfeitObjectId"));
            senz_free_string(result);

            let result = senz_refine_scale(refine.as_ptr());
            assert!(!result.is_null());
            assert_eq!(CStr::from_ptr(result).to_str().unwrap(), "[]");
            senz_free_string(result);
        }
    }

    #[test]
    fn test_ffi_handle_request() {
        let op = CString::new("rank").unwrap();
        let json = rank_json();
        let bad_op = CString::new("log2rawsenz").unwrap();

        unsafe {
            let result = senz_handle_request(op.as_ptr(), json.as_ptr());
            assert!(!result.is_null());
            let envelope: Envelope =
                serde_json::from_str(CStr::from_ptr(result).to_str().unwrap()).unwrap();
            assert!(envelope.is_success());
            senz_free_string(result);

            let result = senz_handle_request(bad_op.as_ptr(), json.as_ptr());
            assert!(!result.is_null());
            let envelope: Envelope =
                serde_json::from_str(CStr::from_ptr(result).to_str().unwrap()).unwrap();
            assert_eq!(envelope.http_status(), 400);
            senz_free_string(result);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        unsafe {
            let invalid_json = CString::new("not json").unwrap();
            let result = senz_rank_joint(invalid_json.as_ptr());
            assert!(result.is_null());

            let error = senz_last_error();
            assert!(!error.is_null());

            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(error_str.contains("not a JSON object"));

            let result = senz_align_timelines(ptr::null());
            assert!(result.is_null());
            assert!(!senz_last_error().is_null());
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = senz_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert!(!version_str.is_empty());
        }
    }
}
