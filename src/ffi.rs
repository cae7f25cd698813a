//! FFI bindings for readpath
//!
//! This module provides C-compatible functions for calling readpath from other languages.
//! All functions use C strings (null-terminated) and return allocated memory that
//! must be freed by the caller using `readpath_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::pipeline::{trace_to_summary_json, AnalyticsProcessor};

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

/// Summarize a reading trace JSON and return the bare summary JSON.
///
/// # Safety
/// - `trace_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `readpath_free_string`.
/// - Returns NULL on error; call `readpath_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn readpath_summarize(trace_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(trace_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid trace JSON string pointer");
            return ptr::null_mut();
        }
    };

    match trace_to_summary_json(&json_str) {
        Ok(summary) => string_to_cstr(&summary),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateful Processor API
// ============================================================================

/// Opaque handle to an AnalyticsProcessor
pub struct AnalyticsProcessorHandle {
    processor: AnalyticsProcessor,
}

/// Create a new AnalyticsProcessor with the reference configuration.
///
/// # Safety
/// - Returns a pointer to a newly allocated processor.
/// - Must be freed with `readpath_processor_free`.
#[no_mangle]
pub unsafe extern "C" fn readpath_processor_new() -> *mut AnalyticsProcessorHandle {
    clear_last_error();

    let handle = Box::new(AnalyticsProcessorHandle {
        processor: AnalyticsProcessor::new(),
    });
    Box::into_raw(handle)
}

/// Free an AnalyticsProcessor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `readpath_processor_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn readpath_processor_free(processor: *mut AnalyticsProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Summarize a trace with a stateful processor and return the enveloped summary JSON.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `readpath_processor_new`.
/// - `trace_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `readpath_free_string`.
/// - Returns NULL on error; call `readpath_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn readpath_processor_process(
    processor: *mut AnalyticsProcessorHandle,
    trace_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &mut *processor;

    let json_str = match cstr_to_string(trace_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid trace JSON string pointer");
            return ptr::null_mut();
        }
    };

    match handle.processor.process(&json_str) {
        Ok(envelope) => string_to_cstr(&envelope),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Return the processor's current aggregate report as JSON.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `readpath_processor_new`.
/// - Returns a newly allocated string that must be freed with `readpath_free_string`.
/// - Returns NULL on error.
#[no_mangle]
pub unsafe extern "C" fn readpath_processor_report(
    processor: *const AnalyticsProcessorHandle,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &*processor;

    match serde_json::to_string(&handle.processor.report()) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a string returned by readpath functions.
///
/// # Safety
/// - `ptr` must be a pointer returned by a readpath function, or NULL.
#[no_mangle]
pub unsafe extern "C" fn readpath_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Get the last error message for the calling thread.
///
/// # Safety
/// - Returns a pointer valid until the next readpath call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn readpath_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match e.borrow().as_ref() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the readpath version.
///
/// # Safety
/// - Returns a static string; do NOT free it.
#[no_mangle]
pub unsafe extern "C" fn readpath_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trace_json() -> CString {
        CString::new(
            r#"{
                "samples": [
                    {"x": 5, "y": 5, "timestamp": 0},
                    {"x": 5, "y": 5, "timestamp": 500},
                    {"x": 105, "y": 5, "timestamp": 800}
                ],
                "regions": [
                    {"id": 0, "text": "One.", "left": 0, "top": 0, "right": 10, "bottom": 10},
                    {"id": 1, "text": "Two.", "left": 100, "top": 0, "right": 110, "bottom": 10}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_ffi_summarize() {
        let json = sample_trace_json();

        unsafe {
            let result = readpath_summarize(json.as_ptr());
            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            let summary: serde_json::Value = serde_json::from_str(result_str).unwrap();
            assert_eq!(summary["total_time_ms"], 800);
            assert_eq!(summary["sentences"][0]["dwell_ms"], 800);
            assert_eq!(summary["sentences"][1]["first_visit_order"], 1);

            readpath_free_string(result);
        }
    }

    #[test]
    fn test_ffi_processor_lifecycle() {
        unsafe {
            let processor = readpath_processor_new();
            assert!(!processor.is_null());

            let json = sample_trace_json();
            let result = readpath_processor_process(processor, json.as_ptr());
            assert!(!result.is_null());
            readpath_free_string(result);

            let report = readpath_processor_report(processor);
            assert!(!report.is_null());
            let report_str = CStr::from_ptr(report).to_str().unwrap();
            let value: serde_json::Value = serde_json::from_str(report_str).unwrap();
            assert_eq!(value["attempts"], 1);
            readpath_free_string(report);

            readpath_processor_free(processor);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        unsafe {
            let invalid_json = CString::new("not json").unwrap();
            let result = readpath_summarize(invalid_json.as_ptr());
            assert!(result.is_null());

            let error = readpath_last_error();
            assert!(!error.is_null());
            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(!error_str.is_empty());

            let null_result = readpath_processor_process(ptr::null_mut(), invalid_json.as_ptr());
            assert!(null_result.is_null());
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = readpath_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert_eq!(version_str, env!("CARGO_PKG_VERSION"));
        }
    }
}
