//! C ABI over [`Store`], matching `ditto.h`.
//!
//! Every function returns a [`Status`] code. Null pointers, non-UTF-8 keys
//! and panics are reported as `GenericFailure`; nothing unwinds across the
//! boundary.
#![allow(non_camel_case_types)]

use crate::error::{Status, StoreError};
use crate::store::Store;
use crate::types::SubscriptionId;
use std::ffi::{c_char, c_void, CStr, CString};
use std::panic::{self, AssertUnwindSafe};

/// Opaque store handle.
pub type ditto_db_t = Store;

/// Change callback: `(user_data, key)`.
pub type ditto_on_change_cb =
    Option<unsafe extern "C" fn(user_data: *mut c_void, key: *const c_char)>;

static VERSION_CSTR: &CStr = c"1.0.0";

const FAILURE: i32 = Status::GenericFailure as i32;

/// Opaque pointer handed back to the callback that registered it.
struct UserData(*mut c_void);

// SAFETY: the store never dereferences the pointer; thread-safety of the
// pointee is the callback's contract, as documented in `ditto.h`.
unsafe impl Send for UserData {}
unsafe impl Sync for UserData {}

impl UserData {
    fn as_ptr(&self) -> *mut c_void {
        self.0
    }
}

fn guarded(f: impl FnOnce() -> i32) -> i32 {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or(FAILURE)
}

/// # Safety
/// `key` must be null or a valid NUL-terminated string.
unsafe fn key_arg<'a>(key: *const c_char) -> Option<&'a str> {
    if key.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(key) }.to_str().ok()
}

#[no_mangle]
/// # Safety
/// `path` must be a valid NUL-terminated string and `out_db` a valid pointer
/// to write the handle into.
pub unsafe extern "C" fn ditto_open(path: *const c_char, out_db: *mut *mut ditto_db_t) -> i32 {
    if path.is_null() || out_db.is_null() {
        return FAILURE;
    }
    let path = unsafe { CStr::from_ptr(path) }.to_string_lossy().into_owned();

    guarded(|| match Store::open(path) {
        Ok(store) => {
            unsafe { *out_db = Box::into_raw(Box::new(store)) };
            Status::Success.code()
        }
        Err(e) => e.status().code(),
    })
}

#[no_mangle]
/// # Safety
/// `db` must be null or a handle from `ditto_open` not yet closed. The handle
/// is invalid afterwards.
pub unsafe extern "C" fn ditto_close(db: *mut ditto_db_t) {
    if db.is_null() {
        return;
    }
    let store = unsafe { Box::from_raw(db) };
    let _ = panic::catch_unwind(AssertUnwindSafe(move || store.close()));
}

#[no_mangle]
/// # Safety
/// `db` must be a live handle, `key` a NUL-terminated string and `data`
/// valid for reads of `len` bytes.
pub unsafe extern "C" fn ditto_put(
    db: *mut ditto_db_t,
    key: *const c_char,
    data: *const u8,
    len: usize,
) -> i32 {
    if db.is_null() || data.is_null() {
        return FAILURE;
    }
    let Some(key) = (unsafe { key_arg(key) }) else {
        return FAILURE;
    };
    let store = unsafe { &*db };
    let value = unsafe { std::slice::from_raw_parts(data, len) };

    guarded(|| Status::of(&store.put(key, value)).code())
}

#[no_mangle]
/// # Safety
/// `db` must be a live handle, `key` a NUL-terminated string, `inout_len` a
/// valid pointer, and `out_buf` null or valid for writes of `*inout_len`
/// bytes.
pub unsafe extern "C" fn ditto_get(
    db: *mut ditto_db_t,
    key: *const c_char,
    out_buf: *mut u8,
    inout_len: *mut usize,
) -> i32 {
    if db.is_null() || inout_len.is_null() {
        return FAILURE;
    }
    let Some(key) = (unsafe { key_arg(key) }) else {
        return FAILURE;
    };
    let store = unsafe { &*db };
    let buf = if out_buf.is_null() {
        None
    } else {
        Some(unsafe { std::slice::from_raw_parts_mut(out_buf, *inout_len) })
    };

    guarded(|| match store.get(key, buf) {
        Ok(len) => {
            unsafe { *inout_len = len };
            Status::Success.code()
        }
        Err(StoreError::BufferTooSmall { required }) => {
            unsafe { *inout_len = required };
            Status::BufferTooSmall.code()
        }
        Err(e) => e.status().code(),
    })
}

#[no_mangle]
/// # Safety
/// `db` must be a live handle and `key` a NUL-terminated string.
pub unsafe extern "C" fn ditto_delete(db: *mut ditto_db_t, key: *const c_char) -> i32 {
    if db.is_null() {
        return FAILURE;
    }
    let Some(key) = (unsafe { key_arg(key) }) else {
        return FAILURE;
    };
    let store = unsafe { &*db };

    guarded(|| Status::of(&store.delete(key)).code())
}

#[no_mangle]
/// # Safety
/// `db` must be a live handle and `out_sub_id` a valid pointer. `cb` is
/// called with `user_data` from whichever thread performs a mutation.
pub unsafe extern "C" fn ditto_subscribe(
    db: *mut ditto_db_t,
    cb: ditto_on_change_cb,
    user_data: *mut c_void,
    out_sub_id: *mut i32,
) -> i32 {
    if db.is_null() || out_sub_id.is_null() {
        return FAILURE;
    }
    let Some(cb) = cb else {
        return FAILURE;
    };
    let store = unsafe { &*db };
    let user_data = UserData(user_data);

    guarded(|| {
        let subscribed = store.subscribe(move |key: &str| {
            // Keys arrived as C strings, so they hold no interior NUL.
            if let Ok(key) = CString::new(key) {
                unsafe { cb(user_data.as_ptr(), key.as_ptr()) };
            }
        });
        let id = match subscribed {
            Ok(id) => id,
            Err(e) => return e.status().code(),
        };
        match i32::try_from(id.0) {
            Ok(raw) => {
                unsafe { *out_sub_id = raw };
                Status::Success.code()
            }
            Err(_) => {
                let _ = store.unsubscribe(id);
                FAILURE
            }
        }
    })
}

#[no_mangle]
/// # Safety
/// `db` must be a live handle.
pub unsafe extern "C" fn ditto_unsubscribe(db: *mut ditto_db_t, sub_id: i32) -> i32 {
    if db.is_null() {
        return FAILURE;
    }
    let store = unsafe { &*db };
    let Ok(id) = u64::try_from(sub_id) else {
        return Status::NotFound.code();
    };

    guarded(|| Status::of(&store.unsubscribe(SubscriptionId(id))).code())
}

/// Static, NUL-terminated version string. Do not free.
#[no_mangle]
pub extern "C" fn ditto_version() -> *const c_char {
    VERSION_CSTR.as_ptr()
}
