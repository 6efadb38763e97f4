//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible representations:
//! `*mut c_char` instead of `String`, pointer + length instead of `Vec`, and
//! enums with explicit discriminants. Conversions live here to keep `lib.rs`
//! focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use httpkit_core::{HeaderList, HeaderLookup, HttpError, HttpMethod, Session};

/// Opaque handle to a `Session`. C callers receive a pointer to this and pass
/// it back into every FFI function.
pub struct FfiSession {
    pub(crate) inner: Session,
    pub(crate) last_error: Option<String>,
}

impl FfiSession {
    pub(crate) fn new(inner: Session) -> Self {
        Self {
            inner,
            last_error: None,
        }
    }
}

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Patch = 3,
    Delete = 4,
}

impl From<FfiHttpMethod> for HttpMethod {
    fn from(m: FfiHttpMethod) -> Self {
        match m {
            FfiHttpMethod::Get => HttpMethod::Get,
            FfiHttpMethod::Post => HttpMethod::Post,
            FfiHttpMethod::Put => HttpMethod::Put,
            FfiHttpMethod::Patch => HttpMethod::Patch,
            FfiHttpMethod::Delete => HttpMethod::Delete,
        }
    }
}

/// Outcome of an FFI call.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    NullArg = 1,
    InvalidArg = 2,
    InvalidUrl = 3,
    Transport = 4,
    Encode = 5,
    Decode = 6,
    UnexpectedJson = 7,
    NoResponse = 8,
    Panic = 9,
}

impl From<&HttpError> for FfiErrorCode {
    fn from(err: &HttpError) -> Self {
        match err {
            HttpError::InvalidUrl { .. } => FfiErrorCode::InvalidUrl,
            HttpError::Transport(_) => FfiErrorCode::Transport,
            HttpError::Encode(_) => FfiErrorCode::Encode,
            HttpError::Decode(_) => FfiErrorCode::Decode,
            HttpError::UnexpectedJson { .. } => FfiErrorCode::UnexpectedJson,
            HttpError::NoResponse => FfiErrorCode::NoResponse,
        }
    }
}

/// A single header as a pair of C strings.
///
/// On input (`httpkit_request`) the strings are borrowed from the caller.
/// On output (`httpkit_headers`) they are owned by the returned list.
#[repr(C)]
pub struct FfiHeader {
    pub name: *mut c_char,
    pub value: *mut c_char,
}

/// Header fields of the first response block, status line first under
/// `http_code`. Free with `httpkit_free_headers`.
#[repr(C)]
pub struct FfiHeaderList {
    pub items: *mut FfiHeader,
    pub len: u32,
}

impl FfiHeaderList {
    pub(crate) fn from_core(headers: &HeaderList) -> *mut Self {
        let items: Box<[FfiHeader]> = headers
            .iter()
            .map(|(name, value)| FfiHeader {
                name: to_c_string(name),
                value: to_c_string(value),
            })
            .collect();

        let len = items.len() as u32;
        let ptr = Box::into_raw(items) as *mut FfiHeader;
        Box::into_raw(Box::new(FfiHeaderList { items: ptr, len }))
    }
}

/// Tag of an `FfiHeaderLookup`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiLookupTag {
    Found = 0,
    Missing = 1,
    NoHeaders = 2,
}

/// Result of looking up one header. `value` is non-null only for `Found`
/// and must be released with `httpkit_free_string`.
#[repr(C)]
pub struct FfiHeaderLookup {
    pub tag: FfiLookupTag,
    pub value: *mut c_char,
}

impl From<HeaderLookup<'_>> for FfiHeaderLookup {
    fn from(lookup: HeaderLookup<'_>) -> Self {
        match lookup {
            HeaderLookup::Found(value) => FfiHeaderLookup {
                tag: FfiLookupTag::Found,
                value: to_c_string(value),
            },
            HeaderLookup::Missing => FfiHeaderLookup {
                tag: FfiLookupTag::Missing,
                value: std::ptr::null_mut(),
            },
            HeaderLookup::NoHeaders => FfiHeaderLookup {
                tag: FfiLookupTag::NoHeaders,
                value: std::ptr::null_mut(),
            },
        }
    }
}

/// Copy `s` into a heap C string owned by the caller. Text after an interior
/// NUL byte cannot be represented and is dropped.
pub(crate) fn to_c_string(s: &str) -> *mut c_char {
    let c = CString::new(s).unwrap_or_else(|err| {
        let pos = err.nul_position();
        let mut bytes = err.into_vec();
        bytes.truncate(pos);
        CString::new(bytes).unwrap_or_default()
    });
    c.into_raw()
}
