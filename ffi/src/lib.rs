//! C-ABI wrapper around `httpkit-core`.
//!
//! # Overview
//! Exposes a `Session` through `extern "C"` functions: create a session,
//! issue requests, then read the status code, headers and body of the last
//! response.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `httpkit_request` returns an `FfiErrorCode`; the message of the last
//!   failure is kept on the session and read with `httpkit_last_error`.
//! - The C caller owns all returned pointers and must call the matching
//!   `httpkit_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use httpkit_core::{ClientConfig, HeaderLookup, HttpMethod, Request, RequestData, Session};
use serde_json::Value;
use tracing::error;

use types::*;

// ---------------------------------------------------------------------------
// Session lifecycle
// ---------------------------------------------------------------------------

/// Create a new session.
///
/// `config_json` may be null for the default config, or a JSON object with
/// any of `timeout_secs`, `follow_redirects`, `max_redirects`, `verify_tls`,
/// `accept_encoding`. Returns null if the config cannot be parsed.
/// The caller must free the returned pointer with `httpkit_session_free`.
#[unsafe(no_mangle)]
pub extern "C" fn httpkit_session_new(config_json: *const c_char) -> *mut FfiSession {
    catch_unwind(|| {
        let config = match unsafe { read_str(config_json) } {
            Ok(None) => ClientConfig::default(),
            Ok(Some(raw)) => match ClientConfig::from_json(raw) {
                Ok(config) => config,
                Err(_) => return std::ptr::null_mut(),
            },
            Err(_) => return std::ptr::null_mut(),
        };
        let session = FfiSession::new(Session::with_config(config));
        Box::into_raw(Box::new(session))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a session created by `httpkit_session_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn httpkit_session_free(session: *mut FfiSession) {
    if !session.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(session) });
        });
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Issue a request and store its response on the session.
///
/// `data_json` may be null or a JSON object; it becomes the query string for
/// GET and the JSON body for POST/PUT/PATCH, and is ignored for DELETE.
/// `headers` points to `headers_len` name/value pairs and may be null when
/// `headers_len` is zero. Any failure clears the stored response.
#[unsafe(no_mangle)]
pub extern "C" fn httpkit_request(
    session: *mut FfiSession,
    method: FfiHttpMethod,
    url: *const c_char,
    data_json: *const c_char,
    headers: *const FfiHeader,
    headers_len: u32,
) -> FfiErrorCode {
    if session.is_null() {
        return FfiErrorCode::NullArg;
    }
    catch_unwind(AssertUnwindSafe(|| {
        let session = unsafe { &mut *session };
        session.last_error = None;

        let request = match unsafe { build_request(method, url, data_json, headers, headers_len) } {
            Ok(request) => request,
            Err((code, message)) => {
                session.inner.take_response();
                session.last_error = Some(message);
                return code;
            }
        };

        match session.inner.send(&request) {
            Ok(_) => FfiErrorCode::Ok,
            Err(err) => {
                session.last_error = Some(err.to_string());
                FfiErrorCode::from(&err)
            }
        }
    }))
    .unwrap_or_else(|_| {
        error!("panic in httpkit_request");
        FfiErrorCode::Panic
    })
}

/// Read the request arguments into a core `Request`.
unsafe fn build_request(
    method: FfiHttpMethod,
    url: *const c_char,
    data_json: *const c_char,
    headers: *const FfiHeader,
    headers_len: u32,
) -> Result<Request, (FfiErrorCode, String)> {
    let url = required_str(url, "url")?;
    let data = match read_str(data_json) {
        Ok(None) => RequestData::new(),
        Ok(Some(raw)) => parse_data(raw)?,
        Err(_) => return Err(invalid("data_json is not valid UTF-8")),
    };

    let mut request = Request::new(HttpMethod::from(method), url).data(data);
    if headers_len > 0 {
        if headers.is_null() {
            return Err((FfiErrorCode::NullArg, "null argument: headers".to_string()));
        }
        let pairs = std::slice::from_raw_parts(headers, headers_len as usize);
        for pair in pairs {
            let name = required_str(pair.name, "header name")?;
            let value = required_str(pair.value, "header value")?;
            request = request.header(name, value);
        }
    }
    Ok(request)
}

fn parse_data(raw: &str) -> Result<RequestData, (FfiErrorCode, String)> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(Value::Null) => Ok(RequestData::new()),
        Ok(_) => Err(invalid("data_json must be a JSON object")),
        Err(err) => Err((FfiErrorCode::Decode, format!("invalid data_json: {err}"))),
    }
}

fn invalid(message: &str) -> (FfiErrorCode, String) {
    (FfiErrorCode::InvalidArg, message.to_string())
}

/// Borrow a C string. Null maps to `Ok(None)`.
unsafe fn read_str<'a>(ptr: *const c_char) -> Result<Option<&'a str>, std::str::Utf8Error> {
    if ptr.is_null() {
        return Ok(None);
    }
    CStr::from_ptr(ptr).to_str().map(Some)
}

unsafe fn required_str<'a>(ptr: *const c_char, name: &str) -> Result<&'a str, (FfiErrorCode, String)> {
    match read_str(ptr) {
        Ok(Some(s)) => Ok(s),
        Ok(None) => Err((FfiErrorCode::NullArg, format!("null argument: {name}"))),
        Err(_) => Err((FfiErrorCode::InvalidArg, format!("{name} is not valid UTF-8"))),
    }
}

// ---------------------------------------------------------------------------
// Response accessors
// ---------------------------------------------------------------------------

/// Status code of the last response, or -1 if there is none.
#[unsafe(no_mangle)]
pub extern "C" fn httpkit_status_code(session: *const FfiSession) -> i32 {
    if session.is_null() {
        return -1;
    }
    catch_unwind(|| {
        let session = unsafe { &*session };
        session.inner.status_code().map_or(-1, i32::from)
    })
    .unwrap_or(-1)
}

/// Look up one header of the last response.
///
/// The tag tells "header missing" apart from "no response headers at all".
/// A non-null `value` must be freed with `httpkit_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn httpkit_header(session: *const FfiSession, name: *const c_char) -> FfiHeaderLookup {
    if session.is_null() {
        return HeaderLookup::NoHeaders.into();
    }
    catch_unwind(|| {
        let session = unsafe { &*session };
        let name = unsafe { read_str(name) }.ok().flatten().unwrap_or("");
        FfiHeaderLookup::from(session.inner.header(name))
    })
    .unwrap_or_else(|_| HeaderLookup::NoHeaders.into())
}

/// All headers of the first block of the last response, status line first.
///
/// Returns null if there is no response. Free with `httpkit_free_headers`.
#[unsafe(no_mangle)]
pub extern "C" fn httpkit_headers(session: *const FfiSession) -> *mut FfiHeaderList {
    if session.is_null() {
        return std::ptr::null_mut();
    }
    catch_unwind(|| {
        let session = unsafe { &*session };
        match session.inner.headers() {
            Some(headers) => FfiHeaderList::from_core(headers),
            None => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Raw body of the last response, or null if there is none.
/// Free with `httpkit_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn httpkit_body(session: *const FfiSession) -> *mut c_char {
    if session.is_null() {
        return std::ptr::null_mut();
    }
    catch_unwind(|| {
        let session = unsafe { &*session };
        session.inner.body().map_or(std::ptr::null_mut(), to_c_string)
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Message of the last failed `httpkit_request`, or null after a success.
/// Free with `httpkit_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn httpkit_last_error(session: *const FfiSession) -> *mut c_char {
    if session.is_null() {
        return std::ptr::null_mut();
    }
    catch_unwind(|| {
        let session = unsafe { &*session };
        session
            .last_error
            .as_deref()
            .map_or(std::ptr::null_mut(), to_c_string)
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a header list returned by `httpkit_headers`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn httpkit_free_headers(list: *mut FfiHeaderList) {
    if list.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let list = unsafe { Box::from_raw(list) };
        if list.items.is_null() {
            return;
        }
        let items = unsafe {
            Box::from_raw(std::ptr::slice_from_raw_parts_mut(list.items, list.len as usize))
        };
        for item in items.iter() {
            if !item.name.is_null() {
                drop(unsafe { CString::from_raw(item.name) });
            }
            if !item.value.is_null() {
                drop(unsafe { CString::from_raw(item.value) });
            }
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn httpkit_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Start the echo server on a random port and return its base URL.
    fn spawn_server() -> String {
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = std_listener.local_addr().unwrap();
        std_listener.set_nonblocking(true).unwrap();

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
                echo_server::run(listener).await
            })
            .unwrap();
        });

        format!("http://{addr}")
    }

    /// Copy and free a C string returned by the library.
    fn take_string(ptr: *mut c_char) -> Option<String> {
        if ptr.is_null() {
            return None;
        }
        let s = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string();
        httpkit_free_string(ptr);
        Some(s)
    }

    fn request(
        session: *mut FfiSession,
        method: FfiHttpMethod,
        url: &str,
        data: Option<&str>,
    ) -> FfiErrorCode {
        let url = CString::new(url).unwrap();
        let data = data.map(|d| CString::new(d).unwrap());
        httpkit_request(
            session,
            method,
            url.as_ptr(),
            data.as_ref().map_or(std::ptr::null(), |d| d.as_ptr()),
            std::ptr::null(),
            0,
        )
    }

    #[test]
    fn session_new_and_free() {
        let session = httpkit_session_new(std::ptr::null());
        assert!(!session.is_null());
        httpkit_session_free(session);
    }

    #[test]
    fn session_new_with_config() {
        let config = CString::new(r#"{"timeout_secs":5,"follow_redirects":false}"#).unwrap();
        let session = httpkit_session_new(config.as_ptr());
        assert!(!session.is_null());
        let cfg = unsafe { &*session }.inner.client().config().clone();
        assert_eq!(cfg.timeout_secs, 5);
        assert!(!cfg.follow_redirects);
        httpkit_session_free(session);
    }

    #[test]
    fn session_new_bad_config_returns_null() {
        let config = CString::new("{not json").unwrap();
        assert!(httpkit_session_new(config.as_ptr()).is_null());
    }

    #[test]
    fn session_free_null_is_safe() {
        httpkit_session_free(std::ptr::null_mut());
    }

    #[test]
    fn accessors_before_any_request() {
        let session = httpkit_session_new(std::ptr::null());
        assert_eq!(httpkit_status_code(session), -1);
        assert!(httpkit_headers(session).is_null());
        assert!(httpkit_body(session).is_null());
        assert!(httpkit_last_error(session).is_null());

        let name = CString::new("Content-Type").unwrap();
        let lookup = httpkit_header(session, name.as_ptr());
        assert_eq!(lookup.tag, FfiLookupTag::NoHeaders);
        assert!(lookup.value.is_null());
        httpkit_session_free(session);
    }

    #[test]
    fn null_arguments_are_reported() {
        assert_eq!(
            httpkit_request(std::ptr::null_mut(), FfiHttpMethod::Get, std::ptr::null(), std::ptr::null(), std::ptr::null(), 0),
            FfiErrorCode::NullArg
        );

        let session = httpkit_session_new(std::ptr::null());
        let code = httpkit_request(session, FfiHttpMethod::Get, std::ptr::null(), std::ptr::null(), std::ptr::null(), 0);
        assert_eq!(code, FfiErrorCode::NullArg);
        assert_eq!(take_string(httpkit_last_error(session)).unwrap(), "null argument: url");

        let url = CString::new("http://localhost/").unwrap();
        let code = httpkit_request(session, FfiHttpMethod::Get, url.as_ptr(), std::ptr::null(), std::ptr::null(), 2);
        assert_eq!(code, FfiErrorCode::NullArg);
        httpkit_session_free(session);
    }

    #[test]
    fn invalid_url_is_reported() {
        let session = httpkit_session_new(std::ptr::null());
        assert_eq!(request(session, FfiHttpMethod::Get, "not a url", None), FfiErrorCode::InvalidUrl);
        let message = take_string(httpkit_last_error(session)).unwrap();
        assert!(message.starts_with("invalid url"));
        httpkit_session_free(session);
    }

    #[test]
    fn data_must_be_a_json_object() {
        let session = httpkit_session_new(std::ptr::null());
        let url = "http://localhost/";
        assert_eq!(request(session, FfiHttpMethod::Post, url, Some("[1]")), FfiErrorCode::InvalidArg);
        assert_eq!(request(session, FfiHttpMethod::Post, url, Some("{oops")), FfiErrorCode::Decode);
        httpkit_session_free(session);
    }

    #[test]
    fn post_round_trip_against_echo_server() {
        let base = spawn_server();
        let session = httpkit_session_new(std::ptr::null());

        let url = CString::new(format!("{base}/echo")).unwrap();
        let data = CString::new(r#"{"title":"Buy milk"}"#).unwrap();
        let name = CString::new("X-Trace").unwrap();
        let value = CString::new("abc").unwrap();
        let headers = [FfiHeader {
            name: name.as_ptr() as *mut c_char,
            value: value.as_ptr() as *mut c_char,
        }];
        let code = httpkit_request(session, FfiHttpMethod::Post, url.as_ptr(), data.as_ptr(), headers.as_ptr(), 1);
        assert_eq!(code, FfiErrorCode::Ok);
        assert!(httpkit_last_error(session).is_null());
        assert_eq!(httpkit_status_code(session), 200);

        let body = take_string(httpkit_body(session)).unwrap();
        let echo: echo_server::Echo = serde_json::from_str(&body).unwrap();
        assert_eq!(echo.method, "POST");
        assert_eq!(echo.json, Some(serde_json::json!({"title": "Buy milk"})));
        assert_eq!(echo.headers["x-trace"], "abc");

        let key = CString::new("content-type").unwrap();
        let lookup = httpkit_header(session, key.as_ptr());
        assert_eq!(lookup.tag, FfiLookupTag::Found);
        assert_eq!(take_string(lookup.value).unwrap(), "application/json");

        let key = CString::new("Missing-Key").unwrap();
        let lookup = httpkit_header(session, key.as_ptr());
        assert_eq!(lookup.tag, FfiLookupTag::Missing);
        assert!(lookup.value.is_null());

        let list = httpkit_headers(session);
        assert!(!list.is_null());
        let list_ref = unsafe { &*list };
        assert!(list_ref.len >= 2);
        let items = unsafe { std::slice::from_raw_parts(list_ref.items, list_ref.len as usize) };
        let first_name = unsafe { CStr::from_ptr(items[0].name) }.to_str().unwrap();
        let first_value = unsafe { CStr::from_ptr(items[0].value) }.to_str().unwrap();
        assert_eq!(first_name, "http_code");
        assert_eq!(first_value, "HTTP/1.1 200 OK");
        httpkit_free_headers(list);

        httpkit_session_free(session);
    }

    #[test]
    fn get_sends_query_and_failure_clears_response() {
        let base = spawn_server();
        let session = httpkit_session_new(std::ptr::null());

        let code = request(session, FfiHttpMethod::Get, &format!("{base}/echo"), Some(r#"{"q":"x y"}"#));
        assert_eq!(code, FfiErrorCode::Ok);
        let body = take_string(httpkit_body(session)).unwrap();
        let echo: echo_server::Echo = serde_json::from_str(&body).unwrap();
        assert_eq!(echo.query, vec![("q".to_string(), "x y".to_string())]);

        let closed = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let code = request(session, FfiHttpMethod::Get, &format!("http://{closed}/"), None);
        assert_eq!(code, FfiErrorCode::Transport);
        assert_eq!(httpkit_status_code(session), -1);
        assert!(take_string(httpkit_last_error(session)).is_some());

        httpkit_session_free(session);
    }

    #[test]
    fn free_functions_accept_null() {
        httpkit_free_headers(std::ptr::null_mut());
        httpkit_free_string(std::ptr::null_mut());
    }

    #[test]
    fn header_is_generated_in_out_dir() {
        let header = std::fs::read_to_string(concat!(env!("OUT_DIR"), "/httpkit.h")).unwrap();
        assert!(header.contains("#ifndef HTTPKIT_H"));
        for name in ["httpkit_session_new", "httpkit_request", "httpkit_header", "httpkit_free_string"] {
            assert!(header.contains(name), "{name} missing from header");
        }
    }
}
