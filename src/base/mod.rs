//! Base types and error handling.
//!
//! Provides foundational types mirroring Chromium's `net/base/`:
//! - [`NetError`]: Network error codes matching `net_error_list.h`
//! - [`context::IoResultExt`]: Context helpers for IO errors
//!
//! [`NetError`]: neterror::NetError

pub mod context;
pub mod neterror;
