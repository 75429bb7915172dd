//! Ergonomic error context helpers.
//!
//! Provides extension traits for adding context to `Result` types,
//! converting IO errors into context-rich `NetError` variants.

use crate::base::neterror::NetError;
use std::io;

/// Extension trait for adding context to IO Results.
pub trait IoResultExt<T> {
    /// Add DNS resolution context to an IO error.
    ///
    /// # Example
    /// ```ignore
    /// use netresolve::base::context::IoResultExt;
    ///
    /// let addrs = (host, 0u16).to_socket_addrs().dns_context(host)?;
    /// // Error: "lookup example.com: no such host"
    /// ```
    fn dns_context(self, domain: &str) -> Result<T, NetError>;
}

impl<T> IoResultExt<T> for Result<T, io::Error> {
    fn dns_context(self, domain: &str) -> Result<T, NetError> {
        self.map_err(|e| NetError::dns_failed(domain, e))
    }
}
