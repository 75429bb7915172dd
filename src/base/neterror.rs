use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Resolution errors, with numeric codes matching Chromium's
/// `net_error_list.h` where an equivalent exists.
///
/// The dispatch layer never constructs these itself; they originate in
/// whichever engine handled the lookup and propagate to the caller
/// unchanged.
#[derive(Debug, Error, Clone)]
pub enum NetError {
    #[error("Name not resolved")]
    NameNotResolved,
    #[error("lookup {domain}: {source}")]
    NameNotResolvedFor {
        domain: String,
        source: Arc<io::Error>,
    },
    #[error("Name resolution failed")]
    NameResolutionFailed,
    #[error("reverse lookup {addr}: {reason}")]
    ReverseLookupFailed { addr: String, reason: String },
    #[error("unknown port for {network}/{service}")]
    UnknownService { network: String, service: String },
    #[error("unknown network {0}")]
    UnknownNetwork(String),
    #[error("Address invalid")]
    AddressInvalid,
    #[error("Address unreachable")]
    AddressUnreachable,
    #[error("Internet disconnected")]
    InternetDisconnected,
    #[error("DNS lookup timed out")]
    DnsTimedOut,
    #[error("DNS response malformed")]
    DnsMalformedResponse,
}

impl NetError {
    /// Chromium error code for this variant, for interop with callers that
    /// speak `net_error_list.h`. Variants without a Chromium equivalent use
    /// custom codes starting at -900.
    pub fn as_i32(&self) -> i32 {
        match self {
            NetError::NameNotResolved => -105,
            NetError::NameNotResolvedFor { .. } => -105,
            NetError::InternetDisconnected => -106,
            NetError::AddressInvalid => -108,
            NetError::AddressUnreachable => -109,
            NetError::NameResolutionFailed => -137,
            NetError::DnsTimedOut => -803,
            NetError::DnsMalformedResponse => -800,
            NetError::ReverseLookupFailed { .. } => -905,
            NetError::UnknownService { .. } => -906,
            NetError::UnknownNetwork(_) => -907,
        }
    }

    /// Wraps an IO error from a failed forward lookup with its domain.
    pub fn dns_failed(domain: impl Into<String>, err: io::Error) -> Self {
        NetError::NameNotResolvedFor {
            domain: domain.into(),
            source: Arc::new(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chromium_codes() {
        assert_eq!(NetError::NameNotResolved.as_i32(), -105);
        assert_eq!(NetError::NameResolutionFailed.as_i32(), -137);
        assert_eq!(
            NetError::dns_failed("example.com", io::Error::new(io::ErrorKind::NotFound, "x"))
                .as_i32(),
            -105
        );
    }

    #[test]
    fn test_display_includes_domain() {
        let err = NetError::dns_failed(
            "unknown.example.com",
            io::Error::new(io::ErrorKind::NotFound, "no such host"),
        );
        let msg = err.to_string();
        assert!(msg.contains("unknown.example.com"));
        assert!(msg.contains("no such host"));
    }
}
