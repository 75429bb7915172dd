//! Core resolution types.
//!
//! This module defines the value types shared by the dispatcher and both
//! resolution engines: the [`Name`] wrapper, the [`Resolving`] future alias,
//! per-answer [`Diagnostics`], and the owned record payload structs.

use crate::base::neterror::NetError;
use std::{fmt, future::Future, net::IpAddr, pin::Pin, str::FromStr};

/// A domain name to resolve.
///
/// This is a lightweight wrapper around a hostname string that provides
/// a type-safe way to pass domain names to resolvers.
#[derive(Clone, Hash, Eq, PartialEq)]
pub struct Name {
    host: Box<str>,
}

impl Name {
    /// Creates a new [`Name`] from any string-like type.
    #[inline]
    pub fn new(host: impl Into<Box<str>>) -> Self {
        Self { host: host.into() }
    }

    /// View the hostname as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.host
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Name::new(value)
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Name::new(value)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.host, f)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.host, f)
    }
}

/// Alias for the boxed `Future` type returned by every lookup operation.
///
/// Dropping the future cancels the lookup; no other cancellation channel
/// exists or is needed.
pub type Resolving<T> = Pin<Box<dyn Future<Output = Result<T, NetError>> + Send>>;

/// Diagnostic metadata attached to a lookup answer.
///
/// Returned alongside the payload of every record operation and produced by
/// whichever engine handled the call. The dispatcher passes it through
/// unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Whether the answer carried validated, authenticated data
    /// (the DNSSEC AD bit). Answers from local tables and from the system
    /// resolver are never reported as authenticated.
    pub authenticated: bool,
}

impl Diagnostics {
    /// Diagnostics for an answer that was not validated.
    pub fn unvalidated() -> Self {
        Self {
            authenticated: false,
        }
    }
}

/// A single SRV record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SrvRecord {
    pub target: Name,
    pub port: u16,
    pub priority: u16,
    pub weight: u16,
}

/// A single MX record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MxRecord {
    pub host: Name,
    pub pref: u16,
}

/// A single NS record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NsRecord {
    pub host: Name,
}

/// A single TLSA record (RFC 6698).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TlsaRecord {
    pub usage: u8,
    pub selector: u8,
    pub matching_type: u8,
    pub certificate: Vec<u8>,
}

/// Address family filter for IP lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddrFamily {
    /// Both IPv4 and IPv6 answers.
    Any,
    /// IPv4 answers only.
    Ipv4,
    /// IPv6 answers only.
    Ipv6,
}

impl AddrFamily {
    /// Whether `addr` belongs to this family.
    pub fn matches(&self, addr: &IpAddr) -> bool {
        match self {
            AddrFamily::Any => true,
            AddrFamily::Ipv4 => addr.is_ipv4(),
            AddrFamily::Ipv6 => addr.is_ipv6(),
        }
    }
}

impl FromStr for AddrFamily {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ip" => Ok(AddrFamily::Any),
            "ip4" => Ok(AddrFamily::Ipv4),
            "ip6" => Ok(AddrFamily::Ipv6),
            other => Err(NetError::UnknownNetwork(other.to_string())),
        }
    }
}

/// Transport network for port lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Network {
    Tcp,
    Udp,
}

impl Network {
    /// The registry name of the network, as it appears in `/etc/services`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Tcp => "tcp",
            Network::Udp => "udp",
        }
    }
}

impl FromStr for Network {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Family-qualified names share their base network's service registry.
        match s {
            "tcp" | "tcp4" | "tcp6" => Ok(Network::Tcp),
            "udp" | "udp4" | "udp6" => Ok(Network::Udp),
            other => Err(NetError::UnknownNetwork(other.to_string())),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
