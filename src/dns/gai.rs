//! System resolution engine using getaddrinfo / getnameinfo.
//!
//! The delegated strategy: every call is handed to the operating system's
//! native resolver, executed in a thread pool to avoid blocking the async
//! runtime. Used when the order decision routes around the built-in engine,
//! typically for names only the system can answer (mDNS, NIS, non-DNS
//! nsswitch sources).
//!
//! Only host, IP, canonical-name, and reverse lookups exist here; record
//! types without an OS-level equivalent never reach this engine.

use super::engine::SystemResolve;
use super::resolve::{AddrFamily, Diagnostics, Name, Resolving};
use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use std::ffi::{CStr, CString};
use std::io;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};

/// Buffer size for getnameinfo host results (NI_MAXHOST).
const MAX_HOST: usize = 1025;

/// System resolver engine.
///
/// Each call spawns a blocking task wrapping the libc resolver entry
/// points. For high-throughput scenarios prefer the built-in engine, which
/// is fully async.
#[derive(Clone, Debug, Default)]
pub struct SystemEngine;

impl SystemEngine {
    /// Creates a new `SystemEngine`.
    pub fn new() -> Self {
        Self
    }
}

fn resolve_addrs(host: &str) -> Result<Vec<IpAddr>, io::Error> {
    let addrs = (host, 0u16).to_socket_addrs()?;
    let mut out: Vec<IpAddr> = Vec::new();
    for addr in addrs {
        let ip = addr.ip();
        if !out.contains(&ip) {
            out.push(ip);
        }
    }
    Ok(out)
}

fn gai_error(rc: i32) -> io::Error {
    let reason = unsafe { CStr::from_ptr(libc::gai_strerror(rc)) }
        .to_string_lossy()
        .into_owned();
    io::Error::new(io::ErrorKind::NotFound, reason)
}

/// Reverse lookup through `getnameinfo`, requiring a real name (no numeric
/// fallback).
fn reverse_blocking(addr: IpAddr) -> Result<String, io::Error> {
    let sa = socket2::SockAddr::from(SocketAddr::new(addr, 0));
    let mut host = [0 as libc::c_char; MAX_HOST];

    let rc = unsafe {
        libc::getnameinfo(
            sa.as_ptr().cast(),
            sa.len(),
            host.as_mut_ptr(),
            host.len() as libc::socklen_t,
            std::ptr::null_mut(),
            0,
            libc::NI_NAMEREQD,
        )
    };
    if rc != 0 {
        return Err(gai_error(rc));
    }

    let name = unsafe { CStr::from_ptr(host.as_ptr()) }
        .to_string_lossy()
        .into_owned();
    Ok(name)
}

/// Canonical name through `getaddrinfo` with `AI_CANONNAME`.
fn canonical_blocking(host: &str) -> Result<String, io::Error> {
    let c_host = CString::new(host)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "hostname contains NUL"))?;

    let mut hints: libc::addrinfo = unsafe { std::mem::zeroed() };
    hints.ai_flags = libc::AI_CANONNAME;
    hints.ai_family = libc::AF_UNSPEC;
    hints.ai_socktype = libc::SOCK_STREAM;

    let mut res: *mut libc::addrinfo = std::ptr::null_mut();
    let rc = unsafe { libc::getaddrinfo(c_host.as_ptr(), std::ptr::null(), &hints, &mut res) };
    if rc != 0 {
        return Err(gai_error(rc));
    }

    let mut name = None;
    unsafe {
        if !res.is_null() && !(*res).ai_canonname.is_null() {
            name = Some(
                CStr::from_ptr((*res).ai_canonname)
                    .to_string_lossy()
                    .into_owned(),
            );
        }
        libc::freeaddrinfo(res);
    }

    // getaddrinfo may omit the canonical name for addresses already in
    // canonical form.
    Ok(name.unwrap_or_else(|| host.to_string()))
}

impl SystemResolve for SystemEngine {
    fn lookup_host(&self, host: Name) -> Resolving<(Vec<IpAddr>, Diagnostics)> {
        self.lookup_ip(AddrFamily::Any, host)
    }

    fn lookup_ip(&self, family: AddrFamily, host: Name) -> Resolving<(Vec<IpAddr>, Diagnostics)> {
        Box::pin(async move {
            let domain = host.as_str().to_string();
            let blocking_domain = domain.clone();

            let result = tokio::task::spawn_blocking(move || {
                tracing::debug!(host = %blocking_domain, "resolving via getaddrinfo");
                resolve_addrs(&blocking_domain)
            })
            .await;

            // Handle task join error (cancellation, panic)
            let addrs = result
                .map_err(|e| {
                    tracing::error!(error = %e, "system resolution task failed");
                    NetError::NameNotResolved
                })?
                .dns_context(&domain)?;

            let addrs: Vec<IpAddr> = addrs.into_iter().filter(|a| family.matches(a)).collect();
            if addrs.is_empty() {
                return Err(NetError::dns_failed(
                    &domain,
                    io::Error::new(
                        io::ErrorKind::NotFound,
                        "No addresses returned by getaddrinfo",
                    ),
                ));
            }

            tracing::debug!(domain = %domain, count = addrs.len(), "system resolution complete");
            Ok((addrs, Diagnostics::unvalidated()))
        })
    }

    fn lookup_cname(&self, name: Name) -> Resolving<(Name, Diagnostics)> {
        Box::pin(async move {
            let domain = name.as_str().to_string();
            let blocking_domain = domain.clone();

            let result = tokio::task::spawn_blocking(move || {
                tracing::debug!(host = %blocking_domain, "canonical name via getaddrinfo");
                canonical_blocking(&blocking_domain)
            })
            .await;

            let canonical = result
                .map_err(|e| {
                    tracing::error!(error = %e, "system resolution task failed");
                    NetError::NameNotResolved
                })?
                .dns_context(&domain)?;

            Ok((Name::new(canonical), Diagnostics::unvalidated()))
        })
    }

    fn lookup_addr(&self, addr: IpAddr) -> Resolving<(Vec<Name>, Diagnostics)> {
        Box::pin(async move {
            let result = tokio::task::spawn_blocking(move || {
                tracing::debug!(addr = %addr, "reverse via getnameinfo");
                reverse_blocking(addr)
            })
            .await;

            let name = result
                .map_err(|e| {
                    tracing::error!(error = %e, "system resolution task failed");
                    NetError::NameNotResolved
                })?
                .map_err(|e| NetError::ReverseLookupFailed {
                    addr: addr.to_string(),
                    reason: e.to_string(),
                })?;

            Ok((vec![Name::new(name)], Diagnostics::unvalidated()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[tokio::test]
    async fn test_system_engine_localhost() {
        let engine = SystemEngine::new();
        let result = engine.lookup_host(Name::new("localhost")).await;

        // localhost should always resolve
        assert!(result.is_ok());
        let (addrs, diag) = result.unwrap();
        assert!(!addrs.is_empty());
        assert!(!diag.authenticated);
    }

    #[tokio::test]
    async fn test_family_filter() {
        let engine = SystemEngine::new();
        if let Ok((addrs, _)) = engine.lookup_ip(AddrFamily::Ipv4, Name::new("localhost")).await {
            assert!(addrs.iter().all(|a| a.is_ipv4()));
        } else {
            // Soft fail on IPv6-only systems.
            println!("no IPv4 loopback available");
        }
    }

    #[tokio::test]
    async fn test_reverse_loopback() {
        let engine = SystemEngine::new();
        let result = engine.lookup_addr(IpAddr::V4(Ipv4Addr::LOCALHOST)).await;

        // Most systems map 127.0.0.1 back to localhost via /etc/hosts.
        if let Ok((names, _)) = result {
            assert!(!names.is_empty());
        } else {
            println!("reverse lookup for loopback not configured");
        }
    }

    #[tokio::test]
    async fn test_canonical_of_localhost() {
        let engine = SystemEngine::new();
        if let Ok((canonical, _)) = engine.lookup_cname(Name::new("localhost")).await {
            assert!(!canonical.as_str().is_empty());
        } else {
            println!("canonical lookup for localhost not available");
        }
    }
}
