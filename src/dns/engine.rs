//! Engine seams.
//!
//! Two resolution strategies sit behind these traits: the self-contained
//! built-in engine ([`BuiltinResolve`]) and the engine delegated to the
//! operating system's resolver ([`SystemResolve`]). The dispatcher holds
//! both behind trait objects and picks one per call; tests substitute
//! doubles at the same seam.
//!
//! All methods return boxed futures ([`Resolving`]) so the traits stay
//! object-safe, and take owned arguments so the futures are `'static`.

use super::order::{Conf, SourceOrder};
use super::resolve::{
    AddrFamily, Diagnostics, MxRecord, Name, Network, NsRecord, Resolving, SrvRecord, TlsaRecord,
};
use std::net::IpAddr;
use std::sync::Arc;

/// The self-contained resolution engine.
///
/// Covers the full record surface. Operations that the dispatcher routes
/// through an order decision additionally receive the source order and the
/// configuration snapshot, forwarded unchanged.
pub trait BuiltinResolve: Send + Sync {
    /// Forward host lookup: all addresses for `host`.
    fn lookup_host(
        &self,
        host: Name,
        order: SourceOrder,
        conf: Arc<Conf>,
    ) -> Resolving<(Vec<IpAddr>, Diagnostics)>;

    /// Forward IP lookup restricted to an address family.
    fn lookup_ip(
        &self,
        family: AddrFamily,
        host: Name,
        order: SourceOrder,
        conf: Arc<Conf>,
    ) -> Resolving<(Vec<IpAddr>, Diagnostics)>;

    /// Service name to port number.
    fn lookup_port(&self, network: Network, service: String) -> Resolving<u16>;

    /// Canonical name lookup.
    fn lookup_cname(
        &self,
        name: Name,
        order: SourceOrder,
        conf: Arc<Conf>,
    ) -> Resolving<(Name, Diagnostics)>;

    /// SRV lookup; returns the queried name alongside the records.
    fn lookup_srv(
        &self,
        service: String,
        proto: String,
        name: Name,
    ) -> Resolving<(Name, Vec<SrvRecord>, Diagnostics)>;

    /// MX lookup.
    fn lookup_mx(&self, name: Name) -> Resolving<(Vec<MxRecord>, Diagnostics)>;

    /// NS lookup.
    fn lookup_ns(&self, name: Name) -> Resolving<(Vec<NsRecord>, Diagnostics)>;

    /// TXT lookup; each record's character strings are concatenated.
    fn lookup_txt(&self, name: Name) -> Resolving<(Vec<String>, Diagnostics)>;

    /// Reverse (PTR) lookup.
    fn lookup_addr(
        &self,
        addr: IpAddr,
        order: SourceOrder,
        conf: Arc<Conf>,
    ) -> Resolving<(Vec<Name>, Diagnostics)>;

    /// TLSA lookup for `_port._proto.host`.
    fn lookup_tlsa(
        &self,
        port: u16,
        proto: String,
        host: Name,
    ) -> Resolving<(Vec<TlsaRecord>, Diagnostics)>;
}

/// The engine delegated to the operating system's resolver.
///
/// Only the operations with an OS-level equivalent exist here; record types
/// the OS cannot answer are never routed this way.
pub trait SystemResolve: Send + Sync {
    /// Forward host lookup via the system resolver.
    fn lookup_host(&self, host: Name) -> Resolving<(Vec<IpAddr>, Diagnostics)>;

    /// Forward IP lookup restricted to an address family.
    fn lookup_ip(&self, family: AddrFamily, host: Name) -> Resolving<(Vec<IpAddr>, Diagnostics)>;

    /// Canonical name lookup via the system resolver.
    fn lookup_cname(&self, name: Name) -> Resolving<(Name, Diagnostics)>;

    /// Reverse lookup via the system resolver.
    fn lookup_addr(&self, addr: IpAddr) -> Resolving<(Vec<Name>, Diagnostics)>;
}

/// Blanket implementation for Arc-wrapped built-in engines.
impl<E: BuiltinResolve + ?Sized> BuiltinResolve for Arc<E> {
    fn lookup_host(
        &self,
        host: Name,
        order: SourceOrder,
        conf: Arc<Conf>,
    ) -> Resolving<(Vec<IpAddr>, Diagnostics)> {
        (**self).lookup_host(host, order, conf)
    }

    fn lookup_ip(
        &self,
        family: AddrFamily,
        host: Name,
        order: SourceOrder,
        conf: Arc<Conf>,
    ) -> Resolving<(Vec<IpAddr>, Diagnostics)> {
        (**self).lookup_ip(family, host, order, conf)
    }

    fn lookup_port(&self, network: Network, service: String) -> Resolving<u16> {
        (**self).lookup_port(network, service)
    }

    fn lookup_cname(
        &self,
        name: Name,
        order: SourceOrder,
        conf: Arc<Conf>,
    ) -> Resolving<(Name, Diagnostics)> {
        (**self).lookup_cname(name, order, conf)
    }

    fn lookup_srv(
        &self,
        service: String,
        proto: String,
        name: Name,
    ) -> Resolving<(Name, Vec<SrvRecord>, Diagnostics)> {
        (**self).lookup_srv(service, proto, name)
    }

    fn lookup_mx(&self, name: Name) -> Resolving<(Vec<MxRecord>, Diagnostics)> {
        (**self).lookup_mx(name)
    }

    fn lookup_ns(&self, name: Name) -> Resolving<(Vec<NsRecord>, Diagnostics)> {
        (**self).lookup_ns(name)
    }

    fn lookup_txt(&self, name: Name) -> Resolving<(Vec<String>, Diagnostics)> {
        (**self).lookup_txt(name)
    }

    fn lookup_addr(
        &self,
        addr: IpAddr,
        order: SourceOrder,
        conf: Arc<Conf>,
    ) -> Resolving<(Vec<Name>, Diagnostics)> {
        (**self).lookup_addr(addr, order, conf)
    }

    fn lookup_tlsa(
        &self,
        port: u16,
        proto: String,
        host: Name,
    ) -> Resolving<(Vec<TlsaRecord>, Diagnostics)> {
        (**self).lookup_tlsa(port, proto, host)
    }
}

/// Blanket implementation for Arc-wrapped system engines.
impl<E: SystemResolve + ?Sized> SystemResolve for Arc<E> {
    fn lookup_host(&self, host: Name) -> Resolving<(Vec<IpAddr>, Diagnostics)> {
        (**self).lookup_host(host)
    }

    fn lookup_ip(&self, family: AddrFamily, host: Name) -> Resolving<(Vec<IpAddr>, Diagnostics)> {
        (**self).lookup_ip(family, host)
    }

    fn lookup_cname(&self, name: Name) -> Resolving<(Name, Diagnostics)> {
        (**self).lookup_cname(name)
    }

    fn lookup_addr(&self, addr: IpAddr) -> Resolving<(Vec<Name>, Diagnostics)> {
        (**self).lookup_addr(addr)
    }
}
