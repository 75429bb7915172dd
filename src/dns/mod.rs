//! Resolution Dispatch Module
//!
//! Routes every name-resolution request between two interchangeable
//! engines:
//! - Built-in async engine (hickory-dns; full record surface)
//! - System resolver engine (getaddrinfo / getnameinfo via thread pool)
//!
//! # Architecture
//!
//! [`HostResolver`] is the dispatcher: per call it obtains a
//! [`LookupOrder`] from the [`OrderDecider`] (or skips it for record types
//! that only the built-in engine can answer) and forwards the call, order,
//! and configuration snapshot to the chosen engine. The engine seams
//! ([`BuiltinResolve`], [`SystemResolve`]) are object-safe traits, so test
//! doubles and custom engines plug in interchangeably.
//!
//! The module also owns the process-local registry caches: protocol names
//! (`/etc/protocols`), service ports (`/etc/services`), and the hosts
//! table (`/etc/hosts`), each parsed at most once per process.
//!
//! # Example
//!
//! ```rust,ignore
//! use netresolve::dns::{AddrFamily, HostResolver};
//!
//! let resolver = HostResolver::new();
//! let (addrs, _diag) = resolver.lookup_ip(AddrFamily::Ipv4, "example.com").await?;
//! for addr in addrs {
//!     println!("Resolved: {}", addr);
//! }
//! ```

mod engine;
mod gai;
mod hickory;
mod hosts;
mod order;
mod protocols;
mod resolve;
mod resolver;
mod services;

pub use engine::{BuiltinResolve, SystemResolve};
pub use gai::SystemEngine;
pub use hickory::HickoryEngine;
pub use hosts::{lookup_static_addr, lookup_static_host, HostsTable};
pub use order::{Conf, LookupOrder, OrderDecider, SourceOrder, SystemOrderDecider};
pub use protocols::{lookup_protocol, ProtocolTable};
pub use resolve::{
    AddrFamily, Diagnostics, MxRecord, Name, Network, NsRecord, Resolving, SrvRecord, TlsaRecord,
};
pub use resolver::{HostResolver, HostResolverBuilder, Preferences};
pub use services::{lookup_service, ServiceTable};
