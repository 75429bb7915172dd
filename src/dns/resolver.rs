//! The resolution dispatcher.
//!
//! [`HostResolver`] is the decision point in front of name resolution. For
//! every call it either asks the order decider which engine applies, or
//! goes straight to the built-in engine for record types with no OS-level
//! equivalent. It introduces no error kinds, caches no answers, and holds
//! no locks across engine calls; results and diagnostics flow back to the
//! caller unchanged.
//!
//! The per-operation routing encodes real compatibility history. Forward
//! host, IP, canonical-name, and reverse lookups historically differ
//! between resolvers and stay configurable, while SRV, MX, NS, TXT, TLSA,
//! and port lookups never had a meaningful system-resolver equivalent and
//! are pinned to the built-in engine.

use super::engine::{BuiltinResolve, SystemResolve};
use super::gai::SystemEngine;
use super::hickory::HickoryEngine;
use super::order::{Conf, LookupOrder, OrderDecider, SourceOrder, SystemOrderDecider};
use super::resolve::{
    AddrFamily, Diagnostics, MxRecord, Name, Network, NsRecord, SrvRecord, TlsaRecord,
};
use crate::base::neterror::NetError;
use std::net::IpAddr;
use std::sync::Arc;

/// Immutable per-resolver preferences, consulted on every call.
#[derive(Clone, Copy, Debug, Default)]
pub struct Preferences {
    /// Force the built-in engine for address lookups regardless of what
    /// the order decider would choose.
    pub prefer_builtin: bool,
}

/// The resolver front end.
///
/// Holds both engines and the order decider behind trait objects; every
/// lookup picks an engine per call rather than binding one persistently.
/// Cheap to clone and share.
#[derive(Clone)]
pub struct HostResolver {
    builtin: Arc<dyn BuiltinResolve>,
    system: Arc<dyn SystemResolve>,
    order: Arc<dyn OrderDecider>,
    prefs: Preferences,
    // Conf used when a call bypasses the order decider entirely.
    default_conf: Arc<Conf>,
}

impl HostResolver {
    /// Creates a resolver with the stock engines and default order policy.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building a resolver with substituted engines or policy.
    pub fn builder() -> HostResolverBuilder {
        HostResolverBuilder::default()
    }

    /// Resolves all addresses for a host name.
    pub async fn lookup_host(&self, host: &str) -> Result<(Vec<IpAddr>, Diagnostics), NetError> {
        match self.order.host_order(&self.prefs, host) {
            (LookupOrder::System, _) => self.system.lookup_host(Name::new(host)).await,
            (LookupOrder::Builtin(sources), conf) => {
                self.builtin.lookup_host(Name::new(host), sources, conf).await
            }
        }
    }

    /// Resolves addresses for a host name, restricted to a family.
    ///
    /// With `prefer_builtin` set the built-in engine is used directly,
    /// without consulting the order decider.
    pub async fn lookup_ip(
        &self,
        family: AddrFamily,
        host: &str,
    ) -> Result<(Vec<IpAddr>, Diagnostics), NetError> {
        if self.prefs.prefer_builtin {
            return self
                .builtin
                .lookup_ip(
                    family,
                    Name::new(host),
                    SourceOrder::HostsThenDns,
                    self.default_conf.clone(),
                )
                .await;
        }
        match self.order.host_order(&self.prefs, host) {
            (LookupOrder::System, _) => self.system.lookup_ip(family, Name::new(host)).await,
            (LookupOrder::Builtin(sources), conf) => {
                self.builtin.lookup_ip(family, Name::new(host), sources, conf).await
            }
        }
    }

    /// Resolves a service name to a port number.
    ///
    /// Port lookup is not a DNS operation; it always runs on the built-in
    /// engine.
    pub async fn lookup_port(&self, network: Network, service: &str) -> Result<u16, NetError> {
        self.builtin.lookup_port(network, service.to_string()).await
    }

    /// Resolves the canonical name for a host.
    pub async fn lookup_cname(&self, name: &str) -> Result<(Name, Diagnostics), NetError> {
        match self.order.host_order(&self.prefs, name) {
            (LookupOrder::System, _) => self.system.lookup_cname(Name::new(name)).await,
            (LookupOrder::Builtin(sources), conf) => {
                self.builtin.lookup_cname(Name::new(name), sources, conf).await
            }
        }
    }

    /// Resolves SRV records for `_service._proto.name`; returns the
    /// composed query name alongside the records. Always built-in.
    pub async fn lookup_srv(
        &self,
        service: &str,
        proto: &str,
        name: &str,
    ) -> Result<(Name, Vec<SrvRecord>, Diagnostics), NetError> {
        self.builtin
            .lookup_srv(service.to_string(), proto.to_string(), Name::new(name))
            .await
    }

    /// Resolves MX records. Always built-in.
    pub async fn lookup_mx(&self, name: &str) -> Result<(Vec<MxRecord>, Diagnostics), NetError> {
        self.builtin.lookup_mx(Name::new(name)).await
    }

    /// Resolves NS records. Always built-in.
    pub async fn lookup_ns(&self, name: &str) -> Result<(Vec<NsRecord>, Diagnostics), NetError> {
        self.builtin.lookup_ns(Name::new(name)).await
    }

    /// Resolves TXT records. Always built-in.
    pub async fn lookup_txt(&self, name: &str) -> Result<(Vec<String>, Diagnostics), NetError> {
        self.builtin.lookup_txt(Name::new(name)).await
    }

    /// Resolves the names for an address (reverse / PTR lookup).
    pub async fn lookup_addr(&self, addr: IpAddr) -> Result<(Vec<Name>, Diagnostics), NetError> {
        match self.order.addr_order(&self.prefs, addr) {
            (LookupOrder::System, _) => self.system.lookup_addr(addr).await,
            (LookupOrder::Builtin(sources), conf) => {
                self.builtin.lookup_addr(addr, sources, conf).await
            }
        }
    }

    /// Resolves TLSA records for `_port._proto.host`. Always built-in.
    pub async fn lookup_tlsa(
        &self,
        port: u16,
        proto: &str,
        host: &str,
    ) -> Result<(Vec<TlsaRecord>, Diagnostics), NetError> {
        self.builtin
            .lookup_tlsa(port, proto.to_string(), Name::new(host))
            .await
    }
}

impl Default for HostResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`HostResolver`].
///
/// Unset parts fall back to the stock engines and the default order
/// policy.
#[derive(Default)]
pub struct HostResolverBuilder {
    builtin: Option<Arc<dyn BuiltinResolve>>,
    system: Option<Arc<dyn SystemResolve>>,
    order: Option<Arc<dyn OrderDecider>>,
    prefs: Preferences,
}

impl HostResolverBuilder {
    /// Substitutes the self-contained engine.
    pub fn builtin_engine(mut self, engine: Arc<dyn BuiltinResolve>) -> Self {
        self.builtin = Some(engine);
        self
    }

    /// Substitutes the system-delegated engine.
    pub fn system_engine(mut self, engine: Arc<dyn SystemResolve>) -> Self {
        self.system = Some(engine);
        self
    }

    /// Substitutes the order-decision policy.
    pub fn order_decider(mut self, decider: Arc<dyn OrderDecider>) -> Self {
        self.order = Some(decider);
        self
    }

    /// Forces the built-in engine for address lookups.
    pub fn prefer_builtin(mut self, prefer: bool) -> Self {
        self.prefs.prefer_builtin = prefer;
        self
    }

    pub fn build(self) -> HostResolver {
        HostResolver {
            builtin: self.builtin.unwrap_or_else(|| Arc::new(HickoryEngine::new())),
            system: self.system.unwrap_or_else(|| Arc::new(SystemEngine::new())),
            order: self
                .order
                .unwrap_or_else(|| Arc::new(SystemOrderDecider::new())),
            prefs: self.prefs,
            default_conf: Arc::new(Conf::default()),
        }
    }
}
