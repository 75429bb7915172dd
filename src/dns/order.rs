//! Lookup-order decisions.
//!
//! Before a decider-routed lookup runs, the dispatcher asks an
//! [`OrderDecider`] which engine should handle the call and with what
//! configuration snapshot. The decision is a tagged variant, not a
//! polymorphic object: the dispatcher switches on it and forwards it to the
//! chosen engine unchanged.

use super::resolver::Preferences;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

/// Source ordering for the built-in engine.
///
/// Controls whether the local hosts table is consulted before, after, or
/// instead of DNS.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceOrder {
    HostsThenDns,
    DnsThenHosts,
    HostsOnly,
    DnsOnly,
}

/// The per-call engine decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LookupOrder {
    /// Delegate the whole lookup to the operating system's resolver.
    System,
    /// Run the lookup on the built-in engine with the given source order.
    Builtin(SourceOrder),
}

/// Configuration snapshot produced alongside a [`LookupOrder`].
///
/// Opaque to the dispatcher; the built-in engine interprets it. Shared by
/// `Arc` so the same snapshot the decider produced reaches the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conf {
    /// Per-attempt query timeout.
    pub timeout: Duration,
    /// Number of query attempts before giving up.
    pub attempts: u32,
}

impl Default for Conf {
    fn default() -> Self {
        // resolv.conf defaults
        Self {
            timeout: Duration::from_secs(5),
            attempts: 2,
        }
    }
}

/// Per-call engine selection policy.
///
/// Implementations examine the resolver's preferences and the lookup
/// subject and return the engine order plus a configuration snapshot. The
/// dispatcher consults this exactly once per routed call and never caches
/// the result.
pub trait OrderDecider: Send + Sync {
    /// Decide the order for a forward lookup of `host`.
    fn host_order(&self, prefs: &Preferences, host: &str) -> (LookupOrder, Arc<Conf>);

    /// Decide the order for a reverse lookup of `addr`.
    fn addr_order(&self, prefs: &Preferences, addr: IpAddr) -> (LookupOrder, Arc<Conf>);
}

/// Blanket implementation for Arc-wrapped deciders.
impl<D: OrderDecider + ?Sized> OrderDecider for Arc<D> {
    fn host_order(&self, prefs: &Preferences, host: &str) -> (LookupOrder, Arc<Conf>) {
        (**self).host_order(prefs, host)
    }

    fn addr_order(&self, prefs: &Preferences, addr: IpAddr) -> (LookupOrder, Arc<Conf>) {
        (**self).addr_order(prefs, addr)
    }
}

/// Default order policy.
///
/// Encodes the compatibility rules of dual-resolver stacks: names the
/// built-in engine cannot represent in DNS go to the system resolver, and
/// the resolver's prefer-builtin flag forces the built-in path. Everything
/// else resolves hosts-file first, then DNS.
pub struct SystemOrderDecider {
    conf: Arc<Conf>,
}

impl SystemOrderDecider {
    pub fn new() -> Self {
        Self {
            conf: Arc::new(Conf::default()),
        }
    }

    /// Uses a specific configuration snapshot instead of the defaults.
    pub fn with_conf(conf: Conf) -> Self {
        Self {
            conf: Arc::new(conf),
        }
    }

    /// Whether `host` can be carried in a plain DNS query. Multicast-DNS
    /// names and names outside ASCII historically require the system
    /// resolver.
    fn dns_representable(host: &str) -> bool {
        if host.is_empty() || !host.is_ascii() {
            return false;
        }
        let trimmed = host.strip_suffix('.').unwrap_or(host);
        !trimmed.ends_with(".local") && trimmed != "local"
    }
}

impl Default for SystemOrderDecider {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderDecider for SystemOrderDecider {
    fn host_order(&self, prefs: &Preferences, host: &str) -> (LookupOrder, Arc<Conf>) {
        if prefs.prefer_builtin {
            return (
                LookupOrder::Builtin(SourceOrder::HostsThenDns),
                self.conf.clone(),
            );
        }
        if !Self::dns_representable(host) {
            tracing::debug!(host = %host, "routing to system resolver");
            return (LookupOrder::System, self.conf.clone());
        }
        (
            LookupOrder::Builtin(SourceOrder::HostsThenDns),
            self.conf.clone(),
        )
    }

    fn addr_order(&self, _prefs: &Preferences, _addr: IpAddr) -> (LookupOrder, Arc<Conf>) {
        // Reverse lookups have no representability constraint; the hosts
        // table is still consulted first.
        (
            LookupOrder::Builtin(SourceOrder::HostsThenDns),
            self.conf.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs(prefer_builtin: bool) -> Preferences {
        Preferences { prefer_builtin }
    }

    #[test]
    fn test_regular_names_use_builtin() {
        let decider = SystemOrderDecider::new();
        let (order, _) = decider.host_order(&prefs(false), "example.com");
        assert_eq!(order, LookupOrder::Builtin(SourceOrder::HostsThenDns));
    }

    #[test]
    fn test_mdns_names_use_system() {
        let decider = SystemOrderDecider::new();
        let (order, _) = decider.host_order(&prefs(false), "printer.local");
        assert_eq!(order, LookupOrder::System);
        let (order, _) = decider.host_order(&prefs(false), "printer.local.");
        assert_eq!(order, LookupOrder::System);
    }

    #[test]
    fn test_non_ascii_names_use_system() {
        let decider = SystemOrderDecider::new();
        let (order, _) = decider.host_order(&prefs(false), "bücher.example");
        assert_eq!(order, LookupOrder::System);
    }

    #[test]
    fn test_prefer_builtin_overrides_system_routing() {
        let decider = SystemOrderDecider::new();
        let (order, _) = decider.host_order(&prefs(true), "printer.local");
        assert_eq!(order, LookupOrder::Builtin(SourceOrder::HostsThenDns));
    }

    #[test]
    fn test_conf_snapshot_is_shared() {
        let decider = SystemOrderDecider::new();
        let (_, conf1) = decider.host_order(&prefs(false), "a.example");
        let (_, conf2) = decider.host_order(&prefs(false), "b.example");
        assert!(Arc::ptr_eq(&conf1, &conf2));
    }
}
