//! Built-in resolution engine backed by hickory-dns.
//!
//! The self-contained strategy: answers every record type without
//! delegating to the operating system's resolver. Address lookups consult
//! the hosts table according to the per-call source order before or after
//! going to DNS; port lookups come from the service registry and never
//! touch the network.
//!
//! # Performance
//!
//! Fully async; no blocking threads. The underlying resolver is lazily
//! initialized on first use and shared process-wide, maintaining connection
//! pools to the configured DNS servers.

use super::engine::BuiltinResolve;
use super::order::{Conf, SourceOrder};
use super::resolve::{
    AddrFamily, Diagnostics, MxRecord, Name, Network, NsRecord, Resolving, SrvRecord, TlsaRecord,
};
use super::{hosts, services};
use crate::base::neterror::NetError;
use hickory_resolver::{
    config::{LookupIpStrategy, ResolverConfig},
    name_server::TokioConnectionProvider,
    proto::rr::{RData, RecordType},
    TokioResolver,
};
use std::future::Future;
use std::io;
use std::net::IpAddr;
use std::sync::{Arc, LazyLock};

/// The self-contained engine.
///
/// Lazily initialized on first use and shared across all instances via a
/// static `LazyLock`. It configures itself from the system's DNS settings,
/// falling back to sensible defaults when those cannot be read.
#[derive(Debug, Clone)]
pub struct HickoryEngine {
    resolver: &'static LazyLock<TokioResolver>,
}

impl HickoryEngine {
    /// Creates a new `HickoryEngine`.
    ///
    /// The underlying resolver is lazily initialized on the first DNS
    /// query, not here.
    pub fn new() -> Self {
        static RESOLVER: LazyLock<TokioResolver> = LazyLock::new(|| {
            let mut builder = match TokioResolver::builder_tokio() {
                Ok(builder) => {
                    tracing::debug!("Using system DNS configuration");
                    builder
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "Failed to read system DNS config, using defaults"
                    );
                    TokioResolver::builder_with_config(
                        ResolverConfig::default(),
                        TokioConnectionProvider::default(),
                    )
                }
            };

            // Dual-stack answers; family filtering happens per lookup.
            builder.options_mut().ip_strategy = LookupIpStrategy::Ipv4AndIpv6;

            builder.build()
        });

        Self {
            resolver: &RESOLVER,
        }
    }
}

impl Default for HickoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps a backend lookup failure onto the crate's error taxonomy.
fn lookup_failed(domain: &str, err: impl std::fmt::Display) -> NetError {
    tracing::debug!(domain = %domain, error = %err, "built-in lookup failed");
    NetError::dns_failed(
        domain,
        io::Error::new(io::ErrorKind::NotFound, err.to_string()),
    )
}

fn not_in_hosts(domain: &str) -> NetError {
    NetError::dns_failed(
        domain,
        io::Error::new(io::ErrorKind::NotFound, "not in hosts table"),
    )
}

/// Runs a query under the configuration snapshot: `conf.timeout` per
/// attempt, retried on expiry up to `conf.attempts` times. Backend answers
/// and backend errors both end the loop; only elapsed attempts retry.
async fn with_attempts<F, Fut, T>(conf: &Conf, mut query: F) -> Result<T, NetError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = T>,
{
    for _ in 0..conf.attempts.max(1) {
        if let Ok(out) = tokio::time::timeout(conf.timeout, query()).await {
            return Ok(out);
        }
    }
    Err(NetError::DnsTimedOut)
}

/// SRV query name: `_service._proto.name`, or `name` alone when both
/// service and proto are empty.
fn srv_target(service: &str, proto: &str, name: &str) -> String {
    if service.is_empty() && proto.is_empty() {
        name.to_string()
    } else {
        format!("_{service}._{proto}.{name}")
    }
}

/// TLSA query name per RFC 6698: `_port._proto.host`.
fn tlsa_target(port: u16, proto: &str, host: &str) -> String {
    format!("_{port}._{proto}.{host}")
}

async fn query_ips(
    resolver: &TokioResolver,
    domain: &str,
    family: AddrFamily,
    conf: &Conf,
) -> Result<(Vec<IpAddr>, Diagnostics), NetError> {
    tracing::debug!(domain = %domain, "resolving via built-in engine");

    let lookup = with_attempts(conf, || resolver.lookup_ip(domain))
        .await?
        .map_err(|e| lookup_failed(domain, e))?;

    let addrs: Vec<IpAddr> = lookup.iter().filter(|ip| family.matches(ip)).collect();
    if addrs.is_empty() {
        return Err(NetError::dns_failed(
            domain,
            io::Error::new(io::ErrorKind::NotFound, "no suitable addresses"),
        ));
    }

    tracing::debug!(domain = %domain, count = addrs.len(), "built-in resolution complete");
    Ok((addrs, Diagnostics::unvalidated()))
}

fn hosts_addrs(domain: &str, family: AddrFamily) -> Option<Vec<IpAddr>> {
    let addrs: Vec<IpAddr> = hosts::lookup_static_host(domain)?
        .into_iter()
        .filter(|a| family.matches(a))
        .collect();
    (!addrs.is_empty()).then_some(addrs)
}

impl BuiltinResolve for HickoryEngine {
    fn lookup_host(
        &self,
        host: Name,
        order: SourceOrder,
        conf: Arc<Conf>,
    ) -> Resolving<(Vec<IpAddr>, Diagnostics)> {
        self.lookup_ip(AddrFamily::Any, host, order, conf)
    }

    fn lookup_ip(
        &self,
        family: AddrFamily,
        host: Name,
        order: SourceOrder,
        conf: Arc<Conf>,
    ) -> Resolving<(Vec<IpAddr>, Diagnostics)> {
        let resolver = self.resolver;
        Box::pin(async move {
            let domain = host.as_str().to_string();

            if matches!(order, SourceOrder::HostsThenDns | SourceOrder::HostsOnly) {
                if let Some(addrs) = hosts_addrs(&domain, family) {
                    tracing::debug!(domain = %domain, count = addrs.len(), "answered from hosts table");
                    return Ok((addrs, Diagnostics::unvalidated()));
                }
                if order == SourceOrder::HostsOnly {
                    return Err(not_in_hosts(&domain));
                }
            }

            match query_ips(resolver, &domain, family, &conf).await {
                Ok(out) => Ok(out),
                Err(e) if order == SourceOrder::DnsThenHosts => match hosts_addrs(&domain, family)
                {
                    Some(addrs) => Ok((addrs, Diagnostics::unvalidated())),
                    None => Err(e),
                },
                Err(e) => Err(e),
            }
        })
    }

    fn lookup_port(&self, network: Network, service: String) -> Resolving<u16> {
        Box::pin(async move {
            // Numeric services bypass the registry.
            if let Ok(port) = service.parse::<u16>() {
                return Ok(port);
            }
            services::lookup_service(network.as_str(), &service).ok_or(NetError::UnknownService {
                network: network.as_str().to_string(),
                service,
            })
        })
    }

    fn lookup_cname(
        &self,
        name: Name,
        order: SourceOrder,
        conf: Arc<Conf>,
    ) -> Resolving<(Name, Diagnostics)> {
        let resolver = self.resolver;
        Box::pin(async move {
            let domain = name.as_str().to_string();

            // A name answered from the hosts table is its own canonical
            // name; no CNAME chain exists for it.
            if matches!(order, SourceOrder::HostsThenDns | SourceOrder::HostsOnly) {
                if hosts::lookup_static_host(&domain).is_some() {
                    tracing::debug!(domain = %domain, "canonical name from hosts table");
                    return Ok((name, Diagnostics::unvalidated()));
                }
                if order == SourceOrder::HostsOnly {
                    return Err(not_in_hosts(&domain));
                }
            }

            tracing::debug!(domain = %domain, "canonical name via built-in engine");
            match with_attempts(&conf, || resolver.lookup(domain.as_str(), RecordType::CNAME))
                .await?
            {
                Ok(lookup) => {
                    for rdata in lookup.iter() {
                        if let RData::CNAME(target) = rdata {
                            return Ok((
                                Name::new(target.0.to_string()),
                                Diagnostics::unvalidated(),
                            ));
                        }
                    }
                    Ok((name, Diagnostics::unvalidated()))
                }
                Err(e) => {
                    // A name with addresses but no CNAME chain is its own
                    // canonical name.
                    match with_attempts(&conf, || resolver.lookup_ip(domain.as_str())).await? {
                        Ok(ips) if ips.iter().next().is_some() => {
                            Ok((name, Diagnostics::unvalidated()))
                        }
                        _ => {
                            if order == SourceOrder::DnsThenHosts
                                && hosts::lookup_static_host(&domain).is_some()
                            {
                                return Ok((name, Diagnostics::unvalidated()));
                            }
                            Err(lookup_failed(&domain, e))
                        }
                    }
                }
            }
        })
    }

    fn lookup_srv(
        &self,
        service: String,
        proto: String,
        name: Name,
    ) -> Resolving<(Name, Vec<SrvRecord>, Diagnostics)> {
        let resolver = self.resolver;
        Box::pin(async move {
            let target = srv_target(&service, &proto, name.as_str());
            tracing::debug!(target = %target, "SRV via built-in engine");

            let lookup = resolver
                .srv_lookup(target.as_str())
                .await
                .map_err(|e| lookup_failed(&target, e))?;

            let records = lookup
                .iter()
                .map(|srv| SrvRecord {
                    target: Name::new(srv.target().to_string()),
                    port: srv.port(),
                    priority: srv.priority(),
                    weight: srv.weight(),
                })
                .collect();

            Ok((Name::new(target), records, Diagnostics::unvalidated()))
        })
    }

    fn lookup_mx(&self, name: Name) -> Resolving<(Vec<MxRecord>, Diagnostics)> {
        let resolver = self.resolver;
        Box::pin(async move {
            let domain = name.as_str().to_string();
            let lookup = resolver
                .mx_lookup(domain.as_str())
                .await
                .map_err(|e| lookup_failed(&domain, e))?;

            let records = lookup
                .iter()
                .map(|mx| MxRecord {
                    host: Name::new(mx.exchange().to_string()),
                    pref: mx.preference(),
                })
                .collect();

            Ok((records, Diagnostics::unvalidated()))
        })
    }

    fn lookup_ns(&self, name: Name) -> Resolving<(Vec<NsRecord>, Diagnostics)> {
        let resolver = self.resolver;
        Box::pin(async move {
            let domain = name.as_str().to_string();
            let lookup = resolver
                .ns_lookup(domain.as_str())
                .await
                .map_err(|e| lookup_failed(&domain, e))?;

            let records = lookup
                .iter()
                .map(|ns| NsRecord {
                    host: Name::new(ns.0.to_string()),
                })
                .collect();

            Ok((records, Diagnostics::unvalidated()))
        })
    }

    fn lookup_txt(&self, name: Name) -> Resolving<(Vec<String>, Diagnostics)> {
        let resolver = self.resolver;
        Box::pin(async move {
            let domain = name.as_str().to_string();
            let lookup = resolver
                .txt_lookup(domain.as_str())
                .await
                .map_err(|e| lookup_failed(&domain, e))?;

            // Character strings within one record concatenate into one
            // value; distinct records stay distinct.
            let records = lookup
                .iter()
                .map(|txt| {
                    txt.txt_data()
                        .iter()
                        .map(|chunk| String::from_utf8_lossy(chunk))
                        .collect::<String>()
                })
                .collect();

            Ok((records, Diagnostics::unvalidated()))
        })
    }

    fn lookup_addr(
        &self,
        addr: IpAddr,
        order: SourceOrder,
        conf: Arc<Conf>,
    ) -> Resolving<(Vec<Name>, Diagnostics)> {
        let resolver = self.resolver;
        Box::pin(async move {
            if matches!(order, SourceOrder::HostsThenDns | SourceOrder::HostsOnly) {
                if let Some(names) = hosts::lookup_static_addr(addr) {
                    let names = names.into_iter().map(Name::new).collect();
                    return Ok((names, Diagnostics::unvalidated()));
                }
                if order == SourceOrder::HostsOnly {
                    return Err(NetError::ReverseLookupFailed {
                        addr: addr.to_string(),
                        reason: "not in hosts table".to_string(),
                    });
                }
            }

            tracing::debug!(addr = %addr, "reverse via built-in engine");
            let dns = with_attempts(&conf, || resolver.reverse_lookup(addr)).await?;
            match dns {
                Ok(lookup) => {
                    let names = lookup
                        .iter()
                        .map(|ptr| Name::new(ptr.0.to_string()))
                        .collect();
                    Ok((names, Diagnostics::unvalidated()))
                }
                Err(e) => {
                    if order == SourceOrder::DnsThenHosts {
                        if let Some(names) = hosts::lookup_static_addr(addr) {
                            let names = names.into_iter().map(Name::new).collect();
                            return Ok((names, Diagnostics::unvalidated()));
                        }
                    }
                    Err(NetError::ReverseLookupFailed {
                        addr: addr.to_string(),
                        reason: e.to_string(),
                    })
                }
            }
        })
    }

    fn lookup_tlsa(
        &self,
        port: u16,
        proto: String,
        host: Name,
    ) -> Resolving<(Vec<TlsaRecord>, Diagnostics)> {
        let resolver = self.resolver;
        Box::pin(async move {
            let target = tlsa_target(port, &proto, host.as_str());
            tracing::debug!(target = %target, "TLSA via built-in engine");

            let lookup = resolver
                .tlsa_lookup(target.as_str())
                .await
                .map_err(|e| lookup_failed(&target, e))?;

            let records = lookup
                .iter()
                .map(|tlsa| TlsaRecord {
                    usage: u8::from(tlsa.cert_usage()),
                    selector: u8::from(tlsa.selector()),
                    matching_type: u8::from(tlsa.matching()),
                    certificate: tlsa.cert_data().to_vec(),
                })
                .collect();

            Ok((records, Diagnostics::unvalidated()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_srv_target_composition() {
        assert_eq!(
            srv_target("xmpp-server", "tcp", "example.com"),
            "_xmpp-server._tcp.example.com"
        );
        // Empty service and proto query the name directly.
        assert_eq!(srv_target("", "", "example.com"), "example.com");
    }

    #[test]
    fn test_tlsa_target_composition() {
        assert_eq!(tlsa_target(443, "tcp", "example.com"), "_443._tcp.example.com");
        assert_eq!(tlsa_target(25, "tcp", "mail.example.com"), "_25._tcp.mail.example.com");
    }

    #[test]
    fn test_engine_is_clone() {
        let e1 = HickoryEngine::new();
        let e2 = e1.clone();
        // Both should point to the same static resolver
        assert!(std::ptr::eq(e1.resolver, e2.resolver));
    }

    #[tokio::test]
    async fn test_numeric_port_fast_path() {
        let engine = HickoryEngine::new();
        let port = engine
            .lookup_port(Network::Tcp, "8080".to_string())
            .await
            .unwrap();
        assert_eq!(port, 8080);
    }

    #[tokio::test]
    async fn test_unknown_service_errors() {
        let engine = HickoryEngine::new();
        let err = engine
            .lookup_port(Network::Udp, "no-such-service-name".to_string())
            .await
            .unwrap_err();
        match err {
            NetError::UnknownService { network, service } => {
                assert_eq!(network, "udp");
                assert_eq!(service, "no-such-service-name");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_hosts_only_localhost() {
        // localhost is in /etc/hosts on effectively every system; HostsOnly
        // must answer it without any DNS traffic.
        let engine = HickoryEngine::new();
        let result = engine
            .lookup_host(
                Name::new("localhost"),
                SourceOrder::HostsOnly,
                Arc::new(Conf::default()),
            )
            .await;

        if let Ok((addrs, diag)) = result {
            assert!(!addrs.is_empty());
            assert!(!diag.authenticated);
        } else {
            // Soft fail on systems without a hosts entry for localhost.
            println!("localhost missing from hosts table");
        }
    }

    #[tokio::test]
    async fn test_hosts_only_cname_is_the_name_itself() {
        // Under HostsOnly a hosts-table name resolves as its own canonical
        // name with zero network I/O.
        let engine = HickoryEngine::new();
        let result = engine
            .lookup_cname(
                Name::new("localhost"),
                SourceOrder::HostsOnly,
                Arc::new(Conf::default()),
            )
            .await;

        if let Ok((canonical, diag)) = result {
            assert_eq!(canonical.as_str(), "localhost");
            assert!(!diag.authenticated);
        } else {
            println!("localhost missing from hosts table");
        }
    }

    #[tokio::test]
    async fn test_hosts_only_cname_fails_without_dns() {
        let engine = HickoryEngine::new();
        let err = engine
            .lookup_cname(
                Name::new("absent-from-hosts.invalid"),
                SourceOrder::HostsOnly,
                Arc::new(Conf::default()),
            )
            .await
            .unwrap_err();

        match err {
            NetError::NameNotResolvedFor { domain, .. } => {
                assert_eq!(domain, "absent-from-hosts.invalid");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_attempts_retry_then_time_out() {
        use std::sync::atomic::{AtomicU32, Ordering};
        use std::time::Duration;

        let conf = Conf {
            timeout: Duration::from_millis(5),
            attempts: 3,
        };
        let calls = AtomicU32::new(0);

        let err = with_attempts(&conf, || {
            calls.fetch_add(1, Ordering::SeqCst);
            std::future::pending::<()>()
        })
        .await
        .unwrap_err();

        // Each attempt gets its own timeout window before the next retry.
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(err, NetError::DnsTimedOut));
    }

    #[tokio::test]
    async fn test_attempts_stop_on_first_answer() {
        use std::sync::atomic::{AtomicU32, Ordering};
        use std::time::Duration;

        let conf = Conf {
            timeout: Duration::from_millis(50),
            attempts: 3,
        };
        let calls = AtomicU32::new(0);

        let out = with_attempts(&conf, || {
            calls.fetch_add(1, Ordering::SeqCst);
            std::future::ready(42u16)
        })
        .await
        .unwrap();

        assert_eq!(out, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
