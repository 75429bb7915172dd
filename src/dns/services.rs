//! Service registry cache.
//!
//! Maps service names to port numbers per transport network, backed by a
//! one-time parse of `/etc/services`. Same lifecycle as the protocol
//! registry: populated on first use, never re-read, and an unopenable file
//! degrades silently to an empty table.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, OnceLock};

type ServiceMap = HashMap<String, HashMap<String, u16>>;

/// Lazily-initialized network -> service -> port table.
pub struct ServiceTable {
    path: PathBuf,
    table: OnceLock<ServiceMap>,
}

impl ServiceTable {
    /// Creates a table backed by the registry file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            table: OnceLock::new(),
        }
    }

    /// Looks up the port for `service` on `network` ("tcp" or "udp").
    ///
    /// Matches the name exactly first, then falls back to its ASCII
    /// lowercase form, mirroring the registry's case conventions.
    pub fn lookup(&self, network: &str, service: &str) -> Option<u16> {
        let by_network = self.table.get_or_init(|| read_services(&self.path));
        let services = by_network.get(network)?;
        if let Some(port) = services.get(service) {
            return Some(*port);
        }
        services.get(&service.to_ascii_lowercase()).copied()
    }
}

fn read_services(path: &Path) -> ServiceMap {
    let mut table = ServiceMap::new();

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "service registry unavailable");
            return table;
        }
    };

    for line in BufReader::new(file).lines() {
        let Ok(line) = line else { break };
        parse_line(&line, &mut table);
    }

    table
}

/// Parses one registry line.
///
/// Format: `name port/network [alias...]`, `#` starts a comment. Lines
/// whose second field is not `number/network` are ignored. First writer
/// wins per (network, name) pair.
fn parse_line(line: &str, table: &mut ServiceMap) {
    // http    80/tcp    www    # WorldWideWeb
    let line = line.split('#').next().unwrap_or("");

    let mut fields = line.split_whitespace();
    let Some(name) = fields.next() else { return };
    let Some(port_net) = fields.next() else { return };
    let Some((port, network)) = port_net.split_once('/') else {
        return;
    };
    let Ok(port) = port.parse::<u16>() else { return };
    if network.is_empty() {
        return;
    }

    let services = table.entry(network.to_string()).or_default();
    services.entry(name.to_string()).or_insert(port);
    for alias in fields {
        services.entry(alias.to_string()).or_insert(port);
    }
}

static SERVICES: LazyLock<ServiceTable> = LazyLock::new(|| ServiceTable::new("/etc/services"));

/// Looks up a service port in the process-wide registry table.
pub fn lookup_service(network: &str, service: &str) -> Option<u16> {
    SERVICES.lookup(network, service)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_from(lines: &str) -> ServiceMap {
        let mut table = ServiceMap::new();
        for line in lines.lines() {
            parse_line(line, &mut table);
        }
        table
    }

    fn get(table: &ServiceMap, network: &str, service: &str) -> Option<u16> {
        table.get(network)?.get(service).copied()
    }

    #[test]
    fn test_basic_entries() {
        let table = table_from("http 80/tcp www\ndomain 53/udp\ndomain 53/tcp\n");

        assert_eq!(get(&table, "tcp", "http"), Some(80));
        assert_eq!(get(&table, "tcp", "www"), Some(80));
        assert_eq!(get(&table, "udp", "domain"), Some(53));
        assert_eq!(get(&table, "tcp", "domain"), Some(53));
        assert_eq!(get(&table, "udp", "http"), None);
    }

    #[test]
    fn test_comments_and_malformed() {
        let table = table_from("# services\nhttp 80/tcp # www\nbroken eighty/tcp\nnoslash 80\n");

        assert_eq!(get(&table, "tcp", "http"), Some(80));
        assert_eq!(get(&table, "tcp", "broken"), None);
        assert_eq!(get(&table, "tcp", "noslash"), None);
    }

    #[test]
    fn test_first_writer_wins_per_network() {
        let table = table_from("http 80/tcp\nhttp 8080/tcp\nhttp 8080/udp\n");

        assert_eq!(get(&table, "tcp", "http"), Some(80));
        // Different network is a different key space.
        assert_eq!(get(&table, "udp", "http"), Some(8080));
    }

    #[test]
    fn test_case_insensitive_fallback() {
        let table = table_from("http 80/tcp\n");
        let st = ServiceTable {
            path: PathBuf::new(),
            table: OnceLock::from(table),
        };

        assert_eq!(st.lookup("tcp", "http"), Some(80));
        assert_eq!(st.lookup("tcp", "HTTP"), Some(80));
        assert_eq!(st.lookup("tcp", "gopher"), None);
    }

    #[test]
    fn test_missing_file_yields_empty_table() {
        let table = ServiceTable::new("/definitely/not/a/real/path/services");
        assert_eq!(table.lookup("tcp", "http"), None);
    }
}
