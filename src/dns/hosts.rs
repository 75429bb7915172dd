//! Hosts file tables.
//!
//! Name-to-address and address-to-name lookups over `/etc/hosts`, consulted
//! by the built-in engine according to the per-call source order. Shares
//! the one-time-initialization lifecycle of the other registry tables.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, OnceLock};

#[derive(Default)]
struct HostsMap {
    by_name: HashMap<String, Vec<IpAddr>>,
    by_addr: HashMap<IpAddr, Vec<String>>,
}

/// Lazily-initialized hosts file tables.
pub struct HostsTable {
    path: PathBuf,
    table: OnceLock<HostsMap>,
}

impl HostsTable {
    /// Creates a table backed by the hosts file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            table: OnceLock::new(),
        }
    }

    /// Addresses for a host name; matching is case-insensitive.
    pub fn lookup_host(&self, name: &str) -> Option<Vec<IpAddr>> {
        self.map()
            .by_name
            .get(&name.to_ascii_lowercase())
            .cloned()
            .filter(|addrs| !addrs.is_empty())
    }

    /// Names for an address.
    pub fn lookup_addr(&self, addr: IpAddr) -> Option<Vec<String>> {
        self.map()
            .by_addr
            .get(&addr)
            .cloned()
            .filter(|names| !names.is_empty())
    }

    fn map(&self) -> &HostsMap {
        self.table.get_or_init(|| read_hosts(&self.path))
    }
}

fn read_hosts(path: &Path) -> HostsMap {
    let mut map = HostsMap::default();

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "hosts file unavailable");
            return map;
        }
    };

    for line in BufReader::new(file).lines() {
        let Ok(line) = line else { break };
        parse_line(&line, &mut map);
    }

    map
}

/// Parses one hosts line: `address name [name...]`, `#` starts a comment.
/// Unlike the registry tables, repeated names accumulate addresses.
fn parse_line(line: &str, map: &mut HostsMap) {
    // 127.0.0.1    localhost    my-machine
    let line = line.split('#').next().unwrap_or("");

    let mut fields = line.split_whitespace();
    let Some(addr) = fields.next() else { return };
    let Ok(addr) = addr.parse::<IpAddr>() else {
        return;
    };

    for name in fields {
        map.by_name
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(addr);
        map.by_addr.entry(addr).or_default().push(name.to_string());
    }
}

static HOSTS: LazyLock<HostsTable> = LazyLock::new(|| HostsTable::new("/etc/hosts"));

/// Addresses for a host name from the process-wide hosts table.
pub fn lookup_static_host(name: &str) -> Option<Vec<IpAddr>> {
    HOSTS.lookup_host(name)
}

/// Names for an address from the process-wide hosts table.
pub fn lookup_static_addr(addr: IpAddr) -> Option<Vec<String>> {
    HOSTS.lookup_addr(addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    fn map_from(lines: &str) -> HostsMap {
        let mut map = HostsMap::default();
        for line in lines.lines() {
            parse_line(line, &mut map);
        }
        map
    }

    fn table(lines: &str) -> HostsTable {
        HostsTable {
            path: PathBuf::new(),
            table: OnceLock::from(map_from(lines)),
        }
    }

    #[test]
    fn test_name_and_addr_lookup() {
        let hosts = table("127.0.0.1 localhost my-box\n::1 localhost\n");

        let addrs = hosts.lookup_host("localhost").unwrap();
        assert_eq!(
            addrs,
            vec![
                IpAddr::V4(Ipv4Addr::LOCALHOST),
                IpAddr::V6(Ipv6Addr::LOCALHOST)
            ]
        );

        let names = hosts.lookup_addr(IpAddr::V4(Ipv4Addr::LOCALHOST)).unwrap();
        assert_eq!(names, vec!["localhost".to_string(), "my-box".to_string()]);
    }

    #[test]
    fn test_case_insensitive_names() {
        let hosts = table("10.0.0.1 FileServer\n");

        assert!(hosts.lookup_host("fileserver").is_some());
        assert!(hosts.lookup_host("FILESERVER").is_some());
    }

    #[test]
    fn test_comments_and_malformed() {
        let hosts = table("# header\n127.0.0.1 localhost # loopback\nnot-an-ip foo\n");

        assert!(hosts.lookup_host("localhost").is_some());
        assert!(hosts.lookup_host("loopback").is_none());
        assert!(hosts.lookup_host("foo").is_none());
    }

    #[test]
    fn test_unknown_name() {
        let hosts = table("127.0.0.1 localhost\n");
        assert!(hosts.lookup_host("unknown.example").is_none());
        assert!(hosts
            .lookup_addr(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)))
            .is_none());
    }
}
