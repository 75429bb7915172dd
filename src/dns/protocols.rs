//! Protocol registry cache.
//!
//! Translates IP protocol names ("tcp", "udp", ...) to their registry
//! numbers, backed by a one-time parse of the system protocol registry
//! (`/etc/protocols`). The table is populated on the first lookup and
//! shared read-only by every caller for the rest of the process lifetime.
//!
//! A registry file that cannot be opened degrades the table to permanently
//! empty without raising an error; protocol-name lookup failure must never
//! block a resolution call that does not strictly need it.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, OnceLock};

/// Lazily-initialized protocol name to number table.
///
/// Initialization runs exactly once across all concurrent callers; later
/// callers block until the first pass completes and then share the same
/// table. The table is never re-read, even if the registry file appears or
/// changes afterwards.
pub struct ProtocolTable {
    path: PathBuf,
    table: OnceLock<HashMap<String, u16>>,
}

impl ProtocolTable {
    /// Creates a table backed by the registry file at `path`. Nothing is
    /// read until the first lookup.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            table: OnceLock::new(),
        }
    }

    /// Looks up the registry number for a protocol name or alias.
    ///
    /// Names are matched exactly, case preserved as read from the registry.
    /// `None` means the name is absent; absence is not an error.
    pub fn lookup(&self, name: &str) -> Option<u16> {
        self.table
            .get_or_init(|| read_protocols(&self.path))
            .get(name)
            .copied()
    }

    /// Number of distinct names (primary and alias) in the table.
    /// Triggers initialization like [`lookup`](Self::lookup).
    pub fn len(&self) -> usize {
        self.table.get_or_init(|| read_protocols(&self.path)).len()
    }

    /// Whether the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Single initialization pass over the registry file.
///
/// An unopenable file yields an empty table; that outcome is permanent for
/// the owning [`ProtocolTable`].
fn read_protocols(path: &Path) -> HashMap<String, u16> {
    let mut table = HashMap::new();

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "protocol registry unavailable");
            return table;
        }
    };

    for line in BufReader::new(file).lines() {
        let Ok(line) = line else { break };
        parse_line(&line, &mut table);
    }

    tracing::debug!(path = %path.display(), entries = table.len(), "protocol registry loaded");
    table
}

/// Parses one registry line into the table.
///
/// Format: `name number [alias...]`, with `#` starting a comment. Lines
/// with fewer than two fields or a non-numeric second field are ignored.
/// Existing entries win over later duplicates.
fn parse_line(line: &str, table: &mut HashMap<String, u16>) {
    // tcp    6   TCP    # transmission control protocol
    let line = line.split('#').next().unwrap_or("");

    let mut fields = line.split_whitespace();
    let Some(name) = fields.next() else { return };
    let Some(number) = fields.next() else { return };
    let Ok(number) = number.parse::<u16>() else {
        return;
    };

    table.entry(name.to_string()).or_insert(number);
    for alias in fields {
        table.entry(alias.to_string()).or_insert(number);
    }
}

static PROTOCOLS: LazyLock<ProtocolTable> =
    LazyLock::new(|| ProtocolTable::new("/etc/protocols"));

/// Looks up an IP protocol name in the process-wide registry table.
pub fn lookup_protocol(name: &str) -> Option<u16> {
    PROTOCOLS.lookup(name)
}
