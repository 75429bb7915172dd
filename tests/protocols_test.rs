//! Protocol registry cache tests against real files.
//!
//! The in-module unit tests cover line parsing; these exercise the
//! file-backed behavior: one-time initialization, permanence of the
//! missing-file outcome, and concurrent first lookups.

use netresolve::dns::ProtocolTable;

use std::io::Write;
use std::sync::Arc;
use std::thread;

fn registry(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_lookup_from_registry_file() {
    let file = registry(
        "# Internet protocols\n\
         ip      0   IP    # internet protocol\n\
         icmp    1   ICMP\n\
         tcp     6   TCP\n\
         udp     17  UDP\n",
    );
    let table = ProtocolTable::new(file.path());

    assert_eq!(table.lookup("tcp"), Some(6));
    assert_eq!(table.lookup("TCP"), Some(6));
    assert_eq!(table.lookup("udp"), Some(17));
    assert_eq!(table.lookup("UDP"), Some(17));
    assert_eq!(table.lookup("icmp"), Some(1));
    assert_eq!(table.lookup("ip"), Some(0));
    assert_eq!(table.lookup("sctp"), None);
}

#[test]
fn test_file_read_exactly_once() {
    let file = registry("tcp 6 TCP\n");
    let table = ProtocolTable::new(file.path());

    assert_eq!(table.lookup("tcp"), Some(6));

    // Rewriting the file after the first lookup changes nothing; the
    // parsed table is retained for the life of the ProtocolTable.
    std::fs::write(file.path(), "tcp 99\nsctp 132\n").unwrap();

    assert_eq!(table.lookup("tcp"), Some(6));
    assert_eq!(table.lookup("sctp"), None);
}

#[test]
fn test_missing_file_degrades_permanently() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("protocols");
    let table = ProtocolTable::new(&path);

    // First lookup runs against a path that does not exist.
    assert_eq!(table.lookup("tcp"), None);
    assert!(table.is_empty());

    // Creating the file afterwards does not resurrect the table.
    std::fs::write(&path, "tcp 6 TCP\n").unwrap();
    assert_eq!(table.lookup("tcp"), None);
    assert!(table.is_empty());
}

#[test]
fn test_concurrent_first_lookups_share_one_table() {
    let file = registry("tcp 6 TCP\nudp 17 UDP\nicmp 1 ICMP\n");
    let table = Arc::new(ProtocolTable::new(file.path()));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let table = table.clone();
            thread::spawn(move || {
                // Alternate which name triggers initialization.
                if i % 2 == 0 {
                    (table.lookup("tcp"), table.lookup("udp"), table.len())
                } else {
                    (table.lookup("TCP"), table.lookup("UDP"), table.len())
                }
            })
        })
        .collect();

    for handle in handles {
        let (a, b, len) = handle.join().unwrap();
        assert_eq!(a, Some(6));
        assert_eq!(b, Some(17));
        assert_eq!(len, 6);
    }
}
