//! # netresolve
//!
//! A Chromium-inspired host and record resolution front end for Rust.
//!
//! `netresolve` sits in front of name resolution and routes each lookup
//! between two interchangeable engines: a self-contained, fully async DNS
//! engine (backed by hickory-dns) and the operating system's own resolver
//! (getaddrinfo / getnameinfo). Which engine handles a given call is decided
//! per lookup by a pluggable order-decision policy, preserving the
//! compatibility rules of classic dual-resolver stacks.
//!
//! ## Features
//!
//! - **Dual-engine dispatch**: built-in vs. system resolver, chosen per call
//! - **Full record surface**: host, IP, CNAME, PTR, SRV, MX, NS, TXT, TLSA, port
//! - **Protocol registry cache**: `/etc/protocols` parsed once per process
//! - **Service and hosts tables**: `/etc/services` and `/etc/hosts` lookups
//! - **Pluggable policy**: the order decider and both engines are trait seams
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use netresolve::dns::HostResolver;
//!
//! #[tokio::main]
//! async fn main() {
//!     let resolver = HostResolver::new();
//!     let (addrs, diag) = resolver.lookup_host("example.com").await.unwrap();
//!     for addr in addrs {
//!         println!("Resolved: {} (authenticated: {})", addr, diag.authenticated);
//!     }
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Core types and error definitions
//! - [`dns`] - Resolution dispatch, engines, and the local lookup tables
//!
//! ## Cancellation
//!
//! Every lookup is an ordinary future: dropping it cancels the in-flight
//! work, and callers bound latency with `tokio::time::timeout`. The dispatch
//! layer itself adds no timeout or retry logic.

pub mod base;
pub mod dns;
