//! # Network Module
//!
//! Everything Quill needs from a ledger node, behind two traits:
//!
//! ```text
//! client.rs  : LedgerClient / DispatchClient traits and their data types
//! http.rs    : reqwest implementation against the node's REST API
//! memory.rs  : in-memory implementation for tests and cold runs
//! ```
//!
//! The composer never talks HTTP directly. All reads happen in the gather
//! phase of a batch, all writes in the dispatch phase.

pub mod client;
pub mod http;
pub mod memory;

pub use client::{AccountState, ClientError, DispatchClient, DispatchReport, LedgerClient};
pub use http::HttpLedgerClient;
pub use memory::InMemoryLedger;
