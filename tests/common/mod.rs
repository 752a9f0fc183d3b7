//! Shared helpers for the integration tests: fixture loading and a router
//! wired to an in-memory transport.

#![allow(dead_code)]

use sri::input;
use sri::{DispatchRouter, MemoryTransport, RawRecord};
use std::path::PathBuf;
use std::sync::Arc;

/// Absolute path of a file under `tests/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Load a fixture through the same loaders the CLI uses.
pub fn load_fixture(name: &str) -> RawRecord {
    input::load_file(&fixture_path(name))
        .unwrap_or_else(|e| panic!("failed to load fixture {}: {}", name, e))
}

/// A router with the default routing table publishing into memory.
pub fn memory_router() -> (DispatchRouter, Arc<MemoryTransport>) {
    let transport = Arc::new(MemoryTransport::new());
    (DispatchRouter::new(transport.clone()), transport)
}
