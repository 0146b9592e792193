// # dyndns-core
//
// Core library for the name.com dynamic DNS updater.
//
// ## Architecture Overview
//
// This library provides the reconciliation logic of the updater:
// - **IpSource**: Trait for discovering the current public address of one family
// - **DnsProvider**: Trait for listing and writing DNS records via the registrar
// - **UpdaterState**: Last-applied addresses, memory-resident
// - **DdnsEngine**: Core engine that turns discovery + lookup into create/update calls
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Decisions live in the engine, I/O behind traits
// 2. **Idempotency**: An address already applied never causes a second write
// 3. **Family Isolation**: IPv4 and IPv6 succeed or fail independently
// 4. **Library-First**: The daemon is a thin shell around this crate

pub mod traits;
pub mod engine;
pub mod config;
pub mod error;
pub mod state;

// Re-export core types for convenience
pub use traits::{DnsProvider, IpSource, IpVersion};
pub use engine::{CycleReport, DdnsEngine, FamilyOutcome};
pub use config::{DdnsConfig, EngineConfig, IpSourceConfig, ProviderConfig};
pub use error::{Error, Result};
pub use state::UpdaterState;
