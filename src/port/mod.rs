//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!   CLI ──▶ application services ──▶ port::outbound::store ◀── MemoryStore
//!                    │                                      ◀── SqliteStore
//!                    ▼
//!                 domain
//! ```

pub mod outbound;
