//! Aura persistence gateway
//!
//! A thin adapter over a document database holding two collections:
//! users (upserted by id) and pulses (insert-only, resonance incremented
//! by read-modify-write).
//!
//! # Layers
//!
//! ```text
//! ┌──────────────────────────────┐
//! │      PersistenceGateway      │  never fails: logs and degrades
//! └──────────────┬───────────────┘
//!                │ Option<Arc<dyn PulseStore>>
//!      ┌─────────┴─────────┐
//!      ▼                   ▼
//! ┌──────────┐       ┌─────────────┐
//! │MongoStore│       │ MemoryStore │
//! └──────────┘       └─────────────┘
//! ```

pub mod error;
pub mod gateway;
pub mod memory;
pub mod mongo;
pub mod traits;

pub use error::StoreError;
pub use gateway::PersistenceGateway;
pub use memory::MemoryStore;
pub use mongo::{MongoStore, DEFAULT_DATABASE, PULSES_COLLECTION, USERS_COLLECTION};
pub use traits::PulseStore;
