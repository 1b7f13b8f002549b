//! Emergency contact management.
//!
//! Contacts are the people notified while emergency sharing is active. They
//! are stored only on the device, as one ordered list.
//!
//! # Architecture
//!
//! ```text
//! ContactStore (load / add / remove)
//!     └── dyn KeyValueStore
//!             ├── SqliteKeyValueStore (durable)
//!             └── MemoryKeyValueStore (tests, ephemeral)
//! ```
//!
//! # Types
//!
//! - [`EmergencyContact`]: name, phone, optional email
//! - [`ContactStore`]: the persisted list
//! - [`KeyValueStore`]: injected persistence

mod error;
mod storage;
mod store;
pub mod types;

pub use error::{ContactError, Result};
pub use storage::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};
pub use store::{ContactStore, CONTACTS_KEY};
pub use types::EmergencyContact;
