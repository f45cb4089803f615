//! wavemark-store - fingerprint persistence
//!
//! One JSON record per track, keyed by the SHA-256 content hash of the
//! canonical decoded waveform. Records are immutable once written; writing
//! the same content twice lands on the same key with identical bytes.

mod content;
mod record;
mod store;

pub use content::content_key;
pub use record::{FingerprintRecord, RecordMetadata, TrackInfo, FORMAT_VERSION};
pub use store::{FsStore, FingerprintStore, StoreError};
