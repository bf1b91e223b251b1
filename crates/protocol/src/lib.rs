//! # Biograph Protocol
//!
//! Records shared by the extraction and graph crates: letters, trips,
//! photos and the biography aggregate, plus the archive store seam that
//! persists them.

mod date;
mod error;
mod letter;
mod record;
mod store;

pub use date::{parse_letter_date, try_parse_date, SENTINEL_DATE};
pub use error::{ProtocolError, Result};
pub use letter::{dedup_names, EntityCategory, Letter};
pub use record::{BiographyBasics, BiographyRecord, Photo, PhotoCategory, Trip};
pub use store::{ArchiveStore, JsonFileArchiveStore, MemoryArchiveStore};
