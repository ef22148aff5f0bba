//! Knowledge base storage: JSON snapshots (the source of truth), lookup
//! with substring fallback, and Arrow/Parquet export.

mod error;
pub use error::StoreError;

pub mod arrow_io;
pub mod lookup;
pub mod snapshot;

pub use arrow_io::{from_batches, to_record_batch};
#[cfg(feature = "parquet")]
pub use arrow_io::{read_parquet, write_parquet};
pub use lookup::{lookup, lookup_or_not_found};
pub use snapshot::{load, load_or_default, save};
