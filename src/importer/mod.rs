pub mod loader;

pub use loader::{DEFAULT_DELIMITER, LoadError, LoadOutcome, ParcelLoader, SkippedRow};
