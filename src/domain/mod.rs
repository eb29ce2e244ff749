pub mod parcel;
pub mod sort;

pub use parcel::{Field, NOT_AVAILABLE, Parcel, ParcelError};
pub use sort::{SortKey, sort_parcels};
