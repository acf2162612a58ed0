/*
[INPUT]:  Decoded JSON bodies and raw transport responses
[OUTPUT]: Request parameters, records, and decorated API responses
[POS]:    Data layer - shared types
[UPDATE]: When adding new types or modules
*/

pub mod coerce;
pub mod enums;
pub mod params;
pub mod record;
pub mod responses;

pub use coerce::{coerce_str, looks_numeric};
pub use enums::*;
pub use params::Params;
pub use record::{FieldValue, Record};
pub use responses::{ApiResponse, NormalizedResponse, Payload, ResponseMeta};
