//! Profile data model and structured-output decoding.

mod decode;
mod profile;
mod role;

pub use decode::{decode_profile_fields, response_schema, GeneratedFields, ProfileParseError};
pub use profile::{Profile, MAX_TAGS};
pub use role::Role;
