pub mod form;
pub mod format;

pub use form::{parse_loose_bool, parse_optional_float, ImageUpload, SigilForm, SigilSubmission};
pub use format::SigilResponse;
