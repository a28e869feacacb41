pub mod sigil;
pub mod user;

pub use sigil::{LayoutType, LetterAssignment, LetterSlot, SigilRecord, CIRCLE_VERTEX_COUNT, MAX_LAYOUT_TYPE_CHARS};
pub use user::User;
