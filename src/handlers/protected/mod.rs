// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every route here sits behind `jwt_auth_middleware` and
// `validate_user_middleware`, so handlers can rely on a `ValidatedUser`
// extension being present.

pub mod hello;
pub mod incantation;
pub mod sigils;
pub mod utils;

pub use hello::hello_get;
pub use incantation::incantation_post;
