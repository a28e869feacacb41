// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Service description and liveness only. Everything that touches user data
// lives under `protected`.

pub mod health;
pub mod root;

pub use health::health;
pub use root::root;
