pub mod create;
pub mod list;
pub mod show;

// Re-export handler functions for use in routing
pub use create::create;
pub use list::list;
pub use show::show;
