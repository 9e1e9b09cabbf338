pub mod local;
pub mod migrations;
pub mod repository;

pub use local::LocalStore;
