pub mod catalog;
pub mod config;
pub mod core_api;
pub mod document;
pub mod persist;
pub mod roots;
pub mod store;

pub use catalog::Catalog;
pub use config::Config;
pub use store::{Profile, ProfileStore};
