pub mod catalog_store;
pub mod storage_manager;

pub use catalog_store::*;
pub use storage_manager::*;
