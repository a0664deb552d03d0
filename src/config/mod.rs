pub mod curation_config;
pub mod site_config;

pub use curation_config::*;
pub use site_config::*;
