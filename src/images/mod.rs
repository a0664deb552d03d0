pub mod image_audit;
pub mod image_resizer;

pub use image_audit::*;
pub use image_resizer::*;
