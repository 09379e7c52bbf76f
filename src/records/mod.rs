// Normalized records built from loosely-typed backend output.

mod container;
mod image;
mod status;

pub use container::{ContainerRecord, ContainerState};
pub use image::ImageRecord;
pub use status::{BuilderStatusRecord, SystemStatusRecord};
