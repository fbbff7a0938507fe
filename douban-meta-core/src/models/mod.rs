pub mod image;
pub mod locale;
pub mod mapping;
pub mod subject;

pub use image::*;
pub use locale::*;
pub use mapping::*;
pub use subject::*;
