pub mod generator;
pub mod ranking;

pub use generator::ImageUrlGenerator;
pub use ranking::{locale_rank, rank_images, select_best, select_images};
