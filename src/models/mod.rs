pub mod poster;

pub use poster::{FaqEntry, PosterRecord, Provenance};
