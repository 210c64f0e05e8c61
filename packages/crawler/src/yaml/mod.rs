//! YAML output generation for calendar and summary files.

mod writer;

pub use writer::{generate_yaml, save_yaml};
