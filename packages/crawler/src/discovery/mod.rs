//! Discovery of per-year download links.
//!
//! - [`extract`]: listing page → year/link map
//! - [`validate`]: confirm a link carries the year it is filed under
//! - [`select`]: pick the years a run attempts

mod extract;
mod select;
mod validate;

pub use extract::{discover_year_links, extract_year_links};
pub use select::select_target_years;
pub use validate::validate_link;
