//! Value rules applied to extracted techpack fields.

pub mod dates;
pub mod patterns;

pub use dates::{expand_year, normalize_date, parse_date};
pub use patterns::*;
