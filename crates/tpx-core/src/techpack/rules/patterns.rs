//! Common regex patterns for techpack extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Runs of spaces/tabs; newlines are boundaries and must survive
    pub static ref HORIZONTAL_WHITESPACE: Regex = Regex::new(r"[ \t]+").unwrap();

    // Slash-separated day/month/year after separator normalization
    pub static ref DATE_DMY_SLASHED: Regex = Regex::new(
        r"^(\d{1,2})/(\d{1,2})/(\d{4}|\d{2})$"
    ).unwrap();
}
