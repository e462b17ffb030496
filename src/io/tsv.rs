//! TSV Serializing helpers.

use lazy_static::lazy_static;

lazy_static! {
    /// The standard BED format TSV configuration.
    pub static ref BED_TSV: TsvConfig = TsvConfig {
        no_value_string: ".".to_string(),
    };
}

/// This is an extensible type to handle common TSV output configurations,
/// e.g. what to print for `None`.
pub struct TsvConfig {
    pub no_value_string: String,
}
