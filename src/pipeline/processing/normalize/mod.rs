//! Field-level normalization applied before a notice becomes a table row.

pub mod date;
pub mod text;
pub mod value;

pub use date::normalize_date;
pub use text::{sanitize, sanitize_text};
pub use value::{clamp_amount, normalize_value, parse_amount};
