//! Pure cooldown and affordability math shared by every command.

pub mod affordability;
pub mod category;
pub mod cooldown;

pub use affordability::{afford_date, comfort_months, months_to_afford, quote, Affordability, Quote};
pub use cooldown::validate_ranges;
