mod models;
mod symbol;
mod timestamp;

pub use models::{clean_profile_label, PricePoint, PriceSeries, TickerFundamentals};
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
