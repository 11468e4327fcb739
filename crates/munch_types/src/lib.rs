pub mod card;
pub mod constants;
pub mod contracts;
pub mod query;

pub use card::*;
pub use constants::*;
pub use contracts::*;
pub use query::*;
