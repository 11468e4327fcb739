pub const SUCCESS_CODE: u16 = 200;

pub const HOUR_OPEN_NOW: &str = "Open Now";
pub const HOUR_BREAKFAST: &str = "Breakfast";
pub const HOUR_LUNCH: &str = "Lunch";
pub const HOUR_DINNER: &str = "Dinner";
pub const HOUR_SUPPER: &str = "Supper";

pub const HOUR_NAMES: [&str; 5] = [
    HOUR_OPEN_NOW,
    HOUR_BREAKFAST,
    HOUR_LUNCH,
    HOUR_DINNER,
    HOUR_SUPPER,
];

pub const PRICE_CHEAP: &str = "$";
pub const PRICE_MODERATE: &str = "$$";
pub const PRICE_EXPENSIVE: &str = "$$$";

/// Maximum entries kept in the recent location list
pub const MAX_RECENT_LOCATIONS: usize = 8;

/// Number of placeholder cards emitted before the first page arrives
pub const LOADING_CARD_COUNT: usize = 3;
