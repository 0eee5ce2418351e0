use chrono::NaiveTime;

pub const CATALOG_JSON: &str = "canteen_data.json";
pub const CATALOG_DB: &str = "canteen.sqlite";

pub const TIME_FORMAT: &str = "%H:%M";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// legacy file and export are written with 4 spaces
pub const JSON_INDENT: &[u8] = b"    ";

// form defaults
pub const DEFAULT_BUSY_START: (u32, u32) = (11, 0);
pub const DEFAULT_BUSY_END: (u32, u32) = (13, 0);
pub const DEFAULT_OPENING: (u32, u32) = (7, 0);
pub const DEFAULT_CLOSING: (u32, u32) = (16, 0);

pub fn hm(hour_minute: (u32, u32)) -> NaiveTime {
    // all default constants above are valid wall-clock times
    NaiveTime::from_hms_opt(hour_minute.0, hour_minute.1, 0).unwrap_or(NaiveTime::MIN)
}
