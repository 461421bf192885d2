pub mod column_spec;
pub mod coordinate;
pub mod data_source;
pub mod fetch_window;
pub mod relative_date;
pub mod units;
pub mod weather_code;
