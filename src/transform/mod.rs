pub mod combiner;
pub mod daily_aggregator;
pub mod error;
pub mod table_io;
