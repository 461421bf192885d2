pub mod client;
pub mod error;
pub mod request;
pub mod response;
pub mod response_cache;
pub mod retry;
