pub mod auth;
pub mod request;
pub mod storage;
