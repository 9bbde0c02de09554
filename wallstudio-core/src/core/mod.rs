// export all modules
pub mod app;
pub mod error;
pub mod filter;
pub mod http;
pub mod image;
pub mod library;
pub mod persist;
pub mod request;
pub mod services;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;
