//! MongoDB source integration

pub mod client;
pub mod convert;

pub use client::MongoSourceClient;
