pub mod aggregate;
pub mod client;
