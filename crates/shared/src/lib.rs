pub mod geometry;
pub mod models;
pub mod picking;
pub mod protocol;

pub use protocol::DecodeError;
