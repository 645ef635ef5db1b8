pub mod analysis;
pub mod error;
pub mod locate;
pub mod log;
pub mod render;

pub use error::{Error, Result};
