pub mod config;
pub mod error;
pub mod signals;
pub mod text;
pub mod types;

pub use config::{Config, CurationPolicy};
pub use error::AlmanacError;
pub use signals::RegionProfile;
pub use types::*;
