pub mod catalog;
pub mod config;
pub mod converge;
pub mod error;
pub mod io;
pub mod params;
pub mod paths;
pub mod pipeline;
pub mod propagate;
pub mod provider;
pub mod types;

pub use error::{DeployError, Result};
