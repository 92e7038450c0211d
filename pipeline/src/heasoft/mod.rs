pub mod driver;
pub mod env;
pub mod tasks;

pub use driver::PhotometryDriver;
pub use env::{HeasoftConfig, HeasoftEnv};
pub use tasks::{DryRunner, PhotometryConfig, ProcessRunner};
