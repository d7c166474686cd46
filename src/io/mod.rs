//! IO module - run configuration files.

mod config;

pub use config::{read_config, OptimizerConfig, RunConfig, SamplerConfig, SystemConfig};
