pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::AppError;
pub use services::pipeline_service::{start_pipeline, Pipeline, PipelineHandle};
