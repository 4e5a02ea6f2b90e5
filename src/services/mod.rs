pub mod analysis_service;
pub mod decode_cache;
pub mod pipeline_service;
pub mod thumbnail_service;
