pub mod traits;

// Reference data sources
pub mod http;
pub mod static_json;
