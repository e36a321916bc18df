pub mod analyzer_api;
