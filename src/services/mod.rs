pub mod report_api;
