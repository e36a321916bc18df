mod client;

pub use client::AnalyzerApiClient;
