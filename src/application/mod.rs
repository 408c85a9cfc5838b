// Application layer - Use cases over the telemetry store
pub mod dashboard_service;
pub mod query_pipeline;
pub mod telemetry_repository;
