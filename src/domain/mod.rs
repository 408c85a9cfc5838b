// Domain layer - Series tables, derived metrics and dashboard model
pub mod dashboard;
pub mod decoration;
pub mod derived;
pub mod series;
