// Library exports for binary tools and tests
pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

pub use app::AppState;
