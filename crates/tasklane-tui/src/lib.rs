pub mod app;
pub mod components;
pub mod config;
pub mod controllers;
pub mod dispatch;
pub mod router;
