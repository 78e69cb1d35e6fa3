// Application layer - use cases and the ports they depend on
pub mod dashboard_controller;
pub mod layout_engine;
pub mod metrics_loader;
pub mod preset_catalog;
pub mod preset_repository;
pub mod report_service;
pub mod widget_binder;
