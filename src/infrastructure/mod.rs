// Infrastructure layer - External dependencies and adapters
pub mod api_client;
pub mod calendar_client;
pub mod config;
pub mod http_repository;
pub mod logging;
pub mod pdf_renderer;
#[cfg(test)]
pub mod test_server;
