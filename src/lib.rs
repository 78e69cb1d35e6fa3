// Dashboard layouts - widget grid layouts, presets and reports
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
