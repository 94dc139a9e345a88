pub mod applicant;
pub mod config;
pub mod features;
pub mod logging;
pub mod model;
pub mod output;
pub mod preprocessing;
pub mod scoring;
pub mod stderr_buffer;
pub mod tui;
