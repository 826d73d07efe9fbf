//! Firmware tasks
//!
//! Core0 runs the embassy tasks; core1 runs [`render_loop`] on its own.

pub mod acquisition;
pub mod buttons;
pub mod link;
pub mod render;
pub mod report;

pub use acquisition::acquisition_task;
pub use buttons::buttons_task;
pub use link::{link_rx_task, link_tx_task};
pub use render::render_loop;
pub use report::report_task;
