//! Core types for provexec.

pub mod event;
pub mod message;
pub mod ui;

pub use event::*;
pub use message::*;
pub use ui::*;
