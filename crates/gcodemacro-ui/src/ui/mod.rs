//! UI panels

pub mod macro_panel;
