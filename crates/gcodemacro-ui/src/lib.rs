//! # GCodeMacro UI
//!
//! Toolkit-independent view models for GCodeMacro panels.

#![warn(missing_docs)]

pub mod i18n;
pub mod ui;

pub use gcodemacro_settings::{Config, LoggingSettings, MacroSettings, UiSettings};

pub use i18n::{init_translations, resolve_language, tr};
pub use ui::macro_panel::{
    render_text, select_macro_flags, BodyView, ButtonView, HeaderView, Icon, MacroFlags,
    MacroPanel, MacroPanelView, MacroRowView, PanelAction, PanelError,
};
