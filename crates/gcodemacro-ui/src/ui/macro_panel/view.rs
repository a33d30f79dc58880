//! View model for the macro panel
//!
//! Plain data describing what to draw. Hosts map it onto their toolkit; the
//! text renderer maps it onto lines.

use gcodemacro_core::{FetchState, Macro, MacroId};
use serde::Serialize;

use super::selectors::MacroFlags;
use crate::i18n::tr;

/// Shown while the first response is pending
pub const LOADING_MESSAGE: &str = "Loading...";
/// Shown when the last request failed
pub const ERROR_MESSAGE: &str = "An error occurred while fetching data.";
/// Shown when the list is empty
pub const EMPTY_MESSAGE: &str = "No macros available";

/// Icons used by panel buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Icon {
    /// New
    Plus,
    /// Export
    FileExport,
    /// Refresh
    SyncAlt,
    /// Run
    Play,
    /// Load
    ChevronUp,
    /// Edit
    Edit,
}

impl Icon {
    /// Single-glyph rendering
    pub fn glyph(&self) -> &'static str {
        match self {
            Icon::Plus => "+",
            Icon::FileExport => "⇪",
            Icon::SyncAlt => "⟳",
            Icon::Play => "▶",
            Icon::ChevronUp => "▲",
            Icon::Edit => "✎",
        }
    }
}

/// What a button does when pressed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum PanelAction {
    /// Open the creation dialog
    New,
    /// Export the macro list (no behaviour yet)
    Export,
    /// Clear and refetch the list
    Refresh,
    /// Open the run dialog for a macro
    Run(MacroId),
    /// Open the load dialog for a macro
    Load(MacroId),
    /// Open the edit dialog for a macro
    Edit(MacroId),
}

/// A button
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonView {
    /// Visible text, if any, translated
    pub label: Option<String>,
    /// Tooltip, translated
    pub title: Option<String>,
    /// Leading icon
    pub icon: Icon,
    /// False when the action is gated off
    pub enabled: bool,
    /// Action performed when pressed
    pub action: PanelAction,
}

impl ButtonView {
    fn new(icon: Icon, action: PanelAction) -> Self {
        Self {
            label: None,
            title: None,
            icon,
            enabled: true,
            action,
        }
    }

    fn label(mut self, msgid: &str) -> Self {
        self.label = Some(tr(msgid));
        self
    }

    fn title(mut self, msgid: &str) -> Self {
        self.title = Some(tr(msgid));
        self
    }

    fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Header row: New on the left, Export and Refresh on the right
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderView {
    /// New button
    pub new: ButtonView,
    /// Hidden when disabled in settings
    pub export: Option<ButtonView>,
    /// Refresh button
    pub refresh: ButtonView,
}

impl HeaderView {
    pub(crate) fn build(show_export: bool) -> Self {
        Self {
            new: ButtonView::new(Icon::Plus, PanelAction::New).label("New"),
            export: show_export
                .then(|| ButtonView::new(Icon::FileExport, PanelAction::Export).label("Export")),
            refresh: ButtonView::new(Icon::SyncAlt, PanelAction::Refresh).title("Refresh"),
        }
    }
}

/// One macro in the list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MacroRowView {
    /// Macro id
    pub id: MacroId,
    /// Macro name as stored
    pub name: String,
    /// Gated by `can_run_macro`
    pub run: ButtonView,
    /// Gated by `can_load_macro`
    pub load: ButtonView,
    /// Never gated
    pub edit: ButtonView,
}

/// Panel body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BodyView {
    /// No fetch state observed yet
    Nothing,
    /// First request in flight
    Loading,
    /// Last request failed
    Error,
    /// Loaded an empty list
    Empty,
    /// One row per macro, in order
    Rows(Vec<MacroRowView>),
}

impl BodyView {
    /// Build the body from the latest fetch state
    ///
    /// Precedence: loading without data, then error (even with stale
    /// data), then empty, then rows.
    pub fn build(fetch: Option<&FetchState>, flags: MacroFlags) -> Self {
        let Some(fetch) = fetch else {
            return BodyView::Nothing;
        };
        let context = &fetch.context;

        if context.is_fetching && context.data.is_none() {
            return BodyView::Loading;
        }

        if context.is_error {
            return BodyView::Error;
        }

        let records: &[Macro] = match &context.data {
            Some(data) => &data.records,
            None => &[],
        };
        if records.is_empty() {
            return BodyView::Empty;
        }

        BodyView::Rows(
            records
                .iter()
                .map(|m| MacroRowView {
                    id: m.id.clone(),
                    name: m.name.clone(),
                    run: ButtonView::new(Icon::Play, PanelAction::Run(m.id.clone()))
                        .title("Run Macro")
                        .enabled(flags.can_run_macro),
                    load: ButtonView::new(Icon::ChevronUp, PanelAction::Load(m.id.clone()))
                        .title("Load Macro")
                        .enabled(flags.can_load_macro),
                    edit: ButtonView::new(Icon::Edit, PanelAction::Edit(m.id.clone())),
                })
                .collect(),
        )
    }

    /// Translated status message for non-list bodies
    pub fn message(&self) -> Option<String> {
        let msgid = match self {
            BodyView::Loading => LOADING_MESSAGE,
            BodyView::Error => ERROR_MESSAGE,
            BodyView::Empty => EMPTY_MESSAGE,
            BodyView::Nothing | BodyView::Rows(_) => return None,
        };
        Some(tr(msgid))
    }

    /// Rows, if the body is a list
    pub fn rows(&self) -> &[MacroRowView] {
        match self {
            BodyView::Rows(rows) => rows,
            _ => &[],
        }
    }
}

/// Whole panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MacroPanelView {
    /// Header buttons
    pub header: HeaderView,
    /// List or status message
    pub body: BodyView,
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcodemacro_core::{FetchContext, FetchStatus, MacroRecords};

    fn fetch(is_fetching: bool, is_error: bool, data: Option<Vec<Macro>>) -> FetchState {
        FetchState {
            status: FetchStatus::Idle,
            context: FetchContext {
                is_fetching,
                is_error,
                data: data.map(MacroRecords::new),
                error: None,
            },
            generation: 0,
        }
    }

    #[test]
    fn test_nothing_before_first_state() {
        assert_eq!(BodyView::build(None, MacroFlags::default()), BodyView::Nothing);
    }

    #[test]
    fn test_loading_without_data() {
        let body = BodyView::build(Some(&fetch(true, false, None)), MacroFlags::default());
        assert_eq!(body.message().as_deref(), Some("Loading..."));
    }

    #[test]
    fn test_refetch_with_data_keeps_rows() {
        let state = fetch(true, false, Some(vec![Macro::new("1", "M1", "G0")]));
        let body = BodyView::build(Some(&state), MacroFlags::default());
        assert_eq!(body.rows().len(), 1);
    }

    #[test]
    fn test_error_wins_over_stale_data() {
        let state = fetch(false, true, Some(vec![Macro::new("1", "M1", "G0")]));
        let body = BodyView::build(Some(&state), MacroFlags::default());
        assert_eq!(body, BodyView::Error);
        assert_eq!(
            body.message().as_deref(),
            Some("An error occurred while fetching data.")
        );
    }

    #[test]
    fn test_idle_without_data_is_empty() {
        let body = BodyView::build(Some(&fetch(false, false, None)), MacroFlags::default());
        assert_eq!(body.message().as_deref(), Some("No macros available"));
    }

    #[test]
    fn test_row_gating() {
        let state = fetch(false, false, Some(vec![Macro::new("1", "M1", "G0")]));
        let flags = MacroFlags {
            can_load_macro: false,
            can_run_macro: true,
        };
        let body = BodyView::build(Some(&state), flags);
        let row = &body.rows()[0];
        assert_eq!(row.name, "M1");
        assert!(row.run.enabled);
        assert!(!row.load.enabled);
        assert!(row.edit.enabled);
        assert_eq!(row.load.action, PanelAction::Load(MacroId::from("1")));
    }

    #[test]
    fn test_header_export_toggle() {
        assert!(HeaderView::build(true).export.is_some());
        let header = HeaderView::build(false);
        assert!(header.export.is_none());
        assert!(header.new.enabled);
        assert_eq!(header.refresh.title.as_deref(), Some("Refresh"));
    }
}
