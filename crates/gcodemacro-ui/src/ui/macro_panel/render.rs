//! Plain-text rendering of the macro panel

use super::view::{BodyView, ButtonView, MacroPanelView};

fn button(view: &ButtonView) -> String {
    let text = match (&view.label, &view.title) {
        (Some(label), _) => format!("{} {}", view.icon.glyph(), label),
        (None, Some(title)) => format!("{} {}", view.icon.glyph(), title),
        (None, None) => view.icon.glyph().to_string(),
    };
    if view.enabled {
        format!("[{}]", text)
    } else {
        format!("({})", text)
    }
}

/// Render the panel as lines of text
///
/// Enabled buttons are bracketed, disabled ones parenthesized.
pub fn render_text(view: &MacroPanelView) -> Vec<String> {
    let mut header = vec![button(&view.header.new)];
    if let Some(export) = &view.header.export {
        header.push(button(export));
    }
    header.push(button(&view.header.refresh));

    let mut lines = vec![header.join(" ")];
    match &view.body {
        BodyView::Nothing => {}
        BodyView::Rows(rows) => {
            for row in rows {
                lines.push(format!(
                    "{} {} {} {}",
                    button(&row.run),
                    row.name,
                    button(&row.load),
                    button(&row.edit)
                ));
            }
        }
        body => lines.extend(body.message()),
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::macro_panel::selectors::MacroFlags;
    use crate::ui::macro_panel::view::HeaderView;
    use gcodemacro_core::{FetchEvent, FetchState, Macro, MacroRecords};

    #[test]
    fn test_render_loading() {
        let fetching = FetchState::default().transition(FetchEvent::Fetch);
        let view = MacroPanelView {
            header: HeaderView::build(true),
            body: BodyView::build(Some(&fetching), MacroFlags::default()),
        };
        assert_eq!(
            render_text(&view),
            vec!["[+ New] [⇪ Export] [⟳ Refresh]", "Loading..."]
        );
    }

    #[test]
    fn test_render_rows() {
        let mut state = FetchState::default();
        state.context.data = Some(MacroRecords::new(vec![Macro::new("1", "M1", "G0")]));
        let flags = MacroFlags {
            can_load_macro: false,
            can_run_macro: true,
        };
        let view = MacroPanelView {
            header: HeaderView::build(false),
            body: BodyView::build(Some(&state), flags),
        };
        assert_eq!(
            render_text(&view),
            vec![
                "[+ New] [⟳ Refresh]",
                "[▶ Run Macro] M1 (▲ Load Macro) [✎]"
            ]
        );
    }
}
