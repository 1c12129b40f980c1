use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph, Tabs};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::bracket::{EliminationView, RenderContext, RoundRobinView, SwissView};
use crate::components::theme::{Role, resolve};
use crate::state::app_state::{ChangeEntry, ChangeKind};
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::layout::{LayoutAreas, area_in_px, content_transform, max_scroll};
use tourneyview_engine::{BracketType, BracketView};

static TABS: &[&str; 2] = &["Bracket", "Changes"];

static HELP: &[(&str, &str)] = &[
    ("1", "bracket"),
    ("2", "change feed"),
    ("?", "this help (Esc to leave)"),
    ("h j k l / arrows", "pan the bracket, scroll the change feed"),
    ("g", "back to the top-left corner"),
    ("r", "reload the snapshot and redraw from scratch"),
    ("f", "full screen"),
    ("\"", "toggle the log pane"),
    ("q / Ctrl-C", "quit"),
];

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        match app.state.active_tab {
            MenuItem::Bracket => draw_bracket(f, layout.main, app),
            MenuItem::Changes => draw_changes(f, layout.main, app),
            MenuItem::Help => draw_help(f, layout.main),
        }

        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });

    if let Err(e) = result {
        log::error!("draw failed: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Bracket => 0,
        MenuItem::Changes => 1,
        MenuItem::Help => 0,
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

// ---------------------------------------------------------------------------
// Bracket tab
// ---------------------------------------------------------------------------

fn draw_bracket(f: &mut Frame, area: Rect, app: &mut App) {
    let title = app
        .state
        .view
        .outcome
        .as_ref()
        .map_or_else(|| " Bracket ".to_string(), |o| format!(" {} · {} ", o.bracket_name, o.group_name));
    let block = default_border(Color::White).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [header, content] = Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(inner);

    if let Some(size) = app.state.view.outcome.as_ref().map(|o| o.content_size) {
        let (max_x, max_y) = max_scroll(content, size);
        app.state.view.clamp_scroll(max_x, max_y);
    }
    sync_autoscroll(app, content);
    let app = &*app;

    let Some(outcome) = app.state.view.outcome.as_ref() else {
        let msg = if let Some(err) = app.state.last_error.as_deref() {
            format!("Snapshot load failed:\n{err}")
        } else {
            "Loading snapshot...".to_string()
        };
        f.render_widget(
            Paragraph::new(msg)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    };

    f.render_widget(Paragraph::new(header_line(app)), header);

    let view = &app.state.view;
    let size = outcome.content_size;
    let ctx = RenderContext {
        fields: app.render_state(),
        highlights: &view.highlights,
        matches: &view.matches,
        animation: &app.state.animation,
        transform: content_transform(content, size, view.scroll_x, view.scroll_y),
    };

    match &outcome.view {
        BracketView::Elimination(layout) => f.render_widget(EliminationView { layout, ctx: &ctx }, content),
        BracketView::RoundRobin(grid) => f.render_widget(RoundRobinView { grid, ctx: &ctx }, content),
        BracketView::Swiss(list) => f.render_widget(
            SwissView { list, ctx: &ctx, scroll_top: view.autoscroll.scroll_top(), mask: view.autoscroll.mask() },
            content,
        ),
    }
}

/// Feeds the Swiss autoscroller the current viewport and starts or stops it
/// depending on whether the round fits.
fn sync_autoscroll(app: &mut App, content: Rect) {
    let view = &mut app.state.view;
    let Some(BracketView::Swiss(list)) = view.outcome.as_ref().map(|o| &o.view) else {
        return;
    };
    let viewport = view.autoscroll.set_viewport(area_in_px(content).height);
    if list.height > viewport {
        view.autoscroll.start();
    } else if view.autoscroll.is_running() {
        view.autoscroll.stop();
    }
}

fn header_line(app: &App) -> Line<'static> {
    let Some(outcome) = app.state.view.outcome.as_ref() else {
        return Line::default();
    };

    let mut text = outcome.bracket_type.label().to_string();
    if outcome.bracket_type == BracketType::Swiss
        && let BracketView::Swiss(list) = &outcome.view
        && let Some(round) = list.round_number
    {
        text.push_str(&format!(" | Round {round}"));
    }
    if let Some(at) = app.state.view.last_loaded_at.as_deref() {
        text.push_str(&format!(" | updated {at}"));
    }

    let mut spans = vec![Span::styled(text, Style::default().fg(Color::Gray))];
    if let Some(err) = app.state.last_error.as_deref() {
        spans.push(Span::styled(format!("  {ERROR_CHAR} {err}"), Style::default().fg(Color::Red)));
    }
    Line::from(spans)
}

// ---------------------------------------------------------------------------
// Changes tab
// ---------------------------------------------------------------------------

fn draw_changes(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(format!(" Changes ({}) ", app.state.changes.len()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if app.state.changes.is_empty() {
        f.render_widget(
            Paragraph::new("No changes yet")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let lines: Vec<Line> = app.state.changes.entries().map(change_line).collect();
    f.render_widget(Paragraph::new(lines).scroll((app.state.changes.scroll_offset, 0)), inner);
}

fn change_line(entry: &ChangeEntry) -> Line<'static> {
    let at = Span::styled(format!("{}  ", entry.at), resolve(Role::Dim));
    match &entry.kind {
        ChangeKind::Rebuild { title, fields } => Line::from(vec![
            at,
            Span::styled(format!("rebuilt {title}, {fields} fields"), resolve(Role::Header)),
        ]),
        ChangeKind::Update(action) => Line::from(vec![
            at,
            Span::raw(format!("{:<14} {:<13} ", action.id, action.field.to_string())),
            Span::styled(action.old_value.clone().unwrap_or_else(|| "-".to_string()), resolve(Role::Dim)),
            Span::raw(" → "),
            Span::styled(action.new_value.clone(), resolve(Role::Live)),
        ]),
    }
}

// ---------------------------------------------------------------------------
// Help, logs, spinner
// ---------------------------------------------------------------------------

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::White).title(" Help ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines: Vec<Line> = HELP
        .iter()
        .map(|(key, what)| {
            Line::from(vec![
                Span::styled(format!("{key:>18}  "), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(*what),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Gray))
        .style_debug(Style::default().fg(Color::DarkGray));
    f.render_widget(logs, area);
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}
