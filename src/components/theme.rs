use tui::style::{Color, Modifier, Style};

/// What a piece of text means on screen; mapped to one style each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Primary,
    Header,
    Dim,
    Winner,
    Loser,
    Live,
    /// A field whose text just changed.
    Changed,
}

pub fn resolve(role: Role) -> Style {
    match role {
        Role::Primary => Style::default().fg(Color::Gray),
        Role::Header => Style::default().fg(Color::Rgb(0, 122, 195)).add_modifier(Modifier::BOLD),
        Role::Dim => Style::default().fg(Color::Indexed(240)),
        Role::Winner => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        Role::Loser => Style::default().fg(Color::Red),
        Role::Live => Style::default().fg(Color::Rgb(255, 103, 31)),
        Role::Changed => Style::default().fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD),
    }
}
