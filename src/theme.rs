use ratatui::style::{Color, Modifier, Style};

/// Colors used by the document view and the surrounding chrome.
#[derive(Clone, Debug)]
pub struct Theme {
    /// Foreground (text) color for the status bar
    pub status_bar_fg: Color,

    /// Background color for the status bar
    pub status_bar_bg: Color,

    /// Color for the level title in the ribbon line
    pub title_color: Color,

    /// Foreground color for the active ribbon tab
    pub tab_active_fg: Color,

    /// Background color for the active ribbon tab
    pub tab_active_bg: Color,

    /// Foreground color for inactive ribbon tabs
    pub tab_inactive_fg: Color,

    /// Background color for selected sentences
    pub selection_bg: Color,

    /// Foreground color for selected sentences
    pub selection_fg: Color,

    /// Color for pending insertions
    pub insertion_color: Color,

    /// Color for pending deletions
    pub deletion_color: Color,

    /// Color for sentences whose change was rejected
    pub rejected_color: Color,

    /// Foreground color for marked citations
    pub citation_fg: Color,

    /// Background color for marked citations
    pub citation_bg: Color,

    /// Color for Table of Authorities lines
    pub toa_color: Color,

    /// Color for other verbatim blocks
    pub special_color: Color,

    /// Color for the placement preview slot
    pub placement_color: Color,

    /// Foreground color for menu items
    pub menu_fg: Color,

    /// Background color for menu
    pub menu_bg: Color,

    /// Foreground color for disabled menu items
    pub menu_disabled_fg: Color,

    /// Foreground color for selected menu entry
    pub menu_selected_fg: Color,

    /// Background color for selected menu entry
    pub menu_selected_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            status_bar_fg: Color::White,
            status_bar_bg: Color::Blue,
            title_color: Color::LightYellow,
            tab_active_fg: Color::Black,
            tab_active_bg: Color::White,
            tab_inactive_fg: Color::Gray,
            selection_bg: Color::LightBlue,
            selection_fg: Color::White,
            insertion_color: Color::Green,
            deletion_color: Color::Red,
            rejected_color: Color::DarkGray,
            citation_fg: Color::Black,
            citation_bg: Color::LightYellow,
            toa_color: Color::Cyan,
            special_color: Color::DarkGray,
            placement_color: Color::LightMagenta,
            menu_fg: Color::White,
            menu_bg: Color::Black,
            menu_disabled_fg: Color::DarkGray,
            menu_selected_fg: Color::Black,
            menu_selected_bg: Color::White,
        }
    }
}

impl Theme {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status_bar_style(&self) -> Style {
        Style::default()
            .fg(self.status_bar_fg)
            .bg(self.status_bar_bg)
    }

    pub fn title_style(&self) -> Style {
        Style::default()
            .fg(self.title_color)
            .add_modifier(Modifier::BOLD)
    }

    pub fn tab_style(&self, active: bool) -> Style {
        if active {
            Style::default()
                .fg(self.tab_active_fg)
                .bg(self.tab_active_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.tab_inactive_fg)
        }
    }

    pub fn selection_style(&self) -> Style {
        Style::default().fg(self.selection_fg).bg(self.selection_bg)
    }

    /// The sentence the user is on. Drawn on top of every other style.
    pub fn focus_style(&self) -> Style {
        Style::default().add_modifier(Modifier::REVERSED)
    }

    pub fn insertion_style(&self) -> Style {
        Style::default()
            .fg(self.insertion_color)
            .add_modifier(Modifier::UNDERLINED)
    }

    pub fn deletion_style(&self) -> Style {
        Style::default()
            .fg(self.deletion_color)
            .add_modifier(Modifier::CROSSED_OUT)
    }

    pub fn rejected_style(&self) -> Style {
        Style::default()
            .fg(self.rejected_color)
            .add_modifier(Modifier::CROSSED_OUT)
    }

    pub fn citation_style(&self) -> Style {
        Style::default().fg(self.citation_fg).bg(self.citation_bg)
    }

    pub fn toa_style(&self) -> Style {
        Style::default().fg(self.toa_color)
    }

    pub fn special_style(&self) -> Style {
        Style::default().fg(self.special_color)
    }

    pub fn placement_style(&self) -> Style {
        Style::default()
            .fg(self.placement_color)
            .add_modifier(Modifier::BOLD)
    }

    pub fn menu_style(&self) -> Style {
        Style::default().fg(self.menu_fg).bg(self.menu_bg)
    }

    pub fn menu_disabled_style(&self) -> Style {
        Style::default().fg(self.menu_disabled_fg)
    }

    pub fn menu_selected_style(&self) -> Style {
        Style::default()
            .fg(self.menu_selected_fg)
            .bg(self.menu_selected_bg)
    }
}
