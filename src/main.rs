use std::{
    env, fs, io,
    path::PathBuf,
    sync::Mutex,
    time::{Duration, Instant},
};

use anyhow::{Context, Result, anyhow, bail};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Clear, List, ListItem, ListState, Paragraph, Scrollbar,
        ScrollbarOrientation, ScrollbarState, Wrap,
    },
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use brief_tui::document::{BlockId, SentenceTag};
use brief_tui::editor::{DocumentEditor, EditAction, FONT_FAMILIES, FONT_SIZES, Selection};
use brief_tui::html::serialize_document;
use brief_tui::level::Level;
use brief_tui::notify::{Notifier, Severity};
use brief_tui::render::{RenderResult, RenderState, render_document};
use brief_tui::theme::Theme;

const STATUS_TIMEOUT: Duration = Duration::from_secs(4);
const USAGE: &str = "Usage: brief [--level N | --level-file PATH] [--output PATH]";

fn main() -> Result<()> {
    run()
}

enum LevelSource {
    Builtin(u32),
    File(PathBuf),
}

struct Options {
    level: LevelSource,
    output: Option<PathBuf>,
}

/// `None` means usage was requested.
fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Option<Options>> {
    let mut options = Options {
        level: LevelSource::Builtin(1),
        output: None,
    };
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "--level" => {
                let value = args.next().context("--level needs a number")?;
                let id = value
                    .parse()
                    .with_context(|| format!("invalid level number {value:?}"))?;
                options.level = LevelSource::Builtin(id);
            }
            "--level-file" => {
                let value = args.next().context("--level-file needs a path")?;
                options.level = LevelSource::File(PathBuf::from(value));
            }
            "--output" | "-o" => {
                let value = args.next().context("--output needs a path")?;
                options.output = Some(PathBuf::from(value));
            }
            other => bail!("unexpected argument {other:?}\n{USAGE}"),
        }
    }
    Ok(Some(options))
}

/// Logs go to the file named by `BRIEF_LOG`; the terminal belongs to the UI.
fn init_logging() -> Result<()> {
    let Some(path) = env::var_os("BRIEF_LOG").map(PathBuf::from) else {
        return Ok(());
    };
    let file = fs::File::create(&path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow!("failed to install log subscriber: {err}"))
}

fn run() -> Result<()> {
    let Some(options) = parse_args(env::args().skip(1))? else {
        println!("{USAGE}");
        return Ok(());
    };
    init_logging()?;

    let level = match &options.level {
        LevelSource::Builtin(id) => Level::builtin(*id).context("failed to load level")?,
        LevelSource::File(path) => Level::load_file(path).context("failed to load level")?,
    };
    let output_path = options
        .output
        .unwrap_or_else(|| PathBuf::from(format!("brief-level-{}.html", level.id)));
    info!(level = level.id, title = %level.title, output = %output_path.display(), "starting level");

    let mut app = App::new(level, output_path);

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;
    terminal.clear().ok();

    let res = run_app(&mut terminal, &mut app).context("application error");

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    res
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    while !app.should_quit() {
        terminal
            .draw(|frame| app.draw(frame))
            .context("failed to draw frame")?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout).context("event poll failed")? {
            let evt = event::read().context("failed to read event")?;
            app.handle_event(evt)?;
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }
    }

    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum RibbonTab {
    Home,
    References,
    Review,
}

impl RibbonTab {
    const ALL: [Self; 3] = [Self::Home, Self::References, Self::Review];

    fn label(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::References => "References",
            Self::Review => "Review",
        }
    }

    fn next(self) -> Self {
        match self {
            Self::Home => Self::References,
            Self::References => Self::Review,
            Self::Review => Self::Home,
        }
    }

    fn previous(self) -> Self {
        match self {
            Self::Home => Self::Review,
            Self::References => Self::Home,
            Self::Review => Self::References,
        }
    }
}

#[derive(Clone, Copy)]
enum MenuAction {
    Heading(SentenceTag),
    FontFamily(&'static str),
    FontSize(&'static str),
    MarkCitation,
    InsertToa,
    UpdateToa,
    RemoveToa,
    AcceptSelected,
    RejectSelected,
    AcceptAll,
}

impl MenuAction {
    fn edit_action(self) -> EditAction {
        match self {
            Self::Heading(tag) => EditAction::ApplyHeading(tag),
            Self::FontFamily(family) => EditAction::SetFontFamily(family.to_string()),
            Self::FontSize(size) => EditAction::SetFontSize(size.to_string()),
            Self::MarkCitation => EditAction::MarkCitation,
            Self::InsertToa => EditAction::StartPlacement,
            Self::UpdateToa => EditAction::UpdateToa,
            Self::RemoveToa => EditAction::RemoveToa,
            Self::AcceptSelected => EditAction::AcceptSelected,
            Self::RejectSelected => EditAction::RejectSelected,
            Self::AcceptAll => EditAction::AcceptAll,
        }
    }
}

#[derive(Clone, Copy)]
struct MenuShortcut {
    key: char,
    requires_shift: bool,
}

impl MenuShortcut {
    const fn new(key: char) -> Self {
        Self {
            key,
            requires_shift: false,
        }
    }

    const fn with_shift(key: char) -> Self {
        Self {
            key,
            requires_shift: true,
        }
    }

    fn matches(&self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        match code {
            KeyCode::Char(ch) if ch == self.key => {
                if self.requires_shift {
                    modifiers == KeyModifiers::SHIFT
                } else {
                    modifiers.is_empty()
                }
            }
            _ => false,
        }
    }
}

#[derive(Clone, Copy)]
struct MenuItem {
    label: &'static str,
    action: Option<MenuAction>,
    shortcut: Option<MenuShortcut>,
}

impl MenuItem {
    const fn enabled(label: &'static str, action: MenuAction) -> Self {
        Self {
            label,
            action: Some(action),
            shortcut: None,
        }
    }

    const fn enabled_with_shortcut(
        label: &'static str,
        action: MenuAction,
        shortcut: MenuShortcut,
    ) -> Self {
        Self {
            label,
            action: Some(action),
            shortcut: Some(shortcut),
        }
    }

    const fn disabled_with_shortcut(label: &'static str, shortcut: MenuShortcut) -> Self {
        Self {
            label,
            action: None,
            shortcut: Some(shortcut),
        }
    }

    fn is_enabled(&self) -> bool {
        self.action.is_some()
    }
}

enum MenuEntry {
    Section(&'static str),
    Separator,
    Item(MenuItem),
}

struct ContextMenuState {
    title: &'static str,
    entries: Vec<MenuEntry>,
    selected_index: usize,
}

impl ContextMenuState {
    fn new(tab: RibbonTab, state: RibbonState) -> Self {
        let entries = build_ribbon_entries(tab, state);
        let selected_index = entries
            .iter()
            .enumerate()
            .find(|(_, entry)| matches!(entry, MenuEntry::Item(item) if item.is_enabled()))
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        Self {
            title: tab.label(),
            entries,
            selected_index,
        }
    }

    fn move_selection(&mut self, delta: i32) {
        if self.entries.is_empty() {
            return;
        }

        let len = self.entries.len() as i32;
        let mut idx = self.selected_index as i32;

        for _ in 0..len {
            idx = (idx + delta).rem_euclid(len);
            if matches!(self.entries[idx as usize], MenuEntry::Item(_)) {
                self.selected_index = idx as usize;
                break;
            }
        }
    }

    fn current_action(&self) -> Option<MenuAction> {
        match self.entries.get(self.selected_index) {
            Some(MenuEntry::Item(item)) => item.action,
            _ => None,
        }
    }

    fn shortcut_action(
        &mut self,
        code: KeyCode,
        modifiers: KeyModifiers,
    ) -> (bool, Option<MenuAction>) {
        for (idx, entry) in self.entries.iter().enumerate() {
            if let MenuEntry::Item(item) = entry {
                if let Some(shortcut) = item.shortcut {
                    if shortcut.matches(code, modifiers) {
                        self.selected_index = idx;
                        return (true, item.action);
                    }
                }
            }
        }
        (false, None)
    }
}

/// Document facts that decide which ribbon commands are available.
#[derive(Clone, Copy, Debug, Default)]
struct RibbonState {
    has_toa: bool,
    can_review: bool,
}

fn build_ribbon_entries(tab: RibbonTab, state: RibbonState) -> Vec<MenuEntry> {
    match tab {
        RibbonTab::Home => {
            let mut entries = vec![
                MenuEntry::Section("Paragraph style"),
                MenuEntry::Item(MenuItem::enabled_with_shortcut(
                    "Normal",
                    MenuAction::Heading(SentenceTag::Paragraph),
                    MenuShortcut::new('0'),
                )),
                MenuEntry::Item(MenuItem::enabled_with_shortcut(
                    "Heading 1",
                    MenuAction::Heading(SentenceTag::Heading1),
                    MenuShortcut::new('1'),
                )),
                MenuEntry::Item(MenuItem::enabled_with_shortcut(
                    "Heading 2",
                    MenuAction::Heading(SentenceTag::Heading2),
                    MenuShortcut::new('2'),
                )),
                MenuEntry::Item(MenuItem::enabled_with_shortcut(
                    "Heading 3",
                    MenuAction::Heading(SentenceTag::Heading3),
                    MenuShortcut::new('3'),
                )),
                MenuEntry::Separator,
                MenuEntry::Section("Font"),
            ];
            entries.extend(FONT_FAMILIES.iter().copied().map(|family| {
                MenuEntry::Item(MenuItem::enabled(family, MenuAction::FontFamily(family)))
            }));
            entries.push(MenuEntry::Separator);
            entries.push(MenuEntry::Section("Font size"));
            entries.extend(
                FONT_SIZES
                    .iter()
                    .copied()
                    .map(|size| MenuEntry::Item(MenuItem::enabled(size, MenuAction::FontSize(size)))),
            );
            entries
        }
        RibbonTab::References => {
            let remove = if state.has_toa {
                MenuItem::enabled_with_shortcut(
                    "Remove TOA",
                    MenuAction::RemoveToa,
                    MenuShortcut::new('r'),
                )
            } else {
                MenuItem::disabled_with_shortcut("Remove TOA", MenuShortcut::new('r'))
            };
            vec![
                MenuEntry::Section("Citations"),
                MenuEntry::Item(MenuItem::enabled_with_shortcut(
                    "Mark Citation",
                    MenuAction::MarkCitation,
                    MenuShortcut::new('m'),
                )),
                MenuEntry::Separator,
                MenuEntry::Section("Table of Authorities"),
                MenuEntry::Item(MenuItem::enabled_with_shortcut(
                    "Insert TOA",
                    MenuAction::InsertToa,
                    MenuShortcut::new('t'),
                )),
                MenuEntry::Item(MenuItem::enabled_with_shortcut(
                    "Update TOA",
                    MenuAction::UpdateToa,
                    MenuShortcut::new('u'),
                )),
                MenuEntry::Item(remove),
            ]
        }
        RibbonTab::Review => vec![
            MenuEntry::Section("Tracked changes"),
            MenuEntry::Item(review_item(
                "Accept",
                MenuAction::AcceptSelected,
                'a',
                state.can_review,
            )),
            MenuEntry::Item(review_item(
                "Reject",
                MenuAction::RejectSelected,
                'x',
                state.can_review,
            )),
            MenuEntry::Separator,
            MenuEntry::Item(MenuItem::enabled_with_shortcut(
                "Accept All Changes",
                MenuAction::AcceptAll,
                MenuShortcut::with_shift('A'),
            )),
        ],
    }
}

fn review_item(label: &'static str, action: MenuAction, key: char, enabled: bool) -> MenuItem {
    if enabled {
        MenuItem::enabled_with_shortcut(label, action, MenuShortcut::new(key))
    } else {
        MenuItem::disabled_with_shortcut(label, MenuShortcut::new(key))
    }
}

fn is_context_menu_shortcut(code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Char(' ') | KeyCode::Char('p') => modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Timed status-line notifications.
#[derive(Default)]
struct StatusLine {
    message: Option<(String, Severity, Instant)>,
}

impl StatusLine {
    fn set(&mut self, message: impl Into<String>, severity: Severity) {
        self.message = Some((message.into(), severity, Instant::now()));
    }

    fn prune(&mut self) {
        if let Some((_, _, instant)) = &self.message {
            if instant.elapsed() > STATUS_TIMEOUT {
                self.message = None;
            }
        }
    }

    fn current(&self) -> Option<(&str, Severity)> {
        self.message
            .as_ref()
            .map(|(message, severity, _)| (message.as_str(), *severity))
    }
}

impl Notifier for StatusLine {
    fn notify(&mut self, message: &str, severity: Severity) {
        self.set(message, severity);
    }
}

fn severity_style(severity: Severity) -> Style {
    let color = match severity {
        Severity::Success => Color::Green,
        Severity::Warning => Color::Yellow,
        Severity::Info => Color::Cyan,
        Severity::Error => Color::Red,
    };
    Style::default().fg(color)
}

struct App {
    level: Level,
    editor: DocumentEditor,
    output_path: PathBuf,
    theme: Theme,
    tab: RibbonTab,
    selection: Selection,
    focus: Option<BlockId>,
    scroll_top: usize,
    last_view_height: usize,
    should_quit: bool,
    dirty: bool,
    show_briefing: bool,
    status: StatusLine,
    context_menu: Option<ContextMenuState>,
}

impl App {
    fn new(level: Level, output_path: PathBuf) -> Self {
        let editor = DocumentEditor::new(level.document(), level.page_label());
        let focus = editor.document().sentences().next().map(|s| s.id);

        Self {
            level,
            editor,
            output_path,
            theme: Theme::default(),
            tab: RibbonTab::Home,
            selection: Selection::new(),
            focus,
            scroll_top: 0,
            last_view_height: 1,
            should_quit: false,
            dirty: false,
            show_briefing: true,
            status: StatusLine::default(),
            context_menu: None,
        }
    }

    fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        if area.height == 0 || area.width == 0 {
            return;
        }

        let status_height = if area.height > 2 { 2 } else { 1 };
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(status_height),
            ])
            .split(area);

        let ribbon_area = vertical[0];
        let editor_area = vertical[1];
        let status_area = vertical[2];

        frame.render_widget(Paragraph::new(self.ribbon_line()), ribbon_area);

        let horizontal = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(editor_area);
        let text_area = horizontal[0];
        let scrollbar_area = horizontal[1];

        let state = RenderState {
            focus: self.focus,
            selection: &self.selection,
            placement_preview: self.editor.placement_preview(),
            theme: &self.theme,
        };
        let render = render_document(self.editor.document(), text_area.width.max(1) as usize, &state);

        let viewport_height = text_area.height as usize;
        self.last_view_height = viewport_height.max(1);
        self.adjust_scroll(&render, viewport_height);

        let paragraph = Paragraph::new(Text::from(render.lines.clone()))
            .block(Block::default().borders(Borders::NONE))
            .scroll((self.scroll_top as u16, 0));
        frame.render_widget(paragraph, text_area);

        let mut scrollbar_state = ScrollbarState::new(render.total_lines).position(self.scroll_top);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight);
        frame.render_stateful_widget(scrollbar, scrollbar_area, &mut scrollbar_state);

        let status_widget = Paragraph::new(self.status_line())
            .block(Block::default().borders(Borders::TOP));
        frame.render_widget(status_widget, status_area);

        if self.show_briefing {
            self.render_briefing(frame, area);
        } else if self.context_menu.is_some() {
            self.render_context_menu(frame, area);
        }
    }

    fn ribbon_line(&self) -> Line<'static> {
        let mut spans = vec![
            Span::styled(self.level.title.clone(), self.theme.title_style()),
            Span::raw("  "),
        ];
        for tab in RibbonTab::ALL {
            spans.push(Span::styled(
                format!(" {} ", tab.label()),
                self.theme.tab_style(tab == self.tab),
            ));
            spans.push(Span::raw(" "));
        }
        if self.tab == RibbonTab::Home {
            spans.push(Span::raw(format!(
                " {} {}",
                self.editor.current_font_family(&self.selection),
                self.editor.current_font_size(&self.selection)
            )));
        }
        Line::from(spans)
    }

    fn status_line(&mut self) -> Line<'static> {
        self.status.prune();
        let document = self.editor.document();

        let summary = if let Some(preview) = self.editor.placement_preview() {
            format!(
                "Placing TOA at slot {} of {} | Up/Down move | Enter place | Esc exit",
                preview,
                document.non_toa_len()
            )
        } else {
            let marker = if self.dirty { "*" } else { "" };
            format!(
                "{} selected | {} cited | {}{} | Tab ribbon | Ctrl-P commands | F1 briefing | Ctrl-S submit | Ctrl-Q quit",
                self.selection.len(),
                document.citation_count(),
                self.output_path.display(),
                marker,
            )
        };

        match self.status.current() {
            Some((message, severity)) => Line::from(vec![
                Span::styled(message.to_string(), severity_style(severity)),
                Span::raw(" | "),
                Span::raw(summary),
            ]),
            None => Line::from(Span::styled(summary, Style::default())),
        }
    }

    fn render_briefing(&self, frame: &mut Frame, area: Rect) {
        if area.width < 10 || area.height < 5 {
            return;
        }
        let level = &self.level;
        let heading = Style::default().add_modifier(Modifier::BOLD);

        let mut lines = vec![
            Line::from(Span::styled(level.title.clone(), self.theme.title_style())),
            Line::from(format!("{} | {}", level.subtitle, level.difficulty)),
            Line::from(""),
            Line::from(level.description.clone()),
            Line::from(""),
            Line::from(Span::styled("Objective", heading)),
            Line::from(level.objective.clone()),
            Line::from(""),
            Line::from(Span::styled("Tasks", heading)),
        ];
        for task in &level.tasks {
            lines.push(Line::from(format!("• {}", task.description)));
            if let Some(hint) = &task.hint {
                lines.push(Line::from(Span::styled(
                    format!("  {hint}"),
                    self.theme.menu_disabled_style(),
                )));
            }
        }
        if !level.skills.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(format!("Skills: {}", level.skills.join(", "))));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Press any key to start",
            self.theme.menu_disabled_style(),
        )));

        let width = (area.width / 5 * 4).max(10).min(area.width);
        let height = (lines.len() as u16 + 2).min(area.height);
        let popup_area = Rect::new(
            area.x + (area.width.saturating_sub(width)) / 2,
            area.y + (area.height.saturating_sub(height)) / 2,
            width,
            height,
        );

        frame.render_widget(Clear, popup_area);
        let popup = Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: false })
            .style(self.theme.menu_style())
            .block(
                Block::default()
                    .title(format!("Level {}", level.id))
                    .borders(Borders::ALL)
                    .style(self.theme.menu_style()),
            );
        frame.render_widget(popup, popup_area);
    }

    fn render_context_menu(&self, frame: &mut Frame, area: Rect) {
        let Some(menu) = &self.context_menu else {
            return;
        };

        if area.width < 3 || area.height < 3 {
            return;
        }

        let mut max_label_width = 0usize;
        let mut max_section_width = 0usize;
        let mut has_shortcuts = false;

        for entry in &menu.entries {
            match entry {
                MenuEntry::Item(item) => {
                    max_label_width = max_label_width.max(item.label.chars().count());
                    has_shortcuts |= item.shortcut.is_some();
                }
                MenuEntry::Section(title) => {
                    max_section_width = max_section_width.max(title.chars().count());
                }
                MenuEntry::Separator => {}
            }
        }

        let item_width = if has_shortcuts {
            max_label_width + 3
        } else {
            max_label_width
        };
        let content_width = item_width.max(max_section_width) as u16;
        let min_width = 10.min(area.width);
        let width = (content_width + 4).min(area.width).max(min_width);
        let desired_height = (menu.entries.len() as u16 + 2).min(area.height);
        let height = desired_height.max(3.min(area.height));

        let popup_area = Rect::new(
            area.x + (area.width.saturating_sub(width)) / 2,
            area.y + (area.height.saturating_sub(height)) / 2,
            width,
            height,
        );

        frame.render_widget(Clear, popup_area);

        let separator_width = popup_area.width.saturating_sub(4).max(4) as usize;
        let popup_style = self.theme.menu_style();

        let mut items = Vec::new();
        for entry in &menu.entries {
            match entry {
                MenuEntry::Section(title) => {
                    items.push(ListItem::new(Line::from(Span::styled(
                        *title,
                        popup_style.add_modifier(Modifier::BOLD),
                    ))));
                }
                MenuEntry::Separator => {
                    items.push(ListItem::new(Line::from(Span::styled(
                        "─".repeat(separator_width),
                        self.theme.menu_disabled_style(),
                    ))));
                }
                MenuEntry::Item(item) => {
                    let content = if has_shortcuts {
                        let key = item.shortcut.map(|shortcut| shortcut.key).unwrap_or(' ');
                        format!(
                            "{label:<label_width$}  {key}",
                            label = item.label,
                            label_width = max_label_width,
                        )
                    } else {
                        item.label.to_string()
                    };
                    let style = if item.is_enabled() {
                        Style::default()
                    } else {
                        self.theme.menu_disabled_style()
                    };
                    items.push(ListItem::new(Line::from(Span::styled(content, style))));
                }
            }
        }

        let mut state = ListState::default();
        state.select(Some(menu.selected_index));

        let list = List::new(items)
            .highlight_style(self.theme.menu_selected_style())
            .style(popup_style)
            .block(
                Block::default()
                    .title(menu.title)
                    .borders(Borders::ALL)
                    .style(popup_style)
                    .border_style(Style::default().fg(Color::Gray)),
            );

        frame.render_stateful_widget(list, popup_area, &mut state);
    }

    fn open_context_menu(&mut self) {
        let state = RibbonState {
            has_toa: self.editor.document().toa().is_some(),
            can_review: self.editor.has_reviewable_selection(&self.selection),
        };
        self.context_menu = Some(ContextMenuState::new(self.tab, state));
    }

    fn close_context_menu(&mut self) {
        self.context_menu = None;
    }

    fn handle_context_menu_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        if self.context_menu.is_none() {
            return false;
        }

        match code {
            KeyCode::Esc => {
                self.close_context_menu();
                true
            }
            KeyCode::Up => {
                if let Some(menu) = self.context_menu.as_mut() {
                    menu.move_selection(-1);
                }
                true
            }
            KeyCode::Down => {
                if let Some(menu) = self.context_menu.as_mut() {
                    menu.move_selection(1);
                }
                true
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.tab = if code == KeyCode::Tab {
                    self.tab.next()
                } else {
                    self.tab.previous()
                };
                self.open_context_menu();
                true
            }
            KeyCode::Enter => {
                if let Some(action) = self
                    .context_menu
                    .as_ref()
                    .and_then(|menu| menu.current_action())
                {
                    self.execute_menu_action(action);
                    self.close_context_menu();
                }
                true
            }
            KeyCode::Char(' ') | KeyCode::Char('p')
                if modifiers.contains(KeyModifiers::CONTROL) =>
            {
                self.close_context_menu();
                true
            }
            KeyCode::Char(_) => {
                if let Some(menu) = self.context_menu.as_mut() {
                    let (handled, action) = menu.shortcut_action(code, modifiers);
                    if handled {
                        if let Some(action) = action {
                            self.execute_menu_action(action);
                            self.close_context_menu();
                        }
                        return true;
                    }
                }
                false
            }
            _ => false,
        }
    }

    fn execute_menu_action(&mut self, action: MenuAction) {
        self.dispatch(action.edit_action());
    }

    fn dispatch(&mut self, action: EditAction) {
        let applied = self
            .editor
            .dispatch(&action, &self.selection, &mut self.status);
        if !applied {
            return;
        }
        if action.clears_selection() {
            self.selection.clear();
        }
        if !matches!(
            action,
            EditAction::StartPlacement | EditAction::CancelPlacement
        ) {
            self.dirty = true;
        }
    }

    fn adjust_scroll(&mut self, render: &RenderResult, viewport_height: usize) {
        let viewport = viewport_height.max(1);
        let max_scroll = render.total_lines.saturating_sub(viewport);
        if self.scroll_top > max_scroll {
            self.scroll_top = max_scroll;
        }
        if let Some(line) = render.slot_line.or(render.focus_line) {
            if line < self.scroll_top {
                self.scroll_top = line;
            } else if line >= self.scroll_top + viewport {
                self.scroll_top = line.saturating_add(1).saturating_sub(viewport);
            }
        }
        if self.scroll_top > max_scroll {
            self.scroll_top = max_scroll;
        }
    }

    fn sentence_ids(&self) -> Vec<BlockId> {
        self.editor.document().sentences().map(|s| s.id).collect()
    }

    fn move_focus(&mut self, delta: i64) {
        let ids = self.sentence_ids();
        let Some(last) = ids.len().checked_sub(1) else {
            self.focus = None;
            return;
        };
        let current = self
            .focus
            .and_then(|focus| ids.iter().position(|id| *id == focus))
            .unwrap_or(0);
        let target = (current as i64 + delta).clamp(0, last as i64) as usize;
        self.focus = ids.get(target).copied();
    }

    fn focus_edge(&mut self, end: bool) {
        let ids = self.sentence_ids();
        let edge = if end { ids.last() } else { ids.first() };
        self.focus = edge.copied();
    }

    fn toggle_focus_selection(&mut self) {
        if let Some(id) = self.focus {
            self.selection.toggle(id);
        }
    }

    /// Moves the preview to a neighboring element boundary.
    fn move_placement(&mut self, delta: i64) {
        let Some(preview) = self.editor.placement_preview() else {
            return;
        };
        let slots = self.editor.document().placement_slots();
        let Some(last) = slots.len().checked_sub(1) else {
            return;
        };
        let current = slots
            .iter()
            .position(|slot| *slot >= preview)
            .unwrap_or(last);
        let target = (current as i64 + delta).clamp(0, last as i64) as usize;
        if let Some(slot) = slots.get(target) {
            self.editor.set_placement_preview(*slot);
        }
    }

    fn handle_placement_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up | KeyCode::Left => self.move_placement(-1),
            KeyCode::Down | KeyCode::Right => self.move_placement(1),
            KeyCode::Home => {
                self.editor.set_placement_preview(0);
            }
            KeyCode::End => {
                let end = self.editor.document().non_toa_len();
                self.editor.set_placement_preview(end);
            }
            KeyCode::Enter => {
                if let Some(preview) = self.editor.placement_preview() {
                    self.dispatch(EditAction::PlaceToa(preview));
                }
            }
            KeyCode::Esc => self.dispatch(EditAction::CancelPlacement),
            _ => {}
        }
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return Ok(());
        };

        if self.show_briefing {
            self.show_briefing = false;
            return Ok(());
        }

        if self.handle_context_menu_key(code, modifiers) {
            return Ok(());
        }

        if self.context_menu.is_some() {
            return Ok(());
        }

        if is_context_menu_shortcut(code, modifiers) && !self.editor.is_placing() {
            self.open_context_menu();
            return Ok(());
        }

        match (code, modifiers) {
            (KeyCode::Char('q'), m) if m.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            (KeyCode::Char('c'), m) if m.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            _ if self.editor.is_placing() => self.handle_placement_key(code),
            (KeyCode::Char('s'), m) if m.contains(KeyModifiers::CONTROL) => {
                if let Err(err) = self.submit() {
                    warn!(error = %format!("{err:#}"), "submit failed");
                    self.status.notify(&format!("{err:#}"), Severity::Error);
                }
            }
            (KeyCode::F(1), _) => {
                self.show_briefing = true;
            }
            (KeyCode::Tab, _) => {
                self.tab = self.tab.next();
            }
            (KeyCode::BackTab, _) => {
                self.tab = self.tab.previous();
            }
            (KeyCode::Up, m) if m.contains(KeyModifiers::SHIFT) => {
                self.extend_selection(-1);
            }
            (KeyCode::Down, m) if m.contains(KeyModifiers::SHIFT) => {
                self.extend_selection(1);
            }
            (KeyCode::Up, _) => self.move_focus(-1),
            (KeyCode::Down, _) => self.move_focus(1),
            (KeyCode::Home, _) => self.focus_edge(false),
            (KeyCode::End, _) => self.focus_edge(true),
            (KeyCode::Char(' '), m) if m.is_empty() => self.toggle_focus_selection(),
            (KeyCode::Esc, _) => self.selection.clear(),
            (KeyCode::PageUp, _) => {
                self.move_focus(-(self.last_view_height as i64 / 2).max(1));
            }
            (KeyCode::PageDown, _) => {
                self.move_focus((self.last_view_height as i64 / 2).max(1));
            }
            _ => {}
        }
        Ok(())
    }

    fn extend_selection(&mut self, delta: i64) {
        if let Some(id) = self.focus {
            self.selection.insert(id);
        }
        self.move_focus(delta);
        if let Some(id) = self.focus {
            self.selection.insert(id);
        }
    }

    fn on_tick(&mut self) {
        self.status.prune();
    }

    fn submit(&mut self) -> Result<()> {
        let html = serialize_document(self.editor.document());
        fs::write(&self.output_path, &html)
            .with_context(|| format!("failed to write {}", self.output_path.display()))?;
        info!(path = %self.output_path.display(), bytes = html.len(), "submitted document");

        self.dirty = false;
        self.status.set(
            format!("Submitted to {}", self.output_path.display()),
            Severity::Success,
        );
        Ok(())
    }
}
