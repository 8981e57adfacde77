use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use drive_hive::{
    CompareView, Controller, FeedbackLog, GridView, ModelOptions, NotificationLevel, PriceBound,
    Settings, VehicleId, ViewModel, MAX_COMPARED,
};
use drive_hive::timing::Debouncer;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

/// Below this width the comparison panel stacks under the results
const WIDE_LAYOUT_MIN_WIDTH: u16 = 100;

/// Longest the loop sleeps when no timer is pending
const IDLE_POLL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Make,
    Model,
    Year,
    PriceMin,
    PriceMax,
    Location,
    Results,
}

impl Field {
    pub fn next(&self) -> Self {
        match self {
            Field::Make => Field::Model,
            Field::Model => Field::Year,
            Field::Year => Field::PriceMin,
            Field::PriceMin => Field::PriceMax,
            Field::PriceMax => Field::Location,
            Field::Location => Field::Results,
            Field::Results => Field::Make,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Field::Make => Field::Results,
            Field::Model => Field::Make,
            Field::Year => Field::Model,
            Field::PriceMin => Field::Year,
            Field::PriceMax => Field::PriceMin,
            Field::Location => Field::PriceMax,
            Field::Results => Field::Location,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Field::PriceMin | Field::PriceMax | Field::Location)
    }
}

pub struct App {
    pub controller: Controller<FeedbackLog>,
    pub focus: Field,
    pub state: TableState,
    pub wide_layout: bool,
    resize: Debouncer<u16>,
}

impl App {
    pub fn new(controller: Controller<FeedbackLog>, settings: &Settings, width: u16) -> Self {
        let mut state = TableState::default();
        if !controller.catalog().is_empty() {
            state.select(Some(0));
        }

        Self {
            controller,
            focus: Field::Make,
            state,
            wide_layout: width >= WIDE_LAYOUT_MIN_WIDTH,
            resize: Debouncer::new(settings.resize_debounce),
        }
    }

    /// Id of the highlighted row, if any
    pub fn selected_vehicle(&self) -> Option<VehicleId> {
        let grid = self.controller.grid_view();
        self.state
            .selected()
            .and_then(|i| grid.items().get(i))
            .map(|item| item.id())
    }

    /// Keep the highlight inside the current result list
    fn clamp_selection(&mut self) {
        let len = self.controller.grid_view().items().len();
        if len == 0 {
            self.state.select(None);
        } else {
            let i = self.state.selected().unwrap_or(0).min(len - 1);
            self.state.select(Some(i));
        }
    }

    pub fn next(&mut self) {
        let len = self.controller.grid_view().items().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.controller.grid_view().items().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    /// Step a selector left or right through its options
    fn cycle(&mut self, forward: bool) {
        let catalog = self.controller.catalog();
        let form = self.controller.form();

        match self.focus {
            Field::Make => {
                let options = with_any(catalog.makes());
                let make = step(&options, &form.make, forward);
                self.controller.select_make(&make);
            }
            Field::Model => {
                let ModelOptions::Enabled(models) = self.controller.model_options() else {
                    return;
                };
                let options = with_any(models);
                let model = step(&options, &form.model, forward);
                self.controller.select_model(&model);
            }
            Field::Year => {
                let options = with_any(catalog.years().iter().map(|y| y.to_string()).collect());
                let year = step(&options, &form.year, forward);
                self.controller.select_year(&year);
            }
            _ => return,
        }
        self.clamp_selection();
    }

    fn edit_text(&mut self, edit: impl FnOnce(&mut String), now: Instant) {
        let form = self.controller.form();
        let mut text = match self.focus {
            Field::PriceMin => form.price_min.clone(),
            Field::PriceMax => form.price_max.clone(),
            Field::Location => form.location.clone(),
            _ => return,
        };
        edit(&mut text);

        match self.focus {
            Field::PriceMin => self.controller.edit_price(PriceBound::Min, &text, now),
            Field::PriceMax => self.controller.edit_price(PriceBound::Max, &text, now),
            _ => self.controller.edit_location(&text),
        }
    }

    /// Returns true when the user asked to quit
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> bool {
        match key.code {
            KeyCode::Esc => return true,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.previous(),
            KeyCode::Enter => {
                if !self.controller.submit_search(now) {
                    tracing::debug!("search busy");
                }
            }
            KeyCode::Left if !self.focus.is_text() => self.cycle(false),
            KeyCode::Right if !self.focus.is_text() => self.cycle(true),
            KeyCode::Backspace if self.focus.is_text() => {
                self.edit_text(|text| { text.pop(); }, now)
            }
            KeyCode::Char(ch) if self.focus.is_text() && !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.edit_text(|text| text.push(ch), now)
            }
            KeyCode::Char('q') => return true,
            KeyCode::Char('c') => {
                self.controller.clear_filters();
                self.clamp_selection();
            }
            KeyCode::Down | KeyCode::Char('j') if self.focus == Field::Results => self.next(),
            KeyCode::Up | KeyCode::Char('k') if self.focus == Field::Results => self.previous(),
            KeyCode::Char(' ') if self.focus == Field::Results => {
                if let Some(id) = self.selected_vehicle() {
                    self.controller.toggle_compare(id);
                }
            }
            KeyCode::Char('d') if self.focus == Field::Results => {
                if let Some(id) = self.selected_vehicle() {
                    self.controller.view_details(id);
                }
            }
            KeyCode::Char('m') if self.focus == Field::Results => {
                if let Some(id) = self.selected_vehicle() {
                    self.controller.contact_dealer(id);
                }
            }
            KeyCode::Char('x') => self.controller.clear_compare(),
            _ => {}
        }
        false
    }

    pub fn on_resize(&mut self, width: u16, now: Instant) {
        self.resize.call(width, now);
    }

    /// Drive the controller's timers and the resize debounce
    pub fn tick(&mut self, now: Instant) {
        if self.controller.tick(now) {
            self.clamp_selection();
        }

        let mut width = None;
        self.resize.fire(now, |w| width = Some(w));
        if let Some(width) = width {
            self.wide_layout = width >= WIDE_LAYOUT_MIN_WIDTH;
            tracing::debug!(width, wide = self.wide_layout, "layout updated");
        }
    }

    fn poll_timeout(&self, now: Instant) -> Duration {
        [self.controller.next_deadline(), self.resize.deadline()]
            .into_iter()
            .flatten()
            .min()
            .map(|deadline| deadline.saturating_duration_since(now).min(IDLE_POLL))
            .unwrap_or(IDLE_POLL)
    }
}

fn with_any(mut options: Vec<String>) -> Vec<String> {
    options.insert(0, String::new());
    options
}

/// Next/previous option after `current` (case-insensitive), wrapping around
fn step(options: &[String], current: &str, forward: bool) -> String {
    if options.is_empty() {
        return String::new();
    }
    let position = options
        .iter()
        .position(|o| o.eq_ignore_ascii_case(current))
        .unwrap_or(0);
    let len = options.len();
    let index = if forward {
        (position + 1) % len
    } else {
        (position + len - 1) % len
    };
    options[index].clone()
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(app.poll_timeout(Instant::now()))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if app.handle_key(key, Instant::now()) {
                        return Ok(());
                    }
                }
                Event::Resize(width, _) => app.on_resize(width, Instant::now()),
                _ => {}
            }
        }

        app.tick(Instant::now());
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let view = app.controller.view();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Search form
            Constraint::Min(0),    // Results + comparison
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app, &view);
    render_search_form(f, chunks[1], app, &view);

    let (direction, split) = if app.wide_layout {
        (Direction::Horizontal, [Constraint::Percentage(62), Constraint::Percentage(38)])
    } else {
        (Direction::Vertical, [Constraint::Percentage(60), Constraint::Percentage(40)])
    };
    let content_chunks = Layout::default()
        .direction(direction)
        .constraints(split)
        .split(chunks[2]);

    render_results(f, content_chunks[0], app, &view.grid);
    render_compare_panel(f, content_chunks[1], &view.compare);

    render_status_bar(f, chunks[3], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App, view: &ViewModel) {
    let compared = view.compare.cards().len();

    let mut spans = vec![
        Span::styled(
            "DriveHive",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("Catalog: {}", app.controller.catalog().len()),
            Style::default().fg(Color::White),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("Showing: {}", view.result_count),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("Comparing: {}/{}", compared, MAX_COMPARED),
            Style::default().fg(Color::Cyan),
        ),
    ];

    if view.searching {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(
            "🔄 Searching...",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
        ));
    }

    let header = Paragraph::new(vec![Line::from(spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_search_form(f: &mut Frame, area: Rect, app: &App, view: &ViewModel) {
    let form = app.controller.form();
    let model_disabled = view.models == ModelOptions::Disabled;

    let fields = [
        (Field::Make, "Make", display_or(&form.make, "Any Make"), false),
        (Field::Model, "Model", display_or(&form.model, "Any Model"), model_disabled),
        (Field::Year, "Year", display_or(&form.year, "Any Year"), false),
        (Field::PriceMin, "Min $", display_or(&form.price_min, "0"), false),
        (Field::PriceMax, "Max $", display_or(&form.price_max, "∞"), false),
        (Field::Location, "Location", display_or(&form.location, "Anywhere"), false),
    ];

    let mut spans = vec![];
    for (i, (field, label, value, disabled)) in fields.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" │ "));
        }

        let value_style = if *disabled {
            Style::default().fg(Color::DarkGray)
        } else if *field == app.focus {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::White)
        };

        spans.push(Span::styled(format!("{}: ", label), Style::default().fg(Color::Cyan)));
        spans.push(Span::styled(format!("[{}]", value), value_style));
    }

    let search = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Search "),
    );

    f.render_widget(search, area);
}

fn display_or<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() {
        placeholder
    } else {
        value
    }
}

/// Discounted listings get a bold price next to the struck-through original
fn price_style(on_sale: bool) -> Style {
    let style = Style::default().fg(Color::Green);
    if on_sale {
        style.add_modifier(Modifier::BOLD)
    } else {
        style
    }
}

fn render_results(f: &mut Frame, area: Rect, app: &mut App, grid: &GridView) {
    let border = if app.focus == Field::Results {
        Color::Yellow
    } else {
        Color::White
    };

    let items = match grid {
        GridView::NoResults { title, hint, action } => {
            let content = vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("  {}", title),
                    Style::default()
                        .fg(Color::Gray)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    format!("  {}", hint),
                    Style::default().fg(Color::DarkGray),
                )),
                Line::from(""),
                Line::from(vec![
                    Span::raw("  Press "),
                    Span::styled("c", Style::default().fg(Color::Yellow)),
                    Span::raw(format!(" to {}", action)),
                ]),
            ];

            let empty = Paragraph::new(content).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border))
                    .title(" Vehicles "),
            );
            f.render_widget(empty, area);
            return;
        }
        GridView::Results { items } => items,
    };

    let header_cells = ["", "Vehicle", "Price", "Was", "Details", "Dealer"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = items.iter().map(|item| {
        let compare_style = if item.in_comparison {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let cells = vec![
            Cell::from(item.compare_icon).style(compare_style),
            Cell::from(format!("{} {}", item.vehicle.image, item.title)),
            Cell::from(item.price.clone()).style(price_style(item.on_sale)),
            Cell::from(item.original_price.clone().unwrap_or_default())
                .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)),
            Cell::from(item.details.clone()),
            Cell::from(item.dealer_line.clone()),
        ];

        Row::new(cells).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(2),
            Constraint::Length(26),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(34),
            Constraint::Min(20),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(" Vehicles "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_compare_panel(f: &mut Frame, area: Rect, compare: &CompareView) {
    let (title, content) = match compare {
        CompareView::Placeholder { message, action } => (
            " Compare ".to_string(),
            vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("  {}", message),
                    Style::default().fg(Color::DarkGray),
                )),
                Line::from(""),
                Line::from(vec![
                    Span::raw("  "),
                    Span::styled(*action, Style::default().fg(Color::Yellow)),
                    Span::raw(": Tab to the vehicle list, Space to add"),
                ]),
            ],
        ),
        CompareView::Comparing { header, cards } => {
            let mut lines = vec![];
            for card in cards {
                lines.push(Line::from(""));
                lines.push(Line::from(vec![
                    Span::raw(format!("  {} ", card.image)),
                    Span::styled(
                        card.title.clone(),
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    ),
                ]));
                for (label, value) in [
                    ("Price", &card.price),
                    ("Mileage", &card.mileage),
                    ("Transmission", &card.transmission),
                    ("Drivetrain", &card.drivetrain),
                ] {
                    lines.push(Line::from(vec![
                        Span::styled(
                            format!("    {}: ", label),
                            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                        ),
                        Span::raw(value.clone()),
                    ]));
                }
            }
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled("x", Style::default().fg(Color::Yellow)),
                Span::raw(" Clear All"),
            ]));
            (format!(" {} ", header), lines)
        }
    };

    let panel = Paragraph::new(content)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(title),
        );

    f.render_widget(panel, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let feedback = app.controller.feedback();
    let mut status_spans = vec![];

    if let Some(notification) = feedback.last_notification() {
        let color = match notification.level {
            NotificationLevel::Info => Color::Blue,
            NotificationLevel::Warning => Color::Yellow,
            NotificationLevel::Error => Color::Red,
        };
        status_spans.push(Span::styled(
            format!(" {} {} ", notification.at.format("%H:%M:%S"), notification.message),
            Style::default().fg(color),
        ));
        status_spans.push(Span::raw("|"));
    }

    if let Some(announcement) = feedback.last_announcement() {
        status_spans.push(Span::styled(
            format!(" {} ", announcement),
            Style::default().fg(Color::Green),
        ));
        status_spans.push(Span::raw("| "));
    }

    status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Field | "));
    status_spans.push(Span::styled("←/→", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Option | "));
    status_spans.push(Span::styled("Enter", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Search | "));
    status_spans.push(Span::styled("Space", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Compare | "));
    status_spans.push(Span::styled("d/m", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Details/Dealer | "));
    status_spans.push(Span::styled("c", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Clear | "));
    status_spans.push(Span::styled("Esc", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}
