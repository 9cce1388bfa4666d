//! Application state and event loop

use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::Widget,
    DefaultTerminal, Frame,
};

use crate::config::RunSettings;
use crate::parsers::SourceRegistry;
use crate::services::{Pipeline, QueryService};

use super::theme::Theme;
use super::widgets::{
    help::HelpPopup,
    overview::{Overview, OverviewData},
    products::ProductsView,
    spinner::{LoadingStage, Spinner},
    tabs::Tab,
    users::{Lookup, UsersView},
};

/// Application state
pub enum AppState {
    /// Loading data with spinner animation
    Loading {
        spinner_frame: usize,
        stage: LoadingStage,
    },
    /// Ready with loaded data
    Ready { data: Box<AppData> },
    /// Loading failed; nothing to show but the message
    Error { message: String },
}

/// Loaded application data
pub struct AppData {
    pub query: QueryService,
    pub overview: OverviewData,
}

impl AppData {
    pub fn new(query: QueryService) -> Self {
        let overview = OverviewData::from_report(query.report());
        Self { query, overview }
    }
}

/// Messages from the background loader
pub enum LoadEvent {
    Stage(LoadingStage),
    Done(Result<Box<AppData>, String>),
}

/// Main application
pub struct App {
    state: AppState,
    should_quit: bool,
    current_tab: Tab,
    theme: Theme,
    products_scroll: usize,
    users_scroll: usize,
    lookup: Lookup,
    show_help: bool,
    /// Last rendered height, used to bound scrolling
    viewport_height: u16,
}

impl App {
    /// Create a new app in loading state
    pub fn new(theme: Theme) -> Self {
        Self {
            state: AppState::Loading {
                spinner_frame: 0,
                stage: LoadingStage::Reading,
            },
            should_quit: false,
            current_tab: Tab::default(),
            theme,
            products_scroll: 0,
            users_scroll: 0,
            lookup: Lookup::default(),
            show_help: false,
            viewport_height: 0,
        }
    }

    /// Create an app that already holds a report
    pub fn with_data(query: QueryService, theme: Theme) -> Self {
        let mut app = Self::new(theme);
        app.state = AppState::Ready {
            data: Box::new(AppData::new(query)),
        };
        app
    }

    /// Handle keyboard events
    pub fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            if key.kind == KeyEventKind::Press {
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    self.should_quit = true;
                } else if self.lookup.editing {
                    self.handle_lookup_key(key);
                } else {
                    self.handle_key(key);
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                if self.show_help {
                    self.show_help = false;
                } else {
                    self.should_quit = true;
                }
            }
            KeyCode::Tab => self.switch_tab(self.current_tab.next()),
            KeyCode::BackTab => self.switch_tab(self.current_tab.prev()),
            KeyCode::Char(c @ '1'..='3') => {
                if let Some(tab) = Tab::from_number(c as u8 - b'0') {
                    self.switch_tab(tab);
                }
            }
            KeyCode::Up | KeyCode::Char('k') => self.scroll_up(),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_down(),
            KeyCode::Char('?') => self.show_help = !self.show_help,
            KeyCode::Char('/') if self.current_tab == Tab::Users => {
                self.lookup.editing = true;
            }
            KeyCode::Char('c') if self.current_tab == Tab::Users => {
                self.lookup.clear();
                self.users_scroll = 0;
            }
            _ => {}
        }
    }

    /// Keys while the lookup input has focus
    fn handle_lookup_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                if let AppState::Ready { data } = &self.state {
                    self.lookup.submit(&data.query);
                } else {
                    self.lookup.editing = false;
                }
                self.users_scroll = 0;
            }
            KeyCode::Esc => self.lookup.editing = false,
            KeyCode::Backspace => {
                self.lookup.input.pop();
            }
            KeyCode::Char(c) => self.lookup.input.push(c),
            _ => {}
        }
    }

    fn switch_tab(&mut self, tab: Tab) {
        self.current_tab = tab;
        if tab != Tab::Users {
            self.lookup.editing = false;
        }
    }

    /// Largest scroll offset for the current tab
    fn max_scroll(&self) -> usize {
        let AppState::Ready { data } = &self.state else {
            return 0;
        };
        match self.current_tab {
            Tab::Overview => 0,
            Tab::Products => {
                ProductsView::max_scroll(data.query.products().len(), self.viewport_height)
            }
            Tab::Users => UsersView::max_scroll(
                self.lookup.row_count(&data.query),
                self.viewport_height,
            ),
        }
    }

    fn active_scroll_mut(&mut self) -> Option<&mut usize> {
        match self.current_tab {
            Tab::Overview => None,
            Tab::Products => Some(&mut self.products_scroll),
            Tab::Users => Some(&mut self.users_scroll),
        }
    }

    fn scroll_up(&mut self) {
        if let Some(scroll) = self.active_scroll_mut() {
            *scroll = scroll.saturating_sub(1);
        }
    }

    fn scroll_down(&mut self) {
        let max = self.max_scroll();
        if let Some(scroll) = self.active_scroll_mut() {
            *scroll = (*scroll + 1).min(max);
        }
    }

    /// Apply a loader message
    pub fn apply_load_event(&mut self, event: LoadEvent) {
        match event {
            LoadEvent::Stage(stage) => {
                if let AppState::Loading { spinner_frame, .. } = self.state {
                    self.state = AppState::Loading {
                        spinner_frame,
                        stage,
                    };
                }
            }
            LoadEvent::Done(Ok(data)) => self.state = AppState::Ready { data },
            LoadEvent::Done(Err(message)) => self.state = AppState::Error { message },
        }
    }

    /// Update spinner animation
    pub fn tick(&mut self) {
        if let AppState::Loading {
            spinner_frame,
            stage,
        } = &self.state
        {
            self.state = AppState::Loading {
                spinner_frame: Spinner::next_frame(*spinner_frame),
                stage: *stage,
            };
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn current_tab(&self) -> Tab {
        self.current_tab
    }

    pub fn lookup(&self) -> &Lookup {
        &self.lookup
    }

    /// Draw the application
    pub fn draw(&mut self, frame: &mut Frame) {
        self.viewport_height = frame.area().height;
        frame.render_widget(&*self, frame.area());
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match &self.state {
            AppState::Loading {
                spinner_frame,
                stage,
            } => {
                Spinner::new(*spinner_frame, *stage, self.theme).render(area, buf);
            }
            AppState::Ready { data } => {
                match self.current_tab {
                    Tab::Overview => Overview::new(&data.overview, self.theme).render(area, buf),
                    Tab::Products => ProductsView::new(
                        data.query.products(),
                        data.overview.totals.total_subscribed,
                        self.products_scroll,
                        self.theme,
                    )
                    .render(area, buf),
                    Tab::Users => {
                        UsersView::new(&data.query, &self.lookup, self.users_scroll, self.theme)
                            .render(area, buf)
                    }
                }

                if self.show_help {
                    HelpPopup::new(self.theme).render(HelpPopup::centered_area(area), buf);
                }
            }
            AppState::Error { message } => {
                let y = area.y + area.height / 2;
                let text = format!("Error: {}", message);
                let x = area.x + (area.width.saturating_sub(text.chars().count() as u16)) / 2;
                buf.set_string(x, y, &text, Style::default().fg(self.theme.due()));
            }
        }
    }
}

/// Run the loader on a background thread, reporting stages as it goes
fn spawn_loader(settings: RunSettings) -> Receiver<LoadEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = SourceRegistry::new().load(&settings.data_path).map(|set| {
            let _ = tx.send(LoadEvent::Stage(LoadingStage::Aggregating));
            Box::new(AppData::new(Pipeline::new(&settings).run_records(&set)))
        });
        // stderr is under the alternate screen; the error view reports it
        if let Err(e) = &result {
            tracing::debug!(error = %e, "dashboard data load failed");
        }
        let _ = tx.send(LoadEvent::Done(result.map_err(|e| e.to_string())));
    });
    rx
}

/// Run the dashboard until the user quits
pub fn run(settings: RunSettings) -> anyhow::Result<()> {
    // Must run before raw mode
    let theme = Theme::detect();
    let mut terminal = ratatui::init();
    let result = run_app(&mut terminal, settings, theme);
    ratatui::restore();
    result
}

fn run_app(terminal: &mut DefaultTerminal, settings: RunSettings, theme: Theme) -> anyhow::Result<()> {
    let mut app = App::new(theme);
    let loader = spawn_loader(settings);

    loop {
        terminal.draw(|frame| app.draw(frame))?;

        if app.should_quit() {
            break;
        }

        // Non-blocking
        while let Ok(event) = loader.try_recv() {
            app.apply_load_event(event);
        }

        // 100ms timeout keeps the spinner moving
        if event::poll(Duration::from_millis(100))? {
            app.handle_event(event::read()?);
        } else {
            app.tick();
        }
    }

    Ok(())
}
