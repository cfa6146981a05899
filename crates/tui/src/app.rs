use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use hcm_timeline_core::{
    Callbacks, ClickOutcome, DebounceTicket, DrillDownSequencer, Granularity, TimelineConfig,
    TimelineDataset, TimelineError, TimelineView,
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders},
};

use crate::renderer::{self, TerminalSurface};

const HEADER_ROWS: u16 = 1;
const FOOTER_ROWS: u16 = 1;

/// Everything the key and mouse handlers mutate.
pub struct App {
    pub view: TimelineView<TerminalSurface>,
    drill_down: DrillDownSequencer,
    pending_resize: Option<(DebounceTicket, Instant)>,
    scroll_rows: u16,
    status: String,
    quit: bool,
}

impl App {
    pub fn new(
        dataset: TimelineDataset,
        config: TimelineConfig,
        columns: u16,
    ) -> Result<Self, TimelineError> {
        let view = TimelineView::new(
            TerminalSurface::new(columns),
            dataset,
            config,
            Callbacks::default(),
        )?;
        Ok(Self {
            view,
            drill_down: DrillDownSequencer::default(),
            pending_resize: None,
            scroll_rows: 0,
            status: String::from("click a bar or the background"),
            quit: false,
        })
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit = true,
            KeyCode::Char('1') => self.view.set_granularity(Granularity::Weekly),
            KeyCode::Char('2') => self.view.set_granularity(Granularity::Monthly),
            KeyCode::Char('3') => self.view.set_granularity(Granularity::Quarterly),
            KeyCode::Char('a') => {
                self.view.show_all_projects();
                self.status = "showing all projects".into();
            }
            KeyCode::Char('f') => match self.view.hovered().map(|e| e.key.project_id) {
                Some(id) => {
                    self.view.filter_by_project(id);
                    self.status = format!("filtered to project {id}");
                }
                None => self.status = "hover a bar to filter by its project".into(),
            },
            KeyCode::Up => self.scroll_rows = self.scroll_rows.saturating_sub(1),
            KeyCode::Down => self.scroll_rows = self.scroll_rows.saturating_add(1),
            _ => {}
        }
    }

    /// Mouse position in content-area cells.
    pub fn handle_mouse(&mut self, kind: MouseEventKind, column: u16, row: u16) {
        let Some(row) = row.checked_sub(HEADER_ROWS) else {
            self.view.pointer_leave();
            return;
        };
        let p = renderer::cell_center(column, row + self.scroll_rows);
        match kind {
            MouseEventKind::Moved => {
                self.view.pointer_move(p.x, p.y);
            }
            MouseEventKind::Down(MouseButton::Left) => {
                self.status = match self.view.click(p.x, p.y) {
                    ClickOutcome::Phase { project, phase } => format!(
                        "{} · {} {} → {} ({} weeks)",
                        project.display_label(),
                        phase.phase,
                        phase.start_date,
                        phase.end_date,
                        phase.duration_weeks()
                    ),
                    ClickOutcome::Date { date, week } => {
                        let request = self.drill_down.issue(date, week);
                        format!("drill-down #{}: {} (W{})", request.id, request.date, request.week)
                    }
                    ClickOutcome::Ignored => self.status.clone(),
                };
            }
            MouseEventKind::ScrollDown => self.scroll_rows = self.scroll_rows.saturating_add(1),
            MouseEventKind::ScrollUp => self.scroll_rows = self.scroll_rows.saturating_sub(1),
            _ => {}
        }
    }

    pub fn handle_resize(&mut self, columns: u16) {
        self.view.surface_mut().set_columns(columns);
        let ticket = self.view.resize_requested();
        self.pending_resize = Some((ticket, Instant::now()));
    }

    /// Fire the debounced relayout once its delay has passed.
    pub fn tick(&mut self, now: Instant) {
        self.scroll_rows = self.scroll_rows.min(self.view.surface().rows());
        let delay = Duration::from_millis(u64::from(self.view.resize_delay_ms()));
        if let Some((ticket, at)) = self.pending_resize
            && now.duration_since(at) >= delay
        {
            self.pending_resize = None;
            self.view.run_scheduled_resize(ticket);
        }
    }

    fn header(&self) -> String {
        let filter = match &self.view.state().filter {
            Some(ids) => format!("{} filtered", ids.len()),
            None => "all".to_string(),
        };
        format!(
            " hcm-timeline | {} | {} of {} projects ({filter}) | 1/2/3 granularity  a all  f filter  q quit ",
            self.view.granularity(),
            self.view.visible_projects().len(),
            self.view.dataset().projects.len(),
        )
    }
}

/// Run the interactive preview until the user quits.
pub fn run(mut app: App) -> Result<()> {
    enable_raw_mode()?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    while !app.quit {
        terminal.draw(|frame| {
            let area = frame.area();

            let header_area = Rect::new(0, 0, area.width, HEADER_ROWS);
            let header = Block::default()
                .title(app.header())
                .style(Style::default().fg(Color::White).bg(Color::DarkGray));
            frame.render_widget(header, header_area);

            let content_area = Rect::new(
                0,
                HEADER_ROWS,
                area.width,
                area.height.saturating_sub(HEADER_ROWS + FOOTER_ROWS),
            );
            let block = Block::default()
                .borders(Borders::NONE)
                .style(Style::default().bg(Color::Black));
            frame.render_widget(block, content_area);
            renderer::draw_commands(
                frame.buffer_mut(),
                content_area,
                app.view.surface().frame(),
                app.scroll_rows,
            );

            let footer_area = Rect::new(
                0,
                area.height.saturating_sub(FOOTER_ROWS),
                area.width,
                FOOTER_ROWS,
            );
            let footer = Block::default()
                .title(format!(" {} ", app.status()))
                .style(Style::default().fg(Color::Gray).bg(Color::Black));
            frame.render_widget(footer, footer_area);
        })?;

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key.code),
                Event::Mouse(mouse) => app.handle_mouse(mouse.kind, mouse.column, mouse.row),
                Event::Resize(columns, _) => app.handle_resize(columns),
                _ => {}
            }
        }
        app.tick(Instant::now());
    }
    Ok(())
}
