//! `TimelineView`: owns a surface, the current dataset, and the view state.
//!
//! Every mutation goes through a method here and ends in a re-render. Frames
//! are built from state alone, so two renders without a state change present
//! identical command lists.

use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use chrono::{Datelike, NaiveDate};
use hcm_timeline_protocol::{Rect, RenderCommand, Viewport};

use crate::config::TimelineConfig;
use crate::debounce::{Debounce, DebounceTicket};
use crate::error::TimelineError;
use crate::hit::{ElementKey, HitElement, HitIndex};
use crate::layout::{self, Layout};
use crate::model::{DateRange, Phase, Project, TimelineDataset};
use crate::surface::{Surface, SurfaceResolver};
use crate::time::{self, Granularity, TimePeriod, TimeScale};
use crate::views;

pub type DateClickFn = dyn Fn(NaiveDate, u32);
pub type ProjectClickFn = dyn Fn(&Project, &Phase);
pub type TodayFn = dyn Fn() -> NaiveDate;

/// Interaction callbacks. Return values are not consumed and panics are not
/// caught.
#[derive(Clone, Default)]
pub struct Callbacks {
    /// Click in the plot away from any bar: the date under the pointer and
    /// its ISO week.
    pub on_date_click: Option<Rc<DateClickFn>>,
    pub on_project_click: Option<Rc<ProjectClickFn>>,
}

impl Callbacks {
    pub fn on_date_click(mut self, f: impl Fn(NaiveDate, u32) + 'static) -> Self {
        self.on_date_click = Some(Rc::new(f));
        self
    }

    pub fn on_project_click(mut self, f: impl Fn(&Project, &Phase) + 'static) -> Self {
        self.on_project_click = Some(Rc::new(f));
        self
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_date_click", &self.on_date_click.is_some())
            .field("on_project_click", &self.on_project_click.is_some())
            .finish()
    }
}

/// Observable pointer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerState {
    Idle,
    Hovering(ElementKey),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewState {
    pub granularity: Granularity,
    /// Lane restriction. `None` shows every project.
    pub filter: Option<BTreeSet<i64>>,
    pub hovered: Option<ElementKey>,
    /// Reserved for horizontal panning; nothing reads it yet.
    pub scroll_offset_x: f64,
    destroyed: bool,
}

impl ViewState {
    pub fn pointer(&self) -> PointerState {
        match self.hovered {
            Some(key) => PointerState::Hovering(key),
            None => PointerState::Idle,
        }
    }
}

/// What a click resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    Phase { project: Project, phase: Phase },
    Date { date: NaiveDate, week: u32 },
    Ignored,
}

pub struct TimelineView<S: Surface> {
    surface: S,
    dataset: TimelineDataset,
    config: TimelineConfig,
    callbacks: Callbacks,
    state: ViewState,
    layout: Layout,
    hits: HitIndex,
    resize: Debounce,
    today: Rc<TodayFn>,
}

impl<S: Surface> fmt::Debug for TimelineView<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimelineView")
            .field("state", &self.state)
            .field("layout", &self.layout)
            .field("projects", &self.dataset.projects.len())
            .field("hits", &self.hits.len())
            .finish_non_exhaustive()
    }
}

impl<S: Surface> TimelineView<S> {
    /// Resolve `surface_id` and build a view on it.
    pub fn mount<R>(
        resolver: &R,
        surface_id: &str,
        dataset: TimelineDataset,
        config: TimelineConfig,
        callbacks: Callbacks,
    ) -> Result<Self, TimelineError>
    where
        R: SurfaceResolver<Surface = S>,
    {
        let surface = resolver
            .resolve(surface_id)
            .ok_or_else(|| TimelineError::SurfaceNotFound(surface_id.to_string()))?;
        Self::new(surface, dataset, config, callbacks)
    }

    /// Size the surface, draw the first frame, and return the live view.
    pub fn new(
        surface: S,
        dataset: TimelineDataset,
        config: TimelineConfig,
        callbacks: Callbacks,
    ) -> Result<Self, TimelineError> {
        dataset.validate()?;
        let config = config.sanitized();
        let layout = Layout::compute(
            surface.container_width(),
            surface.device_pixel_ratio(),
            dataset.projects.len(),
            &config,
        );
        let mut view = Self {
            surface,
            state: ViewState {
                granularity: config.granularity,
                ..ViewState::default()
            },
            resize: Debounce::new(config.resize_debounce_ms),
            dataset,
            config,
            callbacks,
            layout,
            hits: HitIndex::default(),
            today: Rc::new(|| chrono::Local::now().date_naive()),
        };
        view.surface.resize(view.layout.viewport);
        tracing::debug!(
            projects = view.dataset.projects.len(),
            width = view.layout.viewport.width,
            height = view.layout.viewport.height,
            "timeline mounted"
        );
        view.render();
        Ok(view)
    }

    /// Replace the clock used for the today marker and re-render.
    pub fn set_today_provider(&mut self, today: impl Fn() -> NaiveDate + 'static) {
        self.today = Rc::new(today);
        self.render();
    }

    /// Draw the current state to the surface and rebuild the hit index.
    pub fn render(&mut self) {
        if self.state.destroyed {
            return;
        }
        let (commands, hits) = self.build_frame();
        tracing::trace!(commands = commands.len(), bars = hits.len(), "render");
        self.hits = hits;
        self.surface.present(&commands);
    }

    /// The frame for the current state, without touching the surface.
    pub fn build_frame(&self) -> (Vec<RenderCommand>, HitIndex) {
        let plot = self.layout.plot;
        let range = self.dataset.date_range;
        let scale = TimeScale::new(range, plot);
        let periods = time::time_periods(&range, self.state.granularity);
        let projects = self.visible_projects();

        let mut hits = HitIndex::default();
        let mut commands = views::render_background(&self.layout.viewport, plot);
        commands.extend(views::render_grid(
            plot,
            periods.len(),
            projects.len(),
            self.layout.row_height,
        ));
        commands.extend(views::render_time_axis(
            plot,
            &periods,
            self.state.granularity,
            range.min_date.year(),
        ));
        commands.extend(views::render_lanes(
            &projects,
            &self.layout,
            &scale,
            &self.config.colors,
            &mut hits,
        ));
        commands.extend(views::render_today((self.today)(), &scale, plot));

        if self.config.show_tooltips
            && let Some(key) = self.state.hovered
            && let Some(element) = hits.get(key)
            && let Some((project, phase)) = self.lookup(key)
        {
            commands.extend(views::render_tooltip(
                project,
                phase,
                element.rect,
                &self.layout.viewport,
            ));
        }

        (commands, hits)
    }

    pub fn set_granularity(&mut self, granularity: Granularity) {
        if self.state.destroyed {
            return;
        }
        tracing::debug!(%granularity, "granularity changed");
        self.state.granularity = granularity;
        self.state.hovered = None;
        self.render();
    }

    /// Like [`set_granularity`](Self::set_granularity) for a user-supplied
    /// label. Unknown labels are ignored.
    pub fn set_granularity_label(&mut self, label: &str) {
        match label.parse::<Granularity>() {
            Ok(granularity) => self.set_granularity(granularity),
            Err(err) => tracing::debug!(%err, "granularity ignored"),
        }
    }

    pub fn filter_by_project(&mut self, project_id: i64) {
        self.filter_by_projects([project_id]);
    }

    /// Show only the listed projects, keeping dataset order. Ids that match
    /// nothing are allowed and leave the plot empty.
    pub fn filter_by_projects(&mut self, project_ids: impl IntoIterator<Item = i64>) {
        if self.state.destroyed {
            return;
        }
        let ids: BTreeSet<i64> = project_ids.into_iter().collect();
        let unknown = ids
            .iter()
            .filter(|id| self.dataset.project(**id).is_none())
            .count();
        if unknown > 0 {
            tracing::debug!(unknown, "filter names projects not in the dataset");
        }
        tracing::debug!(ids = ?ids, "project filter set");
        self.state.filter = Some(ids);
        self.state.hovered = None;
        self.render();
    }

    pub fn show_all_projects(&mut self) {
        if self.state.destroyed {
            return;
        }
        tracing::debug!("project filter cleared");
        self.state.filter = None;
        self.state.hovered = None;
        self.render();
    }

    /// Replace the visible span. `end < start` is rejected and leaves the view
    /// untouched.
    pub fn update_date_range(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(), TimelineError> {
        let range = DateRange::new(start, end)?;
        if self.state.destroyed {
            return Ok(());
        }
        tracing::debug!(%start, %end, "date range changed");
        self.dataset.date_range = range;
        self.state.hovered = None;
        self.render();
        Ok(())
    }

    /// Swap in a new dataset. The filter and granularity carry over.
    pub fn update_data(&mut self, dataset: TimelineDataset) -> Result<(), TimelineError> {
        dataset.validate()?;
        if self.state.destroyed {
            return Ok(());
        }
        tracing::debug!(projects = dataset.projects.len(), "dataset replaced");
        self.dataset = dataset;
        self.state.hovered = None;
        self.relayout();
        Ok(())
    }

    /// Recompute the surface size from the container and redraw.
    pub fn relayout(&mut self) {
        if self.state.destroyed {
            return;
        }
        self.layout = Layout::compute(
            self.surface.container_width(),
            self.surface.device_pixel_ratio(),
            self.dataset.projects.len(),
            &self.config,
        );
        self.surface.resize(self.layout.viewport);
        self.state.hovered = None;
        self.render();
    }

    /// Note a container resize. Arm a timer for
    /// [`resize_delay_ms`](Self::resize_delay_ms) and pass the ticket to
    /// [`run_scheduled_resize`](Self::run_scheduled_resize).
    pub fn resize_requested(&mut self) -> DebounceTicket {
        self.resize.schedule()
    }

    /// Relayout if `ticket` is still the newest resize request.
    pub fn run_scheduled_resize(&mut self, ticket: DebounceTicket) -> bool {
        if self.state.destroyed || !self.resize.fire(ticket) {
            return false;
        }
        tracing::debug!(ticket = ticket.id(), "debounced resize");
        self.relayout();
        true
    }

    pub fn resize_delay_ms(&self) -> u32 {
        self.resize.delay_ms()
    }

    /// Drop callbacks and clear the surface. Later operations do nothing.
    pub fn destroy(&mut self) {
        if self.state.destroyed {
            return;
        }
        tracing::debug!("timeline destroyed");
        self.state.destroyed = true;
        self.state.hovered = None;
        self.callbacks = Callbacks::default();
        self.hits.clear();
        self.resize.cancel();
        self.surface.clear();
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.destroyed
    }

    /// Hit test the pointer. Redraws only when the hovered bar changes.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> PointerState {
        if self.state.destroyed {
            return PointerState::Idle;
        }
        let next = self.hits.find(x, y).map(|e| e.key);
        if next != self.state.hovered {
            tracing::debug!(from = ?self.state.hovered, to = ?next, "hover changed");
            self.state.hovered = next;
            self.render();
        }
        self.state.pointer()
    }

    pub fn pointer_leave(&mut self) {
        if self.state.destroyed || self.state.hovered.is_none() {
            return;
        }
        self.state.hovered = None;
        self.render();
    }

    /// Resolve a click and invoke the matching callback.
    pub fn click(&mut self, x: f64, y: f64) -> ClickOutcome {
        if self.state.destroyed {
            return ClickOutcome::Ignored;
        }
        self.pointer_move(x, y);

        let outcome = if let Some(key) = self.state.hovered {
            match self.lookup(key) {
                Some((project, phase)) => ClickOutcome::Phase {
                    project: project.clone(),
                    phase: phase.clone(),
                },
                None => ClickOutcome::Ignored,
            }
        } else if self.layout.plot.contains(x, y) {
            let date = self.x_to_date(x);
            ClickOutcome::Date {
                date,
                week: time::iso_week(date),
            }
        } else {
            ClickOutcome::Ignored
        };

        match &outcome {
            ClickOutcome::Phase { project, phase } => {
                tracing::debug!(project = project.project_id, phase = %phase.phase, "phase clicked");
                if let Some(cb) = self.callbacks.on_project_click.clone() {
                    cb(project, phase);
                }
            }
            ClickOutcome::Date { date, week } => {
                tracing::debug!(%date, week, "date clicked");
                if let Some(cb) = self.callbacks.on_date_click.clone() {
                    cb(*date, *week);
                }
            }
            ClickOutcome::Ignored => {}
        }
        outcome
    }

    fn lookup(&self, key: ElementKey) -> Option<(&Project, &Phase)> {
        let project = self.dataset.project(key.project_id)?;
        let phase = project.phases.get(key.phase_index)?;
        Some((project, phase))
    }

    pub fn dataset(&self) -> &TimelineDataset {
        &self.dataset
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn granularity(&self) -> Granularity {
        self.state.granularity
    }

    /// Carry granularity and filter over from another view.
    pub fn restore_state(&mut self, granularity: Granularity, filter: Option<BTreeSet<i64>>) {
        if self.state.destroyed {
            return;
        }
        self.state.granularity = granularity;
        self.state.filter = filter;
        self.state.hovered = None;
        self.render();
    }

    pub fn hovered(&self) -> Option<&HitElement> {
        self.state.hovered.and_then(|key| self.hits.get(key))
    }

    pub fn visible_projects(&self) -> Vec<&Project> {
        layout::visible_projects(&self.dataset, self.state.filter.as_ref())
    }

    pub fn periods(&self) -> Vec<TimePeriod> {
        time::time_periods(&self.dataset.date_range, self.state.granularity)
    }

    pub fn scale(&self) -> TimeScale {
        TimeScale::new(self.dataset.date_range, self.layout.plot)
    }

    pub fn date_to_x(&self, date: NaiveDate) -> f64 {
        self.scale().date_to_x(date)
    }

    pub fn x_to_date(&self, x: f64) -> NaiveDate {
        self.scale().x_to_date(x)
    }

    pub fn total_days(&self) -> i64 {
        self.dataset.date_range.total_days()
    }

    pub fn plot_rect(&self) -> Rect {
        self.layout.plot
    }

    pub fn viewport(&self) -> Viewport {
        self.layout.viewport
    }

    pub fn hit_index(&self) -> &HitIndex {
        &self.hits
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::surface::{RecordingResolver, RecordingSurface};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dataset() -> TimelineDataset {
        TimelineDataset::new(
            DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap(),
            vec![
                Project {
                    project_id: 1,
                    project_name: "Core HR".into(),
                    customer_name: "Acme".into(),
                    phases: vec![Phase::new("P+M", date(2024, 1, 1), date(2024, 1, 7))],
                },
                Project {
                    project_id: 2,
                    project_name: "Payroll".into(),
                    customer_name: "Globex".into(),
                    phases: vec![Phase::new("Testing", date(2024, 1, 10), date(2024, 1, 20))],
                },
            ],
        )
    }

    fn view(callbacks: Callbacks) -> TimelineView<RecordingSurface> {
        let mut view = TimelineView::new(
            RecordingSurface::new(1000.0),
            dataset(),
            TimelineConfig::default(),
            callbacks,
        )
        .unwrap();
        view.set_today_provider(|| NaiveDate::from_ymd_opt(2030, 1, 1).unwrap());
        view
    }

    fn bar_center(view: &TimelineView<RecordingSurface>, project_id: i64) -> (f64, f64) {
        let rect = view
            .hit_index()
            .iter()
            .find(|e| e.key.project_id == project_id)
            .map(|e| e.rect)
            .unwrap();
        (rect.x + rect.w / 2.0, rect.y + rect.h / 2.0)
    }

    #[test]
    fn mount_fails_for_missing_surface() {
        let resolver = RecordingResolver::default().with_surface("timeline", 800.0);
        let err = TimelineView::mount(
            &resolver,
            "missing",
            dataset(),
            TimelineConfig::default(),
            Callbacks::default(),
        )
        .unwrap_err();
        assert!(matches!(err, TimelineError::SurfaceNotFound(id) if id == "missing"));

        let view = TimelineView::mount(
            &resolver,
            "timeline",
            dataset(),
            TimelineConfig::default(),
            Callbacks::default(),
        )
        .unwrap();
        assert_eq!(view.viewport().width, 800.0);
    }

    #[test]
    fn hover_redraws_only_on_change() {
        let mut view = view(Callbacks::default());
        let before = view.surface().frame_count();
        let (x, y) = bar_center(&view, 1);

        assert!(matches!(view.pointer_move(x, y), PointerState::Hovering(k) if k.project_id == 1));
        assert_eq!(view.surface().frame_count(), before + 1);
        view.pointer_move(x + 0.5, y);
        assert_eq!(view.surface().frame_count(), before + 1);

        view.pointer_leave();
        assert_eq!(view.state().pointer(), PointerState::Idle);
        assert_eq!(view.surface().frame_count(), before + 2);
        view.pointer_leave();
        assert_eq!(view.surface().frame_count(), before + 2);
    }

    #[test]
    fn click_on_bar_reports_phase() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut view = view(Callbacks::default().on_project_click(move |project, phase| {
            sink.borrow_mut().push((project.project_id, phase.phase.to_string()));
        }));
        let (x, y) = bar_center(&view, 2);
        let outcome = view.click(x, y);
        assert!(matches!(outcome, ClickOutcome::Phase { ref project, .. } if project.project_id == 2));
        assert_eq!(*seen.borrow(), vec![(2, "Testing".to_string())]);
    }

    #[test]
    fn click_on_background_reports_date_and_week() {
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        let mut view = view(Callbacks::default().on_date_click(move |date, week| {
            *sink.borrow_mut() = Some((date, week));
        }));
        let plot = view.plot_rect();
        let x = view.date_to_x(date(2024, 1, 29));
        view.click(x + 1.0, plot.bottom() - 2.0);
        assert_eq!(*seen.borrow(), Some((date(2024, 1, 29), 5)));

        *seen.borrow_mut() = None;
        assert_eq!(view.click(5.0, 5.0), ClickOutcome::Ignored);
        assert!(seen.borrow().is_none());
    }

    #[test]
    fn inverted_range_leaves_state_unchanged() {
        let mut view = view(Callbacks::default());
        let frames = view.surface().frame_count();
        let err = view.update_date_range(date(2024, 2, 1), date(2024, 1, 1));
        assert!(matches!(err, Err(TimelineError::InvalidDateRange { .. })));
        assert_eq!(view.total_days(), 30);
        assert_eq!(view.surface().frame_count(), frames);
    }

    #[test]
    fn unknown_granularity_label_is_ignored() {
        let mut view = view(Callbacks::default());
        let frames = view.surface().frame_count();
        view.set_granularity_label("fortnightly");
        assert_eq!(view.granularity(), Granularity::Weekly);
        assert_eq!(view.surface().frame_count(), frames);
        view.set_granularity_label("Quarterly");
        assert_eq!(view.granularity(), Granularity::Quarterly);
    }

    #[test]
    fn stale_resize_ticket_is_ignored() {
        let mut view = view(Callbacks::default());
        let first = view.resize_requested();
        view.surface_mut().container_width = 600.0;
        let second = view.resize_requested();
        assert!(!view.run_scheduled_resize(first));
        assert_eq!(view.viewport().width, 1000.0);
        assert!(view.run_scheduled_resize(second));
        assert_eq!(view.viewport().width, 600.0);
        assert_eq!(view.surface().viewport.map(|v| v.width), Some(600.0));
    }

    #[test]
    fn destroy_is_idempotent_and_final() {
        let mut view = view(Callbacks::default().on_date_click(|_, _| panic!("destroyed view fired")));
        view.destroy();
        view.destroy();
        assert_eq!(view.surface().clears, 1);
        let frames = view.surface().frame_count();
        view.set_granularity(Granularity::Monthly);
        view.show_all_projects();
        let plot = view.plot_rect();
        assert_eq!(view.click(plot.x + 10.0, plot.y + 10.0), ClickOutcome::Ignored);
        assert_eq!(view.surface().frame_count(), frames);
    }

    #[test]
    fn tooltip_follows_hover_when_enabled() {
        let mut view = view(Callbacks::default());
        let (x, y) = bar_center(&view, 1);
        let quiet = view.surface().last_frame().map(<[RenderCommand]>::len).unwrap();
        view.pointer_move(x, y);
        let hovered = view.surface().last_frame().map(<[RenderCommand]>::len).unwrap();
        assert_eq!(hovered, quiet + 6);

        let mut config = TimelineConfig::default();
        config.show_tooltips = false;
        let mut silent = TimelineView::new(
            RecordingSurface::new(1000.0),
            dataset(),
            config,
            Callbacks::default(),
        )
        .unwrap();
        silent.set_today_provider(|| date(2030, 1, 1));
        let quiet = silent.surface().last_frame().map(<[RenderCommand]>::len).unwrap();
        silent.pointer_move(x, y);
        assert!(silent.hovered().is_some());
        assert_eq!(silent.surface().last_frame().map(<[RenderCommand]>::len), Some(quiet));
    }

    #[test]
    fn repeated_project_ids_are_rejected() {
        let mut twins = dataset();
        twins.projects[1].project_id = 1;
        let err = TimelineView::new(
            RecordingSurface::new(1000.0),
            twins.clone(),
            TimelineConfig::default(),
            Callbacks::default(),
        )
        .unwrap_err();
        assert!(matches!(err, TimelineError::InvalidDataset(_)));

        let mut view = view(Callbacks::default());
        assert!(view.update_data(twins).is_err());
        let (x, y) = bar_center(&view, 2);
        let outcome = view.click(x, y);
        assert!(
            matches!(&outcome, ClickOutcome::Phase { project, .. } if project.project_name == "Payroll"),
            "{outcome:?}"
        );
    }
}
