//! Owner of the single active timeline on a page.

use crate::config::TimelineConfig;
use crate::error::TimelineError;
use crate::model::TimelineDataset;
use crate::surface::SurfaceResolver;
use crate::view::{Callbacks, TimelineView};

/// Holds at most one live [`TimelineView`]. Reloading data goes through
/// [`replace`](Self::replace), which tears the old view down first.
pub struct TimelineHost<R: SurfaceResolver> {
    resolver: R,
    surface_id: String,
    config: TimelineConfig,
    callbacks: Callbacks,
    active: Option<TimelineView<R::Surface>>,
}

impl<R: SurfaceResolver> TimelineHost<R> {
    pub fn new(
        resolver: R,
        surface_id: impl Into<String>,
        config: TimelineConfig,
        callbacks: Callbacks,
    ) -> Self {
        Self {
            resolver,
            surface_id: surface_id.into(),
            config,
            callbacks,
            active: None,
        }
    }

    /// Destroy the current view and mount a fresh one for `dataset`.
    ///
    /// Granularity and project filter carry over from the old view. On error
    /// no view is active.
    pub fn replace(
        &mut self,
        dataset: TimelineDataset,
    ) -> Result<&mut TimelineView<R::Surface>, TimelineError> {
        let carried = self.active.take().map(|mut old| {
            old.destroy();
            (old.granularity(), old.state().filter.clone())
        });

        let mut view = TimelineView::mount(
            &self.resolver,
            &self.surface_id,
            dataset,
            self.config.clone(),
            self.callbacks.clone(),
        )?;
        if let Some((granularity, filter)) = carried {
            view.restore_state(granularity, filter);
        }
        tracing::debug!(surface = %self.surface_id, "timeline replaced");
        Ok(self.active.insert(view))
    }

    pub fn clear(&mut self) {
        if let Some(mut view) = self.active.take() {
            view.destroy();
        }
    }

    pub fn active(&self) -> Option<&TimelineView<R::Surface>> {
        self.active.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut TimelineView<R::Surface>> {
        self.active.as_mut()
    }
}
