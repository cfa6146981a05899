//! The `TimelineHandle` JS class: owns a canvas-backed view and its DOM
//! listeners.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use hcm_timeline_core::model::iso_date;
use hcm_timeline_core::{
    Callbacks, ClickOutcome, DrillDownSequencer, TimelineError, TimelineView,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, EventTarget, MouseEvent};

use crate::bridge::{self, ClickPayload};
use crate::canvas::{CanvasSurface, DomResolver};
use crate::registry::{Detach, Registry};

type Listener = Closure<dyn FnMut(Event)>;

struct DomListener {
    target: EventTarget,
    event: &'static str,
    closure: Listener,
}

impl Detach for DomListener {
    fn detach(self) {
        if let Err(err) = self
            .target
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref())
        {
            web_sys::console::error_2(&"hcm-timeline: removeEventListener failed".into(), &err);
        }
    }
}

struct Shared {
    view: RefCell<TimelineView<CanvasSurface>>,
    drill_down: RefCell<DrillDownSequencer>,
    on_date_click: RefCell<Option<js_sys::Function>>,
    on_project_click: RefCell<Option<js_sys::Function>>,
    listeners: Registry<DomListener>,
    resize_timer: Cell<Option<i32>>,
    resize_callback: RefCell<Option<Closure<dyn FnMut()>>>,
}

impl Shared {
    /// Unregister every DOM listener and cancel a pending resize. The
    /// closures must leave the page before they are dropped.
    fn detach(&self) {
        self.listeners.detach_all();
        cancel_resize_timer(self);
    }
}

// `free()` from JS drops the handle without `destroy()`.
impl Drop for Shared {
    fn drop(&mut self) {
        self.detach();
    }
}

fn js_error(err: TimelineError) -> JsError {
    JsError::new(&err.to_string())
}

/// A mounted timeline. Call `destroy()` to detach it from the page.
#[wasm_bindgen]
pub struct TimelineHandle {
    shared: Rc<Shared>,
}

#[wasm_bindgen]
impl TimelineHandle {
    /// Mount on the canvas with id `canvasId`.
    ///
    /// `datasetJson` is a dataset object or an array of API rows.
    /// `onDateClick(dateIso, week, requestId)` and `onProjectClick(project,
    /// phase)` are optional.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas_id: &str,
        dataset_json: &str,
        config_json: Option<String>,
        on_date_click: Option<js_sys::Function>,
        on_project_click: Option<js_sys::Function>,
    ) -> Result<TimelineHandle, JsError> {
        console_error_panic_hook::set_once();
        let dataset = bridge::parse_dataset(dataset_json).map_err(js_error)?;
        let config = bridge::parse_config(config_json.as_deref()).map_err(js_error)?;
        let view = TimelineView::mount(
            &DomResolver,
            canvas_id,
            dataset,
            config,
            Callbacks::default(),
        )
        .map_err(js_error)?;

        let handle = TimelineHandle {
            shared: Rc::new(Shared {
                view: RefCell::new(view),
                drill_down: RefCell::new(DrillDownSequencer::default()),
                on_date_click: RefCell::new(on_date_click),
                on_project_click: RefCell::new(on_project_click),
                listeners: Registry::default(),
                resize_timer: Cell::new(None),
                resize_callback: RefCell::new(None),
            }),
        };
        handle.attach().map_err(|err| {
            JsError::new(&format!("failed to attach listeners: {err:?}"))
        })?;
        Ok(handle)
    }

    #[wasm_bindgen(js_name = setGranularity)]
    pub fn set_granularity(&self, granularity: &str) {
        self.shared
            .view
            .borrow_mut()
            .set_granularity_label(granularity);
    }

    #[wasm_bindgen(js_name = filterByProject)]
    pub fn filter_by_project(&self, project_id: f64) {
        if let Some(id) = bridge::project_id(project_id) {
            self.shared.view.borrow_mut().filter_by_project(id);
        }
    }

    #[wasm_bindgen(js_name = filterByProjects)]
    pub fn filter_by_projects(&self, project_ids: Vec<f64>) {
        let ids = project_ids.into_iter().filter_map(bridge::project_id);
        self.shared.view.borrow_mut().filter_by_projects(ids);
    }

    #[wasm_bindgen(js_name = showAllProjects)]
    pub fn show_all_projects(&self) {
        self.shared.view.borrow_mut().show_all_projects();
    }

    /// Dates are `YYYY-MM-DD`. Rejects `end < start`.
    #[wasm_bindgen(js_name = updateDateRange)]
    pub fn update_date_range(&self, start: &str, end: &str) -> Result<(), JsError> {
        let start = iso_date::parse(start).map_err(js_error)?;
        let end = iso_date::parse(end).map_err(js_error)?;
        self.shared
            .view
            .borrow_mut()
            .update_date_range(start, end)
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = updateData)]
    pub fn update_data(&self, dataset_json: &str) -> Result<(), JsError> {
        let dataset = bridge::parse_dataset(dataset_json).map_err(js_error)?;
        self.shared
            .view
            .borrow_mut()
            .update_data(dataset)
            .map_err(js_error)
    }

    pub fn render(&self) {
        self.shared.view.borrow_mut().render();
    }

    /// True only for the id passed with the most recent `onDateClick`.
    #[wasm_bindgen(js_name = acceptDrillDown)]
    pub fn accept_drill_down(&self, request_id: f64) -> bool {
        request_id >= 0.0 && self.shared.drill_down.borrow().accept(request_id as u64)
    }

    /// Current periods as JSON `[{ start, end, label }]`.
    pub fn periods(&self) -> Result<String, JsError> {
        let periods = self.shared.view.borrow().periods();
        serde_json::to_string(&periods).map_err(|e| JsError::new(&e.to_string()))
    }

    /// The frame `render()` would present, as JSON render commands.
    #[wasm_bindgen(js_name = frameJson)]
    pub fn frame_json(&self) -> Result<String, JsError> {
        let (commands, _) = self.shared.view.borrow().build_frame();
        serde_json::to_string(&commands).map_err(|e| JsError::new(&e.to_string()))
    }

    /// Remove listeners, cancel a pending resize and clear the canvas.
    pub fn destroy(&self) {
        self.shared.detach();
        self.shared.on_date_click.borrow_mut().take();
        self.shared.on_project_click.borrow_mut().take();
        self.shared.view.borrow_mut().destroy();
    }
}

impl TimelineHandle {
    fn attach(&self) -> Result<(), JsValue> {
        let canvas: EventTarget = self.shared.view.borrow().surface().canvas().clone().into();
        let window: EventTarget = web_sys::window()
            .ok_or_else(|| JsValue::from_str("no window"))?
            .into();

        self.listen(&canvas, "mousemove", |shared, event| {
            if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
                shared
                    .view
                    .borrow_mut()
                    .pointer_move(f64::from(mouse.offset_x()), f64::from(mouse.offset_y()));
            }
        })?;
        self.listen(&canvas, "mouseleave", |shared, _| {
            shared.view.borrow_mut().pointer_leave();
        })?;
        self.listen(&canvas, "click", |shared, event| {
            if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
                let outcome = shared
                    .view
                    .borrow_mut()
                    .click(f64::from(mouse.offset_x()), f64::from(mouse.offset_y()));
                dispatch_click(shared, &outcome);
            }
        })?;
        self.listen(&window, "resize", |shared, _| schedule_resize(shared))?;
        Ok(())
    }

    fn listen(
        &self,
        target: &EventTarget,
        event: &'static str,
        handler: impl Fn(&Rc<Shared>, Event) + 'static,
    ) -> Result<(), JsValue> {
        let weak: Weak<Shared> = Rc::downgrade(&self.shared);
        let closure: Listener = Closure::new(move |e: Event| {
            if let Some(shared) = weak.upgrade() {
                handler(&shared, e);
            }
        });
        target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        self.shared.listeners.push(DomListener {
            target: target.clone(),
            event,
            closure,
        });
        Ok(())
    }
}

/// Invoke the JS callback for a click. Runs with no view borrow held, so
/// callbacks may call back into the handle. Exceptions are rethrown.
fn dispatch_click(shared: &Rc<Shared>, outcome: &ClickOutcome) {
    let (callback, payload) = match outcome {
        ClickOutcome::Phase { project, phase } => (
            shared.on_project_click.borrow().clone(),
            ClickPayload::Phase { project, phase },
        ),
        ClickOutcome::Date { date, week } => {
            let request = shared.drill_down.borrow_mut().issue(*date, *week);
            (
                shared.on_date_click.borrow().clone(),
                ClickPayload::Date {
                    date: request.date,
                    week: request.week,
                    request_id: request.id,
                },
            )
        }
        ClickOutcome::Ignored => return,
    };
    let Some(callback) = callback else {
        return;
    };

    let result = match payload {
        ClickPayload::Phase { .. } => {
            phase_args(&payload).and_then(|(p, ph)| callback.call2(&JsValue::NULL, &p, &ph))
        }
        ClickPayload::Date {
            date,
            week,
            request_id,
        } => callback.call3(
            &JsValue::NULL,
            &JsValue::from_str(&iso_date::format(date)),
            &JsValue::from(week),
            &JsValue::from_f64(request_id as f64),
        ),
    };
    if let Err(err) = result {
        wasm_bindgen::throw_val(err);
    }
}

/// `(project, phase)` as plain JS objects, cut from the tagged payload.
fn phase_args(payload: &ClickPayload<'_>) -> Result<(JsValue, JsValue), JsValue> {
    let json = bridge::payload_json(payload).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let value = js_sys::JSON::parse(&json)?;
    Ok((
        js_sys::Reflect::get(&value, &JsValue::from_str("project"))?,
        js_sys::Reflect::get(&value, &JsValue::from_str("phase"))?,
    ))
}

fn schedule_resize(shared: &Rc<Shared>) {
    let ticket = shared.view.borrow_mut().resize_requested();
    let delay = i32::try_from(shared.view.borrow().resize_delay_ms()).unwrap_or(i32::MAX);
    cancel_resize_timer(shared);

    let Some(window) = web_sys::window() else {
        return;
    };
    let weak = Rc::downgrade(shared);
    let callback: Closure<dyn FnMut()> = Closure::new(move || {
        if let Some(shared) = weak.upgrade() {
            shared.resize_timer.set(None);
            shared.view.borrow_mut().run_scheduled_resize(ticket);
        }
    });
    match window.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.as_ref().unchecked_ref(),
        delay,
    ) {
        Ok(id) => {
            shared.resize_timer.set(Some(id));
            *shared.resize_callback.borrow_mut() = Some(callback);
        }
        Err(err) => web_sys::console::error_2(&"hcm-timeline: setTimeout failed".into(), &err),
    }
}

fn cancel_resize_timer(shared: &Shared) {
    if let Some(id) = shared.resize_timer.take()
        && let Some(window) = web_sys::window()
    {
        window.clear_timeout_with_handle(id);
    }
    shared.resize_callback.borrow_mut().take();
}
