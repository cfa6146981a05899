use chrono::{Days, NaiveDate};
use hcm_timeline_core::{
    Callbacks, DateRange, ElementKey, Granularity, HitElement, HitIndex, Phase, PhaseKind, Project,
    RecordingSurface, TimeScale, TimelineConfig, TimelineDataset, TimelineView, time_periods,
};
use hcm_timeline_protocol::{Rect, RenderCommand};
use proptest::prelude::*;

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
}

fn day(offset: u64) -> NaiveDate {
    base().checked_add_days(Days::new(offset)).unwrap()
}

fn arb_range() -> impl Strategy<Value = DateRange> {
    (0u64..2000, 0u64..1500).prop_map(|(start, span)| DateRange {
        min_date: day(start),
        max_date: day(start + span),
    })
}

fn arb_phase_label() -> impl Strategy<Value = String> {
    prop_oneof![
        proptest::sample::select(
            PhaseKind::CANONICAL
                .iter()
                .map(|k| k.label().to_string())
                .collect::<Vec<_>>()
        ),
        "[A-Za-z ]{1,12}",
    ]
}

/// Projects whose phases all fall inside `[0, span]` days from the base date.
fn arb_dataset() -> impl Strategy<Value = TimelineDataset> {
    (1u64..400).prop_flat_map(|span| {
        let phase = (0..=span, 0..=span, arb_phase_label()).prop_map(|(a, b, label)| {
            Phase::new(label, day(a.min(b)), day(a.max(b)))
        });
        let project = proptest::collection::vec(phase, 0..6);
        proptest::collection::vec(project, 0..8).prop_map(move |lanes| {
            let projects = lanes
                .into_iter()
                .enumerate()
                .map(|(i, phases)| Project {
                    project_id: i as i64 * 10 + 1,
                    project_name: format!("Project {i}"),
                    customer_name: "Customer".into(),
                    phases,
                })
                .collect();
            TimelineDataset::new(
                DateRange {
                    min_date: day(0),
                    max_date: day(span),
                },
                projects,
            )
        })
    })
}

fn mount(dataset: TimelineDataset, width: f64) -> TimelineView<RecordingSurface> {
    let mut view = TimelineView::new(
        RecordingSurface::new(width),
        dataset,
        TimelineConfig::default(),
        Callbacks::default(),
    )
    .unwrap();
    view.set_today_provider(|| NaiveDate::from_ymd_opt(1999, 1, 1).unwrap());
    view
}

proptest! {
    #[test]
    fn date_round_trip_within_one_day(
        range in arb_range(),
        width in 100.0f64..3000.0,
        pick in 0.0f64..=1.0,
    ) {
        let scale = TimeScale::new(range, Rect::new(250.0, 60.0, width, 300.0));
        let offset = (range.total_days() as f64 * pick).floor() as u64;
        let d = range.min_date.checked_add_days(Days::new(offset)).unwrap();
        let back = scale.x_to_date(scale.date_to_x(d));
        prop_assert!((back - d).num_days().abs() <= 1, "{d} came back as {back}");
    }

    #[test]
    fn monthly_never_exceeds_weekly(range in arb_range()) {
        let weekly = time_periods(&range, Granularity::Weekly).len();
        let monthly = time_periods(&range, Granularity::Monthly).len();
        let quarterly = time_periods(&range, Granularity::Quarterly).len();
        prop_assert!(monthly <= weekly);
        prop_assert!(quarterly <= monthly);
    }

    #[test]
    fn periods_tile_the_range(range in arb_range(), g in proptest::sample::select(Granularity::ALL.to_vec())) {
        let periods = time_periods(&range, g);
        prop_assert!(!periods.is_empty());
        prop_assert_eq!(periods[0].start, range.min_date);
        prop_assert_eq!(periods[periods.len() - 1].end, range.max_date.succ_opt().unwrap());
        for pair in periods.windows(2) {
            prop_assert_eq!(pair[0].end, pair[1].start);
            prop_assert!(pair[0].start < pair[0].end);
        }
    }

    #[test]
    fn later_element_wins_hit_test(
        ax in 0.0f64..500.0, aw in 1.0f64..200.0,
        bx in 0.0f64..500.0, bw in 1.0f64..200.0,
        t in 0.0f64..=1.0,
    ) {
        let a = Rect::new(ax, 0.0, aw, 20.0);
        let b = Rect::new(bx, 0.0, bw, 20.0);
        let lo = a.x.max(b.x);
        let hi = a.right().min(b.right());
        prop_assume!(lo <= hi);

        let mut index = HitIndex::default();
        for (id, rect) in [(1, a), (2, b)] {
            index.push(HitElement {
                key: ElementKey { project_id: id, phase_index: 0 },
                rect,
            });
        }
        let x = lo + (hi - lo) * t;
        prop_assert_eq!(index.find(x, 10.0).map(|e| e.key.project_id), Some(2));
    }

    #[test]
    fn frame_matches_dataset(dataset in arb_dataset(), width in 400.0f64..2400.0) {
        let projects = dataset.projects.len();
        let phases: usize = dataset.projects.iter().map(|p| p.phases.len()).sum();
        let view = mount(dataset, width);
        let frame = view.surface().last_frame().unwrap().to_vec();

        let groups = frame
            .iter()
            .filter(|c| matches!(c, RenderCommand::BeginGroup { .. }))
            .count();
        prop_assert_eq!(groups, projects);
        prop_assert_eq!(view.hit_index().len(), phases);

        for element in view.hit_index().iter() {
            let project = view.dataset().project(element.key.project_id).unwrap();
            let phase = &project.phases[element.key.phase_index];
            prop_assert_eq!(element.rect.x, view.date_to_x(phase.start_date));
            prop_assert!(element.rect.w >= 2.0);
        }
    }

    #[test]
    fn render_twice_is_identical(dataset in arb_dataset()) {
        let mut view = mount(dataset, 1000.0);
        view.render();
        view.render();
        let frames = &view.surface().frames;
        prop_assert_eq!(&frames[frames.len() - 1], &frames[frames.len() - 2]);
    }
}
