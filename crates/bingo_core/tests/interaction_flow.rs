use bingo_core::db::open_db_in_memory;
use bingo_core::{
    dispatch_mutations, CardService, CellId, EditTarget, GestureKind, GestureSignal, Grid,
    GridId, GridLayout, GridRepository, GridViewModel, InteractionConfig, OwnerRef, Point,
    PointerSample, RepoError, RepoResult, Size, SqliteAccountRepository, SqliteGridRepository,
};
use std::cell::{Cell as FlagCell, RefCell};
use std::time::{Duration, Instant};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
enum GatewayCall {
    CellText(CellId, String),
    CellCompletion(CellId, bool),
    Quote(GridId, String),
}

/// In-memory gateway that records writes and can be told to fail them.
#[derive(Default)]
struct RecordingGateway {
    calls: RefCell<Vec<GatewayCall>>,
    fail_writes: FlagCell<bool>,
}

impl RecordingGateway {
    fn calls(&self) -> Vec<GatewayCall> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: GatewayCall) -> RepoResult<()> {
        self.calls.borrow_mut().push(call);
        if self.fail_writes.get() {
            return Err(RepoError::InvalidData("simulated outage".to_string()));
        }
        Ok(())
    }
}

impl GridRepository for RecordingGateway {
    fn create_grid(&self, grid: &Grid) -> RepoResult<GridId> {
        Ok(grid.id)
    }

    fn fetch_grid(&self, _owner: OwnerRef) -> RepoResult<Option<Grid>> {
        Ok(None)
    }

    fn update_cell_text(&self, cell_id: CellId, text: &str) -> RepoResult<()> {
        self.record(GatewayCall::CellText(cell_id, text.to_string()))
    }

    fn update_cell_completion(&self, cell_id: CellId, completed: bool) -> RepoResult<()> {
        self.record(GatewayCall::CellCompletion(cell_id, completed))
    }

    fn update_quote(&self, grid_id: GridId, quote: &str) -> RepoResult<()> {
        self.record(GatewayCall::Quote(grid_id, quote.to_string()))
    }
}

const CELL_SIZE: Size = Size {
    width: 120.0,
    height: 120.0,
};

fn sample(x: f32, y: f32, at: Instant) -> PointerSample {
    PointerSample::new(Point::new(x, y), CELL_SIZE, at)
}

fn ms(t0: Instant, millis: u64) -> Instant {
    t0 + Duration::from_millis(millis)
}

fn nine_cell_view(read_only: bool) -> GridViewModel {
    let grid = Grid::new(Uuid::new_v4(), GridLayout::THREE_BY_THREE).unwrap();
    GridViewModel::new(grid, read_only, &InteractionConfig::default())
}

fn set_goal(view: &mut GridViewModel, cell_id: CellId, text: &str) {
    assert!(view.double_activate(cell_id));
    view.edit_input(text);
    assert!(view.edit_confirm(false));
}

/// Simulates a host frame loop at ~60fps from `from` to `to` inclusive.
fn run_frames(view: &mut GridViewModel, t0: Instant, from: u64, to: u64) {
    let mut now = from;
    while now <= to {
        view.tick(ms(t0, now));
        now += 16;
    }
    view.tick(ms(t0, to));
}

#[test]
fn free_space_is_never_editable_or_completable() {
    let corners = [(10.0, 10.0), (110.0, 10.0), (10.0, 110.0), (110.0, 110.0)];

    for layout in [GridLayout::THREE_BY_THREE, GridLayout::FIVE_BY_FIVE] {
        for strategy in [GestureKind::TimedHold, GestureKind::CornerCoverage] {
            let grid = Grid::new(Uuid::new_v4(), layout).unwrap();
            let config = InteractionConfig {
                strategy,
                ..InteractionConfig::default()
            };
            let mut view = GridViewModel::new(grid, false, &config);
            let free_position = layout.free_space_position();
            let free = view.cell_at(free_position).unwrap().id;
            let t0 = Instant::now();

            let free_cells: Vec<u32> = view
                .cells()
                .iter()
                .filter(|cell| layout.is_free_space(cell.position))
                .map(|cell| cell.position)
                .collect();
            assert_eq!(free_cells, vec![free_position]);

            assert!(!view.double_activate(free));
            assert!(view.editing().is_none());
            for (x, y) in corners {
                assert_eq!(
                    view.pointer_down(free, &sample(x, y, t0)),
                    GestureSignal::Ignored
                );
                view.pointer_up(free, &sample(x, y, t0));
            }
            run_frames(&mut view, t0, 0, 2500);

            let cell = view.cell(free).unwrap();
            assert!(!cell.completed, "{layout:?} {strategy:?}");
            assert!(cell.text.is_empty());
            assert!(view.pending_mutations().is_empty());
        }
    }
}

#[test]
fn moving_past_threshold_cancels_without_completion_or_write() {
    let gateway = RecordingGateway::default();
    let mut view = nine_cell_view(false);
    let cell_id = view.cell_at(0).unwrap().id;
    set_goal(&mut view, cell_id, "Learn Rust");
    dispatch_mutations(&gateway, &mut view);
    let writes_before = gateway.calls().len();

    let t0 = Instant::now();
    view.pointer_down(cell_id, &sample(60.0, 60.0, t0));
    run_frames(&mut view, t0, 0, 800);
    assert_eq!(
        view.pointer_move(cell_id, &sample(71.0, 60.0, ms(t0, 900))),
        GestureSignal::Cancelled(bingo_core::CancelReason::Moved)
    );
    run_frames(&mut view, t0, 900, 3000);
    view.pointer_up(cell_id, &sample(71.0, 60.0, ms(t0, 3000)));

    assert!(!view.cell(cell_id).unwrap().completed);
    assert!(view.scheduled_frames().is_empty());
    dispatch_mutations(&gateway, &mut view);
    assert_eq!(gateway.calls().len(), writes_before);
}

#[test]
fn full_hold_issues_exactly_one_completion_despite_extra_ticks() {
    let gateway = RecordingGateway::default();
    let mut view = nine_cell_view(false);
    let cell_id = view.cell_at(6).unwrap().id;
    set_goal(&mut view, cell_id, "Visit Japan");
    dispatch_mutations(&gateway, &mut view);

    let t0 = Instant::now();
    view.pointer_down(cell_id, &sample(60.0, 60.0, t0));
    let token = view.scheduled_frames()[0];
    run_frames(&mut view, t0, 0, 2600);
    // a stale tick delivered after teardown of the session
    assert_eq!(view.on_frame(token, ms(t0, 2700)), GestureSignal::Ignored);
    view.pointer_up(cell_id, &sample(60.0, 60.0, ms(t0, 2800)));

    dispatch_mutations(&gateway, &mut view);
    let completions: Vec<_> = gateway
        .calls()
        .into_iter()
        .filter(|call| matches!(call, GatewayCall::CellCompletion(..)))
        .collect();
    assert_eq!(completions, vec![GatewayCall::CellCompletion(cell_id, true)]);
    assert!(view.cell(cell_id).unwrap().completed);
}

#[test]
fn entering_edit_on_a_cancels_gesture_on_b() {
    let gateway = RecordingGateway::default();
    let mut view = nine_cell_view(false);
    let a = view.cell_at(0).unwrap().id;
    let b = view.cell_at(8).unwrap().id;
    set_goal(&mut view, b, "Plant a tree");
    dispatch_mutations(&gateway, &mut view);
    let writes_before = gateway.calls().len();

    let t0 = Instant::now();
    view.pointer_down(b, &sample(60.0, 60.0, t0));
    run_frames(&mut view, t0, 0, 1200);
    assert!(view.is_gesture_in_flight(b));

    assert!(view.double_activate(a));
    assert!(!view.is_gesture_in_flight(b));
    assert!(view.scheduled_frames().is_empty());
    run_frames(&mut view, t0, 1200, 2500);
    view.pointer_up(b, &sample(60.0, 60.0, ms(t0, 2500)));

    assert!(!view.cell(b).unwrap().completed);
    dispatch_mutations(&gateway, &mut view);
    assert_eq!(gateway.calls().len(), writes_before);
    assert_eq!(view.editing(), Some(EditTarget::Cell(a)));
}

#[test]
fn marathon_scenario_edits_then_completes_cell_zero() {
    let gateway = RecordingGateway::default();
    let mut view = nine_cell_view(false);
    let cell_zero = view.cell_at(0).unwrap().id;

    assert!(view.double_activate(cell_zero));
    for chunk in ["Run ", "a ", "marathon"] {
        view.edit_append(chunk);
    }
    assert!(view.edit_confirm(false));
    assert_eq!(view.cell(cell_zero).unwrap().text, "Run a marathon");

    let report = dispatch_mutations(&gateway, &mut view);
    assert_eq!(report.applied, 1);
    assert_eq!(
        gateway.calls(),
        vec![GatewayCall::CellText(cell_zero, "Run a marathon".to_string())]
    );

    let t0 = Instant::now();
    view.pointer_down(cell_zero, &sample(60.0, 60.0, t0));
    view.pointer_move(cell_zero, &sample(66.0, 54.0, ms(t0, 700)));
    run_frames(&mut view, t0, 0, 2000);
    assert!(view.cell(cell_zero).unwrap().completed);

    dispatch_mutations(&gateway, &mut view);
    assert_eq!(
        gateway.calls(),
        vec![
            GatewayCall::CellText(cell_zero, "Run a marathon".to_string()),
            GatewayCall::CellCompletion(cell_zero, true),
        ]
    );
}

#[test]
fn quote_scenario_issues_one_quote_write_and_leaves_cells_alone() {
    let gateway = RecordingGateway::default();
    let mut view = nine_cell_view(false);
    let cells_before = view.cells().to_vec();

    assert!(view.activate_quote());
    view.edit_input("Be present");
    assert!(view.blur());

    dispatch_mutations(&gateway, &mut view);
    assert_eq!(
        gateway.calls(),
        vec![GatewayCall::Quote(view.grid_id(), "Be present".to_string())]
    );
    assert_eq!(view.quote(), "Be present");
    assert_eq!(view.cells(), cells_before.as_slice());
}

#[test]
fn shift_confirm_keeps_editing_with_a_newline() {
    let mut view = nine_cell_view(false);
    let cell_id = view.cell_at(1).unwrap().id;
    view.double_activate(cell_id);
    view.edit_input("Line one");
    assert!(!view.edit_confirm(true));
    view.edit_append("Line two");
    assert!(view.edit_confirm(false));
    assert_eq!(view.cell(cell_id).unwrap().text, "Line one\nLine two");
}

#[test]
fn unchanged_edit_issues_no_write() {
    let mut view = nine_cell_view(false);
    let cell_id = view.cell_at(2).unwrap().id;
    view.double_activate(cell_id);
    view.blur();
    view.activate_quote();
    view.blur();
    assert!(view.pending_mutations().is_empty());
}

#[test]
fn switching_edit_targets_commits_the_previous_buffer() {
    let mut view = nine_cell_view(false);
    let a = view.cell_at(0).unwrap().id;
    let b = view.cell_at(1).unwrap().id;

    view.double_activate(a);
    view.edit_input("Cook weekly");
    view.double_activate(b);

    assert_eq!(view.cell(a).unwrap().text, "Cook weekly");
    assert_eq!(view.editing(), Some(EditTarget::Cell(b)));
    assert_eq!(view.pending_mutations().len(), 1);
}

#[test]
fn read_only_view_ignores_every_interaction() {
    let mut grid = Grid::new(Uuid::new_v4(), GridLayout::THREE_BY_THREE).unwrap();
    grid.cells[0].text = "Someone else's goal".to_string();
    let mut view = GridViewModel::new(grid.clone(), true, &InteractionConfig::default());
    let gateway = RecordingGateway::default();
    let t0 = Instant::now();

    for cell in grid.cells.iter() {
        assert!(!view.double_activate(cell.id));
        view.edit_input("hijack");
        view.edit_confirm(false);
        view.blur();
        assert_eq!(
            view.pointer_down(cell.id, &sample(60.0, 60.0, t0)),
            GestureSignal::Ignored
        );
    }
    assert!(!view.activate_quote());
    run_frames(&mut view, t0, 0, 3000);
    for cell in grid.cells.iter() {
        view.pointer_up(cell.id, &sample(60.0, 60.0, ms(t0, 3000)));
    }

    assert_eq!(view.cells(), grid.cells.as_slice());
    assert_eq!(dispatch_mutations(&gateway, &mut view).applied, 0);
    assert!(gateway.calls().is_empty());
}

#[test]
fn failed_writes_surface_notices_without_rollback() {
    let gateway = RecordingGateway::default();
    gateway.fail_writes.set(true);
    let mut view = nine_cell_view(false);
    let cell_id = view.cell_at(3).unwrap().id;

    set_goal(&mut view, cell_id, "Write a book");
    let t0 = Instant::now();
    view.pointer_down(cell_id, &sample(60.0, 60.0, t0));
    run_frames(&mut view, t0, 0, 2000);
    view.activate_quote();
    view.edit_input("Keep going");
    view.blur();

    let report = dispatch_mutations(&gateway, &mut view);
    assert_eq!(report.failed, 3);
    assert_eq!(report.applied, 0);

    let messages: Vec<String> = view
        .take_notices()
        .into_iter()
        .map(|notice| notice.message)
        .collect();
    assert_eq!(
        messages,
        vec![
            "Failed to update goal",
            "Failed to update goal status",
            "Failed to update intention",
        ]
    );
    let cell = view.cell(cell_id).unwrap();
    assert_eq!(cell.text, "Write a book");
    assert!(cell.completed);
    assert_eq!(view.quote(), "Keep going");
}

#[test]
fn corner_strategy_completes_through_the_view_model() {
    let grid = Grid::new(Uuid::new_v4(), GridLayout::THREE_BY_THREE).unwrap();
    let cell_id = grid.cells[0].id;
    let config = InteractionConfig {
        strategy: GestureKind::CornerCoverage,
        ..InteractionConfig::default()
    };
    let mut view = GridViewModel::new(grid, false, &config);
    let t0 = Instant::now();

    for (x, y) in [(10.0, 10.0), (110.0, 10.0), (10.0, 110.0)] {
        assert!(!view.pointer_down(cell_id, &sample(x, y, t0)).is_completed());
    }
    assert!(view.scheduled_frames().is_empty());
    assert!(view
        .pointer_down(cell_id, &sample(110.0, 110.0, t0))
        .is_completed());
    assert_eq!(view.pending_mutations().len(), 1);
}

#[test]
fn corner_progress_is_dropped_when_edit_mode_interrupts() {
    let grid = Grid::new(Uuid::new_v4(), GridLayout::THREE_BY_THREE).unwrap();
    let cell_id = grid.cells[0].id;
    let config = InteractionConfig {
        strategy: GestureKind::CornerCoverage,
        ..InteractionConfig::default()
    };
    let mut view = GridViewModel::new(grid, false, &config);
    let t0 = Instant::now();

    for (x, y) in [(10.0, 10.0), (110.0, 10.0), (10.0, 110.0)] {
        view.pointer_down(cell_id, &sample(x, y, t0));
    }
    assert_eq!(view.gesture_progress(cell_id, t0), Some(0.75));

    assert!(view.double_activate(cell_id));
    assert!(view.blur());
    assert_eq!(view.gesture_progress(cell_id, t0), None);

    let signal = view.pointer_down(cell_id, &sample(110.0, 110.0, t0));
    assert!(matches!(signal, GestureSignal::Started { .. }));
    assert!(!view.cell(cell_id).unwrap().completed);
    assert_eq!(view.gesture_progress(cell_id, t0), Some(0.25));
    assert!(view.pending_mutations().is_empty());
}

#[test]
fn sqlite_backed_card_persists_interaction_results() {
    let conn = open_db_in_memory().unwrap();
    let service = CardService::new(
        SqliteAccountRepository::try_new(&conn).unwrap(),
        SqliteGridRepository::try_new(&conn).unwrap(),
    );
    let registration = service
        .register_or_load("Ada", GridLayout::THREE_BY_THREE)
        .unwrap();
    let mut view = service.open_private_card(registration.account.id).unwrap();
    let cell_zero = view.cell_at(0).unwrap().id;

    set_goal(&mut view, cell_zero, "Run a marathon");
    let t0 = Instant::now();
    view.pointer_down(cell_zero, &sample(60.0, 60.0, t0));
    run_frames(&mut view, t0, 0, 2000);
    view.activate_quote();
    view.edit_input("Be present");
    view.blur();
    assert_eq!(service.dispatch(&mut view).applied, 3);

    let reloaded = service.open_public_card(registration.grid_id).unwrap();
    let cell = reloaded.cell_at(0).unwrap();
    assert_eq!(cell.text, "Run a marathon");
    assert!(cell.completed);
    assert_eq!(reloaded.quote(), "Be present");
}
