use chrono::NaiveDate;
use gantt_engine::chart::{GestureError, GestureMode, Rejection};
use gantt_engine::{
    GanttChart, GestureOutcome, MemoryStore, ProjectId, StoreError, Task, TaskId, TaskPatch,
    TaskSource, TaskStore,
};
use uuid::Uuid;

const CELL: f32 = 20.0;

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, d).unwrap()
}

fn chart_with(tasks: Vec<Task>, project: ProjectId) -> GanttChart<MemoryStore> {
    GanttChart::new(MemoryStore::with_tasks(tasks), project, CELL)
}

fn task_of(chart: &GanttChart<MemoryStore>, id: TaskId) -> Task {
    chart.store().get(id).unwrap().clone()
}

/// Press at x=100, move to `to_x`, release over `target`.
fn drag(
    chart: &mut GanttChart<MemoryStore>,
    id: TaskId,
    mode: GestureMode,
    to_x: f32,
    target: Option<TaskId>,
) -> GestureOutcome {
    chart.on_gesture_start(id, mode, 100.0).unwrap();
    chart.on_gesture_move(to_x);
    chart.on_gesture_end(target).unwrap()
}

#[test]
fn single_day_task_moves_three_days() {
    let project = Uuid::new_v4();
    let task = Task::scheduled(project, "review", date(3, 10), date(3, 10));
    let id = task.id;
    let mut chart = chart_with(vec![task], project);

    let outcome = drag(&mut chart, id, GestureMode::Move, 160.0, None);

    assert!(matches!(outcome, GestureOutcome::Committed(_)));
    let moved = task_of(&chart, id);
    assert_eq!(moved.start_date, Some(date(3, 13)));
    assert_eq!(moved.end_date, Some(date(3, 13)));
}

#[test]
fn move_preserves_duration_for_any_offset() {
    let project = Uuid::new_v4();
    for offset in [-9i64, -1, 1, 4, 17] {
        let task = Task::scheduled(project, "span", date(5, 6), date(5, 11));
        let id = task.id;
        let mut chart = chart_with(vec![task], project);

        let to_x = 100.0 + offset as f32 * CELL;
        drag(&mut chart, id, GestureMode::Move, to_x, None);

        let moved = task_of(&chart, id);
        let (start, end) = (moved.start_date.unwrap(), moved.end_date.unwrap());
        assert_eq!((end - start).num_days(), 5);
        assert_eq!((start - date(5, 6)).num_days(), offset);
    }
}

#[test]
fn small_drag_snaps_back_to_a_click() {
    let project = Uuid::new_v4();
    let task = Task::scheduled(project, "a", date(3, 10), date(3, 12));
    let id = task.id;
    let mut chart = chart_with(vec![task.clone()], project);

    let outcome = drag(&mut chart, id, GestureMode::Move, 109.0, None);

    assert_eq!(outcome, GestureOutcome::Click(id));
    assert_eq!(task_of(&chart, id), task);
}

#[test]
fn resize_start_past_end_never_commits() {
    let project = Uuid::new_v4();
    let task = Task::scheduled(project, "a", date(3, 10), date(3, 12));
    let id = task.id;
    let mut chart = chart_with(vec![task.clone()], project);

    let outcome = drag(&mut chart, id, GestureMode::ResizeStart, 100.0 + 3.0 * CELL, None);

    assert_eq!(outcome, GestureOutcome::Rejected(Rejection::InvalidRange));
    assert_eq!(task_of(&chart, id), task);
    assert!(chart.active_gesture().is_none());
}

#[test]
fn resize_end_extends_only_the_end() {
    let project = Uuid::new_v4();
    let task = Task::scheduled(project, "a", date(3, 10), date(3, 12));
    let id = task.id;
    let mut chart = chart_with(vec![task], project);

    drag(&mut chart, id, GestureMode::ResizeEnd, 100.0 + 2.0 * CELL, None);

    let resized = task_of(&chart, id);
    assert_eq!(resized.start_date, Some(date(3, 10)));
    assert_eq!(resized.end_date, Some(date(3, 14)));
}

#[test]
fn connect_release_makes_target_depend_on_origin() {
    let project = Uuid::new_v4();
    let x = Task::scheduled(project, "X", date(1, 1), date(1, 3));
    let y = Task::scheduled(project, "Y", date(1, 5), date(1, 7));
    let (x_id, y_id) = (x.id, y.id);
    let mut chart = chart_with(vec![x, y], project);

    let outcome = drag(&mut chart, y_id, GestureMode::Connect, 40.0, Some(x_id));

    assert!(matches!(outcome, GestureOutcome::Committed(ref t) if t.id == x_id));
    assert_eq!(
        chart.graph().predecessors_of(x_id).into_iter().collect::<Vec<_>>(),
        vec![y_id]
    );
    assert!(chart.graph().predecessors_of(y_id).is_empty());
}

#[test]
fn connect_that_closes_a_cycle_is_rejected_without_writing() {
    let project = Uuid::new_v4();
    let w = Task::scheduled(project, "W", date(2, 1), date(2, 2));
    let mut z = Task::scheduled(project, "Z", date(2, 3), date(2, 4));
    z.dependencies.insert(w.id);
    let (w_id, z_id) = (w.id, z.id);
    let before = w.clone();
    let mut chart = chart_with(vec![w, z], project);

    let outcome = drag(&mut chart, z_id, GestureMode::Connect, 50.0, Some(w_id));

    assert_eq!(outcome, GestureOutcome::Rejected(Rejection::CycleDetected));
    assert_eq!(
        Rejection::CycleDetected.user_message(),
        Some("cannot create circular dependency")
    );
    assert_eq!(task_of(&chart, w_id), before);
}

#[test]
fn repeated_connect_is_unchanged() {
    let project = Uuid::new_v4();
    let a = Task::scheduled(project, "A", date(2, 1), date(2, 2));
    let b = Task::scheduled(project, "B", date(2, 3), date(2, 4));
    let (a_id, b_id) = (a.id, b.id);
    let mut chart = chart_with(vec![a, b], project);

    drag(&mut chart, a_id, GestureMode::Connect, 150.0, Some(b_id));
    let outcome = drag(&mut chart, a_id, GestureMode::Connect, 150.0, Some(b_id));

    assert_eq!(outcome, GestureOutcome::Unchanged);
    assert_eq!(task_of(&chart, b_id).dependencies.len(), 1);
}

#[test]
fn connect_released_on_nothing_does_not_write() {
    let project = Uuid::new_v4();
    let a = Task::scheduled(project, "A", date(2, 1), date(2, 2));
    let id = a.id;
    let mut chart = chart_with(vec![a.clone()], project);

    assert_eq!(
        drag(&mut chart, id, GestureMode::Connect, 100.0, None),
        GestureOutcome::Click(id)
    );
    assert_eq!(
        drag(&mut chart, id, GestureMode::Connect, 180.0, None),
        GestureOutcome::Rejected(Rejection::NoTarget)
    );
    assert_eq!(
        drag(&mut chart, id, GestureMode::Connect, 180.0, Some(id)),
        GestureOutcome::Rejected(Rejection::SelfDependency)
    );
    assert_eq!(task_of(&chart, id), a);
}

#[test]
fn connect_onto_ad_hoc_or_foreign_bar_is_rejected_without_writing() {
    let project = Uuid::new_v4();
    let a = Task::scheduled(project, "A", date(2, 1), date(2, 2));
    let mut errand = Task::scheduled(project, "errand", date(2, 3), date(2, 3));
    errand.source = TaskSource::AdHoc;
    let foreign = Task::scheduled(Uuid::new_v4(), "elsewhere", date(2, 4), date(2, 5));
    let (a_id, errand_id, foreign_id) = (a.id, errand.id, foreign.id);
    let mut chart = chart_with(vec![a.clone(), errand.clone(), foreign.clone()], project);

    assert_eq!(
        drag(&mut chart, a_id, GestureMode::Connect, 180.0, Some(errand_id)),
        GestureOutcome::Rejected(Rejection::UnknownTask(errand_id))
    );
    assert_eq!(
        drag(&mut chart, a_id, GestureMode::Connect, 180.0, Some(foreign_id)),
        GestureOutcome::Rejected(Rejection::UnknownTask(foreign_id))
    );
    assert_eq!(task_of(&chart, a_id), a);
    assert_eq!(task_of(&chart, errand_id), errand);
    assert_eq!(task_of(&chart, foreign_id), foreign);
}

#[test]
fn zoom_is_frozen_while_a_gesture_runs() {
    let project = Uuid::new_v4();
    let task = Task::scheduled(project, "a", date(3, 10), date(3, 12));
    let id = task.id;
    let mut chart = chart_with(vec![task], project);

    chart.on_gesture_start(id, GestureMode::Move, 100.0).unwrap();
    chart.set_cell_width(40.0);
    assert_eq!(chart.cell_width(), CELL);
    assert_eq!(chart.on_gesture_move(160.0), Some(3));
    chart.on_gesture_end(None).unwrap();

    chart.set_cell_width(40.0);
    assert_eq!(chart.cell_width(), 40.0);
    assert_eq!(task_of(&chart, id).start_date, Some(date(3, 13)));
}

#[test]
fn runaway_pointer_never_panics() {
    let project = Uuid::new_v4();
    let task = Task::scheduled(project, "a", date(3, 10), date(3, 12));
    let id = task.id;
    let mut chart = chart_with(vec![task.clone()], project);

    chart.on_gesture_start(id, GestureMode::Move, 100.0).unwrap();
    assert_eq!(chart.on_gesture_move(f32::INFINITY), Some(0));
    assert_eq!(chart.visible_bars(date(3, 1), date(4, 1)).len(), 1);
    assert_eq!(chart.on_gesture_end(None).unwrap(), GestureOutcome::Click(id));

    for mode in [GestureMode::Move, GestureMode::ResizeStart, GestureMode::ResizeEnd] {
        chart.on_gesture_start(id, mode, 100.0).unwrap();
        chart.on_gesture_move(3.0e9);
        let bars = chart.visible_bars(date(3, 1), date(4, 1));
        assert_eq!(bars[0].start, date(3, 10));
        assert_eq!(
            chart.on_gesture_end(None).unwrap(),
            GestureOutcome::Rejected(Rejection::InvalidRange)
        );
    }
    assert_eq!(task_of(&chart, id), task);
}

#[test]
fn gesture_start_is_refused_for_unusable_tasks() {
    let project = Uuid::new_v4();
    let unscheduled = Task::new(project, "someday");
    let mut adhoc = Task::scheduled(project, "errand", date(4, 1), date(4, 1));
    adhoc.source = TaskSource::AdHoc;
    let bar = Task::scheduled(project, "bar", date(4, 2), date(4, 3));
    let (u, a, b) = (unscheduled.id, adhoc.id, bar.id);
    let mut chart = chart_with(vec![unscheduled, adhoc, bar], project);

    assert_eq!(
        chart.on_gesture_start(u, GestureMode::Move, 0.0),
        Err(GestureError::Unscheduled(u))
    );
    assert_eq!(
        chart.on_gesture_start(a, GestureMode::Move, 0.0),
        Err(GestureError::NotOnTimeline(a))
    );
    let stranger = Uuid::new_v4();
    assert_eq!(
        chart.on_gesture_start(stranger, GestureMode::Move, 0.0),
        Err(GestureError::UnknownTask(stranger))
    );

    chart.on_gesture_start(b, GestureMode::Move, 0.0).unwrap();
    assert_eq!(
        chart.on_gesture_start(b, GestureMode::ResizeEnd, 0.0),
        Err(GestureError::AlreadyActive(b))
    );
}

#[test]
fn cancel_discards_the_pending_offset() {
    let project = Uuid::new_v4();
    let task = Task::scheduled(project, "a", date(3, 10), date(3, 12));
    let id = task.id;
    let mut chart = chart_with(vec![task.clone()], project);

    chart.on_gesture_start(id, GestureMode::Move, 100.0).unwrap();
    assert_eq!(chart.on_gesture_move(200.0), Some(5));
    assert_eq!(chart.cancel_gesture(), GestureOutcome::Cancelled);
    assert_eq!(chart.on_gesture_end(None).unwrap(), GestureOutcome::NoGesture);
    assert_eq!(task_of(&chart, id), task);
}

#[test]
fn visible_bars_follow_the_live_drag() {
    let project = Uuid::new_v4();
    let a = Task::scheduled(project, "a", date(3, 4), date(3, 6));
    let b = Task::scheduled(project, "b", date(3, 8), date(3, 8));
    let b_id = b.id;
    let mut chart = chart_with(vec![a, b.clone()], project);

    chart.on_gesture_start(b_id, GestureMode::Move, 100.0).unwrap();
    chart.on_gesture_move(140.0);

    let bars = chart.visible_bars(date(3, 1), date(4, 1));
    assert_eq!(bars.len(), 2);
    assert_eq!((bars[0].left, bars[0].width), (60.0, 60.0));
    assert_eq!(bars[1].row, 1);
    assert_eq!(bars[1].start, date(3, 10));
    assert_eq!((bars[1].left, bars[1].width), (180.0, 20.0));

    // Nothing is written until release.
    assert_eq!(task_of(&chart, b_id), b);
}

#[test]
fn visible_bars_clamp_and_skip_out_of_range_tasks() {
    let project = Uuid::new_v4();
    let early = Task::scheduled(project, "early", date(1, 1), date(1, 20));
    let straddling = Task::scheduled(project, "straddling", date(2, 25), date(3, 5));
    let mut by_deadline = Task::new(project, "deadline only");
    by_deadline.start_date = Some(date(3, 2));
    by_deadline.deadline = Some(date(3, 3));
    let unscheduled = Task::new(project, "no dates");
    let mut chart = chart_with(vec![early, straddling, by_deadline, unscheduled], project);
    chart.set_cell_width(10.0);

    let bars = chart.visible_bars(date(3, 1), date(3, 15));
    let titles: Vec<_> = bars.iter().map(|b| b.task.title.as_str()).collect();
    assert_eq!(titles, ["straddling", "deadline only"]);
    assert_eq!((bars[0].left, bars[0].width), (0.0, 50.0));
    assert_eq!((bars[1].left, bars[1].width), (10.0, 20.0));
}

#[test]
fn dependency_curves_skip_deleted_predecessors() {
    let project = Uuid::new_v4();
    let a = Task::scheduled(project, "a", date(3, 1), date(3, 2));
    let b = Task::scheduled(project, "b", date(3, 3), date(3, 4));
    let mut c = Task::scheduled(project, "c", date(3, 5), date(3, 6));
    c.dependencies.insert(a.id);
    c.dependencies.insert(b.id);
    let (a_id, b_id, c_id) = (a.id, b.id, c.id);
    let mut chart = chart_with(vec![a, b, c], project);

    chart.store_mut().remove(a_id);

    let curves = chart.dependency_curves();
    assert_eq!(curves.len(), 1);
    assert_eq!(curves[0].from_task_id, b_id);
    assert_eq!(curves[0].to_task_id, c_id);
    assert_eq!((curves[0].from_row, curves[0].to_row), (0, 1));
}

#[test]
fn remove_dependency_writes_only_when_an_edge_goes() {
    let project = Uuid::new_v4();
    let a = Task::scheduled(project, "a", date(3, 1), date(3, 2));
    let mut b = Task::scheduled(project, "b", date(3, 3), date(3, 4));
    b.dependencies.insert(a.id);
    let (a_id, b_id) = (a.id, b.id);
    let mut chart = chart_with(vec![a, b], project);

    let updated = chart.remove_dependency(b_id, a_id).unwrap().unwrap();
    assert!(updated.dependencies.is_empty());
    assert_eq!(chart.remove_dependency(b_id, a_id).unwrap(), None);
}

/// A store whose writes always fail.
struct OfflineStore(MemoryStore);

impl TaskStore for OfflineStore {
    fn get_tasks(&self, project: ProjectId) -> Vec<Task> {
        self.0.get_tasks(project)
    }

    fn update_task(&mut self, _patch: TaskPatch) -> Result<Task, StoreError> {
        Err(StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::NotConnected,
            "offline",
        )))
    }
}

#[test]
fn store_failure_is_surfaced_and_gesture_is_still_discarded() {
    let project = Uuid::new_v4();
    let task = Task::scheduled(project, "a", date(3, 10), date(3, 12));
    let id = task.id;
    let mut chart = GanttChart::new(OfflineStore(MemoryStore::with_tasks(vec![task])), project, CELL);

    chart.on_gesture_start(id, GestureMode::Move, 0.0).unwrap();
    chart.on_gesture_move(60.0);
    let err = chart.on_gesture_end(None).unwrap_err();

    assert!(matches!(err, StoreError::Io(_)));
    assert!(chart.active_gesture().is_none());
}
