//! Task store: sole mutator of the active collection.
//!
//! Every operation keeps `status == InProgress` and `start_time.is_some()`
//! in lockstep, then writes the whole collection back in one record write.
//! Mutations are staged on a copy and only become visible once the write
//! succeeds.

use chrono::{DateTime, TimeDelta, Utc};

use super::Scope;
use crate::context::ServiceContext;
use crate::error::BoardError;
use crate::model::{NewTask, Status, Task, TaskPatch};
use crate::storage::StorageGateway;
use crate::timer::{self, STALE_AFTER};

/// Signal emitted when a task lands in `Done`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Task id.
    pub task_id: String,
    /// Total seconds spent in progress, including earlier rounds of work.
    pub total_time: u64,
}

/// Result of a status move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    /// The task after the move.
    pub task: Task,
    /// Set when the move completed the task.
    pub completion: Option<Completion>,
}

/// A timer repair made while reconciling a loaded collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Healed {
    /// In progress with no start time; a fresh interval was opened.
    Opened {
        /// Task id.
        task_id: String,
    },
    /// Open interval older than the staleness threshold; accrued time was
    /// flushed and the interval restarted.
    Checkpointed {
        /// Task id.
        task_id: String,
        /// Seconds folded into `time_spent`.
        flushed: u64,
    },
    /// Not in progress but still had a start time; the interval was closed.
    Closed {
        /// Task id.
        task_id: String,
        /// Seconds folded into `time_spent`.
        flushed: u64,
    },
}

/// The in-memory task list of one scope, backed by the storage gateway.
pub struct TaskStore<'a> {
    ctx: &'a ServiceContext,
    scope: Scope,
    tasks: Vec<Task>,
    stale_after: TimeDelta,
}

impl<'a> TaskStore<'a> {
    /// Loads the collection for `scope` and heals any timer inconsistencies.
    ///
    /// A corrupted record loads as an empty list. Healing writes back only
    /// when something changed.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::NotFound` for a member scope whose member is gone,
    /// or `BoardError::Storage` when the store fails.
    pub fn load(ctx: &'a ServiceContext, scope: Scope) -> Result<Self, BoardError> {
        Self::load_with(ctx, scope, STALE_AFTER)
    }

    /// Like [`TaskStore::load`] with a custom staleness threshold.
    ///
    /// # Errors
    ///
    /// Same as [`TaskStore::load`].
    pub fn load_with(
        ctx: &'a ServiceContext,
        scope: Scope,
        stale_after: TimeDelta,
    ) -> Result<Self, BoardError> {
        let gateway = StorageGateway::new(ctx);
        let tasks = match &scope {
            Scope::Default => gateway.load_tasks()?,
            Scope::Member(id) => {
                let roster = gateway.load_roster()?;
                let member = roster.get(id).ok_or_else(|| BoardError::not_found("member", id))?;
                member.tasks.clone()
            }
        };
        let mut store = Self { ctx, scope, tasks, stale_after };
        let healed = store.reconcile_on_load();
        if !healed.is_empty() {
            store.persist()?;
        }
        Ok(store)
    }

    /// The scope this store reads and writes.
    #[must_use]
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// All tasks in insertion order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Looks a task up by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Creates a task. An in-progress task starts its timer immediately.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::Validation` for a blank title (nothing is stored),
    /// or `BoardError::Storage` when the write fails.
    pub fn create(&mut self, fields: NewTask) -> Result<Task, BoardError> {
        fields.validate()?;
        let now = self.ctx.clock.now();
        let mut task = Task {
            id: self.ctx.id_gen.generate_id(),
            title: fields.title.trim().to_string(),
            description: fields.description.filter(|d| !d.trim().is_empty()),
            priority: fields.priority,
            status: fields.status,
            due_date: fields.due_date,
            tags: fields.tags,
            created_at: now,
            start_time: None,
            time_spent: 0,
            total_time: None,
        };
        if task.status == Status::InProgress {
            timer::open_interval(&mut task, now);
        }
        let mut next = self.tasks.clone();
        next.push(task.clone());
        self.commit(next)?;
        tracing::debug!(task_id = %task.id, status = %task.status, scope = %self.scope, "task created");
        Ok(task)
    }

    /// Merges `patch` over an existing task.
    ///
    /// A status change applies the timer transition rules; without one the
    /// timer is untouched. `created_at` never changes. Returns `Ok(None)`
    /// when the id is not present.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::Validation` for a blank title, or
    /// `BoardError::Storage` when the write fails.
    pub fn update(&mut self, id: &str, patch: TaskPatch) -> Result<Option<Task>, BoardError> {
        patch.validate()?;
        let now = self.ctx.clock.now();
        let mut next = self.tasks.clone();
        let Some(task) = next.iter_mut().find(|t| t.id == id) else {
            tracing::debug!(task_id = id, "update skipped; task no longer exists");
            return Ok(None);
        };
        let next_status = patch.status;
        patch.merge_fields(task);
        if let Some(status) = next_status {
            transition(task, status, now);
        }
        let updated = task.clone();
        self.commit(next)?;
        Ok(Some(updated))
    }

    /// Moves a task to another column (drag and drop).
    ///
    /// Same timer rules as `update`; a move into `Done` carries a completion
    /// signal with the task's total time. Returns `Ok(None)` when the id is
    /// not present.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::Storage` when the write fails.
    pub fn move_to(&mut self, id: &str, status: Status) -> Result<Option<MoveOutcome>, BoardError> {
        let now = self.ctx.clock.now();
        let mut next = self.tasks.clone();
        let Some(task) = next.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        let previous = task.status;
        transition(task, status, now);
        let completion = (previous != Status::Done && status == Status::Done).then(|| Completion {
            task_id: task.id.clone(),
            total_time: task.time_spent,
        });
        let outcome = MoveOutcome { task: task.clone(), completion };
        self.commit(next)?;
        Ok(Some(outcome))
    }

    /// Deletes a task. Returns `false` (and writes nothing) when absent.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::Storage` when the write fails.
    pub fn remove(&mut self, id: &str) -> Result<bool, BoardError> {
        if self.get(id).is_none() {
            return Ok(false);
        }
        let next = self.tasks.iter().filter(|t| t.id != id).cloned().collect();
        self.commit(next)?;
        Ok(true)
    }

    /// Empties the collection.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::Storage` when the write fails.
    pub fn clear(&mut self) -> Result<(), BoardError> {
        self.commit(Vec::new())
    }

    /// Replaces the whole collection (import).
    ///
    /// Records are taken as given; only the timer invariant is re-established.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::Storage` when the write fails.
    pub fn replace_all(&mut self, tasks: Vec<Task>) -> Result<Vec<Healed>, BoardError> {
        let mut next = tasks;
        let healed = self.reconcile(&mut next);
        self.commit(next)?;
        Ok(healed)
    }

    /// Repairs timer state after loading from storage.
    ///
    /// In-progress tasks without a start time get a fresh interval (no time is
    /// invented). Intervals open longer than the staleness threshold are checkpointed:
    /// the accrued seconds move into `time_spent` and the interval restarts
    /// now. Tasks outside in-progress with a leftover start time are closed.
    /// No previously accrued second is ever dropped.
    pub fn reconcile_on_load(&mut self) -> Vec<Healed> {
        let mut tasks = std::mem::take(&mut self.tasks);
        let healed = self.reconcile(&mut tasks);
        self.tasks = tasks;
        healed
    }

    fn reconcile(&self, tasks: &mut [Task]) -> Vec<Healed> {
        let now = self.ctx.clock.now();
        let mut healed = Vec::new();
        for task in tasks {
            let repair = match (task.status, task.start_time) {
                (Status::InProgress, None) => {
                    timer::open_interval(task, now);
                    Some(Healed::Opened { task_id: task.id.clone() })
                }
                (Status::InProgress, Some(start)) if now - start > self.stale_after => {
                    timer::checkpoint(task, now)
                        .map(|flushed| Healed::Checkpointed { task_id: task.id.clone(), flushed })
                }
                (Status::Todo | Status::Done, Some(_)) => timer::close_interval(task, now)
                    .map(|flushed| Healed::Closed { task_id: task.id.clone(), flushed }),
                _ => None,
            };
            if let Some(repair) = repair {
                tracing::info!(scope = %self.scope, ?repair, "healed task timer on load");
                healed.push(repair);
            }
        }
        healed
    }

    /// Writes the collection back to its record.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::NotFound` if the scope's member was deleted in the
    /// meantime (the write is refused rather than redirected), or
    /// `BoardError::Storage` when the write fails.
    pub fn persist(&self) -> Result<(), BoardError> {
        self.write(&self.tasks)
    }

    // Writes `next`, then adopts it. On error `self.tasks` is untouched.
    fn commit(&mut self, next: Vec<Task>) -> Result<(), BoardError> {
        self.write(&next)?;
        self.tasks = next;
        Ok(())
    }

    fn write(&self, tasks: &[Task]) -> Result<(), BoardError> {
        let gateway = StorageGateway::new(self.ctx);
        match &self.scope {
            Scope::Default => gateway.save_tasks(tasks),
            Scope::Member(id) => {
                let mut roster = gateway.load_roster()?;
                let member =
                    roster.get_mut(id).ok_or_else(|| BoardError::not_found("member", id))?;
                member.tasks = tasks.to_vec();
                gateway.save_roster(&roster)
            }
        }
    }
}

/// Applies a status change and its timer side effects.
///
/// Leaving `InProgress` closes the interval; entering it opens one without
/// touching accumulated time. Any move into `Done` snapshots `total_time`.
/// Same-status moves do nothing.
fn transition(task: &mut Task, next: Status, now: DateTime<Utc>) {
    let previous = task.status;
    if previous == next {
        return;
    }
    if previous == Status::InProgress {
        timer::close_interval(task, now);
    }
    if next == Status::Done {
        task.total_time = Some(task.time_spent);
    }
    task.status = next;
    if next == Status::InProgress {
        timer::open_interval(task, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{ManualClock, MemoryKeyValueStore};
    use crate::model::{Priority, Tags};
    use crate::storage::keys;

    fn t0() -> DateTime<Utc> {
        "2024-06-15T09:00:00Z".parse().unwrap()
    }

    fn setup() -> (ManualClock, ServiceContext) {
        let clock = ManualClock::new(t0());
        let ctx = ServiceContext::in_memory(clock.clone());
        (clock, ctx)
    }

    fn assert_invariant(store: &TaskStore<'_>) {
        for t in store.tasks() {
            assert_eq!(
                t.status == Status::InProgress,
                t.start_time.is_some(),
                "timer invariant broken for {t:?}"
            );
        }
    }

    #[test]
    fn create_assigns_id_and_creation_time() {
        let (_clock, ctx) = setup();
        let mut store = TaskStore::load(&ctx, Scope::Default).unwrap();

        let task = store.create(NewTask::titled("  Draft report ")).unwrap();

        assert_eq!(task.id, "id-1");
        assert_eq!(task.title, "Draft report");
        assert_eq!(task.created_at, t0());
        assert_eq!(task.start_time, None);
        assert_eq!(StorageGateway::new(&ctx).load_tasks().unwrap(), vec![task]);
    }

    #[test]
    fn create_rejects_blank_title_without_storing() {
        let (_clock, ctx) = setup();
        let mut store = TaskStore::load(&ctx, Scope::Default).unwrap();

        let err = store.create(NewTask::titled("   ")).unwrap_err();

        assert!(matches!(err, BoardError::Validation { field: "title" }));
        assert!(store.tasks().is_empty());
        assert_eq!(ctx.kv.get(keys::TASKS).unwrap(), None);
    }

    #[test]
    fn create_in_progress_opens_timer() {
        let (_clock, ctx) = setup();
        let mut store = TaskStore::load(&ctx, Scope::Default).unwrap();
        let task = store.create(NewTask::titled("Run").with_status(Status::InProgress)).unwrap();
        assert_eq!(task.start_time, Some(t0()));
        assert_eq!(task.time_spent, 0);
    }

    #[test]
    fn draft_report_scenario() {
        let (clock, ctx) = setup();
        let mut store = TaskStore::load(&ctx, Scope::Default).unwrap();
        let id = store.create(NewTask::titled("Draft report")).unwrap().id;

        store.move_to(&id, Status::InProgress).unwrap();
        clock.advance_secs(125);
        let outcome = store.move_to(&id, Status::Done).unwrap().unwrap();

        assert_eq!(outcome.task.total_time, Some(125));
        assert_eq!(outcome.task.time_spent, 125);
        assert_eq!(outcome.task.start_time, None);
        assert_eq!(
            outcome.completion,
            Some(Completion { task_id: id.clone(), total_time: 125 })
        );
        assert_invariant(&store);
    }

    #[test]
    fn reentering_progress_keeps_accumulated_time() {
        let (clock, ctx) = setup();
        let mut store = TaskStore::load(&ctx, Scope::Default).unwrap();
        let id = store.create(NewTask::titled("A").with_status(Status::InProgress)).unwrap().id;

        clock.advance_secs(30);
        store.move_to(&id, Status::Todo).unwrap();
        clock.advance_secs(1000);
        store.move_to(&id, Status::InProgress).unwrap();
        clock.advance_secs(45);
        let done = store.move_to(&id, Status::Done).unwrap().unwrap().task;

        assert_eq!(done.time_spent, 75);
        assert_eq!(done.total_time, Some(75));
    }

    #[test]
    fn edits_without_status_change_leave_timer_alone() {
        let (clock, ctx) = setup();
        let mut store = TaskStore::load(&ctx, Scope::Default).unwrap();
        let id = store.create(NewTask::titled("A").with_status(Status::InProgress)).unwrap().id;
        clock.advance_secs(60);

        let patch = TaskPatch {
            title: Some("Renamed".into()),
            priority: Some(Priority::High),
            tags: Some(["x", "y"].into_iter().collect::<Tags>()),
            status: Some(Status::InProgress),
            ..TaskPatch::default()
        };
        let task = store.update(&id, patch).unwrap().unwrap();

        assert_eq!(task.title, "Renamed");
        assert_eq!(task.start_time, Some(t0()));
        assert_eq!(task.time_spent, 0);
        assert_eq!(task.created_at, t0());
    }

    #[test]
    fn update_replaces_tags_and_clears_fields() {
        let (_clock, ctx) = setup();
        let mut store = TaskStore::load(&ctx, Scope::Default).unwrap();
        let mut fields = NewTask::titled("A");
        fields.description = Some("notes".into());
        fields.tags = ["a", "b"].into_iter().collect();
        let id = store.create(fields).unwrap().id;

        let patch = TaskPatch {
            description: Some(None),
            tags: Some(["c"].into_iter().collect()),
            ..TaskPatch::default()
        };
        let task = store.update(&id, patch).unwrap().unwrap();

        assert_eq!(task.description, None);
        assert_eq!(task.tags.iter().collect::<Vec<_>>(), vec!["c"]);
    }

    #[test]
    fn update_leaving_progress_for_todo_does_not_snapshot_total() {
        let (clock, ctx) = setup();
        let mut store = TaskStore::load(&ctx, Scope::Default).unwrap();
        let id = store.create(NewTask::titled("A").with_status(Status::InProgress)).unwrap().id;
        clock.advance_secs(10);

        let task = store.update(&id, TaskPatch::status(Status::Todo)).unwrap().unwrap();

        assert_eq!(task.time_spent, 10);
        assert_eq!(task.total_time, None);
        assert_eq!(task.start_time, None);
    }

    #[test]
    fn missing_ids_are_silent_noops() {
        let (_clock, ctx) = setup();
        let mut store = TaskStore::load(&ctx, Scope::Default).unwrap();
        assert_eq!(store.update("ghost", TaskPatch::status(Status::Done)).unwrap(), None);
        assert_eq!(store.move_to("ghost", Status::Done).unwrap(), None);
        assert!(!store.remove("ghost").unwrap());
        assert_eq!(ctx.kv.get(keys::TASKS).unwrap(), None);
    }

    #[test]
    fn remove_and_clear() {
        let (_clock, ctx) = setup();
        let mut store = TaskStore::load(&ctx, Scope::Default).unwrap();
        let a = store.create(NewTask::titled("A")).unwrap().id;
        store.create(NewTask::titled("B").with_status(Status::InProgress)).unwrap();

        assert!(store.remove(&a).unwrap());
        assert_eq!(store.tasks().len(), 1);

        store.clear().unwrap();
        assert!(store.tasks().is_empty());
        assert!(StorageGateway::new(&ctx).load_tasks().unwrap().is_empty());
    }

    #[test]
    fn load_opens_interval_for_in_progress_without_start() {
        let clock = ManualClock::new(t0());
        let kv = MemoryKeyValueStore::with_records([(
            "tasks",
            r#"[{"id":"a","title":"A","status":"inprogress","timeSpent":40}]"#,
        )]);
        let ctx = ServiceContext::with_store(clock, kv);

        let store = TaskStore::load(&ctx, Scope::Default).unwrap();

        let task = store.get("a").unwrap();
        assert_eq!(task.start_time, Some(t0()));
        assert_eq!(task.time_spent, 40);
        // healed state is written back
        let saved = StorageGateway::new(&ctx).load_tasks().unwrap();
        assert_eq!(saved[0].start_time, Some(t0()));
    }

    #[test]
    fn load_checkpoints_stale_interval() {
        let clock = ManualClock::new(t0());
        let started = t0() - TimeDelta::hours(30);
        let record = format!(
            r#"[{{"id":"a","title":"A","status":"inprogress","timeSpent":5,"startTime":"{}"}}]"#,
            started.to_rfc3339()
        );
        let ctx = ServiceContext::with_store(clock, MemoryKeyValueStore::with_records([("tasks", record)]));

        let mut store = TaskStore::load(&ctx, Scope::Default).unwrap();

        let task = store.get("a").unwrap();
        assert_eq!(task.time_spent, 5 + 30 * 3600);
        assert_eq!(task.start_time, Some(t0()));
        assert!(store.reconcile_on_load().is_empty());
    }

    #[test]
    fn load_trusts_fresh_interval() {
        let clock = ManualClock::new(t0());
        let started = t0() - TimeDelta::hours(2);
        let record = format!(
            r#"[{{"id":"a","title":"A","status":"inprogress","startTime":"{}"}}]"#,
            started.to_rfc3339()
        );
        let ctx = ServiceContext::with_store(clock, MemoryKeyValueStore::with_records([("tasks", record)]));

        let store = TaskStore::load(&ctx, Scope::Default).unwrap();

        let task = store.get("a").unwrap();
        assert_eq!(task.start_time, Some(started));
        assert_eq!(task.time_spent, 0);
    }

    #[test]
    fn custom_threshold_checkpoints_sooner() {
        let clock = ManualClock::new(t0());
        let started = t0() - TimeDelta::minutes(90);
        let record = format!(
            r#"[{{"id":"a","title":"A","status":"inprogress","startTime":"{}"}}]"#,
            started.to_rfc3339()
        );
        let ctx = ServiceContext::with_store(clock, MemoryKeyValueStore::with_records([("tasks", record)]));

        let store = TaskStore::load_with(&ctx, Scope::Default, TimeDelta::hours(1)).unwrap();

        assert_eq!(store.get("a").unwrap().time_spent, 90 * 60);
    }

    #[test]
    fn replace_all_passes_records_through_and_heals() {
        let (_clock, ctx) = setup();
        let mut store = TaskStore::load(&ctx, Scope::Default).unwrap();
        store.create(NewTask::titled("old")).unwrap();

        let imported: Vec<Task> = serde_json::from_str(
            r#"[{"id":"x","title":"A","status":"done"},{"id":"y","title":"B","status":"inprogress"}]"#,
        )
        .unwrap();
        let healed = store.replace_all(imported).unwrap();

        assert_eq!(store.tasks().len(), 2);
        assert_eq!(healed, vec![Healed::Opened { task_id: "y".into() }]);
        assert_invariant(&store);
    }

    #[test]
    fn member_scope_reads_and_writes_member_tasks() {
        let clock = ManualClock::new(t0());
        let kv = MemoryKeyValueStore::with_records([
            ("tasks", r#"[{"id":"d","title":"Default"}]"#),
            ("routines", r#"{"members":[{"id":"m","name":"Kid","tasks":[]}]}"#),
        ]);
        let ctx = ServiceContext::with_store(clock, kv);

        let mut store = TaskStore::load(&ctx, Scope::Member("m".into())).unwrap();
        store.create(NewTask::titled("Homework")).unwrap();

        let gw = StorageGateway::new(&ctx);
        assert_eq!(gw.load_roster().unwrap().get("m").unwrap().tasks.len(), 1);
        assert_eq!(gw.load_tasks().unwrap().len(), 1);
        assert_eq!(gw.load_tasks().unwrap()[0].title, "Default");
    }

    #[test]
    fn member_scope_refuses_to_write_after_member_deleted() {
        let clock = ManualClock::new(t0());
        let kv = MemoryKeyValueStore::with_records([(
            "routines",
            r#"{"members":[{"id":"m","name":"Kid"}]}"#,
        )]);
        let ctx = ServiceContext::with_store(clock, kv);
        let mut store = TaskStore::load(&ctx, Scope::Member("m".into())).unwrap();

        StorageGateway::new(&ctx).save_roster(&crate::model::Roster::default()).unwrap();
        let err = store.create(NewTask::titled("late")).unwrap_err();

        assert!(matches!(err, BoardError::NotFound { kind: "member", .. }));
        assert_eq!(ctx.kv.get(keys::TASKS).unwrap(), None);
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn failed_writes_leave_the_list_unchanged() {
        let clock = ManualClock::new(t0());
        let kv = MemoryKeyValueStore::with_records([(
            "routines",
            r#"{"members":[{"id":"m","name":"Kid"}]}"#,
        )]);
        let ctx = ServiceContext::with_store(clock, kv);
        let mut store = TaskStore::load(&ctx, Scope::Member("m".into())).unwrap();
        let id = store.create(NewTask::titled("kept")).unwrap().id;
        let before = store.tasks().to_vec();

        StorageGateway::new(&ctx).save_roster(&crate::model::Roster::default()).unwrap();

        assert!(store.update(&id, TaskPatch::status(Status::Done)).is_err());
        assert!(store.move_to(&id, Status::InProgress).is_err());
        assert!(store.remove(&id).is_err());
        assert!(store.clear().is_err());
        assert!(store.replace_all(Vec::new()).is_err());
        assert_eq!(store.tasks(), before.as_slice());
    }

    #[test]
    fn completing_a_reopened_task_reports_current_time() {
        let (clock, ctx) = setup();
        let mut store = TaskStore::load(&ctx, Scope::Default).unwrap();
        let id = store.create(NewTask::titled("A").with_status(Status::InProgress)).unwrap().id;

        clock.advance_secs(30);
        store.move_to(&id, Status::Done).unwrap();
        store.move_to(&id, Status::InProgress).unwrap();
        clock.advance_secs(20);
        store.move_to(&id, Status::Todo).unwrap();
        let outcome = store.move_to(&id, Status::Done).unwrap().unwrap();

        assert_eq!(outcome.task.time_spent, 50);
        assert_eq!(outcome.task.total_time, Some(50));
        assert_eq!(outcome.completion.map(|c| c.total_time), Some(50));
    }
}
