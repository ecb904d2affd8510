//! Active context tracking: the default list or one member's list.
//!
//! Every switch bumps a context version. Work scheduled for later (such as
//! applying a member's theme after a delay) captures the version it was
//! scheduled under and is dropped if the context moved on in the meantime.

use chrono::TimeDelta;

use crate::board::{Scope, TaskStore};
use crate::context::ServiceContext;
use crate::error::BoardError;
use crate::model::{ColorTheme, Member, Priority, Roster, Status, Tags, Task};
use crate::storage::StorageGateway;
use crate::theme::derive_theme;

/// Picks the member to open with: a URL-supplied id beats the stored one.
#[must_use]
pub fn resolve_initial_context(url_member: Option<&str>, stored: Option<&str>) -> Option<String> {
    fn clean(id: Option<&str>) -> Option<&str> {
        id.map(str::trim).filter(|id| !id.is_empty())
    }
    clean(url_member).or_else(|| clean(stored)).map(str::to_string)
}

/// A theme application scheduled under a specific context version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredAction {
    version: u64,
    member_id: String,
}

impl DeferredAction {
    /// The member the action was scheduled for.
    #[must_use]
    pub fn member_id(&self) -> &str {
        &self.member_id
    }
}

/// Owner of the active context.
pub struct ContextSwitcher<'a> {
    ctx: &'a ServiceContext,
    active: Scope,
    version: u64,
    theme: Option<ColorTheme>,
}

impl<'a> ContextSwitcher<'a> {
    /// Opens the board, resolving which context is active.
    ///
    /// Members missing a color theme get one derived and saved. The resolved
    /// member id is written back; an id naming no member falls back to the
    /// default list and is forgotten.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::Storage` when the store fails.
    pub fn open(ctx: &'a ServiceContext, url_member: Option<&str>) -> Result<Self, BoardError> {
        let gateway = StorageGateway::new(ctx);
        let mut roster = gateway.load_roster()?;
        if backfill_themes(&mut roster) {
            gateway.save_roster(&roster)?;
        }

        let stored = gateway.current_member_id()?;
        let mut switcher = Self { ctx, active: Scope::Default, version: 0, theme: None };
        match resolve_initial_context(url_member, stored.as_deref()) {
            Some(id) if roster.get(&id).is_some() => switcher.switch_to(&id)?,
            Some(id) => {
                tracing::warn!(member_id = %id, "remembered member no longer exists; using default list");
                gateway.set_current_member_id(None)?;
            }
            None => {}
        }
        Ok(switcher)
    }

    /// The active context.
    #[must_use]
    pub fn active(&self) -> &Scope {
        &self.active
    }

    /// Current context version; bumped on every switch.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The member theme currently applied, if any.
    #[must_use]
    pub fn applied_theme(&self) -> Option<&ColorTheme> {
        self.theme.as_ref()
    }

    /// Makes member `id` the active context and applies its theme.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::NotFound` when no such member exists (the active
    /// context is left unchanged), or `BoardError::Storage`.
    pub fn switch_to(&mut self, id: &str) -> Result<(), BoardError> {
        let gateway = StorageGateway::new(self.ctx);
        let roster = gateway.load_roster()?;
        let position = roster.position(id).ok_or_else(|| BoardError::not_found("member", id))?;
        let member = &roster.members[position];

        self.version += 1;
        self.active = Scope::Member(id.to_string());
        gateway.set_current_member_id(Some(id))?;
        self.theme =
            Some(member.color_theme.clone().unwrap_or_else(|| derive_theme(id, &member.name, position)));
        tracing::info!(member_id = id, version = self.version, "switched to member list");
        Ok(())
    }

    /// Returns to the default list and drops any member theme.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::Storage` when the store fails.
    pub fn switch_to_default(&mut self) -> Result<(), BoardError> {
        self.version += 1;
        self.active = Scope::Default;
        self.theme = None;
        StorageGateway::new(self.ctx).set_current_member_id(None)?;
        tracing::info!(version = self.version, "switched to default list");
        Ok(())
    }

    /// Schedules a theme re-application for the active member.
    ///
    /// Returns `None` on the default list.
    #[must_use]
    pub fn defer_theme_apply(&self) -> Option<DeferredAction> {
        let member_id = self.active.member_id()?;
        Some(DeferredAction { version: self.version, member_id: member_id.to_string() })
    }

    /// Runs a deferred theme application if its context is still current.
    ///
    /// Returns whether the theme was applied.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::Storage` when the store fails.
    pub fn run_deferred(&mut self, action: &DeferredAction) -> Result<bool, BoardError> {
        if action.version != self.version || self.active.member_id() != Some(action.member_id.as_str())
        {
            tracing::debug!(
                member_id = %action.member_id,
                scheduled = action.version,
                current = self.version,
                "dropping stale deferred action"
            );
            return Ok(false);
        }
        let roster = StorageGateway::new(self.ctx).load_roster()?;
        let Some(position) = roster.position(&action.member_id) else {
            return Ok(false);
        };
        let member = &roster.members[position];
        self.theme = Some(
            member
                .color_theme
                .clone()
                .unwrap_or_else(|| derive_theme(&member.id, &member.name, position)),
        );
        Ok(true)
    }

    /// Loads the task store of the active context.
    ///
    /// # Errors
    ///
    /// See [`TaskStore::load`].
    pub fn task_store(&self) -> Result<TaskStore<'a>, BoardError> {
        TaskStore::load(self.ctx, self.active.clone())
    }

    /// Loads the task store of the active context with a custom staleness
    /// threshold.
    ///
    /// # Errors
    ///
    /// See [`TaskStore::load`].
    pub fn task_store_with(&self, stale_after: TimeDelta) -> Result<TaskStore<'a>, BoardError> {
        TaskStore::load_with(self.ctx, self.active.clone(), stale_after)
    }

    /// All members in display order.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::Storage` when the store fails.
    pub fn members(&self) -> Result<Roster, BoardError> {
        StorageGateway::new(self.ctx).load_roster()
    }

    /// Adds a member whose list is seeded with one task per routine.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::Validation` for a blank name, or
    /// `BoardError::Storage`.
    pub fn add_member(&mut self, name: &str, routines: &[String]) -> Result<Member, BoardError> {
        let name = checked_name(name)?;
        let routines = clean_routines(routines);
        let gateway = StorageGateway::new(self.ctx);
        let mut roster = gateway.load_roster()?;

        let id = self.ctx.id_gen.generate_id();
        let member = Member {
            color_theme: Some(derive_theme(&id, &name, roster.members.len())),
            tasks: self.seed_tasks(&routines),
            id,
            name,
            routines,
        };
        roster.members.push(member.clone());
        gateway.save_roster(&roster)?;
        tracing::info!(member_id = %member.id, tasks = member.tasks.len(), "member added");
        Ok(member)
    }

    /// Renames a member and replaces its routines.
    ///
    /// A member with no tasks yet is seeded from the new routines; existing
    /// tasks are never touched.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::Validation` for a blank name,
    /// `BoardError::NotFound` for an unknown id, or `BoardError::Storage`.
    pub fn edit_member(&mut self, id: &str, name: &str, routines: &[String]) -> Result<Member, BoardError> {
        let name = checked_name(name)?;
        let routines = clean_routines(routines);
        let gateway = StorageGateway::new(self.ctx);
        let mut roster = gateway.load_roster()?;
        let seed = self.seed_tasks(&routines);

        let member = roster.get_mut(id).ok_or_else(|| BoardError::not_found("member", id))?;
        member.name = name;
        member.routines = routines;
        if member.tasks.is_empty() {
            member.tasks = seed;
        }
        let updated = member.clone();
        gateway.save_roster(&roster)?;
        Ok(updated)
    }

    /// Deletes a member and its list.
    ///
    /// Deleting the active member switches to the default list first. Returns
    /// `false` when no such member exists.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::Storage` when the store fails.
    pub fn delete_member(&mut self, id: &str) -> Result<bool, BoardError> {
        let gateway = StorageGateway::new(self.ctx);
        let mut roster = gateway.load_roster()?;
        if roster.get(id).is_none() {
            return Ok(false);
        }
        if self.active.member_id() == Some(id) {
            self.switch_to_default()?;
        }
        roster.remove(id);
        gateway.save_roster(&roster)?;
        tracing::info!(member_id = id, "member deleted");
        Ok(true)
    }

    fn seed_tasks(&self, routines: &[String]) -> Vec<Task> {
        let base = self.ctx.id_gen.generate_id();
        let now = self.ctx.clock.now();
        routines
            .iter()
            .enumerate()
            .map(|(index, routine)| Task {
                id: format!("{base}-{index}"),
                title: routine.clone(),
                description: None,
                priority: Priority::Medium,
                status: Status::Todo,
                due_date: None,
                tags: Tags::default(),
                created_at: now,
                start_time: None,
                time_spent: 0,
                total_time: None,
            })
            .collect()
    }
}

fn checked_name(name: &str) -> Result<String, BoardError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(BoardError::Validation { field: "name" });
    }
    Ok(name.to_string())
}

fn clean_routines(routines: &[String]) -> Vec<String> {
    routines.iter().map(|r| r.trim()).filter(|r| !r.is_empty()).map(str::to_string).collect()
}

/// Derives themes for members that lack one. Returns whether any changed.
fn backfill_themes(roster: &mut Roster) -> bool {
    let mut changed = false;
    for (position, member) in roster.members.iter_mut().enumerate() {
        if member.color_theme.is_none() {
            member.color_theme = Some(derive_theme(&member.id, &member.name, position));
            tracing::debug!(member_id = %member.id, "derived missing color theme");
            changed = true;
        }
    }
    changed
}
