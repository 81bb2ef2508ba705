use crate::application::summary::{Dashboard, FinanceSummary, build_dashboard, summarize_finances};
use crate::data::collection::Collection;
use crate::domain::entries::{
    FinanceEntry, Goal, GoalChanges, HealthEntry, NewFinanceEntry, NewGoal,
    NewHealthEntry, NewTask, Task, TaskChanges, MAX_MOOD, MIN_MOOD, clamp_progress,
    clean_milestones, mood_in_range,
};
use crate::domain::error::DomainError;
use crate::domain::repository::KeyValueStore;
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

pub const TASKS_KEY: &str = "tasks";
pub const HEALTH_ENTRIES_KEY: &str = "healthEntries";
pub const FINANCE_ENTRIES_KEY: &str = "financeEntries";
pub const GOALS_KEY: &str = "goals";

/// Per-user tasks, health entries, finance entries and goals.
pub struct DataStore<S: KeyValueStore + ?Sized> {
    tasks: Collection<Task, S>,
    health_entries: Collection<HealthEntry, S>,
    finance_entries: Collection<FinanceEntry, S>,
    goals: Collection<Goal, S>,
}

impl<S: KeyValueStore + ?Sized> DataStore<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            tasks: Collection::new(store.clone(), TASKS_KEY),
            health_entries: Collection::new(store.clone(), HEALTH_ENTRIES_KEY),
            finance_entries: Collection::new(store.clone(), FINANCE_ENTRIES_KEY),
            goals: Collection::new(store, GOALS_KEY),
        }
    }

    // Tasks

    #[instrument(skip(self))]
    pub async fn get_tasks(&self, user_id: &str) -> Result<Vec<Task>> {
        Ok(owned_by(self.tasks.all().await?, user_id, |t| &t.user_id))
    }

    #[instrument(skip(self, new), fields(user_id = %new.user_id))]
    pub async fn add_task(&self, new: NewTask) -> Result<Task> {
        let task = Task {
            id: Uuid::new_v4().to_string(),
            user_id: new.user_id,
            title: new.title,
            description: new.description,
            completed: new.completed,
            priority: new.priority,
            due_date: new.due_date,
            category: new.category,
            created_at: Utc::now().to_rfc3339(),
        };
        self.tasks.push(task.clone()).await?;
        info!(task_id = %task.id, "Task added");
        Ok(task)
    }

    /// `None` when `owner` has no task with that id.
    #[instrument(skip(self, changes))]
    pub async fn update_task(
        &self,
        owner: &str,
        task_id: &str,
        changes: TaskChanges,
    ) -> Result<Option<Task>> {
        let updated = self
            .tasks
            .try_modify(|tasks| {
                let task = tasks
                    .iter_mut()
                    .find(|t| t.id == task_id && t.user_id == owner)?;
                task.apply(changes);
                Some(task.clone())
            })
            .await?;

        match &updated {
            Some(task) => debug!(task_id = %task.id, completed = task.completed, "Task updated"),
            None => warn!(task_id = task_id, "Task not found for update"),
        }
        Ok(updated)
    }

    /// Whether a task was removed.
    #[instrument(skip(self))]
    pub async fn delete_task(&self, owner: &str, task_id: &str) -> Result<bool> {
        let removed = self
            .tasks
            .try_modify(|tasks| {
                let before = tasks.len();
                tasks.retain(|t| !(t.id == task_id && t.user_id == owner));
                (tasks.len() < before).then_some(())
            })
            .await?
            .is_some();

        if removed {
            info!(task_id = task_id, "Task deleted");
        }
        Ok(removed)
    }

    // Health entries

    #[instrument(skip(self))]
    pub async fn get_health_entries(&self, user_id: &str) -> Result<Vec<HealthEntry>> {
        Ok(owned_by(self.health_entries.all().await?, user_id, |e| &e.user_id))
    }

    #[instrument(skip(self, new), fields(user_id = %new.user_id))]
    pub async fn add_health_entry(&self, new: NewHealthEntry) -> Result<HealthEntry> {
        if !mood_in_range(new.mood) {
            warn!(mood = new.mood, "Mood out of range");
            return Err(DomainError::Validation(format!(
                "Mood must be between {} and {}",
                MIN_MOOD, MAX_MOOD
            ))
            .into());
        }

        let entry = HealthEntry {
            id: Uuid::new_v4().to_string(),
            user_id: new.user_id,
            date: new.date,
            weight: new.weight,
            steps: new.steps,
            sleep: new.sleep,
            water: new.water,
            exercise: new.exercise,
            mood: new.mood,
            notes: new.notes,
        };
        self.health_entries.push(entry.clone()).await?;
        info!(entry_id = %entry.id, "Health entry added");
        Ok(entry)
    }

    // Finance entries

    #[instrument(skip(self))]
    pub async fn get_finance_entries(&self, user_id: &str) -> Result<Vec<FinanceEntry>> {
        Ok(owned_by(self.finance_entries.all().await?, user_id, |e| &e.user_id))
    }

    #[instrument(skip(self, new), fields(user_id = %new.user_id))]
    pub async fn add_finance_entry(&self, new: NewFinanceEntry) -> Result<FinanceEntry> {
        let entry = FinanceEntry {
            id: Uuid::new_v4().to_string(),
            user_id: new.user_id,
            amount: new.amount,
            category: new.category,
            description: new.description,
            kind: new.kind,
            date: new.date,
        };
        self.finance_entries.push(entry.clone()).await?;
        info!(entry_id = %entry.id, amount = entry.amount, "Finance entry added");
        Ok(entry)
    }

    pub async fn finance_summary(&self, user_id: &str, month: &str) -> Result<FinanceSummary> {
        let entries = self.get_finance_entries(user_id).await?;
        Ok(summarize_finances(&entries, month))
    }

    // Goals

    #[instrument(skip(self))]
    pub async fn get_goals(&self, user_id: &str) -> Result<Vec<Goal>> {
        Ok(owned_by(self.goals.all().await?, user_id, |g| &g.user_id))
    }

    #[instrument(skip(self, new), fields(user_id = %new.user_id))]
    pub async fn add_goal(&self, new: NewGoal) -> Result<Goal> {
        let goal = Goal {
            id: Uuid::new_v4().to_string(),
            user_id: new.user_id,
            title: new.title,
            description: new.description,
            category: new.category,
            target_date: new.target_date,
            progress: clamp_progress(new.progress),
            milestones: clean_milestones(new.milestones),
            created_at: Utc::now().to_rfc3339(),
        };
        self.goals.push(goal.clone()).await?;
        info!(goal_id = %goal.id, "Goal added");
        Ok(goal)
    }

    /// `None` when `owner` has no goal with that id.
    #[instrument(skip(self, changes))]
    pub async fn update_goal(
        &self,
        owner: &str,
        goal_id: &str,
        changes: GoalChanges,
    ) -> Result<Option<Goal>> {
        let updated = self
            .goals
            .try_modify(|goals| {
                let goal = goals
                    .iter_mut()
                    .find(|g| g.id == goal_id && g.user_id == owner)?;
                goal.apply(changes);
                Some(goal.clone())
            })
            .await?;

        match &updated {
            Some(goal) => debug!(goal_id = %goal.id, progress = goal.progress, "Goal updated"),
            None => warn!(goal_id = goal_id, "Goal not found for update"),
        }
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn dashboard(&self, user_id: &str, month: &str) -> Result<Dashboard> {
        let tasks = self.get_tasks(user_id).await?;
        let goals = self.get_goals(user_id).await?;
        let health = self.get_health_entries(user_id).await?;
        let finances = self.get_finance_entries(user_id).await?;
        Ok(build_dashboard(&tasks, &goals, &health, &finances, month))
    }
}

fn owned_by<T>(items: Vec<T>, user_id: &str, owner: impl Fn(&T) -> &String) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| owner(item) == user_id)
        .collect()
}
