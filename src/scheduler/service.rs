//! The prompt scheduler's background loop.
//!
//! A single long-lived task wakes at a fixed interval and runs, in order:
//! a startup-only catch-up/reengagement pass, the scheduled-prompt pass
//! (deduplicated per UTC minute), and a daily reengagement re-arm. Within a
//! tick, users are processed sequentially; one user's failure is logged and
//! never blocks the rest, and nothing escapes a tick.
//!
//! Running more than one scheduler against the same persistence store will
//! race on duplicate sends; deployments must keep a single instance (or
//! serialize externally).

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, Timelike, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::clock::zoned;
use crate::config::SchedulerSettings;

use super::error::SchedulerResult;
use super::notify::NotificationChannel;
use super::persistence::SchedulePersistence;
use super::schedule::UserSchedule;

/// Catch-ups within this many hours of the scheduled time read as "right on
/// time".
const CATCH_UP_IMMEDIATE_HOURS: f64 = 4.0;

/// Catch-ups are abandoned past this many hours; tomorrow's scheduled pass
/// takes over.
const CATCH_UP_CUTOFF_HOURS: f64 = 12.0;

/// No gentle catch-ups at or after this user-local hour.
const QUIET_HOUR: u32 = 23;

// ============================================================================
// Public API
// ============================================================================

/// The prompt scheduler.
///
/// Owns its tick state explicitly (startup flag, per-minute dedup marker,
/// daily reengagement marker) and the injected capability dependencies.
pub struct PromptScheduler {
    persistence: Arc<dyn SchedulePersistence>,
    notifier: Arc<dyn NotificationChannel>,
    settings: SchedulerSettings,

    /// UTC minute (`YYYY-MM-DDTHH:MM`) of the last scheduled pass, so
    /// sub-minute tick jitter never double-works a minute.
    last_pass_minute: Option<String>,
    /// The catch-up and reengagement startup passes run exactly once.
    startup_passes_done: bool,
    /// Server-local date of the last daily reengagement run.
    last_reengagement_date: Option<NaiveDate>,
}

/// Handle to a running scheduler loop.
///
/// Call [`SchedulerHandle::stop`] to shut down and wait; merely dropping
/// the handle also ends the loop, but without waiting for it.
pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Signal shutdown and wait for the loop to finish.
    ///
    /// An in-flight tick (including any in-flight per-user delivery)
    /// completes first; no tick starts after this returns.
    pub async fn stop(self) {
        if self.shutdown_tx.send(true).is_err() {
            warn!("Scheduler loop already stopped");
        }
        if let Err(e) = self.task.await {
            warn!(error = %e, "Scheduler task panicked");
        }
        info!("Prompt scheduler stopped");
    }
}

impl PromptScheduler {
    pub fn new(
        persistence: Arc<dyn SchedulePersistence>,
        notifier: Arc<dyn NotificationChannel>,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            persistence,
            notifier,
            settings,
            last_pass_minute: None,
            startup_passes_done: false,
            last_reengagement_date: None,
        }
    }

    /// Spawn the background loop.
    pub fn start(mut self) -> SchedulerHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let interval_secs = self.settings.check_interval_secs.max(1);

        let task = tokio::spawn(async move {
            info!(interval_secs, "Prompt scheduler started");
            let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = interval.tick() => {}
                }
                self.tick(Utc::now()).await;
            }

            info!("Prompt scheduler loop exited");
        });

        SchedulerHandle { shutdown_tx, task }
    }

    /// Run one tick at the given instant.
    ///
    /// Public so embedders and tests can drive the passes deterministically;
    /// the background loop calls this with `Utc::now()`.
    pub async fn tick(&mut self, now: DateTime<Utc>) {
        if !self.startup_passes_done {
            self.run_catch_up_pass(now).await;
            self.run_reengagement_pass().await;
            self.startup_passes_done = true;
        }

        self.run_scheduled_pass(now).await;
        self.maybe_daily_reengagement(now).await;
    }

    // ------------------------------------------------------------------------
    // Scheduled pass
    // ------------------------------------------------------------------------

    async fn run_scheduled_pass(&mut self, now: DateTime<Utc>) {
        let minute = now.format("%Y-%m-%dT%H:%M").to_string();
        if self.last_pass_minute.as_deref() == Some(minute.as_str()) {
            return;
        }
        self.last_pass_minute = Some(minute);

        let users = match self.persistence.eligible_for_scheduled_prompt().await {
            Ok(users) => users,
            Err(e) => {
                error!(error = %e, "Failed to fetch users for scheduled prompts");
                return;
            }
        };

        for user in users {
            if let Err(e) = self.deliver_scheduled(&user, now).await {
                error!(
                    user_id = %user.user_id,
                    error = %e,
                    "Failed to send scheduled prompt"
                );
            }
        }
    }

    /// Deliver the scheduled prompt to one user if their local wall clock
    /// matches their prompt time right now.
    async fn deliver_scheduled(&self, user: &UserSchedule, now: DateTime<Utc>) -> SchedulerResult<()> {
        // Malformed prompt time: silently ineligible.
        let Some(prompt_time) = user.prompt_time_parsed() else {
            return Ok(());
        };

        let local = zoned(now, user.timezone.as_deref());
        let today = local.date_naive();

        // At most one scheduled prompt per user per local calendar date.
        if user.prompt_sent_on(today) {
            return Ok(());
        }

        if local.hour() != prompt_time.hour() || local.minute() != prompt_time.minute() {
            return Ok(());
        }

        info!(
            user_id = %user.user_id,
            prompt_time = %prompt_time.format("%H:%M"),
            "Sending scheduled prompt"
        );
        self.notifier.send_scheduled_prompt(user).await?;
        self.persistence.mark_prompt_sent(&user.user_id, today).await?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Catch-up pass (startup only)
    // ------------------------------------------------------------------------

    async fn run_catch_up_pass(&self, now: DateTime<Utc>) {
        let users = match self.persistence.with_missed_prompt().await {
            Ok(users) => users,
            Err(e) => {
                error!(error = %e, "Failed to fetch users with missed prompts");
                return;
            }
        };

        for user in users {
            if let Err(e) = self.deliver_catch_up(&user, now).await {
                error!(
                    user_id = %user.user_id,
                    error = %e,
                    "Failed to send catch-up prompt"
                );
            }
        }
    }

    /// Deliver a catch-up to one user whose local prompt time already
    /// passed today, unless it is too late to bother them.
    async fn deliver_catch_up(&self, user: &UserSchedule, now: DateTime<Utc>) -> SchedulerResult<()> {
        let Some(prompt_time) = user.prompt_time_parsed() else {
            return Ok(());
        };

        let local = zoned(now, user.timezone.as_deref());
        let today = local.date_naive();

        if user.prompt_sent_on(today) {
            return Ok(());
        }

        let scheduled = today.and_time(prompt_time);
        let late = local.naive_local() - scheduled;
        if late < chrono::Duration::zero() {
            // Prompt time is still ahead of us today; the scheduled pass owns it.
            return Ok(());
        }
        let hours_late = late.num_seconds() as f64 / 3600.0;

        if hours_late < CATCH_UP_IMMEDIATE_HOURS {
            info!(user_id = %user.user_id, hours_late, "Sending catch-up prompt");
        } else if hours_late < CATCH_UP_CUTOFF_HOURS && local.hour() < QUIET_HOUR {
            info!(user_id = %user.user_id, hours_late, "Sending gentle catch-up prompt");
        } else {
            debug!(
                user_id = %user.user_id,
                hours_late,
                "Too late for a catch-up, waiting for tomorrow's prompt"
            );
            return Ok(());
        }

        self.notifier.send_catch_up_prompt(user, hours_late).await?;
        self.persistence.mark_prompt_sent(&user.user_id, today).await?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Reengagement pass
    // ------------------------------------------------------------------------

    async fn run_reengagement_pass(&self) {
        let threshold = self.settings.reengagement_threshold_days;
        let users = match self.persistence.needing_reengagement(threshold).await {
            Ok(users) => users,
            Err(e) => {
                error!(error = %e, "Failed to fetch users needing reengagement");
                return;
            }
        };

        for user in users {
            // A malformed prompt time makes a user ineligible for every pass.
            if user.prompt_time.is_some() && user.prompt_time_parsed().is_none() {
                debug!(user_id = %user.user_id, "Skipping reengagement, malformed prompt time");
                continue;
            }
            info!(user_id = %user.user_id, "Sending reengagement prompt");
            if let Err(e) = self.notifier.send_reengagement_prompt(&user).await {
                error!(
                    user_id = %user.user_id,
                    error = %e,
                    "Failed to send reengagement prompt"
                );
            }
        }
    }

    /// Re-arm the reengagement pass once per calendar day.
    ///
    /// The gate uses the *server's* local hour, not each user's: inherited
    /// behavior, kept so reengagement sends batch at one known-quiet hour
    /// (see DESIGN.md). There is also no per-user cooldown beyond this
    /// daily gate.
    async fn maybe_daily_reengagement(&mut self, now: DateTime<Utc>) {
        let local = now.with_timezone(&Local);
        if local.hour() != self.settings.reengagement_hour {
            return;
        }
        if self.last_reengagement_date == Some(local.date_naive()) {
            return;
        }
        self.last_reengagement_date = Some(local.date_naive());

        info!("Running daily reengagement pass");
        self.run_reengagement_pass().await;
    }
}

// ============================================================================
// Tests
// ============================================================================
