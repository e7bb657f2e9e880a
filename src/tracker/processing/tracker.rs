use anyhow::Result;
use tracing::{debug, info, instrument, warn};

use crate::{
    tracker::{
        host::messages::{
            BrowserEvent, ControlMessage, ControlReply, IdleState, PauseState, PopupData,
        },
        session::{Session, SiteKey},
        storage::{entities::TimeLogs, load_or_create_user_id, local_store::LocalStore},
        sync::{FlushOutcome, LogBatch, LogStore},
        tabs::{TabId, TabRegistry, WINDOW_ID_NONE},
    },
    utils::{clock::Clock, time::whole_seconds},
};

/// Owns all tracker state: the open session, the pause flag, the identity and what is known
/// about browser tabs. Every event goes through [Tracker::dispatch], which funnels into
/// [Tracker::handle_transition], so at most one session is ever open.
pub struct Tracker<S: LocalStore, L: LogStore> {
    session: Option<Session>,
    paused: bool,
    user_id: String,
    tabs: TabRegistry,
    store: S,
    log_store: L,
    clock: Box<dyn Clock>,
}

impl<S: LocalStore, L: LogStore> Tracker<S, L> {
    /// Creates a tracker with no open session. The user id is loaded from the store, or created
    /// on first run.
    pub async fn initialize(store: S, log_store: L, clock: Box<dyn Clock>) -> Result<Self> {
        let user_id = load_or_create_user_id(&store).await?;
        info!("Tracking for user {user_id}");
        Ok(Self {
            session: None,
            paused: false,
            user_id,
            tabs: TabRegistry::new(),
            store,
            log_store,
            clock,
        })
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Updates the tab registry and triggers a transition if the event moves the user to
    /// another page, window, or away from the browser.
    #[instrument(skip(self))]
    pub async fn dispatch(&mut self, event: BrowserEvent) -> Result<()> {
        match event {
            BrowserEvent::TabActivated { tab_id, window_id } => {
                self.tabs.activate(tab_id, window_id);
                self.handle_transition(Some(tab_id)).await
            }
            BrowserEvent::TabUpdated { tab, url_changed } => {
                let (tab_id, active) = (tab.id, tab.active);
                self.tabs.upsert(tab);
                if active && url_changed {
                    self.handle_transition(Some(tab_id)).await
                } else {
                    Ok(())
                }
            }
            BrowserEvent::TabRemoved { tab_id } => {
                self.tabs.remove(tab_id);
                Ok(())
            }
            BrowserEvent::WindowFocusChanged { window_id } => {
                match window_id.filter(|window_id| *window_id != WINDOW_ID_NONE) {
                    None => {
                        self.tabs.clear_focus();
                        self.handle_transition(None).await
                    }
                    Some(window_id) => {
                        self.tabs.focus_window(window_id);
                        match self.tabs.active_tab(window_id) {
                            Some(tab_id) => self.handle_transition(Some(tab_id)).await,
                            None => {
                                debug!("Window {window_id} has no known active tab");
                                Ok(())
                            }
                        }
                    }
                }
            }
            BrowserEvent::IdleStateChanged {
                state: IdleState::Active,
            } => match self.tabs.active_in_focused() {
                Some(tab_id) => self.handle_transition(Some(tab_id)).await,
                None => {
                    debug!("Back from idle without a focused window");
                    Ok(())
                }
            },
            BrowserEvent::IdleStateChanged {
                state: IdleState::Idle | IdleState::Locked,
            } => self.handle_transition(None).await,
        }
    }

    /// Closes the current session and opens one for `candidate` if it shows a web page.
    pub async fn handle_transition(&mut self, candidate: Option<TabId>) -> Result<()> {
        if self.paused {
            return Ok(());
        }
        self.commit().await?;

        let Some(tab_id) = candidate else {
            self.session = None;
            return Ok(());
        };

        let site = match self.tabs.resolve(tab_id) {
            Ok(tab) => tab.url.as_deref().and_then(SiteKey::from_address),
            Err(e) => {
                debug!("Could not resolve tab: {e}");
                None
            }
        };

        self.session = site.map(|site| {
            debug!("Tracking {site}");
            Session {
                site,
                started_at: self.clock.time(),
            }
        });
        Ok(())
    }

    /// Moves the time of the open session into durable storage. The session stays open and is
    /// restarted from now. Spans that round to less than a second are dropped.
    pub async fn commit(&mut self) -> Result<()> {
        if self.paused {
            return Ok(());
        }
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };

        let now = self.clock.time();
        let elapsed = whole_seconds(now - session.started_at);
        if elapsed < 1 {
            return Ok(());
        }

        let total = self
            .store
            .add_time(&session.site, elapsed)
            .await
            .inspect_err(|e| warn!("Failed to store {elapsed}s for {}: {e:?}", session.site))?;
        info!("Logged {elapsed}s for {}, {total}s pending", session.site);
        session.started_at = now;
        Ok(())
    }

    /// Flips the pause flag and returns the new state. Time before the pause is committed, and
    /// the time spent paused is never attributed to a site.
    pub async fn toggle_pause(&mut self) -> bool {
        if self.paused {
            self.paused = false;
            if let Some(session) = self.session.as_mut() {
                session.started_at = self.clock.time();
            }
            info!("Tracking resumed");
        } else {
            if let Err(e) = self.commit().await {
                warn!("Pausing without committing the running session {e:?}");
            }
            self.paused = true;
            info!("Tracking paused");
        }
        self.paused
    }

    pub async fn popup_data(&self) -> Result<PopupData> {
        Ok(PopupData {
            is_paused: self.paused,
            time_logs: self.store.time_logs().await?,
        })
    }

    /// Answers a control message. The popup waits for a reply, so a failed storage read still
    /// answers with the pause state and no totals.
    pub async fn control(&mut self, message: ControlMessage) -> ControlReply {
        match message {
            ControlMessage::GetPopupData => {
                ControlReply::PopupData(self.popup_data().await.unwrap_or_else(|e| {
                    warn!("Replying without time logs {e:?}");
                    PopupData {
                        is_paused: self.paused,
                        time_logs: TimeLogs::new(),
                    }
                }))
            }
            ControlMessage::TogglePause => ControlReply::PauseState(PauseState {
                is_paused: self.toggle_pause().await,
            }),
        }
    }

    /// Sends everything accumulated to the log store. Local totals are cleared only once the
    /// store confirmed the batch, otherwise they are kept for the next attempt.
    pub async fn flush(&mut self) -> Result<FlushOutcome> {
        let time_logs = self.store.time_logs().await?;
        if time_logs.is_empty() {
            debug!("No new data to sync");
            return Ok(FlushOutcome::Empty);
        }

        let batch = LogBatch::from_time_logs(self.user_id.clone(), &time_logs, self.clock.time());
        self.log_store
            .submit(&batch)
            .await
            .inspect_err(|e| warn!("Sync failed, keeping logs for the next attempt {e:?}"))?;
        self.store.clear_time_logs().await?;

        let outcome = FlushOutcome::Sent {
            sites: batch.logs.len(),
            seconds: batch.total_seconds(),
        };
        info!("Synced {outcome:?}");
        Ok(outcome)
    }

    /// Commits the running session and makes a last sync attempt before the host exits.
    pub async fn finalize(&mut self) -> Result<()> {
        self.commit().await?;
        self.session = None;
        self.flush().await?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn tabs_mut(&mut self) -> &mut TabRegistry {
        &mut self.tabs
    }
}
