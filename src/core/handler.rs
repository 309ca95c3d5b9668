use crate::core::document::{lock_document, NodeId, SharedDocument};
use crate::core::events::{ClickEvent, EventDispatcher, Subscription};
use crate::domain::model::{ParticipantEmail, UnregisterOutcome};
use crate::domain::ports::{HandlerSettings, Notifier, UnregisterApi};
use crate::utils::error::{Result, UnregisterError};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Upper bound on finished outcomes kept around for [`DeleteClickHandler::settle`].
/// Oldest clicks are dropped first.
pub const MAX_RETAINED_OUTCOMES: usize = 1024;

type CompletedOutcomes = Arc<Mutex<BTreeMap<u64, UnregisterOutcome>>>;

/// What a single click did, decided synchronously before any network I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickDisposition {
    /// Target does not carry the marker class.
    Ignored,
    /// Marker class present but the email attribute is missing or blank.
    MissingEmail,
    /// One unregister request is now in flight.
    Dispatched(ParticipantEmail),
}

/// Delegated click listener for the participant list.
///
/// Each qualifying click spawns its own task on the runtime captured at
/// construction, so clicks may be dispatched from any thread. Requests are
/// neither debounced nor cancelled; completions resolve in whatever order the
/// server answers.
pub struct DeleteClickHandler<A: UnregisterApi, N: Notifier> {
    document: SharedDocument,
    api: Arc<A>,
    notifier: Arc<N>,
    settings: Arc<HandlerSettings>,
    runtime: Handle,
    attached: AtomicBool,
    next_click: AtomicU64,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
    completed: CompletedOutcomes,
}

impl<A, N> DeleteClickHandler<A, N>
where
    A: UnregisterApi + 'static,
    N: Notifier + 'static,
{
    /// Binds the handler to the tokio runtime of the calling context.
    pub fn new(
        document: SharedDocument,
        api: Arc<A>,
        notifier: Arc<N>,
        settings: HandlerSettings,
    ) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| UnregisterError::RuntimeUnavailable)?;
        Ok(Self::with_runtime(document, api, notifier, settings, runtime))
    }

    pub fn with_runtime(
        document: SharedDocument,
        api: Arc<A>,
        notifier: Arc<N>,
        settings: HandlerSettings,
        runtime: Handle,
    ) -> Self {
        Self {
            document,
            api,
            notifier,
            settings: Arc::new(settings),
            runtime,
            attached: AtomicBool::new(false),
            next_click: AtomicU64::new(0),
            in_flight: Mutex::new(Vec::new()),
            completed: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    pub fn settings(&self) -> &HandlerSettings {
        &self.settings
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    /// Registers the handler on the document's click stream. Only one
    /// registration may be live at a time.
    pub fn attach(self: &Arc<Self>, dispatcher: &EventDispatcher) -> Result<Subscription> {
        if self.attached.swap(true, Ordering::SeqCst) {
            return Err(UnregisterError::AlreadyAttached);
        }

        let handler = Arc::clone(self);
        let subscription = dispatcher.subscribe(move |event| {
            handler.on_click(event);
        });
        tracing::debug!(
            "Delete-click handler attached (marker class '{}')",
            self.settings.marker_class
        );
        Ok(subscription)
    }

    /// Teardown path. Returns false if the subscription was already gone.
    pub fn detach(&self, dispatcher: &EventDispatcher, subscription: Subscription) -> bool {
        let removed = dispatcher.unsubscribe(subscription);
        if removed {
            self.attached.store(false, Ordering::SeqCst);
            tracing::debug!("Delete-click handler detached");
        }
        removed
    }

    pub fn on_click(&self, event: &ClickEvent) -> ClickDisposition {
        let email = {
            let doc = lock_document(&self.document);
            if !doc.has_class(event.target, &self.settings.marker_class) {
                return ClickDisposition::Ignored;
            }
            ParticipantEmail::from_attribute(
                doc.attribute(event.target, &self.settings.email_attribute),
            )
        };

        let Some(email) = email else {
            tracing::warn!(
                "Delete control {} has no '{}' attribute, skipping request",
                event.target.index(),
                self.settings.email_attribute
            );
            return ClickDisposition::MissingEmail;
        };

        tracing::info!("Unregistering participant {}", email);
        let click = self.next_click.fetch_add(1, Ordering::SeqCst);
        let completed = self.completed.clone();
        let resolve = resolve_click(
            self.document.clone(),
            self.api.clone(),
            self.notifier.clone(),
            self.settings.clone(),
            event.target,
            email.clone(),
        );
        let task = self.runtime.spawn(async move {
            let outcome = resolve.await;
            record_outcome(&completed, click, outcome);
        });

        let mut in_flight = self.lock_in_flight();
        in_flight.retain(|task| !task.is_finished());
        in_flight.push(task);

        ClickDisposition::Dispatched(email)
    }

    /// Waits for every request in flight right now, then hands back all
    /// finished outcomes in click order.
    pub async fn settle(&self) -> Vec<UnregisterOutcome> {
        let tasks = std::mem::take(&mut *self.lock_in_flight());
        for task in tasks {
            if let Err(e) = task.await {
                tracing::error!("Unregister task did not complete: {}", e);
            }
        }

        let mut completed = lock_outcomes(&self.completed);
        std::mem::take(&mut *completed).into_values().collect()
    }

    pub fn in_flight(&self) -> usize {
        self.lock_in_flight()
            .iter()
            .filter(|task| !task.is_finished())
            .count()
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[cfg(test)]
    fn retained_tasks(&self) -> usize {
        self.lock_in_flight().len()
    }
}

fn lock_outcomes(
    completed: &CompletedOutcomes,
) -> MutexGuard<'_, BTreeMap<u64, UnregisterOutcome>> {
    completed
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn record_outcome(completed: &CompletedOutcomes, click: u64, outcome: UnregisterOutcome) {
    let mut outcomes = lock_outcomes(completed);
    outcomes.insert(click, outcome);
    while outcomes.len() > MAX_RETAINED_OUTCOMES {
        if let Some((_, dropped)) = outcomes.pop_first() {
            tracing::debug!("Dropping unsettled outcome for {}", dropped.email());
        }
    }
}

async fn resolve_click<A, N>(
    document: SharedDocument,
    api: Arc<A>,
    notifier: Arc<N>,
    settings: Arc<HandlerSettings>,
    target: NodeId,
    email: ParticipantEmail,
) -> UnregisterOutcome
where
    A: UnregisterApi,
    N: Notifier,
{
    match api.unregister(&email).await {
        Ok(response) if response.success => {
            let list_item = {
                let mut doc = lock_document(&document);
                let item = doc.closest(target, &settings.list_item_tag);
                match item {
                    Some(item) if doc.remove(item) => {
                        tracing::info!("✅ Unregistered {}, list item removed", email);
                    }
                    Some(_) => {
                        tracing::debug!("List item for {} was already removed", email);
                    }
                    None => {
                        tracing::warn!(
                            "Unregistered {} but no enclosing <{}> was found",
                            email,
                            settings.list_item_tag
                        );
                    }
                }
                item
            };
            UnregisterOutcome::Unregistered { email, list_item }
        }
        Ok(response) => {
            let detail = response.detail.or(response.message);
            tracing::warn!(
                "Server refused to unregister {}: {}",
                email,
                detail.as_deref().unwrap_or("no detail")
            );
            notifier.alert(&settings.unregister_failed_message);
            UnregisterOutcome::Rejected { email, detail }
        }
        Err(e) => {
            tracing::error!("❌ Unregister request for {} failed: {}", email, e);
            notifier.alert(&settings.transport_failed_message);
            UnregisterOutcome::TransportFailed {
                email,
                reason: e.to_string(),
            }
        }
    }
}
