//! Click handling for table cards.
//!
//! [`TableToggleHandler::init`] captures the CSRF token and the cards once and
//! hands back a [`Registration`]. Every [`Registration::click`] spawns one
//! toggle request; the card only changes when the server answers.

use crate::card::{Occupancy, TableCard};
use crate::client::ToggleTransport;
use crate::errors::{SetupError, ToggleError};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, Default)]
pub struct ToggleOptions {
    /// Ignore clicks on a card while its previous request is still pending.
    /// Off by default: overlapping requests are sent and the last answer to
    /// arrive wins.
    pub guard_in_flight: bool,
}

pub struct TableToggleHandler;

impl TableToggleHandler {
    pub fn init<T: ToggleTransport>(
        csrf_token: Option<&str>,
        cards: impl IntoIterator<Item = TableCard>,
        transport: T,
    ) -> Result<Registration<T>, SetupError> {
        Self::init_with_options(csrf_token, cards, transport, ToggleOptions::default())
    }

    pub fn init_with_options<T: ToggleTransport>(
        csrf_token: Option<&str>,
        cards: impl IntoIterator<Item = TableCard>,
        transport: T,
        options: ToggleOptions,
    ) -> Result<Registration<T>, SetupError> {
        let csrf_token = csrf_token
            .filter(|token| !token.is_empty())
            .ok_or(SetupError::MissingCsrfToken)?
            .to_string();

        let mut seen = HashSet::new();
        let mut registered = Vec::new();
        for card in cards {
            if !seen.insert(card.id().to_string()) {
                return Err(SetupError::DuplicateCard(card.id().to_string()));
            }
            registered.push(card);
        }

        info!(cards = registered.len(), "table toggle handler ready");

        Ok(Registration {
            inner: Arc::new(Inner {
                csrf_token,
                transport,
                options,
                cards: Mutex::new(registered),
                in_flight: Mutex::new(HashMap::new()),
                disposed: AtomicBool::new(false),
            }),
        })
    }
}

struct Inner<T> {
    csrf_token: String,
    transport: T,
    options: ToggleOptions,
    cards: Mutex<Vec<TableCard>>,
    in_flight: Mutex<HashMap<String, usize>>,
    disposed: AtomicBool,
}

fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T: ToggleTransport> Inner<T> {
    fn has_card(&self, table_id: &str) -> bool {
        lock(&self.cards).iter().any(|card| card.id() == table_id)
    }

    /// Marks a request as pending; refuses when the guard is on and one is
    /// already out for this card.
    fn begin(&self, table_id: &str) -> bool {
        let mut in_flight = lock(&self.in_flight);
        let pending = in_flight.entry(table_id.to_string()).or_default();
        if self.options.guard_in_flight && *pending > 0 {
            return false;
        }
        *pending = pending.saturating_add(1);
        true
    }

    fn finish(&self, table_id: &str, result: Result<Occupancy, ToggleError>) {
        match result {
            Ok(occupancy) => {
                let mut cards = lock(&self.cards);
                if let Some(card) = cards.iter_mut().find(|card| card.id() == table_id) {
                    card.apply(occupancy);
                    debug!(table_id, state = occupancy.class(), "table card updated");
                }
            }
            Err(err) => error!(table_id, "failed to toggle table: {err}"),
        }

        let mut in_flight = lock(&self.in_flight);
        if let Some(pending) = in_flight.get_mut(table_id) {
            *pending = pending.saturating_sub(1);
            if *pending == 0 {
                in_flight.remove(table_id);
            }
        }
    }
}

/// Live set of clickable cards. Clones share the same cards.
pub struct Registration<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Registration<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: ToggleTransport> Registration<T> {
    /// Handles a click on the card with `table_id`.
    ///
    /// Must run inside a tokio runtime. Returns the spawned request task, or
    /// `None` when no request was sent (unknown card, disposed registration,
    /// or a guarded card with a pending request).
    pub fn click(&self, table_id: &str) -> Option<JoinHandle<()>> {
        if self.is_disposed() {
            debug!(table_id, "click ignored: handler disposed");
            return None;
        }
        if !self.inner.has_card(table_id) {
            debug!(table_id, "click ignored: unknown table card");
            return None;
        }
        if !self.inner.begin(table_id) {
            debug!(table_id, "click ignored: request already in flight");
            return None;
        }

        let inner = Arc::clone(&self.inner);
        let table_id = table_id.to_string();
        Some(tokio::spawn(async move {
            let result = inner.transport.toggle(&table_id, &inner.csrf_token).await;
            inner.finish(&table_id, result);
        }))
    }

    pub fn card(&self, table_id: &str) -> Option<TableCard> {
        lock(&self.inner.cards)
            .iter()
            .find(|card| card.id() == table_id)
            .cloned()
    }

    pub fn is_in_flight(&self, table_id: &str) -> bool {
        lock(&self.inner.in_flight).contains_key(table_id)
    }

    /// Detaches every card. Requests already sent still update their card.
    pub fn dispose(&self) {
        if !self.inner.disposed.swap(true, Ordering::AcqRel) {
            info!("table toggle handler disposed");
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::oneshot;
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::{Layer, Registry};

    enum Reply {
        Occupied(bool),
        Malformed,
        Unavailable,
    }

    #[derive(Default)]
    struct FakeTransport {
        calls: Mutex<Vec<(String, String)>>,
        replies: Mutex<VecDeque<oneshot::Receiver<Reply>>>,
    }

    impl FakeTransport {
        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }

        fn script(&self) -> oneshot::Sender<Reply> {
            let (tx, rx) = oneshot::channel();
            self.replies.lock().unwrap().push_back(rx);
            tx
        }

        fn reply_with(&self, reply: Reply) {
            let _ = self.script().send(reply);
        }
    }

    impl ToggleTransport for Arc<FakeTransport> {
        async fn toggle(&self, table_id: &str, csrf_token: &str) -> Result<Occupancy, ToggleError> {
            self.calls
                .lock()
                .unwrap()
                .push((table_id.to_string(), csrf_token.to_string()));
            let reply = self.replies.lock().unwrap().pop_front();
            let Some(reply) = reply else {
                return Err(ToggleError::Status {
                    status: 503,
                    body: "no reply scripted".into(),
                });
            };
            match reply.await {
                Ok(Reply::Occupied(flag)) => Ok(Occupancy::from_occupied(flag)),
                Ok(Reply::Malformed) => Err(ToggleError::MalformedResponse),
                Ok(Reply::Unavailable) | Err(_) => Err(ToggleError::Status {
                    status: 502,
                    body: "connection reset".into(),
                }),
            }
        }
    }

    #[derive(Clone, Default)]
    struct ErrorCounter(Arc<AtomicUsize>);

    impl ErrorCounter {
        fn count(&self) -> usize {
            self.0.load(Ordering::SeqCst)
        }
    }

    impl<S: Subscriber> Layer<S> for ErrorCounter {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::ERROR {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn board() -> Vec<TableCard> {
        vec![
            TableCard::rendered("1", Occupancy::Free),
            TableCard::rendered("2", Occupancy::Occupied),
        ]
    }

    fn setup(options: ToggleOptions) -> (Registration<Arc<FakeTransport>>, Arc<FakeTransport>) {
        let transport = Arc::new(FakeTransport::default());
        let registration = TableToggleHandler::init_with_options(
            Some("token-abc"),
            board(),
            Arc::clone(&transport),
            options,
        )
        .unwrap();
        (registration, transport)
    }

    #[tokio::test]
    async fn click_posts_once_with_csrf_token() {
        let (registration, transport) = setup(ToggleOptions::default());
        transport.reply_with(Reply::Occupied(true));

        registration.click("1").unwrap().await.unwrap();

        assert_eq!(transport.calls(), vec![("1".to_string(), "token-abc".to_string())]);
    }

    #[tokio::test]
    async fn occupied_answer_marks_card_occupied() {
        let (registration, transport) = setup(ToggleOptions::default());
        transport.reply_with(Reply::Occupied(true));

        registration.click("1").unwrap().await.unwrap();

        let card = registration.card("1").unwrap();
        assert!(card.has_class("occupied"));
        assert!(!card.has_class("free"));
        assert!(card.status_html().contains("Ocupada"));
    }

    #[tokio::test]
    async fn free_answer_marks_card_free() {
        let (registration, transport) = setup(ToggleOptions::default());
        transport.reply_with(Reply::Occupied(false));

        registration.click("2").unwrap().await.unwrap();

        let card = registration.card("2").unwrap();
        assert!(card.has_class("free"));
        assert!(!card.has_class("occupied"));
        assert!(card.status_html().contains("Libre"));
    }

    #[tokio::test]
    async fn failed_request_leaves_card_and_logs_once() {
        let counter = ErrorCounter::default();
        let _guard = tracing::subscriber::set_default(Registry::default().with(counter.clone()));

        let (registration, transport) = setup(ToggleOptions::default());
        let before = registration.card("1").unwrap();
        transport.reply_with(Reply::Unavailable);

        registration.click("1").unwrap().await.unwrap();

        assert_eq!(registration.card("1").unwrap(), before);
        assert_eq!(counter.count(), 1);
        assert!(!registration.is_in_flight("1"));
    }

    #[tokio::test]
    async fn malformed_answer_is_not_read_as_free() {
        let counter = ErrorCounter::default();
        let _guard = tracing::subscriber::set_default(Registry::default().with(counter.clone()));

        let (registration, transport) = setup(ToggleOptions::default());
        transport.reply_with(Reply::Malformed);

        registration.click("2").unwrap().await.unwrap();

        assert_eq!(registration.card("2").unwrap().occupancy(), Some(Occupancy::Occupied));
        assert_eq!(counter.count(), 1);
    }

    #[tokio::test]
    async fn card_does_not_flip_before_answer() {
        let (registration, transport) = setup(ToggleOptions::default());
        let reply = transport.script();

        let handle = registration.click("1").unwrap();
        tokio::task::yield_now().await;
        assert_eq!(registration.card("1").unwrap().occupancy(), Some(Occupancy::Free));
        assert!(registration.is_in_flight("1"));

        let _ = reply.send(Reply::Occupied(true));
        handle.await.unwrap();
        assert_eq!(registration.card("1").unwrap().occupancy(), Some(Occupancy::Occupied));
        assert!(!registration.is_in_flight("1"));
    }

    #[tokio::test]
    async fn overlapping_clicks_last_answer_wins() {
        let (registration, transport) = setup(ToggleOptions::default());
        let first = transport.script();
        let second = transport.script();

        let first_handle = registration.click("1").unwrap();
        let second_handle = registration.click("1").unwrap();
        tokio::task::yield_now().await;

        let _ = second.send(Reply::Occupied(true));
        second_handle.await.unwrap();
        let _ = first.send(Reply::Occupied(false));
        first_handle.await.unwrap();

        assert_eq!(transport.calls().len(), 2);
        assert_eq!(registration.card("1").unwrap().occupancy(), Some(Occupancy::Free));
    }

    #[tokio::test]
    async fn guarded_card_ignores_clicks_while_pending() {
        let (registration, transport) = setup(ToggleOptions {
            guard_in_flight: true,
        });
        let reply = transport.script();

        let handle = registration.click("1").unwrap();
        assert!(registration.click("1").is_none());
        // other cards are not blocked
        transport.reply_with(Reply::Occupied(false));
        registration.click("2").unwrap().await.unwrap();

        let _ = reply.send(Reply::Occupied(true));
        handle.await.unwrap();
        assert_eq!(transport.calls().len(), 2);

        transport.reply_with(Reply::Occupied(false));
        assert!(registration.click("1").is_some());
    }

    #[tokio::test]
    async fn unknown_card_sends_nothing() {
        let (registration, transport) = setup(ToggleOptions::default());
        assert!(registration.click("99").is_none());
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn disposed_registration_sends_nothing() {
        let (registration, transport) = setup(ToggleOptions::default());
        registration.dispose();

        assert!(registration.is_disposed());
        assert!(registration.click("1").is_none());
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn dispose_keeps_pending_answer() {
        let (registration, transport) = setup(ToggleOptions::default());
        let reply = transport.script();

        let handle = registration.click("1").unwrap();
        registration.dispose();
        let _ = reply.send(Reply::Occupied(true));
        handle.await.unwrap();

        assert_eq!(registration.card("1").unwrap().occupancy(), Some(Occupancy::Occupied));
    }

    #[test]
    fn missing_csrf_token_fails_setup() {
        let transport = Arc::new(FakeTransport::default());
        let result = TableToggleHandler::init(None, board(), Arc::clone(&transport));
        assert!(matches!(result, Err(SetupError::MissingCsrfToken)));

        let result = TableToggleHandler::init(Some(""), board(), transport);
        assert!(matches!(result, Err(SetupError::MissingCsrfToken)));
    }

    #[tokio::test]
    async fn token_is_sent_as_given() {
        let transport = Arc::new(FakeTransport::default());
        let registration =
            TableToggleHandler::init(Some(" tok en "), board(), Arc::clone(&transport)).unwrap();
        transport.reply_with(Reply::Occupied(true));

        registration.click("1").unwrap().await.unwrap();

        assert_eq!(transport.calls(), vec![("1".to_string(), " tok en ".to_string())]);
    }

    #[test]
    fn duplicate_card_fails_setup() {
        let cards = vec![TableCard::new("1"), TableCard::new("1")];
        let result = TableToggleHandler::init(Some("t"), cards, Arc::new(FakeTransport::default()));
        assert!(matches!(result, Err(SetupError::DuplicateCard(id)) if id == "1"));
    }
}
