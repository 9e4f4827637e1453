// ── Scripted in-memory backend for unit tests ──
//
// Behaves like a tiny todo server. Individual calls can be gated on a
// oneshot so tests decide exactly when (and in which order) responses
// arrive.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use taskdeck_api::{Ack, UploadFile};
use tokio::sync::oneshot;

use crate::backend::Backend;
use crate::error::CoreError;
use crate::model::{Item, ItemId, ParentUnit};
use crate::store::CollectionSnapshot;

pub(crate) type EnrichResult = Result<Vec<String>, CoreError>;

enum Reply<T> {
    Now(T),
    Gated(oneshot::Receiver<T>),
}

impl<T> Reply<T> {
    async fn resolve(self) -> Result<T, CoreError> {
        match self {
            Self::Now(value) => Ok(value),
            Self::Gated(rx) => rx
                .await
                .map_err(|_| CoreError::Internal("gate dropped".into())),
        }
    }
}

#[derive(Default)]
pub(crate) struct ScriptedBackend {
    todos: Mutex<Vec<Item>>,
    next_id: AtomicI64,
    list_gates: Mutex<VecDeque<oneshot::Receiver<Vec<Item>>>>,
    list_failures: Mutex<VecDeque<CoreError>>,
    list_calls: AtomicUsize,
    write_gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    write_failures: Mutex<VecDeque<CoreError>>,
    writes: Mutex<Vec<String>>,
    uploads: Mutex<VecDeque<Reply<Result<Vec<ParentUnit>, CoreError>>>>,
    enrich_replies: Mutex<HashMap<String, VecDeque<Reply<EnrichResult>>>>,
    enrich_calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedBackend {
    pub(crate) fn with_items(items: Vec<Item>) -> Arc<Self> {
        let next_id = items
            .iter()
            .filter_map(|i| match i.id {
                ItemId::Number(n) => Some(n),
                ItemId::Text(_) => None,
            })
            .max()
            .unwrap_or(0)
            + 1;
        Arc::new(Self {
            todos: Mutex::new(items),
            next_id: AtomicI64::new(next_id),
            ..Self::default()
        })
    }

    // ── Scripting ────────────────────────────────────────────────────

    /// The next `list` call waits for (and returns) what is sent here.
    pub(crate) fn gate_list(&self) -> oneshot::Sender<Vec<Item>> {
        let (tx, rx) = oneshot::channel();
        self.list_gates.lock().unwrap().push_back(rx);
        tx
    }

    pub(crate) fn fail_next_list(&self, err: CoreError) {
        self.list_failures.lock().unwrap().push_back(err);
    }

    /// The next write waits until this sender fires.
    pub(crate) fn gate_write(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.write_gates.lock().unwrap().push_back(rx);
        tx
    }

    pub(crate) fn fail_next_write(&self, err: CoreError) {
        self.write_failures.lock().unwrap().push_back(err);
    }

    pub(crate) fn reply_upload(&self, reply: Result<Vec<ParentUnit>, CoreError>) {
        self.uploads.lock().unwrap().push_back(Reply::Now(reply));
    }

    pub(crate) fn gate_upload(&self) -> oneshot::Sender<Result<Vec<ParentUnit>, CoreError>> {
        let (tx, rx) = oneshot::channel();
        self.uploads.lock().unwrap().push_back(Reply::Gated(rx));
        tx
    }

    pub(crate) fn reply_enrich(&self, text: &str, reply: EnrichResult) {
        self.enrich_replies
            .lock()
            .unwrap()
            .entry(text.to_owned())
            .or_default()
            .push_back(Reply::Now(reply));
    }

    pub(crate) fn gate_enrich(&self, text: &str) -> oneshot::Sender<EnrichResult> {
        let (tx, rx) = oneshot::channel();
        self.enrich_replies
            .lock()
            .unwrap()
            .entry(text.to_owned())
            .or_default()
            .push_back(Reply::Gated(rx));
        tx
    }

    // ── Observation ──────────────────────────────────────────────────

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    pub(crate) fn enrich_calls(&self) -> Vec<String> {
        self.enrich_calls.lock().unwrap().clone()
    }

    pub(crate) fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub(crate) async fn wait_for_list_calls(&self, n: usize) {
        wait_until(|| self.list_calls() >= n).await;
    }

    pub(crate) async fn wait_for_writes(&self, n: usize) {
        wait_until(|| self.writes().len() >= n).await;
    }

    pub(crate) async fn wait_for_enrich_calls(&self, n: usize) {
        wait_until(|| self.enrich_calls().len() >= n).await;
    }

    async fn before_write(&self, entry: String) -> Result<(), CoreError> {
        self.writes.lock().unwrap().push(entry);
        let gate = self.write_gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            Reply::Gated(gate).resolve().await?;
        }
        match self.write_failures.lock().unwrap().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

async fn wait_until(mut done: impl FnMut() -> bool) {
    for _ in 0..10_000 {
        if done() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn list(&self) -> Result<Vec<Item>, CoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.list_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        let gate = self.list_gates.lock().unwrap().pop_front();
        match gate {
            Some(gate) => Reply::Gated(gate).resolve().await,
            None => Ok(self.todos.lock().unwrap().clone()),
        }
    }

    async fn create(&self, text: &str) -> Result<Ack, CoreError> {
        self.before_write(format!("create:{text}")).await?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.todos.lock().unwrap().push(Item {
            id: ItemId::Number(id),
            text: text.to_owned(),
        });
        Ok(Ack {
            message: Some("To-do added.".into()),
        })
    }

    async fn update(&self, id: &ItemId, text: &str) -> Result<Ack, CoreError> {
        self.before_write(format!("update:{id}:{text}")).await?;
        let mut todos = self.todos.lock().unwrap();
        let todo = todos
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| not_found(id))?;
        todo.text = text.to_owned();
        Ok(Ack::default())
    }

    async fn delete(&self, id: &ItemId) -> Result<Ack, CoreError> {
        self.before_write(format!("delete:{id}")).await?;
        let mut todos = self.todos.lock().unwrap();
        let before = todos.len();
        todos.retain(|t| &t.id != id);
        if todos.len() == before {
            return Err(not_found(id));
        }
        Ok(Ack::default())
    }

    async fn upload_document(&self, _file: &UploadFile) -> Result<Vec<ParentUnit>, CoreError> {
        let reply = self.uploads.lock().unwrap().pop_front();
        match reply {
            Some(reply) => reply.resolve().await?,
            None => Ok(Vec::new()),
        }
    }

    async fn enrich(&self, sub_unit: &str) -> Result<Vec<String>, CoreError> {
        self.enrich_calls.lock().unwrap().push(sub_unit.to_owned());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let reply = self
            .enrich_replies
            .lock()
            .unwrap()
            .get_mut(sub_unit)
            .and_then(VecDeque::pop_front);
        let result = match reply {
            Some(reply) => reply.resolve().await.and_then(|r| r),
            None => Ok(vec![format!("{sub_unit} (improved)")]),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

fn not_found(id: &ItemId) -> CoreError {
    CoreError::Server {
        status: 404,
        message: format!("Todo with id {id} not found."),
    }
}

pub(crate) fn item(id: i64, text: &str) -> Item {
    Item {
        id: ItemId::Number(id),
        text: text.to_owned(),
    }
}

pub(crate) fn texts(snapshot: &CollectionSnapshot) -> Vec<String> {
    snapshot.iter().map(|i| i.text.clone()).collect()
}
