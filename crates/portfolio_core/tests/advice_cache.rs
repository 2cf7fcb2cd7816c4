use portfolio_core::service::advice_service::{ADVICE_EMPTY_FALLBACK, ADVICE_OFFLINE_FALLBACK};
use portfolio_core::{
    seed_store, AdviceCache, AdviceEntry, BlockerDetails, AdviceError, AdviceProvider, AdviceRequest, AdviceService,
};
use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;
use std::time::Duration;
use tokio::runtime::Handle;

enum Reply {
    Text(&'static str),
    Fail,
}

struct ScriptedProvider {
    reply: Reply,
    seen: Mutex<Vec<AdviceRequest>>,
}

impl ScriptedProvider {
    fn new(reply: Reply) -> Self {
        Self {
            reply,
            seen: Mutex::new(Vec::new()),
        }
    }
}

impl AdviceProvider for ScriptedProvider {
    fn suggest(&self, request: &AdviceRequest) -> Result<String, AdviceError> {
        self.seen.lock().unwrap().push(request.clone());
        match self.reply {
            Reply::Text(text) => Ok(text.to_string()),
            Reply::Fail => Err(AdviceError::Unavailable("timeout".to_string())),
        }
    }
}

#[tokio::test]
async fn successful_advice_is_cached_by_task_id() {
    let store = seed_store();
    let service = AdviceService::new(
        ScriptedProvider::new(Reply::Text("1. Escalate to infra lead")),
        Handle::current(),
    );

    let handle = service.request(store.task("t3").unwrap()).unwrap();
    let entry = handle.await.unwrap();

    assert_eq!(entry, AdviceEntry::Ready("1. Escalate to infra lead".to_string()));
    assert_eq!(service.cache().get("t3"), Some(entry));
    assert!(!service.cache().is_pending("t3"));
}

#[test]
fn provider_receives_title_and_reason() {
    let store = seed_store();
    let provider = ScriptedProvider::new(Reply::Text("ok"));
    let request = AdviceRequest::for_task(store.task("t3").unwrap()).unwrap();
    assert_eq!(request.task_title, "S3 Configuration");
    assert_eq!(request.blocker_reason, "Pending access keys from infra");
    assert!(request.prompt().contains("S3 Configuration"));

    provider.suggest(&request).unwrap();
    assert_eq!(provider.seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn empty_answer_stores_fallback_text() {
    let store = seed_store();
    let service = AdviceService::new(ScriptedProvider::new(Reply::Text("  ")), Handle::current());

    let entry = service.request(store.task("t3").unwrap()).unwrap().await.unwrap();
    assert_eq!(entry, AdviceEntry::Fallback(ADVICE_EMPTY_FALLBACK.to_string()));
    assert_eq!(entry.text(), Some(ADVICE_EMPTY_FALLBACK));
}

#[tokio::test]
async fn provider_failure_stores_offline_text() {
    let store = seed_store();
    let service = AdviceService::new(ScriptedProvider::new(Reply::Fail), Handle::current());

    let entry = service.request(store.task("t3").unwrap()).unwrap().await.unwrap();
    assert_eq!(entry, AdviceEntry::Fallback(ADVICE_OFFLINE_FALLBACK.to_string()));
    assert_eq!(service.cache().get("t3"), Some(entry));
}

#[tokio::test]
async fn unblocked_task_is_rejected_without_caching() {
    let store = seed_store();
    let service = AdviceService::new(ScriptedProvider::new(Reply::Text("x")), Handle::current());

    let err = service.request(store.task("t2").unwrap()).unwrap_err();
    assert_eq!(err, AdviceError::NotBlocked("t2".to_string()));
    assert!(service.cache().is_empty());
}

/// Answers each task only when the test releases text on its channel.
struct GatedProvider {
    gates: HashMap<String, Mutex<Receiver<String>>>,
}

impl GatedProvider {
    fn new(task_ids: &[&str]) -> (Self, HashMap<String, Sender<String>>) {
        let mut gates = HashMap::new();
        let mut senders = HashMap::new();
        for task_id in task_ids {
            let (tx, rx) = channel();
            gates.insert(task_id.to_string(), Mutex::new(rx));
            senders.insert(task_id.to_string(), tx);
        }
        (Self { gates }, senders)
    }
}

impl AdviceProvider for GatedProvider {
    fn suggest(&self, request: &AdviceRequest) -> Result<String, AdviceError> {
        let gate = self
            .gates
            .get(&request.task_id)
            .ok_or_else(|| AdviceError::Unavailable("no gate".to_string()))?;
        gate.lock()
            .unwrap()
            .recv()
            .map_err(|err| AdviceError::Unavailable(err.to_string()))
    }
}

fn wait_until_ready(cache: &AdviceCache, task_id: &str) {
    for _ in 0..2_000 {
        if matches!(cache.get(task_id), Some(AdviceEntry::Ready(_))) {
            return;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    panic!("advice for {task_id} never completed");
}

#[tokio::test]
async fn entry_is_pending_while_provider_runs() {
    let store = seed_store();
    let (provider, senders) = GatedProvider::new(&["t3"]);
    let service = AdviceService::new(provider, Handle::current());

    let handle = service.request(store.task("t3").unwrap()).unwrap();
    assert!(service.cache().is_pending("t3"));
    assert_eq!(service.cache().get("t3"), Some(AdviceEntry::Pending));

    senders["t3"].send("Escalate key request".to_string()).unwrap();
    handle.await.unwrap();
    assert!(!service.cache().is_pending("t3"));
}

#[tokio::test]
async fn late_answer_is_cached_after_blocker_is_cleared() {
    let mut store = seed_store();
    let (provider, senders) = GatedProvider::new(&["t3"]);
    let service = AdviceService::new(provider, Handle::current());

    let handle = service.request(store.task("t3").unwrap()).unwrap();
    store.set_blocker("t3", None).unwrap();
    senders["t3"].send("Rotate keys".to_string()).unwrap();
    handle.await.unwrap();

    assert!(!store.task("t3").unwrap().is_blocked());
    assert_eq!(
        service.cache().get("t3"),
        Some(AdviceEntry::Ready("Rotate keys".to_string()))
    );
}

#[tokio::test]
async fn requests_for_different_tasks_complete_independently() {
    let mut store = seed_store();
    store
        .set_blocker("t6", Some(BlockerDetails::new("API contract pending", "Backend", "")))
        .unwrap();
    let (provider, senders) = GatedProvider::new(&["t3", "t6"]);
    let service = AdviceService::new(provider, Handle::current());

    let slow = service.request(store.task("t3").unwrap()).unwrap();
    let fast = service.request(store.task("t6").unwrap()).unwrap();

    senders["t6"].send("Mock the API".to_string()).unwrap();
    fast.await.unwrap();
    assert_eq!(
        service.cache().get("t6"),
        Some(AdviceEntry::Ready("Mock the API".to_string()))
    );
    assert!(service.cache().is_pending("t3"));

    senders["t3"].send("Escalate".to_string()).unwrap();
    slow.await.unwrap();
    assert_eq!(service.cache().len(), 2);
}

#[tokio::test]
async fn repeated_request_for_same_task_keeps_last_write() {
    let store = seed_store();
    let (provider, senders) = GatedProvider::new(&["t3"]);
    let service = AdviceService::new(provider, Handle::current());
    let task = store.task("t3").unwrap();

    let first = service.request(task).unwrap();
    let second = service.request(task).unwrap();

    senders["t3"].send("first answer".to_string()).unwrap();
    wait_until_ready(service.cache(), "t3");
    senders["t3"].send("second answer".to_string()).unwrap();
    first.await.unwrap();
    second.await.unwrap();

    assert_eq!(
        service.cache().get("t3"),
        Some(AdviceEntry::Ready("second answer".to_string()))
    );
}
