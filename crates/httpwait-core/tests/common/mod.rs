use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use httpwait_core::{
    AttemptFailure, HttpResponse, PollError, PollObserver, PollRequest, PollSuccess, Transport,
    TransportError,
};

type Reply = Result<HttpResponse, TransportError>;

/// Replays queued replies in order, then repeats `fallback` forever.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Reply>>,
    fallback: Reply,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    pub fn always(response: HttpResponse) -> Self {
        Self::new(Vec::new(), Ok(response))
    }

    pub fn then(script: Vec<Reply>, fallback: HttpResponse) -> Self {
        Self::new(script, Ok(fallback))
    }

    pub fn failing(message: &str) -> Self {
        Self::new(Vec::new(), Err(TransportError::new(message)))
    }

    fn new(script: Vec<Reply>, fallback: Reply) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, _request: &PollRequest) -> Reply {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

/// Records every notification as a short line.
#[derive(Default)]
pub struct RecordingObserver {
    pub lines: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    fn push(&self, line: String) {
        self.lines.lock().unwrap().push(line);
    }
}

impl PollObserver for RecordingObserver {
    fn attempt_started(&self, attempt: u32) {
        self.push(format!("start {attempt}"));
    }

    fn attempt_failed(&self, attempt: u32, failure: &AttemptFailure, retry_in: Duration) {
        self.push(format!("fail {attempt} {failure} retry {}", retry_in.as_secs()));
    }

    fn succeeded(&self, success: &PollSuccess) {
        self.push(format!("ok {}", success.attempts));
    }

    fn abandoned(&self, error: &PollError) {
        self.push(format!("abandon {error}"));
    }
}

pub fn status(code: u16) -> HttpResponse {
    HttpResponse::new(code, "")
}

pub fn json(code: u16, body: &str) -> HttpResponse {
    HttpResponse::new(code, body)
}

pub fn request(timeout: u64, interval: u64) -> httpwait_core::PollRequestBuilder {
    PollRequest::builder("http://localhost:8080/status")
        .timeout_secs(timeout)
        .interval_secs(interval)
}
