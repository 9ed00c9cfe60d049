use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::decode;
use crate::error::FetchError;
use crate::model::{ApiResponse, Difficulty, Question, RawQuestion};

pub const DEFAULT_API_URL: &str = "https://opentdb.com/api.php";

/// Anything that can hand back a batch of raw multiple-choice records.
pub trait QuestionSource: Send + Sync {
    fn fetch(&self, difficulty: Difficulty, amount: u32) -> Result<Vec<RawQuestion>, FetchError>;
}

pub struct OpenTdbSource {
    client: reqwest::blocking::Client,
    api_url: String,
}

impl OpenTdbSource {
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::network)?;
        Ok(Self {
            client,
            api_url: api_url.to_string(),
        })
    }
}

impl QuestionSource for OpenTdbSource {
    fn fetch(&self, difficulty: Difficulty, amount: u32) -> Result<Vec<RawQuestion>, FetchError> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("amount", amount.to_string()),
                ("difficulty", difficulty.as_str().to_string()),
                ("type", "multiple".to_string()),
            ])
            .send()
            .map_err(FetchError::network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::network(format!("HTTP {}", status)));
        }

        let body: ApiResponse = response.json().map_err(FetchError::network)?;
        debug!(
            "api answered code={} with {} records",
            body.response_code,
            body.results.len()
        );
        Ok(body.results)
    }
}

/// Fetches from `source` and normalizes the whole batch, or fails as a unit.
pub fn load_questions(
    source: &dyn QuestionSource,
    difficulty: Difficulty,
    amount: u32,
) -> Result<Vec<Question>, FetchError> {
    let raw = source.fetch(difficulty, amount)?;
    decode::normalize_all(&raw, &mut rand::thread_rng())
}

#[derive(Debug)]
pub struct FetchOutcome {
    pub generation: u64,
    pub result: Result<Vec<Question>, FetchError>,
}

/// Runs one request at a time on a worker thread.
///
/// Issuing a new request cancels the previous one; a cancelled request
/// never delivers its outcome.
pub struct Fetcher {
    source: Arc<dyn QuestionSource>,
    amount: u32,
    tx: mpsc::Sender<FetchOutcome>,
    rx: mpsc::Receiver<FetchOutcome>,
    pending: Option<(u64, Arc<AtomicBool>)>,
}

impl Fetcher {
    pub fn new(source: Arc<dyn QuestionSource>, amount: u32) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            source,
            amount,
            tx,
            rx,
            pending: None,
        }
    }

    pub fn request(&mut self, generation: u64, difficulty: Difficulty) {
        self.cancel();

        let cancelled = Arc::new(AtomicBool::new(false));
        self.pending = Some((generation, Arc::clone(&cancelled)));

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let amount = self.amount;

        info!("fetch #{}: {} {} questions", generation, amount, difficulty);
        thread::spawn(move || {
            let result = load_questions(source.as_ref(), difficulty, amount);
            if cancelled.load(Ordering::SeqCst) {
                debug!("fetch #{} finished after cancellation, dropped", generation);
                return;
            }
            if let Err(e) = &result {
                warn!("fetch #{} failed: {:?}", generation, e);
            }
            let _ = tx.send(FetchOutcome { generation, result });
        });
    }

    pub fn cancel(&mut self) {
        if let Some((_, flag)) = self.pending.take() {
            flag.store(true, Ordering::SeqCst);
        }
    }

    pub fn try_recv(&mut self) -> Option<FetchOutcome> {
        let outcome = self.rx.try_recv().ok()?;
        self.settle(outcome.generation);
        Some(outcome)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn settle(&mut self, generation: u64) {
        if matches!(self.pending, Some((g, _)) if g == generation) {
            self.pending = None;
        }
    }
}

impl Drop for Fetcher {
    fn drop(&mut self) {
        self.cancel();
    }
}
