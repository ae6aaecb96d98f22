// src/checker/validate.rs
// =============================================================================
// Validates every bookmark URL under a set of roots.
//
// Shape of a run:
//
//   roots ──> TaskQueue (max_requests at once)
//               │ one task per root: walk the subtree, probe each leaf in
//               │ order, send a ProbeReport per leaf
//               v
//             aggregator task (sole owner of the InvalidGroup and counter)
//               │ after every report: Partial(snapshot), Progress
//               v
//             ValidationRun::next_event()  ──>  caller
//
// Workers never touch the result map: they only send reports, so the bucket
// insert, counter increment and event emission happen in one place, one
// report at a time, on any runtime flavour.
//
// The event sequence ends (next_event returns None) once the queue has
// drained and the last report has been aggregated.
// =============================================================================

use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::groups::InvalidGroup;
use super::probe::{ProbeOutcome, Prober, ReqwestProber};
use super::queue::TaskQueue;
use crate::bookmark::{count_leaves, walk_async, BookmarkNode, Leaf};
use crate::config::Settings;
use crate::error::Result;

/// How far a run has got: leaves probed out of leaves selected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub processed: usize,
    pub total: usize,
}

impl Progress {
    /// Percentage in [0, 100]
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.processed as f64 / self.total as f64 * 100.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationEvent {
    /// Snapshot of the invalid links found so far
    Partial(InvalidGroup),
    Progress(Progress),
}

// What a worker tells the aggregator about one leaf
struct ProbeReport {
    leaf: Leaf,
    outcome: ProbeOutcome,
}

/// Handle on one validation run
pub struct ValidationRun {
    events: mpsc::UnboundedReceiver<ValidationEvent>,
    running: Arc<AtomicBool>,
    aggregator: Option<JoinHandle<InvalidGroup>>,
    total: usize,
}

impl ValidationRun {
    fn finished() -> Self {
        let (_, events) = mpsc::unbounded_channel();
        Self {
            events,
            running: Arc::new(AtomicBool::new(false)),
            aggregator: None,
            total: 0,
        }
    }

    /// True from the start of the run until the queue has drained
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Leaves this run will probe
    pub fn total(&self) -> usize {
        self.total
    }

    /// Next event, or None once the run has drained
    pub async fn next_event(&mut self) -> Option<ValidationEvent> {
        self.events.recv().await
    }

    /// Skips any unread events and returns the final invalid-link map
    pub async fn finish(mut self) -> InvalidGroup {
        while self.events.recv().await.is_some() {}

        match self.aggregator.take() {
            None => InvalidGroup::new(),
            Some(handle) => match handle.await {
                Ok(groups) => groups,
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(_) => InvalidGroup::new(),
            },
        }
    }
}

// Lets callers consume a run with StreamExt (next, for_each, collect, ...)
impl Stream for ValidationRun {
    type Item = ValidationEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.events.poll_recv(cx)
    }
}

/// Starts validating `roots` with an HTTP prober built from `settings`.
///
/// Fails only if the settings are out of range or the HTTP client cannot be
/// built; individual links never fail the run.
pub fn validate_links(roots: Vec<BookmarkNode>, settings: &Settings) -> Result<ValidationRun> {
    settings.validate()?;
    let prober = ReqwestProber::new(settings.request_timeout())?;
    Ok(validate_links_with(roots, settings.max_requests, Arc::new(prober)))
}

/// Starts validating `roots`, probing with `prober`, with at most
/// `max_concurrency` root subtrees in flight. Must be called from within a
/// tokio runtime.
pub fn validate_links_with(roots: Vec<BookmarkNode>, max_concurrency: usize, prober: Arc<dyn Prober>) -> ValidationRun {
    if roots.is_empty() {
        return ValidationRun::finished();
    }

    let total = count_leaves(&roots);
    info!(roots = roots.len(), total, max_concurrency, "Starting link validation");

    let running = Arc::new(AtomicBool::new(true));
    let (report_tx, report_rx) = mpsc::unbounded_channel();
    let (event_tx, events) = mpsc::unbounded_channel();

    let mut queue = TaskQueue::new(max_concurrency);
    for root in roots {
        let prober = Arc::clone(&prober);
        let report_tx = report_tx.clone();
        queue.push(async move {
            walk_async(&root, |leaf| {
                let leaf = leaf.clone();
                let prober = Arc::clone(&prober);
                let report_tx = report_tx.clone();
                async move {
                    let outcome = prober.probe(&leaf.url).await;
                    debug!(id = %leaf.id, url = %leaf.url, ?outcome, "Probed bookmark");
                    // The aggregator outlives every worker
                    let _ = report_tx.send(ProbeReport { leaf, outcome });
                }
            })
            .await;
        });
    }
    // Only the workers hold senders now, so the report channel closes when
    // the last one finishes
    drop(report_tx);

    tokio::spawn(async move {
        queue.drain().await;
    });

    let aggregator = tokio::spawn(aggregate(report_rx, event_tx, Arc::clone(&running), total));

    ValidationRun {
        events,
        running,
        aggregator: Some(aggregator),
        total,
    }
}

async fn aggregate(
    mut reports: mpsc::UnboundedReceiver<ProbeReport>,
    events: mpsc::UnboundedSender<ValidationEvent>,
    running: Arc<AtomicBool>,
    total: usize,
) -> InvalidGroup {
    let mut invalid = InvalidGroup::new();
    let mut progress = Progress { processed: 0, total };

    while let Some(ProbeReport { leaf, outcome }) = reports.recv().await {
        if let Some(key) = outcome.bucket_key() {
            invalid.push(key, leaf);
        }
        progress.processed += 1;

        // A caller that dropped its run just stops listening
        let _ = events.send(ValidationEvent::Partial(invalid.clone()));
        let _ = events.send(ValidationEvent::Progress(progress));
    }

    running.store(false, Ordering::SeqCst);
    info!(
        processed = progress.processed,
        invalid = invalid.leaf_count(),
        "Link validation finished"
    );
    invalid
}

/// Runs a validation to completion, reporting through callbacks after every
/// leaf, and returns the final invalid-link map
pub async fn validate_links_with_callbacks<P, R>(mut run: ValidationRun, mut on_progress: P, mut on_partial: R) -> InvalidGroup
where
    P: FnMut(Progress),
    R: FnMut(&InvalidGroup),
{
    while let Some(event) = run.next_event().await {
        match event {
            ValidationEvent::Partial(groups) => on_partial(&groups),
            ValidationEvent::Progress(progress) => on_progress(progress),
        }
    }
    run.finish().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // Answers from a fixed table after a fixed delay, tracking how many
    // probes are outstanding at once and in which order URLs were probed
    struct ScriptedProber {
        outcomes: HashMap<String, ProbeOutcome>,
        delay: Duration,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        order: Mutex<Vec<String>>,
    }

    impl ScriptedProber {
        fn new(outcomes: &[(&str, ProbeOutcome)], delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                outcomes: outcomes
                    .iter()
                    .map(|(url, outcome)| (url.to_string(), outcome.clone()))
                    .collect(),
                delay,
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                order: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Prober for ScriptedProber {
        async fn probe(&self, url: &str) -> ProbeOutcome {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.order.lock().unwrap().push(url.to_string());

            tokio::time::sleep(self.delay).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.outcomes.get(url).cloned().unwrap_or(ProbeOutcome::Success(200))
        }
    }

    async fn collect_events(mut run: ValidationRun) -> (Vec<ValidationEvent>, InvalidGroup) {
        let mut events = Vec::new();
        while let Some(event) = run.next_event().await {
            events.push(event);
        }
        assert!(!run.is_running());
        (events, run.finish().await)
    }

    fn progress_of(events: &[ValidationEvent]) -> Vec<Progress> {
        events
            .iter()
            .filter_map(|event| match event {
                ValidationEvent::Progress(progress) => Some(*progress),
                ValidationEvent::Partial(_) => None,
            })
            .collect()
    }

    fn one_leaf_folders(count: usize) -> Vec<BookmarkNode> {
        (0..count)
            .map(|i| {
                BookmarkNode::folder(
                    format!("f{}", i),
                    format!("Folder {}", i),
                    vec![BookmarkNode::leaf(format!("l{}", i), "leaf", format!("https://site{}.test/", i))],
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_peak_in_flight_matches_max_requests() {
        let prober = ScriptedProber::new(&[], Duration::from_millis(30));
        let run = validate_links_with(one_leaf_folders(5), 2, prober.clone());
        assert!(run.is_running());
        assert_eq!(run.total(), 5);

        let (events, invalid) = collect_events(run).await;

        assert_eq!(prober.peak.load(Ordering::SeqCst), 2);
        let last = *progress_of(&events).last().unwrap();
        assert_eq!(last, Progress { processed: 5, total: 5 });
        assert!(invalid.is_empty());
    }

    #[tokio::test]
    async fn test_leaves_inside_one_root_are_probed_in_order() {
        let root = BookmarkNode::folder(
            "r",
            "Root",
            vec![
                BookmarkNode::leaf("1", "a", "https://a.test/"),
                BookmarkNode::folder("sub", "Sub", vec![BookmarkNode::leaf("2", "b", "https://b.test/")]),
                BookmarkNode::leaf("3", "c", "https://c.test/"),
            ],
        );
        let prober = ScriptedProber::new(&[], Duration::from_millis(5));

        collect_events(validate_links_with(vec![root], 10, prober.clone())).await;

        assert_eq!(prober.peak.load(Ordering::SeqCst), 1);
        assert_eq!(
            *prober.order.lock().unwrap(),
            vec!["https://a.test/", "https://b.test/", "https://c.test/"]
        );
    }

    #[tokio::test]
    async fn test_outcomes_are_bucketed_by_key() {
        let roots = vec![
            BookmarkNode::leaf("1", "ok", "https://ok.test/"),
            BookmarkNode::leaf("2", "gone", "https://gone.test/"),
            BookmarkNode::leaf("3", "slow", "https://slow.test/"),
            BookmarkNode::leaf("4", "also gone", "https://gone2.test/"),
            BookmarkNode::leaf("5", "weird", "weird://x"),
        ];
        let prober = ScriptedProber::new(
            &[
                ("https://gone.test/", ProbeOutcome::HttpStatus(404)),
                ("https://slow.test/", ProbeOutcome::Timeout),
                ("https://gone2.test/", ProbeOutcome::HttpStatus(404)),
                ("weird://x", ProbeOutcome::Transport("URL scheme is not allowed".to_string())),
            ],
            Duration::from_millis(1),
        );

        let (_, invalid) = collect_events(validate_links_with(roots, 1, prober)).await;

        let ids = |key: &str| -> Vec<String> { invalid.get(key).unwrap().iter().map(|l| l.id.clone()).collect() };
        assert_eq!(invalid.len(), 3);
        assert_eq!(ids("404"), vec!["2", "4"]);
        assert_eq!(ids("Request Timeout"), vec!["3"]);
        assert_eq!(ids("URL scheme is not allowed"), vec!["5"]);
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_and_ends_at_100_once() {
        let prober = ScriptedProber::new(&[], Duration::from_millis(3));
        let mut roots = one_leaf_folders(3);
        roots.push(BookmarkNode::folder(
            "big",
            "Big",
            vec![
                BookmarkNode::leaf("b1", "1", "https://b1.test/"),
                BookmarkNode::leaf("b2", "2", "https://b2.test/"),
            ],
        ));

        let (events, _) = collect_events(validate_links_with(roots, 3, prober)).await;
        let percents: Vec<f64> = progress_of(&events).iter().map(Progress::percent).collect();

        assert_eq!(percents.len(), 5);
        assert!(percents.windows(2).all(|w| w[0] <= w[1]));
        assert!(percents.iter().all(|p| (0.0..=100.0).contains(p)));
        assert_eq!(percents.iter().filter(|p| **p == 100.0).count(), 1);
        assert_eq!(*percents.last().unwrap(), 100.0);
    }

    #[tokio::test]
    async fn test_partial_result_follows_every_leaf() {
        let roots = vec![
            BookmarkNode::leaf("1", "ok", "https://ok.test/"),
            BookmarkNode::leaf("2", "bad", "https://bad.test/"),
        ];
        let prober = ScriptedProber::new(&[("https://bad.test/", ProbeOutcome::HttpStatus(500))], Duration::ZERO);

        let mut partials = Vec::new();
        let mut progress = Vec::new();
        let run = validate_links_with(roots, 1, prober);
        let invalid = validate_links_with_callbacks(
            run,
            |p| progress.push(p.processed),
            |groups| partials.push(groups.leaf_count()),
        )
        .await;

        assert_eq!(progress, vec![1, 2]);
        assert_eq!(partials, vec![0, 1]);
        assert_eq!(invalid.keys().collect::<Vec<_>>(), vec!["500"]);
    }

    #[tokio::test]
    async fn test_run_is_a_stream() {
        use futures::StreamExt;

        let prober = ScriptedProber::new(&[], Duration::ZERO);
        let run = validate_links_with(one_leaf_folders(2), 2, prober);
        let events: Vec<ValidationEvent> = run.collect().await;
        assert_eq!(events.len(), 4);
    }

    #[tokio::test]
    async fn test_empty_roots_is_a_no_op() {
        let prober = ScriptedProber::new(&[], Duration::ZERO);
        let run = validate_links_with(Vec::new(), 3, prober.clone());
        assert!(!run.is_running());

        let mut progress_calls = 0;
        let mut partial_calls = 0;
        let invalid = validate_links_with_callbacks(run, |_| progress_calls += 1, |_| partial_calls += 1).await;

        assert_eq!(progress_calls + partial_calls, 0);
        assert!(invalid.is_empty());
        assert!(prober.order.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tree_without_leaves_reports_nothing() {
        let prober = ScriptedProber::new(&[], Duration::ZERO);
        let run = validate_links_with(vec![BookmarkNode::folder("f", "F", vec![])], 3, prober);
        let (events, invalid) = collect_events(run).await;
        assert!(events.is_empty());
        assert!(invalid.is_empty());
    }

    #[tokio::test]
    async fn test_unresponsive_server_lands_in_timeout_bucket() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hang"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/fine"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let roots = vec![BookmarkNode::folder(
            "f",
            "F",
            vec![
                BookmarkNode::leaf("1", "hang", format!("{}/hang", server.uri())),
                BookmarkNode::leaf("2", "fine", format!("{}/fine", server.uri())),
            ],
        )];
        let settings = Settings {
            max_requests: 2,
            request_timeout_secs: 1,
            use_domain_for_duplication_check: false,
        };

        let (_, invalid) = collect_events(validate_links(roots, &settings).unwrap()).await;

        assert_eq!(invalid.keys().collect::<Vec<_>>(), vec!["Request Timeout"]);
        assert_eq!(invalid.get("Request Timeout").unwrap()[0].id, "1");
    }

    #[tokio::test]
    async fn test_invalid_settings_are_rejected_before_running() {
        let settings = Settings {
            max_requests: 0,
            ..Settings::default()
        };
        assert!(validate_links(one_leaf_folders(1), &settings).is_err());
    }
}
