//! Session loop behavior over scripted mock ports.
//!
//! Uses paused tokio time so deadline-driven cases are exact.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use pager_core::{
    ActorId, InputSource, InputSubscription, InputWait, NavSelector, PaginatedSession,
    RenderContext, RenderOptions, RenderPort, SessionError, SessionEvent, SessionOutcome,
    StartPage, TextWait, action,
};

const MAIN_HANDLE: u8 = 0;
const PROMPT_HANDLE: u8 = 1;

#[derive(Default)]
struct RenderLog {
    rendered_pages: Vec<usize>,
    last_indicator: Option<bool>,
    last_prepare: Option<String>,
    prompts: Vec<String>,
    removed_main: bool,
    removed_prompts: usize,
}

#[derive(Clone)]
struct MockRenderer {
    per_page: usize,
    fail_updates: bool,
    log: Arc<Mutex<RenderLog>>,
}

impl MockRenderer {
    fn new(per_page: usize) -> Self {
        Self {
            per_page,
            fail_updates: false,
            log: Arc::new(Mutex::new(RenderLog::default())),
        }
    }
}

#[async_trait]
impl RenderPort<String> for MockRenderer {
    type Payload = usize;
    type Handle = u8;

    fn page_size(&self) -> usize {
        self.per_page
    }

    fn render(&self, ctx: RenderContext<'_, String>, options: &RenderOptions) -> usize {
        let mut log = self.log.lock().unwrap();
        log.rendered_pages.push(ctx.current_page);
        log.last_indicator = Some(options.show_page_indicator);
        log.last_prepare = Some(options.prepare.clone());
        ctx.current_page
    }

    async fn publish(&self, _payload: usize) -> anyhow::Result<u8> {
        Ok(MAIN_HANDLE)
    }

    async fn update(&self, _handle: &u8, _payload: usize) -> anyhow::Result<()> {
        if self.fail_updates {
            anyhow::bail!("message vanished");
        }
        Ok(())
    }

    async fn remove(&self, handle: &u8) -> anyhow::Result<()> {
        let mut log = self.log.lock().unwrap();
        if *handle == MAIN_HANDLE {
            log.removed_main = true;
        } else {
            log.removed_prompts += 1;
        }
        Ok(())
    }

    async fn prompt(&self, _origin: &u8, text: String) -> anyhow::Result<u8> {
        self.log.lock().unwrap().prompts.push(text);
        Ok(PROMPT_HANDLE)
    }
}

#[derive(Clone, Copy)]
enum Script {
    React {
        after: Duration,
        actor: ActorId,
        key: &'static str,
    },
    Text {
        after: Duration,
        actor: ActorId,
        body: &'static str,
    },
}

fn react(actor: ActorId, key: &'static str) -> Script {
    Script::React {
        after: Duration::ZERO,
        actor,
        key,
    }
}

fn react_after(millis: u64, actor: ActorId, key: &'static str) -> Script {
    Script::React {
        after: Duration::from_millis(millis),
        actor,
        key,
    }
}

fn text(actor: ActorId, body: &'static str) -> Script {
    Script::Text {
        after: Duration::ZERO,
        actor,
        body,
    }
}

#[derive(Default)]
struct InputLog {
    attached_keys: Vec<String>,
    disposed: u32,
}

struct MockInput {
    script: Arc<Mutex<VecDeque<Script>>>,
    log: Arc<Mutex<InputLog>>,
    fail_attach: bool,
}

impl MockInput {
    fn new(script: impl IntoIterator<Item = Script>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into_iter().collect())),
            log: Arc::new(Mutex::new(InputLog::default())),
            fail_attach: false,
        }
    }
}

struct MockSubscription {
    script: Arc<Mutex<VecDeque<Script>>>,
    log: Arc<Mutex<InputLog>>,
}

#[async_trait]
impl InputSource<u8> for MockInput {
    type Subscription = MockSubscription;

    async fn attach(&self, _handle: &u8, keys: &[String]) -> anyhow::Result<MockSubscription> {
        if self.fail_attach {
            anyhow::bail!("missing reaction permission");
        }
        self.log.lock().unwrap().attached_keys = keys.to_vec();
        Ok(MockSubscription {
            script: Arc::clone(&self.script),
            log: Arc::clone(&self.log),
        })
    }
}

#[async_trait]
impl InputSubscription for MockSubscription {
    async fn wait_next(&mut self, deadline: Instant) -> anyhow::Result<InputWait> {
        loop {
            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(Script::React { after, actor, key }) => {
                    if Instant::now() + after > deadline {
                        self.script
                            .lock()
                            .unwrap()
                            .push_front(Script::React { after, actor, key });
                        tokio::time::sleep_until(deadline).await;
                        return Ok(InputWait::TimedOut);
                    }
                    tokio::time::sleep(after).await;
                    return Ok(InputWait::Reaction {
                        actor,
                        key: key.to_owned(),
                    });
                }
                // A channel message while nothing awaits text input.
                Some(Script::Text { .. }) => continue,
                None => {
                    tokio::time::sleep_until(deadline).await;
                    return Ok(InputWait::TimedOut);
                }
            }
        }
    }

    async fn wait_text(&mut self, actor: ActorId, deadline: Instant) -> anyhow::Result<TextWait> {
        loop {
            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(Script::Text {
                    after,
                    actor: author,
                    body,
                }) => {
                    if author != actor {
                        continue;
                    }
                    if Instant::now() + after > deadline {
                        tokio::time::sleep_until(deadline).await;
                        return Ok(TextWait::TimedOut);
                    }
                    tokio::time::sleep(after).await;
                    return Ok(TextWait::Text(body.to_owned()));
                }
                Some(other @ Script::React { .. }) => {
                    // Reactions stay queued for after the sub-wait.
                    self.script.lock().unwrap().push_front(other);
                    tokio::time::sleep_until(deadline).await;
                    return Ok(TextWait::TimedOut);
                }
                None => {
                    tokio::time::sleep_until(deadline).await;
                    return Ok(TextWait::TimedOut);
                }
            }
        }
    }

    async fn dispose(&mut self) -> anyhow::Result<()> {
        self.log.lock().unwrap().disposed += 1;
        Ok(())
    }
}

fn items(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("item {i}")).collect()
}

fn session(
    renderer: MockRenderer,
    input: MockInput,
) -> PaginatedSession<String, MockRenderer, MockInput> {
    PaginatedSession::new(renderer, input).elements(items(25))
}

fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test(start_paused = true)]
async fn forward_wraps_through_pages_and_delete_finishes() {
    let renderer = MockRenderer::new(10);
    let input = MockInput::new([
        react(1, "▶"),
        react(1, "▶"),
        react(1, "▶"),
        react(1, "🗑"),
    ]);
    let render_log = Arc::clone(&renderer.log);
    let input_log = Arc::clone(&input.log);

    let (session, mut rx) = session(renderer, input).subscribe();
    let outcome = session.run().await.unwrap();

    assert_eq!(outcome, SessionOutcome::Finished { actor: 1 });
    assert_eq!(render_log.lock().unwrap().rendered_pages, vec![1, 2, 3, 1]);
    assert_eq!(input_log.lock().unwrap().disposed, 1);

    let events = drain(&mut rx);
    assert_eq!(events.first(), Some(&SessionEvent::Started));
    assert_eq!(events.last(), Some(&SessionEvent::Finished { actor: 1 }));
    let reacts = events
        .iter()
        .filter(|event| matches!(event, SessionEvent::Reacted { .. }))
        .count();
    assert_eq!(reacts, 4);
}

#[tokio::test(start_paused = true)]
async fn expires_after_timeout_with_single_expire_event() {
    let renderer = MockRenderer::new(10);
    let input = MockInput::new([]);
    let render_log = Arc::clone(&renderer.log);
    let input_log = Arc::clone(&input.log);

    let (session, mut rx) = session(renderer, input)
        .timeout(Duration::from_millis(50))
        .subscribe();

    let started = Instant::now();
    let outcome = session.run().await.unwrap();

    assert_eq!(outcome, SessionOutcome::Expired);
    assert_eq!(started.elapsed(), Duration::from_millis(50));
    assert_eq!(input_log.lock().unwrap().disposed, 1);
    assert!(!render_log.lock().unwrap().removed_main);

    let events = drain(&mut rx);
    let expires = events
        .iter()
        .filter(|event| matches!(event, SessionEvent::Expired))
        .count();
    let finishes = events
        .iter()
        .filter(|event| matches!(event, SessionEvent::Finished { .. }))
        .count();
    assert_eq!(expires, 1);
    assert_eq!(finishes, 0);
}

#[tokio::test(start_paused = true)]
async fn delete_on_timeout_removes_presented_message() {
    let renderer = MockRenderer::new(10);
    let input = MockInput::new([]);
    let render_log = Arc::clone(&renderer.log);

    let outcome = session(renderer, input)
        .timeout(Duration::from_millis(50))
        .delete_on_timeout(true)
        .run()
        .await
        .unwrap();

    assert_eq!(outcome, SessionOutcome::Expired);
    assert!(render_log.lock().unwrap().removed_main);
}

#[tokio::test(start_paused = true)]
async fn unauthorized_actor_never_dispatches_or_resets_deadline() {
    let renderer = MockRenderer::new(10);
    let input = MockInput::new([react_after(30, 2, "▶")]);
    let render_log = Arc::clone(&renderer.log);

    let (session, mut rx) = session(renderer, input)
        .authorized_actors([1])
        .timeout(Duration::from_millis(50))
        .subscribe();

    let started = Instant::now();
    let outcome = session.run().await.unwrap();

    assert_eq!(outcome, SessionOutcome::Expired);
    // Discarded input must not rearm the deadline.
    assert_eq!(started.elapsed(), Duration::from_millis(50));
    assert_eq!(render_log.lock().unwrap().rendered_pages, vec![1]);

    let events = drain(&mut rx);
    assert!(
        events
            .iter()
            .all(|event| !matches!(event, SessionEvent::Reacted { .. }))
    );
}

#[tokio::test(start_paused = true)]
async fn unrecognized_key_is_discarded() {
    let renderer = MockRenderer::new(10);
    let input = MockInput::new([react_after(10, 1, "❓")]);
    let render_log = Arc::clone(&renderer.log);

    let started = Instant::now();
    let outcome = session(renderer, input)
        .timeout(Duration::from_millis(50))
        .run()
        .await
        .unwrap();

    assert_eq!(outcome, SessionOutcome::Expired);
    assert_eq!(started.elapsed(), Duration::from_millis(50));
    assert_eq!(render_log.lock().unwrap().rendered_pages, vec![1]);
}

#[tokio::test(start_paused = true)]
async fn queued_input_after_termination_is_never_dispatched() {
    let renderer = MockRenderer::new(10);
    let input = MockInput::new([react(1, "🗑"), react(1, "▶"), react(1, "▶")]);
    let render_log = Arc::clone(&renderer.log);
    let script = Arc::clone(&input.script);

    let outcome = session(renderer, input).run().await.unwrap();

    assert_eq!(outcome, SessionOutcome::Finished { actor: 1 });
    assert_eq!(render_log.lock().unwrap().rendered_pages, vec![1]);
    assert_eq!(script.lock().unwrap().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn disabling_all_navigation_frees_keys_for_actions() {
    let renderer = MockRenderer::new(10);
    let input = MockInput::new([react(1, "◀")]);
    let render_log = Arc::clone(&renderer.log);
    let input_log = Arc::clone(&input.log);

    let fired = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&fired);

    let outcome = session(renderer, input)
        .disabled_navigation(&[NavSelector::All])
        .register_action(
            "◀",
            action(move |_, _| {
                let flag = Arc::clone(&flag);
                async move {
                    flag.store(true, Ordering::SeqCst);
                    Ok(())
                }
            }),
        )
        .unwrap()
        .timeout(Duration::from_millis(50))
        .run()
        .await
        .unwrap();

    // Only the custom action can fire; the session ends by timeout.
    assert_eq!(outcome, SessionOutcome::Expired);
    assert!(fired.load(Ordering::SeqCst));
    assert_eq!(input_log.lock().unwrap().attached_keys, vec!["◀"]);
    // The page never moved: the action re-render shows page 1 again.
    assert_eq!(render_log.lock().unwrap().rendered_pages, vec![1, 1]);
}

#[tokio::test(start_paused = true)]
async fn jump_prompt_moves_to_requested_page() {
    let renderer = MockRenderer::new(10);
    let input = MockInput::new([react(1, "↗"), text(1, "3"), react(1, "🗑")]);
    let render_log = Arc::clone(&renderer.log);

    let outcome = session(renderer, input).run().await.unwrap();

    assert_eq!(outcome, SessionOutcome::Finished { actor: 1 });

    let log = render_log.lock().unwrap();
    assert_eq!(log.rendered_pages, vec![1, 3]);
    assert_eq!(log.prompts.len(), 1);
    assert!(log.prompts[0].starts_with("1,"), "mention expanded: {:?}", log.prompts[0]);
    assert_eq!(log.removed_prompts, 1);
}

#[tokio::test(start_paused = true)]
async fn jump_cancel_and_out_of_range_keep_current_page() {
    let renderer = MockRenderer::new(10);
    let input = MockInput::new([
        react(1, "↗"),
        text(1, "cancel"),
        react(1, "↗"),
        text(1, "99"),
        react(1, "🗑"),
    ]);
    let render_log = Arc::clone(&renderer.log);

    let outcome = session(renderer, input).run().await.unwrap();

    assert_eq!(outcome, SessionOutcome::Finished { actor: 1 });
    assert_eq!(render_log.lock().unwrap().rendered_pages, vec![1]);
    assert_eq!(render_log.lock().unwrap().removed_prompts, 2);
}

#[tokio::test(start_paused = true)]
async fn unanswered_jump_prompt_expires_the_session() {
    let renderer = MockRenderer::new(10);
    let input = MockInput::new([react_after(10, 1, "↗")]);
    let render_log = Arc::clone(&renderer.log);

    let started = Instant::now();
    let outcome = session(renderer, input)
        .timeout(Duration::from_millis(50))
        .run()
        .await
        .unwrap();

    assert_eq!(outcome, SessionOutcome::Expired);
    assert_eq!(started.elapsed(), Duration::from_millis(50));
    assert_eq!(render_log.lock().unwrap().removed_prompts, 1);
}

#[tokio::test(start_paused = true)]
async fn failing_action_callback_is_recovered() {
    let renderer = MockRenderer::new(10);
    let input = MockInput::new([react(1, "💥"), react(1, "▶"), react(1, "🗑")]);
    let render_log = Arc::clone(&renderer.log);

    let (session, mut rx) = session(renderer, input)
        .register_action("💥", action(|_, _| async { anyhow::bail!("boom") }))
        .unwrap()
        .subscribe();

    let outcome = session.run().await.unwrap();

    // The failure is surfaced, then the loop keeps dispatching.
    assert_eq!(outcome, SessionOutcome::Finished { actor: 1 });
    assert_eq!(render_log.lock().unwrap().rendered_pages, vec![1, 1, 2]);

    let events = drain(&mut rx);
    assert!(events.iter().any(
        |event| matches!(event, SessionEvent::Errored { message } if message.contains("boom"))
    ));
}

#[tokio::test(start_paused = true)]
async fn start_page_back_selects_last_page() {
    let renderer = MockRenderer::new(10);
    let input = MockInput::new([react(1, "🗑")]);
    let render_log = Arc::clone(&renderer.log);

    let outcome = session(renderer, input)
        .start_page(StartPage::Back)
        .run()
        .await
        .unwrap();

    assert_eq!(outcome, SessionOutcome::Finished { actor: 1 });
    assert_eq!(render_log.lock().unwrap().rendered_pages, vec![3]);
}

#[tokio::test(start_paused = true)]
async fn render_options_carry_session_configuration() {
    let renderer = MockRenderer::new(10);
    let input = MockInput::new([react(1, "🗑")]);
    let render_log = Arc::clone(&renderer.log);

    session(renderer, input)
        .show_page_indicator(false)
        .prepare_text("Loading the list...")
        .run()
        .await
        .unwrap();

    let log = render_log.lock().unwrap();
    assert_eq!(log.last_indicator, Some(false));
    assert_eq!(log.last_prepare.as_deref(), Some("Loading the list..."));
}

#[tokio::test(start_paused = true)]
async fn empty_elements_reject_startup() {
    let renderer = MockRenderer::new(10);
    let input = MockInput::new([]);

    let result = PaginatedSession::new(renderer, input)
        .elements(Vec::<String>::new())
        .run()
        .await;

    assert!(matches!(result, Err(SessionError::Config(_))));
}

#[tokio::test(start_paused = true)]
async fn zero_timeout_rejects_startup() {
    let renderer = MockRenderer::new(10);
    let input = MockInput::new([]);

    let result = session(renderer, input)
        .timeout(Duration::ZERO)
        .run()
        .await;

    assert!(matches!(result, Err(SessionError::Config(_))));
}

#[tokio::test(start_paused = true)]
async fn platform_failure_during_update_is_fatal() {
    let mut renderer = MockRenderer::new(10);
    renderer.fail_updates = true;
    let input = MockInput::new([react(1, "▶"), react(1, "▶")]);
    let input_log = Arc::clone(&input.log);

    let (session, mut rx) = session(renderer, input).subscribe();
    let result = session.run().await;

    assert!(matches!(result, Err(SessionError::Platform(_))));
    assert_eq!(input_log.lock().unwrap().disposed, 1);

    let events = drain(&mut rx);
    assert!(matches!(events.last(), Some(SessionEvent::Errored { .. })));
}

#[tokio::test(start_paused = true)]
async fn attach_failure_is_fatal_before_start() {
    let renderer = MockRenderer::new(10);
    let mut input = MockInput::new([]);
    input.fail_attach = true;

    let (session, mut rx) = session(renderer, input).subscribe();
    let result = session.run().await;

    assert!(matches!(result, Err(SessionError::Platform(_))));
    let events = drain(&mut rx);
    assert!(
        events
            .iter()
            .all(|event| !matches!(event, SessionEvent::Started))
    );
}
