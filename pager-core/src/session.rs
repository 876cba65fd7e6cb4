//! The reaction-listen, dispatch, re-render session loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::auth::{ActorId, AuthorizationFilter};
use crate::config::{RenderOptions, SessionOptions};
use crate::error::SessionError;
use crate::event::{EventSink, SessionEvent};
use crate::page::{NavDirection, PageState, parse_jump_reply};
use crate::port::{InputSource, InputSubscription, InputWait, RenderContext, RenderPort, TextWait};
use crate::registry::{
    ActionCallback, ActionContext, NavSelector, NavTrigger, Resolved, TriggerRegistry,
};

/// Start-page selection applied when the session begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartPage {
    /// An absolute page, clamped into the valid range.
    Number(usize),
    /// One wrapping step back from the first page.
    Back,
    /// One wrapping step forward from the first page.
    Forward,
}

/// How a session reached its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// An authorized actor pressed the terminate trigger.
    Finished { actor: ActorId },
    /// The deadline elapsed with no qualifying input.
    Expired,
}

enum Terminal {
    Expired,
    Finished(ActorId),
}

/// A single paginated message and its interaction loop.
///
/// Configure with the chained setters, then drive to completion with
/// [`PaginatedSession::run`]. Each session owns its page cursor, trigger
/// registry, and configuration outright; the presented message is a
/// shared platform resource that may disappear underneath it, which
/// surfaces as a fatal platform error.
pub struct PaginatedSession<T, R, S>
where
    R: RenderPort<T>,
    S: InputSource<R::Handle>,
{
    elements: Arc<Vec<T>>,
    registry: TriggerRegistry<T>,
    auth: AuthorizationFilter,
    options: SessionOptions,
    start_page: StartPage,
    renderer: R,
    input: S,
    events: EventSink,
}

impl<T, R, S> PaginatedSession<T, R, S>
where
    T: Send + Sync + 'static,
    R: RenderPort<T>,
    S: InputSource<R::Handle>,
{
    /// Create a session over the given platform ports.
    pub fn new(renderer: R, input: S) -> Self {
        Self {
            elements: Arc::new(Vec::new()),
            registry: TriggerRegistry::default(),
            auth: AuthorizationFilter::default(),
            options: SessionOptions::default(),
            start_page: StartPage::Number(1),
            renderer,
            input,
            events: EventSink::default(),
        }
    }

    /// Set the element collection to paginate.
    ///
    /// Re-assigning a previously set collection resets the start page to 1.
    pub fn elements(mut self, elements: Vec<T>) -> Self {
        if !self.elements.is_empty() {
            self.start_page = StartPage::Number(1);
        }
        self.elements = Arc::new(elements);
        self
    }

    /// Restrict interaction to the given actors. An empty set permits everyone.
    pub fn authorized_actors(mut self, actors: impl IntoIterator<Item = ActorId>) -> Self {
        self.auth = AuthorizationFilter::new(actors);
        self
    }

    /// Disable the named navigation triggers. See [`TriggerRegistry::set_disabled`].
    pub fn disabled_navigation(mut self, selectors: &[NavSelector]) -> Self {
        self.registry.set_disabled(selectors);
        self
    }

    /// Register an action callback under `key`.
    ///
    /// Fails when `key` collides with an enabled navigation key; the
    /// registry is left unchanged in that case.
    pub fn register_action(
        mut self,
        key: impl Into<String>,
        callback: ActionCallback<T>,
    ) -> Result<Self, SessionError> {
        self.registry.register_action(key, callback)?;
        Ok(self)
    }

    /// Rebind navigation triggers to custom keys.
    ///
    /// Applied in order; fails on the first key that collides with
    /// another enabled trigger.
    pub fn navigation_keys<K>(
        mut self,
        keys: impl IntoIterator<Item = (NavTrigger, K)>,
    ) -> Result<Self, SessionError>
    where
        K: Into<String>,
    {
        for (trigger, key) in keys {
            self.registry.rebind_navigation(trigger, key)?;
        }
        Ok(self)
    }

    /// Select the page shown first.
    pub fn start_page(mut self, start_page: StartPage) -> Self {
        self.start_page = start_page;
        self
    }

    /// Set how long the session waits for the next qualifying input.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    /// Toggle the `page x/y` indicator on rendered pages.
    pub fn show_page_indicator(mut self, show: bool) -> Self {
        self.options.show_page_indicator = show;
        self
    }

    /// Delete the presented message when the session expires.
    pub fn delete_on_timeout(mut self, delete: bool) -> Self {
        self.options.delete_on_timeout = delete;
        self
    }

    /// Set the placeholder content shown while the first page is prepared.
    pub fn prepare_text(mut self, text: impl Into<String>) -> Self {
        self.options.assets.prepare = text.into();
        self
    }

    /// Set the jump prompt template. `{user}` expands to the prompted actor.
    pub fn prompt_text(mut self, text: impl Into<String>) -> Self {
        self.options.assets.prompt = text.into();
        self
    }

    /// Subscribe to lifecycle notifications for this session.
    pub fn subscribe(mut self) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, rx) = EventSink::subscribed();
        self.events = events;
        (self, rx)
    }

    /// Run the session to its terminal state.
    ///
    /// Validates configuration, publishes the first page, attaches the
    /// enabled trigger keys, then loops waiting for input until the
    /// session finishes, expires, or hits a fatal platform error.
    /// Recovered errors are reported through the notification channel
    /// and leave the message on its last rendered page.
    pub async fn run(self) -> Result<SessionOutcome, SessionError> {
        let Self {
            elements,
            registry,
            auth,
            options,
            start_page,
            renderer,
            input,
            events,
        } = self;

        if elements.is_empty() {
            return Err(SessionError::Config(
                "element collection is empty".to_owned(),
            ));
        }
        if options.timeout.is_zero() {
            return Err(SessionError::Config("timeout must be positive".to_owned()));
        }

        let mut pages = match start_page {
            StartPage::Number(number) => {
                PageState::new(elements.len(), renderer.page_size(), number)?
            }
            StartPage::Back | StartPage::Forward => {
                let mut pages = PageState::new(elements.len(), renderer.page_size(), 1)?;
                pages.advance(match start_page {
                    StartPage::Back => NavDirection::Back,
                    _ => NavDirection::Forward,
                });
                pages
            }
        };

        let render_opts = RenderOptions::from_session(&options);
        let make_payload = |pages: &PageState| {
            renderer.render(
                RenderContext {
                    elements: elements.as_slice(),
                    current_page: pages.current_page(),
                    total_pages: pages.total_pages(),
                },
                &render_opts,
            )
        };

        let handle = match renderer.publish(make_payload(&pages)).await {
            Ok(handle) => handle,
            Err(err) => {
                events.emit(SessionEvent::Errored {
                    message: format!("{err:#}"),
                });
                return Err(SessionError::Platform(err));
            }
        };

        let keys = registry.attached_keys();
        let mut sub = match input.attach(&handle, &keys).await {
            Ok(sub) => sub,
            Err(err) => {
                events.emit(SessionEvent::Errored {
                    message: format!("{err:#}"),
                });
                return Err(SessionError::Platform(err));
            }
        };

        info!(
            total_pages = pages.total_pages(),
            start_page = pages.current_page(),
            "pagination session started"
        );
        events.emit(SessionEvent::Started);

        let mut deadline = Instant::now() + options.timeout;

        let terminal = loop {
            let received = match sub.wait_next(deadline).await {
                Ok(received) => received,
                Err(err) => return Err(platform_failure(&mut sub, &events, err).await),
            };

            let InputWait::Reaction { actor, key } = received else {
                break Terminal::Expired;
            };

            if !auth.is_authorized(actor) {
                debug!(actor, %key, "discarding unauthorized input");
                continue;
            }

            let Some(resolved) = registry.resolve(&key) else {
                debug!(actor, %key, "discarding unrecognized key");
                continue;
            };

            events.emit(SessionEvent::Reacted {
                actor,
                key: key.clone(),
            });

            match resolved {
                Resolved::Navigation(NavTrigger::Delete) => break Terminal::Finished(actor),

                Resolved::Navigation(trigger @ (NavTrigger::Back | NavTrigger::Forward)) => {
                    pages.advance(match trigger {
                        NavTrigger::Back => NavDirection::Back,
                        _ => NavDirection::Forward,
                    });
                    if let Err(err) = renderer.update(&handle, make_payload(&pages)).await {
                        return Err(platform_failure(&mut sub, &events, err).await);
                    }
                }

                Resolved::Navigation(NavTrigger::Jump) => {
                    let text = options.assets.prompt.replace("{user}", &renderer.mention(actor));
                    let prompt_handle = match renderer.prompt(&handle, text).await {
                        Ok(prompt_handle) => prompt_handle,
                        Err(err) => return Err(platform_failure(&mut sub, &events, err).await),
                    };

                    let reply = sub.wait_text(actor, deadline).await;

                    if let Err(err) = renderer.remove(&prompt_handle).await {
                        warn!(error = ?err, "failed to delete jump prompt");
                    }

                    match reply {
                        Err(err) => return Err(platform_failure(&mut sub, &events, err).await),
                        Ok(TextWait::TimedOut) => break Terminal::Expired,
                        Ok(TextWait::Text(body)) => match parse_jump_reply(&body) {
                            Some(target) => {
                                if pages.jump_to(target).is_ok() {
                                    if let Err(err) =
                                        renderer.update(&handle, make_payload(&pages)).await
                                    {
                                        return Err(
                                            platform_failure(&mut sub, &events, err).await
                                        );
                                    }
                                } else {
                                    debug!(
                                        actor,
                                        requested = target,
                                        total_pages = pages.total_pages(),
                                        "rejecting out-of-range jump"
                                    );
                                }
                            }
                            None => debug!(actor, "jump aborted"),
                        },
                    }
                }

                Resolved::Action(callback) => {
                    let ctx = ActionContext {
                        elements: Arc::clone(&elements),
                        current_page: pages.current_page(),
                        total_pages: pages.total_pages(),
                    };
                    if let Err(source) = callback(actor, ctx).await {
                        let err = anyhow::Error::from(SessionError::Dispatch {
                            key: key.clone(),
                            source,
                        });
                        events.emit(SessionEvent::Errored {
                            message: format!("{err:#}"),
                        });
                    }
                    if let Err(err) = renderer.update(&handle, make_payload(&pages)).await {
                        return Err(platform_failure(&mut sub, &events, err).await);
                    }
                }
            }

            deadline = Instant::now() + options.timeout;
        };

        // Terminal transitions detach input handling before anything else.
        if let Err(err) = sub.dispose().await {
            warn!(error = ?err, "failed to detach input triggers");
        }

        match terminal {
            Terminal::Expired => {
                if options.delete_on_timeout
                    && let Err(err) = renderer.remove(&handle).await
                {
                    warn!(error = ?err, "failed to delete expired message");
                }
                info!("pagination session expired");
                events.emit(SessionEvent::Expired);
                Ok(SessionOutcome::Expired)
            }
            Terminal::Finished(actor) => {
                info!(actor, "pagination session terminated");
                events.emit(SessionEvent::Finished { actor });
                Ok(SessionOutcome::Finished { actor })
            }
        }
    }
}

async fn platform_failure<S: InputSubscription>(
    sub: &mut S,
    events: &EventSink,
    err: anyhow::Error,
) -> SessionError {
    if let Err(dispose_err) = sub.dispose().await {
        warn!(error = ?dispose_err, "failed to detach input triggers");
    }
    events.emit(SessionEvent::Errored {
        message: format!("{err:#}"),
    });
    SessionError::Platform(err)
}
