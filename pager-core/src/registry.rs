//! Trigger registry: navigation keys and user-registered action callbacks.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::auth::ActorId;
use crate::error::SessionError;

/// Built-in navigation triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavTrigger {
    Back,
    Jump,
    Forward,
    Delete,
}

impl NavTrigger {
    /// All navigation triggers in canonical presentation order.
    pub const ALL: [NavTrigger; 4] = [Self::Back, Self::Jump, Self::Forward, Self::Delete];

    /// Default reaction key for this trigger.
    pub fn default_key(self) -> &'static str {
        match self {
            Self::Back => "◀",
            Self::Jump => "↗",
            Self::Forward => "▶",
            Self::Delete => "🗑",
        }
    }
}

/// Selector naming navigation triggers to disable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavSelector {
    Back,
    Jump,
    Forward,
    Delete,
    /// The complete navigation set.
    All,
}

/// Owned snapshot of render state handed to action callbacks.
#[derive(Debug, Clone)]
pub struct ActionContext<T> {
    /// The element collection backing the session.
    pub elements: Arc<Vec<T>>,
    /// Current page, 1-based.
    pub current_page: usize,
    /// Total page count.
    pub total_pages: usize,
}

/// Callback bound to a user-registered action key.
///
/// Invoked with the triggering actor and a snapshot of the render state;
/// the session re-renders after the callback resolves and treats a
/// failure as a recovered dispatch error.
pub type ActionCallback<T> =
    Box<dyn Fn(ActorId, ActionContext<T>) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Wrap an async closure as an [`ActionCallback`].
pub fn action<T, F, Fut>(callback: F) -> ActionCallback<T>
where
    F: Fn(ActorId, ActionContext<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Box::new(move |actor, ctx| Box::pin(callback(actor, ctx)))
}

struct NavBinding {
    trigger: NavTrigger,
    key: String,
    enabled: bool,
}

impl NavBinding {
    fn default_for(trigger: NavTrigger) -> Self {
        Self {
            trigger,
            key: trigger.default_key().to_owned(),
            enabled: true,
        }
    }
}

/// A key resolved against the currently enabled triggers.
pub enum Resolved<'a, T> {
    /// The key belongs to an enabled navigation trigger.
    Navigation(NavTrigger),
    /// The key belongs to a registered action.
    Action(&'a ActionCallback<T>),
}

/// Owns the recognized trigger keys for one session.
///
/// Navigation triggers carry a rebindable key and an enabled flag;
/// action triggers are registered in order and keep that order when
/// keys are attached to the presented message.
pub struct TriggerRegistry<T> {
    nav: Vec<NavBinding>,
    actions: Vec<(String, ActionCallback<T>)>,
}

impl<T> Default for TriggerRegistry<T> {
    fn default() -> Self {
        Self {
            nav: NavTrigger::ALL.map(NavBinding::default_for).into(),
            actions: Vec::new(),
        }
    }
}

impl<T> TriggerRegistry<T> {
    /// Register an action callback under `key`, replacing any action
    /// previously registered under the same key.
    ///
    /// Fails with `ReservedKey` when `key` belongs to an *enabled*
    /// navigation trigger; a disabled navigation key is free to take.
    pub fn register_action(
        &mut self,
        key: impl Into<String>,
        callback: ActionCallback<T>,
    ) -> Result<(), SessionError> {
        let key = key.into();

        if self
            .nav
            .iter()
            .any(|binding| binding.enabled && binding.key == key)
        {
            return Err(SessionError::ReservedKey { key });
        }

        if let Some(slot) = self
            .actions
            .iter_mut()
            .find(|(existing, _)| *existing == key)
        {
            slot.1 = callback;
        } else {
            self.actions.push((key, callback));
        }

        Ok(())
    }

    /// Remove the action registered under `key`, if any.
    pub fn deregister_action(&mut self, key: &str) {
        self.actions.retain(|(existing, _)| existing != key);
    }

    /// Clear all action triggers and restore every navigation trigger
    /// to its default key and enabled state.
    pub fn reset_all(&mut self) {
        self.nav = NavTrigger::ALL.map(NavBinding::default_for).into();
        self.actions.clear();
    }

    /// Disable the named navigation triggers.
    ///
    /// `All` disables the complete set. Disabling is sticky: a later,
    /// narrower call leaves previously disabled triggers disabled; only
    /// [`TriggerRegistry::reset_all`] or an explicit rebind re-enables.
    pub fn set_disabled(&mut self, selectors: &[NavSelector]) {
        let disable_all = selectors.contains(&NavSelector::All);

        for binding in &mut self.nav {
            let named = match binding.trigger {
                NavTrigger::Back => selectors.contains(&NavSelector::Back),
                NavTrigger::Jump => selectors.contains(&NavSelector::Jump),
                NavTrigger::Forward => selectors.contains(&NavSelector::Forward),
                NavTrigger::Delete => selectors.contains(&NavSelector::Delete),
            };

            if disable_all || named {
                binding.enabled = false;
            }
        }
    }

    /// Bind `trigger` to a new key, re-enabling it if it was disabled.
    ///
    /// Fails with `DuplicateKey` when the key belongs to another enabled
    /// trigger, navigation or action.
    pub fn rebind_navigation(
        &mut self,
        trigger: NavTrigger,
        key: impl Into<String>,
    ) -> Result<(), SessionError> {
        let key = key.into();

        let nav_collision = self
            .nav
            .iter()
            .any(|binding| binding.trigger != trigger && binding.enabled && binding.key == key);
        let action_collision = self.actions.iter().any(|(existing, _)| *existing == key);

        if nav_collision || action_collision {
            return Err(SessionError::DuplicateKey { key });
        }

        if let Some(binding) = self
            .nav
            .iter_mut()
            .find(|binding| binding.trigger == trigger)
        {
            binding.key = key;
            binding.enabled = true;
        }

        Ok(())
    }

    /// Whether `trigger` is currently enabled.
    pub fn is_enabled(&self, trigger: NavTrigger) -> bool {
        self.nav
            .iter()
            .any(|binding| binding.trigger == trigger && binding.enabled)
    }

    /// Resolve an input key among currently enabled triggers only.
    pub fn resolve(&self, key: &str) -> Option<Resolved<'_, T>> {
        if let Some(binding) = self
            .nav
            .iter()
            .find(|binding| binding.enabled && binding.key == key)
        {
            return Some(Resolved::Navigation(binding.trigger));
        }

        self.actions
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, callback)| Resolved::Action(callback))
    }

    /// Keys to attach to the presented message: enabled navigation keys
    /// in canonical order, then action keys in registration order.
    pub fn attached_keys(&self) -> Vec<String> {
        self.nav
            .iter()
            .filter(|binding| binding.enabled)
            .map(|binding| binding.key.clone())
            .chain(self.actions.iter().map(|(key, _)| key.clone()))
            .collect()
    }
}
