use std::collections::HashMap;
use std::fmt;

/// The control (and, where relevant, the recipe) that triggered a gateway call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RequestKey {
    Search,
    Regenerate(String),
    Video(String),
    CommentReply(String),
    Chat,
    DailyTip,
}

impl RequestKey {
    pub fn recipe_id(&self) -> Option<&str> {
        match self {
            RequestKey::Regenerate(id) | RequestKey::Video(id) | RequestKey::CommentReply(id) => {
                Some(id)
            }
            _ => None,
        }
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKey::Search => write!(f, "search"),
            RequestKey::Regenerate(id) => write!(f, "regenerate({})", id),
            RequestKey::Video(id) => write!(f, "video({})", id),
            RequestKey::CommentReply(id) => write!(f, "comment-reply({})", id),
            RequestKey::Chat => write!(f, "chat"),
            RequestKey::DailyTip => write!(f, "daily-tip"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestStatus {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed(String),
}

impl RequestStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, RequestStatus::Pending)
    }
}

#[derive(Debug, Default)]
pub struct RequestTracker {
    statuses: HashMap<RequestKey, RequestStatus>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self, key: &RequestKey) -> RequestStatus {
        self.statuses.get(key).cloned().unwrap_or_default()
    }

    /// Marks `key` pending. Returns `false` (and changes nothing) if it already is.
    pub fn begin(&mut self, key: RequestKey) -> bool {
        let slot = self.statuses.entry(key).or_default();
        if slot.is_pending() {
            return false;
        }
        *slot = RequestStatus::Pending;
        true
    }

    pub fn succeed(&mut self, key: RequestKey) {
        self.statuses.insert(key, RequestStatus::Succeeded);
    }

    pub fn fail(&mut self, key: RequestKey, message: impl Into<String>) {
        self.statuses.insert(key, RequestStatus::Failed(message.into()));
    }

    /// Drops settled per-recipe entries whose recipe fails `still_known`.
    /// Pending entries stay so their calls can still settle.
    pub fn forget_recipes(&mut self, still_known: impl Fn(&str) -> bool) {
        self.statuses.retain(|key, status| {
            status.is_pending() || key.recipe_id().map_or(true, |id| still_known(id))
        });
    }

    pub fn pending(&self) -> Vec<&RequestKey> {
        self.statuses
            .iter()
            .filter(|(_, status)| status.is_pending())
            .map(|(key, _)| key)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_begin_is_refused_while_pending() {
        let mut tracker = RequestTracker::new();
        let key = RequestKey::Regenerate("gen_1_0".to_string());
        assert!(tracker.begin(key.clone()));
        assert!(!tracker.begin(key.clone()));
        assert_eq!(tracker.status(&key), RequestStatus::Pending);

        tracker.succeed(key.clone());
        assert!(tracker.begin(key));
    }

    #[test]
    fn keys_for_different_recipes_are_independent() {
        let mut tracker = RequestTracker::new();
        assert!(tracker.begin(RequestKey::Regenerate("a".to_string())));
        assert!(tracker.begin(RequestKey::Regenerate("b".to_string())));
        assert_eq!(tracker.pending().len(), 2);
    }

    #[test]
    fn failure_settles_with_message() {
        let mut tracker = RequestTracker::new();
        tracker.begin(RequestKey::Search);
        tracker.fail(RequestKey::Search, "busy");
        assert_eq!(
            tracker.status(&RequestKey::Search),
            RequestStatus::Failed("busy".to_string())
        );
        assert_eq!(tracker.status(&RequestKey::Chat), RequestStatus::Idle);
    }

    #[test]
    fn forgetting_keeps_pending_and_global_entries() {
        let mut tracker = RequestTracker::new();
        tracker.begin(RequestKey::Video("old".to_string()));
        tracker.succeed(RequestKey::Video("old".to_string()));
        tracker.begin(RequestKey::Regenerate("busy".to_string()));
        tracker.begin(RequestKey::CommentReply("kept".to_string()));
        tracker.succeed(RequestKey::CommentReply("kept".to_string()));
        tracker.begin(RequestKey::Search);
        tracker.succeed(RequestKey::Search);

        tracker.forget_recipes(|id| id == "kept");

        assert_eq!(tracker.statuses.len(), 3);
        assert_eq!(tracker.status(&RequestKey::Video("old".to_string())), RequestStatus::Idle);
        assert!(tracker.status(&RequestKey::Regenerate("busy".to_string())).is_pending());
        assert_eq!(
            tracker.status(&RequestKey::CommentReply("kept".to_string())),
            RequestStatus::Succeeded
        );
        assert_eq!(tracker.status(&RequestKey::Search), RequestStatus::Succeeded);
    }
}
