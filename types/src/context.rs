//! Per-request identity of the invoking user.

use serde::Deserialize;

/// Where a display name may come from, in the order configured by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameSource {
    /// Nickname the user set with the bot itself.
    Configured,
    /// Nickname the chat platform reports for the author.
    Nickname,
    /// Account username on the chat platform.
    Username,
}

/// Configured nickname, then platform nickname, then platform username.
#[must_use]
pub fn default_name_order() -> Vec<NameSource> {
    vec![
        NameSource::Configured,
        NameSource::Nickname,
        NameSource::Username,
    ]
}

/// Explicit request context passed through the pipeline instead of ambient session state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Platform id used to address private messages.
    pub user_id: String,
    pub configured_name: Option<String>,
    pub nickname: Option<String>,
    pub username: String,
}

impl RequestContext {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            ..Self::default()
        }
    }

    pub fn with_configured_name(mut self, name: impl Into<String>) -> Self {
        self.configured_name = Some(name.into());
        self
    }

    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    fn name_from(&self, source: NameSource) -> Option<&str> {
        let candidate = match source {
            NameSource::Configured => self.configured_name.as_deref(),
            NameSource::Nickname => self.nickname.as_deref(),
            NameSource::Username => Some(self.username.as_str()),
        };
        candidate.map(str::trim).filter(|name| !name.is_empty())
    }

    /// First non-empty name in `order`.
    ///
    /// Falls back to the username, then the user id, when every listed source is blank.
    #[must_use]
    pub fn display_name(&self, order: &[NameSource]) -> &str {
        order
            .iter()
            .find_map(|source| self.name_from(*source))
            .or_else(|| self.name_from(NameSource::Username))
            .unwrap_or(self.user_id.as_str())
    }
}
