//! The acting identity for one request.

/// Per-request identity as supplied by the authentication collaborator.
pub trait AuthContext {
    /// The acting user, if the request is authenticated.
    fn current_user_id(&self) -> Option<i64>;

    /// Whether the caller holds an administrative capability that bypasses
    /// ownership checks.
    fn has_elevated_permission(&self) -> bool;

    /// Preferred language when the payload or parameters name none.
    fn language_id(&self) -> Option<i64> {
        None
    }
}

/// Plain [`AuthContext`] value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Option<i64>,
    pub elevated: bool,
    pub language_id: Option<i64>,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn elevated(mut self) -> Self {
        self.elevated = true;
        self
    }

    pub fn with_language(mut self, language_id: i64) -> Self {
        self.language_id = Some(language_id);
        self
    }
}

impl AuthContext for Identity {
    fn current_user_id(&self) -> Option<i64> {
        self.user_id
    }

    fn has_elevated_permission(&self) -> bool {
        self.elevated
    }

    fn language_id(&self) -> Option<i64> {
        self.language_id
    }
}
