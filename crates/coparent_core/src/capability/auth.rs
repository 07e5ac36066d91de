//! Fixed-identity auth provider for local sessions and tests.

use super::{AuthProvider, CapabilityError};
use crate::model::UserId;

/// Auth provider whose identity is decided up front (CLI config, tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticAuthProvider {
    user: Option<UserId>,
}

impl StaticAuthProvider {
    pub fn signed_in(user: UserId) -> Self {
        Self { user: Some(user) }
    }

    pub fn signed_out() -> Self {
        Self { user: None }
    }
}

impl AuthProvider for StaticAuthProvider {
    fn current_user(&self) -> Result<Option<UserId>, CapabilityError> {
        Ok(self.user.filter(|user| !user.is_nil()))
    }
}

#[cfg(test)]
mod tests {
    use super::StaticAuthProvider;
    use crate::capability::AuthProvider;
    use uuid::Uuid;

    #[test]
    fn nil_identity_counts_as_signed_out() {
        let auth = StaticAuthProvider::signed_in(Uuid::nil());
        assert_eq!(auth.current_user().unwrap(), None);
    }
}
