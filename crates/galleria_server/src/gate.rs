//! Request authorization ahead of ingestion.

use crate::UserDirectory;
use galleria_error::{AuthError, AuthErrorKind};

/// Outcome of checking a session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Authorization {
    /// No session cookie, or an empty one
    Unauthenticated,
    /// Cookie present but no user holds that state
    Forbidden,
    /// Cookie matches a user
    Allowed,
}

/// Decides whether a request may reach the ingestion pipeline.
#[derive(Debug, Clone)]
pub struct AccessGate {
    allow_upload: bool,
    users: UserDirectory,
}

impl AccessGate {
    /// Create a gate with the upload feature flag and the known users.
    pub fn new(allow_upload: bool, users: UserDirectory) -> Self {
        Self {
            allow_upload,
            users,
        }
    }

    /// Whether uploads are enabled for this process.
    pub fn allow_upload(&self) -> bool {
        self.allow_upload
    }

    /// Resolve a session cookie value.
    pub fn authorize(&self, cookie: Option<&str>) -> Authorization {
        match cookie {
            None | Some("") => Authorization::Unauthenticated,
            Some(state) => match self.users.find_by_state(state) {
                Some(user) => {
                    tracing::debug!(user = %user.name(), "Session resolved");
                    Authorization::Allowed
                }
                None => {
                    tracing::debug!("No user matches session state");
                    Authorization::Forbidden
                }
            },
        }
    }

    /// Check both the feature flag and the session for an upload.
    pub fn admit_upload(&self, cookie: Option<&str>) -> Result<(), AuthError> {
        if !self.allow_upload {
            return Err(AuthError::new(AuthErrorKind::UploadsDisabled));
        }
        match self.authorize(cookie) {
            Authorization::Allowed => Ok(()),
            Authorization::Unauthenticated => Err(AuthError::new(AuthErrorKind::Unauthenticated)),
            Authorization::Forbidden => Err(AuthError::new(AuthErrorKind::Forbidden)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::User;

    fn gate(allow_upload: bool) -> AccessGate {
        AccessGate::new(
            allow_upload,
            UserDirectory::new([User::new("ada", 1, "s3cret", true)]),
        )
    }

    #[test]
    fn resolves_sessions() {
        let gate = gate(true);
        assert_eq!(gate.authorize(None), Authorization::Unauthenticated);
        assert_eq!(gate.authorize(Some("")), Authorization::Unauthenticated);
        assert_eq!(gate.authorize(Some("guess")), Authorization::Forbidden);
        assert_eq!(gate.authorize(Some("s3cret")), Authorization::Allowed);
    }

    #[test]
    fn disabled_uploads_refuse_valid_sessions() {
        let err = gate(false).admit_upload(Some("s3cret")).unwrap_err();
        assert_eq!(err.kind(), AuthErrorKind::UploadsDisabled);
    }

    #[test]
    fn upload_admission_follows_session() {
        let gate = gate(true);
        assert!(gate.admit_upload(Some("s3cret")).is_ok());
        assert_eq!(
            gate.admit_upload(None).unwrap_err().kind(),
            AuthErrorKind::Unauthenticated
        );
        assert_eq!(
            gate.admit_upload(Some("nope")).unwrap_err().kind(),
            AuthErrorKind::Forbidden
        );
    }
}
