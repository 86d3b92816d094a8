use crate::domain::{OwnedResource, RequestUser};

/// Feature-flag permission checks. Pure: it only looks at what it is given.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizationService;

impl AuthorizationService {
    pub fn new() -> Self {
        Self
    }

    pub fn can(&self, user: &RequestUser, feature: &str) -> bool {
        has_feature(user, feature)
    }

    /// Owners may act on their own resources; anyone else needs `{feature}:others`.
    pub fn can_for<R: OwnedResource + ?Sized>(&self, user: &RequestUser, feature: &str, resource: &R) -> bool {
        if user.id() == Some(resource.owner_id()) {
            return true;
        }
        has_feature(user, &format!("{feature}:others"))
    }
}

fn has_feature(user: &RequestUser, feature: &str) -> bool {
    user.features().iter().any(|f| f == feature)
}
