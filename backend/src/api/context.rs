//! Per-request context carried in request extensions.

use crate::database::models::User;

/// Data attached to a single request as it moves through the pipeline.
///
/// The request id is set by the outermost stage; `user` is only filled in by
/// the authentication gate on private routes.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub request_id: String,
    pub user: Option<User>,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            user: None,
        }
    }
}
