use uuid::Uuid;

/// Per-call session data supplied by the caller. The service never keeps it
/// between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    /// Principal performing the call; becomes `owner` on create.
    pub principal: Uuid,
}

impl RequestContext {
    pub fn new(principal: Uuid) -> Self {
        Self { principal }
    }
}
