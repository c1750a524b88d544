use uuid::Uuid;

/// The per-handle resolved-id cache: once an entity/process/session/
/// conversation id has been resolved once, subsequent exchanges reuse it
/// without round-tripping through `StorageDriver::*_create` again (those
/// calls are themselves idempotent, but the cache avoids the extra query).
#[derive(Debug, Clone, Default)]
pub struct AttributionCache {
  pub entity_id: Option<i64>,
  pub process_id: Option<i64>,
  pub session_id: Option<i64>,
  pub conversation_id: Option<i64>,
}

impl AttributionCache {
  /// `new_session()` keeps attribution (entity/process) but forgets the
  /// session and conversation, forcing them to be re-resolved under a
  /// fresh session uuid.
  pub fn reset_session(&mut self) {
    self.session_id = None;
    self.conversation_id = None;
  }

  /// `set_session(uuid)` forgets the cached session/conversation the same
  /// way, since the caller is adopting a different session identity.
  pub fn adopt_session(&mut self, _session_uuid: Uuid) {
    self.reset_session();
  }
}
