use chrono::{DateTime, Duration as ChronoDuration, Utc};
use memori_shared::{Message, MemoriConfig, MemoriError};
use memori_storage::{StorageAdapter, StorageDriver};
use tokio::time::{Duration, sleep};
use tracing::warn;
use uuid::Uuid;

use crate::cache::AttributionCache;

const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_BASE_SECS: f64 = 0.1;

/// One outbound query plus its (possibly multi-part) response, the unit
/// `ExchangeWriter::persist` commits in a single transaction.
pub struct Exchange<'a> {
  pub configured_entity_external_id: Option<&'a str>,
  pub configured_process_external_id: Option<&'a str>,
  pub session_uuid: Uuid,
  pub query_messages: &'a [Message],
  pub response_messages: &'a [Message],
  pub now: DateTime<Utc>,
}

/// Persists exactly one exchange, resolving and caching any ids not yet
/// known, retrying the whole transaction on CockroachDB's serializable-
/// conflict signal.
pub struct ExchangeWriter;

impl ExchangeWriter {
  pub async fn persist(
    adapter: &StorageAdapter,
    cache: &mut AttributionCache,
    config: &MemoriConfig,
    exchange: &Exchange<'_>,
  ) -> Result<(), MemoriError> {
    let mut attempt = 0;

    loop {
      match Self::persist_once(adapter, cache, config, exchange).await {
        Ok(()) => return Ok(()),
        Err(MemoriError::TransientStorage(err)) if attempt + 1 < MAX_ATTEMPTS => {
          attempt += 1;
          let backoff = BACKOFF_BASE_SECS * 2f64.powi(attempt as i32);
          warn!(attempt, backoff, error = %err, "retrying exchange write after transient storage error");
          sleep(Duration::from_secs_f64(backoff)).await;
        }
        Err(err) => return Err(err),
      }
    }
  }

  async fn persist_once(
    adapter: &StorageAdapter,
    cache: &mut AttributionCache,
    config: &MemoriConfig,
    exchange: &Exchange<'_>,
  ) -> Result<(), MemoriError> {
    let txn = adapter.begin().await?;

    match Self::run_write_steps(txn.connection(), cache, config, exchange).await {
      Ok(()) => {
        txn.flush().await?;
        txn.commit().await
      }
      Err(err) => {
        let _ = txn.rollback().await;
        Err(err)
      }
    }
  }

  async fn run_write_steps<C: sea_orm::ConnectionTrait>(
    conn: &C,
    cache: &mut AttributionCache,
    config: &MemoriConfig,
    exchange: &Exchange<'_>,
  ) -> Result<(), MemoriError> {
    // Rollover can only be decided once we know the cached conversation's
    // last activity, so a stale cache entry is invalidated here rather
    // than trusted blindly — otherwise a `Memori` handle that is kept
    // alive across a timeout window would never roll over.
    if let Some(conversation_id) = cache.conversation_id {
      match StorageDriver::conversation_read(conn, conversation_id).await? {
        Some(conversation) => {
          let history = StorageDriver::messages_read(conn, conversation_id).await?;
          let last_activity = history.last().map(|m| m.date_created).unwrap_or(conversation.date_created);
          if exchange.now - last_activity > ChronoDuration::minutes(config.session_timeout_minutes) {
            cache.conversation_id = None;
          }
        }
        None => cache.conversation_id = None,
      }
    }

    if let Some(external_id) = exchange.configured_entity_external_id {
      if cache.entity_id.is_none() {
        cache.entity_id = Some(StorageDriver::entity_create(conn, external_id).await?);
      }
    }

    if let Some(external_id) = exchange.configured_process_external_id {
      if cache.process_id.is_none() {
        cache.process_id = Some(StorageDriver::process_create(conn, external_id).await?);
      }
    }

    if cache.session_id.is_none() {
      cache.session_id =
        Some(StorageDriver::session_create(conn, exchange.session_uuid, cache.entity_id, cache.process_id).await?);
    }

    if cache.conversation_id.is_none() {
      cache.conversation_id = Some(
        StorageDriver::conversation_create(
          conn,
          cache.session_id.expect("session resolved above"),
          config.session_timeout_minutes,
          exchange.now,
        )
        .await?,
      );
    }

    let conversation_id = cache.conversation_id.expect("conversation resolved above");

    for message in exchange.query_messages.iter().filter(|m| !m.is_system()) {
      StorageDriver::message_create(conn, conversation_id, message.role.as_str(), None, &message.content).await?;
    }

    for message in exchange.response_messages {
      StorageDriver::message_create(
        conn,
        conversation_id,
        message.role.as_str(),
        message.r#type.as_deref(),
        &message.content,
      )
      .await?;
    }

    Ok(())
  }
}
