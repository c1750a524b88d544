use chrono::{DateTime, Duration, Utc};
use memori_entities::{conversation, conversation_message, entity, entity_fact, knowledge_graph, object, predicate, process, process_attribute, schema_version, session, subject};
use memori_shared::{MemoriError, uniq};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

/// A persisted message row, the shape `conversation.messages.read`
/// returns.
#[derive(Debug, Clone)]
pub struct StoredMessage {
  pub id: i64,
  pub role: String,
  pub r#type: Option<String>,
  pub content: String,
  pub date_created: DateTime<Utc>,
}

/// Dialect-parameterized CRUD against the twelve-table schema, generic
/// over any `sea_orm` connection (a live `DatabaseConnection` or an open
/// `DatabaseTransaction`) so the same code runs inside the writer's
/// single transaction and against ad-hoc reads.
///
/// Upserts use a portable select-then-write pattern rather than
/// dialect-specific `ON CONFLICT`/`ON DUPLICATE KEY UPDATE` SQL: correct
/// under this crate's single-writer-per-fingerprint invariant, with the
/// table's unique index as a safety net against a lost race (see
/// `entity_create`/`process_create` for the convergence path) — see
/// DESIGN.md for why this reads as a generalization of the original's
/// dialect-specific upsert statements rather than a copy.
pub struct StorageDriver;

impl StorageDriver {
  pub async fn entity_create<C: ConnectionTrait>(conn: &C, external_id: &str) -> Result<i64, MemoriError> {
    if let Some(row) = entity::Entity::find().filter(entity::Column::ExternalId.eq(external_id)).one(conn).await? {
      return Ok(row.id);
    }

    let model = entity::ActiveModel {
      uuid: Set(Uuid::new_v4()),
      external_id: Set(external_id.to_string()),
      ..Default::default()
    };

    match model.insert(conn).await {
      Ok(row) => Ok(row.id),
      Err(_) => entity::Entity::find()
        .filter(entity::Column::ExternalId.eq(external_id))
        .one(conn)
        .await?
        .map(|row| row.id)
        .ok_or_else(|| MemoriError::storage(anyhow::anyhow!("entity create race left no row for {external_id}"))),
    }
  }

  pub async fn process_create<C: ConnectionTrait>(conn: &C, external_id: &str) -> Result<i64, MemoriError> {
    if let Some(row) = process::Entity::find().filter(process::Column::ExternalId.eq(external_id)).one(conn).await? {
      return Ok(row.id);
    }

    let model = process::ActiveModel {
      uuid: Set(Uuid::new_v4()),
      external_id: Set(external_id.to_string()),
      ..Default::default()
    };

    match model.insert(conn).await {
      Ok(row) => Ok(row.id),
      Err(_) => process::Entity::find()
        .filter(process::Column::ExternalId.eq(external_id))
        .one(conn)
        .await?
        .map(|row| row.id)
        .ok_or_else(|| MemoriError::storage(anyhow::anyhow!("process create race left no row for {external_id}"))),
    }
  }

  pub async fn session_create<C: ConnectionTrait>(
    conn: &C,
    session_uuid: Uuid,
    entity_id: Option<i64>,
    process_id: Option<i64>,
  ) -> Result<i64, MemoriError> {
    if let Some(row) = session::Entity::find().filter(session::Column::Uuid.eq(session_uuid)).one(conn).await? {
      return Ok(row.id);
    }

    let model = session::ActiveModel {
      uuid: Set(session_uuid),
      entity_id: Set(entity_id),
      process_id: Set(process_id),
      ..Default::default()
    };

    match model.insert(conn).await {
      Ok(row) => Ok(row.id),
      Err(_) => session::Entity::find()
        .filter(session::Column::Uuid.eq(session_uuid))
        .one(conn)
        .await?
        .map(|row| row.id)
        .ok_or_else(|| MemoriError::storage(anyhow::anyhow!("session create race left no row for {session_uuid}"))),
    }
  }

  /// Looks up the live conversation for `session_id` and the max
  /// `date_created` across its messages; if `now - last_activity <=
  /// timeout`, returns the existing id, otherwise creates a new row.
  /// When the conversation has no messages yet, its own `date_created`
  /// stands in for "last activity".
  pub async fn conversation_create<C: ConnectionTrait>(
    conn: &C,
    session_id: i64,
    timeout_minutes: i64,
    now: DateTime<Utc>,
  ) -> Result<i64, MemoriError> {
    let existing = conversation::Entity::find()
      .filter(conversation::Column::SessionId.eq(session_id))
      .order_by_desc(conversation::Column::Id)
      .one(conn)
      .await?;

    if let Some(conv) = &existing {
      let last_activity = conversation_message::Entity::find()
        .filter(conversation_message::Column::ConversationId.eq(conv.id))
        .order_by_desc(conversation_message::Column::DateCreated)
        .one(conn)
        .await?
        .map(|m| m.date_created)
        .unwrap_or(conv.date_created);

      if now - last_activity <= Duration::minutes(timeout_minutes) {
        return Ok(conv.id);
      }
    }

    let model = conversation::ActiveModel {
      uuid: Set(Uuid::new_v4()),
      session_id: Set(session_id),
      ..Default::default()
    };
    Ok(model.insert(conn).await.map_err(MemoriError::from)?.id)
  }

  pub async fn conversation_update_summary<C: ConnectionTrait>(
    conn: &C,
    conversation_id: i64,
    summary: &str,
  ) -> Result<(), MemoriError> {
    let Some(row) = conversation::Entity::find_by_id(conversation_id).one(conn).await? else {
      return Err(MemoriError::storage(anyhow::anyhow!("conversation {conversation_id} not found")));
    };
    let mut active: conversation::ActiveModel = row.into();
    active.summary = Set(Some(summary.to_string()));
    active.update(conn).await?;
    Ok(())
  }

  pub async fn conversation_read<C: ConnectionTrait>(
    conn: &C,
    conversation_id: i64,
  ) -> Result<Option<conversation::Model>, MemoriError> {
    Ok(conversation::Entity::find_by_id(conversation_id).one(conn).await?)
  }

  pub async fn message_create<C: ConnectionTrait>(
    conn: &C,
    conversation_id: i64,
    role: &str,
    r#type: Option<&str>,
    content: &str,
  ) -> Result<i64, MemoriError> {
    let model = conversation_message::ActiveModel {
      uuid: Set(Uuid::new_v4()),
      conversation_id: Set(conversation_id),
      role: Set(role.to_string()),
      r#type: Set(r#type.map(ToString::to_string)),
      content: Set(content.to_string()),
      ..Default::default()
    };
    Ok(model.insert(conn).await?.id)
  }

  pub async fn messages_read<C: ConnectionTrait>(
    conn: &C,
    conversation_id: i64,
  ) -> Result<Vec<StoredMessage>, MemoriError> {
    let rows = conversation_message::Entity::find()
      .filter(conversation_message::Column::ConversationId.eq(conversation_id))
      .order_by_asc(conversation_message::Column::Id)
      .all(conn)
      .await?;

    Ok(
      rows
        .into_iter()
        .map(|row| StoredMessage {
          id: row.id,
          role: row.role,
          r#type: row.r#type,
          content: row.content,
          date_created: row.date_created,
        })
        .collect(),
    )
  }

  /// Upserts each fact by `(entity_id, uniq)`; on conflict increments
  /// `num_times` and bumps `date_last_time`, on insert sets `num_times =
  /// 1`. Returns the row id for each fact, in input order.
  pub async fn entity_fact_create<C: ConnectionTrait>(
    conn: &C,
    entity_id: i64,
    facts: &[String],
    embeddings: &[Vec<u8>],
    now: DateTime<Utc>,
  ) -> Result<Vec<i64>, MemoriError> {
    let mut ids = Vec::with_capacity(facts.len());

    for (content, embedding) in facts.iter().zip(embeddings.iter()) {
      let fingerprint = uniq(&[content.as_str()]);

      let existing = entity_fact::Entity::find()
        .filter(entity_fact::Column::EntityId.eq(entity_id))
        .filter(entity_fact::Column::Uniq.eq(fingerprint.clone()))
        .one(conn)
        .await?;

      let id = match existing {
        Some(row) => {
          let num_times = row.num_times + 1;
          let mut active: entity_fact::ActiveModel = row.into();
          active.num_times = Set(num_times);
          active.date_last_time = Set(now);
          active.update(conn).await?.id
        }
        None => {
          let active = entity_fact::ActiveModel {
            uuid: Set(Uuid::new_v4()),
            entity_id: Set(entity_id),
            content: Set(content.clone()),
            content_embedding: Set(embedding.clone()),
            num_times: Set(1),
            date_last_time: Set(now),
            uniq: Set(fingerprint),
            ..Default::default()
          };
          active.insert(conn).await?.id
        }
      };

      ids.push(id);
    }

    Ok(ids)
  }

  pub async fn entity_fact_get_embeddings<C: ConnectionTrait>(
    conn: &C,
    entity_id: i64,
    limit: u64,
  ) -> Result<Vec<(i64, Vec<u8>)>, MemoriError> {
    let rows = entity_fact::Entity::find()
      .filter(entity_fact::Column::EntityId.eq(entity_id))
      .order_by_desc(entity_fact::Column::DateLastTime)
      .limit(limit)
      .all(conn)
      .await?;

    Ok(rows.into_iter().map(|row| (row.id, row.content_embedding)).collect())
  }

  pub async fn entity_fact_get_facts_by_ids<C: ConnectionTrait>(
    conn: &C,
    ids: &[i64],
  ) -> Result<Vec<(i64, String)>, MemoriError> {
    if ids.is_empty() {
      return Ok(vec![]);
    }
    let rows = entity_fact::Entity::find().filter(entity_fact::Column::Id.is_in(ids.to_vec())).all(conn).await?;
    Ok(rows.into_iter().map(|row| (row.id, row.content)).collect())
  }

  async fn upsert_subject<C: ConnectionTrait>(conn: &C, name: &str) -> Result<i64, MemoriError> {
    let fingerprint = uniq(&[name]);
    if let Some(row) = subject::Entity::find().filter(subject::Column::Uniq.eq(fingerprint.clone())).one(conn).await? {
      return Ok(row.id);
    }
    let active = subject::ActiveModel {
      uuid: Set(Uuid::new_v4()),
      content: Set(name.to_string()),
      uniq: Set(fingerprint),
      ..Default::default()
    };
    Ok(active.insert(conn).await?.id)
  }

  async fn upsert_predicate<C: ConnectionTrait>(conn: &C, name: &str) -> Result<i64, MemoriError> {
    let normalized = name.to_lowercase();
    let fingerprint = uniq(&[normalized.as_str()]);
    if let Some(row) = predicate::Entity::find().filter(predicate::Column::Uniq.eq(fingerprint.clone())).one(conn).await? {
      return Ok(row.id);
    }
    let active = predicate::ActiveModel {
      uuid: Set(Uuid::new_v4()),
      content: Set(normalized),
      uniq: Set(fingerprint),
      ..Default::default()
    };
    Ok(active.insert(conn).await?.id)
  }

  async fn upsert_object<C: ConnectionTrait>(conn: &C, name: &str) -> Result<i64, MemoriError> {
    let fingerprint = uniq(&[name]);
    if let Some(row) = object::Entity::find().filter(object::Column::Uniq.eq(fingerprint.clone())).one(conn).await? {
      return Ok(row.id);
    }
    let active = object::ActiveModel {
      uuid: Set(Uuid::new_v4()),
      content: Set(name.to_string()),
      uniq: Set(fingerprint),
      ..Default::default()
    };
    Ok(active.insert(conn).await?.id)
  }

  /// Upserts subject/predicate/object vocabulary (inserting new rows
  /// where needed), then upserts the `(entity, subject, predicate,
  /// object)` tuple with the same counter semantics as `entity_fact`.
  pub async fn knowledge_graph_create<C: ConnectionTrait>(
    conn: &C,
    entity_id: i64,
    subject_name: &str,
    predicate_name: &str,
    object_name: &str,
    now: DateTime<Utc>,
  ) -> Result<i64, MemoriError> {
    let subject_id = Self::upsert_subject(conn, subject_name).await?;
    let predicate_id = Self::upsert_predicate(conn, predicate_name).await?;
    let object_id = Self::upsert_object(conn, object_name).await?;

    let existing = knowledge_graph::Entity::find()
      .filter(knowledge_graph::Column::EntityId.eq(entity_id))
      .filter(knowledge_graph::Column::SubjectId.eq(subject_id))
      .filter(knowledge_graph::Column::PredicateId.eq(predicate_id))
      .filter(knowledge_graph::Column::ObjectId.eq(object_id))
      .one(conn)
      .await?;

    match existing {
      Some(row) => {
        let num_times = row.num_times + 1;
        let mut active: knowledge_graph::ActiveModel = row.into();
        active.num_times = Set(num_times);
        active.date_last_time = Set(now);
        Ok(active.update(conn).await?.id)
      }
      None => {
        let active = knowledge_graph::ActiveModel {
          uuid: Set(Uuid::new_v4()),
          entity_id: Set(entity_id),
          subject_id: Set(subject_id),
          predicate_id: Set(predicate_id),
          object_id: Set(object_id),
          num_times: Set(1),
          date_last_time: Set(now),
          ..Default::default()
        };
        Ok(active.insert(conn).await?.id)
      }
    }
  }

  pub async fn process_attribute_create<C: ConnectionTrait>(
    conn: &C,
    process_id: i64,
    content: &str,
    now: DateTime<Utc>,
  ) -> Result<i64, MemoriError> {
    let fingerprint = uniq(&[content]);

    let existing = process_attribute::Entity::find()
      .filter(process_attribute::Column::ProcessId.eq(process_id))
      .filter(process_attribute::Column::Uniq.eq(fingerprint.clone()))
      .one(conn)
      .await?;

    match existing {
      Some(row) => {
        let num_times = row.num_times + 1;
        let mut active: process_attribute::ActiveModel = row.into();
        active.num_times = Set(num_times);
        active.date_last_time = Set(now);
        Ok(active.update(conn).await?.id)
      }
      None => {
        let active = process_attribute::ActiveModel {
          uuid: Set(Uuid::new_v4()),
          process_id: Set(process_id),
          content: Set(content.to_string()),
          num_times: Set(1),
          date_last_time: Set(now),
          uniq: Set(fingerprint),
          ..Default::default()
        };
        Ok(active.insert(conn).await?.id)
      }
    }
  }

  pub async fn schema_version_read<C: ConnectionTrait>(conn: &C) -> Result<Option<i64>, MemoriError> {
    Ok(
      schema_version::Entity::find()
        .order_by_desc(schema_version::Column::Id)
        .one(conn)
        .await?
        .map(|row| row.version),
    )
  }

  pub async fn schema_version_create<C: ConnectionTrait>(conn: &C, version: i64) -> Result<(), MemoriError> {
    let active = schema_version::ActiveModel {
      version: Set(version),
      ..Default::default()
    };
    active.insert(conn).await?;
    Ok(())
  }

  pub async fn schema_version_delete<C: ConnectionTrait>(conn: &C) -> Result<(), MemoriError> {
    schema_version::Entity::delete_many().exec(conn).await?;
    Ok(())
  }
}
