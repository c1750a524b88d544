use async_trait::async_trait;
use chrono::Utc;
use memori_core::AugmentationInput;
use memori_embeddings::EmbeddingService;
use memori_shared::MemoriError;
use memori_storage::{Dialect, StorageDriver};
use sea_orm::DatabaseConnection;

use crate::remote_client::{
  AugmentationLlmMeta, AugmentationLlmModelMeta, AugmentationMessage, AugmentationRequest, AugmentationRequestConversation,
  AugmentationRequestMeta, AugmentationSdkMeta, AugmentationStorageMeta, RemoteAugmentationClient,
};
use crate::write_task::WriteTask;

/// The payload one augmentation run operates on, and the writes it has
/// decided to stage. Shared mutable state across the registered
/// augmentations, run in registration order.
pub struct AugmentationContext {
  pub input: AugmentationInput,
  pub writes: Vec<WriteTask>,
}

impl AugmentationContext {
  pub fn new(input: AugmentationInput) -> Self {
    Self { input, writes: Vec::new() }
  }
}

/// One derivation step over a completed exchange (fact extraction,
/// triple extraction, embedding, summarization, …). Implementations
/// stage writes on `ctx.writes` rather than writing directly — the
/// batched writer (§4.11) applies them independently.
#[async_trait]
pub trait Augmentation: Send + Sync {
  fn name(&self) -> &'static str;

  async fn process(&self, ctx: &mut AugmentationContext, conn: &DatabaseConnection) -> Result<(), MemoriError>;
}

fn dialect_name(dialect: Dialect) -> String {
  dialect.as_str().to_string()
}

/// The one augmentation this crate ships: calls out to the remote
/// derive-memories service, turns triples into facts where needed,
/// embeds the facts, and stages the resulting writes.
pub struct AdvancedAugmentation {
  client: RemoteAugmentationClient,
  embeddings: EmbeddingService,
}

impl AdvancedAugmentation {
  pub fn new(client: RemoteAugmentationClient, embeddings: EmbeddingService) -> Self {
    Self { client, embeddings }
  }
}

#[async_trait]
impl Augmentation for AdvancedAugmentation {
  fn name(&self) -> &'static str {
    "advanced_augmentation"
  }

  async fn process(&self, ctx: &mut AugmentationContext, conn: &DatabaseConnection) -> Result<(), MemoriError> {
    let conversation_id = ctx.input.conversation_id;
    let summary = StorageDriver::conversation_read(conn, conversation_id).await?.and_then(|c| c.summary);

    let messages: Vec<AugmentationMessage> = ctx
      .input
      .query_messages
      .iter()
      .chain(ctx.input.response_messages.iter())
      .map(|m| AugmentationMessage { role: m.role.as_str().to_string(), content: m.content.clone() })
      .collect();

    let request = AugmentationRequest {
      conversation: AugmentationRequestConversation { messages, summary },
      meta: AugmentationRequestMeta {
        llm: AugmentationLlmMeta { model: AugmentationLlmModelMeta { provider: ctx.input.provider.clone(), version: env!("CARGO_PKG_VERSION") } },
        sdk: AugmentationSdkMeta { lang: "rust", version: env!("CARGO_PKG_VERSION") },
        storage: AugmentationStorageMeta { dialect: dialect_name(ctx.input.storage_dialect) },
      },
    };

    let response = self.client.augment(&request).await?;

    let Some(entity) = response.entity else {
      return Ok(());
    };

    let mut facts = entity.facts;
    if facts.is_empty() && !entity.triples.is_empty() {
      facts = entity.triples.iter().map(|t| t.as_fact()).collect();
    }

    let now = Utc::now();

    if let (Some(entity_id), false) = (ctx.input.entity_id, facts.is_empty()) {
      let embeddings = self.embeddings.encode_many(&facts).await;
      let packed: Vec<Vec<u8>> = embeddings.into_iter().map(|v| memori_embeddings::pack_embedding(&v)).collect();
      ctx.writes.push(WriteTask::CreateEntityFact { entity_id, facts, embeddings: packed, now });

      for triple in &entity.triples {
        ctx.writes.push(WriteTask::CreateKnowledgeGraph {
          entity_id,
          subject: triple.subject.name.clone(),
          predicate: triple.predicate.clone(),
          object: triple.object.name.clone(),
          now,
        });
      }
    }

    if let Some(process_id) = ctx.input.process_id {
      if let Some(process) = response.process {
        for attribute in process.attributes {
          ctx.writes.push(WriteTask::CreateProcessAttribute { process_id, content: attribute, now });
        }
      }
    }

    if let Some(conversation) = response.conversation {
      if let Some(summary) = conversation.summary {
        ctx.writes.push(WriteTask::UpdateConversationSummary { conversation_id, summary });
      }
    }

    Ok(())
  }
}
