use sea_orm_migration::{prelude::*, schema::*};

use crate::m20260301_02_create_entity_table::Entity as EntityTable;
use crate::m20260301_08_create_subject_table::Subject as SubjectTable;
use crate::m20260301_09_create_predicate_table::Predicate as PredicateTable;
use crate::m20260301_10_create_object_table::Object as ObjectTable;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(KnowledgeGraph::Table)
          .if_not_exists()
          .col(pk_auto(KnowledgeGraph::Id))
          .col(uuid(KnowledgeGraph::Uuid))
          .col(big_integer(KnowledgeGraph::EntityId))
          .col(big_integer(KnowledgeGraph::SubjectId))
          .col(big_integer(KnowledgeGraph::PredicateId))
          .col(big_integer(KnowledgeGraph::ObjectId))
          .col(big_integer(KnowledgeGraph::NumTimes).default(1))
          .col(timestamp_with_time_zone(KnowledgeGraph::DateLastTime).default(Expr::current_timestamp()))
          .index(Index::create().unique().col(KnowledgeGraph::Uuid))
          .index(
            Index::create().unique().col(KnowledgeGraph::EntityId).col(KnowledgeGraph::SubjectId).col(
              KnowledgeGraph::PredicateId,
            ).col(KnowledgeGraph::ObjectId),
          )
          .foreign_key(
            ForeignKey::create()
              .from(KnowledgeGraph::Table, KnowledgeGraph::EntityId)
              .to(EntityTable::Table, EntityTable::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .foreign_key(
            ForeignKey::create()
              .from(KnowledgeGraph::Table, KnowledgeGraph::SubjectId)
              .to(SubjectTable::Table, SubjectTable::Id),
          )
          .foreign_key(
            ForeignKey::create()
              .from(KnowledgeGraph::Table, KnowledgeGraph::PredicateId)
              .to(PredicateTable::Table, PredicateTable::Id),
          )
          .foreign_key(
            ForeignKey::create()
              .from(KnowledgeGraph::Table, KnowledgeGraph::ObjectId)
              .to(ObjectTable::Table, ObjectTable::Id),
          )
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(KnowledgeGraph::Table).to_owned())
      .await
  }
}

#[derive(Iden)]
pub enum KnowledgeGraph {
  Table,
  Id,
  Uuid,
  EntityId,
  SubjectId,
  PredicateId,
  ObjectId,
  NumTimes,
  DateLastTime,
}
