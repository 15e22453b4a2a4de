use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rag_chunks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub document_id: Uuid,
    pub chunk_index: i32,
    pub start_char: i64,
    pub end_char: i64,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub content_hash: String,
    /// Embedding vector as a JSON array of floats
    #[sea_orm(column_type = "Json", nullable)]
    pub embedding: Option<Json>,
    pub created_at: DateTime<Utc>,
}

impl Model {
    pub fn embedding_vector(&self) -> Option<Vec<f32>> {
        self.embedding
            .as_ref()
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::rag_document::Entity",
        from = "Column::DocumentId",
        to = "super::rag_document::Column::Id",
        on_delete = "Cascade"
    )]
    Document,
}

impl Related<super::rag_document::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Document.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
