use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{entity::prelude::*, ActiveValue::Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EstimateStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "sent")]
    Sent,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "expired")]
    Expired,
}

impl EstimateStatus {
    pub fn can_transition_to(self, next: EstimateStatus) -> bool {
        use EstimateStatus::*;
        matches!(
            (self, next),
            (Draft, Sent)
                | (Sent, Accepted)
                | (Sent, Rejected)
                | (Draft, Expired)
                | (Sent, Expired)
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "estimates")]
#[schema(as = Estimate)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub customer_id: Uuid,
    pub job_id: Option<Uuid>,
    pub estimate_number: String,
    pub status: EstimateStatus,
    #[sea_orm(column_type = "Json")]
    #[schema(value_type = Vec<crate::services::pricing::LineItem>)]
    pub line_items: Json,
    pub subtotal: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
    pub valid_until: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    /// Invoice created when the estimate was converted
    pub invoice_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = Utc::now();

        if insert {
            active_model.created_at = Set(now);
        }
        active_model.updated_at = Set(Some(now));

        Ok(active_model)
    }
}

#[cfg(test)]
mod tests {
    use super::EstimateStatus::{self, *};
    use rstest::rstest;

    #[rstest]
    #[case(Draft, Sent, true)]
    #[case(Draft, Accepted, false)]
    #[case(Sent, Accepted, true)]
    #[case(Sent, Rejected, true)]
    #[case(Draft, Expired, true)]
    #[case(Sent, Expired, true)]
    #[case(Accepted, Expired, false)]
    #[case(Rejected, Sent, false)]
    #[case(Sent, Sent, false)]
    fn status_machine(
        #[case] from: EstimateStatus,
        #[case] to: EstimateStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition_to(to), allowed);
    }
}
