use serde::{Deserialize, Serialize};
use serde_json::Number;

use super::common::{nullable, CustomField};
use crate::error::Result;
use crate::validate::{self, Validate};

pub const OPPORTUNITY_STATUSES: &[&str] = &["Open", "Won", "Lost", "Abandoned"];
pub const PRIORITIES: &[&str] = &["None", "Low", "Medium", "High"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub pipeline_id: i64,
    pub pipeline_stage_id: i64,
    #[serde(default)]
    pub assignee_id: Option<i64>,
    #[serde(default)]
    pub company_id: Option<i64>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub primary_contact_id: Option<i64>,
    #[serde(default)]
    pub customer_source_id: Option<i64>,
    #[serde(default)]
    pub loss_reason_id: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub monetary_value: Option<Number>,
    #[serde(default)]
    pub win_probability: Option<i64>,
    #[serde(default)]
    pub close_date: Option<i64>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub custom_fields: Vec<CustomField>,
    #[serde(default)]
    pub interaction_count: Option<i64>,
    #[serde(default)]
    pub date_created: Option<i64>,
    #[serde(default)]
    pub date_modified: Option<i64>,
}

impl Validate for Opportunity {
    fn validate(&self) -> Result<()> {
        validate::non_empty("name", &self.name)?;
        validate_scalars(
            self.status.as_deref(),
            self.priority.as_deref(),
            self.monetary_value.as_ref(),
            self.win_probability,
        )?;
        validate::custom_fields(&self.custom_fields)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpportunityUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub pipeline_id: Option<i64>,
    #[serde(default)]
    pub pipeline_stage_id: Option<i64>,
    #[serde(default)]
    pub assignee_id: Option<i64>,
    #[serde(default)]
    pub company_id: Option<i64>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub primary_contact_id: Option<i64>,
    #[serde(default)]
    pub customer_source_id: Option<i64>,
    #[serde(default)]
    pub loss_reason_id: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub monetary_value: Option<Number>,
    #[serde(default)]
    pub win_probability: Option<i64>,
    #[serde(default)]
    pub close_date: Option<i64>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub custom_fields: Option<Vec<CustomField>>,
}

impl Validate for OpportunityUpdate {
    fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate::non_empty("name", name)?;
        }
        validate_scalars(
            self.status.as_deref(),
            self.priority.as_deref(),
            self.monetary_value.as_ref(),
            self.win_probability,
        )?;
        validate::custom_fields(self.custom_fields.as_deref().unwrap_or_default())
    }
}

fn validate_scalars(
    status: Option<&str>,
    priority: Option<&str>,
    monetary_value: Option<&Number>,
    win_probability: Option<i64>,
) -> Result<()> {
    validate::one_of("status", status, OPPORTUNITY_STATUSES)?;
    validate::one_of("priority", priority, PRIORITIES)?;
    validate::non_negative("monetary_value", monetary_value.and_then(Number::as_f64))?;
    validate::in_range("win_probability", win_probability.map(|v| v as f64), 0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CopperError;
    use serde_json::json;

    #[test]
    fn pipeline_ids_are_required() {
        let res = serde_json::from_value::<Opportunity>(json!({ "name": "Deal", "pipeline_id": 1 }));
        assert!(res.is_err());
    }

    #[test]
    fn negative_monetary_value_is_rejected() {
        let opp: Opportunity = serde_json::from_value(json!({
            "name": "Deal",
            "pipeline_id": 1,
            "pipeline_stage_id": 2,
            "monetary_value": -1000
        }))
        .unwrap();
        let err = opp.validate().unwrap_err();
        assert!(matches!(err, CopperError::Validation { ref field, .. } if field == "monetary_value"));
    }

    #[test]
    fn win_probability_bounds() {
        let u = OpportunityUpdate { win_probability: Some(101), ..Default::default() };
        assert!(u.validate().is_err());
        let u = OpportunityUpdate { win_probability: Some(100), status: Some("won".into()), ..Default::default() };
        assert!(u.validate().is_ok());
    }
}
