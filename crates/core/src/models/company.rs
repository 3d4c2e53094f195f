use serde::{Deserialize, Serialize};
use serde_json::Number;

use super::common::{nullable, Address, CustomField, PhoneNumber, Social, Website};
use crate::error::Result;
use crate::validate::{self, Validate};

pub const COMPANY_STATUSES: &[&str] = &["active", "inactive", "prospect"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Company {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub assignee_id: Option<i64>,
    #[serde(default)]
    pub primary_contact_id: Option<i64>,
    #[serde(default)]
    pub contact_type_id: Option<i64>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub email_domain: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub annual_revenue: Option<Number>,
    #[serde(default)]
    pub employee_count: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default, deserialize_with = "nullable")]
    pub phone_numbers: Vec<PhoneNumber>,
    #[serde(default, deserialize_with = "nullable")]
    pub socials: Vec<Social>,
    #[serde(default, deserialize_with = "nullable")]
    pub websites: Vec<Website>,
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

impl Validate for Company {
    fn validate(&self) -> Result<()> {
        validate::non_empty("name", &self.name)?;
        validate_scalars(
            self.industry.as_deref(),
            self.annual_revenue.as_ref(),
            self.employee_count,
            self.status.as_deref(),
        )?;
        validate::non_negative("interaction_count", self.interaction_count.map(|v| v as f64))?;
        validate::custom_fields(&self.custom_fields)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub assignee_id: Option<i64>,
    #[serde(default)]
    pub primary_contact_id: Option<i64>,
    #[serde(default)]
    pub contact_type_id: Option<i64>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub email_domain: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub annual_revenue: Option<Number>,
    #[serde(default)]
    pub employee_count: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub phone_numbers: Option<Vec<PhoneNumber>>,
    #[serde(default)]
    pub socials: Option<Vec<Social>>,
    #[serde(default)]
    pub websites: Option<Vec<Website>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub custom_fields: Option<Vec<CustomField>>,
}

impl Validate for CompanyUpdate {
    fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate::non_empty("name", name)?;
        }
        validate_scalars(
            self.industry.as_deref(),
            self.annual_revenue.as_ref(),
            self.employee_count,
            self.status.as_deref(),
        )?;
        validate::custom_fields(self.custom_fields.as_deref().unwrap_or_default())
    }
}

fn validate_scalars(
    industry: Option<&str>,
    annual_revenue: Option<&Number>,
    employee_count: Option<i64>,
    status: Option<&str>,
) -> Result<()> {
    validate::industry(industry)?;
    validate::non_negative("annual_revenue", annual_revenue.and_then(Number::as_f64))?;
    validate::non_negative("employee_count", employee_count.map(|v| v as f64))?;
    validate::one_of("status", status, COMPANY_STATUSES)
}
