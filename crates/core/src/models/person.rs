use serde::{Deserialize, Serialize};
use serde_json::json;

use super::common::{nullable, Address, CustomField, EmailAddress, PhoneNumber, Social, Website};
use crate::error::{CopperError, Result};
use crate::validate::{self, Validate};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Person {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub suffix: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company_id: Option<i64>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub assignee_id: Option<i64>,
    #[serde(default)]
    pub contact_type_id: Option<i64>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub emails: Vec<EmailAddress>,
    #[serde(default, deserialize_with = "nullable")]
    pub phone_numbers: Vec<PhoneNumber>,
    #[serde(default, deserialize_with = "nullable")]
    pub socials: Vec<Social>,
    #[serde(default, deserialize_with = "nullable")]
    pub websites: Vec<Website>,
    #[serde(default)]
    pub address: Option<Address>,
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

impl Validate for Person {
    fn validate(&self) -> Result<()> {
        validate::non_empty("name", &self.name)?;
        if self.emails.is_empty() {
            return Err(CopperError::validation("emails", "at least one email is required"));
        }
        validate_emails(&self.emails)?;
        validate::non_negative("interaction_count", self.interaction_count.map(|v| v as f64))?;
        validate::custom_fields(&self.custom_fields)
    }
}

impl Person {
    /// Any of the structured name parts is set.
    pub fn has_name_components(&self) -> bool {
        self.prefix.is_some() || self.first_name.is_some() || self.last_name.is_some() || self.suffix.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub suffix: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company_id: Option<i64>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub assignee_id: Option<i64>,
    #[serde(default)]
    pub contact_type_id: Option<i64>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub emails: Option<Vec<EmailAddress>>,
    #[serde(default)]
    pub phone_numbers: Option<Vec<PhoneNumber>>,
    #[serde(default)]
    pub socials: Option<Vec<Social>>,
    #[serde(default)]
    pub websites: Option<Vec<Website>>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub custom_fields: Option<Vec<CustomField>>,
}

impl Validate for PersonUpdate {
    fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate::non_empty("name", name)?;
        }
        if let Some(emails) = &self.emails {
            validate_emails(emails)?;
        }
        validate::custom_fields(self.custom_fields.as_deref().unwrap_or_default())
    }
}

fn validate_emails(emails: &[EmailAddress]) -> Result<()> {
    for e in emails {
        let trimmed = e.email.trim();
        let well_formed = trimmed
            .split_once('@')
            .map(|(local, domain)| !local.is_empty() && !domain.is_empty())
            .unwrap_or(false);
        if !well_formed {
            return Err(CopperError::invalid_value("emails", "invalid email address", json!(e.email)));
        }
    }
    Ok(())
}
