use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::entity::ParentType;

/// Treat an explicit `null` the same as a missing field.
pub(crate) fn nullable<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

/// A categorised contact value (email, phone number, website).
pub trait ContactMethod {
    fn category(&self) -> Option<&str>;
    fn value(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailAddress {
    pub email: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl ContactMethod for EmailAddress {
    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn value(&self) -> &str {
        &self.email
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneNumber {
    #[serde(alias = "phone")]
    pub number: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl ContactMethod for PhoneNumber {
    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn value(&self) -> &str {
        &self.number
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Social {
    pub url: String,
    #[serde(default)]
    pub category: Option<String>,
}

/// Website entry; older payloads send bare URL strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WebsiteRepr")]
pub struct Website {
    pub url: String,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WebsiteRepr {
    Url(String),
    Entry {
        url: String,
        #[serde(default)]
        category: Option<String>,
    },
}

impl From<WebsiteRepr> for Website {
    fn from(repr: WebsiteRepr) -> Self {
        match repr {
            WebsiteRepr::Url(url) => Website { url, category: None },
            WebsiteRepr::Entry { url, category } => Website { url, category },
        }
    }
}

impl ContactMethod for Website {
    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn value(&self) -> &str {
        &self.url
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomField {
    pub custom_field_definition_id: i64,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityType {
    /// `user` or `system`.
    pub category: String,
    pub id: i64,
}

/// Typed pointer at another record, e.g. an activity's parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentRef {
    #[serde(rename = "type")]
    pub kind: ParentType,
    pub id: i64,
}
