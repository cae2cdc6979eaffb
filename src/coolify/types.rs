//! Coolify API wire types
//!
//! Coolify is loose about nulls and number encodings across versions, so
//! scalar fields go through the lenient helpers in [`de`].

use serde::{Deserialize, Serialize};

/// Application as returned by list endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Application {
    #[serde(deserialize_with = "de::lenient_i64")]
    pub id: i64,
    #[serde(deserialize_with = "de::nullable_string")]
    pub uuid: String,
    #[serde(deserialize_with = "de::nullable_string")]
    pub name: String,
    pub fqdn: Option<String>,
    #[serde(deserialize_with = "de::nullable_string")]
    pub status: String,
}

/// Full application record from the detail endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationDetail {
    #[serde(deserialize_with = "de::lenient_i64")]
    pub id: i64,
    #[serde(deserialize_with = "de::nullable_string")]
    pub uuid: String,
    #[serde(deserialize_with = "de::nullable_string")]
    pub name: String,
    pub fqdn: Option<String>,
    #[serde(deserialize_with = "de::nullable_string")]
    pub status: String,
    pub description: Option<String>,
    pub git_repository: Option<String>,
    pub git_branch: Option<String>,
    pub docker_registry_image_name: Option<String>,
    pub dockerfile: Option<String>,
    pub build_pack: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub environment: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ApplicationLogs {
    #[serde(deserialize_with = "de::nullable_string")]
    pub logs: String,
}

/// Environment variable attached to an application
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentVariable {
    #[serde(deserialize_with = "de::lenient_i64")]
    pub id: i64,
    #[serde(deserialize_with = "de::nullable_string")]
    pub uuid: String,
    pub resourceable_type: Option<String>,
    #[serde(deserialize_with = "de::lenient_i64")]
    pub resourceable_id: i64,
    pub is_build_time: bool,
    pub is_literal: bool,
    pub is_multiline: bool,
    pub is_preview: bool,
    pub is_shared: bool,
    pub is_shown_once: bool,
    #[serde(deserialize_with = "de::nullable_string")]
    pub key: String,
    pub value: Option<String>,
    pub real_value: Option<String>,
    pub version: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Response to start and restart actions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartDeployment {
    #[serde(deserialize_with = "de::nullable_string")]
    pub message: String,
    pub deployment_uuid: Option<String>,
}

/// Response to actions that only acknowledge with a message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionMessage {
    #[serde(deserialize_with = "de::nullable_string")]
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Deployment {
    #[serde(deserialize_with = "de::nullable_string")]
    pub uuid: String,
    pub deployment_uuid: Option<String>,
    #[serde(deserialize_with = "de::nullable_string")]
    pub status: String,
    pub commit: Option<String>,
    pub branch: Option<String>,
    pub commit_message: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    #[serde(deserialize_with = "de::lenient_i64")]
    pub application_id: i64,
    pub application: Option<String>,
    pub application_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Environment {
    #[serde(deserialize_with = "de::lenient_i64")]
    pub id: i64,
    pub uuid: Option<String>,
    #[serde(deserialize_with = "de::nullable_string")]
    pub name: String,
    pub description: Option<String>,
    #[serde(deserialize_with = "de::lenient_i64")]
    pub project_id: i64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Database {
    #[serde(deserialize_with = "de::lenient_i64")]
    pub id: i64,
    #[serde(deserialize_with = "de::nullable_string")]
    pub uuid: String,
    #[serde(deserialize_with = "de::nullable_string")]
    pub name: String,
    #[serde(deserialize_with = "de::nullable_string")]
    pub status: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub database_type: Option<String>,
    pub host: Option<String>,
    #[serde(deserialize_with = "de::optional_string")]
    pub port: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Pagination metadata. All zero when the server sent none.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    #[serde(deserialize_with = "de::lenient_u32")]
    pub current_page: u32,
    #[serde(deserialize_with = "de::lenient_u32")]
    pub last_page: u32,
    #[serde(deserialize_with = "de::lenient_u32")]
    pub per_page: u32,
    #[serde(deserialize_with = "de::lenient_u32")]
    pub total: u32,
}

impl Pagination {
    pub fn is_empty(&self) -> bool {
        *self == Pagination::default()
    }
}

/// Which wire shape a page was decoded from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageShape {
    #[default]
    Envelope,
    BareArray,
}

/// A decoded list response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
    pub shape: PageShape,
}

impl<T> Page<T> {
    pub fn results(&self) -> &[T] {
        &self.items
    }

    pub fn page_info(&self) -> Pagination {
        self.pagination
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            pagination: Pagination::default(),
            shape: PageShape::Envelope,
        }
    }
}

/// Lenient field deserializers
pub(crate) mod de {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn as_i64(value: &Value) -> Option<i64> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Number, numeric string or null; anything unusable becomes 0
    pub fn lenient_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value
            .as_ref()
            .and_then(as_i64)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0))
    }

    pub fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(as_i64).unwrap_or(0))
    }

    /// Null becomes an empty string; numbers and bools are stringified
    pub fn nullable_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(optional_string(deserializer)?.unwrap_or_default())
    }

    pub fn optional_string<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Bool(b)) => Some(b.to_string()),
            Some(other) => Some(other.to_string()),
        })
    }

    /// Null becomes the type's default
    pub fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Default,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }
}
