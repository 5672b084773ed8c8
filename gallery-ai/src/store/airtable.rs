//! Airtable content store
//!
//! Talks to the Airtable REST API (`/v0/{base}/{table}`).
//!
//! # Field Mapping
//! Bases edited by hand drift in their column names, so every logical field
//! is read through a list of accepted spellings, first match wins. JSON
//! sub-fields (analysis, metadata, content) may arrive as JSON text or as a
//! nested object; a field that fails to parse is logged and replaced by a
//! typed fallback instead of failing the whole read.

use super::{select_content, stamp_content, stamp_context, CulturalContentStore, StoreError};
use crate::models::{CulturalAnalysisResult, CulturalContext, CulturalMetadata, EducationalContent};
use crate::types::{EducationLevel, Language};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.airtable.com/v0";
const USER_AGENT: &str = concat!("gallery-ai/", env!("CARGO_PKG_VERSION"));

const ARTWORK_ID_FIELDS: &[&str] = &["Artwork ID", "artworkId", "artwork_id"];
const ANALYSIS_FIELDS: &[&str] = &["Analysis", "Cultural Analysis", "analysis"];
const METADATA_FIELDS: &[&str] = &["Metadata", "Cultural Metadata", "metadata"];
const EXPERT_FIELDS: &[&str] = &["Expert Validated", "expertValidated", "expert_validated"];
const CONTENT_FIELDS: &[&str] = &["Content", "Educational Content", "content"];
const CREATED_FIELDS: &[&str] = &["Created At", "createdAt", "created_at"];
const UPDATED_FIELDS: &[&str] = &["Updated At", "updatedAt", "updated_at"];

/// Airtable connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirtableConfig {
    /// Personal access token; prefer the environment over the config file
    pub api_key: String,
    pub base_id: String,
    pub base_url: String,
    pub contexts_table: String,
    pub content_table: String,
    pub timeout_secs: u64,
}

impl Default for AirtableConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_id: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            contexts_table: "Cultural Contexts".to_string(),
            content_table: "Educational Content".to_string(),
            timeout_secs: 30,
        }
    }
}

impl AirtableConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.base_id.trim().is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct RecordPage {
    #[serde(default)]
    records: Vec<AirtableRecord>,
    offset: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct AirtableRecord {
    id: String,
    #[serde(default)]
    fields: Map<String, Value>,
    #[serde(rename = "createdTime")]
    created_time: Option<String>,
}

/// Store backed by an Airtable base
pub struct AirtableStore {
    client: Client,
    config: AirtableConfig,
}

impl AirtableStore {
    pub fn new(config: AirtableConfig) -> Result<Self, StoreError> {
        if !config.is_configured() {
            return Err(StoreError::NotConfigured(
                "Airtable API key and base id are required".to_string(),
            ));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        Ok(Self { client, config })
    }

    fn table_url(&self, table: &str) -> Result<Url, StoreError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| StoreError::NotConfigured(format!("Airtable base url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| {
                StoreError::NotConfigured("Airtable base url cannot hold a path".to_string())
            })?
            .pop_if_empty()
            .push(&self.config.base_id)
            .push(table);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, StoreError> {
        let response = request.bearer_auth(&self.config.api_key).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }

    async fn find_record(
        &self,
        table: &str,
        artwork_id: &str,
    ) -> Result<Option<AirtableRecord>, StoreError> {
        let url = self.table_url(table)?;
        let formula = artwork_formula(artwork_id);
        debug!(table, formula = %formula, "Querying Airtable");

        let body = self
            .send(
                self.client
                    .get(url)
                    .query(&[("filterByFormula", formula.as_str()), ("maxRecords", "1")]),
            )
            .await?;
        let page: RecordPage = serde_json::from_value(body)?;
        Ok(page.records.into_iter().next())
    }

    async fn list_records(&self, table: &str) -> Result<Vec<AirtableRecord>, StoreError> {
        let url = self.table_url(table)?;
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut request = self.client.get(url.clone()).query(&[("pageSize", "100")]);
            if let Some(offset) = &offset {
                request = request.query(&[("offset", offset.as_str())]);
            }
            let page: RecordPage = serde_json::from_value(self.send(request).await?)?;
            records.extend(page.records);

            match page.offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        Ok(records)
    }

    async fn upsert(
        &self,
        table: &str,
        existing_id: Option<String>,
        fields: Value,
    ) -> Result<(), StoreError> {
        let url = self.table_url(table)?;
        let request = match existing_id {
            Some(id) => self.client.patch(url).json(&json!({
                "records": [{ "id": id, "fields": fields }],
                "typecast": true,
            })),
            None => self.client.post(url).json(&json!({
                "records": [{ "fields": fields }],
                "typecast": true,
            })),
        };
        self.send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl CulturalContentStore for AirtableStore {
    fn name(&self) -> &'static str {
        "airtable"
    }

    async fn fetch_cultural_context(
        &self,
        artwork_id: &str,
    ) -> Result<Option<CulturalContext>, StoreError> {
        let record = self
            .find_record(&self.config.contexts_table, artwork_id)
            .await?;
        Ok(record.as_ref().and_then(context_from_record))
    }

    async fn store_cultural_context(
        &self,
        context: &CulturalContext,
    ) -> Result<CulturalContext, StoreError> {
        let existing = self
            .find_record(&self.config.contexts_table, &context.artwork_id)
            .await?;
        let created = existing
            .as_ref()
            .and_then(context_from_record)
            .map(|c| c.created_at);
        let stamped = stamp_context(context, created);

        self.upsert(
            &self.config.contexts_table,
            existing.map(|r| r.id),
            context_fields(&stamped)?,
        )
        .await?;
        debug!(artwork_id = %stamped.artwork_id, "Stored cultural context in Airtable");
        Ok(stamped)
    }

    async fn list_cultural_contexts(&self) -> Result<Vec<CulturalContext>, StoreError> {
        let records = self.list_records(&self.config.contexts_table).await?;
        Ok(records.iter().filter_map(context_from_record).collect())
    }

    async fn fetch_educational_content(
        &self,
        artwork_id: &str,
        level: Option<EducationLevel>,
        language: Option<Language>,
    ) -> Result<Option<EducationalContent>, StoreError> {
        let record = self
            .find_record(&self.config.content_table, artwork_id)
            .await?;
        Ok(record
            .as_ref()
            .and_then(content_from_record)
            .and_then(|c| select_content(c, level, language)))
    }

    async fn store_educational_content(
        &self,
        content: &EducationalContent,
    ) -> Result<EducationalContent, StoreError> {
        let existing = self
            .find_record(&self.config.content_table, &content.artwork_id)
            .await?;
        let created = existing
            .as_ref()
            .and_then(content_from_record)
            .map(|c| c.created_at);
        let stamped = stamp_content(content, created);

        self.upsert(
            &self.config.content_table,
            existing.map(|r| r.id),
            content_fields(&stamped)?,
        )
        .await?;
        debug!(
            artwork_id = %stamped.artwork_id,
            content_id = %stamped.id,
            "Stored educational content in Airtable"
        );
        Ok(stamped)
    }
}

// ============================================================================
// Record mapping
// ============================================================================

fn context_from_record(record: &AirtableRecord) -> Option<CulturalContext> {
    let fields = &record.fields;
    let Some(artwork_id) = string_field(fields, ARTWORK_ID_FIELDS) else {
        warn!(record_id = %record.id, "Airtable record without artwork id, skipping");
        return None;
    };
    let Some(analysis) = parse_json_field::<CulturalAnalysisResult>(fields, ANALYSIS_FIELDS) else {
        warn!(
            record_id = %record.id,
            artwork_id = %artwork_id,
            "Airtable record without usable analysis, skipping"
        );
        return None;
    };

    let metadata = parse_json_field::<CulturalMetadata>(fields, METADATA_FIELDS)
        .unwrap_or_else(|| CulturalMetadata::from_analysis(&analysis));
    let created_at = timestamp_field(fields, CREATED_FIELDS)
        .or_else(|| record.created_time.as_deref().and_then(parse_timestamp))
        .unwrap_or(analysis.created_at);
    let updated_at = timestamp_field(fields, UPDATED_FIELDS).unwrap_or(created_at);

    Some(CulturalContext {
        artwork_id,
        analysis,
        metadata,
        expert_validated: bool_field(fields, EXPERT_FIELDS),
        created_at,
        updated_at,
    })
}

fn context_fields(context: &CulturalContext) -> Result<Value, StoreError> {
    Ok(json!({
        (ARTWORK_ID_FIELDS[0]): context.artwork_id,
        (ANALYSIS_FIELDS[0]): serde_json::to_string(&context.analysis)?,
        (METADATA_FIELDS[0]): serde_json::to_string(&context.metadata)?,
        (EXPERT_FIELDS[0]): context.expert_validated,
        "Tags": context.metadata.tags.join(", "),
        "Recommended Level": context.metadata.recommended_level.as_str(),
        "Cultural Significance": context.metadata.cultural_significance,
        (CREATED_FIELDS[0]): context.created_at.to_rfc3339(),
        (UPDATED_FIELDS[0]): context.updated_at.to_rfc3339(),
    }))
}

fn content_from_record(record: &AirtableRecord) -> Option<EducationalContent> {
    let content = parse_json_field::<EducationalContent>(&record.fields, CONTENT_FIELDS);
    if content.is_none() {
        warn!(
            record_id = %record.id,
            "Airtable record without usable educational content, skipping"
        );
    }
    content
}

fn content_fields(content: &EducationalContent) -> Result<Value, StoreError> {
    let levels: Vec<&str> = content.level_content.iter().map(|l| l.level.as_str()).collect();
    let languages: Vec<&str> = content.languages.iter().map(|l| l.as_str()).collect();
    Ok(json!({
        (ARTWORK_ID_FIELDS[0]): content.artwork_id,
        "Content ID": content.id.to_string(),
        (CONTENT_FIELDS[0]): serde_json::to_string(content)?,
        "Levels": levels.join(", "),
        "Languages": languages.join(", "),
        (CREATED_FIELDS[0]): content.created_at.to_rfc3339(),
        (UPDATED_FIELDS[0]): content.updated_at.to_rfc3339(),
    }))
}

/// Formula matching records whose artwork id equals `artwork_id`
fn artwork_formula(artwork_id: &str) -> String {
    let escaped = artwork_id.replace('\\', "\\\\").replace('\'', "\\'");
    format!("{{{}}} = '{}'", ARTWORK_ID_FIELDS[0], escaped)
}

fn field<'a>(fields: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| fields.get(*name))
        .find(|value| !value.is_null())
}

fn string_field(fields: &Map<String, Value>, names: &[&str]) -> Option<String> {
    match field(fields, names)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn bool_field(fields: &Map<String, Value>, names: &[&str]) -> bool {
    match field(fields, names) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(s.trim().to_lowercase().as_str(), "true" | "yes" | "1"),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    }
}

fn timestamp_field(fields: &Map<String, Value>, names: &[&str]) -> Option<DateTime<Utc>> {
    string_field(fields, names).as_deref().and_then(parse_timestamp)
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Parse a JSON sub-field given as JSON text or a nested value
///
/// Parse failures are logged and yield `None`.
fn parse_json_field<T: DeserializeOwned>(fields: &Map<String, Value>, names: &[&str]) -> Option<T> {
    let value = field(fields, names)?;
    let parsed = match value {
        Value::String(text) => serde_json::from_str(text),
        other => serde_json::from_value(other.clone()),
    };
    match parsed {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!(field = names[0], error = %e, "Malformed JSON field in Airtable record");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn record(fields: Value) -> AirtableRecord {
        AirtableRecord {
            id: "rec1".to_string(),
            fields: fields.as_object().cloned().unwrap_or_default(),
            created_time: Some("2024-03-01T00:00:00.000Z".to_string()),
        }
    }

    #[test]
    fn test_formula_escapes_quotes() {
        assert_eq!(artwork_formula("a1"), "{Artwork ID} = 'a1'");
        assert_eq!(artwork_formula("it's"), "{Artwork ID} = 'it\\'s'");
    }

    #[test]
    fn test_field_name_fallbacks() {
        let fields = json!({ "artworkId": "a7", "expert_validated": "yes" });
        let fields = fields.as_object().unwrap();
        assert_eq!(string_field(fields, ARTWORK_ID_FIELDS).as_deref(), Some("a7"));
        assert!(bool_field(fields, EXPERT_FIELDS));
    }

    #[test]
    fn test_context_from_record_with_nested_analysis() {
        let analysis = CulturalAnalysisResult::new(Uuid::new_v4(), "a1");
        let rec = record(json!({
            "Artwork ID": "a1",
            "analysis": serde_json::to_value(&analysis).unwrap(),
            "Metadata": "{not json",
        }));

        let context = context_from_record(&rec).unwrap();
        assert_eq!(context.artwork_id, "a1");
        assert_eq!(context.analysis, analysis);
        // Malformed metadata falls back to metadata derived from the analysis
        assert_eq!(context.metadata, CulturalMetadata::from_analysis(&analysis));
        assert_eq!(context.created_at, parse_timestamp("2024-03-01T00:00:00Z").unwrap());
        assert!(!context.expert_validated);
    }

    #[test]
    fn test_record_without_analysis_is_skipped() {
        let rec = record(json!({ "Artwork ID": "a1", "Analysis": "[]" }));
        assert!(context_from_record(&rec).is_none());
    }

    #[test]
    fn test_new_requires_credentials() {
        assert!(matches!(
            AirtableStore::new(AirtableConfig::default()),
            Err(StoreError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_table_url_encodes_name() {
        let store = AirtableStore::new(AirtableConfig {
            api_key: "key".into(),
            base_id: "app123".into(),
            ..Default::default()
        })
        .unwrap();
        let url = store.table_url("Cultural Contexts").unwrap();
        assert_eq!(url.as_str(), "https://api.airtable.com/v0/app123/Cultural%20Contexts");
    }
}
