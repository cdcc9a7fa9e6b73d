//! Typed records for each pipeline stage.
//!
//! `RawRecord` is what the export gives us, `CleanedFields` is what the cleaner
//! derives from it, `CleanedRecord` is a cleaned and scored record that passed
//! the quality threshold.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{PipelineError, RecordError, Result};

/// Required fields with the names the MongoDB export uses for them.
const REQUIRED: &[(&str, &[&str])] = &[
    ("title", &["title", "Title"]),
    ("content", &["content", "Content", "Text"]),
    ("url", &["url", "Url"]),
];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecord {
    #[serde(default, rename = "_id", alias = "id", deserialize_with = "de_id")]
    pub id: Option<String>,
    #[serde(alias = "Title")]
    pub title: String,
    #[serde(alias = "Text", alias = "Content")]
    pub content: String,
    #[serde(alias = "Url")]
    pub url: String,
    #[serde(default, alias = "Tags", deserialize_with = "de_string_list")]
    pub tags: Vec<String>,
    #[serde(default, alias = "Description")]
    pub description: Option<String>,
    #[serde(default, alias = "Properties", deserialize_with = "de_null_default")]
    pub properties: Vec<Property>,
    #[serde(default, alias = "PublishDate", deserialize_with = "de_date")]
    pub publish_date: Option<String>,
    /// Everything else in the source object, kept but not interpreted.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawRecord {
    pub fn new(title: impl Into<String>, content: impl Into<String>, url: impl Into<String>) -> Self {
        RawRecord {
            title: title.into(),
            content: content.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// SEO property entry (`{"IxName": "SeoTitle", "Value": "..."}`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Property {
    #[serde(default, alias = "IxName")]
    pub ix_name: String,
    #[serde(default, alias = "Value", deserialize_with = "de_null_default")]
    pub value: String,
}

/// Output of the cleaner. Always produced, even when the content is empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanedFields {
    pub title: String,
    pub description: String,
    pub url: String,
    pub dream_symbol: String,
    pub cleaned_content: String,
    pub tags: Vec<String>,
    pub seo_title: String,
    pub seo_description: String,
    pub original_length: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedRecord {
    pub original_id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub dream_symbol: String,
    pub cleaned_content: String,
    pub tags: Vec<String>,
    pub seo_title: String,
    pub seo_description: String,
    pub publish_date: String,
    pub original_length: usize,
    pub cleaned_length: usize,
    pub quality_score: u8,
    pub cultural_context_score: usize,
}

impl CleanedRecord {
    pub fn from_fields(
        original_id: String,
        publish_date: String,
        fields: CleanedFields,
        quality_score: u8,
        cultural_context_score: usize,
    ) -> Self {
        let cleaned_length = fields.cleaned_content.chars().count();
        CleanedRecord {
            original_id,
            title: fields.title,
            description: fields.description,
            url: fields.url,
            dream_symbol: fields.dream_symbol,
            cleaned_content: fields.cleaned_content,
            tags: fields.tags,
            seo_title: fields.seo_title,
            seo_description: fields.seo_description,
            publish_date,
            original_length: fields.original_length,
            cleaned_length,
            quality_score,
            cultural_context_score,
        }
    }
}

// ── Validation at the input boundary ──

#[derive(Debug, Clone, Copy)]
pub struct ValidationPolicy {
    pub strict: bool,
    pub max_errors: usize,
}

#[derive(Debug, Default)]
pub struct ValidatedInput {
    /// Number of elements in the input array, valid or not.
    pub total: usize,
    pub records: Vec<RawRecord>,
    pub errors: Vec<RecordError>,
}

/// Turn a parsed JSON document into typed records.
///
/// Invalid elements are reported and skipped. In strict mode, more than
/// `max_errors` invalid elements abort the run.
pub fn validate_records(doc: Value, policy: &ValidationPolicy) -> Result<ValidatedInput> {
    let items = match doc {
        Value::Array(items) => items,
        other => {
            return Err(PipelineError::NotAnArray {
                found: json_kind(&other),
            })
        }
    };

    let mut out = ValidatedInput {
        total: items.len(),
        ..Default::default()
    };
    for (index, item) in items.into_iter().enumerate() {
        match validate_one(index, item) {
            Ok(record) => out.records.push(record),
            Err(e) => {
                warn!(%e, "invalid input record");
                out.errors.push(e);
            }
        }
    }

    if policy.strict && out.errors.len() > policy.max_errors {
        return Err(PipelineError::Validation {
            errors: out.errors.len(),
            limit: policy.max_errors,
        });
    }
    Ok(out)
}

fn validate_one(index: usize, item: Value) -> std::result::Result<RawRecord, RecordError> {
    let Value::Object(ref obj) = item else {
        return Err(RecordError::Malformed {
            index,
            reason: format!("expected an object, got {}", json_kind(&item)),
        });
    };
    for (field, names) in REQUIRED {
        let present = names
            .iter()
            .any(|n| matches!(obj.get(*n), Some(Value::String(_))));
        if !present {
            return Err(RecordError::MissingField { index, field });
        }
    }
    let mut record: RawRecord = serde_json::from_value(item).map_err(|e| RecordError::Malformed {
        index,
        reason: e.to_string(),
    })?;
    record.id.get_or_insert_with(|| index.to_string());
    Ok(record)
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ── Lenient field decoders ──

fn de_id<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Plain(String),
        Number(i64),
        Oid {
            #[serde(rename = "$oid")]
            oid: String,
        },
        Other(Value),
    }
    Ok(match Option::<Id>::deserialize(d)? {
        Some(Id::Plain(s)) | Some(Id::Oid { oid: s }) => Some(s).filter(|s| !s.is_empty()),
        Some(Id::Number(n)) => Some(n.to_string()),
        Some(Id::Other(_)) | None => None,
    })
}

fn de_date<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Object(obj)) => match obj.get("$date") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        },
        _ => None,
    })
}

fn de_string_list<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Vec<String>, D::Error> {
    Ok(match Option::<Vec<Value>>::deserialize(d)? {
        Some(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        None => Vec::new(),
    })
}

fn de_null_default<'de, D, T>(d: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}
