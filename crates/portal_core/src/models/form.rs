use std::collections::HashMap;

use bytes::Bytes;
use serde_json::Value;

/// Raw named fields of one submitted form, as received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    values: HashMap<String, String>,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Trimmed value of a field. Blank values read as absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Builds fields from a flat JSON object. Numbers and booleans are kept in
    /// their textual form, nested values are ignored.
    pub fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let mut fields = Self::new();
        for (name, v) in object {
            let text = match v {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => continue,
            };
            fields.insert(name.clone(), text);
        }
        Some(fields)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Self::new();
        for (k, v) in iter {
            fields.insert(k, v);
        }
        fields
    }
}

impl From<HashMap<String, String>> for FormFields {
    fn from(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

/// A file sent along with a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Lowercased extension of the original file name, if it has one.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.file_name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() || ext.contains(['/', '\\']) {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

/// Everything the validator looks at for one submission.
#[derive(Debug, Clone, Default)]
pub struct SubmissionInput {
    pub fields: FormFields,
    pub upload: Option<Upload>,
}

impl SubmissionInput {
    pub fn new(fields: FormFields, upload: Option<Upload>) -> Self {
        Self { fields, upload }
    }

    /// The upload, only when it actually carries bytes.
    pub fn attachment(&self) -> Option<&Upload> {
        self.upload.as_ref().filter(|u| !u.is_empty())
    }
}
