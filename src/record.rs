// src/record.rs
//
// One scraped unit (a job listing, a company profile, ...) as a
// field-name → value map, plus identity key extraction.

use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    pub fn new() -> Self { Self::default() }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn contains(&self, field: &str) -> bool { self.fields.contains_key(field) }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize { self.fields.len() }
    pub fn is_empty(&self) -> bool { self.fields.is_empty() }

    /// Zip a header row with a data row. Cells past the header are dropped;
    /// a short row simply lacks the trailing fields.
    pub fn from_row<H, C>(headers: H, cells: C) -> Self
    where
        H: IntoIterator,
        H::Item: AsRef<str>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        headers
            .into_iter()
            .zip(cells)
            .map(|(h, c)| (s!(h.as_ref()), s!(c.as_ref())))
            .collect()
    }

    /// Project onto `schema` order; absent fields become empty cells.
    pub fn to_row(&self, schema: &[String]) -> Vec<String> {
        schema
            .iter()
            .map(|f| self.get(f).map(str::to_owned).unwrap_or_default())
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut r = Record::new();
        for (k, v) in iter {
            r.set(k, v);
        }
        r
    }
}

/* ---------------- Identity ---------------- */

/// Ordered tuple of key-field values. Only ever built fully populated.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IdentityKey(Vec<String>);

impl IdentityKey {
    pub fn parts(&self) -> &[String] { &self.0 }
}

impl<S: Into<String>> FromIterator<S> for IdentityKey {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        IdentityKey(iter.into_iter().map(Into::into).collect())
    }
}

/// The fixed, ordered set of fields that identifies a record, plus the
/// placeholder strings that count as "no value" when building a key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyFields {
    fields: Vec<String>,
    missing_markers: Vec<String>,
}

impl KeyFields {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            missing_markers: Vec::new(),
        }
    }

    pub fn with_missing_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.missing_markers = markers.into_iter().map(Into::into).collect();
        self
    }

    pub fn fields(&self) -> &[String] { &self.fields }

    fn is_missing(&self, value: &str) -> bool {
        let v = value.trim();
        v.is_empty() || self.missing_markers.iter().any(|m| m == v)
    }

    /// `None` means the record is unkeyable: some key field is absent,
    /// blank, or a placeholder.
    pub fn key_of(&self, record: &Record) -> Option<IdentityKey> {
        let mut parts = Vec::with_capacity(self.fields.len());
        for f in &self.fields {
            let v = record.get(f)?;
            if self.is_missing(v) {
                return None;
            }
            parts.push(s!(v));
        }
        Some(IdentityKey(parts))
    }
}
