use std::{collections::BTreeMap, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{error::ValidationError, types::PrecinctId};

static EMAIL: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

/// Message from the precinct popup's contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub precinct_number: PrecinctId,
    pub sender_name: String,
    pub sender_email: String,
    pub message: String,
    /// Sender wants to become the precinct's PCO rather than reach the current one.
    #[serde(default)]
    pub is_become_pco: bool,
}

impl ContactMessage {
    /// Trim every field, then check it can be submitted.
    pub fn validated(mut self) -> Result<Self, ValidationError> {
        self.sender_name = self.sender_name.trim().to_string();
        self.sender_email = self.sender_email.trim().to_string();
        self.message = self.message.trim().to_string();
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.precinct_number.is_geographic() {
            return Err(ValidationError::InvalidPrecinct(self.precinct_number.to_string()));
        }
        for (field, value) in [
            ("sender_name", &self.sender_name),
            ("sender_email", &self.sender_email),
            ("message", &self.message),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField(field));
            }
        }
        if !is_email(self.sender_email.trim()) {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(())
    }
}

fn is_email(text: &str) -> bool {
    EMAIL.as_ref().is_some_and(|re| re.is_match(text))
}

/// Coordinator on record for one precinct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcoRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub precinct_name: String,
    #[serde(default)]
    pub has_pco: bool,
}

impl PcoRecord {
    pub fn is_filled(&self) -> bool {
        self.has_pco || !self.name.trim().is_empty() || !self.email.trim().is_empty()
    }
}

/// PCO records keyed by precinct. Precinct 0 is never listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PcoDirectory {
    records: BTreeMap<PrecinctId, PcoRecord>,
}

impl PcoDirectory {
    pub fn new(records: impl IntoIterator<Item = (PrecinctId, PcoRecord)>) -> Self {
        Self {
            records: records.into_iter().filter(|(id, _)| id.is_geographic()).collect(),
        }
    }

    pub fn get(&self, id: &PrecinctId) -> Option<&PcoRecord> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Precincts without a coordinator, for recruiting.
    pub fn vacancies(&self) -> impl Iterator<Item = &PrecinctId> {
        self.records.iter().filter(|(_, r)| !r.is_filled()).map(|(id, _)| id)
    }
}

impl<'de> Deserialize<'de> for PcoDirectory {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let records = BTreeMap::<PrecinctId, PcoRecord>::deserialize(deserializer)?;
        Ok(Self::new(records))
    }
}

impl Serialize for PcoDirectory {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.records.serialize(serializer)
    }
}
