use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ConfigurationError;

/// Named inputs on the lead form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadField {
    Name,
    Email,
    Phone,
    Suburb,
    Message,
}

impl LeadField {
    pub const ALL: [LeadField; 5] = [
        LeadField::Name,
        LeadField::Email,
        LeadField::Phone,
        LeadField::Suburb,
        LeadField::Message,
    ];

    pub const REQUIRED: [LeadField; 4] = [
        LeadField::Name,
        LeadField::Email,
        LeadField::Phone,
        LeadField::Suburb,
    ];

    /// Wire and form-control name.
    pub fn key(self) -> &'static str {
        match self {
            LeadField::Name => "name",
            LeadField::Email => "email",
            LeadField::Phone => "phone",
            LeadField::Suburb => "suburb",
            LeadField::Message => "message",
        }
    }

    /// Caption shown next to the input.
    pub fn label(self) -> &'static str {
        match self {
            LeadField::Name => "Full Name",
            LeadField::Email => "Email Address",
            LeadField::Phone => "Phone Number",
            LeadField::Suburb => "Suburb / Location",
            LeadField::Message => "What do you need help with?",
        }
    }
}

impl fmt::Display for LeadField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for LeadField {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        LeadField::ALL
            .into_iter()
            .find(|field| field.key() == value)
            .ok_or_else(|| ConfigurationError::UnknownField(value.to_string()))
    }
}

/// Services a visitor can pick for the optional `message` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceCategory {
    Buying,
    Selling,
    Renting,
    PropertyManagement,
    Other,
}

impl ServiceCategory {
    pub const ALL: [ServiceCategory; 5] = [
        ServiceCategory::Buying,
        ServiceCategory::Selling,
        ServiceCategory::Renting,
        ServiceCategory::PropertyManagement,
        ServiceCategory::Other,
    ];

    /// Value stored in the `message` field.
    pub fn value(self) -> &'static str {
        match self {
            ServiceCategory::Buying => "Buying",
            ServiceCategory::Selling => "Selling",
            ServiceCategory::Renting => "Renting",
            ServiceCategory::PropertyManagement => "Property Management",
            ServiceCategory::Other => "Other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ServiceCategory::Buying => "Buying a property",
            ServiceCategory::Selling => "Selling a property",
            ServiceCategory::Renting => "Renting a property",
            ServiceCategory::PropertyManagement => "Property Management",
            ServiceCategory::Other => "Other",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        ServiceCategory::ALL
            .into_iter()
            .find(|category| category.value() == value)
    }
}

/// The lead being composed. Serializes to exactly the five backend keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub suburb: String,
    #[serde(default)]
    pub message: String,
}

impl LeadForm {
    pub fn get(&self, field: LeadField) -> &str {
        match field {
            LeadField::Name => &self.name,
            LeadField::Email => &self.email,
            LeadField::Phone => &self.phone,
            LeadField::Suburb => &self.suburb,
            LeadField::Message => &self.message,
        }
    }

    fn slot_mut(&mut self, field: LeadField) -> &mut String {
        match field {
            LeadField::Name => &mut self.name,
            LeadField::Email => &mut self.email,
            LeadField::Phone => &mut self.phone,
            LeadField::Suburb => &mut self.suburb,
            LeadField::Message => &mut self.message,
        }
    }

    pub fn is_empty(&self) -> bool {
        LeadField::ALL
            .into_iter()
            .all(|field| self.get(field).is_empty())
    }
}

/// Holds captured values. Validation is deferred to submission time.
#[derive(Debug, Clone, Default)]
pub struct FieldStore {
    form: LeadForm,
}

impl FieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> &LeadForm {
        &self.form
    }

    pub fn set(&mut self, field: LeadField, value: impl Into<String>) {
        *self.form.slot_mut(field) = value.into();
    }

    /// Applies an edit addressed by form-control name.
    pub fn set_field(
        &mut self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<LeadField, ConfigurationError> {
        let field = name.parse::<LeadField>()?;
        self.set(field, value);
        Ok(field)
    }

    pub fn missing_fields(&self) -> Vec<LeadField> {
        LeadField::REQUIRED
            .into_iter()
            .filter(|field| self.form.get(*field).trim().is_empty())
            .collect()
    }

    pub fn is_ready_for_submission(&self) -> bool {
        self.missing_fields().is_empty()
    }

    pub fn reset(&mut self) {
        self.form = LeadForm::default();
    }
}
