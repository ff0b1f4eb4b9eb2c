//! Typed person payloads
//!
//! Create and update bodies arrive as JSON objects. They are checked
//! against the closed set of [`PersonField`]s first (unknown names are
//! rejected), then each value is checked for its expected JSON type.

use serde_json::{Map, Value};

use crate::enrichment::Attributes;
use crate::error::{ServiceError, ServiceResult};
use crate::query::SqlArg;

/// The mutable person fields; `id` is never writable
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PersonField {
    Name,
    Surname,
    Patronymic,
    Age,
    Gender,
    Nationality,
}

impl PersonField {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "name" => Some(PersonField::Name),
            "surname" => Some(PersonField::Surname),
            "patronymic" => Some(PersonField::Patronymic),
            "age" => Some(PersonField::Age),
            "gender" => Some(PersonField::Gender),
            "nationality" => Some(PersonField::Nationality),
            _ => None,
        }
    }

    /// Column name in the `people` table
    pub fn column(self) -> &'static str {
        match self {
            PersonField::Name => "name",
            PersonField::Surname => "surname",
            PersonField::Patronymic => "patronymic",
            PersonField::Age => "age",
            PersonField::Gender => "gender",
            PersonField::Nationality => "nationality",
        }
    }
}

/// A partial set of person fields, each already type-checked
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonPatch {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub patronymic: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub nationality: Option<String>,
}

impl PersonPatch {
    /// Validate a JSON object into a patch
    ///
    /// Fails with `InvalidField` for any key outside the allow-list
    /// (checked for every key before any value is inspected), then with
    /// `TypeMismatch` for the first value of the wrong type.
    pub fn from_json(payload: &Map<String, Value>) -> ServiceResult<Self> {
        let fields = payload
            .iter()
            .map(|(key, value)| {
                PersonField::parse(key)
                    .map(|field| (field, value))
                    .ok_or_else(|| ServiceError::InvalidField(key.clone()))
            })
            .collect::<ServiceResult<Vec<_>>>()?;

        let mut patch = Self::default();
        for (field, value) in fields {
            match field {
                PersonField::Name => patch.name = Some(expect_text(field, value)?),
                PersonField::Surname => patch.surname = Some(expect_text(field, value)?),
                PersonField::Patronymic => patch.patronymic = Some(expect_text(field, value)?),
                PersonField::Age => patch.age = Some(expect_age(value)?),
                PersonField::Gender => patch.gender = Some(expect_text(field, value)?),
                PersonField::Nationality => patch.nationality = Some(expect_text(field, value)?),
            }
        }

        Ok(patch)
    }

    pub fn is_empty(&self) -> bool {
        self.assignments().is_empty()
    }

    /// `(column, value)` pairs for the fields that are set, in field order
    pub fn assignments(&self) -> Vec<(&'static str, SqlArg)> {
        let text = |field: PersonField, value: &Option<String>| {
            value
                .as_ref()
                .map(|v| (field.column(), SqlArg::Text(v.clone())))
        };

        [
            text(PersonField::Name, &self.name),
            text(PersonField::Surname, &self.surname),
            text(PersonField::Patronymic, &self.patronymic),
            self.age
                .map(|age| (PersonField::Age.column(), SqlArg::Int(age))),
            text(PersonField::Gender, &self.gender),
            text(PersonField::Nationality, &self.nationality),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// A person ready to be inserted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPerson {
    pub name: String,
    pub surname: String,
    pub patronymic: String,
    pub age: i64,
    pub gender: String,
    pub nationality: String,
}

impl NewPerson {
    /// Build from a validated patch; `name` and `surname` must be present
    pub fn from_patch(patch: PersonPatch) -> ServiceResult<Self> {
        Ok(Self {
            name: patch.name.ok_or(ServiceError::MissingField("name"))?,
            surname: patch.surname.ok_or(ServiceError::MissingField("surname"))?,
            patronymic: patch.patronymic.unwrap_or_default(),
            age: patch.age.unwrap_or_default(),
            gender: patch.gender.unwrap_or_default(),
            nationality: patch.nationality.unwrap_or_default(),
        })
    }

    /// Overwrite the inferable attributes with enrichment results
    pub fn apply(&mut self, attributes: Attributes) {
        self.age = attributes.age;
        self.gender = attributes.gender;
        self.nationality = attributes.nationality;
    }
}

fn expect_text(field: PersonField, value: &Value) -> ServiceResult<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ServiceError::TypeMismatch(field.column().to_string()))
}

/// Non-negative JSON integer
fn expect_age(value: &Value) -> ServiceResult<i64> {
    value
        .as_i64()
        .filter(|age| *age >= 0)
        .ok_or_else(|| ServiceError::TypeMismatch(PersonField::Age.column().to_string()))
}
