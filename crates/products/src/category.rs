use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tillpoint_core::validation::{require_text, REQUIRED};
use tillpoint_core::{CategoryId, Draft, DomainResult, Editable, Entity, FieldErrors};

pub const NAME_MAX_LEN: usize = 225;

/// Product grouping. Products may belong to any number of categories.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    id: CategoryId,
    #[serde(flatten)]
    fields: CategoryFields,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryFields {
    pub name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryDraft {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

impl Category {
    pub fn name(&self) -> &str {
        &self.fields.name
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn is_active(&self) -> bool {
        self.fields.is_active
    }
}

impl Editable for Category {
    type Fields = CategoryFields;
    type Draft = CategoryDraft;

    fn validate(fields: &CategoryFields) -> FieldErrors {
        let mut errors = FieldErrors::new();
        require_text(&mut errors, "name", &fields.name, NAME_MAX_LEN);
        errors
    }

    fn create(id: CategoryId, fields: CategoryFields, now: DateTime<Utc>) -> DomainResult<Self> {
        Self::validate(&fields).into_result()?;
        Ok(Self {
            id,
            fields,
            created_at: now,
            updated_at: now,
        })
    }

    fn fields(&self) -> CategoryFields {
        self.fields.clone()
    }

    fn replace(&mut self, fields: CategoryFields, now: DateTime<Utc>) -> DomainResult<()> {
        Self::validate(&fields).into_result()?;
        self.fields = fields;
        self.updated_at = now;
        Ok(())
    }
}

impl Draft for CategoryDraft {
    type Fields = CategoryFields;

    fn complete(self) -> DomainResult<CategoryFields> {
        let Some(name) = self.name else {
            return Err(FieldErrors::single("name", REQUIRED).into());
        };
        Ok(CategoryFields {
            name: name.trim().to_string(),
            is_active: self.is_active.unwrap_or(true),
        })
    }

    fn overlay(self, base: CategoryFields) -> CategoryFields {
        CategoryFields {
            name: self.name.map(|s| s.trim().to_string()).unwrap_or(base.name),
            is_active: self.is_active.unwrap_or(base.is_active),
        }
    }
}
