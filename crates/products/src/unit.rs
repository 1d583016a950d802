use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tillpoint_core::validation::{check_max_len, require_text, REQUIRED};
use tillpoint_core::{Draft, DomainResult, Editable, Entity, FieldErrors, UnitId};

pub const NAME_MAX_LEN: usize = 75;
pub const SHORT_NAME_MAX_LEN: usize = 25;

/// Unit of measure a product is stocked and sold in (e.g. "Kilogram" / "kg").
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unit {
    id: UnitId,
    #[serde(flatten)]
    fields: UnitFields,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitFields {
    pub name: String,
    pub short_name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnitDraft {
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub is_active: Option<bool>,
}

impl Unit {
    pub fn name(&self) -> &str {
        &self.fields.name
    }

    pub fn short_name(&self) -> &str {
        &self.fields.short_name
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Entity for Unit {
    type Id = UnitId;

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

impl Editable for Unit {
    type Fields = UnitFields;
    type Draft = UnitDraft;

    fn validate(fields: &UnitFields) -> FieldErrors {
        let mut errors = FieldErrors::new();
        require_text(&mut errors, "name", &fields.name, NAME_MAX_LEN);
        check_max_len(&mut errors, "short_name", &fields.short_name, SHORT_NAME_MAX_LEN);
        errors
    }

    fn create(id: UnitId, fields: UnitFields, now: DateTime<Utc>) -> DomainResult<Self> {
        Self::validate(&fields).into_result()?;
        Ok(Self {
            id,
            fields,
            created_at: now,
            updated_at: now,
        })
    }

    fn fields(&self) -> UnitFields {
        self.fields.clone()
    }

    fn replace(&mut self, fields: UnitFields, now: DateTime<Utc>) -> DomainResult<()> {
        Self::validate(&fields).into_result()?;
        self.fields = fields;
        self.updated_at = now;
        Ok(())
    }
}

impl Draft for UnitDraft {
    type Fields = UnitFields;

    fn complete(self) -> DomainResult<UnitFields> {
        let Some(name) = self.name else {
            return Err(FieldErrors::single("name", REQUIRED).into());
        };
        Ok(UnitFields {
            name: name.trim().to_string(),
            short_name: self.short_name.map(|s| s.trim().to_string()).unwrap_or_default(),
            is_active: self.is_active.unwrap_or(true),
        })
    }

    fn overlay(self, base: UnitFields) -> UnitFields {
        UnitFields {
            name: self.name.map(|s| s.trim().to_string()).unwrap_or(base.name),
            short_name: self
                .short_name
                .map(|s| s.trim().to_string())
                .unwrap_or(base.short_name),
            is_active: self.is_active.unwrap_or(base.is_active),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tillpoint_core::DomainError;

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn kilogram() -> Unit {
        let fields = UnitDraft {
            name: Some("Kilogram".to_string()),
            short_name: Some("kg".to_string()),
            is_active: None,
        }
        .complete()
        .unwrap();
        Unit::create(UnitId::new(), fields, test_time()).unwrap()
    }

    #[test]
    fn create_defaults_to_active() {
        let unit = kilogram();
        assert_eq!(unit.name(), "Kilogram");
        assert_eq!(unit.short_name(), "kg");
        assert!(unit.is_active());
    }

    #[test]
    fn complete_requires_name() {
        let err = UnitDraft::default().complete().unwrap_err();
        match err {
            DomainError::Validation(fields) => assert_eq!(fields.messages("name"), &[REQUIRED]),
            _ => panic!("Expected Validation error"),
        }
    }

    #[test]
    fn overlong_short_name_rejected() {
        let fields = UnitFields {
            name: "Box".to_string(),
            short_name: "x".repeat(SHORT_NAME_MAX_LEN + 1),
            is_active: true,
        };
        let err = Unit::create(UnitId::new(), fields, test_time()).unwrap_err();
        match err {
            DomainError::Validation(fields) => assert!(fields.contains("short_name")),
            _ => panic!("Expected Validation error"),
        }
    }

    #[test]
    fn full_replace_resets_short_name() {
        let mut unit = kilogram();
        let fields = UnitDraft {
            name: Some("Kilo".to_string()),
            ..UnitDraft::default()
        }
        .complete()
        .unwrap();
        unit.replace(fields, test_time()).unwrap();
        assert_eq!(unit.name(), "Kilo");
        assert_eq!(unit.short_name(), "");
    }

    #[test]
    fn overlay_keeps_unsupplied_fields() {
        let mut unit = kilogram();
        let fields = UnitDraft {
            is_active: Some(false),
            ..UnitDraft::default()
        }
        .overlay(unit.fields());
        unit.replace(fields, test_time()).unwrap();
        assert_eq!(unit.short_name(), "kg");
        assert!(!unit.is_active());
    }

    #[test]
    fn serializes_flat() {
        let json = serde_json::to_value(kilogram()).unwrap();
        assert_eq!(json["name"], "Kilogram");
        assert_eq!(json["short_name"], "kg");
        assert_eq!(json["is_active"], true);
        assert!(json.get("fields").is_none());
    }
}
