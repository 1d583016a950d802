use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tillpoint_core::validation::{check_email, require_text};
use tillpoint_core::{CustomerId, Draft, DomainResult, Editable, Entity, FieldErrors, SupplierId};

pub const TEXT_MAX_LEN: usize = 255;

/// Id types that name a party table.
pub trait PartyRole:
    Copy
    + Eq
    + core::hash::Hash
    + core::fmt::Debug
    + core::fmt::Display
    + core::str::FromStr
    + Default
    + Send
    + Sync
    + Serialize
    + 'static
{
}

impl PartyRole for SupplierId {}

impl PartyRole for CustomerId {}

/// A supplier or customer contact record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Party<I: PartyRole> {
    id: I,
    #[serde(flatten)]
    fields: PartyFields,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

pub type Supplier = Party<SupplierId>;
pub type Customer = Party<CustomerId>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartyFields {
    pub code: String,
    pub name: String,
    pub contact_no: String,
    pub address: String,
    pub email: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartyDraft {
    pub code: Option<String>,
    pub name: Option<String>,
    pub contact_no: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub is_active: Option<bool>,
}

impl<I: PartyRole> Party<I> {
    pub fn code(&self) -> &str {
        &self.fields.code
    }

    pub fn name(&self) -> &str {
        &self.fields.name
    }

    pub fn email(&self) -> &str {
        &self.fields.email
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl PartyFields {
    fn normalized(mut self) -> Self {
        self.code = self.code.trim().to_string();
        self.name = self.name.trim().to_string();
        self.contact_no = self.contact_no.trim().to_string();
        self.address = self.address.trim().to_string();
        self.email = self.email.trim().to_string();
        self
    }
}

impl<I: PartyRole> Entity for Party<I> {
    type Id = I;

    fn id(&self) -> &I {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn is_active(&self) -> bool {
        self.fields.is_active
    }
}

impl<I: PartyRole> Editable for Party<I> {
    type Fields = PartyFields;
    type Draft = PartyDraft;

    fn validate(fields: &PartyFields) -> FieldErrors {
        let mut errors = FieldErrors::new();
        require_text(&mut errors, "code", &fields.code, TEXT_MAX_LEN);
        require_text(&mut errors, "name", &fields.name, TEXT_MAX_LEN);
        require_text(&mut errors, "contact_no", &fields.contact_no, TEXT_MAX_LEN);
        require_text(&mut errors, "address", &fields.address, TEXT_MAX_LEN);
        check_email(&mut errors, "email", fields.email.trim());
        errors
    }

    fn create(id: I, fields: PartyFields, now: DateTime<Utc>) -> DomainResult<Self> {
        Self::validate(&fields).into_result()?;
        Ok(Self {
            id,
            fields: fields.normalized(),
            created_at: now,
            updated_at: now,
        })
    }

    fn fields(&self) -> PartyFields {
        self.fields.clone()
    }

    fn replace(&mut self, fields: PartyFields, now: DateTime<Utc>) -> DomainResult<()> {
        Self::validate(&fields).into_result()?;
        self.fields = fields.normalized();
        self.updated_at = now;
        Ok(())
    }
}

impl Draft for PartyDraft {
    type Fields = PartyFields;

    fn complete(self) -> DomainResult<PartyFields> {
        let mut errors = FieldErrors::new();
        errors.require("code", &self.code);
        errors.require("name", &self.name);
        errors.require("contact_no", &self.contact_no);
        errors.require("address", &self.address);
        errors.require("email", &self.email);

        match (self.code, self.name, self.contact_no, self.address, self.email) {
            (Some(code), Some(name), Some(contact_no), Some(address), Some(email)) => {
                Ok(PartyFields {
                    code,
                    name,
                    contact_no,
                    address,
                    email,
                    is_active: self.is_active.unwrap_or(true),
                })
            }
            _ => Err(errors.into()),
        }
    }

    fn overlay(self, base: PartyFields) -> PartyFields {
        PartyFields {
            code: self.code.unwrap_or(base.code),
            name: self.name.unwrap_or(base.name),
            contact_no: self.contact_no.unwrap_or(base.contact_no),
            address: self.address.unwrap_or(base.address),
            email: self.email.unwrap_or(base.email),
            is_active: self.is_active.unwrap_or(base.is_active),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tillpoint_core::DomainError;
    use tillpoint_core::validation::{INVALID_EMAIL, REQUIRED};

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn acme_draft() -> PartyDraft {
        PartyDraft {
            code: Some("S1".to_string()),
            name: Some("Acme".to_string()),
            contact_no: Some("555".to_string()),
            address: Some("1 Road".to_string()),
            email: Some("a@acme.io".to_string()),
            is_active: None,
        }
    }

    #[test]
    fn supplier_created_from_complete_draft() {
        let supplier =
            Supplier::create(SupplierId::new(), acme_draft().complete().unwrap(), test_time())
                .unwrap();
        assert_eq!(supplier.code(), "S1");
        assert!(supplier.is_active());

        let json = serde_json::to_value(&supplier).unwrap();
        assert_eq!(json["contact_no"], "555");
        assert_eq!(json["email"], "a@acme.io");
    }

    #[test]
    fn customer_shares_the_field_rules() {
        let mut draft = acme_draft();
        draft.email = Some("not-an-email".to_string());
        let err = Customer::create(CustomerId::new(), draft.complete().unwrap(), test_time())
            .unwrap_err();
        match err {
            DomainError::Validation(fields) => {
                assert_eq!(fields.messages("email"), &[INVALID_EMAIL]);
            }
            _ => panic!("Expected Validation error"),
        }
    }

    #[test]
    fn missing_fields_all_reported() {
        let err = PartyDraft {
            name: Some("Only a name".to_string()),
            ..PartyDraft::default()
        }
        .complete()
        .unwrap_err();
        match err {
            DomainError::Validation(fields) => {
                for field in ["code", "contact_no", "address", "email"] {
                    assert_eq!(fields.messages(field), &[REQUIRED], "{field}");
                }
                assert!(!fields.contains("name"));
            }
            _ => panic!("Expected Validation error"),
        }
    }

    #[test]
    fn email_is_kept_as_supplied_apart_from_whitespace() {
        let mut draft = acme_draft();
        draft.email = Some("  Sales@ACME.IO ".to_string());
        let customer =
            Customer::create(CustomerId::new(), draft.complete().unwrap(), test_time()).unwrap();
        assert_eq!(customer.email(), "Sales@ACME.IO");
    }

    #[test]
    fn partial_update_touches_only_supplied_fields() {
        let mut supplier =
            Supplier::create(SupplierId::new(), acme_draft().complete().unwrap(), test_time())
                .unwrap();
        let fields = PartyDraft {
            contact_no: Some("777".to_string()),
            ..PartyDraft::default()
        }
        .overlay(supplier.fields());
        supplier.replace(fields, test_time()).unwrap();

        assert_eq!(supplier.fields().contact_no, "777");
        assert_eq!(supplier.name(), "Acme");
        assert_eq!(supplier.email(), "a@acme.io");
    }

    #[test]
    fn overlong_code_rejected_without_mutation() {
        let mut customer =
            Customer::create(CustomerId::new(), acme_draft().complete().unwrap(), test_time())
                .unwrap();
        let before = customer.clone();
        let fields = PartyDraft {
            code: Some("C".repeat(TEXT_MAX_LEN + 1)),
            ..PartyDraft::default()
        }
        .overlay(customer.fields());

        assert!(customer.replace(fields, test_time()).is_err());
        assert_eq!(customer, before);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Stored names never carry surrounding whitespace.
            #[test]
            fn names_are_stored_trimmed(
                name in "[A-Za-z][A-Za-z0-9 ]{0,40}[A-Za-z]",
                pad_left in 0usize..4,
                pad_right in 0usize..4,
            ) {
                let mut draft = acme_draft();
                draft.name = Some(format!("{}{}{}", " ".repeat(pad_left), name, " ".repeat(pad_right)));
                let supplier =
                    Supplier::create(SupplierId::new(), draft.complete().unwrap(), test_time())
                        .unwrap();
                prop_assert_eq!(supplier.name(), name.as_str());
            }

            /// Anything longer than the column limit is refused on create.
            #[test]
            fn overlong_address_is_refused(extra in 1usize..64) {
                let mut draft = acme_draft();
                draft.address = Some("a".repeat(TEXT_MAX_LEN + extra));
                let result = Customer::create(CustomerId::new(), draft.complete().unwrap(), test_time());
                prop_assert!(result.is_err());
            }
        }
    }
}
