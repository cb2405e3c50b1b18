//! Shipping information collected from the user.
//!
//! The same required-field set is enforced in three places: client-side
//! before a cash-on-delivery checkout, server-side when the order request
//! arrives, and again when the payment gateway hands back the data it
//! collected during its own flow.

use serde::{Deserialize, Serialize};

/// Name and contact details plus a postal address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub address: ShippingAddress,
}

/// A postal address. Field names follow the gateway's address shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub street_line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_line2: Option<String>,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub country_code: String,
    pub post_code: String,
}

/// A required shipping field that was empty or absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MissingField {
    #[error("name")]
    Name,
    #[error("phone")]
    Phone,
    #[error("street_line1")]
    StreetLine1,
    #[error("city")]
    City,
    #[error("country_code")]
    CountryCode,
    #[error("post_code")]
    PostCode,
}

/// Top-level shipping fields addressable by an edit action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShippingField {
    Name,
    Email,
    Phone,
}

/// Address fields addressable by an edit action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressField {
    StreetLine1,
    StreetLine2,
    City,
    State,
    CountryCode,
    PostCode,
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn blank_option(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(is_blank)
}

impl ShippingInfo {
    /// Check the fields a delivery needs, reporting the first missing one.
    pub fn validate_for_delivery(&self) -> Result<(), MissingField> {
        if is_blank(&self.name) {
            return Err(MissingField::Name);
        }
        if blank_option(&self.phone) {
            return Err(MissingField::Phone);
        }
        if is_blank(&self.address.street_line1) {
            return Err(MissingField::StreetLine1);
        }
        if is_blank(&self.address.city) {
            return Err(MissingField::City);
        }
        if is_blank(&self.address.country_code) {
            return Err(MissingField::CountryCode);
        }
        if is_blank(&self.address.post_code) {
            return Err(MissingField::PostCode);
        }
        Ok(())
    }

    /// Replace one top-level field, leaving the rest untouched.
    pub fn with_field(mut self, field: ShippingField, value: String) -> Self {
        match field {
            ShippingField::Name => self.name = value,
            ShippingField::Email => self.email = Some(value),
            ShippingField::Phone => self.phone = Some(value),
        }
        self
    }

    /// Replace one address field, leaving the rest untouched.
    pub fn with_address_field(mut self, field: AddressField, value: String) -> Self {
        match field {
            AddressField::StreetLine1 => self.address.street_line1 = value,
            AddressField::StreetLine2 => self.address.street_line2 = Some(value),
            AddressField::City => self.address.city = value,
            AddressField::State => self.address.state = Some(value),
            AddressField::CountryCode => self.address.country_code = value,
            AddressField::PostCode => self.address.post_code = value,
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> ShippingInfo {
        ShippingInfo {
            name: "Ada".into(),
            email: Some("ada@example.com".into()),
            phone: Some("555-0100".into()),
            address: ShippingAddress {
                street_line1: "1 Main St".into(),
                street_line2: None,
                city: "Hanoi".into(),
                state: None,
                country_code: "VN".into(),
                post_code: "10000".into(),
            },
        }
    }

    #[test]
    fn complete_info_validates() {
        assert_eq!(complete().validate_for_delivery(), Ok(()));
    }

    #[test]
    fn first_missing_field_is_reported() {
        let mut info = complete();
        info.name = "  ".into();
        info.phone = None;
        assert_eq!(info.validate_for_delivery(), Err(MissingField::Name));

        let mut info = complete();
        info.phone = Some(String::new());
        assert_eq!(info.validate_for_delivery(), Err(MissingField::Phone));

        let mut info = complete();
        info.address.street_line1.clear();
        assert_eq!(info.validate_for_delivery(), Err(MissingField::StreetLine1));

        let mut info = complete();
        info.address.post_code.clear();
        assert_eq!(info.validate_for_delivery(), Err(MissingField::PostCode));
    }

    #[test]
    fn field_edits_leave_other_fields_intact() {
        let info = complete()
            .with_field(ShippingField::Name, "Grace".into())
            .with_address_field(AddressField::City, "Hue".into());
        assert_eq!(info.name, "Grace");
        assert_eq!(info.address.city, "Hue");
        assert_eq!(info.phone.as_deref(), Some("555-0100"));
        assert_eq!(info.address.street_line1, "1 Main St");
    }
}
