//! Normalized invoice record.

use serde::{Deserialize, Serialize};

/// One row of the consolidated table.
///
/// Every field is a string; absent data is the empty string, never null.
/// Deserializing a partial mapping back-fills the missing fields with `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceRecord {
    /// Access key: `note_id` without its `NFe` prefix.
    pub key: String,

    /// Raw `@Id` attribute of the header block.
    pub note_id: String,

    /// Issuer (`emit`) name.
    pub issuer_name: String,

    /// Recipient (`dest`) name.
    pub recipient_name: String,

    pub dest_street: String,
    pub dest_number: String,
    pub dest_district: String,
    pub dest_city: String,
    pub dest_state: String,
    pub dest_zip: String,
    pub dest_country: String,

    /// Base name of the source file.
    pub file_name: String,
}

impl InvoiceRecord {
    /// Copy an address into the `dest_*` columns.
    pub fn with_address(mut self, address: AddressFields) -> Self {
        self.dest_street = address.street;
        self.dest_number = address.number;
        self.dest_district = address.district;
        self.dest_city = address.city;
        self.dest_state = address.state;
        self.dest_zip = address.zip;
        self.dest_country = address.country;
        self
    }
}

/// The seven address fields read from an `enderDest`/`enderEmit` block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressFields {
    pub street: String,
    pub number: String,
    pub district: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

impl AddressFields {
    /// True when every field is empty.
    pub fn is_empty(&self) -> bool {
        [
            &self.street,
            &self.number,
            &self.district,
            &self.city,
            &self.state,
            &self.zip,
            &self.country,
        ]
        .iter()
        .all(|field| field.is_empty())
    }
}
