//! Emergency contact types.

use serde::{Deserialize, Deserializer, Serialize};

use super::error::{ContactError, Result};

/// A person notified when emergency sharing is active.
///
/// Contacts have no identifier of their own; they are addressed by their
/// position in the stored list, and duplicates are allowed.
///
/// # Serialized Form
///
/// ```json
/// {"name": "Jane", "phone": "+27 123 456 7890", "email": "jane@example.com"}
/// ```
///
/// `email` is omitted when absent. An empty `email` string in stored data is
/// read back as absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    /// Display name (required, non-empty)
    pub name: String,

    /// Phone number as entered (required, non-empty)
    pub phone: String,

    /// Optional email address
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_as_none"
    )]
    pub email: Option<String>,
}

impl EmergencyContact {
    /// Creates a contact from form input.
    ///
    /// Name and phone are kept exactly as entered. A blank email becomes
    /// `None`. No validation happens here; see [`validate`](Self::validate).
    ///
    /// # Examples
    ///
    /// ```
    /// use safepath_core::contacts::EmergencyContact;
    ///
    /// let contact = EmergencyContact::new(" Jane ", "555-0100", Some("  "));
    /// assert_eq!(contact.name, " Jane ");
    /// assert_eq!(contact.email, None);
    /// ```
    #[must_use]
    pub fn new(name: &str, phone: &str, email: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            phone: phone.to_string(),
            email: email
                .filter(|e| !e.trim().is_empty())
                .map(str::to_string),
        }
    }

    /// Checks that name and phone are present.
    ///
    /// Only empty strings count as missing; whitespace is a value.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError::MissingField`] naming the first empty field.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ContactError::MissingField("name"));
        }
        if self.phone.is_empty() {
            return Err(ContactError::MissingField("phone"));
        }
        Ok(())
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|e| !e.is_empty()))
}
