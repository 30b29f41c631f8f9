//! Contact domain types and the birthday window.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rolodex_core::{ContactId, Email, EmailError, UserId};

/// Maximum length of a name or phone field.
pub const MAX_FIELD_LENGTH: usize = 100;

/// How many days ahead the upcoming-birthday window reaches.
pub const BIRTHDAY_WINDOW_DAYS: i64 = 7;

/// A contact record owned by a user.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Contact {
    pub id: ContactId,
    #[serde(skip_serializing)]
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone_number: String,
    pub birthday: Option<NaiveDate>,
    pub additional_data: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating or replacing a contact.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
    #[serde(default)]
    pub additional_data: Option<String>,
}

/// A validated contact ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone_number: String,
    pub birthday: Option<NaiveDate>,
    pub additional_data: Option<String>,
}

/// Reasons a [`ContactInput`] is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContactValidationError {
    #[error("{0} cannot be blank")]
    Blank(&'static str),
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("invalid email: {0}")]
    Email(#[from] EmailError),
}

impl ContactInput {
    /// Trim and check every field.
    ///
    /// # Errors
    ///
    /// Returns the first [`ContactValidationError`] found.
    pub fn validate(self) -> Result<NewContact, ContactValidationError> {
        let first_name = required("first_name", &self.first_name)?;
        let last_name = required("last_name", &self.last_name)?;
        let phone_number = required("phone_number", &self.phone_number)?;
        let email = Email::parse(&self.email)?;
        let additional_data = self
            .additional_data
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty());

        Ok(NewContact {
            first_name,
            last_name,
            email,
            phone_number,
            birthday: self.birthday,
            additional_data,
        })
    }
}

fn required(field: &'static str, value: &str) -> Result<String, ContactValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ContactValidationError::Blank(field));
    }
    if value.chars().count() > MAX_FIELD_LENGTH {
        return Err(ContactValidationError::TooLong {
            field,
            max: MAX_FIELD_LENGTH,
        });
    }
    Ok(value.to_owned())
}

// =============================================================================
// Birthdays
// =============================================================================

/// The date a birthday is celebrated in `year`.
///
/// 29 February falls back to 28 February outside leap years.
#[must_use]
pub fn anniversary_in(birthday: NaiveDate, year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, birthday.month(), birthday.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, birthday.month(), birthday.day() - 1))
}

/// Days from `today` until the next celebration of `birthday` (0 when it is today).
#[must_use]
pub fn days_until_birthday(birthday: NaiveDate, today: NaiveDate) -> Option<i64> {
    let this_year = anniversary_in(birthday, today.year())?;
    let next = if this_year >= today {
        this_year
    } else {
        anniversary_in(birthday, today.year() + 1)?
    };
    Some((next - today).num_days())
}

/// Contacts whose birthday falls within `[today, today + 7 days]`, soonest first.
#[must_use]
pub fn upcoming_birthdays(contacts: Vec<Contact>, today: NaiveDate) -> Vec<Contact> {
    let mut upcoming: Vec<(i64, Contact)> = contacts
        .into_iter()
        .filter_map(|contact| {
            let days = days_until_birthday(contact.birthday?, today)?;
            (days <= BIRTHDAY_WINDOW_DAYS).then_some((days, contact))
        })
        .collect();

    upcoming.sort_by_key(|(days, contact)| (*days, contact.id));
    upcoming.into_iter().map(|(_, contact)| contact).collect()
}
