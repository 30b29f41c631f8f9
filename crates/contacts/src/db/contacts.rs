//! Contact repository for database operations.
//!
//! Every query is scoped to the owning user, so a contact belonging to someone
//! else behaves exactly like a missing one.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use rolodex_core::{ContactId, Email, UserId};

use super::{RepositoryError, conflict_on_unique};
use crate::models::{Contact, NewContact};

const DUPLICATE_EMAIL: &str = "contact email already exists";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct ContactRow {
    id: i32,
    user_id: i32,
    first_name: String,
    last_name: String,
    email: String,
    phone_number: String,
    birthday: Option<NaiveDate>,
    additional_data: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ContactRow> for Contact {
    type Error = RepositoryError;

    fn try_from(row: ContactRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid contact email in database: {e}"))
        })?;

        Ok(Self {
            id: ContactId::new(row.id),
            user_id: UserId::new(row.user_id),
            first_name: row.first_name,
            last_name: row.last_name,
            email,
            phone_number: row.phone_number,
            birthday: row.birthday,
            additional_data: row.additional_data,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_contacts(rows: Vec<ContactRow>) -> Result<Vec<Contact>, RepositoryError> {
    rows.into_iter().map(Contact::try_from).collect()
}

/// Escape `LIKE` metacharacters so user input matches literally.
///
/// Pairs with `ESCAPE '\'` in the query.
#[must_use]
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for contact database operations.
pub struct ContactRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContactRepository<'a> {
    /// Create a new contact repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a contact owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the contact email is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        owner: UserId,
        contact: &NewContact,
    ) -> Result<Contact, RepositoryError> {
        let row = sqlx::query_as::<_, ContactRow>(
            r"
            INSERT INTO contacts.contact
                (user_id, first_name, last_name, email, phone_number, birthday, additional_data)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, first_name, last_name, email, phone_number,
                      birthday, additional_data, created_at, updated_at
            ",
        )
        .bind(owner)
        .bind(&contact.first_name)
        .bind(&contact.last_name)
        .bind(contact.email.as_str())
        .bind(&contact.phone_number)
        .bind(contact.birthday)
        .bind(contact.additional_data.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE_EMAIL))?;

        Contact::try_from(row)
    }

    /// List a page of the owner's contacts ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        owner: UserId,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Contact>, RepositoryError> {
        let rows = sqlx::query_as::<_, ContactRow>(
            r"
            SELECT id, user_id, first_name, last_name, email, phone_number,
                   birthday, additional_data, created_at, updated_at
            FROM contacts.contact
            WHERE user_id = $1
            ORDER BY id
            OFFSET $2
            LIMIT $3
            ",
        )
        .bind(owner)
        .bind(skip)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        into_contacts(rows)
    }

    /// Get one of the owner's contacts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        owner: UserId,
        id: ContactId,
    ) -> Result<Option<Contact>, RepositoryError> {
        let row = sqlx::query_as::<_, ContactRow>(
            r"
            SELECT id, user_id, first_name, last_name, email, phone_number,
                   birthday, additional_data, created_at, updated_at
            FROM contacts.contact
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(self.pool)
        .await?;

        row.map(Contact::try_from).transpose()
    }

    /// Replace every field of one of the owner's contacts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the owner has no such contact.
    /// Returns `RepositoryError::Conflict` if the new email is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        owner: UserId,
        id: ContactId,
        contact: &NewContact,
    ) -> Result<Contact, RepositoryError> {
        let row = sqlx::query_as::<_, ContactRow>(
            r"
            UPDATE contacts.contact
            SET first_name = $3,
                last_name = $4,
                email = $5,
                phone_number = $6,
                birthday = $7,
                additional_data = $8,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, first_name, last_name, email, phone_number,
                      birthday, additional_data, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(owner)
        .bind(&contact.first_name)
        .bind(&contact.last_name)
        .bind(contact.email.as_str())
        .bind(&contact.phone_number)
        .bind(contact.birthday)
        .bind(contact.additional_data.as_deref())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE_EMAIL))?
        .ok_or(RepositoryError::NotFound)?;

        Contact::try_from(row)
    }

    /// Delete one of the owner's contacts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the owner has no such contact.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, owner: UserId, id: ContactId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM contacts.contact WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Case-insensitive substring search on first name, last name and email.
    ///
    /// A `None` or blank query returns all of the owner's contacts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(
        &self,
        owner: UserId,
        query: Option<&str>,
    ) -> Result<Vec<Contact>, RepositoryError> {
        let pattern = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(|q| format!("%{}%", escape_like(q)));

        let rows = sqlx::query_as::<_, ContactRow>(
            r"
            SELECT id, user_id, first_name, last_name, email, phone_number,
                   birthday, additional_data, created_at, updated_at
            FROM contacts.contact
            WHERE user_id = $1
              AND ($2::TEXT IS NULL
                   OR first_name ILIKE $2 ESCAPE '\'
                   OR last_name ILIKE $2 ESCAPE '\'
                   OR email ILIKE $2 ESCAPE '\')
            ORDER BY id
            ",
        )
        .bind(owner)
        .bind(pattern)
        .fetch_all(self.pool)
        .await?;

        into_contacts(rows)
    }

    /// All of the owner's contacts that have a birthday set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn with_birthdays(&self, owner: UserId) -> Result<Vec<Contact>, RepositoryError> {
        let rows = sqlx::query_as::<_, ContactRow>(
            r"
            SELECT id, user_id, first_name, last_name, email, phone_number,
                   birthday, additional_data, created_at, updated_at
            FROM contacts.contact
            WHERE user_id = $1 AND birthday IS NOT NULL
            ORDER BY id
            ",
        )
        .bind(owner)
        .fetch_all(self.pool)
        .await?;

        into_contacts(rows)
    }
}
