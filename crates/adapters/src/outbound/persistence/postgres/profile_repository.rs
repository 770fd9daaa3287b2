//! PostgreSQL implementation for profile repository.

use application::error::StoreError;
use application::ports::outbound::{ProfileRepository, StoreResult};
use async_trait::async_trait;
use domain::identity::email::EmailAddress;
use domain::identity::id::ProfileId;
use domain::identity::patch::ProfileChanges;
use domain::identity::profile::Profile;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::models::ProfileRecord;

const COLUMNS: &str = "id, email, name, role, phone, \
    first_name, last_name, created_at, builder_id";

/// PostgreSQL profile repository.
pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    /// Create a new [`PgProfileRepository`].
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a driver error onto the structured store kinds.
fn store_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(
                db.constraint().unwrap_or_else(|| db.message()).to_string(),
            )
        },
        err => StoreError::backend(err),
    }
}

/// Convert listed rows, skipping those the domain rejects.
fn valid_profiles(records: Vec<ProfileRecord>) -> Vec<Profile> {
    records
        .into_iter()
        .filter_map(|record| {
            let id = record.id.clone();
            record
                .try_into_profile()
                .inspect_err(|err| {
                    tracing::warn!(
                        user_id = %id,
                        error = %err,
                        "skipping invalid profile row"
                    );
                })
                .ok()
        })
        .collect()
}

/// `UPDATE` touching only the columns present in `changes`.
///
/// `Some(None)` binds `NULL`. Returns `None` when nothing would be written.
fn update_query<'a>(
    id: &ProfileId,
    changes: &ProfileChanges,
) -> Option<QueryBuilder<'a, Postgres>> {
    if changes.is_empty() {
        return None;
    }

    let mut query = QueryBuilder::new("UPDATE profiles SET ");
    {
        let mut set = query.separated(", ");
        if let Some(name) = &changes.name {
            set.push("name = ").push_bind_unseparated(name.clone());
        }
        if let Some(role) = changes.role {
            set.push("role = ").push_bind_unseparated(role.as_str());
        }
        if let Some(phone) = &changes.phone {
            set.push("phone = ").push_bind_unseparated(phone.clone());
        }
        if let Some(first_name) = &changes.first_name {
            set.push("first_name = ")
                .push_bind_unseparated(first_name.clone());
        }
        if let Some(last_name) = &changes.last_name {
            set.push("last_name = ")
                .push_bind_unseparated(last_name.clone());
        }
        if let Some(builder_id) = &changes.builder_id {
            set.push("builder_id = ").push_bind_unseparated(
                builder_id.as_ref().map(ToString::to_string),
            );
        }
    }
    query
        .push(" WHERE id = ")
        .push_bind(id.to_string())
        .push(" RETURNING ")
        .push(COLUMNS);

    Some(query)
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn find_all(&self) -> StoreResult<Vec<Profile>> {
        let records = sqlx::query_as::<_, ProfileRecord>(&format!(
            "SELECT {COLUMNS} FROM profiles"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(valid_profiles(records))
    }

    async fn find_by_id(&self, id: &ProfileId) -> StoreResult<Option<Profile>> {
        let record = sqlx::query_as::<_, ProfileRecord>(&format!(
            "SELECT {COLUMNS} FROM profiles WHERE id = $1"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        record.map(ProfileRecord::try_into_profile).transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> StoreResult<Profile> {
        // Two rows are enough to tell "one" from "many".
        let mut records = sqlx::query_as::<_, ProfileRecord>(&format!(
            "SELECT {COLUMNS} FROM profiles WHERE email = $1 LIMIT 2"
        ))
        .bind(email.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        match records.len() {
            0 => Err(StoreError::NotFound),
            1 => records.remove(0).try_into_profile(),
            _ => Err(StoreError::MultipleRows),
        }
    }

    async fn insert(&self, profile: &Profile) -> StoreResult<Profile> {
        let record = ProfileRecord::from(profile);

        let stored = sqlx::query_as::<_, ProfileRecord>(&format!(
            r#"
            INSERT INTO profiles (
                id, email, name, role, phone,
                first_name, last_name, created_at, builder_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&record.id)
        .bind(&record.email)
        .bind(&record.name)
        .bind(&record.role)
        .bind(&record.phone)
        .bind(&record.first_name)
        .bind(&record.last_name)
        .bind(record.created_at)
        .bind(&record.builder_id)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;

        stored.try_into_profile()
    }

    async fn update(
        &self,
        id: &ProfileId,
        changes: &ProfileChanges,
    ) -> StoreResult<Profile> {
        let Some(mut query) = update_query(id, changes) else {
            return self.find_by_id(id).await?.ok_or(StoreError::NotFound);
        };

        let updated = query
            .build_query_as::<ProfileRecord>()
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        updated
            .ok_or(StoreError::NotFound)?
            .try_into_profile()
    }
}
