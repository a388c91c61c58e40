//! Entity repository: reads, lookups and atomic mutations.

use chrono::Utc;
use tq_core::attributes::{normalize_value, validate_attribute_name, validate_attribute_names};
use tq_core::entities::{Entity, EntityUpdate, NewEntity};

use crate::error::StoreError;
use crate::helpers::{clean_attributes, encode_attributes, row_to_entity};
use crate::service::{CandidateStore, rollback};

pub(crate) const SELECT_ALL_ENTITIES: &str =
    "SELECT id, name, attributes, created_at, updated_at FROM entities ORDER BY id";

/// Run an entity query on any connection (or transaction).
pub(crate) async fn query_entities(
    conn: &libsql::Connection,
    sql: &str,
    params: impl libsql::params::IntoParams,
) -> Result<Vec<Entity>, StoreError> {
    let mut rows = conn.query(sql, params).await?;
    let mut entities = Vec::new();
    while let Some(row) = rows.next().await? {
        entities.push(row_to_entity(&row)?);
    }
    Ok(entities)
}

async fn entity_by_id(conn: &libsql::Connection, id: i64) -> Result<Option<Entity>, StoreError> {
    let mut found = query_entities(
        conn,
        "SELECT id, name, attributes, created_at, updated_at FROM entities WHERE id = ?1",
        [id],
    )
    .await?;
    Ok(found.pop())
}

async fn entity_by_name(
    conn: &libsql::Connection,
    name: &str,
) -> Result<Option<Entity>, StoreError> {
    let mut found = query_entities(
        conn,
        "SELECT id, name, attributes, created_at, updated_at FROM entities WHERE name = ?1 COLLATE NOCASE",
        [name],
    )
    .await?;
    Ok(found.pop())
}

fn validated_name(name: &str) -> Result<String, StoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(StoreError::InvalidName("name must not be empty".into()));
    }
    Ok(trimmed.to_string())
}

impl CandidateStore {
    /// All entities ordered by id.
    pub async fn list_all(&self) -> Result<Vec<Entity>, StoreError> {
        query_entities(self.db().conn(), SELECT_ALL_ENTITIES, ()).await
    }

    /// Full candidate set for a new engine snapshot.
    pub async fn load(&self) -> Result<Vec<Entity>, StoreError> {
        self.list_all().await
    }

    pub async fn get(&self, id: i64) -> Result<Entity, StoreError> {
        entity_by_id(self.db().conn(), id)
            .await?
            .ok_or(StoreError::NotFound { kind: "entity", id })
    }

    /// Case-insensitive lookup of a trimmed name.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Entity>, StoreError> {
        entity_by_name(self.db().conn(), name.trim()).await
    }

    pub async fn count(&self) -> Result<u64, StoreError> {
        let mut rows = self
            .db()
            .conn()
            .query("SELECT COUNT(*) FROM entities", ())
            .await?;
        let row = rows.next().await?.ok_or(StoreError::NoResult)?;
        Ok(u64::try_from(row.get::<i64>(0)?).unwrap_or(0))
    }

    /// Entities whose `attribute` equals `value` after normalization.
    ///
    /// The key is checked against the allow-list before it becomes a JSON path.
    pub async fn find_by_attribute(
        &self,
        attribute: &str,
        value: &str,
    ) -> Result<Vec<Entity>, StoreError> {
        validate_attribute_name(attribute)?;
        let path = format!("$.{attribute}");
        query_entities(
            self.db().conn(),
            "SELECT id, name, attributes, created_at, updated_at FROM entities
             WHERE lower(trim(json_extract(attributes, ?1))) = ?2
             ORDER BY id",
            libsql::params![path, normalize_value(value)],
        )
        .await
    }

    /// Register a new entity in both stores.
    ///
    /// # Errors
    ///
    /// `InvalidName`, `InvalidAttributeName` and `DuplicateName` are raised
    /// before anything is written. Any later failure leaves both stores as
    /// they were.
    pub async fn add(&self, new: NewEntity) -> Result<Entity, StoreError> {
        let name = validated_name(&new.name)?;
        validate_attribute_names(new.attributes.keys())?;
        let attributes = clean_attributes(&new.attributes);
        let encoded = encode_attributes(&attributes)?;

        let _guard = self.lock_writes().await;
        let prior = self.prior_state().await?;
        if prior.entities.iter().any(|e| e.name.eq_ignore_ascii_case(&name)) {
            return Err(StoreError::DuplicateName(name));
        }

        let now = Utc::now();
        let tx = self.db().conn().transaction().await?;
        let inserted = tx
            .execute(
                "INSERT INTO entities (name, attributes, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
                libsql::params![name.as_str(), encoded, now.to_rfc3339(), now.to_rfc3339()],
            )
            .await;
        if let Err(e) = inserted {
            return Err(rollback(tx, duplicate_or(e, &name)).await);
        }
        let id = tx.last_insert_rowid();

        self.commit_with_snapshot(tx, &prior).await?;
        tracing::info!(id, name = %name, "entity added");

        Ok(Entity {
            id,
            name,
            attributes,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rename an entity and/or merge attributes into its map.
    ///
    /// Keys present in `changes.attributes` overwrite existing values (a
    /// `None` value marks the attribute unknown); other keys are kept. An
    /// empty update returns the stored entity without writing.
    ///
    /// # Errors
    ///
    /// `NotFound`, `InvalidName`, `InvalidAttributeName` and `DuplicateName`
    /// (another entity already has the new name) leave both stores untouched.
    pub async fn update(&self, id: i64, changes: EntityUpdate) -> Result<Entity, StoreError> {
        let name = changes.name.as_deref().map(validated_name).transpose()?;
        validate_attribute_names(changes.attributes.keys())?;

        let _guard = self.lock_writes().await;
        let prior = self.prior_state().await?;
        let mut entity = prior
            .entities
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or(StoreError::NotFound { kind: "entity", id })?;
        if changes.is_empty() {
            return Ok(entity);
        }
        if let Some(name) = name {
            if prior
                .entities
                .iter()
                .any(|e| e.id != id && e.name.eq_ignore_ascii_case(&name))
            {
                return Err(StoreError::DuplicateName(name));
            }
            entity.name = name;
        }
        entity.attributes.extend(clean_attributes(&changes.attributes));
        entity.updated_at = Utc::now();
        let encoded = encode_attributes(&entity.attributes)?;

        let tx = self.db().conn().transaction().await?;
        let updated = tx
            .execute(
                "UPDATE entities SET name = ?1, attributes = ?2, updated_at = ?3 WHERE id = ?4",
                libsql::params![
                    entity.name.as_str(),
                    encoded,
                    entity.updated_at.to_rfc3339(),
                    id
                ],
            )
            .await;
        if let Err(e) = updated {
            return Err(rollback(tx, duplicate_or(e, &entity.name)).await);
        }

        self.commit_with_snapshot(tx, &prior).await?;
        tracing::info!(id, name = %entity.name, "entity updated");
        Ok(entity)
    }

    /// Delete an entity from both stores, returning what was removed.
    ///
    /// Games that targeted it keep their record with a null target.
    pub async fn remove(&self, id: i64) -> Result<Entity, StoreError> {
        let _guard = self.lock_writes().await;
        let prior = self.prior_state().await?;
        let entity = prior
            .entities
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or(StoreError::NotFound { kind: "entity", id })?;

        let tx = self.db().conn().transaction().await?;
        if let Err(e) = tx.execute("DELETE FROM entities WHERE id = ?1", [id]).await {
            return Err(rollback(tx, e.into()).await);
        }

        self.commit_with_snapshot(tx, &prior).await?;
        tracing::info!(id, name = %entity.name, "entity removed");
        Ok(entity)
    }
}

/// Map a UNIQUE violation on insert or rename to `DuplicateName`.
fn duplicate_or(error: libsql::Error, name: &str) -> StoreError {
    if error.to_string().contains("UNIQUE") {
        StoreError::DuplicateName(name.to_string())
    } else {
        error.into()
    }
}
