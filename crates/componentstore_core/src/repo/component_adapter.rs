//! SQLite entity adapter for components.
//!
//! # Responsibility
//! - Map `Component` values to rows of the `components` table and back.
//! - Own schema bootstrap for that table.
//!
//! # Invariants
//! - Write paths must call `Component::validate()` before SQL mutations.
//! - Read paths must reject invalid persisted state instead of masking it.
//! - `attributes` are stored as one JSON object.

use crate::db::migrations::apply_migrations;
use crate::error::{StoreError, StoreResult};
use crate::model::component::{Component, ComponentValidationError};
use crate::model::entity_id::EntityId;
use crate::repo::entity_adapter::EntityAdapter;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::BTreeMap;

const COMPONENT_SELECT_SQL: &str = "SELECT
    id,
    repository,
    format,
    group_name,
    name,
    version,
    attributes
FROM components";

/// Filter and pagination options for browsing components.
///
/// Every `Some` filter must match exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentQuery {
    pub repository: Option<String>,
    pub format: Option<String>,
    pub group: Option<String>,
    pub name: Option<String>,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl ComponentQuery {
    /// Query matching every component of one repository.
    pub fn in_repository(repository: impl Into<String>) -> Self {
        Self {
            repository: Some(repository.into()),
            ..Self::default()
        }
    }

    /// Returns whether `component` satisfies the filters (pagination ignored).
    pub fn matches(&self, component: &Component) -> bool {
        fn accepts(filter: &Option<String>, value: Option<&str>) -> bool {
            filter.as_deref().map_or(true, |expected| Some(expected) == value)
        }

        accepts(&self.repository, Some(component.repository.as_str()))
            && accepts(&self.format, Some(component.format.as_str()))
            && accepts(&self.group, component.group.as_deref())
            && accepts(&self.name, Some(component.name.as_str()))
    }
}

/// Component adapter over `rusqlite::Connection`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteComponentAdapter;

impl SqliteComponentAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl EntityAdapter<Connection> for SqliteComponentAdapter {
    type Entity = Component;
    type Query = ComponentQuery;

    fn register(&self, conn: &mut Connection) -> StoreResult<()> {
        apply_migrations(conn)?;
        Ok(())
    }

    fn read(&self, conn: &mut Connection, id: EntityId) -> StoreResult<Component> {
        let mut stmt = conn.prepare(&format!("{COMPONENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        let component = match rows.next()? {
            Some(row) => parse_component_row(row)?,
            None => return Err(StoreError::NotFound(id)),
        };
        Ok(component)
    }

    fn add(&self, conn: &mut Connection, component: &Component) -> StoreResult<EntityId> {
        component.validate()?;

        conn.execute(
            "INSERT INTO components (
                id,
                repository,
                format,
                group_name,
                name,
                version,
                attributes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                component.id.to_string(),
                component.repository.as_str(),
                component.format.as_str(),
                component.group.as_deref(),
                component.name.as_str(),
                component.version.as_deref(),
                encode_attributes(&component.attributes)?,
            ],
        )?;

        Ok(component.id)
    }

    fn edit(&self, conn: &mut Connection, id: EntityId, component: &Component) -> StoreResult<()> {
        if component.id != id {
            return Err(ComponentValidationError::IdMismatch {
                expected: id,
                actual: component.id,
            }
            .into());
        }
        component.validate()?;

        let changed = conn.execute(
            "UPDATE components
             SET
                repository = ?1,
                format = ?2,
                group_name = ?3,
                name = ?4,
                version = ?5,
                attributes = ?6,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?7;",
            params![
                component.repository.as_str(),
                component.format.as_str(),
                component.group.as_deref(),
                component.name.as_str(),
                component.version.as_deref(),
                encode_attributes(&component.attributes)?,
                id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }

        Ok(())
    }

    fn delete(&self, conn: &mut Connection, id: EntityId) -> StoreResult<()> {
        let changed = conn.execute("DELETE FROM components WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    fn browse(&self, conn: &mut Connection, query: &ComponentQuery) -> StoreResult<Vec<Component>> {
        let mut sql = format!("{COMPONENT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        for (column, filter) in [
            ("repository", &query.repository),
            ("format", &query.format),
            ("group_name", &query.group),
            ("name", &query.name),
        ] {
            if let Some(value) = filter {
                sql.push_str(&format!(" AND {column} = ?"));
                bind_values.push(Value::Text(value.clone()));
            }
        }

        sql.push_str(" ORDER BY repository ASC, group_name ASC, name ASC, version ASC, id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut components = Vec::new();

        while let Some(row) = rows.next()? {
            components.push(parse_component_row(row)?);
        }

        Ok(components)
    }
}

fn parse_component_row(row: &Row<'_>) -> StoreResult<Component> {
    let id_text: String = row.get("id")?;
    let id = id_text.parse::<EntityId>().map_err(|_| {
        StoreError::InvalidData(format!("invalid id value `{id_text}` in components.id"))
    })?;

    let attributes_text: String = row.get("attributes")?;
    let attributes: BTreeMap<String, String> = serde_json::from_str(&attributes_text)
        .map_err(|err| {
            StoreError::InvalidData(format!(
                "invalid attributes for component {id} in components.attributes: {err}"
            ))
        })?;

    let component = Component {
        id,
        repository: row.get("repository")?,
        format: row.get("format")?,
        group: row.get("group_name")?,
        name: row.get("name")?,
        version: row.get("version")?,
        attributes,
    };
    component
        .validate()
        .map_err(|err| StoreError::InvalidData(format!("component {id}: {err}")))?;
    Ok(component)
}

fn encode_attributes(attributes: &BTreeMap<String, String>) -> StoreResult<String> {
    serde_json::to_string(attributes)
        .map_err(|err| StoreError::InvalidData(format!("unencodable attributes: {err}")))
}
