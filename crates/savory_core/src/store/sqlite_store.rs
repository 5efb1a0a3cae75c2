//! SQLite-backed record store.
//!
//! # Responsibility
//! - Persist `Record`s of one model name in the shared `records` table.
//! - Load related records named by `select_related` hints.
//!
//! # Invariants
//! - A relation `group` stores its target primary key in attribute
//!   `group_id`.
//! - Un-hinted relations are never loaded.
//! - Saving a record first saves its loaded related records.

use super::{ModelStore, QuerySet, StoreError, StoreResult};
use crate::model::record::Record;
use log::debug;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, Row};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const RECORD_SELECT_SQL: &str = "SELECT pk, attrs FROM records";

/// Record store for a single model name.
pub struct SqliteRecordStore<'conn> {
    conn: &'conn Connection,
    model: String,
    /// relation name -> target model name
    relations: BTreeMap<String, String>,
}

impl<'conn> SqliteRecordStore<'conn> {
    pub fn new(conn: &'conn Connection, model: impl Into<String>) -> Self {
        Self {
            conn,
            model: model.into(),
            relations: BTreeMap::new(),
        }
    }

    /// Declares a foreign-key relation to records of `target_model`.
    pub fn with_relation(mut self, name: impl Into<String>, target_model: impl Into<String>) -> Self {
        self.relations.insert(name.into(), target_model.into());
        self
    }

    /// Number of stored records of this model.
    pub fn count(&self) -> StoreResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM records WHERE model = ?1;",
            [self.model.as_str()],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    fn target_model(&self, relation: &str) -> StoreResult<&str> {
        self.relations
            .get(relation)
            .map(String::as_str)
            .ok_or_else(|| StoreError::UnknownRelation {
                model: self.model.clone(),
                relation: relation.to_string(),
            })
    }

    /// Fills `record.related[relation]` from `<relation>_id`. Lookups are
    /// memoized in `loaded` so rows sharing a foreign key hit SQLite once.
    fn load_related(
        &self,
        record: &mut Record,
        relation: &str,
        loaded: &mut BTreeMap<(String, i64), Option<Record>>,
    ) -> StoreResult<()> {
        let target = self.target_model(relation)?;
        let Some(fk) = record.attrs.get(&fk_attribute(relation)).and_then(Value::as_i64) else {
            return Ok(());
        };

        let key = (target.to_string(), fk);
        let related = match loaded.get(&key) {
            Some(cached) => cached.clone(),
            None => {
                let found = find_record(self.conn, target, fk)?;
                loaded.insert(key, found.clone());
                found
            }
        };
        if let Some(related) = related {
            record.related.insert(relation.to_string(), related);
        }
        Ok(())
    }
}

impl ModelStore<Record> for SqliteRecordStore<'_> {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn fetch(&self, query: &QuerySet) -> StoreResult<Vec<Record>> {
        // Only the first hop of a dotted hint is loaded.
        let mut relations: Vec<&str> = Vec::new();
        for hint in query.related_hints() {
            let first = hint.split('.').next().unwrap_or(hint.as_str());
            self.target_model(first)?;
            if !relations.contains(&first) {
                relations.push(first);
            }
        }

        let mut sql = format!("{RECORD_SELECT_SQL} WHERE model = ?");
        let mut bind_values: Vec<SqlValue> = vec![SqlValue::Text(self.model.clone())];

        if let Some(pk) = query.pk_filter() {
            sql.push_str(" AND pk = ?");
            bind_values.push(SqlValue::Integer(pk));
        }

        sql.push_str(" ORDER BY pk ASC");

        match (query.limit_value(), query.offset_value()) {
            (Some(limit), offset) => {
                sql.push_str(" LIMIT ? OFFSET ?");
                bind_values.push(SqlValue::Integer(i64::from(limit)));
                bind_values.push(SqlValue::Integer(i64::from(offset)));
            }
            (None, 0) => {}
            (None, offset) => {
                sql.push_str(" LIMIT -1 OFFSET ?");
                bind_values.push(SqlValue::Integer(i64::from(offset)));
            }
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();
        let mut loaded = BTreeMap::new();

        while let Some(row) = rows.next()? {
            let mut record = parse_record_row(row)?;
            for relation in &relations {
                self.load_related(&mut record, relation, &mut loaded)?;
            }
            records.push(record);
        }

        debug!(
            "event=store_fetch module=store status=ok model={} rows={} hints={}",
            self.model,
            records.len(),
            relations.len()
        );
        Ok(records)
    }

    fn save(&self, record: &mut Record) -> StoreResult<()> {
        let related_names: Vec<String> = record.related.keys().cloned().collect();
        for relation in related_names {
            let target = self.target_model(&relation)?.to_string();
            let nested = SqliteRecordStore::new(self.conn, target);
            if let Some(related) = record.related.get_mut(&relation) {
                nested.save(related)?;
                if let Some(pk) = related.pk {
                    record.attrs.insert(fk_attribute(&relation), Value::from(pk));
                }
            }
        }

        let attrs = serde_json::to_string(&record.attrs)
            .map_err(|err| StoreError::InvalidData(format!("unserializable attributes: {err}")))?;

        match record.pk {
            None => {
                self.conn.execute(
                    "INSERT INTO records (model, attrs) VALUES (?1, ?2);",
                    params![self.model.as_str(), attrs],
                )?;
                record.pk = Some(self.conn.last_insert_rowid());
                debug!(
                    "event=store_save module=store status=ok op=insert model={}",
                    self.model
                );
            }
            Some(pk) => {
                let changed = self.conn.execute(
                    "UPDATE records
                     SET
                        attrs = ?1,
                        updated_at = (strftime('%s', 'now') * 1000)
                     WHERE model = ?2 AND pk = ?3;",
                    params![attrs, self.model.as_str(), pk],
                )?;
                if changed == 0 {
                    return Err(StoreError::NotFound {
                        model: self.model.clone(),
                        pk,
                    });
                }
                debug!(
                    "event=store_save module=store status=ok op=update model={}",
                    self.model
                );
            }
        }

        Ok(())
    }

    fn delete(&self, record: &Record) -> StoreResult<()> {
        let pk = record
            .pk
            .ok_or_else(|| StoreError::Unsaved(self.model.clone()))?;

        let changed = self.conn.execute(
            "DELETE FROM records WHERE model = ?1 AND pk = ?2;",
            params![self.model.as_str(), pk],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                model: self.model.clone(),
                pk,
            });
        }

        debug!(
            "event=store_delete module=store status=ok model={}",
            self.model
        );
        Ok(())
    }
}

fn find_record(conn: &Connection, model: &str, pk: i64) -> StoreResult<Option<Record>> {
    let mut stmt = conn.prepare_cached(&format!(
        "{RECORD_SELECT_SQL}
         WHERE model = ?1 AND pk = ?2;"
    ))?;
    let mut rows = stmt.query(params![model, pk])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_record_row(row)?));
    }
    Ok(None)
}

fn parse_record_row(row: &Row<'_>) -> StoreResult<Record> {
    let pk: i64 = row.get("pk")?;
    let attrs_text: String = row.get("attrs")?;
    let attrs: Map<String, Value> = serde_json::from_str(&attrs_text).map_err(|err| {
        StoreError::InvalidData(format!("invalid attrs json for records.pk={pk}: {err}"))
    })?;

    Ok(Record {
        pk: Some(pk),
        attrs,
        related: BTreeMap::new(),
    })
}

fn fk_attribute(relation: &str) -> String {
    format!("{relation}_id")
}
