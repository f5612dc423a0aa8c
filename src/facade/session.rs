use super::database::JsonDB;
use crate::core::{JsonDbError, Record, Result};
use crate::evaluator::comparison::loose_eq;
use crate::executor::{delete, dml, update};
use crate::planner::{Join, Operator, Order, Predicate, Projection, QuerySpec};
use crate::storage::{Table, sanitize_table_name};
use serde_json::Value;
use std::time::Instant;
use tracing::{Level, event, info_span};

/// The selected table and the query built against it.
struct Selection {
    table: Table,
    spec: QuerySpec,
}

/// One query session: at most one selected table, lazily loaded, plus the
/// query description accumulated by the chain calls.
///
/// Chain calls (`filter`, `order_by`, `limit`, ...) consume the session and
/// hand it back; terminal calls (`get`, `insert`, `update`, ...) evaluate
/// the query against the loaded entries. Selecting a table again resets
/// both the query and the loaded entries.
pub struct Session<'db> {
    db: &'db JsonDB,
    selection: Option<Selection>,
    started: Instant,
}

impl<'db> Session<'db> {
    pub(crate) fn new(db: &'db JsonDB) -> Self {
        Self {
            db,
            selection: None,
            started: Instant::now(),
        }
    }

    // ------------------------------------------------------------------
    // Selection and chain calls
    // ------------------------------------------------------------------

    /// Select `name`: sanitized, created as an empty table when missing,
    /// query and loaded entries reset.
    pub fn table(mut self, name: &str) -> Result<Self> {
        let name = sanitize_table_name(name)?;
        let handle = self.db.handle_for(&name)?;
        self.db.ensure_table(&handle)?;

        self.started = Instant::now();
        self.selection = Some(Selection {
            table: Table::new(handle),
            spec: QuerySpec::new(name),
        });
        Ok(self)
    }

    /// Select `name` and replace its content with `records`.
    pub fn table_with(self, name: &str, records: Vec<Record>) -> Result<Self> {
        let mut session = self.table(name)?;
        session.populate(records)?;
        Ok(session)
    }

    /// AND condition.
    pub fn filter(self, field: &str, op: Operator, value: impl Into<Value>) -> Result<Self> {
        self.filter_predicate(Predicate::new(field, op, value)?)
    }

    pub fn filter_predicate(self, predicate: Predicate) -> Result<Self> {
        self.map_spec(|spec| Ok(spec.with_filter(predicate)))
    }

    /// Several AND conditions given as `(field, operator, value)` triples.
    pub fn filter_all<'a, I, V>(mut self, conditions: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str, V)>,
        V: Into<Value>,
    {
        for (field, op, value) in conditions {
            self = self.filter_predicate(Predicate::parse(field, op, value)?)?;
        }
        Ok(self)
    }

    /// OR condition, evaluated as its own AND group against the full table
    /// and unioned into the filtered result. Needs a prior `filter`.
    pub fn or_filter(self, field: &str, op: Operator, value: impl Into<Value>) -> Result<Self> {
        let predicate = Predicate::new(field, op, value)?;
        self.map_spec(|spec| spec.with_or_filter(predicate))
    }

    pub fn order_by(self, key: &str, order: Order) -> Result<Self> {
        self.map_spec(|spec| Ok(spec.with_order(key, order)))
    }

    /// Keep at most `limit` entries (all when `None`) after skipping `offset`.
    pub fn limit(self, limit: Option<usize>, offset: usize) -> Result<Self> {
        self.map_spec(|spec| Ok(spec.with_limit(limit, offset)))
    }

    /// Project results onto `id` plus `fields`; `"*"` keeps everything.
    pub fn select<I, S>(self, fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let projection = Projection::from_fields(fields);
        self.map_spec(|spec| Ok(spec.with_projection(projection)))
    }

    /// Record a join. It is kept on the query but not evaluated.
    pub fn join(self, table: &str, field: &str, operator: Operator, local_field: &str) -> Result<Self> {
        let join = Join {
            table: sanitize_table_name(table)?,
            field: field.to_string(),
            operator,
            local_field: local_field.to_string(),
        };
        self.map_spec(|spec| Ok(spec.with_join(join)))
    }

    fn map_spec<F>(mut self, f: F) -> Result<Self>
    where
        F: FnOnce(QuerySpec) -> Result<QuerySpec>,
    {
        let selection = self.selection.as_mut().ok_or(JsonDbError::NoTableSelected)?;
        let spec = std::mem::replace(&mut selection.spec, QuerySpec::new(""));
        selection.spec = f(spec)?;
        Ok(self)
    }

    pub fn table_name(&self) -> Option<&str> {
        self.selection.as_ref().map(|s| s.table.name())
    }

    pub fn spec(&self) -> Option<&QuerySpec> {
        self.selection.as_ref().map(|s| &s.spec)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Evaluate the query. OR conditions are consumed by this call.
    pub fn get(&mut self) -> Result<Vec<Record>> {
        let db = self.db;
        let started = self.started;
        let selection = self.selected()?;
        let span = info_span!("jsondb.get", table = %selection.table.name());
        let _enter = span.enter();

        let result = load(db, &mut selection.table).map(|entries| {
            if let Some(join) = selection.spec.join() {
                event!(
                    Level::WARN,
                    target_table = %join.table,
                    "join is recorded but not evaluated"
                );
            }
            db.executor().execute(&selection.spec, entries)
        });
        let result = log_failure("get", result)?;

        if db.config().debug {
            let spec = &selection.spec;
            event!(
                Level::DEBUG,
                elapsed_ms = started.elapsed().as_millis() as u64,
                filters = spec.filters().len(),
                or_filters = spec.or_filters().len(),
                order = ?spec.order(),
                limit = ?spec.limit(),
                returned = result.len(),
                "entries fetched"
            );
        }

        selection.spec = selection.spec.clone().without_or_filters();
        Ok(result)
    }

    /// Number of entries the query yields.
    pub fn count(&mut self) -> Result<usize> {
        Ok(self.get()?.len())
    }

    /// Final entry of the query result. Nothing is removed.
    pub fn last(&mut self) -> Result<Option<Record>> {
        Ok(self.get()?.pop())
    }

    /// Id of the final entry of the query result.
    pub fn last_insert_id(&mut self) -> Result<Option<String>> {
        Ok(self.last()?.and_then(|r| r.id().map(str::to_string)))
    }

    /// First entry of the query result whose `field` loosely equals `value`.
    pub fn get_single(&mut self, field: &str, value: impl Into<Value>) -> Result<Option<Record>> {
        if field.is_empty() {
            return Err(JsonDbError::InvalidQuery("get_single needs a field".into()));
        }
        let value = value.into();
        let case_sensitive = self.db.config().case_sensitive;
        let found = self
            .get()?
            .into_iter()
            .find(|e| e.get(field).is_some_and(|v| loose_eq(v, &value, case_sensitive)));

        if self.db.config().debug {
            event!(Level::DEBUG, field, value = %value, found = found.is_some(), "single entry lookup");
        }
        Ok(found)
    }

    /// Entry of the query result with exactly this id.
    pub fn get_by_id(&mut self, id: &str) -> Result<Option<Record>> {
        if id.is_empty() {
            return Err(JsonDbError::InvalidQuery("get_by_id needs an id".into()));
        }
        Ok(self.get()?.into_iter().find(|e| e.id() == Some(id)))
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Append one record, generating its id when missing.
    pub fn insert(&mut self, record: Record) -> Result<Record> {
        let mut written = self.insert_many(vec![record])?;
        written.pop().ok_or_else(|| JsonDbError::InvalidRecord("nothing inserted".into()))
    }

    /// Append records. Fails with `DuplicateId` (writing nothing) when any
    /// id is already taken.
    pub fn insert_many(&mut self, records: Vec<Record>) -> Result<Vec<Record>> {
        self.write("insert", |entries, _| {
            let prepared = dml::prepare_insert(&entries, records)?;
            let mut next = entries;
            next.extend(prepared.iter().cloned());
            Ok((next, prepared))
        })
    }

    /// Insert, or replace the entry carrying the same id.
    pub fn upsert(&mut self, record: Record) -> Result<Record> {
        let mut written = self.upsert_many(vec![record])?;
        written.pop().ok_or_else(|| JsonDbError::InvalidRecord("nothing upserted".into()))
    }

    pub fn upsert_many(&mut self, records: Vec<Record>) -> Result<Vec<Record>> {
        self.write("upsert", |mut entries, _| {
            let written = dml::apply_upsert(&mut entries, records)?;
            Ok((entries, written))
        })
    }

    /// Overwrite the keys of `patch` on every matched entry that already has
    /// them. Returns the number of entries changed.
    pub fn update(&mut self, patch: Value) -> Result<usize> {
        let Value::Object(patch) = patch else {
            return Err(JsonDbError::InvalidRecord("update patch must be a JSON object".into()));
        };
        let db = self.db;
        self.write("update", |entries, spec| {
            let working = db.executor().execute(&spec.clone().without_projection(), &entries);
            let handle = db.lookup(spec.table())?;
            let authoritative = Table::read_snapshot(db.storage(), &handle)?;
            let outcome = update::apply_update(working, &patch, authoritative);
            Ok((outcome.entries, outcome.updated))
        })
    }

    /// Remove every entry the query matches. Returns the number removed.
    pub fn delete(&mut self) -> Result<usize> {
        let db = self.db;
        self.write("delete", |entries, spec| {
            let all = db.executor().execute(&spec.clone().without_conditions(), &entries);
            let doomed = db.executor().execute(&spec.clone().without_projection(), &entries);
            Ok(delete::difference(all, &doomed))
        })
    }

    /// Remove entries by id, ignoring the query. Returns the number removed.
    pub fn delete_by_ids<S: AsRef<str>>(&mut self, ids: &[S]) -> Result<usize> {
        self.write("delete_by_ids", |entries, _| Ok(delete::remove_ids(entries, ids)))
    }

    /// Replace the whole table with `records`.
    pub fn populate(&mut self, records: Vec<Record>) -> Result<Vec<Record>> {
        self.write("populate", |_, _| {
            let prepared = dml::prepare_insert(&[], records)?;
            Ok((prepared.clone(), prepared))
        })
    }

    /// Empty the table.
    pub fn truncate(&mut self) -> Result<()> {
        let db = self.db;
        let selection = self.selected()?;
        let span = info_span!("jsondb.truncate", table = %selection.table.name());
        let _enter = span.enter();

        let result = db
            .lookup(selection.table.name())
            .and_then(|_| selection.table.truncate(db.storage()));
        log_failure("truncate", result)?;
        if db.config().debug {
            event!(Level::DEBUG, "table truncated");
        }
        Ok(())
    }

    /// Delete the table from storage. The session has no table selected
    /// afterwards.
    pub fn destroy(&mut self) -> Result<()> {
        let db = self.db;
        let selection = self.selected()?;
        let name = selection.table.name().to_string();
        let span = info_span!("jsondb.destroy", table = %name);
        let _enter = span.enter();

        log_failure("destroy", db.drop_table(&name))?;
        self.selection = None;
        if db.config().debug {
            event!(Level::DEBUG, "table removed");
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn selected(&mut self) -> Result<&mut Selection> {
        self.selection.as_mut().ok_or(JsonDbError::NoTableSelected)
    }

    /// Read-modify-persist cycle shared by all writes. `op` gets the full
    /// current entries and the query and returns the new full entries plus
    /// the value handed back to the caller. In-memory entries only change
    /// when the write reaches storage.
    fn write<T, F>(&mut self, name: &'static str, op: F) -> Result<T>
    where
        F: FnOnce(Vec<Record>, &QuerySpec) -> Result<(Vec<Record>, T)>,
        T: Affected,
    {
        let db = self.db;
        let started = self.started;
        let selection = self.selected()?;
        let span = info_span!("jsondb.write", op = name, table = %selection.table.name());
        let _enter = span.enter();

        let result = (|| {
            let entries = load(db, &mut selection.table)?.to_vec();
            let (next, value) = op(entries, &selection.spec)?;
            let previous = selection.table.replace(next);
            if let Err(err) = selection.table.persist(db.storage()) {
                selection.table.replace(previous);
                return Err(err);
            }
            Ok(value)
        })();
        let value = log_failure(name, result)?;

        if db.config().debug {
            event!(
                Level::DEBUG,
                elapsed_ms = started.elapsed().as_millis() as u64,
                affected = value.affected(),
                total = selection.table.entries().len(),
                "{} finished",
                name
            );
        }

        selection.spec = selection.spec.clone().without_or_filters();
        Ok(value)
    }
}

/// How many entries a write touched, for tracing.
trait Affected {
    fn affected(&self) -> usize;
}

impl Affected for usize {
    fn affected(&self) -> usize {
        *self
    }
}

impl Affected for Vec<Record> {
    fn affected(&self) -> usize {
        self.len()
    }
}

fn load<'t>(db: &JsonDB, table: &'t mut Table) -> Result<&'t [Record]> {
    // A table destroyed elsewhere must not be silently recreated
    db.lookup(table.name())?;
    table.load(db.storage())
}

fn log_failure<T>(op: &'static str, result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
        event!(Level::ERROR, op, error = %err, "operation failed");
    }
    result
}
