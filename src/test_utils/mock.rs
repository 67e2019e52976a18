use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::driver::{
    BoundParameter, ConnectAttributes, Driver, DriverConnection, DriverError, DriverStatement,
    PrepareOptions,
};
use crate::results::Row;
use crate::types::{BindSource, ParamKey, ParamType, SqlValue};

/// Driver operations a failure can be injected into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    Connect,
    Prepare,
    Query,
    Bind,
    Execute,
    Fetch,
    Begin,
    Commit,
    Rollback,
    LastInsertId,
}

/// Everything the mock has seen, plus its scripted behavior.
#[derive(Debug, Clone)]
pub struct MockState {
    pub connects: usize,
    pub credentials: Vec<(Option<String>, Option<String>)>,
    pub attributes: Vec<ConnectAttributes>,
    pub prepared: Vec<String>,
    pub queries: Vec<String>,
    /// Every successful `bind`, value as it was at bind time.
    pub binds: Vec<BoundParameter>,
    /// Every execution: SQL and the bound values as read at execute time.
    pub executed: Vec<(String, Vec<BoundParameter>)>,
    pub in_transaction: bool,
    pub last_insert_id: i64,
    /// What `execute` reports.
    pub execute_result: bool,
    /// `query` returns no handle when false.
    pub query_returns_handle: bool,
    pub affected_rows: u64,
    /// Placeholders statements accept; any key is accepted when `None`.
    pub parameters: Option<Vec<ParamKey>>,
    /// Rows returned for an exact SQL text.
    pub rows: HashMap<String, (Vec<String>, Vec<Vec<SqlValue>>)>,
    /// Failures raised the next time an operation runs.
    pub failures: HashMap<MockOp, DriverError>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            connects: 0,
            credentials: Vec::new(),
            attributes: Vec::new(),
            prepared: Vec::new(),
            queries: Vec::new(),
            binds: Vec::new(),
            executed: Vec::new(),
            in_transaction: false,
            last_insert_id: 0,
            execute_result: true,
            query_returns_handle: true,
            affected_rows: 1,
            parameters: None,
            rows: HashMap::new(),
            failures: HashMap::new(),
        }
    }
}

type Shared = Arc<Mutex<MockState>>;

fn lock(state: &Shared) -> MutexGuard<'_, MockState> {
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn take_failure(state: &Shared, op: MockOp) -> Result<(), DriverError> {
    match lock(state).failures.remove(&op) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Scripted driver. Clones share state, so a test keeps one clone to inspect
/// what the facade did with the other.
#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    state: Shared,
}

impl MockDriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `op` with `err`.
    pub fn fail_next(&self, op: MockOp, err: DriverError) {
        lock(&self.state).failures.insert(op, err);
    }

    /// Rows to return whenever `sql` is executed.
    pub fn set_rows(&self, sql: &str, columns: &[&str], rows: Vec<Vec<SqlValue>>) {
        let columns = columns.iter().map(|c| (*c).to_owned()).collect();
        lock(&self.state).rows.insert(sql.to_owned(), (columns, rows));
    }

    /// Restrict statements to these placeholders; others fail with `HY093`.
    pub fn set_parameters(&self, keys: &[&str]) {
        lock(&self.state).parameters = Some(keys.iter().map(|k| ParamKey::named(k)).collect());
    }

    pub fn set_execute_result(&self, result: bool) {
        lock(&self.state).execute_result = result;
    }

    pub fn set_query_returns_handle(&self, returns_handle: bool) {
        lock(&self.state).query_returns_handle = returns_handle;
    }

    /// Flip the transaction flag as if another client had changed it.
    pub fn set_in_transaction(&self, active: bool) {
        lock(&self.state).in_transaction = active;
    }

    /// Copy of the recorded state.
    #[must_use]
    pub fn snapshot(&self) -> MockState {
        lock(&self.state).clone()
    }
}

impl Driver for MockDriver {
    fn connect(
        &self,
        _dsn: &str,
        user: Option<&str>,
        password: Option<&str>,
        attributes: &ConnectAttributes,
    ) -> Result<Box<dyn DriverConnection>, DriverError> {
        take_failure(&self.state, MockOp::Connect)?;
        {
            let mut state = lock(&self.state);
            state.connects += 1;
            state
                .credentials
                .push((user.map(str::to_owned), password.map(str::to_owned)));
            state.attributes.push(attributes.clone());
        }
        Ok(Box::new(MockConnection {
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockConnection {
    state: Shared,
}

impl DriverConnection for MockConnection {
    fn prepare(
        &mut self,
        sql: &str,
        _options: &PrepareOptions,
    ) -> Result<Box<dyn DriverStatement>, DriverError> {
        take_failure(&self.state, MockOp::Prepare)?;
        lock(&self.state).prepared.push(sql.to_owned());
        Ok(Box::new(MockStatement::new(Arc::clone(&self.state), sql)))
    }

    fn query(&mut self, sql: &str) -> Result<Option<Box<dyn DriverStatement>>, DriverError> {
        take_failure(&self.state, MockOp::Query)?;
        let returns_handle = {
            let mut state = lock(&self.state);
            state.queries.push(sql.to_owned());
            state.query_returns_handle
        };
        if !returns_handle {
            return Ok(None);
        }
        let mut stmt = MockStatement::new(Arc::clone(&self.state), sql);
        stmt.run();
        Ok(Some(Box::new(stmt)))
    }

    fn begin_transaction(&mut self) -> Result<(), DriverError> {
        take_failure(&self.state, MockOp::Begin)?;
        let mut state = lock(&self.state);
        if state.in_transaction {
            return Err(DriverError::new("25000", "There is already an active transaction"));
        }
        state.in_transaction = true;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), DriverError> {
        take_failure(&self.state, MockOp::Commit)?;
        lock(&self.state).in_transaction = false;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), DriverError> {
        take_failure(&self.state, MockOp::Rollback)?;
        lock(&self.state).in_transaction = false;
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        lock(&self.state).in_transaction
    }

    fn last_insert_id(&self, _name: Option<&str>) -> Result<String, DriverError> {
        take_failure(&self.state, MockOp::LastInsertId)?;
        Ok(lock(&self.state).last_insert_id.to_string())
    }
}

struct MockStatement {
    state: Shared,
    sql: String,
    bindings: Vec<(ParamKey, BindSource, ParamType)>,
    rows: Option<VecDeque<Row>>,
    row_count: Option<u64>,
}

impl MockStatement {
    fn new(state: Shared, sql: &str) -> Self {
        Self {
            state,
            sql: sql.to_owned(),
            bindings: Vec::new(),
            rows: None,
            row_count: None,
        }
    }

    fn run(&mut self) -> bool {
        let params = self.bound_parameters();
        let mut state = lock(&self.state);
        state.executed.push((self.sql.clone(), params));
        if let Some((columns, rows)) = state.rows.get(&self.sql) {
            let columns = Arc::new(columns.clone());
            let rows: VecDeque<Row> = rows
                .iter()
                .map(|values| Row::new(Arc::clone(&columns), values.clone()))
                .collect();
            self.row_count = Some(rows.len() as u64);
            self.rows = Some(rows);
        } else {
            if self.sql.trim_start().to_ascii_uppercase().starts_with("INSERT") {
                state.last_insert_id += 1;
            }
            self.row_count = Some(state.affected_rows);
            self.rows = Some(VecDeque::new());
        }
        state.execute_result
    }

    fn not_executed() -> DriverError {
        DriverError::new("HY010", "statement has not been executed")
    }

    fn known_parameter(&self, key: &ParamKey) -> Result<(), DriverError> {
        match &lock(&self.state).parameters {
            Some(keys) if !keys.contains(key) => Err(DriverError::new(
                "HY093",
                format!("parameter {key} does not exist in the statement"),
            )),
            _ => Ok(()),
        }
    }
}

impl DriverStatement for MockStatement {
    fn sql(&self) -> &str {
        &self.sql
    }

    fn check(
        &self,
        key: &ParamKey,
        _source: &BindSource,
        _ty: ParamType,
    ) -> Result<(), DriverError> {
        self.known_parameter(key)
    }

    fn bind(
        &mut self,
        key: &ParamKey,
        source: BindSource,
        ty: ParamType,
    ) -> Result<(), DriverError> {
        take_failure(&self.state, MockOp::Bind)?;
        self.known_parameter(key)?;
        lock(&self.state).binds.push(BoundParameter {
            key: key.clone(),
            value: source.resolve(),
            param_type: ty,
            by_reference: source.is_reference(),
        });
        self.bindings.retain(|(existing, _, _)| existing != key);
        self.bindings.push((key.clone(), source, ty));
        Ok(())
    }

    fn bound_parameters(&self) -> Vec<BoundParameter> {
        self.bindings
            .iter()
            .map(|(key, source, ty)| BoundParameter {
                key: key.clone(),
                value: source.resolve(),
                param_type: *ty,
                by_reference: source.is_reference(),
            })
            .collect()
    }

    fn execute(&mut self) -> Result<bool, DriverError> {
        take_failure(&self.state, MockOp::Execute)?;
        Ok(self.run())
    }

    fn fetch(&mut self) -> Result<Option<Row>, DriverError> {
        take_failure(&self.state, MockOp::Fetch)?;
        let rows = self.rows.as_mut().ok_or_else(Self::not_executed)?;
        Ok(rows.pop_front())
    }

    fn fetch_all(&mut self) -> Result<Vec<Row>, DriverError> {
        take_failure(&self.state, MockOp::Fetch)?;
        let rows = self.rows.as_mut().ok_or_else(Self::not_executed)?;
        Ok(rows.drain(..).collect())
    }

    fn row_count(&self) -> Result<u64, DriverError> {
        self.row_count.ok_or_else(Self::not_executed)
    }
}
