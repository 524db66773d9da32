//! Snowflake SQL API v2 store.
//!
//! ## Protocol
//!
//! 1. `POST /api/v2/statements` with the statement, session context
//!    (database, schema, warehouse, role) and positional `?` bindings.
//! 2. `200` → result (first partition inline). `202` → still running; poll
//!    `GET /api/v2/statements/{handle}` until it is not `202`.
//! 3. Results with several partitions: fetch `?partition=N` for N ≥ 1 and
//!    append in order.
//!
//! One [`ureq::Agent`] with a single pooled connection serves every call.
//! Calls are made one at a time, so the store never has two requests in
//! flight.

use std::collections::BTreeMap;
use std::thread::sleep;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use ureq::{Agent, AgentBuilder, Request, Response};

use alertsync_core::{Guid, SpecKind};

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::store::SpecStore;

/// Delay between polls of a statement the API accepted asynchronously.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

const USER_AGENT: &str = concat!("alertsync/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Statement text
// ---------------------------------------------------------------------------

pub(crate) fn select_sql(table: &str, column: &str) -> String {
    format!("select {column} from {table};")
}

pub(crate) fn insert_sql(table: &str) -> String {
    format!("insert into {table} select parse_json(column1) from values (?);")
}

pub(crate) fn delete_sql(table: &str, column: &str) -> String {
    format!("delete from {table} where {column}:GUID = ?;")
}

pub(crate) fn update_sql(table: &str, column: &str) -> String {
    format!("update {table} set {column} = parse_json(?) where {column}:GUID = ?;")
}

pub(crate) fn create_table_sql(table: &str, column: &str) -> String {
    format!("create table if not exists {table} ({column} variant);")
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct StatementRequest<'a> {
    statement: &'a str,
    database: &'a str,
    schema: &'a str,
    warehouse: &'a str,
    role: &'a str,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    bindings: BTreeMap<String, Binding<'a>>,
}

#[derive(Debug, Serialize)]
struct Binding<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatementResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    statement_handle: Option<String>,
    #[serde(default)]
    result_set_meta_data: Option<ResultSetMetaData>,
    #[serde(default)]
    data: Vec<Vec<Option<String>>>,
    #[serde(default)]
    stats: Option<Stats>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultSetMetaData {
    #[serde(default)]
    num_rows: u64,
    #[serde(default)]
    partition_info: Vec<PartitionInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartitionInfo {
    #[serde(default)]
    row_count: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Stats {
    #[serde(default)]
    num_rows_inserted: u64,
    #[serde(default)]
    num_rows_deleted: u64,
    #[serde(default)]
    num_rows_updated: u64,
}

impl StatementResponse {
    fn partition_count(&self) -> usize {
        self.result_set_meta_data
            .as_ref()
            .map(|m| m.partition_info.len())
            .unwrap_or(0)
    }

    fn rows_affected(&self) -> u64 {
        self.stats
            .as_ref()
            .map(|s| s.num_rows_inserted + s.num_rows_deleted + s.num_rows_updated)
            .unwrap_or(0)
    }

    /// First column of every row.
    fn into_payloads(self) -> Result<Vec<String>, StoreError> {
        self.data
            .into_iter()
            .enumerate()
            .map(|(row, columns)| {
                columns
                    .into_iter()
                    .next()
                    .flatten()
                    .ok_or(StoreError::EmptyRow { row })
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// [`SpecStore`] backed by the Snowflake SQL API.
pub struct SnowflakeStore {
    agent: Agent,
    config: StoreConfig,
    base_url: String,
    poll_interval: Duration,
}

impl SnowflakeStore {
    /// Build a store for `config`. No request is made until the first call.
    pub fn new(config: StoreConfig) -> Self {
        let agent = AgentBuilder::new()
            .max_idle_connections(1)
            .max_idle_connections_per_host(1)
            .user_agent(USER_AGENT)
            .build();
        let base_url = config.base_url();
        tracing::info!(
            account = %config.account,
            user = %config.user,
            warehouse = %config.warehouse,
            role = %config.role,
            "configured store"
        );
        Self {
            agent,
            config,
            base_url,
            poll_interval: POLL_INTERVAL,
        }
    }

    /// Override the delay between polls of a running statement.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    fn table(&self, kind: SpecKind) -> String {
        self.config.qualified_table(kind)
    }

    fn authorized(&self, request: Request) -> Request {
        request
            .set("Authorization", &format!("Bearer {}", self.config.token))
            .set(
                "X-Snowflake-Authorization-Token-Type",
                self.config.token_type.header_value(),
            )
            .set("Accept", "application/json")
    }

    fn request_body<'a>(&'a self, statement: &'a str, binds: &[&'a str]) -> StatementRequest<'a> {
        let bindings = binds
            .iter()
            .copied()
            .enumerate()
            .map(|(i, value)| {
                (
                    (i + 1).to_string(),
                    Binding {
                        kind: "TEXT",
                        value,
                    },
                )
            })
            .collect();
        StatementRequest {
            statement,
            database: &self.config.database,
            schema: &self.config.schema,
            warehouse: &self.config.warehouse,
            role: &self.config.role,
            bindings,
        }
    }

    /// Run one statement to completion and return its full result.
    fn execute(&self, statement: &str, binds: &[&str]) -> Result<StatementResponse, StoreError> {
        tracing::debug!(statement, "executing");
        let url = format!("{}/api/v2/statements", self.base_url);
        let body = self.request_body(statement, binds);
        let (mut status, mut response) =
            read_response(self.authorized(self.agent.post(&url)).send_json(&body))?;

        while status == 202 {
            let handle = response
                .statement_handle
                .clone()
                .ok_or(StoreError::MissingHandle)?;
            tracing::debug!(%handle, "statement still running");
            sleep(self.poll_interval);
            let url = format!("{}/api/v2/statements/{handle}", self.base_url);
            (status, response) = read_response(self.authorized(self.agent.get(&url)).call())?;
        }

        let partitions = response.partition_count();
        if partitions > 1 {
            let handle = response
                .statement_handle
                .clone()
                .ok_or(StoreError::MissingHandle)?;
            let url = format!("{}/api/v2/statements/{handle}", self.base_url);
            for partition in 1..partitions {
                let request = self
                    .authorized(self.agent.get(&url))
                    .query("partition", &partition.to_string());
                let (_, next) = read_response(request.call())?;
                response.data.extend(next.data);
            }
        }
        Ok(response)
    }
}

fn read_response(
    result: Result<Response, ureq::Error>,
) -> Result<(u16, StatementResponse), StoreError> {
    match result {
        Ok(response) => {
            let status = response.status();
            let body = response.into_json().map_err(StoreError::Response)?;
            Ok((status, body))
        }
        Err(ureq::Error::Status(status, response)) => {
            let body: StatementResponse = response.into_json().unwrap_or_default();
            Err(StoreError::Api {
                status,
                code: body.code.unwrap_or_default(),
                message: body.message.unwrap_or_else(|| "no message".to_owned()),
            })
        }
        Err(err) => Err(StoreError::Request(Box::new(err))),
    }
}

impl SpecStore for SnowflakeStore {
    fn fetch_payloads(&mut self, kind: SpecKind) -> Result<Vec<String>, StoreError> {
        let response = self.execute(&select_sql(&self.table(kind), kind.column()), &[])?;
        if let Some(meta) = &response.result_set_meta_data {
            tracing::debug!(
                rows = meta.num_rows,
                partitions = meta.partition_info.len(),
                first_partition_rows = meta.partition_info.first().map(|p| p.row_count),
                "fetched {kind} specs"
            );
        }
        response.into_payloads()
    }

    fn insert_payload(&mut self, kind: SpecKind, payload: &str) -> Result<(), StoreError> {
        self.execute(&insert_sql(&self.table(kind)), &[payload])?;
        Ok(())
    }

    fn delete_by_guid(&mut self, kind: SpecKind, guid: &Guid) -> Result<u64, StoreError> {
        let response = self.execute(
            &delete_sql(&self.table(kind), kind.column()),
            &[guid.as_str()],
        )?;
        Ok(response.rows_affected())
    }

    fn update_by_guid(
        &mut self,
        kind: SpecKind,
        guid: &Guid,
        payload: &str,
    ) -> Result<u64, StoreError> {
        let response = self.execute(
            &update_sql(&self.table(kind), kind.column()),
            &[payload, guid.as_str()],
        )?;
        Ok(response.rows_affected())
    }

    fn create_table(&mut self, kind: SpecKind) -> Result<(), StoreError> {
        self.execute(&create_table_sql(&self.table(kind), kind.column()), &[])?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
