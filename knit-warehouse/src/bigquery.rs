//! BigQuery v2 REST client.
//!
//! | capability               | endpoint                                           |
//! |--------------------------|----------------------------------------------------|
//! | `ensure_dataset`         | `POST projects/{p}/datasets` (409 = already there) |
//! | `run_query_materialized` | `POST projects/{p}/jobs`, then poll `GET jobs/{id}` |
//! | `table_metadata`         | `GET projects/{p}/datasets/{d}/tables/{t}`         |
//! | `read_rows`              | `POST projects/{p}/queries`, then poll `GET queries/{id}` |
//!
//! Timestamps arrive as strings of milliseconds since the Unix epoch.

use std::thread;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use serde_json::{json, Value};

use knit_core::{ResourceMetadata, TableRef};

use crate::config::WarehouseConfig;
use crate::error::WarehouseError;
use crate::{RowSet, Warehouse};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobReference {
    project_id: String,
    job_id: String,
    #[serde(default)]
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorProto {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobStatus {
    state: String,
    #[serde(default)]
    error_result: Option<ErrorProto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Job {
    job_reference: JobReference,
    #[serde(default)]
    status: Option<JobStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableResource {
    id: String,
    creation_time: String,
    last_modified_time: String,
    etag: String,
}

#[derive(Debug, Deserialize)]
struct FieldSchema {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TableSchema {
    #[serde(default)]
    fields: Vec<FieldSchema>,
}

#[derive(Debug, Deserialize)]
struct Cell {
    #[serde(default)]
    v: Value,
}

#[derive(Debug, Deserialize)]
struct Row {
    #[serde(default)]
    f: Vec<Cell>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    #[serde(default)]
    job_complete: bool,
    #[serde(default)]
    job_reference: Option<JobReference>,
    #[serde(default)]
    schema: Option<TableSchema>,
    #[serde(default)]
    rows: Vec<Row>,
    #[serde(default)]
    errors: Vec<ErrorProto>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorProto,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Blocking BigQuery client.
pub struct BigQuery {
    agent: ureq::Agent,
    config: WarehouseConfig,
}

impl BigQuery {
    pub fn new(config: WarehouseConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(config.request_timeout)
            .timeout_read(config.request_timeout)
            .build();
        Self { agent, config }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, WarehouseError> {
        let mut req = self
            .agent
            .get(&self.url(path))
            .set("Authorization", &self.config.token.header_value());
        for (key, value) in query {
            req = req.query(key, value);
        }
        let resp = req.call().map_err(http_error)?;
        decode(resp)
    }

    fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T, WarehouseError> {
        let resp = self
            .agent
            .post(&self.url(path))
            .set("Authorization", &self.config.token.header_value())
            .send_json(body)
            .map_err(http_error)?;
        decode(resp)
    }

    fn check_deadline(&self, started: Instant, job_id: &str) -> Result<(), WarehouseError> {
        match self.config.job_timeout {
            Some(limit) if started.elapsed() >= limit => Err(WarehouseError::Timeout {
                job_id: job_id.to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn wait_for_job(&self, mut job: Job) -> Result<(), WarehouseError> {
        let started = Instant::now();
        loop {
            if let Some(outcome) = job_outcome(&job) {
                return outcome;
            }
            self.check_deadline(started, &job.job_reference.job_id)?;
            thread::sleep(self.config.poll_interval);

            let reference = &job.job_reference;
            tracing::debug!(job_id = %reference.job_id, "polling job");
            let path = format!("projects/{}/jobs/{}", reference.project_id, reference.job_id);
            let query = location_query(reference.location.as_deref());
            job = self.get(&path, &query)?;
        }
    }
}

impl Warehouse for BigQuery {
    fn ensure_dataset(&self, project_id: &str, dataset_id: &str) -> Result<(), WarehouseError> {
        let mut body = json!({
            "datasetReference": { "projectId": project_id, "datasetId": dataset_id },
        });
        if let Some(location) = &self.config.location {
            body["location"] = json!(location);
        }
        dataset_create_result(self.post(&format!("projects/{project_id}/datasets"), &body))
    }

    fn run_query_materialized(
        &self,
        query: &str,
        destination: &TableRef,
    ) -> Result<(), WarehouseError> {
        let body = json!({
            "configuration": {
                "query": {
                    "query": query,
                    "useLegacySql": false,
                    "destinationTable": {
                        "projectId": destination.project_id,
                        "datasetId": destination.dataset_id,
                        "tableId": destination.table_id,
                    },
                    "createDisposition": "CREATE_IF_NEEDED",
                    "writeDisposition": "WRITE_EMPTY",
                }
            }
        });
        let job: Job = self.post(&format!("projects/{}/jobs", destination.project_id), &body)?;
        tracing::info!(job_id = %job.job_reference.job_id, destination = %destination, "query job submitted");
        self.wait_for_job(job)
    }

    fn table_metadata(&self, table: &TableRef) -> Result<ResourceMetadata, WarehouseError> {
        let path = format!(
            "projects/{}/datasets/{}/tables/{}",
            table.project_id, table.dataset_id, table.table_id
        );
        let resource: TableResource = self.get(&path, &[])?;
        resource.try_into()
    }

    fn read_rows(
        &self,
        project_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<RowSet, WarehouseError> {
        let body = json!({
            "query": query,
            "useLegacySql": false,
            "maxResults": limit,
        });
        let started = Instant::now();
        let mut resp: QueryResponse = self.post(&format!("projects/{project_id}/queries"), &body)?;

        while !resp.job_complete {
            let Some(reference) = &resp.job_reference else {
                return Err(WarehouseError::Decode(
                    "incomplete query response without a job reference".to_string(),
                ));
            };
            self.check_deadline(started, &reference.job_id)?;
            thread::sleep(self.config.poll_interval);

            let path = format!("projects/{}/queries/{}", reference.project_id, reference.job_id);
            let max_results = limit.to_string();
            let mut params = location_query(reference.location.as_deref());
            params.push(("maxResults", max_results.as_str()));
            resp = self.get(&path, &params)?;
        }

        if let Some(err) = resp.errors.first() {
            let job_id = resp
                .job_reference
                .as_ref()
                .map(|r| r.job_id.clone())
                .unwrap_or_default();
            return Err(WarehouseError::Job {
                job_id,
                message: err.message.clone(),
            });
        }

        Ok(row_set(resp, limit))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

impl TryFrom<TableResource> for ResourceMetadata {
    type Error = WarehouseError;

    fn try_from(t: TableResource) -> Result<Self, Self::Error> {
        Ok(ResourceMetadata {
            full_id: t.id,
            creation_time: parse_millis("creationTime", &t.creation_time)?,
            last_modified_time: parse_millis("lastModifiedTime", &t.last_modified_time)?,
            etag: t.etag,
        })
    }
}

/// 409 becomes the typed `AlreadyExists`; every other failure is kept as is.
fn dataset_create_result(
    result: Result<IgnoredAny, WarehouseError>,
) -> Result<(), WarehouseError> {
    match result {
        Ok(_) => Ok(()),
        Err(WarehouseError::Api { status: 409, message }) => {
            Err(WarehouseError::AlreadyExists(message))
        }
        Err(e) => Err(e),
    }
}

/// `None` while the job is still pending or running.
fn job_outcome(job: &Job) -> Option<Result<(), WarehouseError>> {
    let status = job.status.as_ref().filter(|s| s.state == "DONE")?;
    Some(match &status.error_result {
        Some(err) => Err(WarehouseError::Job {
            job_id: job.job_reference.job_id.clone(),
            message: err.message.clone(),
        }),
        None => Ok(()),
    })
}

fn parse_millis(field: &str, raw: &str) -> Result<DateTime<Utc>, WarehouseError> {
    raw.parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .ok_or_else(|| WarehouseError::Decode(format!("{field} is not epoch millis: {raw:?}")))
}

fn location_query(location: Option<&str>) -> Vec<(&'static str, &str)> {
    location.map(|l| vec![("location", l)]).unwrap_or_default()
}

fn row_set(resp: QueryResponse, limit: usize) -> RowSet {
    let columns = resp
        .schema
        .map(|s| s.fields.into_iter().map(|f| f.name).collect())
        .unwrap_or_default();
    let rows = resp
        .rows
        .into_iter()
        .take(limit)
        .map(|row| row.f.into_iter().map(|cell| cell_text(&cell.v)).collect())
        .collect();
    RowSet { columns, rows }
}

fn cell_text(v: &Value) -> String {
    match v {
        Value::Null => "NULL".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn decode<T: DeserializeOwned>(resp: ureq::Response) -> Result<T, WarehouseError> {
    resp.into_json()
        .map_err(|e| WarehouseError::Decode(e.to_string()))
}

fn http_error(err: ureq::Error) -> WarehouseError {
    match err {
        ureq::Error::Status(status, resp) => {
            let body = resp.into_string().unwrap_or_default();
            WarehouseError::Api {
                status,
                message: api_message(&body),
            }
        }
        ureq::Error::Transport(t) => WarehouseError::Transport(t.to_string()),
    }
}

/// The `error.message` of a Google API error body, or the raw body.
fn api_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::TimeZone;
    use rstest::rstest;

    use crate::config::AccessToken;

    fn job(state: &str, error: Option<&str>) -> Job {
        let mut raw = json!({
            "jobReference": {"projectId": "acme", "jobId": "job_7"},
            "status": {"state": state},
        });
        if let Some(message) = error {
            raw["status"]["errorResult"] = json!({"reason": "invalidQuery", "message": message});
        }
        serde_json::from_value(raw).unwrap()
    }

    fn client(job_timeout: Option<Duration>) -> BigQuery {
        let mut config = WarehouseConfig::new(AccessToken::new("t"));
        config.base_url = "http://127.0.0.1:9".to_string();
        config.job_timeout = job_timeout;
        BigQuery::new(config)
    }

    #[test]
    fn table_resource_maps_to_metadata() {
        let raw = r#"{
            "kind": "bigquery#table",
            "id": "acme:knit.orders",
            "etag": "Qm9vdHM=",
            "creationTime": "1709294400000",
            "lastModifiedTime": "1709368215123",
            "numRows": "12"
        }"#;
        let table: TableResource = serde_json::from_str(raw).unwrap();
        let meta = ResourceMetadata::try_from(table).unwrap();
        assert_eq!(meta.full_id, "acme:knit.orders");
        assert_eq!(meta.etag, "Qm9vdHM=");
        assert_eq!(meta.creation_time, Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
        assert_eq!(meta.last_modified_time.timestamp_millis(), 1_709_368_215_123);
    }

    #[rstest]
    #[case::empty("")]
    #[case::float("1.5")]
    #[case::iso("2024-03-01T12:00:00Z")]
    fn bad_millis_are_decode_errors(#[case] raw: &str) {
        let err = parse_millis("creationTime", raw).unwrap_err();
        assert!(matches!(err, WarehouseError::Decode(_)));
    }

    #[test]
    fn api_message_prefers_error_message() {
        let body = r#"{"error":{"code":409,"message":"Already Exists: Dataset acme:knit","status":"ALREADY_EXISTS"}}"#;
        assert_eq!(api_message(body), "Already Exists: Dataset acme:knit");
        assert_eq!(api_message("  bad gateway \n"), "bad gateway");
    }

    #[test]
    fn query_response_renders_rows() {
        let raw = r#"{
            "jobComplete": true,
            "schema": {"fields": [{"name": "id", "type": "INTEGER"}, {"name": "name", "type": "STRING"}]},
            "rows": [
                {"f": [{"v": "1"}, {"v": "ada"}]},
                {"f": [{"v": "2"}, {"v": null}]},
                {"f": [{"v": "3"}, {"v": [{"v": "x"}]}]}
            ]
        }"#;
        let resp: QueryResponse = serde_json::from_str(raw).unwrap();
        let rows = row_set(resp, 2);
        assert_eq!(rows.columns, vec!["id", "name"]);
        assert_eq!(
            rows.rows,
            vec![vec!["1".to_string(), "ada".to_string()], vec!["2".to_string(), "NULL".to_string()]]
        );
    }

    #[test]
    fn job_status_with_error_result_deserializes() {
        let raw = r#"{
            "jobReference": {"projectId": "acme", "jobId": "job_1", "location": "US"},
            "status": {"state": "DONE", "errorResult": {"reason": "invalidQuery", "message": "Syntax error"}}
        }"#;
        let job: Job = serde_json::from_str(raw).unwrap();
        let status = job.status.unwrap();
        assert_eq!(status.state, "DONE");
        assert_eq!(status.error_result.unwrap().message, "Syntax error");
        assert_eq!(job.job_reference.location.as_deref(), Some("US"));
    }

    #[test]
    fn location_query_is_optional() {
        assert!(location_query(None).is_empty());
        assert_eq!(location_query(Some("EU")), vec![("location", "EU")]);
    }

    #[test]
    fn dataset_create_success_is_ok() {
        assert!(dataset_create_result(Ok(IgnoredAny)).is_ok());
    }

    #[test]
    fn dataset_create_conflict_is_already_exists() {
        let err = dataset_create_result(Err(WarehouseError::Api {
            status: 409,
            message: "Already Exists: Dataset acme:knit".to_string(),
        }))
        .unwrap_err();
        assert!(
            matches!(&err, WarehouseError::AlreadyExists(m) if m == "Already Exists: Dataset acme:knit"),
            "{err:?}"
        );
    }

    #[rstest]
    #[case::forbidden(403)]
    #[case::not_found(404)]
    #[case::server_error(500)]
    fn dataset_create_other_statuses_surface(#[case] code: u16) {
        let err = dataset_create_result(Err(WarehouseError::Api {
            status: code,
            message: "nope".to_string(),
        }))
        .unwrap_err();
        assert!(matches!(err, WarehouseError::Api { status, .. } if status == code), "{err:?}");
    }

    #[test]
    fn dataset_create_transport_failure_surfaces() {
        let err =
            dataset_create_result(Err(WarehouseError::Transport("refused".to_string()))).unwrap_err();
        assert!(matches!(err, WarehouseError::Transport(_)));
    }

    #[test]
    fn done_job_with_error_result_is_job_error() {
        let outcome = job_outcome(&job("DONE", Some("Syntax error at [1:8]"))).unwrap();
        let err = outcome.unwrap_err();
        assert!(
            matches!(&err, WarehouseError::Job { job_id, message }
                if job_id == "job_7" && message == "Syntax error at [1:8]"),
            "{err:?}"
        );
    }

    #[test]
    fn done_job_without_error_is_ok() {
        assert!(matches!(job_outcome(&job("DONE", None)), Some(Ok(()))));
    }

    #[rstest]
    #[case::pending("PENDING")]
    #[case::running("RUNNING")]
    fn unfinished_job_has_no_outcome(#[case] state: &str) {
        assert!(job_outcome(&job(state, None)).is_none());
    }

    #[test]
    fn waiting_on_failed_job_returns_job_error_without_polling() {
        let err = client(None)
            .wait_for_job(job("DONE", Some("Access Denied")))
            .unwrap_err();
        assert!(matches!(err, WarehouseError::Job { .. }), "{err:?}");
    }

    #[test]
    fn exhausted_job_timeout_is_timeout() {
        let err = client(Some(Duration::ZERO))
            .wait_for_job(job("RUNNING", None))
            .unwrap_err();
        assert!(matches!(&err, WarehouseError::Timeout { job_id } if job_id == "job_7"), "{err:?}");
    }

    #[test]
    fn no_job_timeout_never_expires() {
        let started = Instant::now()
            .checked_sub(Duration::from_secs(3600))
            .unwrap_or_else(Instant::now);
        assert!(client(None).check_deadline(started, "job_7").is_ok());
        assert!(client(Some(Duration::from_secs(7200)))
            .check_deadline(started, "job_7")
            .is_ok());
    }
}
