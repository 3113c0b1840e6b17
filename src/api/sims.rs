use super::{ApiClient, ApiError, Query};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const MAX_SIMS_PAGE_SIZE: u32 = 100;
pub const MAX_EVENTS_PAGE_SIZE: u32 = 1000;

/// The format dates are exchanged in for usage queries.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The administrative states a SIM may be placed in.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimStatus {
    Enabled,
    Disabled,
}

/// Changes to apply to a SIM. Fields left as `None` are not sent.
#[derive(Debug, Clone, PartialEq)]
pub struct SimUpdate {
    pub status: SimStatus,
    pub label: Option<String>,
    pub imei_lock: Option<bool>,
}

/// Filtering and ordering for SIM listings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimFilter {
    /// e.g. `imei:12345,ip_address:10.0.0.1`
    pub query: Option<String>,
    /// e.g. `ip_address,-imei`
    pub sort: Option<String>,
}

/// Builds the path for a SIM resource, refusing anything that isn't plainly an ICCID.
///
/// ICCIDs are digits, although some carry a trailing hex check character,
/// so we permit any ASCII alphanumerics and nothing else.
fn sim_path(iccid: &str, suffix: &str) -> Result<String, ApiError> {
    if iccid.is_empty() || !iccid.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ApiError::InvalidIccid(iccid.to_string()));
    }
    Ok(format!("v1/sims/{iccid}{suffix}"))
}

impl ApiClient {
    pub async fn list_sims(
        &self,
        page: u32,
        page_size: u32,
        filter: &SimFilter,
    ) -> Result<Value, ApiError> {
        let mut query: Query = vec![
            ("page", page.to_string()),
            ("pageSize", page_size.min(MAX_SIMS_PAGE_SIZE).to_string()),
        ];
        if let Some(q) = filter.query.as_ref().filter(|q| !q.is_empty()) {
            query.push(("q", q.clone()));
        }
        if let Some(sort) = filter.sort.as_ref().filter(|s| !s.is_empty()) {
            query.push(("sort", sort.clone()));
        }
        self.get("v1/sims", Some(&query)).await
    }

    pub async fn get_sim(&self, iccid: &str) -> Result<Value, ApiError> {
        self.get(&sim_path(iccid, "")?, None).await
    }

    /// Connectivity status: whether the SIM is online, attached, or offline.
    pub async fn get_sim_status(&self, iccid: &str) -> Result<Value, ApiError> {
        self.get(&sim_path(iccid, "/status")?, None).await
    }

    pub async fn get_sim_data_quota(&self, iccid: &str) -> Result<Value, ApiError> {
        self.get(&sim_path(iccid, "/quota/data")?, None).await
    }

    pub async fn get_sim_sms_quota(&self, iccid: &str) -> Result<Value, ApiError> {
        self.get(&sim_path(iccid, "/quota/sms")?, None).await
    }

    /// Changes a SIM's status, and optionally its label or IMEI lock.
    pub async fn update_sim(&self, iccid: &str, update: &SimUpdate) -> Result<Value, ApiError> {
        let path = sim_path(iccid, "")?;
        let mut body = json!({
            "iccid": iccid,
            "status": update.status,
        });
        if let Some(label) = &update.label {
            body["label"] = json!(label);
        }
        if let Some(imei_lock) = update.imei_lock {
            body["imei_lock"] = json!(imei_lock);
        }
        self.put(&path, &body).await
    }

    /// Daily usage statistics between two dates, inclusive.
    pub async fn get_sim_usage(
        &self,
        iccid: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Value, ApiError> {
        let path = sim_path(iccid, "/usage")?;
        let query: Query = vec![
            ("start_dt", start.format(DATE_FORMAT).to_string()),
            ("end_dt", end.format(DATE_FORMAT).to_string()),
        ];
        self.get(&path, Some(&query)).await
    }

    pub async fn get_sim_events(
        &self,
        iccid: &str,
        page: u32,
        page_size: u32,
        sort: &str,
    ) -> Result<Value, ApiError> {
        let path = sim_path(iccid, "/events")?;
        let query: Query = vec![
            ("page", page.to_string()),
            ("pageSize", page_size.min(MAX_EVENTS_PAGE_SIZE).to_string()),
            ("sort", sort.to_string()),
        ];
        self.get(&path, Some(&query)).await
    }

    pub async fn reset_sim_connectivity(&self, iccid: &str) -> Result<Value, ApiError> {
        self.post(&sim_path(iccid, "/reset")?, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{client_for, mock_token};
    use mockito::{Matcher, Server};

    const ICCID: &str = "8988280666000000001";

    #[test]
    fn test_sim_path_rejects_traversal() {
        assert!(matches!(
            sim_path("../orders", ""),
            Err(ApiError::InvalidIccid(_))
        ));
        assert!(matches!(sim_path("", ""), Err(ApiError::InvalidIccid(_))));
        assert_eq!(
            sim_path("89882806660000000F1", "/status").unwrap(),
            "v1/sims/89882806660000000F1/status"
        );
    }

    #[tokio::test]
    async fn test_invalid_iccid_sends_nothing() {
        let mut server = Server::new_async().await;
        let token = mock_token(&mut server, "token-1", 3600, 0).await;

        let client = client_for(&server);
        let err = client.get_sim("1234/quota").await.unwrap_err();

        assert!(matches!(err, ApiError::InvalidIccid(_)));
        token.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_sims_with_filter() {
        let mut server = Server::new_async().await;
        let _token = mock_token(&mut server, "token-1", 3600, 1).await;
        let mock = server
            .mock("GET", "/v1/sims")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("page".to_string(), "1".to_string()),
                Matcher::UrlEncoded("pageSize".to_string(), "100".to_string()),
                Matcher::UrlEncoded("q".to_string(), "imei:12345".to_string()),
                Matcher::UrlEncoded("sort".to_string(), "-imei".to_string()),
            ]))
            .with_status(200)
            .with_body("[]")
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        let filter = SimFilter {
            query: Some("imei:12345".to_string()),
            sort: Some("-imei".to_string()),
        };
        client.list_sims(1, 500, &filter).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unknown_iccid_is_404() {
        let mut server = Server::new_async().await;
        let _token = mock_token(&mut server, "token-1", 3600, 1).await;
        let _mock = server
            .mock("GET", format!("/v1/sims/{ICCID}").as_str())
            .with_status(404)
            .with_body(r#"{"statusCode":404,"message":"SIM not found"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        match client.get_sim(ICCID).await.unwrap_err() {
            ApiError::Status { status, body } => {
                assert_eq!(status, 404);
                assert!(body.contains("SIM not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_quota_paths() {
        let mut server = Server::new_async().await;
        let _token = mock_token(&mut server, "token-1", 3600, 1).await;
        let data = server
            .mock("GET", format!("/v1/sims/{ICCID}/quota/data").as_str())
            .with_status(200)
            .with_body(r#"{"volume":500.0,"total_volume":500.0}"#)
            .expect(1)
            .create_async()
            .await;
        let sms = server
            .mock("GET", format!("/v1/sims/{ICCID}/quota/sms").as_str())
            .with_status(200)
            .with_body(r#"{"volume":250,"total_volume":250}"#)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        assert_eq!(client.get_sim_data_quota(ICCID).await.unwrap()["volume"], 500.0);
        assert_eq!(client.get_sim_sms_quota(ICCID).await.unwrap()["volume"], 250);
        data.assert_async().await;
        sms.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_sim_body() {
        let mut server = Server::new_async().await;
        let _token = mock_token(&mut server, "token-1", 3600, 1).await;
        let mock = server
            .mock("PUT", format!("/v1/sims/{ICCID}").as_str())
            .match_body(Matcher::Json(json!({
                "iccid": ICCID,
                "status": "Disabled",
                "imei_lock": true,
            })))
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        let update = SimUpdate {
            status: SimStatus::Disabled,
            label: None,
            imei_lock: Some(true),
        };
        client.update_sim(ICCID, &update).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_usage_and_events_queries() {
        let mut server = Server::new_async().await;
        let _token = mock_token(&mut server, "token-1", 3600, 1).await;
        let usage = server
            .mock("GET", format!("/v1/sims/{ICCID}/usage").as_str())
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("start_dt".to_string(), "2024-01-01".to_string()),
                Matcher::UrlEncoded("end_dt".to_string(), "2024-01-31".to_string()),
            ]))
            .with_status(200)
            .with_body(r#"{"stats":[]}"#)
            .expect(1)
            .create_async()
            .await;
        let events = server
            .mock("GET", format!("/v1/sims/{ICCID}/events").as_str())
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("pageSize".to_string(), "1000".to_string()),
                Matcher::UrlEncoded("sort".to_string(), "-timestamp".to_string()),
            ]))
            .with_status(200)
            .with_body("[]")
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        client.get_sim_usage(ICCID, start, end).await.unwrap();
        client
            .get_sim_events(ICCID, 1, 5000, "-timestamp")
            .await
            .unwrap();
        usage.assert_async().await;
        events.assert_async().await;
    }

    #[tokio::test]
    async fn test_reset_connectivity() {
        let mut server = Server::new_async().await;
        let _token = mock_token(&mut server, "token-1", 3600, 1).await;
        let mock = server
            .mock("POST", format!("/v1/sims/{ICCID}/reset").as_str())
            .match_header("authorization", "Bearer token-1")
            .with_status(201)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        client.reset_sim_connectivity(ICCID).await.unwrap();
        mock.assert_async().await;
    }
}
