/// REST client for the managed backend
///
/// Ranked candidates come from remote procedures (`/rest/v1/rpc/{name}`),
/// records from table selects filtered with `id=in.(...)`.
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::clients::{CandidateSource, RecordResolver};
use crate::config::BackendConfig;
use crate::error::{FeedError, Result};
use crate::loader::unique_ids;
use crate::models::{
    AttemptRef, ChallengeDetail, ChallengeRef, ChallengeRow, FeedMode, ProfileRef, ViewerId,
};
use crate::session::ViewerContext;

const ATTEMPT_COLUMNS: &str = "id,challenge_id,user_id,caption,video_path,like_count,created_at";
const CHALLENGE_COLUMNS: &str = "id,title,description,hype_count,ends_at,created_at";
const CHALLENGE_TITLE_COLUMNS: &str = "id,title";
const CHALLENGE_DETAIL_COLUMNS: &str = "id,creator_id,type,target_user_id,title,description,\
hype_count,ends_at,is_finalized,finalized_at,winner_attempt_id,created_at";
const PROFILE_COLUMNS: &str = "id,username";

#[derive(Debug, Deserialize)]
struct AttemptCandidateRow {
    attempt_id: String,
}

#[derive(Debug, Deserialize)]
struct ChallengeCandidateRow {
    challenge_id: String,
}

#[derive(Debug, Deserialize)]
struct ChallengeTitleRow {
    id: String,
    title: String,
}

#[derive(Clone)]
pub struct RestBackendClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    session: ViewerContext,
}

impl RestBackendClient {
    pub fn new(config: &BackendConfig, session: ViewerContext) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            session,
        })
    }

    fn rpc_url(&self, procedure: &str) -> String {
        format!("{}/rest/v1/rpc/{}", self.base_url, procedure)
    }

    fn select_url(&self, table: &str, columns: &str, ids: &[String]) -> String {
        let quoted: Vec<String> = ids
            .iter()
            .map(|id| format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\"")))
            .collect();
        let filter = format!("in.({})", quoted.join(","));
        format!(
            "{}/rest/v1/{}?select={}&id={}",
            self.base_url,
            table,
            columns,
            urlencoding::encode(&filter)
        )
    }

    /// Viewer access token when signed in, anon key otherwise
    fn bearer_token(&self) -> String {
        self.session
            .access_token()
            .unwrap_or_else(|| self.anon_key.clone())
    }

    async fn call_rpc<T: DeserializeOwned>(
        &self,
        procedure: &str,
        body: serde_json::Value,
    ) -> Result<T> {
        debug!(procedure = %procedure, "Calling backend procedure");
        let response = self
            .http
            .post(self.rpc_url(procedure))
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer_token())
            .json(&body)
            .send()
            .await?;
        decode_response(response).await
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        columns: &str,
        ids: &[String],
    ) -> Result<Vec<T>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        debug!(table = %table, count = ids.len(), "Selecting backend rows");
        let response = self
            .http
            .get(self.select_url(table, columns, ids))
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer_token())
            .send()
            .await?;
        decode_response(response).await
    }

    /// Full challenge record for a detail view, `None` when the id is unknown
    pub async fn challenge_detail(&self, id: &str) -> Result<Option<ChallengeDetail>> {
        let rows: Vec<ChallengeRow> = self
            .select("challenges", CHALLENGE_DETAIL_COLUMNS, &[id.to_string()])
            .await?;
        rows.into_iter()
            .next()
            .map(ChallengeDetail::try_from)
            .transpose()
    }
}

async fn decode_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        let message = backend_message(status, &body);
        warn!(status = status.as_u16(), message = %message, "Backend request failed");
        return Err(FeedError::Backend {
            status: status.as_u16(),
            message,
        });
    }

    Ok(serde_json::from_slice(&body)?)
}

/// Error text from a backend error body (`{"message": ...}`), raw body otherwise
fn backend_message(status: StatusCode, body: &[u8]) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    if let Ok(parsed) = serde_json::from_slice::<ErrorBody>(body) {
        return parsed.message;
    }
    let text = String::from_utf8_lossy(body).trim().to_string();
    if text.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        text
    }
}

fn candidate_body(viewer: &ViewerId, limit: usize) -> serde_json::Value {
    json!({
        "p_viewer_id": viewer.as_str(),
        "p_limit": limit,
    })
}

#[async_trait]
impl CandidateSource for RestBackendClient {
    async fn ranked_attempt_ids(
        &self,
        viewer: &ViewerId,
        mode: FeedMode,
        limit: usize,
    ) -> Result<Vec<String>> {
        let rows: Vec<AttemptCandidateRow> = self
            .call_rpc(mode.attempt_procedure(), candidate_body(viewer, limit))
            .await?;
        Ok(rows.into_iter().map(|r| r.attempt_id).collect())
    }

    async fn ranked_challenge_ids(
        &self,
        viewer: &ViewerId,
        mode: FeedMode,
        limit: usize,
    ) -> Result<Vec<String>> {
        let rows: Vec<ChallengeCandidateRow> = self
            .call_rpc(mode.challenge_procedure(), candidate_body(viewer, limit))
            .await?;
        Ok(rows.into_iter().map(|r| r.challenge_id).collect())
    }
}

#[async_trait]
impl RecordResolver for RestBackendClient {
    async fn attempts(&self, ids: &[String]) -> Result<Vec<AttemptRef>> {
        let mut attempts: Vec<AttemptRef> = self.select("attempts", ATTEMPT_COLUMNS, ids).await?;

        let parent_ids = unique_ids(attempts.iter().map(|a| a.challenge_id.as_str()), usize::MAX);
        let titles: Vec<ChallengeTitleRow> = self
            .select("challenges", CHALLENGE_TITLE_COLUMNS, &parent_ids)
            .await?;
        let titles: HashMap<String, String> =
            titles.into_iter().map(|row| (row.id, row.title)).collect();

        for attempt in &mut attempts {
            attempt.challenge_title = titles.get(&attempt.challenge_id).cloned();
        }
        Ok(attempts)
    }

    async fn challenges(&self, ids: &[String]) -> Result<Vec<ChallengeRef>> {
        self.select("challenges", CHALLENGE_COLUMNS, ids).await
    }

    async fn profiles(&self, user_ids: &[String]) -> Result<Vec<ProfileRef>> {
        self.select("profiles", PROFILE_COLUMNS, user_ids).await
    }
}
