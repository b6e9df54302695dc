use anyhow::{anyhow, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error};

use shared_config::AppConfig;

/// User record as the platform's auth API returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub user_metadata: Option<Value>,
}

/// Successful credential exchange or verification.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub user: AuthUser,
}

/// Registration outcome. When the deployment requires email verification the
/// token and user are absent and the caller must complete the OTP flow.
#[derive(Debug, Clone, Deserialize)]
pub struct SignUpResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub user: Option<AuthUser>,
    #[serde(default)]
    pub require_email_verification: bool,
}

/// Thin client for the InsForge platform: auth sessions, the tabular record
/// API with equality filters, and chat completions. All persistence and
/// credential verification live on the other side of this client.
pub struct InsForgeClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl InsForgeClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.insforge_url.clone(),
            anon_key: config.insforge_anon_key.clone(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.anon_key).unwrap());
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = auth_token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
            );
        }

        headers
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(method, path, auth_token, body, None)
            .await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let mut headers = self.get_headers(auth_token);
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                _ => anyhow!("API error ({}): {}", status, error_text),
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    fn records_path(table: &str, filters: &[(&str, &str)]) -> String {
        let mut path = format!("/api/database/records/{}", table);
        let mut sep = '?';
        for (field, value) in filters {
            path.push(sep);
            path.push_str(&format!("{}=eq.{}", field, urlencoding::encode(value)));
            sep = '&';
        }
        path
    }

    /// Select rows matching all the given equality filters.
    pub async fn select(
        &self,
        table: &str,
        filters: &[(&str, &str)],
        auth_token: &str,
    ) -> Result<Vec<Value>> {
        let path = Self::records_path(table, filters);
        self.request(Method::GET, &path, Some(auth_token), None).await
    }

    /// Select at most one row; `Ok(None)` when nothing matches.
    pub async fn select_one(
        &self,
        table: &str,
        filters: &[(&str, &str)],
        auth_token: &str,
    ) -> Result<Option<Value>> {
        let rows = self.select(table, filters, auth_token).await?;
        Ok(rows.into_iter().next())
    }

    /// Insert one row and return the stored representation.
    pub async fn insert(&self, table: &str, row: Value, auth_token: &str) -> Result<Value> {
        let path = Self::records_path(table, &[]);

        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self
            .request_with_headers(
                Method::POST,
                &path,
                Some(auth_token),
                Some(json!([row])),
                Some(headers),
            )
            .await?;

        result
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Insert into {} returned no representation", table))
    }

    /// Update all rows matching the equality filters, returning them.
    pub async fn update(
        &self,
        table: &str,
        filters: &[(&str, &str)],
        patch: Value,
        auth_token: &str,
    ) -> Result<Vec<Value>> {
        let path = Self::records_path(table, filters);

        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        self.request_with_headers(Method::PATCH, &path, Some(auth_token), Some(patch), Some(headers))
            .await
    }

    /// Delete all rows matching the equality filters.
    pub async fn delete(
        &self,
        table: &str,
        filters: &[(&str, &str)],
        auth_token: &str,
    ) -> Result<()> {
        let path = Self::records_path(table, filters);
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .delete(&url)
            .headers(self.get_headers(Some(auth_token)))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);
            return Err(anyhow!("API error ({}): {}", status, error_text));
        }

        Ok(())
    }

    /// Exact row count via a zero-length range request.
    pub async fn count(
        &self,
        table: &str,
        filters: &[(&str, &str)],
        auth_token: &str,
    ) -> Result<u64> {
        let path = Self::records_path(table, filters);
        let url = format!("{}{}", self.base_url, path);

        let mut headers = self.get_headers(Some(auth_token));
        headers.insert("Prefer", HeaderValue::from_static("count=exact"));
        headers.insert("Range", HeaderValue::from_static("0-0"));

        let response = self.client.get(&url).headers(headers).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);
            return Err(anyhow!("API error ({}): {}", status, error_text));
        }

        let content_range = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| anyhow!("Missing content-range header on count request"))?;

        // Shape is "0-0/123" (or "*/0" for an empty table).
        let total = content_range
            .rsplit('/')
            .next()
            .and_then(|t| t.parse::<u64>().ok())
            .ok_or_else(|| anyhow!("Unparseable content-range: {}", content_range))?;

        Ok(total)
    }

    // Auth surface

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
        self.request(
            Method::POST,
            "/api/auth/sessions",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    pub async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<SignUpResponse> {
        self.request(
            Method::POST,
            "/api/auth/users",
            None,
            Some(json!({ "email": email, "password": password, "name": name })),
        )
        .await
    }

    pub async fn verify_email(&self, email: &str, otp: &str) -> Result<AuthSession> {
        self.request(
            Method::POST,
            "/api/auth/verify-email",
            None,
            Some(json!({ "email": email, "otp": otp })),
        )
        .await
    }

    pub async fn current_session(&self, auth_token: &str) -> Result<AuthUser> {
        self.request(Method::GET, "/api/auth/sessions/current", Some(auth_token), None)
            .await
    }

    pub async fn sign_out(&self, auth_token: &str) -> Result<()> {
        let _: Value = self
            .request(
                Method::DELETE,
                "/api/auth/sessions/current",
                Some(auth_token),
                None,
            )
            .await?;
        Ok(())
    }

    /// Update the session-linked auth profile (name and/or role hint).
    pub async fn set_profile(
        &self,
        auth_token: &str,
        name: Option<&str>,
        role: Option<&str>,
    ) -> Result<Value> {
        let mut body = serde_json::Map::new();
        if let Some(name) = name {
            body.insert("name".to_string(), json!(name));
        }
        if let Some(role) = role {
            body.insert("role".to_string(), json!(role));
        }

        self.request(
            Method::PATCH,
            "/api/auth/profiles/current",
            Some(auth_token),
            Some(Value::Object(body)),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> InsForgeClient {
        InsForgeClient::new(&AppConfig {
            insforge_url: server.uri(),
            insforge_anon_key: "anon".to_string(),
            insforge_jwt_secret: "secret".to_string(),
            identity_snapshot_path: "unused.json".to_string(),
            sign_out_policy: shared_config::SignOutPolicy::RetainOnFailure,
        })
    }

    #[test]
    fn records_path_encodes_filter_values() {
        let path = InsForgeClient::records_path(
            "patients",
            &[("email", "a b@x.com"), ("status", "active")],
        );
        assert_eq!(
            path,
            "/api/database/records/patients?email=eq.a%20b%40x.com&status=eq.active"
        );
    }

    #[tokio::test]
    async fn count_parses_the_content_range_total() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/database/records/patients"))
            .and(header("Prefer", "count=exact"))
            .and(header("Range", "0-0"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-range", "0-0/42")
                    .set_body_json(serde_json::json!([])),
            )
            .mount(&server)
            .await;

        let total = client_for(&server).count("patients", &[], "token").await.unwrap();
        assert_eq!(total, 42);
    }

    #[tokio::test]
    async fn count_handles_the_empty_table_shape() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/database/records/doctors"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-range", "*/0")
                    .set_body_json(serde_json::json!([])),
            )
            .mount(&server)
            .await;

        let total = client_for(&server).count("doctors", &[], "token").await.unwrap();
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn insert_unwraps_the_returned_representation() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/database/records/patients"))
            .and(header("Prefer", "return=representation"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([{ "id": "p-1", "name": "X" }])),
            )
            .mount(&server)
            .await;

        let row = client_for(&server)
            .insert("patients", serde_json::json!({ "name": "X" }), "token")
            .await
            .unwrap();
        assert_eq!(row["id"], "p-1");
    }

    #[tokio::test]
    async fn select_sends_the_api_key_and_bearer_headers() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/database/records/profiles"))
            .and(query_param("id", "eq.u-1"))
            .and(header("apikey", "anon"))
            .and(header("Authorization", "Bearer token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let rows = client_for(&server)
            .select("profiles", &[("id", "u-1")], "token")
            .await
            .unwrap();
        assert!(rows.is_empty());
    }
}
