//! Supabase `PostgREST` client.

use async_trait::async_trait;
use prize_funnel_core::{Credential, Identity, OrderId};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::rows::{
    FeedbackRow, NewFeedbackRow, NewOrderRow, OrderRow, ShippingPatch, UserRow, tables,
};
use super::{GatewayError, PersistenceGateway, UNIQUE_VIOLATION};
use crate::config::GatewayConfig;

/// Ask `PostgREST` to echo the written rows back.
const RETURN_REPRESENTATION: &str = "return=representation";
const RETURN_MINIMAL: &str = "return=minimal";

/// Error body returned by `PostgREST`.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
}

/// HTTP gateway to the Supabase REST endpoint.
#[derive(Clone)]
pub struct PostgrestGateway {
    client: reqwest::Client,
    rest_url: Url,
}

impl PostgrestGateway {
    /// Create a new `PostgREST` client.
    ///
    /// # Errors
    ///
    /// Returns error if the key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();

        let key = config.anon_key();
        headers.insert(
            "apikey",
            HeaderValue::from_str(key)
                .map_err(|e| GatewayError::Parse(format!("Invalid anon key format: {e}")))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| GatewayError::Parse(format!("Invalid anon key format: {e}")))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            rest_url: config.rest_endpoint(),
        })
    }

    /// Build `{rest}/{table}?select=*&col=eq.value...`.
    fn table_url(&self, table: &str, filters: &[(&str, &str)]) -> Result<Url, GatewayError> {
        let mut url = self
            .rest_url
            .join(table)
            .map_err(|e| GatewayError::Parse(format!("Invalid table URL: {e}")))?;
        if !filters.is_empty() {
            url.query_pairs_mut().extend_pairs(filters);
        }
        Ok(url)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, &str)],
    ) -> Result<Vec<T>, GatewayError> {
        let url = self.table_url(table, filters)?;
        tracing::debug!(%table, "PostgREST select");

        let response = self.client.get(url).send().await?;
        let response = check(response).await?;

        response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))
    }

    async fn select_latest<T: DeserializeOwned>(
        &self,
        table: &str,
        column: &str,
        value: &str,
    ) -> Result<Option<T>, GatewayError> {
        let filter = format!("eq.{value}");
        let rows: Vec<T> = self
            .select(
                table,
                &[
                    ("select", "*"),
                    (column, &filter),
                    ("order", "created_at.desc"),
                    ("limit", "1"),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_returning<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        table: &str,
        body: &B,
    ) -> Result<T, GatewayError> {
        let url = self.table_url(table, &[])?;
        tracing::debug!(%table, "PostgREST insert");

        let response = self
            .client
            .post(url)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(body)
            .send()
            .await?;
        single_row(check(response).await?, table).await
    }
}

/// Turn a non-success response into a [`GatewayError`].
async fn check(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let body: Option<ApiErrorBody> = serde_json::from_str(&text).ok();
    let code = body.as_ref().and_then(|b| b.code.clone());
    let message = body
        .as_ref()
        .and_then(|b| {
            b.message.clone().map(|m| match &b.details {
                Some(details) => format!("{m} ({details})"),
                None => m,
            })
        })
        .unwrap_or(text);

    if status == StatusCode::CONFLICT || code.as_deref() == Some(UNIQUE_VIOLATION) {
        return Err(GatewayError::Conflict(message));
    }

    Err(GatewayError::Api {
        status: status.as_u16(),
        code,
        message,
    })
}

/// Extract the one row a write with `return=representation` echoes back.
async fn single_row<T: DeserializeOwned>(response: Response, table: &str) -> Result<T, GatewayError> {
    let rows: Vec<T> = response
        .json()
        .await
        .map_err(|e| GatewayError::Parse(e.to_string()))?;
    rows.into_iter()
        .next()
        .ok_or_else(|| GatewayError::DataCorruption(format!("{table} write returned no rows")))
}

#[async_trait]
impl PersistenceGateway for PostgrestGateway {
    async fn insert_user(&self, credential: &Credential) -> Result<(), GatewayError> {
        let url = self.table_url(tables::USERS, &[])?;
        let response = self
            .client
            .post(url)
            .header("Prefer", RETURN_MINIMAL)
            .json(credential)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn find_user(&self, credential: &Credential) -> Result<Option<UserRow>, GatewayError> {
        let phone = format!("eq.{}", credential.identity());
        let password = format!("eq.{}", credential.password);
        let rows: Vec<UserRow> = self
            .select(
                tables::USERS,
                &[
                    ("select", "phone"),
                    ("phone", &phone),
                    ("password", &password),
                    ("limit", "1"),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_order(&self, order: &NewOrderRow) -> Result<OrderRow, GatewayError> {
        self.insert_returning(tables::ORDERS, order).await
    }

    async fn latest_order(&self, identity: &Identity) -> Result<Option<OrderRow>, GatewayError> {
        self.select_latest(tables::ORDERS, "name", identity.as_str())
            .await
    }

    async fn list_orders(&self, identity: &Identity) -> Result<Vec<OrderRow>, GatewayError> {
        let name = format!("eq.{identity}");
        self.select(
            tables::ORDERS,
            &[
                ("select", "*"),
                ("name", &name),
                ("order", "created_at.desc"),
            ],
        )
        .await
    }

    async fn find_order(
        &self,
        identity: &Identity,
        id: OrderId,
    ) -> Result<Option<OrderRow>, GatewayError> {
        let id = format!("eq.{id}");
        let name = format!("eq.{identity}");
        let rows: Vec<OrderRow> = self
            .select(
                tables::ORDERS,
                &[("select", "*"), ("id", &id), ("name", &name), ("limit", "1")],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn update_order(
        &self,
        id: OrderId,
        patch: &ShippingPatch,
    ) -> Result<OrderRow, GatewayError> {
        let id = format!("eq.{id}");
        let url = self.table_url(tables::ORDERS, &[("id", &id)])?;
        tracing::debug!(table = tables::ORDERS, "PostgREST update");

        let response = self
            .client
            .patch(url)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(patch)
            .send()
            .await?;
        single_row(check(response).await?, tables::ORDERS).await
    }

    async fn insert_feedback(
        &self,
        feedback: &NewFeedbackRow,
    ) -> Result<FeedbackRow, GatewayError> {
        self.insert_returning(tables::FEEDBACKS, feedback).await
    }

    async fn latest_feedback(
        &self,
        identity: &Identity,
    ) -> Result<Option<FeedbackRow>, GatewayError> {
        self.select_latest(tables::FEEDBACKS, "user", identity.as_str())
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn gateway() -> PostgrestGateway {
        PostgrestGateway::new(&GatewayConfig {
            url: Url::parse("https://abc.supabase.co").unwrap(),
            anon_key: SecretString::from("eyJhbGciOiJIUzI1NiJ9.k3Qx9ZpL2mVt7RwB"),
        })
        .unwrap()
    }

    #[test]
    fn test_table_url_encodes_filters() {
        let url = gateway()
            .table_url(
                tables::ORDERS,
                &[
                    ("select", "*"),
                    ("name", "eq.+15551234567"),
                    ("order", "created_at.desc"),
                    ("limit", "1"),
                ],
            )
            .unwrap();

        assert_eq!(url.path(), "/rest/v1/orders");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(pairs[1], ("name".to_string(), "eq.+15551234567".to_string()));
        // `+` must be percent-encoded or PostgREST reads it as a space.
        assert!(url.as_str().contains("eq.%2B15551234567"));
    }

    #[test]
    fn test_table_url_without_filters() {
        let url = gateway().table_url(tables::USERS, &[]).unwrap();
        assert_eq!(url.as_str(), "https://abc.supabase.co/rest/v1/app_users");
    }

    #[test]
    fn test_invalid_key_is_rejected() {
        let result = PostgrestGateway::new(&GatewayConfig {
            url: Url::parse("https://abc.supabase.co").unwrap(),
            anon_key: SecretString::from("bad\nkey"),
        });
        assert!(matches!(result, Err(GatewayError::Parse(_))));
    }
}
