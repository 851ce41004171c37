use crate::error::ApiError;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use vspc_core::model::{Session, TokenState, expiry_from, now_epoch_millis};
use vspc_core::store::SessionStore;
use vspc_core::url::format_url;

const TOKEN_PATH: &str = "/token";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    expires_in: i64,
}

/// Owns the stored session and keeps its access token usable.
///
/// Every fetcher goes through [`TokenManager::ensure_valid_session`]. Refreshes
/// are single-flight: callers that find the token expired queue on one lock,
/// and whoever gets it second sees the already refreshed session instead of
/// spending the refresh token again.
pub struct TokenManager {
    client: Client,
    store: SessionStore,
    refresh_lock: Mutex<()>,
}

impl TokenManager {
    pub fn new(client: Client, store: SessionStore) -> Self {
        Self {
            client,
            store,
            refresh_lock: Mutex::new(()),
        }
    }

    /// Normalizes the user-entered host, then exchanges the credentials.
    pub async fn login(
        &self,
        raw_url: &str,
        username: &str,
        password: &str,
    ) -> Result<Session, ApiError> {
        self.login_at(&format_url(raw_url), username, password)
            .await
    }

    /// Password grant against an already normalized base URL. The new session
    /// replaces whatever was stored in a single commit.
    pub async fn login_at(
        &self,
        base_url: &str,
        username: &str,
        password: &str,
    ) -> Result<Session, ApiError> {
        let form = [
            ("grant_type", "password"),
            ("username", username),
            ("password", password),
        ];
        let token = self.request_token(base_url, &form).await?;
        let refresh_token = token.refresh_token.ok_or_else(|| ApiError::Decode {
            path: TOKEN_PATH.to_string(),
            message: "password grant returned no refresh_token".to_string(),
        })?;
        let session = Session {
            base_url: base_url.to_string(),
            access_token: token.access_token,
            refresh_token,
            expires_at_epoch_ms: expiry_from(now_epoch_millis(), token.expires_in),
        };
        self.store.commit(&session)?;
        info!(
            base_url = %session.base_url,
            expires_at = session.expires_at_epoch_ms,
            "Logged in"
        );
        Ok(session)
    }

    pub fn logout(&self) -> Result<(), ApiError> {
        self.store.clear()?;
        info!("Session cleared");
        Ok(())
    }

    pub fn current_session(&self) -> Result<Session, ApiError> {
        self.store.load()?.ok_or(ApiError::NoSession)
    }

    pub async fn ensure_valid_token(&self) -> Result<String, ApiError> {
        Ok(self.ensure_valid_session().await?.access_token)
    }

    pub async fn ensure_valid_session(&self) -> Result<Session, ApiError> {
        let session = self.current_session()?;
        if session.token_state_at(now_epoch_millis()) == TokenState::Valid {
            return Ok(session);
        }

        let _guard = self.refresh_lock.lock().await;
        let session = self.current_session()?;
        if session.token_state_at(now_epoch_millis()) == TokenState::Valid {
            debug!("Token refreshed by a concurrent caller");
            return Ok(session);
        }
        self.refresh(session).await
    }

    async fn refresh(&self, session: Session) -> Result<Session, ApiError> {
        debug!(base_url = %session.base_url, "Access token expired, refreshing");
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", session.refresh_token.as_str()),
        ];
        let token = match self.request_token(&session.base_url, &form).await {
            Ok(token) => token,
            Err(err) if err.is_auth() => {
                warn!(error = %err, "Refresh rejected, clearing stored session");
                self.store.clear()?;
                return Err(err);
            }
            Err(err) => return Err(err),
        };
        let refreshed = Session {
            access_token: token.access_token,
            refresh_token: token.refresh_token.unwrap_or(session.refresh_token),
            expires_at_epoch_ms: expiry_from(now_epoch_millis(), token.expires_in),
            base_url: session.base_url,
        };
        self.store.commit(&refreshed)?;
        info!(expires_at = refreshed.expires_at_epoch_ms, "Access token refreshed");
        Ok(refreshed)
    }

    async fn request_token(
        &self,
        base_url: &str,
        form: &[(&str, &str)],
    ) -> Result<TokenResponse, ApiError> {
        let response = self
            .client
            .post(format!("{base_url}{TOKEN_PATH}"))
            .form(form)
            .send()
            .await
            .map_err(ApiError::Network)?;
        let status = response.status();
        if !status.is_success() {
            if let Ok(body) = response.text().await {
                debug!(status = status.as_u16(), body = %body, "Token request rejected");
            }
            return Err(ApiError::Auth {
                status: status.as_u16(),
            });
        }
        response
            .json::<TokenResponse>()
            .await
            .map_err(|err| ApiError::Decode {
                path: TOKEN_PATH.to_string(),
                message: err.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpOptions, build_client};
    use crate::test_server::{StubResponse, StubServer};
    use serde_json::json;
    use vspc_core::store::{KEY_ACCESS_TOKEN, KEY_EXPIRES_IN};

    fn manager(store: SessionStore) -> TokenManager {
        TokenManager::new(build_client(&HttpOptions::default()).unwrap(), store)
    }

    fn expired_session(base_url: String) -> Session {
        Session {
            base_url,
            access_token: "stale".to_string(),
            refresh_token: "r0".to_string(),
            expires_at_epoch_ms: now_epoch_millis() - 1_000,
        }
    }

    #[tokio::test]
    async fn login_stores_tokens_and_expiry() {
        let server = StubServer::start(|_| {
            StubResponse::json(
                200,
                json!({ "access_token": "a", "refresh_token": "r", "expires_in": 3600 }),
            )
        })
        .await;
        let store = SessionStore::in_memory();
        let tokens = manager(store.clone());

        let before = now_epoch_millis();
        tokens
            .login_at(&server.base_url(), "VSPC\\veeam", "p@ss word")
            .await
            .unwrap();
        let after = now_epoch_millis();

        assert_eq!(
            store.backend().get(KEY_ACCESS_TOKEN).unwrap().as_deref(),
            Some("a")
        );
        let expires: i64 = store
            .backend()
            .get(KEY_EXPIRES_IN)
            .unwrap()
            .unwrap()
            .parse()
            .unwrap();
        assert!(expires >= before + 3_600_000 && expires <= after + 3_600_000);
        let session = store.load().unwrap().unwrap();
        assert_eq!(session.refresh_token, "r");
        assert_eq!(session.base_url, server.base_url());

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].path, "/api/v3/token");
        assert_eq!(
            requests[0].header("content-type"),
            Some("application/x-www-form-urlencoded")
        );
        assert!(requests[0].body.contains("grant_type=password"));
        assert!(requests[0].body.contains("username=VSPC%5Cveeam"));
    }

    #[tokio::test]
    async fn rejected_login_leaves_store_untouched() {
        let server = StubServer::start(|_| {
            StubResponse::json(400, json!({ "error": "invalid_grant" }))
        })
        .await;
        let store = SessionStore::in_memory();
        let tokens = manager(store.clone());
        let err = tokens
            .login_at(&server.base_url(), "user", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Auth { status: 400 }));
        assert!(store.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn logout_forgets_session() {
        let store = SessionStore::in_memory();
        store.commit(&expired_session("http://127.0.0.1:9/api/v3".to_string())).unwrap();
        let tokens = manager(store.clone());

        tokens.logout().unwrap();
        assert!(store.load().unwrap().is_none());
        assert!(matches!(tokens.current_session(), Err(ApiError::NoSession)));
        tokens.logout().unwrap();
    }

    #[tokio::test]
    async fn valid_token_is_returned_without_network() {
        let store = SessionStore::in_memory();
        store
            .commit(&Session {
                base_url: "http://127.0.0.1:9/api/v3".to_string(),
                access_token: "live".to_string(),
                refresh_token: "r".to_string(),
                expires_at_epoch_ms: now_epoch_millis() + 60_000,
            })
            .unwrap();
        let tokens = manager(store);
        assert_eq!(tokens.ensure_valid_token().await.unwrap(), "live");
    }

    #[tokio::test]
    async fn missing_session_is_reported() {
        let tokens = manager(SessionStore::in_memory());
        assert!(matches!(
            tokens.ensure_valid_token().await,
            Err(ApiError::NoSession)
        ));
    }

    #[tokio::test]
    async fn expired_token_is_refreshed_and_persisted() {
        let server = StubServer::start(|request| {
            assert!(request.body.contains("grant_type=refresh_token"));
            assert!(request.body.contains("refresh_token=r0"));
            StubResponse::json(200, json!({ "access_token": "fresh", "expires_in": 600 }))
        })
        .await;
        let store = SessionStore::in_memory();
        store.commit(&expired_session(server.base_url())).unwrap();
        let tokens = manager(store.clone());

        assert_eq!(tokens.ensure_valid_token().await.unwrap(), "fresh");
        let stored = store.load().unwrap().unwrap();
        assert_eq!(stored.access_token, "fresh");
        assert_eq!(stored.refresh_token, "r0");
        assert_eq!(stored.token_state_at(now_epoch_millis()), TokenState::Valid);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_refresh() {
        let server = StubServer::start(|_| {
            StubResponse::json(
                200,
                json!({ "access_token": "fresh", "refresh_token": "r1", "expires_in": 600 }),
            )
        })
        .await;
        let store = SessionStore::in_memory();
        store.commit(&expired_session(server.base_url())).unwrap();
        let tokens = manager(store.clone());

        let (first, second, third) = tokio::join!(
            tokens.ensure_valid_token(),
            tokens.ensure_valid_token(),
            tokens.ensure_valid_token()
        );
        assert_eq!(first.unwrap(), "fresh");
        assert_eq!(second.unwrap(), "fresh");
        assert_eq!(third.unwrap(), "fresh");
        assert_eq!(server.count("/api/v3/token"), 1);
        assert_eq!(store.load().unwrap().unwrap().refresh_token, "r1");
    }

    #[tokio::test]
    async fn rejected_refresh_clears_session() {
        let server = StubServer::start(|_| {
            StubResponse::json(401, json!({ "error": "invalid_grant" }))
        })
        .await;
        let store = SessionStore::in_memory();
        store.commit(&expired_session(server.base_url())).unwrap();
        let tokens = manager(store.clone());

        let err = tokens.ensure_valid_token().await.unwrap_err();
        assert!(matches!(err, ApiError::Auth { status: 401 }));
        assert!(store.load().unwrap().is_none());
        assert!(matches!(
            tokens.ensure_valid_token().await,
            Err(ApiError::NoSession)
        ));
    }

    #[tokio::test]
    async fn unreachable_refresh_keeps_session() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let store = SessionStore::in_memory();
        store
            .commit(&expired_session(format!("http://{addr}/api/v3")))
            .unwrap();
        let tokens = manager(store.clone());

        let err = tokens.ensure_valid_token().await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
        assert_eq!(store.load().unwrap().unwrap().access_token, "stale");
    }
}
