//! Google service-account authentication.
//!
//! Signs an RS256 JWT with the service account's private key and exchanges
//! it for a short-lived bearer token at Google's OAuth token endpoint.

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use super::SheetsError;
use crate::config::GoogleSheetsConfig;

/// Google OAuth 2.0 token endpoint (also the JWT audience).
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

/// Read-write Sheets scope, matching the original service-account setup.
const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Assertion lifetime in seconds (Google caps this at one hour).
const TOKEN_TTL_SECS: i64 = 3600;

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Obtain a bearer token for the Sheets API.
///
/// # Errors
///
/// Returns `SheetsError::Auth` if the key cannot be parsed or the token
/// exchange is rejected, `SheetsError::Http` on transport failure.
pub(super) async fn fetch_access_token(
    client: &reqwest::Client,
    config: &GoogleSheetsConfig,
) -> Result<String, SheetsError> {
    let assertion = build_assertion(config, Utc::now().timestamp())?;

    let params = [
        ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
        ("assertion", assertion.as_str()),
    ];

    let response = client.post(TOKEN_ENDPOINT).form(&params).send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(SheetsError::Auth(format!(
            "token exchange failed ({status}): {body}"
        )));
    }

    let token: TokenResponse = response.json().await?;
    Ok(token.access_token)
}

fn build_assertion(config: &GoogleSheetsConfig, issued_at: i64) -> Result<String, SheetsError> {
    let claims = Claims {
        iss: &config.service_account_email,
        scope: SHEETS_SCOPE,
        aud: TOKEN_ENDPOINT,
        iat: issued_at,
        exp: issued_at + TOKEN_TTL_SECS,
    };

    let key = EncodingKey::from_rsa_pem(config.private_key.expose_secret().as_bytes())
        .map_err(|e| SheetsError::Auth(format!("invalid service account key: {e}")))?;

    encode(&Header::new(Algorithm::RS256), &claims, &key)
        .map_err(|e| SheetsError::Auth(format!("failed to sign assertion: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[test]
    fn rejects_malformed_private_key() {
        let config = GoogleSheetsConfig {
            sheet_id: "sheet".to_string(),
            service_account_email: "svc@example.iam.gserviceaccount.com".to_string(),
            private_key: SecretString::from("not a pem key"),
        };

        let err = build_assertion(&config, 1_700_000_000).unwrap_err();
        assert!(matches!(err, SheetsError::Auth(_)));
        assert!(err.to_string().contains("invalid service account key"));
    }

    #[test]
    fn claims_serialize_with_expected_fields() {
        let claims = Claims {
            iss: "svc@example.iam.gserviceaccount.com",
            scope: SHEETS_SCOPE,
            aud: TOKEN_ENDPOINT,
            iat: 100,
            exp: 100 + TOKEN_TTL_SECS,
        };

        let value = serde_json::to_value(&claims).expect("claims serialize");
        assert_eq!(value["aud"], TOKEN_ENDPOINT);
        assert_eq!(value["scope"], SHEETS_SCOPE);
        assert_eq!(value["exp"], 3700);
    }
}
