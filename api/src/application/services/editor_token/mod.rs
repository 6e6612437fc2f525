use std::collections::HashSet;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;

/// Signs editor configurations and verifies tokens presented by the document server.
///
/// Tokens are HS256 JWTs. The signed payload is flattened into the claims next to
/// `iat` and `exp`, which is the shape the document server expects.
#[derive(Clone)]
pub struct EditorTokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

#[derive(Serialize)]
struct SignedClaims<'a, T: Serialize> {
    #[serde(flatten)]
    payload: &'a T,
    iat: i64,
    exp: i64,
}

impl EditorTokenSigner {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    pub fn sign<T: Serialize>(&self, payload: &T) -> Result<String, jsonwebtoken::errors::Error> {
        self.sign_at(payload, chrono::Utc::now().timestamp())
    }

    pub fn sign_at<T: Serialize>(
        &self,
        payload: &T,
        issued_at: i64,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = SignedClaims {
            payload,
            iat: issued_at,
            exp: issued_at + self.ttl_secs,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Checks signature and, when present, expiry. Returns the decoded claims.
    pub fn verify(&self, token: &str) -> Result<serde_json::Value, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        // document server tokens are not required to carry exp or aud
        validation.required_spec_claims = HashSet::new();
        validation.validate_aud = false;
        validation.leeway = 0;
        let data = jsonwebtoken::decode::<serde_json::Value>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::errors::ErrorKind;
    use serde_json::json;

    #[test]
    fn signed_payload_round_trips_with_expiry() {
        let signer = EditorTokenSigner::new("secret-one", 600);
        let payload = json!({"document": {"key": "d1_1"}, "documentType": "word"});
        let now = chrono::Utc::now().timestamp();
        let token = signer.sign_at(&payload, now).unwrap();

        let claims = signer.verify(&token).unwrap();
        assert_eq!(claims["document"]["key"], "d1_1");
        assert_eq!(claims["documentType"], "word");
        assert_eq!(claims["iat"], now);
        assert_eq!(claims["exp"], now + 600);
    }

    #[test]
    fn rejects_token_from_other_secret() {
        let ours = EditorTokenSigner::new("secret-one", 600);
        let theirs = EditorTokenSigner::new("secret-two", 600);
        let token = theirs.sign(&json!({"status": 2})).unwrap();

        let err = ours.verify(&token).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidSignature));
    }

    #[test]
    fn rejects_expired_token() {
        let signer = EditorTokenSigner::new("secret-one", 600);
        let issued = chrono::Utc::now().timestamp() - 11 * 60;
        let token = signer.sign_at(&json!({"status": 2}), issued).unwrap();

        let err = signer.verify(&token).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ExpiredSignature));
    }

    #[test]
    fn accepts_token_without_exp() {
        #[derive(Serialize)]
        struct Bare {
            status: i64,
        }
        let key = EncodingKey::from_secret(b"secret-one");
        let token =
            jsonwebtoken::encode(&Header::new(Algorithm::HS256), &Bare { status: 6 }, &key)
                .unwrap();

        let signer = EditorTokenSigner::new("secret-one", 600);
        assert_eq!(signer.verify(&token).unwrap()["status"], 6);
    }

    #[test]
    fn rejects_garbage() {
        let signer = EditorTokenSigner::new("secret-one", 600);
        assert!(signer.verify("not-a-jwt").is_err());
    }
}
