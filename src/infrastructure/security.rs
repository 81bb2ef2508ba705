use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};

// Argon2 parameters for 50-150ms target latency
const ARGON2_M_COST: u32 = 19456; // 19 MB
const ARGON2_T_COST: u32 = 2; // 2 iterations
const ARGON2_P_COST: u32 = 1; // 1 parallelism

const TOKEN_LEEWAY_SECS: u64 = 60;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // user_id
    sid: String, // session_id
    exp: usize,
    iat: usize,
}

/// Identity carried by a valid access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub user_id: String,
    pub session_id: String,
}

fn argon2() -> Result<Argon2<'static>, argon2::password_hash::Error> {
    let params = argon2::Params::new(ARGON2_M_COST, ARGON2_T_COST, ARGON2_P_COST, None)
        .map_err(argon2::password_hash::Error::from)?;
    Ok(Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        params,
    ))
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = argon2()?.hash_password(password.as_bytes(), &salt)?;
    Ok(password_hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;

    match argon2()?.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(_) => Ok(false),
    }
}

pub fn generate_token(
    user_id: &str,
    session_id: &str,
    secret: &str,
    ttl_secs: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp().max(0) as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        sid: session_id.to_string(),
        exp: now + ttl_secs as usize,
        iat: now,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
}

pub fn validate_token(token: &str, secret: &str) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = TOKEN_LEEWAY_SECS;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )?;

    Ok(TokenClaims {
        user_id: token_data.claims.sub,
        session_id: token_data.claims.sid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_generates_argon2id_hash() {
        let password = "pw123";
        let hash = hash_password(password).unwrap();

        assert_ne!(hash, password);
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_hash_password_same_password_produces_different_hashes() {
        let hash1 = hash_password("same_password").unwrap();
        let hash2 = hash_password("same_password").unwrap();

        // Random salt per hash
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("correct_password").unwrap();

        assert!(verify_password("correct_password", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash_format() {
        // A plain-text value left over in storage must not verify
        let result = verify_password("pw123", "pw123");
        assert!(result.is_err());
    }

    #[test]
    fn test_verify_password_with_unicode() {
        let password = "пароль123";
        let hash = hash_password(password).unwrap();
        assert!(verify_password(password, &hash).unwrap());
    }

    #[test]
    fn test_token_carries_user_and_session() {
        let token = generate_token("user_456", "session_1", "test_secret", 3600).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let claims = validate_token(&token, "test_secret").unwrap();
        assert_eq!(claims.user_id, "user_456");
        assert_eq!(claims.session_id, "session_1");
    }

    #[test]
    fn test_validate_token_rejects_invalid_token() {
        assert!(validate_token("invalid.token.here", "secret_key").is_err());
    }

    #[test]
    fn test_validate_token_rejects_token_with_wrong_secret() {
        let token = generate_token("test_user", "s", "correct_secret", 3600).unwrap();
        assert!(validate_token(&token, "wrong_secret").is_err());
    }

    #[test]
    fn test_validate_token_rejects_expired_token() {
        let secret = "expiry_secret";
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: "user".to_string(),
            sid: "session".to_string(),
            exp: now - 2 * TOKEN_LEEWAY_SECS as usize,
            iat: now - 3 * TOKEN_LEEWAY_SECS as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_ref()),
        )
        .unwrap();

        assert!(validate_token(&token, secret).is_err());
    }
}
