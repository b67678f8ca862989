mod common;

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rsa::RsaPrivateKey;
use serde_json::Value;

use restsrv::auth::{AuthError, CredentialStore, KeyManager, TokenIssuer, TokenVerifier, jwe};
use shared::types::server_config::default_users;
use shared::types::{Role, RoleSet};

const TTL: Duration = Duration::from_secs(60);

#[tokio::test]
async fn every_default_user_gets_a_token_carrying_their_roles() {
    let state = common::state().await;

    for (user, role) in [("u0", Role::Admin), ("u1", Role::Edit), ("u2", Role::Add)] {
        let token = state.issuer.issue(user, user, TTL).unwrap();
        assert_eq!(token.split('.').count(), 5, "compact JWE has five parts");

        let roles = state.verifier.verify(&token).unwrap();
        assert_eq!(roles, RoleSet::from(role), "roles for {}", user);
    }
}

#[tokio::test]
async fn unknown_user_and_wrong_password_are_rejected() {
    let state = common::state().await;

    assert_eq!(
        state.issuer.issue("nobody", "u0", TTL),
        Err(AuthError::UserNotFound)
    );
    assert_eq!(
        state.issuer.issue("u0", "wrong", TTL),
        Err(AuthError::BadPassword)
    );
    assert_eq!(state.issuer.issue("u0", "", TTL), Err(AuthError::BadPassword));
}

#[tokio::test]
async fn token_is_valid_until_its_expiry_second() {
    let state = common::state().await;
    let issued_at = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);

    let token = state
        .issuer
        .issue_at("u1", "u1", Duration::from_secs(30), issued_at)
        .unwrap();

    let just_before = issued_at + Duration::from_secs(29);
    assert!(state.verifier.verify_at(&token, just_before).is_ok());

    let at_expiry = issued_at + Duration::from_secs(30);
    assert_eq!(
        state.verifier.verify_at(&token, at_expiry),
        Err(AuthError::TokenExpired)
    );

    let long_after = issued_at + Duration::from_secs(3600);
    assert_eq!(
        state.verifier.verify_at(&token, long_after),
        Err(AuthError::TokenExpired)
    );
}

#[tokio::test]
async fn tokens_issued_in_the_past_are_expired_now() {
    let state = common::state().await;
    let an_hour_ago = SystemTime::now() - Duration::from_secs(3600);

    let token = state.issuer.issue_at("u0", "u0", TTL, an_hour_ago).unwrap();
    assert_eq!(state.verifier.verify(&token), Err(AuthError::TokenExpired));
}

#[tokio::test]
async fn altered_tokens_never_verify() {
    let state = common::state().await;
    let token = state.issuer.issue("u0", "u0", TTL).unwrap();

    // Flip a spread of positions across every segment.
    let step = (token.len() / 97).max(1);
    for i in (0..token.len()).step_by(step) {
        let mut bytes = token.clone().into_bytes();
        bytes[i] = match bytes[i] {
            b'.' => continue,
            b'A' => b'B',
            _ => b'A',
        };
        let altered = String::from_utf8(bytes).unwrap();
        if altered == token {
            continue;
        }

        let result = state.verifier.verify(&altered);
        assert!(
            matches!(result, Err(AuthError::Decryption | AuthError::SignatureInvalid)),
            "index {}: {:?}",
            i,
            result
        );
    }
}

#[tokio::test]
async fn garbage_tokens_fail_to_parse() {
    let state = common::state().await;

    for garbage in ["", "abc", "a.b.c", "a.b.c.d.e.f"] {
        assert!(
            matches!(state.verifier.verify(garbage), Err(AuthError::TokenParse(_))),
            "{:?}",
            garbage
        );
    }
}

#[tokio::test]
async fn token_from_other_keys_fails_decryption() {
    let state = common::state().await;
    let token = state.issuer.issue("u0", "u0", TTL).unwrap();

    let foreign = TokenVerifier::new(common::other_keys());
    assert_eq!(foreign.verify(&token), Err(AuthError::Decryption));
}

#[test]
fn token_signed_with_another_key_fails_signature_check() {
    // Same encryption pair, different signing pairs: the envelope opens but
    // the inner signature must not verify.
    let encryption = common::keys().decryption_key().clone();
    let mut rng = rand::thread_rng();
    let trusted_signer = RsaPrivateKey::new(&mut rng, 2048).unwrap();
    let rogue_signer = RsaPrivateKey::new(&mut rng, 2048).unwrap();

    let trusted = Arc::new(KeyManager::from_keys(trusted_signer, encryption.clone()).unwrap());
    let rogue = Arc::new(KeyManager::from_keys(rogue_signer, encryption).unwrap());
    let credentials = Arc::new(CredentialStore::from_config(&default_users()));

    let verifier = TokenVerifier::new(Arc::clone(&trusted));
    let rogue_issuer = TokenIssuer::new(Arc::clone(&credentials), rogue, "restsrv");
    let trusted_issuer = TokenIssuer::new(credentials, trusted, "restsrv");

    let forged = rogue_issuer.issue("u0", "u0", TTL).unwrap();
    assert_eq!(verifier.verify(&forged), Err(AuthError::SignatureInvalid));

    let genuine = trusted_issuer.issue("u0", "u0", TTL).unwrap();
    assert_eq!(verifier.verify(&genuine), Ok(RoleSet::from(Role::Admin)));
}

#[tokio::test]
async fn payload_never_contains_the_password() {
    let state = common::state().await;
    let keys = common::keys();
    let token = state.issuer.issue("u2", "u2", TTL).unwrap();

    let signed = jwe::decrypt(&token, keys.decryption_key()).unwrap();
    let signed = String::from_utf8(signed).unwrap();
    let parts: Vec<&str> = signed.split('.').collect();
    assert_eq!(parts.len(), 3, "inner token is a compact JWS");

    let header: Value = serde_json::from_slice(&URL_SAFE_NO_PAD.decode(parts[0]).unwrap()).unwrap();
    assert_eq!(header["alg"], "PS512");

    let payload: Value = serde_json::from_slice(&URL_SAFE_NO_PAD.decode(parts[1]).unwrap()).unwrap();
    assert_eq!(payload["Pwd"], "");
    assert_eq!(payload["Name"], "u2");
    assert_eq!(payload["sub"], "u2");
    assert_eq!(payload["iss"], state.issuer.issuer());
    assert_eq!(payload["Roles"]["Add"], true);
    assert!(payload["exp"].is_u64());
}
