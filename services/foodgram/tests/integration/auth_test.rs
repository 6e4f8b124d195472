use foodgram::error::FoodgramError;
use foodgram::usecase::auth::{AuthenticateUseCase, LoginInput, LoginUseCase, LogoutUseCase};
use foodgram::usecase::user::{RegisterUserInput, RegisterUserUseCase};
use foodgram_auth_types::token::validate_token;

use crate::helpers::{MemStore, TEST_JWT_SECRET};

async fn registered(store: &MemStore) -> i32 {
    RegisterUserUseCase {
        repo: store.clone(),
    }
    .execute(RegisterUserInput {
        email: "cook@example.com".into(),
        username: "cook".into(),
        first_name: "Ivan".into(),
        last_name: "Petrov".into(),
        password: "s3cret-pass".into(),
    })
    .await
    .unwrap()
    .id
}

fn login_usecase(store: &MemStore) -> LoginUseCase<MemStore, MemStore> {
    LoginUseCase {
        users: store.clone(),
        tokens: store.clone(),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
        token_ttl_secs: 3600,
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_issue_token_for_valid_credentials() {
    let store = MemStore::new();
    let user_id = registered(&store).await;

    let token = login_usecase(&store)
        .execute(LoginInput {
            email: "cook@example.com".into(),
            password: "s3cret-pass".into(),
        })
        .await
        .unwrap();

    let info = validate_token(&token, TEST_JWT_SECRET).unwrap();
    assert_eq!(info.user_id, user_id);
    assert!(store.with(|t| t.tokens.contains(&(info.jti, user_id))));
}

#[tokio::test]
async fn should_reject_wrong_password() {
    let store = MemStore::new();
    registered(&store).await;

    let err = login_usecase(&store)
        .execute(LoginInput {
            email: "cook@example.com".into(),
            password: "not-the-password".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, FoodgramError::InvalidCredentials));
    assert!(store.with(|t| t.tokens.is_empty()));
}

#[tokio::test]
async fn should_reject_unknown_email() {
    let store = MemStore::new();

    let err = login_usecase(&store)
        .execute(LoginInput {
            email: "ghost@example.com".into(),
            password: "whatever1".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, FoodgramError::InvalidCredentials));
}

// ── Authenticate / Logout ────────────────────────────────────────────────────

#[tokio::test]
async fn should_authenticate_live_token_and_reject_it_after_logout() {
    let store = MemStore::new();
    let user_id = registered(&store).await;
    let token = login_usecase(&store)
        .execute(LoginInput {
            email: "cook@example.com".into(),
            password: "s3cret-pass".into(),
        })
        .await
        .unwrap();

    let authenticate = AuthenticateUseCase {
        tokens: store.clone(),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };
    let auth = authenticate.execute(&token).await.unwrap();
    assert_eq!(auth.user_id, user_id);

    LogoutUseCase {
        tokens: store.clone(),
    }
    .execute(auth.jti)
    .await
    .unwrap();

    let err = authenticate.execute(&token).await.unwrap_err();
    assert!(matches!(err, FoodgramError::InvalidToken));
}

#[tokio::test]
async fn should_reject_second_logout_with_same_token() {
    let store = MemStore::new();
    registered(&store).await;
    let token = login_usecase(&store)
        .execute(LoginInput {
            email: "cook@example.com".into(),
            password: "s3cret-pass".into(),
        })
        .await
        .unwrap();
    let jti = validate_token(&token, TEST_JWT_SECRET).unwrap().jti;
    let logout = LogoutUseCase {
        tokens: store.clone(),
    };

    logout.execute(jti).await.unwrap();
    let err = logout.execute(jti).await.unwrap_err();

    assert!(matches!(err, FoodgramError::InvalidToken));
}

#[tokio::test]
async fn should_reject_token_signed_with_other_secret() {
    let store = MemStore::new();
    registered(&store).await;
    let token = LoginUseCase {
        users: store.clone(),
        tokens: store.clone(),
        jwt_secret: "another-secret".to_owned(),
        token_ttl_secs: 3600,
    }
    .execute(LoginInput {
        email: "cook@example.com".into(),
        password: "s3cret-pass".into(),
    })
    .await
    .unwrap();

    let err = AuthenticateUseCase {
        tokens: store.clone(),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    }
    .execute(&token)
    .await
    .unwrap_err();

    assert!(matches!(err, FoodgramError::InvalidToken));
}
