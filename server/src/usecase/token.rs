use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::domain::repository::UserRepository;
use crate::domain::types::{User, UserFilter};
use crate::error::AppError;
use crate::password::authenticate;

/// JWT claims carried by both access and refresh tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User id, stringified.
    pub sub: String,
    /// Issued-at timestamp (seconds since UNIX epoch).
    pub iat: u64,
    /// Expiration timestamp (seconds since UNIX epoch).
    pub exp: u64,
}

/// Signed access/refresh pair as handed to the client.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_secs()
}

/// Issues and validates the signed token pair.
///
/// Tokens move through Issued → Valid → Expired, or straight to Invalid on
/// any signature/structure failure. There is no revocation list: an issued
/// token stays valid until its natural expiry. Acceptable only while the
/// access lifetime stays short.
#[derive(Clone)]
pub struct TokenService {
    pub secret: String,
    pub algorithm: Algorithm,
    pub access_ttl_secs: u64,
    pub refresh_ttl_secs: u64,
}

impl TokenService {
    fn sign(&self, user_id: i32, ttl_secs: u64) -> Result<String, AppError> {
        let iat = now_secs();
        let claims = TokenClaims {
            sub: user_id.to_string(),
            iat,
            exp: iat + ttl_secs,
        };
        encode(
            &Header::new(self.algorithm),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(anyhow::anyhow!("sign token: {e}")))
    }

    /// Issue the short-lived access token and longer-lived refresh token
    /// for a user id.
    pub fn issue_tokens(&self, user_id: i32) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access_token: self.sign(user_id, self.access_ttl_secs)?,
            refresh_token: self.sign(user_id, self.refresh_ttl_secs)?,
        })
    }

    fn decode_subject(&self, token: &str) -> Result<i32, AppError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = true;
        validation.required_spec_claims.clear();
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
            _ => AppError::TokenMalformed,
        })?;

        data.claims
            .sub
            .parse::<i32>()
            .map_err(|_| AppError::TokenMalformed)
    }

    /// Validate an access token, returning the subject user id. Expiry and
    /// tampering are distinct failures for server-side logging only.
    pub fn validate_access_token(&self, token: &str) -> Result<i32, AppError> {
        self.decode_subject(token)
    }

    /// Validate a refresh token. Same claims and checks; the longer
    /// lifetime is baked into `exp` at issuance. Tampering fails closed.
    pub fn validate_refresh_token(&self, token: &str) -> Result<i32, AppError> {
        self.decode_subject(token)
    }
}

/// Exact role-name check: flat string equality, no hierarchy.
pub fn require_role(user: &User, role_name: &str) -> Result<(), AppError> {
    if user.role.name == role_name {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

pub struct LoginUseCase<R: UserRepository> {
    pub users: R,
    pub tokens: TokenService,
}

impl<R: UserRepository> LoginUseCase<R> {
    /// A missing user and a wrong password are indistinguishable to the
    /// caller; both come back as one credentials error.
    pub async fn execute(&self, input: LoginInput) -> Result<TokenPair, AppError> {
        let user = self
            .users
            .get_by_filter(&UserFilter::by_email(input.email))
            .await?;
        let ok = authenticate(user.as_ref(), &input.password);
        let user = match (ok, user) {
            (true, Some(user)) => user,
            _ => return Err(AppError::IncorrectCredentials),
        };
        self.tokens.issue_tokens(user.id)
    }
}

// ── Refresh ──────────────────────────────────────────────────────────────────

pub struct RefreshTokenUseCase<R: UserRepository> {
    pub users: R,
    pub tokens: TokenService,
}

impl<R: UserRepository> RefreshTokenUseCase<R> {
    pub async fn execute(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        let user_id = self.tokens.validate_refresh_token(refresh_token)?;
        // A token whose subject no longer exists is treated as malformed,
        // same as a bad sub claim.
        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(AppError::TokenMalformed)?;
        self.tokens.issue_tokens(user.id)
    }
}

// ── Current user ─────────────────────────────────────────────────────────────

pub struct CurrentUserUseCase<R: UserRepository> {
    pub users: R,
    pub tokens: TokenService,
}

impl<R: UserRepository> CurrentUserUseCase<R> {
    pub async fn execute(&self, access_token: &str) -> Result<User, AppError> {
        let user_id = self.tokens.validate_access_token(access_token)?;
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::domain::repository::{BulkUpdate, Repository, UserLookup};
    use crate::domain::sort::SortSpec;
    use crate::domain::types::{NewUser, Role, UserChanges};
    use crate::password::hash_password;

    const TEST_SECRET: &str = "test-secret-key-for-unit-tests";

    fn token_service() -> TokenService {
        TokenService {
            secret: TEST_SECRET.into(),
            algorithm: Algorithm::HS256,
            access_ttl_secs: 1800,
            refresh_ttl_secs: 604_800,
        }
    }

    fn test_user(id: i32, role_name: &str, password: &str) -> User {
        User {
            id,
            phone_number: "+79991234567".into(),
            first_name: "Anna".into(),
            last_name: "Petrova".into(),
            email: "anna@example.com".into(),
            password_hash: hash_password(password).unwrap(),
            role: Role {
                id: 1,
                name: role_name.into(),
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    struct MockUsers {
        user: Option<User>,
    }

    impl MockUsers {
        fn with(user: Option<User>) -> Self {
            Self { user }
        }
    }

    impl Repository for MockUsers {
        type Entity = User;
        type Create = NewUser;
        type Update = UserChanges;
        type Filter = UserFilter;

        async fn get_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
            Ok(self.user.clone().filter(|u| u.id == id))
        }
        async fn get_by_filter(&self, filter: &UserFilter) -> Result<Option<User>, AppError> {
            Ok(self
                .user
                .clone()
                .filter(|u| filter.email.as_deref() == Some(u.email.as_str())))
        }
        async fn list(&self, _filter: Option<&UserFilter>) -> Result<Vec<User>, AppError> {
            unimplemented!()
        }
        async fn create(&self, _fields: NewUser) -> Result<User, AppError> {
            unimplemented!()
        }
        async fn create_many(&self, _fields: Vec<NewUser>) -> Result<Vec<User>, AppError> {
            unimplemented!()
        }
        async fn update(
            &self,
            _id: i32,
            _changes: UserChanges,
        ) -> Result<Option<User>, AppError> {
            unimplemented!()
        }
        async fn delete(&self, _id: i32) -> Result<u64, AppError> {
            unimplemented!()
        }
        async fn count(&self, _filter: Option<&UserFilter>) -> Result<u64, AppError> {
            unimplemented!()
        }
        async fn bulk_update(
            &self,
            _entries: Vec<BulkUpdate<UserChanges>>,
        ) -> Result<u64, AppError> {
            unimplemented!()
        }
    }

    impl UserLookup for MockUsers {
        async fn find_all(
            &self,
            _filter: &UserFilter,
            _sort: Option<&SortSpec>,
        ) -> Result<Vec<User>, AppError> {
            unimplemented!()
        }
        async fn check_unique(&self, _phone: &str, _email: &str) -> Result<(), AppError> {
            unimplemented!()
        }
    }

    fn tamper(token: &str) -> String {
        let mut chars: Vec<char> = token.chars().collect();
        let last = chars.last_mut().unwrap();
        *last = if *last == 'x' { 'y' } else { 'x' };
        chars.into_iter().collect()
    }

    fn expired_token(user_id: i32) -> String {
        let claims = TokenClaims {
            sub: user_id.to_string(),
            iat: 1_000_000,
            exp: 1_000_060,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn should_round_trip_issued_access_token() {
        let tokens = token_service();
        let pair = tokens.issue_tokens(7).unwrap();
        assert_eq!(tokens.validate_access_token(&pair.access_token).unwrap(), 7);
        assert_eq!(
            tokens.validate_refresh_token(&pair.refresh_token).unwrap(),
            7
        );
    }

    #[test]
    fn should_reject_expired_token_as_expired() {
        let tokens = token_service();
        let err = tokens.validate_access_token(&expired_token(7)).unwrap_err();
        assert!(matches!(err, AppError::TokenExpired));
    }

    #[test]
    fn should_reject_tampered_token_as_malformed() {
        let tokens = token_service();
        let pair = tokens.issue_tokens(7).unwrap();
        let err = tokens
            .validate_access_token(&tamper(&pair.access_token))
            .unwrap_err();
        assert!(matches!(err, AppError::TokenMalformed));
    }

    #[test]
    fn should_reject_garbage_token_as_malformed() {
        let tokens = token_service();
        let err = tokens.validate_access_token("not-a-jwt").unwrap_err();
        assert!(matches!(err, AppError::TokenMalformed));
    }

    #[test]
    fn should_reject_wrong_secret_as_malformed() {
        let tokens = token_service();
        let pair = tokens.issue_tokens(7).unwrap();
        let other = TokenService {
            secret: "some-other-secret".into(),
            ..token_service()
        };
        let err = other
            .validate_access_token(&pair.access_token)
            .unwrap_err();
        assert!(matches!(err, AppError::TokenMalformed));
    }

    #[test]
    fn should_reject_non_integer_subject_as_malformed() {
        let claims = TokenClaims {
            sub: "abc".into(),
            iat: now_secs(),
            exp: now_secs() + 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();
        let err = token_service().validate_access_token(&token).unwrap_err();
        assert!(matches!(err, AppError::TokenMalformed));
    }

    #[test]
    fn should_require_exact_role_name() {
        let admin = test_user(1, "admin", "pw-123");
        assert!(require_role(&admin, "admin").is_ok());

        let cased = test_user(2, "Admin", "pw-123");
        assert!(matches!(
            require_role(&cased, "admin").unwrap_err(),
            AppError::Forbidden
        ));

        let other = test_user(3, "unregistered", "pw-123");
        assert!(matches!(
            require_role(&other, "admin").unwrap_err(),
            AppError::Forbidden
        ));
    }

    #[tokio::test]
    async fn should_login_with_correct_credentials() {
        let usecase = LoginUseCase {
            users: MockUsers::with(Some(test_user(7, "unregistered", "pw-12345"))),
            tokens: token_service(),
        };
        let pair = usecase
            .execute(LoginInput {
                email: "anna@example.com".into(),
                password: "pw-12345".into(),
            })
            .await
            .unwrap();
        assert_eq!(
            token_service()
                .validate_access_token(&pair.access_token)
                .unwrap(),
            7
        );
    }

    #[tokio::test]
    async fn should_collapse_wrong_password_into_incorrect_credentials() {
        let usecase = LoginUseCase {
            users: MockUsers::with(Some(test_user(7, "unregistered", "pw-12345"))),
            tokens: token_service(),
        };
        let err = usecase
            .execute(LoginInput {
                email: "anna@example.com".into(),
                password: "wrong".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::IncorrectCredentials));
    }

    #[tokio::test]
    async fn should_collapse_unknown_email_into_incorrect_credentials() {
        let usecase = LoginUseCase {
            users: MockUsers::with(None),
            tokens: token_service(),
        };
        let err = usecase
            .execute(LoginInput {
                email: "nobody@example.com".into(),
                password: "pw-12345".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::IncorrectCredentials));
    }

    #[tokio::test]
    async fn should_issue_fresh_pair_on_refresh() {
        let tokens = token_service();
        let pair = tokens.issue_tokens(7).unwrap();
        let usecase = RefreshTokenUseCase {
            users: MockUsers::with(Some(test_user(7, "unregistered", "pw-12345"))),
            tokens: token_service(),
        };
        let fresh = usecase.execute(&pair.refresh_token).await.unwrap();
        assert_eq!(
            token_service()
                .validate_access_token(&fresh.access_token)
                .unwrap(),
            7
        );
    }

    #[tokio::test]
    async fn should_reject_refresh_for_vanished_user() {
        let tokens = token_service();
        let pair = tokens.issue_tokens(7).unwrap();
        let usecase = RefreshTokenUseCase {
            users: MockUsers::with(None),
            tokens: token_service(),
        };
        let err = usecase.execute(&pair.refresh_token).await.unwrap_err();
        assert!(matches!(err, AppError::TokenMalformed));
    }

    #[tokio::test]
    async fn should_resolve_current_user_from_access_token() {
        let tokens = token_service();
        let pair = tokens.issue_tokens(7).unwrap();
        let usecase = CurrentUserUseCase {
            users: MockUsers::with(Some(test_user(7, "unregistered", "pw-12345"))),
            tokens: token_service(),
        };
        let user = usecase.execute(&pair.access_token).await.unwrap();
        assert_eq!(user.id, 7);
    }

    #[tokio::test]
    async fn should_reject_expired_access_token_for_current_user() {
        let usecase = CurrentUserUseCase {
            users: MockUsers::with(Some(test_user(7, "unregistered", "pw-12345"))),
            tokens: token_service(),
        };
        let err = usecase.execute(&expired_token(7)).await.unwrap_err();
        assert!(matches!(err, AppError::TokenExpired));
    }
}
