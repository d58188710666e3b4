use chrono::Duration;
use tubely_api::auth::JwtAuthenticator;
use uuid::Uuid;

/// Secret shared by the test config and the token issuer.
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters-long";

/// A user with a valid bearer token.
pub struct TestUser {
    pub user_id: Uuid,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

pub fn test_user() -> TestUser {
    let user_id = Uuid::new_v4();
    let token = JwtAuthenticator::new(TEST_JWT_SECRET)
        .issue_token(user_id, Duration::hours(1))
        .expect("Failed to issue test token");
    TestUser { user_id, token }
}
