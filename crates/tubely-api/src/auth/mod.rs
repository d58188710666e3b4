pub mod jwt;
pub mod middleware;
pub mod models;

pub use jwt::{Authenticator, JwtAuthenticator};
pub use middleware::{auth_middleware, AuthState};
pub use models::{AuthContext, Claims};
