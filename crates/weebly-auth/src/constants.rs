//! Weebly provider constants

use std::time::Duration;

/// Weebly web domain hosting the app-center OAuth endpoints
pub const WEEBLY_DOMAIN: &str = "https://www.weebly.com";

/// Base URL for authenticated API calls
pub const WEEBLY_API_DOMAIN: &str = "https://api.weebly.com/v1";

/// Authorization endpoint path, relative to `WEEBLY_DOMAIN`
pub const AUTHORIZE_PATH: &str = "/app-center/oauth/authorize";

/// Token endpoint path, relative to `WEEBLY_DOMAIN`
pub const ACCESS_TOKEN_PATH: &str = "/app-center/oauth/access_token";

/// Header carrying a user's access token on API calls
pub const ACCESS_TOKEN_HEADER: &str = "X-Weebly-Access-Token";

/// Header Weebly sets on webhook deliveries with the delivery attempt count
pub const ATTEMPT_HEADER: &str = "X-Weebly-Attempt";

/// User agent sent on every outbound call
pub const USER_AGENT: &str = "weebly/weebly_client";

/// Connect and overall timeout for outbound calls
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable holding the application client id
pub const CLIENT_ID_ENV: &str = "WEEBLY_CLIENT_ID";

/// Environment variable holding the application client secret
pub const CLIENT_SECRET_ENV: &str = "WEEBLY_SECRET_KEY";
