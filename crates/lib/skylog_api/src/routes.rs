//! Route paths.

pub const GET_API_HEALTH: &str = "/api/health";

pub const POST_AUTH_REGISTER: &str = "/api/auth/register";
pub const POST_AUTH_LOGIN: &str = "/api/auth/login";
pub const POST_AUTH_SEND_CODE: &str = "/api/auth/send-code";
pub const POST_AUTH_VERIFY_CODE: &str = "/api/auth/verify-code";
pub const POST_AUTH_RESET_PASSWORD: &str = "/api/auth/reset-password";
pub const GET_AUTH_ME: &str = "/api/auth/me";
pub const PATCH_AUTH_PROFILE: &str = "/api/auth/profile";

pub const JOURNALS: &str = "/api/journals";
pub const GET_JOURNALS_MINE: &str = "/api/journals/mine";
pub const JOURNALS_ID: &str = "/api/journals/{id}";
pub const POST_JOURNALS_ID_COMMENTS: &str = "/api/journals/{id}/comments";
pub const DELETE_JOURNALS_ID_COMMENTS_ID: &str = "/api/journals/{id}/comments/{comment_id}";
pub const POST_JOURNALS_ID_LIKE: &str = "/api/journals/{id}/like";

pub const FLIGHTS: &str = "/api/flights";
pub const FLIGHTS_ID: &str = "/api/flights/{id}";
pub const PATCH_FLIGHTS_ID_STATUS: &str = "/api/flights/{id}/status";

pub const MEMOS: &str = "/api/memos";
pub const MEMOS_ID: &str = "/api/memos/{id}";

pub const GET_USER_STATS: &str = "/api/user/stats";
