//! Route path constants.

pub const GET_INDEX: &str = "/";
pub const GET_USER_NAME: &str = "/user/{name}";
pub const GET_USER_INFO: &str = "/user_info";
pub const GET_SECRET: &str = "/secret";
pub const GET_ADMIN: &str = "/admin";
pub const GET_PROFILE_USERNAME: &str = "/profile/{username}";

pub const GET_CLASSES: &str = "/classes";
pub const POST_CLASSES: &str = "/classes";
pub const GET_CLASSES_ID: &str = "/classes/{id}";
pub const POST_CLASSES_ID_REVIEWS: &str = "/classes/{id}/reviews";
pub const DELETE_CLASSES_ID_REVIEWS_ID: &str = "/classes/{id}/reviews/{review_id}";

pub const POST_AUTH_LOGIN: &str = "/auth/login";
pub const POST_AUTH_REGISTER: &str = "/auth/register";
pub const POST_AUTH_LOGOUT: &str = "/auth/logout";
pub const GET_AUTH_CONFIRM_TOKEN: &str = "/auth/confirm/{token}";
pub const POST_AUTH_CONFIRM: &str = "/auth/confirm";
pub const GET_AUTH_UNCONFIRMED: &str = "/auth/unconfirmed";

pub const STATIC_PREFIX: &str = "/static";
