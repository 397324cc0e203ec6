use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AccountResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub role: String,
    pub status: String,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub account: AccountResponse,
    pub expires_in: i64,
}

/// Public login response (the refresh token only travels in the cookie)
#[derive(Serialize, Deserialize, Debug)]
pub struct PublicLoginResponse {
    pub access_token: String,
    pub account: AccountResponse,
    pub expires_in: i64,
}

impl From<LoginResponse> for PublicLoginResponse {
    fn from(src: LoginResponse) -> Self {
        Self {
            access_token: src.access_token,
            account: src.account,
            expires_in: src.expires_in,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FoodResponse {
    pub id: Uuid,
    pub enterprise_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i32,
    pub image_url: Option<String>,
    pub available: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FoodSearchResponse {
    pub query: String,
    pub results: Vec<FoodResponse>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VoucherResponse {
    pub id: Uuid,
    pub code: String,
    pub discount_percent: i32,
    pub approved: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OrderResponse {
    pub id: Uuid,
    pub enterprise_id: Uuid,
    pub total_cents: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Revenue aggregate for the enterprise dashboard
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RevenueResponse {
    pub enterprise_id: Uuid,
    pub order_count: i64,
    pub total_cents: i64,
}
