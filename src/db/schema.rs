diesel::table! {
    accounts (id) {
        id -> Uuid,
        #[max_length = 255]
        email -> Varchar,
        #[max_length = 100]
        username -> Varchar,
        #[max_length = 255]
        password_hash -> Nullable<Varchar>,
        #[max_length = 20]
        status -> Varchar,
        #[max_length = 20]
        role -> Varchar,
        avatar_url -> Nullable<Text>,
        #[max_length = 255]
        oauth_provider_id -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        last_login_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    auth_tokens (id) {
        id -> Uuid,
        account_id -> Uuid,
        #[max_length = 255]
        refresh_token -> Varchar,
        is_valid -> Bool,
        expires_at -> Timestamptz,
        revoked_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    password_reset_tokens (id) {
        id -> Uuid,
        account_id -> Uuid,
        #[max_length = 10]
        code -> Varchar,
        expires_at -> Timestamptz,
        used -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    foods (id) {
        id -> Uuid,
        enterprise_id -> Uuid,
        #[max_length = 255]
        name -> Varchar,
        description -> Nullable<Text>,
        price_cents -> Int4,
        image_url -> Nullable<Text>,
        available -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    vouchers (id) {
        id -> Uuid,
        #[max_length = 50]
        code -> Varchar,
        discount_percent -> Int4,
        approved -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    orders (id) {
        id -> Uuid,
        account_id -> Uuid,
        enterprise_id -> Uuid,
        total_cents -> Int4,
        #[max_length = 20]
        status -> Varchar,
        #[max_length = 255]
        charge_id -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(auth_tokens -> accounts (account_id));
diesel::joinable!(password_reset_tokens -> accounts (account_id));
diesel::joinable!(orders -> accounts (account_id));

diesel::allow_tables_to_appear_in_same_query!(
    accounts,
    auth_tokens,
    password_reset_tokens,
    foods,
    vouchers,
    orders,
);
