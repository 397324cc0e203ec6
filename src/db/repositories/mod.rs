pub mod account_repository;
pub mod auth_token_repository;
pub mod food_repository;
pub mod order_repository;
pub mod password_reset_token_repository;
pub mod voucher_repository;
