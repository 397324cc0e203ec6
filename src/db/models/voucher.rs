use chrono::{DateTime, Utc};
use diesel::{Insertable, Queryable, Selectable};
use uuid::Uuid;

use crate::db::schema::vouchers;
use savora_api::VoucherResponse;

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = vouchers)]
pub struct NewVoucher {
    pub code: String,
    pub discount_percent: i32,
    pub approved: bool,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = vouchers)]
pub struct Voucher {
    pub id: Uuid,
    pub code: String,
    pub discount_percent: i32,
    pub approved: bool,
    #[allow(dead_code)]
    pub created_at: DateTime<Utc>,
}

impl From<Voucher> for VoucherResponse {
    fn from(voucher: Voucher) -> Self {
        VoucherResponse {
            id: voucher.id,
            code: voucher.code,
            discount_percent: voucher.discount_percent,
            approved: voucher.approved,
        }
    }
}
