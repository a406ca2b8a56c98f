//! Shop document decoding

use super::{FieldResult, Fields};
use crate::domain::ShopRecord;

pub(crate) fn decode(f: &Fields<'_>) -> FieldResult<ShopRecord> {
    Ok(ShopRecord {
        id: f.external_id()?,
        name: f.opt_text("name")?,
    })
}
