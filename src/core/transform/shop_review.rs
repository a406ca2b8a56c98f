//! Shop review document decoding

use super::{FieldResult, Fields};
use crate::domain::ShopReviewRecord;

pub(crate) fn decode(f: &Fields<'_>) -> FieldResult<ShopReviewRecord> {
    let id = f.external_id()?;
    let shop_id = f.req_text("merchant_id")?;
    let rating = f.opt_float("rating")?;
    let author = f.opt_text("author")?;

    // Only the review text is kept from the comment object
    let comment = match f.opt_object("comment")? {
        Some(comment) => comment.present_text("text")?,
        None => None,
    };

    Ok(ShopReviewRecord {
        id,
        shop_id,
        rating,
        author,
        comment,
        date: f.opt_text("date")?,
    })
}
