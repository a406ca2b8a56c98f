//! Offer document decoding

use super::{FieldResult, Fields};
use crate::domain::OfferRecord;

pub(crate) fn decode(f: &Fields<'_>) -> FieldResult<OfferRecord> {
    Ok(OfferRecord {
        id: f.external_id()?,
        product_id: f.opt_text("masterSku")?,
        category: f.opt_text("masterCategory")?,
        shop_id: f.opt_text("merchantId")?,
        availability_date: f.opt_text("availabilityDate")?,
        delivery: f.opt_text("delivery")?,
        delivery_duration: f.opt_text("deliveryDuration")?,
        kaspi_delivery: f.opt_bool("kaspiDelivery")?,
        kd_destination_city: f.opt_text("kdDestinationCity")?,
        kd_pickup_date: f.opt_text("kdPickupDate")?,
        located_in_point: f.opt_text("locatedInPoint")?,
        shop_rating: f.opt_float("merchantRating")?,
        shop_reviews_quantity: f.opt_int("merchantReviewsQuantity")?,
        preorder: f.opt_bool("preorder")?,
        price: f.opt_float("price")?,
    })
}
