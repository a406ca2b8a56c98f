//! Product document decoding
//!
//! Products carry the multi-valued and nested fields: category names and
//! codes (resolved later against dimension tables), an optional monthly
//! installment object and an optional list of promotions.

use super::{FieldResult, Fields};
use crate::domain::{MonthlyInstallment, ProductRecord, Promo, TransformError};

pub(crate) fn decode(f: &Fields<'_>) -> FieldResult<ProductRecord> {
    let id = f.external_id()?;
    let brand = f.opt_text("brand")?;
    let categories = f.string_list("category")?;
    let category_codes = f.string_list("categoryCodes")?;
    let category_id = category_id(f)?;

    let monthly_installment = f
        .opt_object("monthlyInstallment")?
        .map(|m| monthly_installment(&m))
        .transpose()?;

    let promos = f
        .opt_object_list("promo")?
        .iter()
        .map(promo)
        .collect::<FieldResult<Vec<_>>>()?;

    Ok(ProductRecord {
        id,
        adjusted_rating: f.opt_float("adjustedRating")?,
        brand,
        categories,
        category_codes,
        category_id,
        created_time: f.opt_text("createdTime")?,
        credit_monthly_price: f.opt_float("creditMonthlyPrice")?,
        currency: f.opt_text("currency")?,
        delivery_duration: f.opt_text("deliveryDuration")?,
        discount: f.opt_float("discount")?,
        has_variants: f.opt_bool("hasVariants")?,
        loan_available: f.opt_bool("loanAvailable")?,
        monthly_installment,
        promos,
        rating: f.opt_float("rating")?,
        reviews_link: f.opt_text("reviewsLink")?,
        reviews_quantity: f.opt_int("reviewsQuantity")?,
        link: f.opt_text("shopLink")?,
        title: f.opt_text("title")?,
        unit_price: f.opt_float("unitPrice")?,
        unit_sale_price: f.opt_float("unitSalePrice")?,
        weight: f.opt_float("weight")?,
    })
}

/// `categoryId` arrives as a decimal string
fn category_id(f: &Fields<'_>) -> FieldResult<i64> {
    let raw = f.req_text("categoryId")?;
    raw.trim()
        .parse::<i64>()
        .map_err(|_| TransformError::malformed("categoryId", "integer string"))
}

fn monthly_installment(m: &Fields<'_>) -> FieldResult<MonthlyInstallment> {
    Ok(MonthlyInstallment {
        installment_id: m.truncated_int("id")?,
        installment: m.req_bool("installment")?,
        formatted_per_month: m.req_text("formattedPerMonth")?,
    })
}

fn promo(p: &Fields<'_>) -> FieldResult<Promo> {
    Ok(Promo {
        priority: p.truncated_int("priority")?,
        code: p.req_text("code")?,
        comment: p.opt_text("text")?,
        promo_type: p.req_text("type")?,
    })
}
