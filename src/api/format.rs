// Wire formatting helpers shared by the models

use bigdecimal::ToPrimitive;
use serde::Serializer;
use sqlx::types::BigDecimal;

/// NUMERIC money columns go out as JSON floats; NULL reads as 0
pub fn money<S: Serializer>(value: &Option<BigDecimal>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(money_to_f64(value.as_ref()))
}

pub fn money_to_f64(value: Option<&BigDecimal>) -> f64 {
    value.and_then(ToPrimitive::to_f64).unwrap_or(0.0)
}
