//! Shared utility functions

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    use argon2::password_hash::SaltString;
    use argon2::password_hash::rand_core::OsRng;
    use argon2::{Argon2, PasswordHasher};
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Convert a decimal money amount (BRL) to integer centavos.
///
/// Single conversion point for the whole crate. Midpoint rounds away from
/// zero, matching `round(amount * 100)`.
pub fn to_centavos(amount: Decimal) -> Option<i64> {
    let cents = (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    cents.to_i64()
}

/// Convert integer centavos back to a decimal amount with two fraction digits.
pub fn centavos_to_decimal(centavos: i64) -> Decimal {
    Decimal::new(centavos, 2)
}

/// Serialize an `i64` centavos field as a decimal amount (e.g. 1050 -> "10.50").
pub fn serialize_centavos<S>(centavos: &i64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serde::Serialize::serialize(&centavos_to_decimal(*centavos), serializer)
}
