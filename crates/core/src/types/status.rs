//! Order status lifecycle.

use serde::{Deserialize, Serialize};

/// Order status drawn from the fixed lifecycle:
///
/// ```text
/// new -> confirmed -> assembled -> sent -> delivered
///   \________\____________\_________\
///                                    -> canceled
/// ```
///
/// `canceled` is reachable from any non-terminal state; `delivered` and
/// `canceled` are terminal. The storage layer only constrains the status to
/// this enumerated set - transition legality is checked by the ordering
/// workflow through [`OrderStatus::can_transition_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order placed, awaiting confirmation.
    #[default]
    New,
    /// Confirmed by the shop; stock has been reserved.
    Confirmed,
    /// Picked and packed.
    Assembled,
    /// Handed to the carrier.
    Sent,
    /// Received by the buyer (terminal).
    Delivered,
    /// Canceled before delivery (terminal).
    Canceled,
}

impl OrderStatus {
    /// Whether no further transitions are allowed from this status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Canceled)
    }

    /// The next status in the happy-path lifecycle, if any.
    #[must_use]
    pub const fn next(&self) -> Option<Self> {
        match self {
            Self::New => Some(Self::Confirmed),
            Self::Confirmed => Some(Self::Assembled),
            Self::Assembled => Some(Self::Sent),
            Self::Sent => Some(Self::Delivered),
            Self::Delivered | Self::Canceled => None,
        }
    }

    /// Whether moving from `self` to `target` is a legal transition.
    ///
    /// Legal moves are exactly: one step forward along the lifecycle, or to
    /// `Canceled` from any non-terminal status.
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        if target == Self::Canceled {
            return !self.is_terminal();
        }
        self.next() == Some(target)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::New => "new",
            Self::Confirmed => "confirmed",
            Self::Assembled => "assembled",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Canceled => "canceled",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "confirmed" => Ok(Self::Confirmed),
            "assembled" => Ok(Self::Assembled),
            "sent" => Ok(Self::Sent),
            "delivered" => Ok(Self::Delivered),
            "canceled" => Ok(Self::Canceled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

// Stored as TEXT; delegate to String rather than a Postgres enum type so
// migrations stay plain DDL.
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for OrderStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for OrderStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(s.parse::<Self>()?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for OrderStatus {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.to_string(), buf)
    }
}
