//! UUID-backed identifier newtypes for marketplace aggregates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
            ToSchema,
        )]
        #[serde(transparent)]
        #[schema(value_type = String, format = Uuid)]
        pub struct $name(Uuid);

        impl $name {
            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Generate a fresh random identifier.
            #[must_use]
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s.trim())?))
            }
        }

        impl From<$name> for Uuid {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

define_id! {
    /// Stable identifier of a user account.
    UserId
}

define_id! {
    /// Stable identifier of a catalogue product.
    ProductId
}

define_id! {
    /// Stable identifier of a customer order.
    OrderId
}

define_id! {
    /// Stable identifier of a customization request.
    CustomizationId
}

define_id! {
    /// Stable identifier of a chat message.
    MessageId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_surrounding_whitespace() {
        let id: UserId = " 3fa85f64-5717-4562-b3fc-2c963f66afa6 "
            .parse()
            .expect("valid uuid");
        assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }

    #[test]
    fn serialises_as_plain_string() {
        let id = ProductId::from_uuid(Uuid::nil());
        let value = serde_json::to_value(id).expect("serialise id");
        assert_eq!(value, serde_json::json!("00000000-0000-0000-0000-000000000000"));
    }

    #[test]
    fn rejects_garbage() {
        assert!("not-a-uuid".parse::<OrderId>().is_err());
    }
}
