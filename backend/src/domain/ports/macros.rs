//! Helper macro for declaring adapter error enums on ports.
//!
//! Each variant gets a snake_case constructor whose `String` fields accept
//! anything `Into<String>`, so adapters can write
//! `UserRepositoryError::query(err.to_string())`.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum StockPortError {
            Unreachable => "stock service unreachable",
            Query { message: String } => "stock query failed: {message}",
            Short { product: String, requested: u32 } =>
                "not enough stock for {product} (requested {requested})",
        }
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(StockPortError::unreachable(), StockPortError::Unreachable);
    }

    #[test]
    fn string_fields_accept_str() {
        let err = StockPortError::query("timeout");
        assert_eq!(err.to_string(), "stock query failed: timeout");
    }

    #[test]
    fn mixed_fields_keep_their_types() {
        let err = StockPortError::short("vase", 3_u32);
        assert_eq!(err.to_string(), "not enough stock for vase (requested 3)");
    }
}
