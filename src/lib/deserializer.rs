// SPDX-License-Identifier: Apache-2.0

use std::convert::TryFrom;
use std::marker::PhantomData;
use std::str::FromStr;

use serde::{de, de::Visitor, Deserializer};

// Metadata sources often quote integers, e.g. `mtu: "1500"` or
// `prefix: "24"`.
// This function is inspired by https://serde.rs/string-or-struct.html
fn option_integer_or_string<'de, D, T>(
    deserializer: D,
) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64> + FromStr,
    <T as TryFrom<u64>>::Error: std::fmt::Display,
    <T as FromStr>::Err: std::fmt::Display,
{
    struct IntegerOrString<T>(PhantomData<fn() -> Option<T>>);

    impl<'de, T> Visitor<'de> for IntegerOrString<T>
    where
        T: TryFrom<u64> + FromStr,
        <T as TryFrom<u64>>::Error: std::fmt::Display,
        <T as FromStr>::Err: std::fmt::Display,
    {
        type Value = Option<T>;

        fn expecting(
            &self,
            formatter: &mut std::fmt::Formatter,
        ) -> std::fmt::Result {
            formatter.write_str("integer or string")
        }

        fn visit_str<E>(self, value: &str) -> Result<Option<T>, E>
        where
            E: de::Error,
        {
            FromStr::from_str(value.trim())
                .map_err(de::Error::custom)
                .map(Some)
        }

        fn visit_u64<E>(self, value: u64) -> Result<Option<T>, E>
        where
            E: de::Error,
        {
            TryFrom::try_from(value)
                .map_err(de::Error::custom)
                .map(Some)
        }

        fn visit_i64<E>(self, value: i64) -> Result<Option<T>, E>
        where
            E: de::Error,
        {
            let value = u64::try_from(value).map_err(de::Error::custom)?;
            self.visit_u64(value)
        }

        fn visit_unit<E>(self) -> Result<Option<T>, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(IntegerOrString(PhantomData))
}

pub(crate) fn option_u64_or_string<'de, D>(
    deserializer: D,
) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    option_integer_or_string(deserializer)
}

pub(crate) fn option_u32_or_string<'de, D>(
    deserializer: D,
) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    option_integer_or_string(deserializer)
}

pub(crate) fn option_u16_or_string<'de, D>(
    deserializer: D,
) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    option_integer_or_string(deserializer)
}

pub(crate) fn option_u8_or_string<'de, D>(
    deserializer: D,
) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    option_integer_or_string(deserializer)
}
