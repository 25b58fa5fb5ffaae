use ::serde::{Deserialize, Deserializer, Serialize, Serializer};

pub mod as_native {
    use super::{Deserialize, Deserializer, Serialize, Serializer};
    use crate::{DecodeError, PrefixflakeId};

    /// Serialize an ID as its native integer representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &PrefixflakeId, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        id.to_raw().serialize(s)
    }

    /// Deserialize an ID from its native integer representation.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The underlying deserializer fails
    /// - The value has its sign bit set
    pub fn deserialize<'de, D>(d: D) -> Result<PrefixflakeId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = u64::deserialize(d)?;
        let id = PrefixflakeId::from_raw(raw);
        if !id.is_valid() {
            return Err(::serde::de::Error::custom(DecodeError::InvalidSignBit {
                raw,
            }));
        }
        Ok(id)
    }
}

pub mod as_text {
    use super::{Deserializer, Serializer};
    use crate::PrefixflakeId;

    /// Serialize an ID as its 13-character text form.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &PrefixflakeId, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(id.encode().as_str())
    }

    /// Deserialize an ID from its 13-character text form.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The underlying deserializer fails
    /// - The string is not valid text (length, symbols or padding bit)
    /// - The decoded value has its sign bit set
    pub fn deserialize<'de, D>(d: D) -> Result<PrefixflakeId, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TextVisitor;

        impl ::serde::de::Visitor<'_> for TextVisitor {
            type Value = PrefixflakeId;

            fn expecting(&self, formatter: &mut core::fmt::Formatter) -> core::fmt::Result {
                formatter.write_str("a 13-character base32 ID")
            }

            #[inline]
            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: ::serde::de::Error,
            {
                PrefixflakeId::decode(v).map_err(::serde::de::Error::custom)
            }
        }

        d.deserialize_str(TextVisitor)
    }
}
