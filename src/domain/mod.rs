pub mod engagement;
pub mod post;
pub mod user;

pub type PostId = i64;
pub type UserId = i64;

/// Serde support for the backend's offset-less timestamps
/// (`2024-05-01T10:20:30` with optional fractional seconds).
pub mod local_datetime {
    use time::error::Parse;
    use time::macros::format_description;
    use time::PrimitiveDateTime;

    pub fn parse(value: &str) -> Result<PrimitiveDateTime, Parse> {
        PrimitiveDateTime::parse(
            value,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
        )
        .or_else(|_| {
            PrimitiveDateTime::parse(
                value,
                format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
            )
        })
    }

    /// Fractional seconds are written only when present, trailing zeros trimmed.
    pub fn format(value: &PrimitiveDateTime) -> Result<String, time::error::Format> {
        if value.nanosecond() == 0 {
            value.format(format_description!(
                "[year]-[month]-[day]T[hour]:[minute]:[second]"
            ))
        } else {
            value.format(format_description!(
                "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"
            ))
        }
    }

    pub mod option {
        use serde::{de, ser, Deserialize, Deserializer, Serializer};
        use time::PrimitiveDateTime;

        pub fn serialize<S>(value: &Option<PrimitiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(value) => {
                    let formatted = super::format(value).map_err(ser::Error::custom)?;
                    serializer.serialize_some(&formatted)
                }
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<PrimitiveDateTime>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw = Option::<String>::deserialize(deserializer)?;
            raw.map(|value| super::parse(&value).map_err(de::Error::custom))
                .transpose()
        }
    }
}
