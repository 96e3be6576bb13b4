/// Serializes `DateTime<Utc>` as a JWT "NumericDate" (RFC 7519 section 2).
pub mod date_time_as_unix_seconds {
    use chrono::{DateTime, TimeZone, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(date.timestamp())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Utc.timestamp_opt(i64::deserialize(deserializer)?, 0)
            .single() // If there are multiple or no valid DateTimes from timestamp, return None
            .ok_or_else(|| serde::de::Error::custom("Invalid Unix timestamp value."))
    }
}

/// Serializes a BSON id as the plain string clients see from the document driver.
pub fn bson_id_string(id: &bson::Bson) -> String {
    match id {
        bson::Bson::ObjectId(oid) => oid.to_hex(),
        bson::Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}
