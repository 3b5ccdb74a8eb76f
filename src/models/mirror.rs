use chrono::NaiveDateTime;
use diesel::prelude::*;

/// Diesel row for one mirrored collection: a fixed key and the collection
/// serialized as a JSON array.
#[derive(Debug, Clone, Queryable, Insertable)]
#[diesel(table_name = crate::schema::mirror_entries)]
pub struct MirrorEntry {
    pub key: String,
    pub payload: String,
    pub updated_at: NaiveDateTime,
}
