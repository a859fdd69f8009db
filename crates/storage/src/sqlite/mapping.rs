use sqlx::Row;
use tick8_core::model::CardId;

use crate::repository::{CardRecord, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn card_id_from_i64(v: i64) -> Result<CardId, StorageError> {
    u64::try_from(v)
        .map(CardId::new)
        .map_err(|_| StorageError::Serialization("row_index sign overflow".into()))
}

pub(crate) fn card_id_to_i64(id: CardId) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| StorageError::Serialization("row_index overflow".into()))
}

pub(crate) fn map_card_row(row: &sqlx::sqlite::SqliteRow) -> Result<CardRecord, StorageError> {
    Ok(CardRecord {
        id: card_id_from_i64(row.try_get("row_index").map_err(ser)?)?,
        front: row.try_get("front").map_err(ser)?,
        back: row.try_get("back").map_err(ser)?,
        last_practice_date: row.try_get("last_practice_date").map_err(ser)?,
        stage: row.try_get("srs_stage").map_err(ser)?,
        failed_count: row.try_get("failed_count").map_err(ser)?,
    })
}
