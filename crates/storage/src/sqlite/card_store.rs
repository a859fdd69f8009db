use sqlx::Row;
use tick8_core::model::{Answer, Card, CardId, PracticeOutcome};

use super::SqliteCardStore;
use super::mapping::{card_id_from_i64, card_id_to_i64, map_card_row};
use crate::repository::{
    CardRecord, CardStore, NewCardRecord, StorageError, bumped_failed_count, format_practice_date,
};

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

impl SqliteCardStore {
    /// Append a card row and return the id the store assigned to it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the insert fails.
    pub async fn insert_card(&self, card: &NewCardRecord) -> Result<CardId, StorageError> {
        let result = sqlx::query(
            r"
            INSERT INTO cards (front, back, last_practice_date, srs_stage, failed_count)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(card.front.as_str())
        .bind(card.back.as_str())
        .bind(card.last_practice_date.as_deref())
        .bind(card.stage.as_deref())
        .bind(card.failed_count.as_deref())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        card_id_from_i64(result.last_insert_rowid())
    }

    /// Raw rows in storage order, blank rows included.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails or a row cannot be decoded.
    pub async fn records(&self) -> Result<Vec<CardRecord>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT row_index, front, back, last_practice_date, srs_stage, failed_count
            FROM cards
            ORDER BY row_index ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_card_row).collect()
    }
}

#[async_trait::async_trait]
impl CardStore for SqliteCardStore {
    async fn fetch_all_cards(&self) -> Result<Vec<Card>, StorageError> {
        Ok(self
            .records()
            .await?
            .into_iter()
            .filter(|record| !record.is_blank())
            .map(CardRecord::into_card)
            .collect())
    }

    async fn persist_outcome(&self, outcome: &PracticeOutcome) -> Result<(), StorageError> {
        let row_index = card_id_to_i64(outcome.card_id)?;
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let current = sqlx::query("SELECT failed_count FROM cards WHERE row_index = ?1")
            .bind(row_index)
            .fetch_optional(&mut *tx)
            .await
            .map_err(conn)?
            .ok_or(StorageError::NotFound)?;

        sqlx::query(
            r"
            UPDATE cards
            SET last_practice_date = ?2, srs_stage = ?3
            WHERE row_index = ?1
            ",
        )
        .bind(row_index)
        .bind(format_practice_date(outcome.practiced_on))
        .bind(outcome.new_stage.to_string())
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        if outcome.answer == Answer::Incorrect {
            let stored: Option<String> = current
                .try_get("failed_count")
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            sqlx::query("UPDATE cards SET failed_count = ?2 WHERE row_index = ?1")
                .bind(row_index)
                .bind(bumped_failed_count(stored.as_deref()).to_string())
                .execute(&mut *tx)
                .await
                .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }
}
