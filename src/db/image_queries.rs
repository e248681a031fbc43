use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::request::ImageRecord;

fn image_from_row(row: &PgRow) -> Result<ImageRecord, sqlx::Error> {
    Ok(ImageRecord {
        sequence_id: row.try_get("id")?,
        request_id: row.try_get("request_id")?,
        product_name: row.try_get("product_name")?,
        original_url: row.try_get("original_url")?,
        processed_image_location: row.try_get("processed_image_location")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Insert an image record for a request; the processed location starts empty.
pub async fn insert_image(
    pool: &PgPool,
    request_id: Uuid,
    product_name: &str,
    original_url: &str,
) -> Result<ImageRecord, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO image_records (request_id, product_name, original_url)
        VALUES ($1, $2, $3)
        RETURNING id, request_id, product_name, original_url, processed_image_location, created_at
        "#,
    )
    .bind(request_id)
    .bind(product_name)
    .bind(original_url)
    .fetch_one(pool)
    .await?;

    image_from_row(&row)
}

pub async fn set_processed_location(
    pool: &PgPool,
    sequence_id: i64,
    location: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE image_records SET processed_image_location = $1 WHERE id = $2")
        .bind(location)
        .bind(sequence_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// All image records of a request, ordered by sequence id.
pub async fn list_for_request(
    pool: &PgPool,
    request_id: Uuid,
) -> Result<Vec<ImageRecord>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, request_id, product_name, original_url, processed_image_location, created_at
        FROM image_records
        WHERE request_id = $1
        ORDER BY id ASC
        "#,
    )
    .bind(request_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(image_from_row).collect()
}

/// Drop records left behind by an earlier, failed attempt.
pub async fn delete_for_request(pool: &PgPool, request_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM image_records WHERE request_id = $1")
        .bind(request_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
