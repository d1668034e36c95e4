//! Session (visit) lookups

use lmri_common::Result;
use sqlx::{Any, Executor};

use crate::models::Session;

/// Find the session of a candidate for a visit label at a center
pub async fn find_session<'e, E>(
    executor: E,
    cand_id: i64,
    visit_label: &str,
    center_id: i64,
) -> Result<Option<Session>>
where
    E: Executor<'e, Database = Any>,
{
    let session = sqlx::query_as::<_, Session>(
        r#"
        SELECT ID, CandID, Visit_label, CenterID
        FROM session
        WHERE CandID = ? AND Visit_label = ? AND CenterID = ?
        "#,
    )
    .bind(cand_id)
    .bind(visit_label)
    .bind(center_id)
    .fetch_optional(executor)
    .await?;

    Ok(session)
}
