//! Candidate lookups

use lmri_common::Result;
use sqlx::{Any, Executor};

use crate::models::Candidate;

/// Find a candidate by PSCID
pub async fn find_by_pscid<'e, E>(executor: E, pscid: &str) -> Result<Option<Candidate>>
where
    E: Executor<'e, Database = Any>,
{
    let candidate = sqlx::query_as::<_, Candidate>(
        "SELECT CandID, PSCID FROM candidate WHERE PSCID = ?",
    )
    .bind(pscid)
    .fetch_optional(executor)
    .await?;

    Ok(candidate)
}
