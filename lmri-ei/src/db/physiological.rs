//! Physiological file, electrode and archive database operations

use lmri_common::Result;
use sqlx::{Any, AnyConnection, Executor};

use crate::models::{PhysiologicalArchive, PhysiologicalFile};
use crate::tsv::ElectrodeRow;

/// Parameter type under which the electrode file digest is stored
pub const ELECTRODE_HASH_PARAMETER: &str = "electrode_file_blake2b_hash";

/// Find the physiological file recorded for a session
///
/// Lowest PhysiologicalFileID wins when a session holds several recordings.
pub async fn find_file_by_session<'e, E>(
    executor: E,
    session_id: i64,
) -> Result<Option<PhysiologicalFile>>
where
    E: Executor<'e, Database = Any>,
{
    let file = sqlx::query_as::<_, PhysiologicalFile>(
        r#"
        SELECT PhysiologicalFileID, SessionID, FilePath
        FROM physiological_file
        WHERE SessionID = ?
        ORDER BY PhysiologicalFileID
        LIMIT 1
        "#,
    )
    .bind(session_id)
    .fetch_optional(executor)
    .await?;

    Ok(file)
}

/// Electrode ids already attached to a physiological file
pub async fn find_electrode_ids<'e, E>(executor: E, physiological_file_id: i64) -> Result<Vec<i64>>
where
    E: Executor<'e, Database = Any>,
{
    let ids = sqlx::query_scalar(
        "SELECT PhysiologicalElectrodeID FROM physiological_electrode WHERE PhysiologicalFileID = ?",
    )
    .bind(physiological_file_id)
    .fetch_all(executor)
    .await?;

    Ok(ids)
}

/// Insert one `physiological_electrode` row per TSV row
///
/// **Returns:** number of rows inserted
pub async fn insert_electrodes(
    conn: &mut AnyConnection,
    physiological_file_id: i64,
    rows: &[ElectrodeRow],
    file_path: &str,
) -> Result<usize> {
    for row in rows {
        sqlx::query(
            r#"
            INSERT INTO physiological_electrode
                (PhysiologicalFileID, Name, Type, Material, X, Y, Z, Impedance, FilePath)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(physiological_file_id)
        .bind(&row.name)
        .bind(row.electrode_type.as_deref())
        .bind(row.material.as_deref())
        .bind(row.x.as_deref())
        .bind(row.y.as_deref())
        .bind(row.z.as_deref())
        .bind(row.impedance.as_deref())
        .bind(file_path)
        .execute(&mut *conn)
        .await?;
    }

    tracing::debug!(
        physiological_file_id,
        rows = rows.len(),
        file_path,
        "Inserted electrode rows"
    );

    Ok(rows.len())
}

/// Get the id of a parameter type, creating the type if missing
pub async fn get_or_create_parameter_type(
    conn: &mut AnyConnection,
    name: &str,
    description: &str,
) -> Result<i64> {
    let select = "SELECT ParameterTypeID FROM parameter_type WHERE Name = ?";

    if let Some(id) = sqlx::query_scalar::<_, i64>(select)
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?
    {
        return Ok(id);
    }

    sqlx::query(
        r#"
        INSERT INTO parameter_type (Name, Type, Description, SourceFrom, Queryable)
        VALUES (?, 'text', ?, 'physiological_file', 0)
        "#,
    )
    .bind(name)
    .bind(description)
    .execute(&mut *conn)
    .await?;

    let id = sqlx::query_scalar::<_, i64>(select)
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;

    tracing::info!(parameter_type = name, id, "Created parameter type");

    Ok(id)
}

/// Attach a parameter value to a physiological file
pub async fn insert_file_parameter(
    conn: &mut AnyConnection,
    physiological_file_id: i64,
    parameter_type_id: i64,
    value: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO physiological_parameter_file (PhysiologicalFileID, ParameterTypeID, Value)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(physiological_file_id)
    .bind(parameter_type_id)
    .bind(value)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Archive metadata for a physiological file
pub async fn find_archive<'e, E>(
    executor: E,
    physiological_file_id: i64,
) -> Result<Option<PhysiologicalArchive>>
where
    E: Executor<'e, Database = Any>,
{
    let archive = sqlx::query_as::<_, PhysiologicalArchive>(
        r#"
        SELECT PhysiologicalArchiveID, PhysiologicalFileID, FilePath, Blake2bHash
        FROM physiological_archive
        WHERE PhysiologicalFileID = ?
        ORDER BY PhysiologicalArchiveID
        LIMIT 1
        "#,
    )
    .bind(physiological_file_id)
    .fetch_optional(executor)
    .await?;

    Ok(archive)
}

/// Store a new archive digest
///
/// **Returns:** rows affected (0 when the archive id is unknown)
pub async fn update_archive_hash<'e, E>(executor: E, archive_id: i64, hash: &str) -> Result<u64>
where
    E: Executor<'e, Database = Any>,
{
    let result = sqlx::query(
        "UPDATE physiological_archive SET Blake2bHash = ? WHERE PhysiologicalArchiveID = ?",
    )
    .bind(hash)
    .bind(archive_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}
