use uuid::Uuid;

use crate::{
    api::error,
    modules::file_upload::{model::NewFile, repository::FileRepository, schema::FileEntity},
};

#[derive(Clone)]
pub struct FileRepositoryPg {
    pool: sqlx::PgPool,
}

impl FileRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FileRepository for FileRepositoryPg {
    fn get_pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }

    async fn create<'e, E>(&self, file: &NewFile, tx: E) -> Result<FileEntity, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        let entity = sqlx::query_as::<_, FileEntity>(
            r#"
            INSERT INTO files
                (id, filename, original_filename, mime_type, mime_category, file_size, storage_path, uploaded_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&file.filename)
        .bind(&file.original_filename)
        .bind(&file.mime_type)
        .bind(file.mime_category)
        .bind(file.file_size)
        .bind(&file.storage_path)
        .bind(file.uploaded_by)
        .fetch_one(tx)
        .await?;

        Ok(entity)
    }

    async fn find_by_id(&self, file_id: &Uuid) -> Result<Option<FileEntity>, error::SystemError> {
        let file = sqlx::query_as::<_, FileEntity>("SELECT * FROM files WHERE id = $1")
            .bind(file_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(file)
    }

    async fn find_by_ids(
        &self,
        file_ids: &[Uuid],
    ) -> Result<Vec<FileEntity>, error::SystemError> {
        if file_ids.is_empty() {
            return Ok(Vec::new());
        }

        let files = sqlx::query_as::<_, FileEntity>("SELECT * FROM files WHERE id = ANY($1)")
            .bind(file_ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(files)
    }

    async fn delete<'e, E>(&self, file_id: &Uuid, tx: E) -> Result<(), error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        sqlx::query("DELETE FROM files WHERE id = $1").bind(file_id).execute(tx).await?;

        Ok(())
    }
}
