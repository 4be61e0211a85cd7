use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    api::{error, page::Page, page::PageQuery},
    modules::{
        file_upload::{
            model::UploadPart, repository::FileRepository, schema::FileUploadResponse,
            service::FileUploadService,
        },
        post::{
            model::{CreatePostFields, PostAttachmentRow, PostResponse, RankedPostRow},
            repository::PostRepository,
        },
        reaction::{
            model::{ReactionResponse, summaries_by_owner, viewer_reactions_by_owner},
            repository::ReactionRepository,
            schema::OwnerKind,
            service::ReactionService,
        },
        user::{model::UserInfo, repository::UserRepository},
    },
};

#[derive(Clone)]
pub struct PostService<P, R, F, U>
where
    P: PostRepository + Send + Sync,
    R: ReactionRepository + Send + Sync,
    F: FileRepository + Send + Sync,
    U: UserRepository + Send + Sync,
{
    post_repo: Arc<P>,
    reaction_repo: Arc<R>,
    reaction_service: ReactionService<R>,
    file_service: FileUploadService<F>,
    user_repo: Arc<U>,
}

impl<P, R, F, U> PostService<P, R, F, U>
where
    P: PostRepository + Send + Sync,
    R: ReactionRepository + Send + Sync,
    F: FileRepository + Send + Sync,
    U: UserRepository + Send + Sync,
{
    pub fn with_dependencies(
        post_repo: Arc<P>,
        reaction_repo: Arc<R>,
        reaction_service: ReactionService<R>,
        file_service: FileUploadService<F>,
        user_repo: Arc<U>,
    ) -> Self {
        PostService { post_repo, reaction_repo, reaction_service, file_service, user_repo }
    }

    /// Uploads run before the insert; any single failure fails the
    /// whole create.
    pub async fn create_post(
        &self,
        creator_id: Uuid,
        fields: CreatePostFields,
        parts: Vec<UploadPart>,
    ) -> Result<PostResponse, error::SystemError> {
        if fields.content.trim().is_empty() && parts.is_empty() {
            return Err(error::SystemError::bad_request(
                "Post must have content or attachments",
            ));
        }

        if let Some(shared_id) = &fields.shared_post_id {
            if self.post_repo.find_by_id(shared_id).await?.is_none() {
                return Err(error::SystemError::not_found("Shared post not found"));
            }
        }

        let uploaded = self.file_service.upload_many(parts, creator_id).await?;

        let mut tx = self.post_repo.get_pool().begin().await?;
        let post = self
            .post_repo
            .create(&creator_id, &fields.content, fields.shared_post_id.as_ref(), tx.as_mut())
            .await?;
        for file in &uploaded {
            self.post_repo.add_attachment(&post.id, &file.id, tx.as_mut()).await?;
        }
        tx.commit().await?;

        let creator = self
            .user_repo
            .find_by_id(&creator_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        Ok(PostResponse {
            id: post.id,
            creator: UserInfo {
                id: creator.id,
                username: creator.username,
                display_name: creator.display_name,
                avatar_url: creator.avatar_url,
            },
            content: post.content,
            shared_post_id: post.shared_post_id,
            attachments: uploaded,
            reaction_count: 0,
            comment_count: 0,
            reactions: Vec::new(),
            has_reacted: false,
            user_reaction_emoji: None,
            user_reaction_id: None,
            created_at: post.created_at,
            updated_at: post.updated_at,
        })
    }

    pub async fn get_ranked_feed(
        &self,
        viewer_id: Uuid,
        query: &PageQuery,
    ) -> Result<Page<PostResponse>, error::SystemError> {
        if self.user_repo.find_by_id(&viewer_id).await?.is_none() {
            return Err(error::SystemError::not_found("User not found"));
        }

        let (rows, total) = tokio::try_join!(
            self.post_repo.ranked_feed(&viewer_id, query.size, query.offset()),
            self.post_repo.count_all(),
        )?;

        let items = self.enrich(rows, viewer_id).await?;
        Ok(Page::new(items, query.page, query.size, total))
    }

    pub async fn get_user_posts(
        &self,
        creator_id: Uuid,
        viewer_id: Uuid,
        query: &PageQuery,
    ) -> Result<Page<PostResponse>, error::SystemError> {
        if self.user_repo.find_by_id(&creator_id).await?.is_none() {
            return Err(error::SystemError::not_found("User not found"));
        }

        let (rows, total) = tokio::try_join!(
            self.post_repo.posts_by_creator(&creator_id, &viewer_id, query.size, query.offset()),
            self.post_repo.count_by_creator(&creator_id),
        )?;

        let items = self.enrich(rows, viewer_id).await?;
        Ok(Page::new(items, query.page, query.size, total))
    }

    pub async fn delete_post(
        &self,
        post_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), error::SystemError> {
        let post = self
            .post_repo
            .find_by_id(&post_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Post not found"))?;

        if post.creator_id != user_id {
            return Err(error::SystemError::forbidden("You can only delete your own posts"));
        }

        let mut tx = self.post_repo.get_pool().begin().await?;
        self.reaction_repo.delete_for_owner(OwnerKind::Post, &post_id, tx.as_mut()).await?;
        self.post_repo.delete_comment_tree_reactions(&post_id, tx.as_mut()).await?;
        self.post_repo.delete(&post_id, tx.as_mut()).await?;
        tx.commit().await?;

        Ok(())
    }

    pub async fn react_to_post(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        emoji: &str,
    ) -> Result<ReactionResponse, error::SystemError> {
        if self.post_repo.find_by_id(&post_id).await?.is_none() {
            return Err(error::SystemError::not_found("Post not found"));
        }

        self.reaction_service.create_reaction(OwnerKind::Post, post_id, user_id, emoji).await
    }

    pub async fn remove_post_reaction(
        &self,
        reaction_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), error::SystemError> {
        self.reaction_service.delete_reaction(reaction_id, user_id).await
    }

    /// Page enrichment: reaction summaries, the viewer's own reaction
    /// and attachments, each fetched once for the whole page.
    async fn enrich(
        &self,
        rows: Vec<RankedPostRow>,
        viewer_id: Uuid,
    ) -> Result<Vec<PostResponse>, error::SystemError> {
        let post_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let (summary_rows, viewer_rows, attachment_rows) = tokio::try_join!(
            self.reaction_repo.summaries_for_owners(OwnerKind::Post, &post_ids),
            self.reaction_repo.viewer_reactions_for_owners(OwnerKind::Post, &post_ids, &viewer_id),
            self.post_repo.attachments_for_posts(&post_ids),
        )?;

        let mut summaries = summaries_by_owner(summary_rows);
        let mut viewer_reactions = viewer_reactions_by_owner(viewer_rows);
        let mut attachments = self.attachments_by_post(attachment_rows);

        Ok(rows
            .into_iter()
            .map(|row| {
                let id = row.id;
                PostResponse::assemble(
                    row,
                    attachments.remove(&id).unwrap_or_default(),
                    summaries.remove(&id).unwrap_or_default(),
                    viewer_reactions.remove(&id),
                )
            })
            .collect())
    }

    fn attachments_by_post(
        &self,
        rows: Vec<PostAttachmentRow>,
    ) -> HashMap<Uuid, Vec<FileUploadResponse>> {
        let mut map: HashMap<Uuid, Vec<FileUploadResponse>> = HashMap::new();
        for row in rows {
            let url = self.file_service.public_url(&row.filename);
            map.entry(row.post_id).or_default().push(FileUploadResponse {
                id: row.id,
                filename: row.filename,
                original_filename: row.original_filename,
                mime_type: row.mime_type,
                mime_category: row.mime_category,
                file_size: row.file_size,
                url,
                created_at: row.created_at,
            });
        }
        map
    }
}
