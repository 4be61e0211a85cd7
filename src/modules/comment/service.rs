use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    api::{error, page::Page},
    modules::{
        comment::{
            model::{
                CommentAttachmentResponse, CommentResponse, CommentRow, CommentsQuery,
                CreateCommentFields,
            },
            repository::CommentRepository,
        },
        file_upload::{
            model::UploadPart, repository::FileRepository, schema::FileUploadResponse,
            service::FileUploadService,
        },
        post::repository::PostRepository,
        reaction::{
            model::{ReactionResponse, summaries_by_owner, viewer_reactions_by_owner},
            repository::ReactionRepository,
            schema::OwnerKind,
            service::ReactionService,
        },
        user::{model::UserInfo, repository::UserRepository},
    },
    utils::{order_by_clause, parse_sort},
};

const SORT_WHITELIST: &[(&str, &str)] = &[("created_at", "c.created_at")];
const DEFAULT_ORDER: &str = "c.created_at DESC";

#[derive(Clone)]
pub struct CommentService<C, R, F, P, U>
where
    C: CommentRepository + Send + Sync,
    R: ReactionRepository + Send + Sync,
    F: FileRepository + Send + Sync,
    P: PostRepository + Send + Sync,
    U: UserRepository + Send + Sync,
{
    comment_repo: Arc<C>,
    reaction_repo: Arc<R>,
    reaction_service: ReactionService<R>,
    file_service: FileUploadService<F>,
    post_repo: Arc<P>,
    user_repo: Arc<U>,
}

impl<C, R, F, P, U> CommentService<C, R, F, P, U>
where
    C: CommentRepository + Send + Sync,
    R: ReactionRepository + Send + Sync,
    F: FileRepository + Send + Sync,
    P: PostRepository + Send + Sync,
    U: UserRepository + Send + Sync,
{
    pub fn with_dependencies(
        comment_repo: Arc<C>,
        reaction_repo: Arc<R>,
        reaction_service: ReactionService<R>,
        file_service: FileUploadService<F>,
        post_repo: Arc<P>,
        user_repo: Arc<U>,
    ) -> Self {
        CommentService {
            comment_repo,
            reaction_repo,
            reaction_service,
            file_service,
            post_repo,
            user_repo,
        }
    }

    pub async fn get_comments(
        &self,
        query: &CommentsQuery,
        viewer_id: Uuid,
    ) -> Result<Page<CommentResponse>, error::SystemError> {
        let orders = parse_sort(query.sort.as_deref().unwrap_or_default());
        let order_by = order_by_clause(&orders, SORT_WHITELIST, DEFAULT_ORDER);

        let (rows, total) = tokio::try_join!(
            self.comment_repo.list(
                query.post_id.as_ref(),
                query.parent_id.as_ref(),
                &order_by,
                query.size,
                query.offset(),
            ),
            self.comment_repo.count(query.post_id.as_ref(), query.parent_id.as_ref()),
        )?;

        let items = self.enrich(rows, viewer_id).await?;
        Ok(Page::new(items, query.page, query.size, total))
    }

    pub async fn create_comment(
        &self,
        creator_id: Uuid,
        fields: CreateCommentFields,
        attachment: Option<UploadPart>,
    ) -> Result<CommentResponse, error::SystemError> {
        if self.post_repo.find_by_id(&fields.post_id).await?.is_none() {
            return Err(error::SystemError::not_found("Post not found"));
        }

        if let Some(parent_id) = &fields.parent_id {
            let parent = self
                .comment_repo
                .find_by_id(parent_id)
                .await?
                .ok_or_else(|| error::SystemError::not_found("Parent comment not found"))?;
            if parent.post_id != fields.post_id {
                return Err(error::SystemError::bad_request(
                    "Parent comment belongs to a different post",
                ));
            }
        }

        let has_content = fields.content.as_deref().is_some_and(|c| !c.trim().is_empty());
        if !has_content && attachment.is_none() {
            return Err(error::SystemError::bad_request(
                "Comment must have content or an attachment",
            ));
        }

        let uploaded = match attachment {
            Some(part) => Some(self.file_service.upload(part, creator_id).await?),
            None => None,
        };

        let mut tx = self.comment_repo.get_pool().begin().await?;
        let comment = self
            .comment_repo
            .create(
                &fields.post_id,
                &creator_id,
                fields.parent_id.as_ref(),
                fields.content.as_deref(),
                tx.as_mut(),
            )
            .await?;

        let attachment_response = match uploaded {
            Some(file) => {
                let entity =
                    self.comment_repo.add_attachment(&comment.id, &file.id, tx.as_mut()).await?;
                Some(CommentAttachmentResponse { id: entity.id, file, reactions: Vec::new() })
            }
            None => None,
        };
        tx.commit().await?;

        let creator = self
            .user_repo
            .find_by_id(&creator_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        Ok(CommentResponse {
            id: comment.id,
            post_id: comment.post_id,
            parent_id: comment.parent_id,
            creator: UserInfo {
                id: creator.id,
                username: creator.username,
                display_name: creator.display_name,
                avatar_url: creator.avatar_url,
            },
            content: comment.content,
            attachment: attachment_response,
            total_children: 0,
            reactions: Vec::new(),
            has_reacted: false,
            user_reaction_emoji: None,
            user_reaction_id: None,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        })
    }

    pub async fn delete_comment(
        &self,
        comment_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), error::SystemError> {
        let comment = self
            .comment_repo
            .find_by_id(&comment_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Comment not found"))?;

        if comment.creator_id != user_id {
            return Err(error::SystemError::forbidden("You can only delete your own comments"));
        }

        let mut tx = self.comment_repo.get_pool().begin().await?;
        self.comment_repo.delete_tree_reactions(&comment_id, tx.as_mut()).await?;
        self.comment_repo.delete(&comment_id, tx.as_mut()).await?;
        tx.commit().await?;

        Ok(())
    }

    pub async fn react_to_comment(
        &self,
        comment_id: Uuid,
        user_id: Uuid,
        emoji: &str,
    ) -> Result<ReactionResponse, error::SystemError> {
        if self.comment_repo.find_by_id(&comment_id).await?.is_none() {
            return Err(error::SystemError::not_found("Comment not found"));
        }

        self.reaction_service.create_reaction(OwnerKind::Comment, comment_id, user_id, emoji).await
    }

    pub async fn react_to_attachment(
        &self,
        attachment_id: Uuid,
        user_id: Uuid,
        emoji: &str,
    ) -> Result<ReactionResponse, error::SystemError> {
        if self.comment_repo.find_attachment_by_id(&attachment_id).await?.is_none() {
            return Err(error::SystemError::not_found("Comment attachment not found"));
        }

        self.reaction_service
            .create_reaction(OwnerKind::CommentAttachment, attachment_id, user_id, emoji)
            .await
    }

    /// Per-page enrichment: child counts, reaction summaries, the
    /// viewer's reactions and attachment summaries one level down.
    async fn enrich(
        &self,
        rows: Vec<CommentRow>,
        viewer_id: Uuid,
    ) -> Result<Vec<CommentResponse>, error::SystemError> {
        let comment_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let (child_rows, summary_rows, viewer_rows, attachment_rows) = tokio::try_join!(
            self.comment_repo.child_counts(&comment_ids),
            self.reaction_repo.summaries_for_owners(OwnerKind::Comment, &comment_ids),
            self.reaction_repo.viewer_reactions_for_owners(
                OwnerKind::Comment,
                &comment_ids,
                &viewer_id
            ),
            self.comment_repo.attachments_for_comments(&comment_ids),
        )?;

        let attachment_ids: Vec<Uuid> = attachment_rows.iter().map(|r| r.attachment_id).collect();
        let attachment_summary_rows = self
            .reaction_repo
            .summaries_for_owners(OwnerKind::CommentAttachment, &attachment_ids)
            .await?;

        let child_counts: HashMap<Uuid, i64> =
            child_rows.into_iter().map(|r| (r.parent_id, r.count)).collect();
        let mut summaries = summaries_by_owner(summary_rows);
        let mut viewer_reactions = viewer_reactions_by_owner(viewer_rows);
        let mut attachment_summaries = summaries_by_owner(attachment_summary_rows);

        let mut attachments: HashMap<Uuid, CommentAttachmentResponse> = HashMap::new();
        for row in attachment_rows {
            let url = self.file_service.public_url(&row.filename);
            attachments.insert(
                row.comment_id,
                CommentAttachmentResponse {
                    id: row.attachment_id,
                    file: FileUploadResponse {
                        id: row.file_id,
                        filename: row.filename,
                        original_filename: row.original_filename,
                        mime_type: row.mime_type,
                        mime_category: row.mime_category,
                        file_size: row.file_size,
                        url,
                        created_at: row.created_at,
                    },
                    reactions: attachment_summaries.remove(&row.attachment_id).unwrap_or_default(),
                },
            );
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let id = row.id;
                CommentResponse::assemble(
                    row,
                    attachments.remove(&id),
                    child_counts.get(&id).copied().unwrap_or(0),
                    summaries.remove(&id).unwrap_or_default(),
                    viewer_reactions.remove(&id),
                )
            })
            .collect())
    }
}
