use std::collections::HashMap;
use std::sync::Arc;

use actix::Addr;
use uuid::Uuid;

use crate::{
    api::{error, page::Page},
    modules::{
        chat::{repository::ChatRepository, service::ChatService},
        file_upload::{
            model::UploadPart, repository::FileRepository, schema::FileUploadResponse,
            service::FileUploadService,
        },
        message::{
            model::{
                CreateMessageFields, MessageResponse, MessageRow, MessageSearchQuery,
                RepliedMessagePreview, RepliedTarget, reply_partitions,
            },
            repository::MessageRepository,
            schema::ReplyTargetType,
        },
        reaction::{
            model::{ReactionResponse, summaries_by_owner, viewer_reactions_by_owner},
            repository::ReactionRepository,
            schema::OwnerKind,
            service::ReactionService,
        },
        websocket::{
            events::BroadcastToRoom, message::ServerMessage, server::WebSocketServer,
        },
    },
    utils::{order_by_clause, parse_sort},
};

const SORT_WHITELIST: &[(&str, &str)] =
    &[("created_at", "m.created_at"), ("content", "m.content")];
const DEFAULT_ORDER: &str = "m.created_at DESC";

#[derive(Clone)]
pub struct MessageService<M, C, R, F>
where
    M: MessageRepository + Send + Sync,
    C: ChatRepository + Send + Sync,
    R: ReactionRepository + Send + Sync,
    F: FileRepository + Send + Sync,
{
    message_repo: Arc<M>,
    chat_service: ChatService<C>,
    reaction_repo: Arc<R>,
    reaction_service: ReactionService<R>,
    file_service: FileUploadService<F>,
    ws_server: Arc<Addr<WebSocketServer>>,
}

impl<M, C, R, F> MessageService<M, C, R, F>
where
    M: MessageRepository + Send + Sync,
    C: ChatRepository + Send + Sync,
    R: ReactionRepository + Send + Sync,
    F: FileRepository + Send + Sync,
{
    pub fn with_dependencies(
        message_repo: Arc<M>,
        chat_service: ChatService<C>,
        reaction_repo: Arc<R>,
        reaction_service: ReactionService<R>,
        file_service: FileUploadService<F>,
        ws_server: Arc<Addr<WebSocketServer>>,
    ) -> Self {
        MessageService {
            message_repo,
            chat_service,
            reaction_repo,
            reaction_service,
            file_service,
            ws_server,
        }
    }

    /// Validation and uploads run before the insert; the insert and its
    /// attachment rows commit together. The room broadcast happens
    /// after commit and is not awaited for acknowledgement.
    pub async fn create_message(
        &self,
        sender_id: Uuid,
        fields: CreateMessageFields,
        parts: Vec<UploadPart>,
    ) -> Result<MessageResponse, error::SystemError> {
        self.chat_service.require_member(fields.room_id, sender_id).await?;

        match (fields.replied_target_id, fields.replied_target_type) {
            (Some(_), None) | (None, Some(_)) => {
                return Err(error::SystemError::bad_request(
                    "Reply target id and type must be given together",
                ));
            }
            (Some(target_id), Some(target_type)) => {
                self.validate_reply_target(target_id, target_type, fields.room_id).await?;
            }
            (None, None) => {}
        }

        let has_content = fields.content.as_deref().is_some_and(|c| !c.trim().is_empty());
        if !has_content && parts.is_empty() {
            return Err(error::SystemError::bad_request(
                "Message must have content or attachments",
            ));
        }

        let uploaded = self.file_service.upload_many(parts, sender_id).await?;

        let mut tx = self.message_repo.get_pool().begin().await?;
        let message = self.message_repo.create(&fields, &sender_id, tx.as_mut()).await?;
        for file in &uploaded {
            self.message_repo.add_attachment(&message.id, &file.id, tx.as_mut()).await?;
        }
        tx.commit().await?;

        let row = self
            .message_repo
            .find_row_by_id(&message.id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Message not found"))?;
        let room_id = row.room_id;
        let response = self.enrich_one(row, sender_id).await?;

        self.ws_server.do_send(BroadcastToRoom {
            room_id,
            message: ServerMessage::NewMessage {
                room_id,
                message: serde_json::to_value(&response)?,
            },
            skip_user_id: Some(sender_id),
        });

        Ok(response)
    }

    pub async fn search_messages(
        &self,
        query: &MessageSearchQuery,
        viewer_id: Uuid,
    ) -> Result<Page<MessageResponse>, error::SystemError> {
        if let Some(room_id) = query.room_id {
            self.chat_service.require_member(room_id, viewer_id).await?;
        }

        let orders = parse_sort(query.sort.as_deref().unwrap_or_default());
        let order_by = order_by_clause(&orders, SORT_WHITELIST, DEFAULT_ORDER);

        let (rows, total) = tokio::try_join!(
            self.message_repo.search(query, &viewer_id, &order_by, query.size, query.offset()),
            self.message_repo.count(query, &viewer_id),
        )?;

        let items = self.enrich(rows, viewer_id).await?;
        Ok(Page::new(items, query.page, query.size, total))
    }

    pub async fn soft_delete_message(
        &self,
        message_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), error::SystemError> {
        let message = self
            .message_repo
            .find_by_id(&message_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Message not found"))?;

        if message.sender_id != user_id {
            return Err(error::SystemError::forbidden("You can only delete your own messages"));
        }

        self.message_repo.soft_delete(&message_id).await?;
        self.broadcast_deleted(message.room_id, message_id);

        Ok(())
    }

    pub async fn delete_message(
        &self,
        message_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), error::SystemError> {
        let message = self
            .message_repo
            .find_by_id(&message_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Message not found"))?;

        if message.sender_id != user_id {
            return Err(error::SystemError::forbidden("You can only delete your own messages"));
        }

        let mut tx = self.message_repo.get_pool().begin().await?;
        self.reaction_repo.delete_for_owner(OwnerKind::Message, &message_id, tx.as_mut()).await?;
        self.message_repo.delete(&message_id, tx.as_mut()).await?;
        tx.commit().await?;

        self.broadcast_deleted(message.room_id, message_id);

        Ok(())
    }

    pub async fn react_to_message(
        &self,
        message_id: Uuid,
        user_id: Uuid,
        emoji: &str,
    ) -> Result<ReactionResponse, error::SystemError> {
        if self.message_repo.find_by_id(&message_id).await?.is_none() {
            return Err(error::SystemError::not_found("Message not found"));
        }

        self.reaction_service.create_reaction(OwnerKind::Message, message_id, user_id, emoji).await
    }

    async fn validate_reply_target(
        &self,
        target_id: Uuid,
        target_type: ReplyTargetType,
        room_id: Uuid,
    ) -> Result<(), error::SystemError> {
        let target_room = match target_type {
            ReplyTargetType::Message => {
                self.message_repo
                    .find_by_id(&target_id)
                    .await?
                    .ok_or_else(|| error::SystemError::not_found("Reply target not found"))?
                    .room_id
            }
            ReplyTargetType::Attachment => {
                let attachment = self
                    .message_repo
                    .find_attachment_by_id(&target_id)
                    .await?
                    .ok_or_else(|| error::SystemError::not_found("Reply target not found"))?;
                self.message_repo
                    .find_by_id(&attachment.message_id)
                    .await?
                    .ok_or_else(|| error::SystemError::not_found("Reply target not found"))?
                    .room_id
            }
        };

        if target_room != room_id {
            return Err(error::SystemError::bad_request(
                "Reply target belongs to a different room",
            ));
        }

        Ok(())
    }

    fn broadcast_deleted(&self, room_id: Uuid, message_id: Uuid) {
        self.ws_server.do_send(BroadcastToRoom {
            room_id,
            message: ServerMessage::MessageDeleted { room_id, message_id },
            skip_user_id: None,
        });
    }

    async fn enrich_one(
        &self,
        row: MessageRow,
        viewer_id: Uuid,
    ) -> Result<MessageResponse, error::SystemError> {
        let mut items = self.enrich(vec![row], viewer_id).await?;
        items.pop().ok_or_else(|| error::SystemError::not_found("Message not found"))
    }

    /// Page enrichment: attachments, reaction summaries, the viewer's
    /// reactions and reply-target resolution. Each reply partition
    /// resolves with one batched query; a target id that no longer
    /// resolves fails the whole page instead of surfacing a null that
    /// would read as "no reply".
    async fn enrich(
        &self,
        rows: Vec<MessageRow>,
        viewer_id: Uuid,
    ) -> Result<Vec<MessageResponse>, error::SystemError> {
        let message_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let (target_message_ids, target_attachment_ids) = reply_partitions(&rows);

        let (attachment_rows, summary_rows, viewer_rows, target_messages, target_attachments) =
            tokio::try_join!(
                self.message_repo.attachments_for_messages(&message_ids),
                self.reaction_repo.summaries_for_owners(OwnerKind::Message, &message_ids),
                self.reaction_repo.viewer_reactions_for_owners(
                    OwnerKind::Message,
                    &message_ids,
                    &viewer_id
                ),
                self.message_repo.messages_by_ids(&target_message_ids),
                self.message_repo.attachments_by_ids(&target_attachment_ids),
            )?;

        let mut summaries = summaries_by_owner(summary_rows);
        let mut viewer_reactions = viewer_reactions_by_owner(viewer_rows);

        let message_targets: HashMap<Uuid, _> =
            target_messages.into_iter().map(|m| (m.id, m)).collect();
        let attachment_targets: HashMap<Uuid, _> =
            target_attachments.into_iter().map(|a| (a.attachment_id, a)).collect();

        let mut attachments: HashMap<Uuid, Vec<FileUploadResponse>> = HashMap::new();
        for row in attachment_rows {
            let url = self.file_service.public_url(&row.filename);
            attachments.entry(row.message_id).or_default().push(FileUploadResponse {
                id: row.file_id,
                filename: row.filename,
                original_filename: row.original_filename,
                mime_type: row.mime_type,
                mime_category: row.mime_category,
                file_size: row.file_size,
                url,
                created_at: row.created_at,
            });
        }

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let replied_target = match (row.replied_target_id, row.replied_target_type) {
                (Some(target_id), Some(ReplyTargetType::Message)) => {
                    let target = message_targets.get(&target_id).ok_or_else(|| {
                        error::SystemError::not_found("Reply target no longer exists")
                    })?;
                    Some(RepliedTarget::Message {
                        message: RepliedMessagePreview {
                            id: target.id,
                            sender_id: target.sender_id,
                            content: target.content.clone(),
                            is_deleted: target.is_deleted,
                            created_at: target.created_at,
                        },
                    })
                }
                (Some(target_id), Some(ReplyTargetType::Attachment)) => {
                    let target = attachment_targets.get(&target_id).ok_or_else(|| {
                        error::SystemError::not_found("Reply target no longer exists")
                    })?;
                    let url = self.file_service.public_url(&target.filename);
                    let file = FileUploadResponse {
                        id: target.file_id,
                        filename: target.filename.clone(),
                        original_filename: target.original_filename.clone(),
                        mime_type: target.mime_type.clone(),
                        mime_category: target.mime_category,
                        file_size: target.file_size,
                        url,
                        created_at: target.created_at,
                    };
                    Some(RepliedTarget::Attachment { id: target_id, file })
                }
                _ => None,
            };

            let id = row.id;
            items.push(MessageResponse::assemble(
                row,
                replied_target,
                attachments.remove(&id).unwrap_or_default(),
                summaries.remove(&id).unwrap_or_default(),
                viewer_reactions.remove(&id),
            ));
        }

        Ok(items)
    }
}
