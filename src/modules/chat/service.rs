use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    api::error,
    modules::chat::{
        model::{CreateRoomModel, RoomMember, RoomResponse},
        repository::ChatRepository,
        schema::{RoomEntity, RoomType},
    },
};

#[derive(Clone)]
pub struct ChatService<C>
where
    C: ChatRepository + Send + Sync,
{
    chat_repo: Arc<C>,
}

impl<C> ChatService<C>
where
    C: ChatRepository + Send + Sync,
{
    pub fn with_dependencies(chat_repo: Arc<C>) -> Self {
        ChatService { chat_repo }
    }

    pub async fn create_room(
        &self,
        creator_id: Uuid,
        model: CreateRoomModel,
    ) -> Result<RoomResponse, error::SystemError> {
        let mut member_ids: Vec<Uuid> =
            model.member_ids.into_iter().filter(|id| *id != creator_id).collect();
        member_ids.sort_unstable();
        member_ids.dedup();

        let room = match model.room_type {
            RoomType::Private => {
                if member_ids.len() != 1 {
                    return Err(error::SystemError::bad_request(
                        "A private room takes exactly one other member",
                    ));
                }
                self.get_or_create_private_room(creator_id, member_ids[0]).await?
            }
            RoomType::Group => {
                let name = model
                    .name
                    .as_deref()
                    .ok_or_else(|| error::SystemError::bad_request("Group rooms need a name"))?;

                let mut tx = self.chat_repo.get_pool().begin().await?;
                let room = self
                    .chat_repo
                    .create_room(Some(name), RoomType::Group, &creator_id, tx.as_mut())
                    .await?;
                self.chat_repo.add_member(&room.id, &creator_id, tx.as_mut()).await?;
                for member_id in &member_ids {
                    self.chat_repo.add_member(&room.id, member_id, tx.as_mut()).await?;
                }
                tx.commit().await?;
                room
            }
        };

        self.room_with_members(room).await
    }

    /// Idempotent: returns the existing private room for the pair when
    /// one is already there.
    pub async fn get_or_create_private_room(
        &self,
        user_a: Uuid,
        user_b: Uuid,
    ) -> Result<RoomEntity, error::SystemError> {
        if let Some(room) = self.chat_repo.find_private_room_between(&user_a, &user_b).await? {
            return Ok(room);
        }

        let mut tx = self.chat_repo.get_pool().begin().await?;
        let room =
            self.chat_repo.create_room(None, RoomType::Private, &user_a, tx.as_mut()).await?;
        self.chat_repo.add_member(&room.id, &user_a, tx.as_mut()).await?;
        self.chat_repo.add_member(&room.id, &user_b, tx.as_mut()).await?;
        tx.commit().await?;

        Ok(room)
    }

    pub async fn my_rooms(&self, user_id: Uuid) -> Result<Vec<RoomResponse>, error::SystemError> {
        let rooms = self.chat_repo.find_rooms_for_user(&user_id).await?;
        let room_ids: Vec<Uuid> = rooms.iter().map(|r| r.id).collect();

        let members = self.chat_repo.members_for_rooms(&room_ids).await?;
        let mut member_map: HashMap<Uuid, Vec<RoomMember>> = HashMap::new();
        for row in members {
            member_map.entry(row.room_id).or_default().push(RoomMember::from(row));
        }

        Ok(rooms
            .into_iter()
            .map(|room| {
                let members = member_map.remove(&room.id).unwrap_or_default();
                RoomResponse::from_entity(room, members)
            })
            .collect())
    }

    pub async fn get_room(
        &self,
        room_id: Uuid,
        user_id: Uuid,
    ) -> Result<RoomResponse, error::SystemError> {
        let room = self
            .chat_repo
            .find_by_id(&room_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Room not found"))?;

        if !self.chat_repo.is_member(&room_id, &user_id).await? {
            return Err(error::SystemError::forbidden("You are not a member of this room"));
        }

        self.room_with_members(room).await
    }

    pub async fn require_member(
        &self,
        room_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), error::SystemError> {
        if self.chat_repo.find_by_id(&room_id).await?.is_none() {
            return Err(error::SystemError::not_found("Room not found"));
        }
        if !self.chat_repo.is_member(&room_id, &user_id).await? {
            return Err(error::SystemError::forbidden("You are not a member of this room"));
        }
        Ok(())
    }

    async fn room_with_members(
        &self,
        room: RoomEntity,
    ) -> Result<RoomResponse, error::SystemError> {
        let members = self.chat_repo.members_for_rooms(&[room.id]).await?;
        Ok(RoomResponse::from_entity(room, members.into_iter().map(RoomMember::from).collect()))
    }
}
