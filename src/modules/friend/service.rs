use std::sync::Arc;

use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        chat::{repository::ChatRepository, service::ChatService},
        fcm::service::PushNotifier,
        friend::{
            model::{FriendRequestResponse, FriendResponse},
            repository::FriendRepo,
            schema::{FriendEntity, FriendRequestEntity},
        },
        user::repository::UserRepository,
    },
};

#[derive(Clone)]
pub struct FriendService<R, U, C>
where
    R: FriendRepo + Send + Sync,
    U: UserRepository + Send + Sync,
    C: ChatRepository + Send + Sync,
{
    friend_repo: Arc<R>,
    user_repo: Arc<U>,
    chat_service: ChatService<C>,
    notifier: Arc<dyn PushNotifier + Send + Sync>,
}

impl<R, U, C> FriendService<R, U, C>
where
    R: FriendRepo + Send + Sync,
    U: UserRepository + Send + Sync,
    C: ChatRepository + Send + Sync,
{
    pub fn with_dependencies(
        friend_repo: Arc<R>,
        user_repo: Arc<U>,
        chat_service: ChatService<C>,
        notifier: Arc<dyn PushNotifier + Send + Sync>,
    ) -> Self {
        FriendService { friend_repo, user_repo, chat_service, notifier }
    }

    pub async fn get_friends(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<FriendResponse>, error::SystemError> {
        let friends = self.friend_repo.find_friends(&user_id).await?;
        Ok(friends)
    }

    pub async fn remove_friend(
        &self,
        user_id: Uuid,
        friend_id: Uuid,
    ) -> Result<(), error::SystemError> {
        let removed = self.friend_repo.delete_friendship(&user_id, &friend_id).await?;
        if !removed {
            return Err(error::SystemError::not_found("Friendship not found"));
        }
        Ok(())
    }

    pub async fn send_friend_request(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        message: Option<String>,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        if receiver_id == sender_id {
            return Err(error::SystemError::bad_request("Cannot send friend request to yourself"));
        }

        if self.user_repo.find_by_id(&receiver_id).await?.is_none() {
            return Err(error::SystemError::not_found("Receiver user not found"));
        }

        let (friends, requests): (Option<FriendEntity>, Option<FriendRequestEntity>) = tokio::try_join!(
            self.friend_repo.find_friendship(&sender_id, &receiver_id),
            self.friend_repo.find_friend_request(&sender_id, &receiver_id),
        )?;

        if friends.is_some() {
            return Err(error::SystemError::conflict_with("Users are already friends"));
        }

        // One pending request per pair regardless of direction. The
        // unique index backstops this under concurrent sends.
        if requests.is_some() {
            return Err(error::SystemError::conflict_with("Friend request already exists"));
        }

        let friend_request =
            self.friend_repo.create_friend_request(&sender_id, &receiver_id, &message).await?;

        self.notifier.notify(
            receiver_id,
            "New friend request".to_string(),
            "You have received a friend request".to_string(),
        );

        Ok(friend_request)
    }

    /// Only the receiver may accept. Friendship creation and request
    /// removal commit together; the private room and the push happen
    /// after commit and never roll it back.
    pub async fn accept_friend_request(
        &self,
        user_id: Uuid,
        request_id: Uuid,
    ) -> Result<FriendResponse, error::SystemError> {
        let request = self
            .friend_repo
            .find_friend_request_by_id(&request_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Friend request not found"))?;

        if request.to_user_id != user_id {
            return Err(error::SystemError::forbidden(
                "You are not allowed to accept this friend request",
            ));
        }

        let mut tx = self.friend_repo.get_pool().begin().await?;
        self.friend_repo
            .create_friendship(&request.from_user_id, &request.to_user_id, tx.as_mut())
            .await?;
        self.friend_repo.delete_friend_request(&request_id, tx.as_mut()).await?;
        tx.commit().await?;

        if let Err(e) = self
            .chat_service
            .get_or_create_private_room(request.from_user_id, request.to_user_id)
            .await
        {
            log::warn!("Failed to open private room for new friends: {:?}", e);
        }

        self.notifier.notify(
            request.from_user_id,
            "Friend request accepted".to_string(),
            "Your friend request was accepted".to_string(),
        );

        let from_user = self
            .user_repo
            .find_by_id(&request.from_user_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        Ok(FriendResponse::from(from_user))
    }

    pub async fn decline_friend_request(
        &self,
        user_id: Uuid,
        request_id: Uuid,
    ) -> Result<(), error::SystemError> {
        let request = self
            .friend_repo
            .find_friend_request_by_id(&request_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Friend request not found"))?;

        if request.to_user_id != user_id {
            return Err(error::SystemError::forbidden(
                "You are not allowed to decline this friend request",
            ));
        }

        self.friend_repo.delete_friend_request(&request_id, self.friend_repo.get_pool()).await?;

        Ok(())
    }

    pub async fn get_friend_requests(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError> {
        let (requests_to, requests_from) = tokio::try_join!(
            self.friend_repo.find_friend_request_to_user(&user_id),
            self.friend_repo.find_friend_request_from_user(&user_id),
        )?;

        let mut all = Vec::with_capacity(requests_to.len() + requests_from.len());
        all.extend(requests_to);
        all.extend(requests_from);
        Ok(all)
    }
}
