use serde::{Deserialize, Serialize};
use crate::{FriendRequestId, User, UserId};

/// What the server stores per user.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserData {
    pub profile: User,
    /// Ordered, no duplicates. Mirrored on the other side.
    pub friends: Vec<UserId>,
    pub sent_friend_requests: Vec<FriendRequestId>,
    pub rec_friend_requests: Vec<FriendRequestId>,
}

impl UserData {
    pub fn new(profile: User) -> Self {
        Self {
            profile,
            friends: Vec::new(),
            sent_friend_requests: Vec::new(),
            rec_friend_requests: Vec::new(),
        }
    }
    pub fn id(&self) -> UserId {
        self.profile.id
    }
    pub fn is_friend(&self, other: &UserId) -> bool {
        self.friends.contains(other)
    }
    pub fn add_friend(&mut self, other: UserId) {
        if !self.is_friend(&other) {
            self.friends.push(other);
        }
    }
    /// Every request this user takes part in, sent first.
    pub fn friend_requests(&self) -> impl Iterator<Item = &FriendRequestId> {
        self.sent_friend_requests.iter().chain(self.rec_friend_requests.iter())
    }
    pub fn forget_request(&mut self, request: &FriendRequestId) {
        self.sent_friend_requests.retain(|r| r != request);
        self.rec_friend_requests.retain(|r| r != request);
    }
}
