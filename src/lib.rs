pub mod non_api_structs;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Header carrying the caller's user id, filled in by the authentication layer in front of the server.
pub const CALLER_HEADER: &str = "x-user-id";

#[derive(Eq, PartialEq, Ord, PartialOrd, Hash, Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}
impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}
impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl FromStr for UserId {
    type Err = uuid::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

#[derive(Eq, PartialEq, Ord, PartialOrd, Hash, Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FriendRequestId(pub Uuid);

impl FriendRequestId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}
impl Default for FriendRequestId {
    fn default() -> Self {
        Self::new()
    }
}
impl fmt::Display for FriendRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl FromStr for FriendRequestId {
    type Err = uuid::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Public profile of a user. The friends list stays server side, see [`non_api_structs::UserData`].
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    pub profile_pic: String,
    pub native_language: String,
    pub learning_language: String,
    pub bio: String,
    pub location: String,
    pub is_onboarded: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Eq, PartialEq, Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    pub id: FriendRequestId,
    pub sender: UserId,
    pub recipient: UserId,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FriendRequest {
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
    /// The other side of the request as seen from `user`, if `user` is part of it.
    pub fn counterpart(&self, user: &UserId) -> Option<UserId> {
        if &self.sender == user {
            Some(self.recipient)
        } else if &self.recipient == user {
            Some(self.sender)
        } else {
            None
        }
    }
}

/// A friend request with both parties' profiles filled in.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestView {
    pub id: FriendRequestId,
    pub sender: User,
    pub recipient: User,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `GET /users/friend-requests`.
#[derive(Clone, Debug, Serialize, Deserialize, Default, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequests {
    /// Pending requests addressed to the caller.
    pub incoming_reqs: Vec<FriendRequestView>,
    /// Requests the caller sent that have since been accepted.
    pub accepted_reqs: Vec<FriendRequestView>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Signup {
    pub full_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, Eq, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Onboarding {
    pub full_name: String,
    pub bio: String,
    pub native_language: String,
    pub learning_language: String,
    pub location: String,
    pub profile_pic: Option<String>,
}

impl Onboarding {
    /// Names of the required fields left blank, in wire spelling.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("fullName", &self.full_name),
            ("bio", &self.bio),
            ("nativeLanguage", &self.native_language),
            ("learningLanguage", &self.learning_language),
            ("location", &self.location),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, Eq, PartialEq)]
pub struct ErrorBody {
    pub message: String,
}
