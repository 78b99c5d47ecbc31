use reqwest::{RequestBuilder, Response, StatusCode};
use tandem_common::{ErrorBody, CALLER_HEADER, UserId};
use thiserror::Error;

/// A non-2xx answer from the server.
#[derive(Debug, Error)]
#[error("{status}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

/// Status of a failed call, if the server answered at all.
pub fn status_of(err: &anyhow::Error) -> Option<StatusCode> {
    err.downcast_ref::<ApiError>().map(|err| err.status)
}

fn as_caller(request: RequestBuilder, caller: &UserId) -> RequestBuilder {
    request.header(CALLER_HEADER, caller.to_string())
}

async fn check(response: Response) -> anyhow::Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.message,
        Err(_) => status.canonical_reason().unwrap_or("request failed").to_string(),
    };
    Err(ApiError { status, message }.into())
}

pub mod client {
    use anyhow::Result;
    use reqwest::Client;
    use tandem_common::{FriendRequest, FriendRequestId, FriendRequestView, FriendRequests, Onboarding, Signup, User, UserId};

    use crate::{as_caller, check};

    pub async fn signup(client: &Client, server: &str, full_name: &str) -> Result<User> {
        Ok(check(client.post(format!("{server}/auth/signup"))
            .json(&Signup { full_name: full_name.to_string() })
            .send()
            .await?)
            .await?
            .json::<_>()
            .await?)
    }
    pub async fn me(client: &Client, server: &str, caller: &UserId) -> Result<User> {
        Ok(check(as_caller(client.get(format!("{server}/auth/me")), caller)
            .send()
            .await?)
            .await?
            .json::<_>()
            .await?)
    }
    pub async fn onboard(client: &Client, server: &str, caller: &UserId, onboarding: &Onboarding) -> Result<User> {
        Ok(check(as_caller(client.post(format!("{server}/auth/onboarding")), caller)
            .json(onboarding)
            .send()
            .await?)
            .await?
            .json::<_>()
            .await?)
    }
    pub async fn get_recommended_users(client: &Client, server: &str, caller: &UserId) -> Result<Vec<User>> {
        Ok(check(as_caller(client.get(format!("{server}/users")), caller)
            .send()
            .await?)
            .await?
            .json::<_>()
            .await?)
    }
    pub async fn get_friends(client: &Client, server: &str, caller: &UserId) -> Result<Vec<User>> {
        Ok(check(as_caller(client.get(format!("{server}/users/friends")), caller)
            .send()
            .await?)
            .await?
            .json::<_>()
            .await?)
    }
    pub async fn send_friend_request(client: &Client, server: &str, caller: &UserId, recipient: &UserId) -> Result<FriendRequest> {
        Ok(check(as_caller(client.post(format!("{server}/users/friend-request/{recipient}")), caller)
            .send()
            .await?)
            .await?
            .json::<_>()
            .await?)
    }
    pub async fn accept_friend_request(client: &Client, server: &str, caller: &UserId, request: &FriendRequestId) -> Result<FriendRequest> {
        Ok(check(as_caller(client.put(format!("{server}/users/friend-request/{request}/accept")), caller)
            .send()
            .await?)
            .await?
            .json::<_>()
            .await?)
    }
    pub async fn decline_friend_request(client: &Client, server: &str, caller: &UserId, request: &FriendRequestId) -> Result<()> {
        check(as_caller(client.put(format!("{server}/users/friend-request/{request}/decline")), caller)
            .send()
            .await?)
            .await?;
        Ok(())
    }
    pub async fn cancel_friend_request(client: &Client, server: &str, caller: &UserId, request: &FriendRequestId) -> Result<()> {
        check(as_caller(client.delete(format!("{server}/users/friend-request/{request}/cancel")), caller)
            .send()
            .await?)
            .await?;
        Ok(())
    }
    /// Pending requests for the caller plus the caller's requests that were accepted.
    pub async fn get_friend_requests(client: &Client, server: &str, caller: &UserId) -> Result<FriendRequests> {
        Ok(check(as_caller(client.get(format!("{server}/users/friend-requests")), caller)
            .send()
            .await?)
            .await?
            .json::<_>()
            .await?)
    }
    pub async fn get_outgoing_friend_requests(client: &Client, server: &str, caller: &UserId) -> Result<Vec<FriendRequestView>> {
        Ok(check(as_caller(client.get(format!("{server}/users/outgoing-friend-requests")), caller)
            .send()
            .await?)
            .await?
            .json::<_>()
            .await?)
    }
}
