//! Friend request lifecycle.
//!
//! A request is created pending by its sender. The recipient either accepts
//! it, which keeps the record as accepted and makes both users friends, or
//! declines it, which deletes it. The sender may cancel it while it is still
//! pending, which also deletes it. At most one pending or accepted request
//! exists between two users, whichever way round.
use chrono::Utc;
use sled::transaction::abort;
use tandem_common::{
    FriendRequest, FriendRequestId, FriendRequestView, RequestStatus, UserId,
};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::store::{Result, Store, Tx, TxResult};

impl Store {
    pub fn create_request(&self, sender: &UserId, recipient: &UserId) -> Result<FriendRequest> {
        if sender == recipient {
            return Err(StoreError::Conflict("You can't send a friend request to yourself"));
        }
        let id = FriendRequestId::new();
        let now = Utc::now();
        let request = self.transaction(|tx| {
            let mut from = tx.user(sender)?;
            let mut to = tx.user(recipient)?;
            if from.is_friend(recipient) {
                return abort(StoreError::Conflict("You are already friends with this user"));
            }
            for existing in from.friend_requests() {
                let Some(existing) = tx.request(existing)? else { continue };
                if existing.counterpart(sender) == Some(*recipient) {
                    return abort(StoreError::Conflict(
                        "A friend request already exists between you and this user",
                    ));
                }
            }

            let request = FriendRequest {
                id,
                sender: *sender,
                recipient: *recipient,
                status: RequestStatus::Pending,
                created_at: now,
                updated_at: now,
            };
            from.sent_friend_requests.push(id);
            to.rec_friend_requests.push(id);
            tx.put_request(&request)?;
            tx.put_user(&from)?;
            tx.put_user(&to)?;
            Ok(request)
        })?;
        info!(request = %id, %sender, %recipient, "friend request sent");
        Ok(request)
    }

    /// Accepting marks the request accepted and adds each user to the other's
    /// friends list in the same transaction.
    pub fn accept_request(&self, id: &FriendRequestId, acting: &UserId) -> Result<FriendRequest> {
        let now = Utc::now();
        let request = self.transaction(|tx| {
            let mut request = pending(tx, id)?;
            if request.recipient != *acting {
                return abort(StoreError::Forbidden(
                    "You are not authorized to accept this request",
                ));
            }
            request.status = RequestStatus::Accepted;
            request.updated_at = now;

            let mut sender = tx.user(&request.sender)?;
            let mut recipient = tx.user(&request.recipient)?;
            sender.add_friend(recipient.id());
            recipient.add_friend(sender.id());
            tx.put_request(&request)?;
            tx.put_user(&sender)?;
            tx.put_user(&recipient)?;
            Ok(request)
        })?;
        info!(request = %id, sender = %request.sender, recipient = %request.recipient, "friend request accepted");
        Ok(request)
    }

    pub fn decline_request(&self, id: &FriendRequestId, acting: &UserId) -> Result<()> {
        self.transaction(|tx| {
            let request = pending(tx, id)?;
            if request.recipient != *acting {
                return abort(StoreError::Forbidden(
                    "You are not authorized to decline this request",
                ));
            }
            delete(tx, &request)
        })?;
        info!(request = %id, "friend request declined");
        Ok(())
    }

    /// Only pending requests can be cancelled; an accepted one is a conflict.
    pub fn cancel_request(&self, id: &FriendRequestId, acting: &UserId) -> Result<()> {
        self.transaction(|tx| {
            let Some(request) = tx.request(id)? else {
                return abort(StoreError::RequestNotFound(*id));
            };
            if request.sender != *acting {
                return abort(StoreError::Forbidden(
                    "You are not authorized to cancel this request",
                ));
            }
            if !request.is_pending() {
                return abort(StoreError::Conflict(
                    "This friend request has already been accepted",
                ));
            }
            delete(tx, &request)
        })?;
        info!(request = %id, "friend request cancelled");
        Ok(())
    }

    /// Pending requests addressed to `id`.
    pub fn list_incoming(&self, id: &UserId) -> Result<Vec<FriendRequestView>> {
        let user = self.user(id)?;
        self.views(&user.rec_friend_requests, RequestStatus::Pending)
    }

    /// Pending requests sent by `id`.
    pub fn list_outgoing(&self, id: &UserId) -> Result<Vec<FriendRequestView>> {
        let user = self.user(id)?;
        self.views(&user.sent_friend_requests, RequestStatus::Pending)
    }

    /// Requests sent by `id` that the recipient accepted.
    pub fn list_accepted_sent(&self, id: &UserId) -> Result<Vec<FriendRequestView>> {
        let user = self.user(id)?;
        self.views(&user.sent_friend_requests, RequestStatus::Accepted)
    }

    pub fn view(&self, request: FriendRequest) -> Result<FriendRequestView> {
        Ok(FriendRequestView {
            id: request.id,
            sender: self.user(&request.sender)?.profile,
            recipient: self.user(&request.recipient)?.profile,
            status: request.status,
            created_at: request.created_at,
            updated_at: request.updated_at,
        })
    }

    fn views(&self, ids: &[FriendRequestId], status: RequestStatus) -> Result<Vec<FriendRequestView>> {
        let mut views = Vec::new();
        for id in ids {
            let request = match self.request(id) {
                Ok(request) => request,
                // removed between reading the user and the request
                Err(StoreError::RequestNotFound(_)) => continue,
                Err(err) => return Err(err),
            };
            if request.status == status {
                views.push(self.view(request)?);
            }
        }
        debug!(count = views.len(), ?status, "listed friend requests");
        Ok(views)
    }
}

/// Accepted requests are treated as absent: there is nothing left to accept or decline.
fn pending(tx: &Tx<'_>, id: &FriendRequestId) -> TxResult<FriendRequest> {
    match tx.request(id)? {
        Some(request) if request.is_pending() => Ok(request),
        _ => abort(StoreError::RequestNotFound(*id)),
    }
}

fn delete(tx: &Tx<'_>, request: &FriendRequest) -> TxResult<()> {
    let mut sender = tx.user(&request.sender)?;
    let mut recipient = tx.user(&request.recipient)?;
    sender.forget_request(&request.id);
    recipient.forget_request(&request.id);
    tx.remove_request(&request.id)?;
    tx.put_user(&sender)?;
    tx.put_user(&recipient)?;
    Ok(())
}
