//! `sled` backed storage for users and friend requests.
//!
//! Two trees, both keyed by the hyphenated id string and holding JSON documents:
//!
//! - `users`: [`UserData`], the public profile plus the friends list and the
//!   ids of every request the user sent or received
//! - `friend_requests`: [`FriendRequest`] records that are pending or accepted
//!
//! Declined and cancelled requests are removed from both trees. Anything that
//! touches more than one record goes through [`Store::transaction`], so a
//! request and the user records that reference it always change together.
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::transaction::{
    abort, ConflictableTransactionResult, TransactionError, TransactionalTree,
};
use sled::{Db, Transactional, Tree};
use tandem_common::non_api_structs::UserData;
use tandem_common::{FriendRequest, FriendRequestId, UserId};

use crate::error::StoreError;

pub type Result<T> = std::result::Result<T, StoreError>;
pub(crate) type TxResult<T> = ConflictableTransactionResult<T, StoreError>;

#[derive(Clone)]
pub struct Store {
    db: Db,
    pub(crate) users: Tree,
    pub(crate) requests: Tree,
}

impl Store {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_db(sled::open(path)?)
    }

    /// In-memory store, removed when the last handle is dropped.
    pub fn temporary() -> Result<Self> {
        Self::with_db(sled::Config::new().temporary(true).open()?)
    }

    fn with_db(db: Db) -> Result<Self> {
        Ok(Self {
            users: db.open_tree("users")?,
            requests: db.open_tree("friend_requests")?,
            db,
        })
    }

    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }

    pub fn user(&self, id: &UserId) -> Result<UserData> {
        get(&self.users, &id.to_string())?.ok_or(StoreError::UserNotFound(*id))
    }

    pub fn request(&self, id: &FriendRequestId) -> Result<FriendRequest> {
        get(&self.requests, &id.to_string())?.ok_or(StoreError::RequestNotFound(*id))
    }

    /// Runs `func` as one transaction over both trees. `func` may be retried on conflict.
    pub(crate) fn transaction<T>(&self, func: impl Fn(&Tx<'_>) -> TxResult<T>) -> Result<T> {
        (&self.users, &self.requests)
            .transaction(|(users, requests)| func(&Tx { users, requests }))
            .map_err(|err| match err {
                TransactionError::Abort(err) => err,
                TransactionError::Storage(err) => StoreError::Storage(err),
            })
    }
}

/// Typed view of the trees inside a transaction.
pub(crate) struct Tx<'a> {
    users: &'a TransactionalTree,
    requests: &'a TransactionalTree,
}

impl Tx<'_> {
    pub fn user(&self, id: &UserId) -> TxResult<UserData> {
        match tx_get(self.users, &id.to_string())? {
            Some(user) => Ok(user),
            None => abort(StoreError::UserNotFound(*id)),
        }
    }
    pub fn put_user(&self, user: &UserData) -> TxResult<()> {
        tx_put(self.users, &user.id().to_string(), user)
    }
    pub fn request(&self, id: &FriendRequestId) -> TxResult<Option<FriendRequest>> {
        tx_get(self.requests, &id.to_string())
    }
    pub fn put_request(&self, request: &FriendRequest) -> TxResult<()> {
        tx_put(self.requests, &request.id.to_string(), request)
    }
    pub fn remove_request(&self, id: &FriendRequestId) -> TxResult<()> {
        self.requests.remove(id.to_string().as_str())?;
        Ok(())
    }
}

pub(crate) fn get<T: DeserializeOwned>(tree: &Tree, key: &str) -> Result<Option<T>> {
    Ok(tree
        .get(key)?
        .map(|bytes| serde_json::from_slice(&bytes))
        .transpose()?)
}

pub(crate) fn put<T: Serialize>(tree: &Tree, key: &str, value: &T) -> Result<()> {
    tree.insert(key, serde_json::to_vec(value)?)?;
    Ok(())
}

fn tx_get<T: DeserializeOwned>(tree: &TransactionalTree, key: &str) -> TxResult<Option<T>> {
    match tree.get(key)? {
        Some(bytes) => match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(Some(value)),
            Err(err) => abort(StoreError::from(err)),
        },
        None => Ok(None),
    }
}

fn tx_put<T: Serialize>(tree: &TransactionalTree, key: &str, value: &T) -> TxResult<()> {
    let bytes = match serde_json::to_vec(value) {
        Ok(bytes) => bytes,
        Err(err) => return abort(StoreError::from(err)),
    };
    tree.insert(key, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_records_are_not_found() {
        let store = Store::temporary().unwrap();
        let user = UserId::new();
        let request = FriendRequestId::new();
        assert!(matches!(store.user(&user), Err(StoreError::UserNotFound(id)) if id == user));
        assert!(matches!(store.request(&request), Err(StoreError::RequestNotFound(id)) if id == request));
    }

    #[test]
    fn aborted_transaction_leaves_no_writes() {
        let store = Store::temporary().unwrap();
        let user = store.create_user("Ana").unwrap();
        let result: Result<()> = store.transaction(|tx| {
            let mut data = tx.user(&user.id)?;
            data.profile.bio = String::from("changed");
            tx.put_user(&data)?;
            abort(StoreError::Conflict("rolled back"))
        });
        assert!(matches!(result, Err(StoreError::Conflict("rolled back"))));
        assert_eq!(store.user(&user.id).unwrap().profile.bio, "");
    }

    #[test]
    fn records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db");
        let id = {
            let store = Store::open(&path).unwrap();
            let user = store.create_user("Ana").unwrap();
            store.flush().unwrap();
            user.id
        };
        let store = Store::open(&path).unwrap();
        assert_eq!(store.user(&id).unwrap().profile.full_name, "Ana");
    }
}
