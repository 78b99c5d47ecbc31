use std::collections::HashSet;

use chrono::Utc;
use tandem_common::non_api_structs::UserData;
use tandem_common::{FriendRequest, Onboarding, User, UserId};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::store::{self, Result, Store};

const AVATAR_COUNT: u128 = 100;

/// A stock avatar picked from the id, so a user has a picture before onboarding.
fn default_avatar(id: &UserId) -> String {
    let index = id.0.as_u128() % AVATAR_COUNT + 1;
    format!("https://avatar.iran.liara.run/public/{index}.png")
}

impl Store {
    pub fn create_user(&self, full_name: &str) -> Result<User> {
        let full_name = full_name.trim();
        if full_name.is_empty() {
            return Err(StoreError::Invalid(String::from("fullName is required")));
        }
        let id = UserId::new();
        let profile = User {
            id,
            full_name: full_name.to_string(),
            profile_pic: default_avatar(&id),
            native_language: String::new(),
            learning_language: String::new(),
            bio: String::new(),
            location: String::new(),
            is_onboarded: false,
            created_at: Utc::now(),
        };
        store::put(&self.users, &id.to_string(), &UserData::new(profile.clone()))?;
        info!(user = %id, "created user");
        Ok(profile)
    }

    /// Fills in the profile and marks the user as onboarded.
    pub fn onboard(&self, id: &UserId, onboarding: &Onboarding) -> Result<User> {
        let missing = onboarding.missing_fields();
        if !missing.is_empty() {
            return Err(StoreError::Invalid(format!(
                "All fields are required, missing: {}",
                missing.join(", ")
            )));
        }
        let profile = self.transaction(|tx| {
            let mut user = tx.user(id)?;
            let profile = &mut user.profile;
            profile.full_name = onboarding.full_name.trim().to_string();
            profile.bio = onboarding.bio.trim().to_string();
            profile.native_language = onboarding.native_language.trim().to_lowercase();
            profile.learning_language = onboarding.learning_language.trim().to_lowercase();
            profile.location = onboarding.location.trim().to_string();
            if let Some(pic) = onboarding.profile_pic.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
                profile.profile_pic = pic.to_string();
            }
            profile.is_onboarded = true;
            tx.put_user(&user)?;
            Ok(user.profile)
        })?;
        info!(user = %id, "onboarded user");
        Ok(profile)
    }

    pub fn list_friends(&self, id: &UserId) -> Result<Vec<User>> {
        let user = self.user(id)?;
        debug!(user = %id, friends = user.friends.len(), "listing friends");
        user.friends
            .iter()
            .map(|friend| self.user(friend).map(|data| data.profile))
            .collect()
    }

    /// Onboarded users `id` could send a request to: not `id`, not a friend,
    /// and no pending request in either direction.
    pub fn recommend(&self, id: &UserId) -> Result<Vec<User>> {
        let me = self.user(id)?;
        let mut excluded: HashSet<UserId> = me.friends.iter().copied().collect();
        excluded.insert(*id);
        for request in me.friend_requests() {
            let Some(request) = store::get::<FriendRequest>(&self.requests, &request.to_string())? else {
                continue;
            };
            if request.is_pending() {
                excluded.extend(request.counterpart(id));
            }
        }

        let mut recommended = Vec::new();
        for value in self.users.iter().values() {
            let user: UserData = serde_json::from_slice(&value?)?;
            if user.profile.is_onboarded && !excluded.contains(&user.id()) {
                recommended.push(user.profile);
            }
        }
        debug!(user = %id, count = recommended.len(), "recommended users");
        Ok(recommended)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn onboarded(store: &Store, name: &str) -> User {
        let user = store.create_user(name).unwrap();
        store
            .onboard(
                &user.id,
                &Onboarding {
                    full_name: name.to_string(),
                    bio: format!("Hi, I'm {name}"),
                    native_language: String::from("Spanish"),
                    learning_language: String::from("English"),
                    location: String::from("Lima"),
                    profile_pic: None,
                },
            )
            .unwrap()
    }

    fn ids(users: &[User]) -> Vec<UserId> {
        users.iter().map(|u| u.id).collect()
    }

    fn id_set(users: &[User]) -> HashSet<UserId> {
        users.iter().map(|u| u.id).collect()
    }

    #[test]
    fn new_users_start_without_profile() {
        let store = Store::temporary().unwrap();
        let user = store.create_user("  Ana  ").unwrap();
        assert_eq!(user.full_name, "Ana");
        assert!(!user.is_onboarded);
        assert!(user.profile_pic.starts_with("https://"));
        assert_eq!(store.user(&user.id).unwrap().profile, user);
    }

    #[test]
    fn blank_name_is_rejected() {
        let store = Store::temporary().unwrap();
        assert!(matches!(store.create_user("   "), Err(StoreError::Invalid(_))));
    }

    #[test]
    fn onboarding_fills_profile() {
        let store = Store::temporary().unwrap();
        let ana = onboarded(&store, "Ana");
        assert!(ana.is_onboarded);
        assert_eq!(ana.native_language, "spanish");
        assert_eq!(ana.learning_language, "english");
        assert_eq!(store.user(&ana.id).unwrap().profile, ana);
    }

    #[test]
    fn onboarding_requires_every_field() {
        let store = Store::temporary().unwrap();
        let ana = store.create_user("Ana").unwrap();
        let err = store
            .onboard(&ana.id, &Onboarding { full_name: String::from("Ana"), ..Default::default() })
            .unwrap_err();
        match err {
            StoreError::Invalid(message) => assert!(message.contains("nativeLanguage")),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!store.user(&ana.id).unwrap().profile.is_onboarded);
    }

    #[test]
    fn onboarding_unknown_user_fails() {
        let store = Store::temporary().unwrap();
        let ghost = UserId::new();
        let onboarding = Onboarding {
            full_name: String::from("Ghost"),
            bio: String::from("boo"),
            native_language: String::from("french"),
            learning_language: String::from("german"),
            location: String::from("Paris"),
            profile_pic: Some(String::from("https://example.com/ghost.png")),
        };
        assert!(matches!(store.onboard(&ghost, &onboarding), Err(StoreError::UserNotFound(_))));
    }

    #[test]
    fn recommend_skips_self_and_users_not_onboarded() {
        let store = Store::temporary().unwrap();
        let ana = onboarded(&store, "Ana");
        let ben = onboarded(&store, "Ben");
        let _lurker = store.create_user("Lurker").unwrap();
        assert_eq!(ids(&store.recommend(&ana.id).unwrap()), vec![ben.id]);
    }

    #[test]
    fn recommend_skips_friends_and_pending_both_ways() {
        let store = Store::temporary().unwrap();
        let ana = onboarded(&store, "Ana");
        let ben = onboarded(&store, "Ben");
        let cid = onboarded(&store, "Cid");
        let dee = onboarded(&store, "Dee");
        let eve = onboarded(&store, "Eve");

        let to_ben = store.create_request(&ana.id, &ben.id).unwrap();
        store.accept_request(&to_ben.id, &ben.id).unwrap();
        store.create_request(&ana.id, &cid.id).unwrap();
        store.create_request(&dee.id, &ana.id).unwrap();

        assert_eq!(ids(&store.recommend(&ana.id).unwrap()), vec![eve.id]);
        let for_eve = id_set(&store.recommend(&eve.id).unwrap());
        assert_eq!(for_eve, HashSet::from([ana.id, ben.id, cid.id, dee.id]));
    }

    #[test]
    fn friends_list_follows_acceptance_order() {
        let store = Store::temporary().unwrap();
        let ana = onboarded(&store, "Ana");
        let ben = onboarded(&store, "Ben");
        let cid = onboarded(&store, "Cid");
        let from_cid = store.create_request(&cid.id, &ana.id).unwrap();
        let to_ben = store.create_request(&ana.id, &ben.id).unwrap();
        store.accept_request(&to_ben.id, &ben.id).unwrap();
        store.accept_request(&from_cid.id, &ana.id).unwrap();
        assert_eq!(ids(&store.list_friends(&ana.id).unwrap()), vec![ben.id, cid.id]);
        assert_eq!(ids(&store.list_friends(&cid.id).unwrap()), vec![ana.id]);
    }
}
