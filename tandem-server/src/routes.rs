use axum::routing::{delete, get, post, put};
use axum::Router;

pub fn router() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/auth/signup", post(account::signup))
        .route("/auth/me", get(account::me))
        .route("/auth/onboarding", post(account::onboarding))
        .route("/users", get(friends::recommended_users))
        .route("/users/friends", get(friends::my_friends))
        .route("/users/friend-request/:id", post(friends::send_friend_request))
        .route("/users/friend-request/:id/accept", put(friends::accept_friend_request))
        .route("/users/friend-request/:id/decline", put(friends::decline_friend_request))
        .route("/users/friend-request/:id/cancel", delete(friends::cancel_friend_request))
        .route("/users/friend-requests", get(friends::friend_requests))
        .route("/users/outgoing-friend-requests", get(friends::outgoing_friend_requests))
}

async fn root() -> &'static str {
    "ok"
}

mod account {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::{Extension, Json};
    use tandem_common::{Onboarding, Signup, User};

    use crate::auth::Caller;
    use crate::error::Result;
    use crate::store::Store;

    pub async fn signup(Extension(store): Extension<Store>, Json(payload): Json<Signup>) -> Result<impl IntoResponse> {
        let user = store.create_user(&payload.full_name)?;
        Ok((StatusCode::CREATED, Json(user)))
    }

    pub async fn me(Extension(store): Extension<Store>, Caller(caller): Caller) -> Result<Json<User>> {
        Ok(Json(store.user(&caller)?.profile))
    }

    pub async fn onboarding(Extension(store): Extension<Store>, Caller(caller): Caller, Json(payload): Json<Onboarding>) -> Result<Json<User>> {
        Ok(Json(store.onboard(&caller, &payload)?))
    }
}

mod friends {
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::{Extension, Json};
    use tandem_common::{FriendRequestId, FriendRequestView, FriendRequests, User, UserId};

    use crate::auth::Caller;
    use crate::error::Result;
    use crate::store::Store;

    pub async fn recommended_users(Extension(store): Extension<Store>, Caller(caller): Caller) -> Result<Json<Vec<User>>> {
        Ok(Json(store.recommend(&caller)?))
    }

    pub async fn my_friends(Extension(store): Extension<Store>, Caller(caller): Caller) -> Result<Json<Vec<User>>> {
        Ok(Json(store.list_friends(&caller)?))
    }

    pub async fn send_friend_request(Extension(store): Extension<Store>, Caller(caller): Caller, Path(recipient): Path<UserId>) -> Result<impl IntoResponse> {
        let request = store.create_request(&caller, &recipient)?;
        Ok((StatusCode::CREATED, Json(request)))
    }

    pub async fn accept_friend_request(Extension(store): Extension<Store>, Caller(caller): Caller, Path(request): Path<FriendRequestId>) -> Result<impl IntoResponse> {
        Ok(Json(store.accept_request(&request, &caller)?))
    }

    pub async fn decline_friend_request(Extension(store): Extension<Store>, Caller(caller): Caller, Path(request): Path<FriendRequestId>) -> Result<impl IntoResponse> {
        store.decline_request(&request, &caller)?;
        Ok(StatusCode::NO_CONTENT)
    }

    pub async fn cancel_friend_request(Extension(store): Extension<Store>, Caller(caller): Caller, Path(request): Path<FriendRequestId>) -> Result<impl IntoResponse> {
        store.cancel_request(&request, &caller)?;
        Ok(StatusCode::NO_CONTENT)
    }

    pub async fn friend_requests(Extension(store): Extension<Store>, Caller(caller): Caller) -> Result<Json<FriendRequests>> {
        Ok(Json(FriendRequests {
            incoming_reqs: store.list_incoming(&caller)?,
            accepted_reqs: store.list_accepted_sent(&caller)?,
        }))
    }

    pub async fn outgoing_friend_requests(Extension(store): Extension<Store>, Caller(caller): Caller) -> Result<Json<Vec<FriendRequestView>>> {
        Ok(Json(store.list_outgoing(&caller)?))
    }
}
