/// Router Module Index
///
/// One router per resource under `/users`. None of them is authenticated;
/// access to posts is decided by the visibility gate inside the handler.

/// User CRUD plus the health probe.
pub mod users;

/// Follow, unfollow and follower listing.
pub mod followers;

/// Post creation and follower-gated listing.
pub mod posts;
