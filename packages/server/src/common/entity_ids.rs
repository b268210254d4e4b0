//! Typed ID definitions for all domain entities.

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for Identity entities (login accounts).
pub struct Identity;

/// Marker type for Profile entities (social identities).
pub struct Profile;

/// Marker type for Post entities.
pub struct Post;

/// Marker type for Comment entities.
pub struct Comment;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Typed ID for Identity entities.
pub type IdentityId = Id<Identity>;

/// Typed ID for Profile entities.
pub type ProfileId = Id<Profile>;

/// Typed ID for Post entities.
pub type PostId = Id<Post>;

/// Typed ID for Comment entities.
pub type CommentId = Id<Comment>;
