//! End-to-end tests over the in-memory wiring: session resolution →
//! directory lookup → rule engine → executors → notifier, the same control
//! flow the HTTP layer drives.

use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};

use atrium_auth::{
    AccessDenied, Actor, Identity, PasswordChange, PasswordHasher, PermissionThresholds,
    ServiceError, SessionCodec,
};
use atrium_core::{EmailAddress, PostId, RoleId, UserId};
use atrium_directory::{
    AccountService, CreateUser, DirectoryStore, DirectoryUser, NewUser, Role, RoleStore,
    UserAdminService,
};
use atrium_forum::{Comment, ContentStore, ForumService, NewPostInput};
use atrium_realtime::{ClientToken, RealtimeNotifier, channel_for_post, event};

use crate::memory::{MemoryCatalogStore, MemoryContentStore, MemoryDirectoryStore, MemoryRoleStore};

/// Plaintext stand-in; the real Argon2 provider is exercised in
/// `password::tests`.
struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, plaintext: &str) -> anyhow::Result<String> {
        Ok(format!("plain:{plaintext}"))
    }

    fn verify(&self, plaintext: &str, digest: &str) -> bool {
        digest == format!("plain:{plaintext}")
    }
}

/// Records publishes instead of delivering them.
#[derive(Default)]
struct RecordingNotifier {
    published: Mutex<Vec<(String, String, serde_json::Value)>>,
}

impl RecordingNotifier {
    fn published(&self) -> Vec<(String, String, serde_json::Value)> {
        self.published.lock().unwrap().clone()
    }
}

impl RealtimeNotifier for RecordingNotifier {
    fn publish(&self, channel: &str, event: &str, payload: serde_json::Value) {
        self.published
            .lock()
            .unwrap()
            .push((channel.to_string(), event.to_string(), payload));
    }

    fn issue_token(&self, identity: &Identity) -> anyhow::Result<ClientToken> {
        Ok(ClientToken::new(format!("token-for-{}", identity.email)))
    }
}

struct Fixture {
    sessions: SessionCodec,
    directory: Arc<MemoryDirectoryStore>,
    content: Arc<MemoryContentStore>,
    notifier: Arc<RecordingNotifier>,
    admin: UserAdminService,
    accounts: AccountService,
    forum: ForumService,
    reader_role: RoleId,
    contributor_role: RoleId,
    moderator_role: RoleId,
    administrator_role: RoleId,
}

async fn fixture() -> Fixture {
    let thresholds = PermissionThresholds::default();
    let roles = Arc::new(MemoryRoleStore::new());

    let mut role_ids = Vec::new();
    for (name, level) in [
        ("reader", 10),
        ("contributor", 40),
        ("moderator", 80),
        ("administrator", 100),
    ] {
        let role_id = RoleId::new();
        roles
            .insert_role(Role {
                role_id,
                name: name.to_string(),
                permission_level: level,
            })
            .await
            .unwrap();
        role_ids.push(role_id);
    }

    let directory = Arc::new(MemoryDirectoryStore::new(roles.clone()));
    let catalog = Arc::new(MemoryCatalogStore::new());
    let content = Arc::new(MemoryContentStore::new(
        directory.clone(),
        catalog.clone(),
        roles.clone(),
    ));
    let notifier = Arc::new(RecordingNotifier::default());
    let hasher = Arc::new(PlainHasher);

    Fixture {
        sessions: SessionCodec::new(b"integration-secret", Duration::hours(1)),
        admin: UserAdminService::new(directory.clone(), roles.clone(), hasher.clone(), thresholds),
        accounts: AccountService::new(directory.clone(), hasher.clone()),
        forum: ForumService::new(catalog, content.clone(), notifier.clone(), thresholds),
        directory,
        content,
        notifier,
        reader_role: role_ids[0],
        contributor_role: role_ids[1],
        moderator_role: role_ids[2],
        administrator_role: role_ids[3],
    }
}

async fn seed_user(
    fix: &Fixture,
    email: &str,
    name: &str,
    role_id: RoleId,
    password: &str,
) -> DirectoryUser {
    fix.directory
        .insert_user(NewUser {
            user_id: UserId::new(),
            email: EmailAddress::parse(email).unwrap(),
            display_name: name.to_string(),
            role_id,
            password_hash: PlainHasher.hash(password).unwrap(),
        })
        .await
        .unwrap()
}

fn actor_with_level(level: i32) -> Actor {
    Actor {
        user_id: UserId::new(),
        email: EmailAddress::parse("level@example.com").unwrap(),
        permission_level: level,
        role_id: RoleId::new(),
        active: true,
    }
}

/// The control flow the HTTP layer drives for a comment request.
async fn add_comment_via_session(
    fix: &Fixture,
    token: &str,
    post_id: PostId,
    content: &str,
) -> Result<Comment, ServiceError> {
    let identity = fix
        .sessions
        .resolve(token)
        .ok_or(ServiceError::Unauthenticated)?;
    let user = fix
        .directory
        .find_active_by_email(&identity.email)
        .await?
        .ok_or(ServiceError::Unauthenticated)?;
    fix.forum.add_comment(&user.as_actor(), post_id, content).await
}

async fn seed_post(fix: &Fixture, author: &DirectoryUser) -> PostId {
    let category = fix
        .forum
        .create_category(&author.as_actor(), "General")
        .await
        .unwrap();
    let post = fix
        .forum
        .create_post(
            &author.as_actor(),
            NewPostInput {
                category_id: category.category_id,
                title: "Welcome".to_string(),
                description: "First post".to_string(),
            },
        )
        .await
        .unwrap();
    post.post_id
}

#[tokio::test]
async fn reader_level_actor_cannot_create_post_and_nothing_is_written() {
    let fix = fixture().await;
    let author = seed_user(&fix, "admin@example.com", "Admin", fix.administrator_role, "pw").await;
    let category = fix
        .forum
        .create_category(&author.as_actor(), "General")
        .await
        .unwrap();

    let result = fix
        .forum
        .create_post(
            &actor_with_level(20),
            NewPostInput {
                category_id: category.category_id,
                title: "Nope".to_string(),
                description: "Should not land".to_string(),
            },
        )
        .await;

    assert!(matches!(
        result,
        Err(ServiceError::Forbidden(AccessDenied::InsufficientPermission))
    ));
    assert!(fix.content.list_posts_with_aggregates().await.unwrap().is_empty());
}

#[tokio::test]
async fn superadmin_demotes_moderator_and_next_lookup_reflects_it() {
    let fix = fixture().await;
    let admin = seed_user(&fix, "root@example.com", "Root", fix.administrator_role, "pw").await;
    let target = seed_user(&fix, "mod@example.com", "Mod", fix.moderator_role, "pw").await;

    let updated = fix
        .admin
        .change_role(&admin.as_actor(), &target.email, fix.contributor_role)
        .await
        .unwrap();
    assert_eq!(updated.permission_level, 40);

    let looked_up = fix
        .directory
        .find_any_by_email(&target.email)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(looked_up.permission_level, 40);
    assert_eq!(looked_up.role_id, fix.contributor_role);
}

#[tokio::test]
async fn moderator_cannot_touch_peer_or_superior() {
    let fix = fixture().await;
    let moderator = seed_user(&fix, "mod@example.com", "Mod", fix.moderator_role, "pw").await;
    let peer = seed_user(&fix, "peer@example.com", "Peer", fix.moderator_role, "pw").await;

    let result = fix
        .admin
        .change_role(&moderator.as_actor(), &peer.email, fix.reader_role)
        .await;
    assert!(matches!(
        result,
        Err(ServiceError::Forbidden(AccessDenied::TargetNotBelow))
    ));

    let result = fix.admin.deactivate(&moderator.as_actor(), &peer.email).await;
    assert!(matches!(
        result,
        Err(ServiceError::Forbidden(AccessDenied::TargetNotBelow))
    ));
    assert!(
        fix.directory
            .find_any_by_email(&peer.email)
            .await
            .unwrap()
            .unwrap()
            .is_active()
    );
}

#[tokio::test]
async fn unauthenticated_comment_publishes_nothing() {
    let fix = fixture().await;
    let author = seed_user(&fix, "admin@example.com", "Admin", fix.administrator_role, "pw").await;
    let post_id = seed_post(&fix, &author).await;

    let result = add_comment_via_session(&fix, "not-a-session", post_id, "hello").await;

    assert!(matches!(result, Err(ServiceError::Unauthenticated)));
    assert!(fix.notifier.published().is_empty());
}

#[tokio::test]
async fn session_comment_round_trip_publishes_and_redacts_timestamp() {
    let fix = fixture().await;
    let author = seed_user(&fix, "admin@example.com", "Admin", fix.administrator_role, "pw").await;
    let post_id = seed_post(&fix, &author).await;

    let reader = seed_user(&fix, "reader@example.com", "Reader", fix.reader_role, "pw").await;
    let token = fix.sessions.issue(&reader.email, Utc::now()).unwrap();

    let comment = add_comment_via_session(&fix, &token, post_id, "first!").await.unwrap();

    // Echo carries no timestamp; the stored row does.
    assert!(comment.created_at.is_none());
    let listed = fix
        .forum
        .comments(&reader.as_actor(), post_id)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].comment.created_at.is_some());
    assert_eq!(listed[0].author_name, "Reader");

    let published = fix.notifier.published();
    assert_eq!(published.len(), 1);
    let (channel, name, payload) = &published[0];
    assert_eq!(channel, &channel_for_post(post_id));
    assert_eq!(name, event::COMMENT_CREATED);
    assert_eq!(payload["author"], "reader@example.com");
}

#[tokio::test]
async fn deactivated_session_no_longer_authenticates() {
    let fix = fixture().await;
    let admin = seed_user(&fix, "root@example.com", "Root", fix.administrator_role, "pw").await;
    let author = seed_user(&fix, "author@example.com", "Author", fix.contributor_role, "pw").await;
    let post_id = seed_post(&fix, &admin).await;

    // The token outlives the account's active state.
    let token = fix.sessions.issue(&author.email, Utc::now()).unwrap();
    fix.admin.deactivate(&admin.as_actor(), &author.email).await.unwrap();

    let result = add_comment_via_session(&fix, &token, post_id, "still here?").await;
    assert!(matches!(result, Err(ServiceError::Unauthenticated)));

    // The asymmetry: invisible as an actor, still visible as a target.
    assert!(
        fix.directory
            .find_active_by_email(&author.email)
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        fix.directory
            .find_any_by_email(&author.email)
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn category_round_trip_and_duplicate_conflict() {
    let fix = fixture().await;
    let author = seed_user(&fix, "c@example.com", "C", fix.contributor_role, "pw").await;

    fix.forum
        .create_category(&author.as_actor(), "Announcements")
        .await
        .unwrap();

    let listed = fix.forum.list_categories(&author.as_actor()).await.unwrap();
    let matching: Vec<_> = listed.iter().filter(|c| c.name == "Announcements").collect();
    assert_eq!(matching.len(), 1);

    let dup = fix
        .forum
        .create_category(&author.as_actor(), "Announcements")
        .await;
    assert!(matches!(dup, Err(ServiceError::Conflict(_))));
}

#[tokio::test]
async fn activation_toggles_are_idempotent() {
    let fix = fixture().await;
    let admin = seed_user(&fix, "root@example.com", "Root", fix.administrator_role, "pw").await;
    let target = seed_user(&fix, "r@example.com", "R", fix.reader_role, "pw").await;
    let admin_actor = admin.as_actor();

    fix.admin.deactivate(&admin_actor, &target.email).await.unwrap();
    // Second deactivation of an already-deactivated target: no-op, no error.
    fix.admin.deactivate(&admin_actor, &target.email).await.unwrap();
    assert!(
        !fix.directory
            .find_any_by_email(&target.email)
            .await
            .unwrap()
            .unwrap()
            .is_active()
    );

    fix.admin.activate(&admin_actor, &target.email).await.unwrap();
    fix.admin.activate(&admin_actor, &target.email).await.unwrap();
    assert!(
        fix.directory
            .find_any_by_email(&target.email)
            .await
            .unwrap()
            .unwrap()
            .is_active()
    );

    // An email with no directory row at all also passes (no-op).
    let ghost = EmailAddress::parse("ghost@example.com").unwrap();
    fix.admin.activate(&admin_actor, &ghost).await.unwrap();
    fix.admin.deactivate(&admin_actor, &ghost).await.unwrap();
}

#[tokio::test]
async fn create_user_enforces_strict_role_dominance_and_email_uniqueness() {
    let fix = fixture().await;
    let moderator = seed_user(&fix, "mod@example.com", "Mod", fix.moderator_role, "pw").await;
    let actor = moderator.as_actor();

    // Peer-level creation denies.
    let peer = fix
        .admin
        .create_user(
            &actor,
            CreateUser {
                email: EmailAddress::parse("new-mod@example.com").unwrap(),
                display_name: "New Mod".to_string(),
                role_id: fix.moderator_role,
                password: "pw".to_string(),
            },
        )
        .await;
    assert!(matches!(
        peer,
        Err(ServiceError::Forbidden(AccessDenied::RoleNotBelow))
    ));

    let created = fix
        .admin
        .create_user(
            &actor,
            CreateUser {
                email: EmailAddress::parse("new@example.com").unwrap(),
                display_name: "New".to_string(),
                role_id: fix.contributor_role,
                password: "pw".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(created.permission_level, 40);

    let dup = fix
        .admin
        .create_user(
            &actor,
            CreateUser {
                email: EmailAddress::parse("new@example.com").unwrap(),
                display_name: "Again".to_string(),
                role_id: fix.contributor_role,
                password: "pw".to_string(),
            },
        )
        .await;
    assert!(matches!(dup, Err(ServiceError::Conflict(_))));
}

#[tokio::test]
async fn password_change_end_to_end() {
    let fix = fixture().await;
    let user = seed_user(&fix, "me@example.com", "Me", fix.reader_role, "old-pw").await;
    let actor = user.as_actor();

    // Someone else's account denies regardless of level.
    let admin = seed_user(&fix, "root@example.com", "Root", fix.administrator_role, "pw").await;
    let cross = fix
        .accounts
        .change_password(
            &admin.as_actor(),
            &user.email,
            PasswordChange {
                current: "old-pw",
                new: "new-pw",
                confirm: "new-pw",
            },
        )
        .await;
    assert!(matches!(
        cross,
        Err(ServiceError::Forbidden(AccessDenied::NotSelf))
    ));

    fix.accounts
        .change_password(
            &actor,
            &user.email,
            PasswordChange {
                current: "old-pw",
                new: "new-pw",
                confirm: "new-pw",
            },
        )
        .await
        .unwrap();

    assert!(fix.accounts.authenticate(&user.email, "new-pw").await.is_ok());
    assert!(matches!(
        fix.accounts.authenticate(&user.email, "old-pw").await,
        Err(ServiceError::Unauthenticated)
    ));
}

#[tokio::test]
async fn profile_is_self_only_but_works_at_minimum_level() {
    let fix = fixture().await;
    let reader = seed_user(&fix, "me@example.com", "Me", fix.reader_role, "pw").await;

    let own = fix
        .accounts
        .profile(&reader.as_actor(), &reader.email)
        .await
        .unwrap();
    assert_eq!(own.email, reader.email);

    let admin = seed_user(&fix, "root@example.com", "Root", fix.administrator_role, "pw").await;
    let cross = fix.accounts.profile(&admin.as_actor(), &reader.email).await;
    assert!(matches!(
        cross,
        Err(ServiceError::Forbidden(AccessDenied::NotSelf))
    ));
}

#[tokio::test]
async fn typing_publishes_a_signal_without_persisting_anything() {
    let fix = fixture().await;
    let author = seed_user(&fix, "admin@example.com", "Admin", fix.administrator_role, "pw").await;
    let post_id = seed_post(&fix, &author).await;
    let reader = seed_user(&fix, "reader@example.com", "Reader", fix.reader_role, "pw").await;

    fix.forum.typing(&reader.as_actor(), post_id).await.unwrap();

    let published = fix.notifier.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].1, event::TYPING);
    assert!(
        fix.forum
            .comments(&reader.as_actor(), post_id)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn comments_on_missing_post_are_not_found() {
    let fix = fixture().await;
    let reader = seed_user(&fix, "reader@example.com", "Reader", fix.reader_role, "pw").await;

    let result = fix.forum.comments(&reader.as_actor(), PostId::new()).await;
    assert!(matches!(result, Err(ServiceError::NotFound)));
}
