//! Integration tests for account provisioning and its compensation path.

mod common;

use common::{
    CountingCommunities, FailingCommunities, FakeIdentity, Failure, UndeletableUsers,
    UnreadableUsers, setup_db, test_config,
};
use kefu_auth::provisioning::{
    AccountProfile, AdminRegistration, ProvisioningService, StaffRegistration,
};
use kefu_auth::{AuthError, VerificationService};
use kefu_core::error::KefuError;
use kefu_core::identity::RemoteUser;
use kefu_core::models::community::CreateCommunity;
use kefu_core::repository::{CommunityRepository, UserRepository};
use kefu_db::repository::{
    SurrealCommunityRepository, SurrealUserRepository, SurrealVerificationCodeRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

type Service<U> = ProvisioningService<
    U,
    CountingCommunities<SurrealCommunityRepository<Db>>,
    SurrealVerificationCodeRepository<Db>,
    FakeIdentity,
>;

struct Harness<U: UserRepository> {
    service: Service<U>,
    users: SurrealUserRepository<Db>,
    communities: CountingCommunities<SurrealCommunityRepository<Db>>,
    codes: VerificationService<SurrealVerificationCodeRepository<Db>>,
    identity: FakeIdentity,
}

fn build<U: UserRepository>(db: &Surreal<Db>, users: U, identity: FakeIdentity) -> Harness<U> {
    let communities = CountingCommunities::new(SurrealCommunityRepository::new(db.clone()));
    let codes = SurrealVerificationCodeRepository::new(db.clone());
    Harness {
        service: ProvisioningService::new(
            users,
            communities.clone(),
            codes.clone(),
            identity.clone(),
            test_config(),
        ),
        users: SurrealUserRepository::new(db.clone()),
        communities,
        codes: VerificationService::new(codes, &test_config()),
        identity,
    }
}

async fn harness(identity: FakeIdentity) -> Harness<SurrealUserRepository<Db>> {
    let db = setup_db().await;
    let users = SurrealUserRepository::new(db.clone());
    build(&db, users, identity)
}

fn profile(email: &str, nickname: &str, password: &str) -> AccountProfile {
    AccountProfile {
        email: email.into(),
        nickname: nickname.into(),
        avatar: None,
        password: password.into(),
    }
}

fn admin_registration(code: String, email: &str) -> AdminRegistration {
    AdminRegistration {
        code,
        community: CreateCommunity {
            name: "Acme Support".into(),
            email: "support@acme.test".into(),
            avatar: None,
            description: Some("Customer care".into()),
        },
        profile: profile(email, "Ada", "correct-horse-battery"),
    }
}

#[tokio::test]
async fn admin_registration_creates_community_user_and_remote_identity() {
    let h = harness(FakeIdentity::default()).await;
    let code = h.codes.issue_code("ada@acme.test").await.unwrap();

    let account = h
        .service
        .create_admin(admin_registration(code.clone(), "ada@acme.test"))
        .await
        .unwrap();

    let user = h.users.get_by_uuid(account.uuid).await.unwrap();
    assert_eq!(user.row_id, account.row_id);
    assert_eq!(user.email, "ada@acme.test");
    assert!(user.is_admin);
    assert!(user.is_enabled);
    assert!(user.password_hash.starts_with("$argon2id$"));

    let community = h.communities.get_by_id(user.community_id).await.unwrap();
    assert_eq!(community.name, "Acme Support");
    assert_eq!(h.communities.creates(), 1);

    assert_eq!(
        h.identity.registered(),
        vec![RemoteUser {
            user_id: account.uuid.to_string(),
            nickname: "Ada".into(),
            face_url: String::new(),
        }]
    );

    // The code is spent once the administrator exists.
    assert!(!h.codes.check_code("ada@acme.test", &code).await.unwrap());
}

#[tokio::test]
async fn invalid_code_writes_nothing() {
    let h = harness(FakeIdentity::default()).await;
    let code = h.codes.issue_code("ada@acme.test").await.unwrap();
    let wrong = if code == "000000" { "000001" } else { "000000" };

    let err = h
        .service
        .create_admin(admin_registration(wrong.into(), "ada@acme.test"))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::InvalidCode), "got: {err:?}");
    assert_eq!(h.communities.creates(), 0);
    assert!(matches!(
        h.users.get_by_email("ada@acme.test").await.unwrap_err(),
        KefuError::NotFound { .. }
    ));
    assert_eq!(h.identity.register_calls(), 0);
}

#[tokio::test]
async fn code_for_another_email_is_rejected() {
    let h = harness(FakeIdentity::default()).await;
    let code = h.codes.issue_code("someone@acme.test").await.unwrap();

    let err = h
        .service
        .create_admin(admin_registration(code, "ada@acme.test"))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::InvalidCode));
    assert_eq!(h.communities.creates(), 0);
}

#[tokio::test]
async fn community_failure_writes_no_account() {
    let db = setup_db().await;
    let identity = FakeIdentity::default();
    let codes = SurrealVerificationCodeRepository::new(db.clone());
    let code = VerificationService::new(codes.clone(), &test_config())
        .issue_code("ada@acme.test")
        .await
        .unwrap();
    let service = ProvisioningService::new(
        SurrealUserRepository::new(db.clone()),
        FailingCommunities(SurrealCommunityRepository::new(db.clone())),
        codes,
        identity.clone(),
        test_config(),
    );

    let err = service
        .create_admin(admin_registration(code, "ada@acme.test"))
        .await
        .unwrap_err();

    assert!(
        matches!(
            err,
            AuthError::CommunityCreationFailed(KefuError::Database(_))
        ),
        "got: {err:?}"
    );
    assert!(matches!(
        SurrealUserRepository::new(db.clone())
            .get_by_email("ada@acme.test")
            .await
            .unwrap_err(),
        KefuError::NotFound { .. }
    ));
    assert_eq!(identity.register_calls(), 0);
}

#[tokio::test]
async fn read_back_failure_removes_the_row_before_any_remote_call() {
    let db = setup_db().await;
    let h = build(
        &db,
        UnreadableUsers(SurrealUserRepository::new(db.clone())),
        FakeIdentity::default(),
    );

    let err = h
        .service
        .create_staff(StaffRegistration {
            community_id: 4,
            profile: profile("lost@acme.test", "Lost", "pw"),
        })
        .await
        .unwrap_err();

    assert!(
        matches!(err, AuthError::Persistence(KefuError::Database(_))),
        "got: {err:?}"
    );
    assert!(matches!(
        h.users.get_by_email("lost@acme.test").await.unwrap_err(),
        KefuError::NotFound { .. }
    ));
    assert_eq!(h.identity.register_calls(), 0);
}

#[tokio::test]
async fn remote_rejection_compensates_admin_row() {
    let h = harness(FakeIdentity::failing_registration(Failure::Rejected(
        1102,
        "RegisteredAlreadyError",
    )))
    .await;
    let code = h.codes.issue_code("ada@acme.test").await.unwrap();

    let err = h
        .service
        .create_admin(admin_registration(code.clone(), "ada@acme.test"))
        .await
        .unwrap_err();

    let (uuid, row_id, compensated, source) = match err {
        AuthError::RemoteRegistrationFailed {
            uuid,
            row_id,
            compensated,
            source,
        } => (uuid, row_id, compensated, source),
        other => panic!("expected RemoteRegistrationFailed, got: {other:?}"),
    };
    assert!(compensated);
    assert!(row_id > 0);
    assert!(matches!(source, KefuError::RemoteRejected { code: 1102, .. }));

    assert!(matches!(
        h.users.get_by_uuid(uuid).await.unwrap_err(),
        KefuError::NotFound { .. }
    ));
    assert!(matches!(
        h.users.get_by_email("ada@acme.test").await.unwrap_err(),
        KefuError::NotFound { .. }
    ));
    assert_eq!(h.identity.register_calls(), 1);

    // The code survives a failed registration so the caller can retry.
    assert!(h.codes.check_code("ada@acme.test", &code).await.unwrap());
}

#[tokio::test]
async fn remote_outage_compensates_staff_row() {
    let h = harness(FakeIdentity::failing_registration(Failure::Unavailable)).await;

    let err = h
        .service
        .create_staff(StaffRegistration {
            community_id: 7,
            profile: profile("bob@acme.test", "Bob", "pw"),
        })
        .await
        .unwrap_err();

    assert!(
        matches!(
            err,
            AuthError::RemoteRegistrationFailed {
                compensated: true,
                source: KefuError::RemoteUnavailable(_),
                ..
            }
        ),
        "got: {err:?}"
    );
    assert!(matches!(
        h.users.get_by_email("bob@acme.test").await.unwrap_err(),
        KefuError::NotFound { .. }
    ));
}

#[tokio::test]
async fn staff_registration_example() {
    let h = harness(FakeIdentity::default()).await;

    let account = h
        .service
        .create_staff(StaffRegistration {
            community_id: 7,
            profile: profile("a@x.com", "A", "p1"),
        })
        .await
        .unwrap();

    let user = h.users.get_by_email("a@x.com").await.unwrap();
    assert_eq!(user.uuid, account.uuid);
    assert_eq!(user.row_id, account.row_id);
    assert_eq!(user.community_id, 7);
    assert!(!user.is_admin);

    assert_eq!(
        h.identity.registered(),
        vec![RemoteUser {
            user_id: account.uuid.to_string(),
            nickname: "A".into(),
            face_url: String::new(),
        }]
    );
    assert_eq!(h.communities.creates(), 0);
}

#[tokio::test]
async fn duplicate_email_is_a_persistence_error_without_remote_call() {
    let h = harness(FakeIdentity::default()).await;
    let staff = || StaffRegistration {
        community_id: 1,
        profile: profile("dup@acme.test", "Dup", "pw"),
    };

    let first = h.service.create_staff(staff()).await.unwrap();
    let err = h.service.create_staff(staff()).await.unwrap_err();

    assert!(
        matches!(err, AuthError::Persistence(KefuError::AlreadyExists { .. })),
        "got: {err:?}"
    );
    assert_eq!(h.identity.register_calls(), 1);
    // The original account is untouched.
    assert_eq!(
        h.users.get_by_email("dup@acme.test").await.unwrap().uuid,
        first.uuid
    );
}

#[tokio::test]
async fn concurrent_admin_registrations_for_one_email_have_one_winner() {
    let h = harness(FakeIdentity::default()).await;
    let code = h.codes.issue_code("race@acme.test").await.unwrap();

    let (a, b) = tokio::join!(
        h.service
            .create_admin(admin_registration(code.clone(), "race@acme.test")),
        h.service
            .create_admin(admin_registration(code.clone(), "race@acme.test")),
    );

    let results = [a, b];
    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1, "results: {results:?}");
    let loser = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert!(matches!(loser, AuthError::Persistence(_)), "got: {loser:?}");
    assert_eq!(h.identity.registered().len(), 1);
}

#[tokio::test]
async fn failed_compensation_is_reported_and_row_remains() {
    let db = setup_db().await;
    let users = UndeletableUsers(SurrealUserRepository::new(db.clone()));
    let h = build(
        &db,
        users,
        FakeIdentity::failing_registration(Failure::Rejected(500, "ServerInternalError")),
    );

    let err = h
        .service
        .create_staff(StaffRegistration {
            community_id: 3,
            profile: profile("orphan@acme.test", "Orphan", "pw"),
        })
        .await
        .unwrap_err();

    let (uuid, compensated) = match err {
        AuthError::RemoteRegistrationFailed {
            uuid, compensated, ..
        } => (uuid, compensated),
        other => panic!("expected RemoteRegistrationFailed, got: {other:?}"),
    };
    assert!(!compensated);
    // The caller is told it failed; the orphan is still there.
    assert_eq!(h.users.get_by_uuid(uuid).await.unwrap().email, "orphan@acme.test");
}

#[tokio::test]
async fn compensate_deletes_a_stored_account() {
    let h = harness(FakeIdentity::default()).await;
    let account = h
        .service
        .create_staff(StaffRegistration {
            community_id: 2,
            profile: profile("undo@acme.test", "Undo", "pw"),
        })
        .await
        .unwrap();
    let user = h.users.get_by_uuid(account.uuid).await.unwrap();

    assert!(h.service.compensate(&user).await);
    assert!(matches!(
        h.users.get_by_uuid(account.uuid).await.unwrap_err(),
        KefuError::NotFound { .. }
    ));

    // A second attempt has nothing left to delete.
    assert!(!h.service.compensate(&user).await);
}

#[tokio::test]
async fn invalid_profile_is_rejected_before_any_write() {
    let h = harness(FakeIdentity::default()).await;

    for bad in [
        profile("not-an-email", "Nick", "pw"),
        profile("x@acme.test", "   ", "pw"),
        profile("x@acme.test", "Nick", ""),
    ] {
        let err = h
            .service
            .create_staff(StaffRegistration {
                community_id: 1,
                profile: bad,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidInput(_)), "got: {err:?}");
    }

    assert_eq!(h.identity.register_calls(), 0);
}
