//! Repository tests against a real PostgreSQL database.
//!
//! `#[sqlx::test]` creates a fresh database per test from `DATABASE_URL`.

use coursecraft_core::course::FormData;
use coursecraft_core::materials::{Section, SectionType};
use coursecraft_core::roles::ROLE_TRAINER;
use coursecraft_core::tier::Tier;
use coursecraft_db::models::generated_course::CreateGeneratedCourse;
use coursecraft_db::models::session::CreateSession;
use coursecraft_db::models::user::CreateUser;
use coursecraft_db::repositories::{GeneratedCourseRepo, SessionRepo, UserRepo};
use sqlx::PgPool;

fn new_user(name: &str, tier: Tier) -> CreateUser {
    CreateUser {
        username: name.to_string(),
        email: format!("{name}@example.com"),
        password_hash: "not-a-real-hash".to_string(),
        role: ROLE_TRAINER.to_string(),
        tier,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn bootstrap_passes_health_check(pool: PgPool) {
    coursecraft_db::health_check(&pool).await.unwrap();
}

#[sqlx::test(migrations = "./migrations")]
async fn free_user_runs_out_after_three(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("alice", Tier::Free)).await.unwrap();
    assert_eq!(user.remaining_generations, 3);
    assert!(user.last_generation_at.is_none());

    for expected in [2, 1, 0] {
        let updated = UserRepo::consume_generation(&pool, user.id).await.unwrap().unwrap();
        assert_eq!(updated.remaining_generations, expected);
        assert!(updated.last_generation_at.is_some());
    }
    assert!(UserRepo::consume_generation(&pool, user.id).await.unwrap().is_none());

    let stored = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(stored.remaining_generations, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn premium_is_never_decremented(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("bob", Tier::Premium)).await.unwrap();
    for _ in 0..5 {
        let updated = UserRepo::consume_generation(&pool, user.id).await.unwrap().unwrap();
        assert_eq!(updated.remaining_generations, 0);
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn changing_tier_resets_counter(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("carol", Tier::Free)).await.unwrap();
    UserRepo::consume_generation(&pool, user.id).await.unwrap();

    let upgraded = UserRepo::update_subscription(&pool, user.id, Tier::Basic)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(upgraded.tier(), Tier::Basic);
    assert_eq!(upgraded.remaining_generations, 20);
}

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_username_violates_unique_constraint(pool: PgPool) {
    UserRepo::create(&pool, &new_user("dave", Tier::Free)).await.unwrap();
    let err = UserRepo::create(&pool, &new_user("dave", Tier::Free)).await.unwrap_err();
    let db_err = err.as_database_error().unwrap();
    assert_eq!(db_err.constraint(), Some("uq_users_username"));
}

#[sqlx::test(migrations = "./migrations")]
async fn courses_are_scoped_to_their_owner(pool: PgPool) {
    let owner = UserRepo::create(&pool, &new_user("erin", Tier::Free)).await.unwrap();
    let other = UserRepo::create(&pool, &new_user("frank", Tier::Free)).await.unwrap();

    let course = GeneratedCourseRepo::create(
        &pool,
        &CreateGeneratedCourse {
            user_id: owner.id,
            job_id: Some("job_1_abc".into()),
            title: "Negotiation".into(),
            form_data: FormData {
                subject: "Negotiation".into(),
                ..Default::default()
            },
            sections: vec![Section::new(SectionType::LessonPlan, "Lesson plan", "Plan")],
        },
    )
    .await
    .unwrap();

    let listed = GeneratedCourseRepo::list_for_user(&pool, owner.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].section_count, 1);
    assert!(GeneratedCourseRepo::list_for_user(&pool, other.id).await.unwrap().is_empty());

    assert!(GeneratedCourseRepo::find_for_user(&pool, course.id, other.id)
        .await
        .unwrap()
        .is_none());
    assert!(!GeneratedCourseRepo::delete_for_user(&pool, course.id, other.id).await.unwrap());

    let found = GeneratedCourseRepo::find_for_user(&pool, course.id, owner.id)
        .await
        .unwrap()
        .unwrap();
    assert!(found.to_markdown().starts_with("# Negotiation\n"));
    assert!(GeneratedCourseRepo::delete_for_user(&pool, course.id, owner.id).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn refresh_token_is_consumed_once(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("dora", Tier::Free)).await.unwrap();
    let session = SessionRepo::create(
        &pool,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash: "hash-1".to_string(),
            expires_at: chrono::Utc::now() + chrono::Duration::days(7),
        },
    )
    .await
    .unwrap();

    let (first, second) = tokio::join!(
        SessionRepo::consume_refresh_token(&pool, "hash-1"),
        SessionRepo::consume_refresh_token(&pool, "hash-1"),
    );
    let winners: Vec<_> = [first.unwrap(), second.unwrap()].into_iter().flatten().collect();
    assert_eq!(winners.len(), 1);
    assert_eq!(winners[0].id, session.id);
    assert!(winners[0].revoked_at.is_some());

    assert!(SessionRepo::consume_refresh_token(&pool, "hash-1").await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn expired_refresh_token_is_not_consumed(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("eve", Tier::Free)).await.unwrap();
    SessionRepo::create(
        &pool,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash: "hash-old".to_string(),
            expires_at: chrono::Utc::now() - chrono::Duration::minutes(1),
        },
    )
    .await
    .unwrap();

    assert!(SessionRepo::consume_refresh_token(&pool, "hash-old").await.unwrap().is_none());
}
