#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use actix_web::web;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use fake::Fake;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use sqlx::SqlitePool;
use tempfile::TempDir;

use shiftbook::config::Config;
use shiftbook::database::init_database;
use shiftbook::database::models::{
    DirectoryUser, ShiftInput, UserProfileInput, UserRole, UserStatus,
};
use shiftbook::database::repositories::UserRepository;
use shiftbook::error::DeliveryFailure;
use shiftbook::services::{PushMessage, PushTransport, RequestContext};
use shiftbook::AppState;

// Test database wrapper
pub struct TestDb {
    pub pool: SqlitePool,
    _temp_dir: TempDir,
}

impl TestDb {
    pub async fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let database_url = format!("sqlite:{}/test.db", temp_dir.path().display());
        let pool = init_database(&database_url).await?;

        Ok(TestDb {
            pool,
            _temp_dir: temp_dir,
        })
    }
}

/// Push transport that records deliveries and fails for selected tokens.
#[derive(Default)]
pub struct RecordingPushTransport {
    delivered: Mutex<Vec<(String, PushMessage)>>,
    failing_tokens: Mutex<HashSet<String>>,
}

impl RecordingPushTransport {
    pub fn fail_for(&self, token: &str) {
        self.failing_tokens.lock().unwrap().insert(token.to_string());
    }

    pub fn delivered(&self) -> Vec<(String, PushMessage)> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushTransport for RecordingPushTransport {
    async fn deliver(&self, token: &str, message: &PushMessage) -> Result<(), DeliveryFailure> {
        if self.failing_tokens.lock().unwrap().contains(token) {
            return Err(DeliveryFailure::Transport("device unreachable".to_string()));
        }
        self.delivered
            .lock()
            .unwrap()
            .push((token.to_string(), message.clone()));
        Ok(())
    }
}

pub struct TestContext {
    pub db: TestDb,
    pub config: Config,
    pub state: web::Data<AppState>,
    pub push: Arc<RecordingPushTransport>,
    pub users: UserRepository,
}

impl TestContext {
    pub async fn new() -> Result<Self> {
        let db = TestDb::new().await?;
        let config = Config::test_config();
        let push = Arc::new(RecordingPushTransport::default());

        let state = web::Data::new(AppState::new(db.pool.clone(), &config, push.clone()));
        let users = UserRepository::new(db.pool.clone());

        Ok(TestContext {
            db,
            config,
            state,
            push,
            users,
        })
    }

    /// Add a directory entry with a generated name and email.
    pub async fn seed_user(
        &self,
        id: &str,
        role: UserRole,
        department: Option<&str>,
    ) -> DirectoryUser {
        let input = UserProfileInput {
            email: SafeEmail().fake(),
            display_name: Name().fake(),
            department: department.map(str::to_string),
        };

        self.users.upsert_profile(id, role, &input).await.unwrap()
    }

    pub async fn deactivate(&self, id: &str) {
        self.users.set_status(id, UserStatus::Inactive).await.unwrap();
    }

    pub async fn register_token(&self, id: &str, token: &str) {
        self.users.set_push_token(id, Some(token)).await.unwrap();
    }

    pub fn token_for(&self, id: &str, role: UserRole) -> String {
        self.state
            .auth_service
            .issue_token(id, &format!("{id}@example.com"), role, None)
            .unwrap()
    }

    pub async fn unread_for(&self, id: &str) -> i64 {
        self.state
            .inbox
            .unread_count(&employee(id))
            .await
            .unwrap()
            .count
    }
}

pub fn manager(id: &str) -> RequestContext {
    RequestContext::new(id, UserRole::Manager)
}

pub fn employee(id: &str) -> RequestContext {
    RequestContext::new(id, UserRole::Employee)
}

pub fn admin(id: &str) -> RequestContext {
    RequestContext::new(id, UserRole::Admin)
}

pub fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

pub fn shift_input(employee_id: &str, start: DateTime<Utc>, hours: i64) -> ShiftInput {
    ShiftInput {
        id: None,
        title: "Front desk".to_string(),
        description: Some("Opening shift".to_string()),
        employee_id: employee_id.to_string(),
        start_time: start,
        end_time: start + Duration::hours(hours),
        status: None,
        recurrence: None,
    }
}
