use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use projectlist::cache::MemoryCache;
use projectlist::config::{Config, DashboardConfig, RedisConfig};
use projectlist::db;
use projectlist::models::{
    Consultant, EntryType, NewConsultant, NewProject, NewProjectStatus, NewTimeEntry, Project,
};

pub const TOKEN: &str = "test-token";

/// A running test server instance with a dedicated test database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: PgPool,
    pub client: Client,
    pub db_name: String,
    pub shutdown: CancellationToken,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// GET with the access token attached, return (body, status).
    pub async fn get_auth(&self, path: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(&format!("{path}?token={TOKEN}")))
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// GET without a token, return the status.
    pub async fn get_anonymous(&self, path: &str) -> StatusCode {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("get request failed")
            .status()
    }

    pub async fn create_consultant(&self, first_name: &str, last_name: &str) -> Consultant {
        db::consultants::create(
            &self.pool,
            &NewConsultant {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                email: format!(
                    "{}.{}@test.com",
                    first_name.to_lowercase(),
                    last_name.to_lowercase()
                ),
                profile_picture: String::new(),
            },
        )
        .await
        .expect("create consultant failed")
    }

    pub async fn create_project(&self, number: &str, manager_id: Option<i32>) -> Project {
        self.create_project_ending(number, manager_id, None).await
    }

    pub async fn create_project_ending(
        &self,
        number: &str,
        manager_id: Option<i32>,
        end_date: Option<DateTime<Utc>>,
    ) -> Project {
        db::projects::create(
            &self.pool,
            &NewProject {
                manager_id,
                number: number.to_string(),
                name: format!("Project {number}"),
                projected_start_date: None,
                start_date: None,
                projected_end_date: None,
                end_date,
                description: format!("Description of {number}"),
            },
        )
        .await
        .expect("create project failed")
    }

    /// Add a status dated `age_days` in the past.
    pub async fn add_status(&self, project_id: i32, title: &str, age_days: i64) {
        db::statuses::create(
            &self.pool,
            &NewProjectStatus {
                project_id,
                consultant_id: None,
                title: title.to_string(),
                description: String::new(),
                date_created: Utc::now() - TimeDelta::days(age_days),
            },
        )
        .await
        .expect("create status failed");
    }

    pub async fn add_entry(
        &self,
        project_id: i32,
        consultant_id: Option<i32>,
        entry_type: EntryType,
        hours: f64,
    ) {
        db::time_entries::create(
            &self.pool,
            &NewTimeEntry {
                project_id,
                consultant_id,
                entry_type,
                hours,
                title: format!("{} entry", entry_type.as_str()),
                description: String::new(),
                entry_date: Utc::now(),
            },
        )
        .await
        .expect("create time entry failed");
    }
}

/// Spawn a test app with a fresh temporary database and an in-memory cache.
pub async fn spawn_app() -> TestApp {
    let _ = dotenvy::dotenv();

    let base_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    // Create a unique test database
    let db_name = format!("projectlist_test_{}", Uuid::now_v7().to_string().replace('-', ""));

    // Connect to default postgres DB to create test DB
    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    // Connect to test DB and run migrations
    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let config = Config {
        database_url: test_url,
        redis: RedisConfig {
            host: "127.0.0.1".to_string(),
            port: 6379,
            password: String::new(),
            db: 0,
        },
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        log_level: "warn".to_string(),
        cache_ttl: Duration::from_secs(300),
        demo_data: false,
        dashboard: DashboardConfig::default(),
    };

    let shutdown = CancellationToken::new();
    let app = projectlist::build_app(
        pool.clone(),
        Arc::new(MemoryCache::new()),
        config,
        shutdown.clone(),
    );

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    // Spawn server in background
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        pool,
        client,
        db_name,
        shutdown,
    }
}

/// Drop stale test databases (useful after test crashes).
#[allow(dead_code)]
pub async fn cleanup_stale_test_dbs() {
    let base_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");
    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    if let Ok(admin_pool) = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
    {
        let rows = sqlx::query_scalar::<_, String>(
            "SELECT datname FROM pg_database WHERE datname LIKE 'projectlist_test_%'",
        )
        .fetch_all(&admin_pool)
        .await
        .unwrap_or_default();

        for db_name in rows {
            let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
                .execute(&admin_pool)
                .await;
        }
        admin_pool.close().await;
    }
}

/// Drop the test database after tests complete.
pub async fn cleanup(app: TestApp) {
    app.shutdown.cancel();
    let db_name = app.db_name.clone();
    app.pool.close().await;

    let base_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");
    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
