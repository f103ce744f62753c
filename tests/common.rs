#![allow(dead_code)]
use agro_user_service::adapters::Store;
use agro_user_service::api::{self, MgmtState};
use agro_user_service::config::Config;
use agro_user_service::domain::{NewUser, Page, UserPatch, UserRepository};
use agro_user_service::error::AppError;
use agro_user_service::proto::agro::v1::user_service_client::UserServiceClient;
use agro_user_service::AppBuilder;
use clap::Parser;
use std::sync::Once;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tonic::transport::Channel;
use uuid::Uuid;

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("agro_user_service=debug".parse().unwrap())
            .add_directive("sqlx=warn".parse().unwrap())
            .add_directive("mongodb=warn".parse().unwrap())
            .add_directive("h2=warn".parse().unwrap())
            .add_directive("tower=warn".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap());

        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}

pub fn get_test_config(args: &[&str]) -> Config {
    Config::try_parse_from(std::iter::once("agro-user-service").chain(args.iter().copied())).unwrap()
}

/// A running gRPC + management server pair on ephemeral ports.
pub struct TestApp {
    pub rpc: UserServiceClient<Channel>,
    pub mgmt_url: String,
    pub client: reqwest::Client,
    pub store: Store,
    shutdown_tx: watch::Sender<bool>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_config(get_test_config(&["--store", "memory"])).await
    }

    pub async fn spawn_with_config(config: Config) -> Self {
        setup_tracing();

        let store = Store::connect(&config).await.unwrap();
        let app = AppBuilder::new(config).with_store(store.clone()).build().unwrap();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let rpc_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let rpc_addr = rpc_listener.local_addr().unwrap();
        let mgmt_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mgmt_addr = mgmt_listener.local_addr().unwrap();

        tokio::spawn(api::serve_rpc(rpc_listener, app.services, shutdown_rx.clone()));

        let mgmt_app = api::mgmt_router(MgmtState { health_service: app.health_service });
        let mut mgmt_rx = shutdown_rx;
        tokio::spawn(async move {
            axum::serve(mgmt_listener, mgmt_app)
                .with_graceful_shutdown(async move {
                    let _ = mgmt_rx.wait_for(|&s| s).await;
                })
                .await
                .unwrap();
        });

        let rpc = UserServiceClient::connect(format!("http://{rpc_addr}")).await.unwrap();

        Self {
            rpc,
            mgmt_url: format!("http://{mgmt_addr}"),
            client: reqwest::Client::new(),
            store,
            shutdown_tx,
        }
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

pub fn unique_name(prefix: &str) -> String {
    format!("{prefix}_{}", &Uuid::new_v4().simple().to_string()[..8])
}

fn new_user(name: &str) -> NewUser {
    NewUser { username: name.to_string(), email: format!("{name}@example.com"), password: "secret".into() }
}

/// Behaviour every repository backend must share.
///
/// `absent_id` must be well-formed for the backend but refer to no record.
pub async fn repository_contract(repo: &UserRepository, absent_id: &str) {
    let alice = unique_name("alice");
    let id = repo.create(new_user(&alice)).await.unwrap();

    let user = repo.get_by_id(id.as_str()).await.unwrap().unwrap();
    assert_eq!(user.id, id);
    assert_eq!(user.username, alice);
    assert_eq!(user.email, format!("{alice}@example.com"));
    assert_eq!(user.password, "secret");

    assert!(matches!(repo.get_by_id("not-an-id").await, Err(AppError::InvalidIdentifier(_))));
    assert!(repo.get_by_id(absent_id).await.unwrap().is_none());

    // Partial update leaves unset fields alone.
    let renamed = unique_name("alicia");
    repo.update(id.as_str(), UserPatch { username: Some(renamed.clone()), email: None }).await.unwrap();
    let user = repo.get_by_id(id.as_str()).await.unwrap().unwrap();
    assert_eq!(user.username, renamed);
    assert_eq!(user.email, format!("{alice}@example.com"));

    repo.update(id.as_str(), UserPatch { username: Some(String::new()), email: None }).await.unwrap();
    assert_eq!(repo.get_by_id(id.as_str()).await.unwrap().unwrap().username, renamed);

    assert!(matches!(repo.update(absent_id, UserPatch::default()).await, Err(AppError::NotFound)));

    // Duplicate usernames are rejected.
    let dup = repo.create(new_user(&renamed)).await;
    assert!(matches!(dup, Err(AppError::Conflict(_))));

    let page = repo.get_all(Page::new(1, 1000)).await.unwrap();
    assert!(page.iter().any(|u| u.id == id));

    repo.delete(id.as_str()).await.unwrap();
    assert!(repo.get_by_id(id.as_str()).await.unwrap().is_none());
    assert!(matches!(repo.delete(id.as_str()).await, Err(AppError::NotFound)));
}
