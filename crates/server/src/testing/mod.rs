use std::{error::Error, net::Ipv4Addr, sync::Arc};

use axum::async_trait;
use common::{config::Config, origin::OriginResolver};
use db::{code, ActiveValue, Database, DatabaseConnection, EntityTrait};
use hyper::body::{self, Bytes, HttpBody};
use migration::MigratorTrait;
use serde::Serialize;

/// LAN address reported by the test resolver.
pub(crate) const LAN_ADDRESS: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 50);

pub(crate) async fn create_database() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("unable to create test database");

    migration::Migrator::up(&db, None)
        .await
        .expect("unable to run migrations");

    db
}

/// Create an origin resolver with a fixed LAN address.
pub(crate) fn resolver() -> Arc<OriginResolver> {
    let mut config = Config::for_tests();
    config.origin.lan_address = Some(LAN_ADDRESS);

    Arc::new(OriginResolver::from_config(&config.origin).expect("invalid origin config"))
}

/// Create an application router with an in-memory database and the test resolver.
pub(crate) fn app(db: DatabaseConnection) -> axum::Router {
    crate::app_router(Arc::new(db), resolver())
}

/// Insert a code record directly, bypassing the API.
pub(crate) async fn create_code(
    db: &DatabaseConnection,
    slug: Option<&str>,
    target_url: &str,
    tracking_enabled: bool,
) -> code::Model {
    code::Entity::insert(code::ActiveModel {
        id: ActiveValue::Set(common::id::mint().to_string()),
        slug: ActiveValue::Set(slug.map(String::from)),
        name: ActiveValue::Set(String::from("Test code")),
        target_url: ActiveValue::Set(String::from(target_url)),
        tracking_enabled: ActiveValue::Set(tracking_enabled),
        settings: ActiveValue::Set(String::from("{}")),
        ..Default::default()
    })
    .exec_with_returning(db)
    .await
    .expect("unable to create code")
}

pub(crate) trait RequestBodyExt: Sized {
    fn from_json<B: Serialize>(val: B) -> Self;
}

impl<T> RequestBodyExt for T
where
    T: HttpBody + From<Vec<u8>>,
{
    fn from_json<B: Serialize>(val: B) -> Self {
        T::from(serde_json::to_vec(&val).expect("unable to serialize"))
    }
}

#[async_trait(?Send)]
pub(crate) trait ResponseBodyExt {
    async fn bytes(self) -> Bytes;

    async fn text(self) -> String;

    async fn json(self) -> serde_json::Value;
}

#[async_trait(?Send)]
impl<T> ResponseBodyExt for T
where
    T: HttpBody,
    T::Error: Error,
{
    async fn bytes(self) -> Bytes {
        body::to_bytes(self)
            .await
            .expect("unable to convert to bytes")
    }

    async fn text(self) -> String {
        String::from_utf8(self.bytes().await.to_vec()).expect("unable to convert to text")
    }

    async fn json(self) -> serde_json::Value {
        serde_json::from_slice(&self.bytes().await).expect("unable to convert to json")
    }
}
