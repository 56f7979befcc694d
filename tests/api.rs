//! Handler-level tests for account, address, and product management.

use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::{Path, State};
use axum::{Extension, Json};
use sqlx::SqlitePool;
use tempfile::TempDir;

use conecta_rural::api;
use conecta_rural::api::auth::UpdateProfileRequest;
use conecta_rural::auth::CurrentUser;
use conecta_rural::checkout::{self, CartLine};
use conecta_rural::db;
use conecta_rural::db::addresses::AddressFields;
use conecta_rural::db::products::ProductFields;
use conecta_rural::db::users::UserRole;
use conecta_rural::error::ErrorCode;
use conecta_rural::pagseguro::PagSeguroClient;
use conecta_rural::state::AppState;

static SEQ: AtomicU64 = AtomicU64::new(0);

async fn test_pool() -> (TempDir, SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");
    let pool = db::connect(path.to_str().unwrap()).await.unwrap();
    (dir, pool)
}

fn test_state(pool: SqlitePool) -> AppState {
    AppState {
        pool,
        jwt_secret: "test-secret".into(),
        pagseguro: PagSeguroClient::new("test-token".into(), true, None).unwrap(),
    }
}

fn acting_as(id: i64, role: UserRole) -> CurrentUser {
    CurrentUser {
        id,
        role,
        nome: "Usuario Teste".into(),
    }
}

async fn create_user(pool: &SqlitePool, role: UserRole) -> i64 {
    let n = SEQ.fetch_add(1, Ordering::Relaxed);
    db::users::create(
        pool,
        "Usuario Teste",
        &format!("api{n}@example.com"),
        "hash",
        &format!("9{:010}", n),
        None,
        role,
        if role == UserRole::Vendedor {
            Some("Sitio Boa Vista")
        } else {
            None
        },
        None,
        0,
    )
    .await
    .unwrap()
}

async fn create_address(pool: &SqlitePool, user_id: i64) -> i64 {
    db::addresses::create(
        pool,
        user_id,
        &AddressFields {
            logradouro: "Rua das Flores",
            numero: Some("12"),
            bairro: "Centro",
            cep: "12345-678",
            cidade: "Itapetininga",
            estado: "SP",
            complemento: None,
            referencia: None,
        },
        0,
    )
    .await
    .unwrap()
}

async fn create_product(pool: &SqlitePool, seller_id: i64) -> i64 {
    db::products::create(
        pool,
        seller_id,
        &ProductFields {
            nome: "Queijo Minas",
            descricao: None,
            preco_centavos: 500,
            unidade_medida: "kg",
            estoque: Some(10),
            imagem_url: None,
            categoria: None,
        },
        0,
    )
    .await
    .unwrap()
}

async fn place_order(pool: &SqlitePool, consumer: i64, product: i64) {
    checkout::create_orders(
        pool,
        consumer,
        &[CartLine {
            product_id: product,
            quantidade: 1,
        }],
        None,
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn address_referenced_by_order_cannot_be_deleted() {
    let (_dir, pool) = test_pool().await;
    let consumer = create_user(&pool, UserRole::Consumidor).await;
    let delivery = create_address(&pool, consumer).await;
    let spare = create_address(&pool, consumer).await;
    let seller = create_user(&pool, UserRole::Vendedor).await;
    let p = create_product(&pool, seller).await;
    place_order(&pool, consumer, p).await;

    let err = api::addresses::delete_address(
        State(test_state(pool.clone())),
        Extension(acting_as(consumer, UserRole::Consumidor)),
        Path(delivery),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::AddressHasOrders);

    // An address no order points at still deletes
    api::addresses::delete_address(
        State(test_state(pool.clone())),
        Extension(acting_as(consumer, UserRole::Consumidor)),
        Path(spare),
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn product_referenced_by_order_cannot_be_deleted() {
    let (_dir, pool) = test_pool().await;
    let consumer = create_user(&pool, UserRole::Consumidor).await;
    create_address(&pool, consumer).await;
    let seller = create_user(&pool, UserRole::Vendedor).await;
    let p = create_product(&pool, seller).await;
    place_order(&pool, consumer, p).await;

    let err = api::products::delete_product(
        State(test_state(pool.clone())),
        Extension(acting_as(seller, UserRole::Vendedor)),
        Path(p),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::ProductHasOrders);

    // The FK on order_items rejects the raw delete too, covering a line
    // inserted between the count check and the delete
    let err = db::products::delete(&pool, p, seller).await.unwrap_err();
    match err {
        sqlx::Error::Database(e) => assert!(e.is_foreign_key_violation()),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn profile_update_replaces_business_fields() {
    let (_dir, pool) = test_pool().await;
    let seller = create_user(&pool, UserRole::Vendedor).await;

    let Json(profile) = api::auth::update_me(
        State(test_state(pool.clone())),
        Extension(acting_as(seller, UserRole::Vendedor)),
        Json(UpdateProfileRequest {
            nome_negocio: Some("Fazenda Santa Rosa".into()),
            descricao_negocio: Some("Queijos artesanais".into()),
            logo_url: Some("https://example.com/logo.png".into()),
        }),
    )
    .await
    .unwrap();

    assert_eq!(profile.nome_negocio.as_deref(), Some("Fazenda Santa Rosa"));
    assert_eq!(profile.descricao_negocio.as_deref(), Some("Queijos artesanais"));
    assert_eq!(
        profile.logo_url.as_deref(),
        Some("https://example.com/logo.png")
    );

    let user = db::users::find_by_id(&pool, seller).await.unwrap().unwrap();
    assert_eq!(user.nome_negocio.as_deref(), Some("Fazenda Santa Rosa"));
}

#[tokio::test]
async fn seller_cannot_clear_business_name() {
    let (_dir, pool) = test_pool().await;
    let seller = create_user(&pool, UserRole::Vendedor).await;

    let err = api::auth::update_me(
        State(test_state(pool.clone())),
        Extension(acting_as(seller, UserRole::Vendedor)),
        Json(UpdateProfileRequest {
            nome_negocio: None,
            descricao_negocio: None,
            logo_url: None,
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationFailed);

    let user = db::users::find_by_id(&pool, seller).await.unwrap().unwrap();
    assert_eq!(user.nome_negocio.as_deref(), Some("Sitio Boa Vista"));
}

#[tokio::test]
async fn consumer_profile_update_allows_empty_business_fields() {
    let (_dir, pool) = test_pool().await;
    let consumer = create_user(&pool, UserRole::Consumidor).await;

    let Json(profile) = api::auth::update_me(
        State(test_state(pool.clone())),
        Extension(acting_as(consumer, UserRole::Consumidor)),
        Json(UpdateProfileRequest {
            nome_negocio: None,
            descricao_negocio: None,
            logo_url: None,
        }),
    )
    .await
    .unwrap();

    assert!(profile.nome_negocio.is_none());
}
