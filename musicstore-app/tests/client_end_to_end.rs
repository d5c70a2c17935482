//! Drives a real server over TCP with the client SDK.

use musicstore_app::{build_server, config::Config};
use musicstore_client::{ClientError, MusicStoreClient};
use musicstore_types::{AlbumId, CustomerDetails};
use tempfile::TempDir;

/// Starts a server on an ephemeral port backed by a file database.
async fn spawn_server(dir: &TempDir) -> MusicStoreClient {
    let db_path = dir.path().join("musicstore.db");
    let database_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let config = Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some(database_url.clone()),
        "RATE_LIMIT_PER_MINUTE" => Some("1000".into()),
        _ => None,
    })
    .unwrap();

    let router = build_server(&config).await.unwrap().router();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    MusicStoreClient::new(format!("http://{}", addr))
}

fn customer() -> CustomerDetails {
    CustomerDetails {
        first_name: "Jane".into(),
        last_name: "Citizen".into(),
        email: "jane@example.com".into(),
        city: Some("Sydney".into()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_browse_fill_cart_and_check_out() {
    let dir = TempDir::new().unwrap();
    let client = spawn_server(&dir).await;

    assert!(client.health().await.unwrap());

    let genres = client.list_genres().await.unwrap();
    assert_eq!(genres.len(), 10);
    let metal = genres.iter().find(|g| g.name == "Metal").unwrap();
    let albums = client.list_albums(Some(metal.id)).await.unwrap();
    assert_eq!(albums.len(), 3);

    let first = &albums[0];
    let second = &albums[1];
    client.add_to_cart("session 1", first.id).await.unwrap();
    client.add_to_cart("session 1", first.id).await.unwrap();
    client.add_to_cart("session 1", second.id).await.unwrap();

    let cart = client.get_cart("session 1").await.unwrap();
    assert_eq!(cart.item_count(), 3);
    let expected_total = first.price.amount() * 2 + second.price.amount();
    assert_eq!(cart.total.amount(), expected_total);

    let second_item = cart
        .lines
        .iter()
        .find(|l| l.album.id == second.id)
        .unwrap()
        .item
        .id;
    assert_eq!(client.remove_cart_item(second_item).await.unwrap(), 0);

    let order_id = client
        .checkout("session 1", customer(), "tok_visa")
        .await
        .unwrap();

    let order = client.get_order(order_id).await.unwrap();
    assert_eq!(order.total.amount(), first.price.amount() * 2);
    assert_eq!(order.details.len(), 1);
    assert_eq!(order.details[0].quantity, 2);
    assert!(order.transaction_id.starts_with("ch_"));

    assert!(client.get_cart("session 1").await.unwrap().lines.is_empty());
}

#[tokio::test]
async fn test_api_errors_surface_status_and_message() {
    let dir = TempDir::new().unwrap();
    let client = spawn_server(&dir).await;

    let err = client.get_album(AlbumId::from_i64(9999)).await.unwrap_err();
    assert_eq!(err.status(), Some(404));

    let albums = client.list_albums(None).await.unwrap();
    client.add_to_cart("s2", albums[0].id).await.unwrap();

    let err = client
        .checkout("s2", customer(), "tok_chargeDeclined")
        .await
        .unwrap_err();
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 402);
            assert_eq!(message, "Your card was declined.");
        }
        other => panic!("unexpected error: {other}"),
    }

    // The declined checkout left the cart alone
    assert_eq!(client.get_cart("s2").await.unwrap().item_count(), 1);

    client.empty_cart("s2").await.unwrap();
    let err = client
        .checkout("s2", customer(), "tok_visa")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn test_sample_data_survives_restart_without_duplicates() {
    let dir = TempDir::new().unwrap();

    let first = spawn_server(&dir).await;
    assert_eq!(first.list_genres().await.unwrap().len(), 10);

    let second = spawn_server(&dir).await;
    assert_eq!(second.list_genres().await.unwrap().len(), 10);
}
