// tests/store_tests.rs
mod common;

use common::*;
use gigflow::{
  Actor, AttachmentKind, AttachmentPolicy, AttachmentStore, InMemoryAttachmentStore, InMemoryBackend, Order,
  OrderBackend, OrderError, OrderFilter, OrderId, OrderStatus, OrderStore,
};
use serial_test::serial;

#[test]
fn test_list_keeps_insertion_order() {
  let orders = seven_orders();
  let store = OrderStore::from_orders(orders.clone()).unwrap();
  let listed: Vec<OrderId> = store.list().iter().map(|o| o.id).collect();
  let expected: Vec<OrderId> = orders.iter().map(|o| o.id).collect();
  assert_eq!(listed, expected);
  assert_eq!(store.len(), 7);
}

#[tokio::test]
#[serial]
async fn test_workflow_store_is_a_shared_read_only_handle() {
  setup_tracing();
  let (workflow, backend, _clock) = workflow_with(Vec::new()).await;
  let reader = workflow.store().clone();

  let created = workflow
    .create(Order::new("Marie Dupont", "Logo design", future_due(), 15_000), Actor::Client)
    .await
    .unwrap();
  assert_eq!(reader.len(), 1);
  assert!(reader.with_orders(|orders| orders[0].client == "Marie Dupont"));

  // Every record the store exposes was acknowledged by the backend and logged.
  let delivered = workflow.deliver(created.id, "Logo livré", Vec::new()).await.unwrap();
  assert_eq!(reader.get(created.id).unwrap(), delivered);
  assert_eq!(backend.read(created.id).await.unwrap(), delivered);
  assert_eq!(workflow.history(created.id).unwrap().len(), 2);
}

#[test]
fn test_order_filter_accepts() {
  let orders = seven_orders();
  let everything = OrderFilter::default();
  assert!(orders.iter().all(|o| everything.accepts(o)));

  let delivered = OrderFilter {
    status: Some(OrderStatus::Delivered),
    client: None,
  };
  let accepted: Vec<&str> = orders
    .iter()
    .filter(|o| delivered.accepts(o))
    .map(|o| o.client.as_str())
    .collect();
  assert_eq!(accepted, vec!["Lucas Petit"]);

  let marie = OrderFilter {
    status: None,
    client: Some("  MARIE ".to_string()),
  };
  let accepted: Vec<&str> = orders
    .iter()
    .filter(|o| marie.accepts(o))
    .map(|o| o.client.as_str())
    .collect();
  assert_eq!(accepted, vec!["Marie Dupont", "Marie Curie"]);

  let blank = OrderFilter {
    status: None,
    client: Some("   ".to_string()),
  };
  assert!(orders.iter().all(|o| blank.accepts(o)));

  let both = OrderFilter {
    status: Some(OrderStatus::Active),
    client: Some("curie".to_string()),
  };
  assert_eq!(orders.iter().filter(|o| both.accepts(o)).count(), 1);
}

#[tokio::test]
#[serial]
async fn test_in_memory_backend_lists_in_creation_order() {
  setup_tracing();
  let backend = InMemoryBackend::new();
  let names = ["Lucas Petit", "Marie Dupont", "Jean Martin", "Marie Curie"];
  for name in names {
    backend.create(&active_order(name)).await.unwrap();
  }

  // A later update does not move the row.
  let all = backend.list(&OrderFilter::default()).await.unwrap();
  let mut first = all[0].clone();
  first.status = OrderStatus::Cancelled;
  first.cancellation_reason = Some("Doublon".to_string());
  first.version += 1;
  backend.update(first.id, &first, all[0].version).await.unwrap();

  let listed: Vec<String> = backend
    .list(&OrderFilter::default())
    .await
    .unwrap()
    .into_iter()
    .map(|o| o.client)
    .collect();
  assert_eq!(listed, names);

  let maries = backend
    .list(&OrderFilter {
      status: None,
      client: Some("marie".to_string()),
    })
    .await
    .unwrap();
  let maries: Vec<&str> = maries.iter().map(|o| o.client.as_str()).collect();
  assert_eq!(maries, vec!["Marie Dupont", "Marie Curie"]);

  let cancelled = backend
    .list(&OrderFilter {
      status: Some(OrderStatus::Cancelled),
      client: None,
    })
    .await
    .unwrap();
  assert_eq!(cancelled.len(), 1);
  assert_eq!(cancelled[0].client, "Lucas Petit");

  let err = backend.create(&all[1]).await.unwrap_err();
  assert!(matches!(err, OrderError::Duplicate { id } if id == all[1].id));
}

#[tokio::test]
#[serial]
async fn test_event_sequence_is_global_and_increasing() {
  setup_tracing();
  let first = active_order("Marie Dupont");
  let second = order_in(OrderStatus::Delivered, "Jean Martin");
  let (workflow, _backend, _clock) = workflow_with(vec![first.clone(), second.clone()]).await;

  workflow.deliver(first.id, "Logo livré", Vec::new()).await.unwrap();
  workflow.request_revision(second.id, "Plus grand").await.unwrap();
  workflow.request_revision(first.id, "Plus de bleu").await.unwrap();
  workflow.deliver(second.id, "Agrandi", Vec::new()).await.unwrap();

  let all = workflow.events().all();
  let seqs: Vec<u64> = all.iter().map(|e| e.seq).collect();
  // Two load snapshots, then four transitions alternating between orders.
  assert_eq!(seqs, (1..=6).collect::<Vec<u64>>());

  let first_history: Vec<u64> = workflow.history(first.id).unwrap().iter().map(|e| e.seq).collect();
  let second_history: Vec<u64> = workflow.history(second.id).unwrap().iter().map(|e| e.seq).collect();
  assert_eq!(first_history, vec![1, 3, 5]);
  assert_eq!(second_history, vec![2, 4, 6]);
}

#[test]
fn test_attachment_policy() {
  let policy = AttachmentPolicy::default();
  assert_eq!(policy.check("brief.PDF", 10).unwrap(), AttachmentKind::Pdf);
  assert_eq!(policy.check("photo.jpeg", 10).unwrap(), AttachmentKind::Jpg);
  assert_eq!(policy.check("sources.zip", 50 * 1024 * 1024).unwrap(), AttachmentKind::Zip);

  for (name, size) in [
    ("sources.zip", 50 * 1024 * 1024 + 1),
    ("video.mp4", 10),
    ("noextension", 10),
    ("empty.png", 0),
    ("   ", 10),
  ] {
    let err = policy.check(name, size).unwrap_err();
    assert!(err.is_validation(), "{} ({} bytes) should be rejected", name, size);
  }

  let images_only = AttachmentPolicy {
    max_bytes: 1024,
    allowed: vec![AttachmentKind::Png, AttachmentKind::Jpg],
  };
  assert!(images_only.check("brief.pdf", 10).is_err());
  assert!(images_only.check("logo.png", 2048).is_err());
}

#[tokio::test]
#[serial]
async fn test_in_memory_attachment_store_upload() {
  setup_tracing();
  let uploads = InMemoryAttachmentStore::new(AttachmentPolicy::default().with_max_bytes(16));

  let stored = uploads.upload("logo.png", vec![1, 2, 3]).await.unwrap();
  assert_eq!(stored.kind, AttachmentKind::Png);
  assert_eq!(stored.size_bytes, 3);
  assert!(stored.uri.starts_with("mem://"));
  assert_eq!(uploads.contents(&stored.uri), Some(vec![1, 2, 3]));

  let err = uploads.upload("big.png", vec![0; 17]).await.unwrap_err();
  assert!(err.is_validation());
  assert_eq!(uploads.len(), 1);
}
