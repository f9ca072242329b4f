// tests/transition_tests.rs
mod common;

use common::*;
use gigflow::{
  attempt_transition, available_actions, ActionKind, Actor, AttachmentKind, AttachmentRef, OrderAction, OrderStatus,
  TransitionError,
};

fn deliver(message: &str) -> OrderAction {
  OrderAction::deliver(message)
}

#[test]
fn test_deliver_from_active_sets_date_and_message() {
  let order = active_order("Marie Dupont");
  let delivered = attempt_transition(&order, &deliver("Logo livré"), Actor::Freelancer, stamp()).unwrap();

  assert_eq!(delivered.status, OrderStatus::Delivered);
  assert_eq!(delivered.delivered_date, Some(today()));
  assert_eq!(delivered.delivery_message, "Logo livré");
  assert_eq!(delivered.revision_count, order.revision_count);
  assert_eq!(delivered.version, order.version + 1);
  assert_eq!(delivered.updated_at, now());
  // The input record is untouched.
  assert_eq!(order.status, OrderStatus::Active);
  assert!(order.delivered_date.is_none());
}

#[test]
fn test_deliver_from_late_is_allowed() {
  let order = order_in(OrderStatus::Late, "Jean Martin");
  let delivered = attempt_transition(&order, &deliver("En retard mais livré"), Actor::Freelancer, stamp()).unwrap();
  assert_eq!(delivered.status, OrderStatus::Delivered);
  assert_eq!(delivered.revision_count, 0);
}

#[test]
fn test_redeliver_increments_revision_count_and_clears_request() {
  let order = order_in(OrderStatus::Revision, "Sophie Bernard");
  assert_eq!(order.revision_count, 1);

  let action = deliver("Corrections appliquées");
  assert_eq!(action.kind_for(order.status), ActionKind::Redeliver);

  let redelivered = attempt_transition(&order, &action, Actor::Freelancer, stamp()).unwrap();
  assert_eq!(redelivered.status, OrderStatus::Delivered);
  assert_eq!(redelivered.revision_count, 2);
  assert_eq!(redelivered.delivered_date, Some(today()));
  assert_eq!(redelivered.delivery_message, "Corrections appliquées");
  assert!(redelivered.revision_message.is_none());
}

#[test]
fn test_blank_delivery_message_is_rejected_without_changes() {
  for status in [OrderStatus::Active, OrderStatus::Late, OrderStatus::Revision] {
    let order = order_in(status, "Marie Dupont");
    for message in ["", "   ", "\n\t "] {
      let err = attempt_transition(&order, &deliver(message), Actor::Freelancer, stamp()).unwrap_err();
      assert_eq!(
        err,
        TransitionError::EmptyMessage {
          action: deliver(message).kind_for(status)
        }
      );
    }
    // Nothing on the original moved.
    let fresh = order_in(status, "Marie Dupont");
    assert_eq!(order.status, fresh.status);
    assert_eq!(order.delivered_date, fresh.delivered_date);
    assert_eq!(order.delivery_message, fresh.delivery_message);
  }
}

#[test]
fn test_delivery_message_is_trimmed() {
  let order = active_order("Marie Dupont");
  let delivered = attempt_transition(&order, &deliver("  Logo livré \n"), Actor::Freelancer, stamp()).unwrap();
  assert_eq!(delivered.delivery_message, "Logo livré");
}

#[test]
fn test_delivery_replaces_attachments() {
  let order = active_order("Marie Dupont");
  let attachment = AttachmentRef {
    name: "logo.png".to_string(),
    kind: AttachmentKind::Png,
    size_bytes: 2048,
    uri: "mem://logo.png".to_string(),
  };
  let action = OrderAction::Deliver {
    message: "Logo livré".to_string(),
    attachments: vec![attachment.clone()],
  };
  let delivered = attempt_transition(&order, &action, Actor::Freelancer, stamp()).unwrap();
  assert_eq!(delivered.attachments, vec![attachment]);
}

#[test]
fn test_mark_completed_only_from_delivered() {
  let delivered = order_in(OrderStatus::Delivered, "Lucas Petit");
  let completed = attempt_transition(&delivered, &OrderAction::MarkCompleted, Actor::Freelancer, stamp()).unwrap();
  assert_eq!(completed.status, OrderStatus::Completed);
  assert_eq!(completed.delivered_date, delivered.delivered_date);

  for status in [OrderStatus::Active, OrderStatus::Late, OrderStatus::Revision] {
    let order = order_in(status, "Lucas Petit");
    let err = attempt_transition(&order, &OrderAction::MarkCompleted, Actor::Freelancer, stamp()).unwrap_err();
    assert_eq!(
      err,
      TransitionError::NotAllowed {
        from: status,
        action: ActionKind::MarkCompleted
      }
    );
  }
}

#[test]
fn test_deliver_after_completion_is_rejected() {
  let delivered = order_in(OrderStatus::Delivered, "Lucas Petit");
  let completed = attempt_transition(&delivered, &OrderAction::MarkCompleted, Actor::Client, stamp()).unwrap();

  let err = attempt_transition(&completed, &deliver("Encore une version"), Actor::Freelancer, stamp()).unwrap_err();
  assert_eq!(
    err,
    TransitionError::NotAllowed {
      from: OrderStatus::Completed,
      action: ActionKind::Deliver
    }
  );
}

#[test]
fn test_terminal_statuses_reject_every_action() {
  let actions = [
    (deliver("x"), Actor::Freelancer),
    (OrderAction::request_revision("x"), Actor::Client),
    (OrderAction::MarkCompleted, Actor::Freelancer),
    (OrderAction::cancel("x"), Actor::Admin),
  ];
  for status in [OrderStatus::Completed, OrderStatus::Cancelled] {
    let order = order_in(status, "Emma Durand");
    for (action, actor) in &actions {
      let err = attempt_transition(&order, action, *actor, stamp()).unwrap_err();
      assert!(
        matches!(err, TransitionError::NotAllowed { from, .. } if from == status),
        "{:?} on {} should be rejected, got {:?}",
        action,
        status,
        err
      );
    }
    assert!(available_actions(status, Actor::Freelancer).is_empty());
    assert!(available_actions(status, Actor::Client).is_empty());
    assert!(available_actions(status, Actor::Admin).is_empty());
  }
}

#[test]
fn test_request_revision_from_delivered() {
  let order = order_in(OrderStatus::Delivered, "Lucas Petit");
  let revised = attempt_transition(
    &order,
    &OrderAction::request_revision("Plus de contraste svp"),
    Actor::Client,
    stamp(),
  )
  .unwrap();
  assert_eq!(revised.status, OrderStatus::Revision);
  assert_eq!(revised.revision_message.as_deref(), Some("Plus de contraste svp"));
  // Counting happens on re-delivery, not on the request.
  assert_eq!(revised.revision_count, order.revision_count);
  assert_eq!(revised.delivered_date, order.delivered_date);

  let err = attempt_transition(&order, &OrderAction::request_revision(" "), Actor::Client, stamp()).unwrap_err();
  assert_eq!(
    err,
    TransitionError::EmptyMessage {
      action: ActionKind::RequestRevision
    }
  );
}

#[test]
fn test_cancel_sets_reason_from_any_open_status() {
  for status in [
    OrderStatus::Active,
    OrderStatus::Late,
    OrderStatus::Revision,
    OrderStatus::Delivered,
  ] {
    let order = order_in(status, "Hugo Leroy");
    let cancelled = attempt_transition(&order, &OrderAction::cancel("Budget coupé"), Actor::Client, stamp()).unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(cancelled.cancellation_reason.as_deref(), Some("Budget coupé"));
  }

  let err = attempt_transition(
    &active_order("Hugo Leroy"),
    &OrderAction::cancel(""),
    Actor::Admin,
    stamp(),
  )
  .unwrap_err();
  assert_eq!(err, TransitionError::EmptyMessage { action: ActionKind::Cancel });
}

#[test]
fn test_actors_are_checked_before_anything_else() {
  let active = active_order("Marie Dupont");
  let err = attempt_transition(&active, &deliver("Logo livré"), Actor::Client, stamp()).unwrap_err();
  assert_eq!(
    err,
    TransitionError::Forbidden {
      actor: Actor::Client,
      action: ActionKind::Deliver
    }
  );

  let delivered = order_in(OrderStatus::Delivered, "Marie Dupont");
  let err = attempt_transition(
    &delivered,
    &OrderAction::request_revision("Changer la police"),
    Actor::Freelancer,
    stamp(),
  )
  .unwrap_err();
  assert!(matches!(err, TransitionError::Forbidden { actor: Actor::Freelancer, .. }));

  let err = attempt_transition(&active, &OrderAction::cancel("Trop cher"), Actor::Freelancer, stamp()).unwrap_err();
  assert!(matches!(err, TransitionError::Forbidden { actor: Actor::Freelancer, .. }));
}

#[test]
fn test_revision_count_never_decreases_through_a_cycle() {
  let mut order = active_order("Sophie Bernard");
  let mut last_count = order.revision_count;
  let script = [
    (deliver("v1"), Actor::Freelancer),
    (OrderAction::request_revision("changes 1"), Actor::Client),
    (deliver("v2"), Actor::Freelancer),
    (OrderAction::request_revision("changes 2"), Actor::Client),
    (deliver("v3"), Actor::Freelancer),
    (OrderAction::MarkCompleted, Actor::Client),
  ];
  for (action, actor) in &script {
    order = attempt_transition(&order, action, *actor, stamp()).unwrap();
    assert!(order.revision_count >= last_count);
    last_count = order.revision_count;
  }
  assert_eq!(order.status, OrderStatus::Completed);
  assert_eq!(order.revision_count, 2);
  assert_eq!(order.version, script.len() as u64);
  assert!(order.delivered_date.is_some());
}

#[test]
fn test_available_actions_per_role() {
  assert_eq!(available_actions(OrderStatus::Active, Actor::Freelancer), vec![ActionKind::Deliver]);
  assert_eq!(available_actions(OrderStatus::Revision, Actor::Freelancer), vec![ActionKind::Redeliver]);
  assert_eq!(
    available_actions(OrderStatus::Delivered, Actor::Client),
    vec![ActionKind::RequestRevision, ActionKind::MarkCompleted, ActionKind::Cancel]
  );
  assert_eq!(available_actions(OrderStatus::Active, Actor::Admin), vec![ActionKind::Cancel]);
}
