use super::*;

#[test]
fn accepts_letters_and_digits() {
    assert!(is_order_valid("Jane", "5551234"));
    assert!(OrderDraft::new("Jane", "5551234").is_valid());
}

#[test]
fn rejects_malformed_or_empty_fields() {
    assert!(!is_order_valid("123", "5551234"));
    assert!(!is_order_valid("Jane", "abc"));
    assert!(!is_order_valid("", "5551234"));
    assert!(!is_order_valid("Jane", ""));
    assert!(!is_order_valid("", ""));
    assert!(!is_order_valid("Jane Doe", "5551234"));
    assert!(!is_order_valid("Jane", "555-1234"));
    assert!(!is_order_valid("Zoë", "5551234"));
}

#[test]
fn validate_reports_first_problem() {
    assert_eq!(
        OrderDraft::new("", "x").validate(),
        Err(OrderValidationError::EmptyName)
    );
    assert_eq!(
        OrderDraft::new("J4ne", "").validate(),
        Err(OrderValidationError::InvalidName)
    );
    assert_eq!(
        OrderDraft::new("Jane", "").validate(),
        Err(OrderValidationError::EmptyPhone)
    );
    assert_eq!(
        OrderDraft::new("Jane", "55x").validate(),
        Err(OrderValidationError::InvalidPhone)
    );
}

#[test]
fn validity_follows_edits() {
    let mut draft = OrderDraft::new("Jane", "5551234");
    assert!(draft.is_valid());
    draft.phone.push('x');
    assert!(!draft.is_valid());
    draft.phone.pop();
    assert!(draft.is_valid());
    draft.reset();
    assert_eq!(draft, OrderDraft::default());
    assert!(!draft.is_valid());
}

#[test]
fn validated_contact_builds_order_request() {
    let contact = OrderDraft::new("Jane", "5551234")
        .validate()
        .expect("valid contact");
    let ids = vec![LessonId::from(1), LessonId::from(1)];
    let request = contact.order_for(ids.clone());
    assert_eq!(request.name, "Jane");
    assert_eq!(request.phone, "5551234");
    assert_eq!(request.lesson_ids, ids);
}
