use booking_receipt::storage::{resolve_confirmation_code, LocalStorage, CONFIRMATION_CODE_KEY};

#[test]
fn booking_step_code_is_picked_up_by_receipt_step() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    // Booking step
    let mut writer = LocalStorage::open(&path).expect("open");
    writer.set_item(CONFIRMATION_CODE_KEY, "RB-2024-001234").expect("write");

    // Receipt step, no explicit code
    let reader = LocalStorage::open(&path).expect("reopen");
    assert_eq!(resolve_confirmation_code(None, Some(&reader)).as_deref(), Some("RB-2024-001234"));

    // An explicit code is preferred and left untouched
    assert_eq!(
        resolve_confirmation_code(Some("rb-2024-999"), Some(&reader)).as_deref(),
        Some("rb-2024-999")
    );
}

#[test]
fn empty_storage_yields_no_code() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStorage::open(dir.path().join("storage.json")).expect("open");
    assert!(resolve_confirmation_code(None, Some(&store)).is_none());
}
