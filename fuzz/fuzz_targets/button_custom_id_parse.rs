#![no_main]

use helpdesk_core::ButtonAction;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    let action = ButtonAction::parse(&raw);
    assert_eq!(action.custom_id(), raw);

    if let ButtonAction::RetryContentCheck {
        thread_id,
        message_id,
    } = &action
    {
        assert!(!thread_id.is_empty());
        assert!(!message_id.is_empty());
        assert_eq!(ButtonAction::parse(&action.custom_id()), action);
    }
});
