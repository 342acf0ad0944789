#![no_main]

use helpdesk_commands::parse_command_trigger;
use helpdesk_forum::{evaluate_content, ContentThresholds};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    let prefixes = vec!["!".to_string(), "?".to_string(), "hd!".to_string()];

    if let Some(trigger) = parse_command_trigger(&raw, &prefixes) {
        assert!(prefixes.iter().any(|prefix| prefix == trigger.prefix));
        assert!(raw.starts_with(trigger.prefix));
        assert!(raw[trigger.prefix.len()..].starts_with(trigger.alias));
        assert!(!trigger.alias.contains(char::is_whitespace));
        assert_eq!(trigger.args, trigger.args.trim());
    }

    let report = evaluate_content(&raw, ContentThresholds::default());
    assert_eq!(report.char_count, raw.chars().count());
    assert!(report.word_count <= report.char_count);
});
