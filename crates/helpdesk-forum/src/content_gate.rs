//! Minimum-effort check for the opening post of a help thread.

use helpdesk_core::{Notice, NoticeButton};

pub const DEFAULT_MIN_CONTENT_LENGTH: usize = 100;
pub const DEFAULT_MIN_WORD_COUNT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Public struct `ContentThresholds` used across Helpdesk components.
pub struct ContentThresholds {
    pub min_length: usize,
    pub min_words: usize,
}

impl Default for ContentThresholds {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_CONTENT_LENGTH,
            min_words: DEFAULT_MIN_WORD_COUNT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentReport {
    pub char_count: usize,
    pub word_count: usize,
    pub thresholds: ContentThresholds,
}

impl ContentReport {
    /// Both thresholds must be met; values equal to a threshold meet it.
    pub fn passes(&self) -> bool {
        self.char_count >= self.thresholds.min_length
            && self.word_count >= self.thresholds.min_words
    }

    /// Notice posted for this report. Failures carry a retry button keyed by
    /// the thread and its starter message.
    pub fn notice(&self, thread_id: &str, message_id: &str, ping_hint: &str) -> Notice {
        if self.passes() {
            return Notice::success("Your question meets all of the requirements.")
                .with_description(format!(
                    "A helper will help you as soon as possible. If your question doesn't \
                     receive any responses, feel free to run `{ping_hint}` to ping helpers \
                     to your thread."
                ));
        }
        Notice::error("We found some issues with your post.")
            .with_field(
                "Too short!",
                format!(
                    "Questions should be at least {} characters and {} words (currently at {} \
                     characters / {} words) and include all relevant details about the problem.",
                    self.thresholds.min_length,
                    self.thresholds.min_words,
                    self.char_count,
                    self.word_count
                ),
            )
            .with_button(NoticeButton::retry_content_check(thread_id, message_id))
    }
}

pub fn evaluate_content(content: &str, thresholds: ContentThresholds) -> ContentReport {
    ContentReport {
        char_count: content.chars().count(),
        word_count: content.split_whitespace().count(),
        thresholds,
    }
}
