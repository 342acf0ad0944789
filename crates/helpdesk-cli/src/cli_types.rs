use clap::ValueEnum;
use helpdesk_forum::RecordExpiryPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliRecordExpiry {
    Preserve,
    Refresh,
}

impl From<CliRecordExpiry> for RecordExpiryPolicy {
    fn from(value: CliRecordExpiry) -> Self {
        match value {
            CliRecordExpiry::Preserve => RecordExpiryPolicy::Preserve,
            CliRecordExpiry::Refresh => RecordExpiryPolicy::Refresh,
        }
    }
}

/// Admin user ids parsed from a comma-separated list; blank entries are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminIds(Vec<String>);

impl AdminIds {
    pub fn new(ids: Vec<String>) -> Self {
        Self(ids)
    }

    pub fn ids(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
