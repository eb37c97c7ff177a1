/// Invocation configuration, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeConfig {
    pub bucket: String,
    /// Named credential profile; `None` uses the default credential chain.
    pub profile: Option<String>,
    pub delete_bucket: bool,
}

impl PurgeConfig {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            profile: None,
            delete_bucket: false,
        }
    }

    pub fn with_profile(mut self, profile: Option<String>) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_delete_bucket(mut self, delete_bucket: bool) -> Self {
        self.delete_bucket = delete_bucket;
        self
    }
}
