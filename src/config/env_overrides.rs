use super::Config;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) =
            std::env::var("SKINSIGHT_API_KEY").or_else(|_| std::env::var("OPENAI_API_KEY"))
            && !key.is_empty()
        {
            self.provider.api_key = Some(key);
        }

        if let Ok(model) = std::env::var("SKINSIGHT_MODEL")
            && !model.is_empty()
        {
            self.provider.model = model;
        }

        if let Ok(base_url) = std::env::var("SKINSIGHT_BASE_URL")
            && !base_url.is_empty()
        {
            self.provider.base_url = base_url;
        }

        if let Ok(attempts_str) = std::env::var("SKINSIGHT_MAX_ATTEMPTS")
            && let Ok(attempts) = attempts_str.parse::<u32>()
        {
            self.analysis.max_attempts = attempts;
        }

        if let Ok(data_dir) = std::env::var("SKINSIGHT_DATA_DIR")
            && !data_dir.is_empty()
        {
            self.storage.data_dir = data_dir;
        }
    }
}
