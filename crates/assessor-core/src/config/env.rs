use super::Config;

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_llm();
        self.apply_env_overrides_extraction();
        self.apply_env_overrides_pipeline();
    }

    fn apply_env_overrides_llm(&mut self) {
        if let Ok(v) = std::env::var("ASSESSOR_LLM_PROVIDER") {
            match v.parse() {
                Ok(kind) => self.llm.provider = kind,
                Err(_) => tracing::warn!("ignoring invalid ASSESSOR_LLM_PROVIDER value: {v}"),
            }
        }
        if let Ok(v) = std::env::var("ASSESSOR_LLM_MODEL") {
            self.llm.model = Some(v);
        }
        if let Ok(v) = std::env::var("ASSESSOR_LLM_BASE_URL") {
            self.llm.base_url = Some(v);
        }
        if let Ok(v) = std::env::var("ASSESSOR_LLM_TEMPERATURE")
            && let Ok(t) = v.parse::<f64>()
        {
            self.llm.temperature = t;
        }
        if let Ok(v) = std::env::var("ASSESSOR_LLM_MAX_TOKENS")
            && let Ok(n) = v.parse::<u32>()
        {
            self.llm.max_tokens = n;
        }
        if let Ok(v) = std::env::var("ASSESSOR_LLM_TOP_P")
            && let Ok(p) = v.parse::<f64>()
        {
            self.llm.top_p = p;
        }
    }

    fn apply_env_overrides_extraction(&mut self) {
        if let Ok(v) = std::env::var("ASSESSOR_EXTRACTION_MAX_ATTEMPTS")
            && let Ok(n) = v.parse::<u32>()
        {
            self.extraction.max_attempts = n;
        }
        if let Ok(v) = std::env::var("ASSESSOR_EXTRACTION_RETRY_DELAY_SECS")
            && let Ok(secs) = v.parse::<u64>()
        {
            self.extraction.retry_delay_secs = secs;
        }
        if let Ok(v) = std::env::var("ASSESSOR_EXTRACTION_ATTEMPT_TIMEOUT_SECS")
            && let Ok(secs) = v.parse::<u64>()
        {
            self.extraction.attempt_timeout_secs = secs;
        }
        if let Ok(v) = std::env::var("ASSESSOR_EXTRACTION_RETRY_PARSE_ERRORS")
            && let Ok(retry) = v.parse::<bool>()
        {
            self.extraction.retry_parse_errors = retry;
        }
    }

    fn apply_env_overrides_pipeline(&mut self) {
        if let Ok(v) = std::env::var("ASSESSOR_PIPELINE_INPUT") {
            self.pipeline.input = v.into();
        }
        if let Ok(v) = std::env::var("ASSESSOR_PIPELINE_OUTPUT") {
            self.pipeline.output = v.into();
        }
        if let Ok(v) = std::env::var("ASSESSOR_PIPELINE_CONCURRENCY")
            && let Ok(n) = v.parse::<usize>()
        {
            self.pipeline.concurrency = n;
        }
    }
}
