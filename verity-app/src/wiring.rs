use std::sync::Arc;
use std::time::Duration;
use verity_common::{Result, VerityError};
use verity_config::{HttpSettings, LlmProviderKind, SearchProviderKind, VeritySettings};
use verity_core::Analyzer;
use verity_http::HttpClient;
use verity_llm::{
    CompletionOpts, DEFAULT_GROQ_MODEL, DEFAULT_OLLAMA_MODEL, DEFAULT_OPENAI_MODEL, LlmClient,
    ollama::{DEFAULT_OLLAMA_ENDPOINT, OllamaClient},
    openai::{ChatCompletionsClient, GROQ_API_BASE, OPENAI_API_BASE},
};
use verity_search::{
    SearchProvider,
    brave::{BRAVE_API_BASE, BraveSearch},
    duckduckgo::{DEFAULT_DUCKDUCKGO_ENDPOINT, DuckDuckGo},
};

fn http_client(base: &str, cfg: &HttpSettings) -> Result<HttpClient> {
    let base = if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{base}/")
    };
    let client = HttpClient::new(&base)
        .map_err(|e| VerityError::Config(format!("invalid endpoint {base}: {e}")))?
        .with_timeout(Duration::from_secs(cfg.timeout_secs))
        .with_retries(cfg.retries);
    Ok(client)
}

pub fn build_search_provider(cfg: &VeritySettings) -> Result<Arc<dyn SearchProvider>> {
    let search = &cfg.search;
    match search.provider {
        SearchProviderKind::DuckDuckGo => {
            let base = search
                .endpoint
                .as_deref()
                .unwrap_or(DEFAULT_DUCKDUCKGO_ENDPOINT);
            Ok(Arc::new(DuckDuckGo::new(http_client(base, &cfg.http)?)))
        }
        SearchProviderKind::Brave => {
            let base = search.endpoint.as_deref().unwrap_or(BRAVE_API_BASE);
            let token = search.resolved_api_key().unwrap_or_default();
            let client = BraveSearch::new(http_client(base, &cfg.http)?, token)?;
            Ok(Arc::new(client))
        }
    }
}

pub fn build_llm_client(cfg: &VeritySettings) -> Result<Arc<dyn LlmClient>> {
    let llm = &cfg.llm;
    let model = |default: &str| llm.model.clone().unwrap_or_else(|| default.to_string());

    let client: Arc<dyn LlmClient> = match llm.provider {
        LlmProviderKind::Groq | LlmProviderKind::OpenAi => {
            let (label, base, default_model) = match llm.provider {
                LlmProviderKind::Groq => ("Groq", GROQ_API_BASE, DEFAULT_GROQ_MODEL),
                _ => ("OpenAI", OPENAI_API_BASE, DEFAULT_OPENAI_MODEL),
            };
            let key = llm.resolved_api_key().unwrap_or_else(|| {
                tracing::warn!(
                    provider = label,
                    env = llm.provider.key_env().unwrap_or_default(),
                    "llm.api_key_missing"
                );
                String::new()
            });
            let http = http_client(llm.endpoint.as_deref().unwrap_or(base), &cfg.http)?;
            Arc::new(ChatCompletionsClient::new(
                http,
                label,
                key,
                model(default_model),
            ))
        }
        LlmProviderKind::Ollama => {
            let base = llm.endpoint.as_deref().unwrap_or(DEFAULT_OLLAMA_ENDPOINT);
            Arc::new(OllamaClient::new(
                http_client(base, &cfg.http)?,
                model(DEFAULT_OLLAMA_MODEL),
            ))
        }
    };
    Ok(client)
}

/// Build both clients once and hand them to a shared [`Analyzer`].
pub fn build_analyzer(cfg: &VeritySettings) -> Result<Analyzer> {
    let search = build_search_provider(cfg)?;
    let llm = build_llm_client(cfg)?;
    tracing::info!(
        search = search.name(),
        llm = llm.provider_name(),
        model = llm.model_name(),
        "wiring.ready"
    );
    Ok(Analyzer::new(search, llm)
        .with_max_results(cfg.search.max_results)
        .with_timeout(Duration::from_secs(cfg.analysis.timeout_secs))
        .with_completion_opts(CompletionOpts {
            temperature: cfg.llm.temperature,
            max_tokens: cfg.llm.max_tokens,
        }))
}
