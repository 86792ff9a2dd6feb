use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails with a configuration error if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub ollama_host: String,
    pub llm_model: String,
    pub embedding_model: String,
    pub embedding_fallback_model: String,
    pub embedding_dimension: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub embedding_batch_size: usize,
    pub similarity_threshold: f32,
    pub top_k_default: usize,
    /// "pinecone" or "local"
    pub vector_backend: String,
    pub pinecone_api_key: String,
    pub pinecone_it_host: String,
    pub pinecone_non_it_host: String,
    pub local_index_dir: String,
    pub min_resume_text_len: usize,
    pub extract_concurrency: usize,
    pub resume_deadline_secs: u64,
    pub shutdown_grace_secs: u64,
    pub timeout_default_secs: u64,
    pub timeout_domain_secs: u64,
    pub timeout_skills_secs: u64,
    pub timeout_name_secs: u64,
    pub timeout_location_secs: u64,
    pub job_cache_capacity: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let vector_backend =
            std::env::var("VECTOR_BACKEND").unwrap_or_else(|_| "pinecone".to_string());

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", 10)?,
            ollama_host: std::env::var("OLLAMA_HOST")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            llm_model: std::env::var("LLM_MODEL").unwrap_or_else(|_| "llama3.1".to_string()),
            embedding_model: std::env::var("EMBEDDING_MODEL")
                .unwrap_or_else(|_| "nomic-embed-text".to_string()),
            embedding_fallback_model: std::env::var("EMBEDDING_FALLBACK_MODEL")
                .unwrap_or_else(|_| "mxbai-embed-large".to_string()),
            embedding_dimension: parse_env("EMBEDDING_DIMENSION", 768)?,
            chunk_size: parse_env("CHUNK_SIZE", 1000)?,
            chunk_overlap: parse_env("CHUNK_OVERLAP", 200)?,
            embedding_batch_size: parse_env("EMBEDDING_BATCH_SIZE", 10)?,
            similarity_threshold: parse_env("SIMILARITY_THRESHOLD", 0.3)?,
            top_k_default: parse_env("TOP_K_DEFAULT", 20)?,
            pinecone_api_key: if vector_backend == "pinecone" {
                require_env("PINECONE_API_KEY")?
            } else {
                std::env::var("PINECONE_API_KEY").unwrap_or_default()
            },
            pinecone_it_host: std::env::var("PINECONE_IT_HOST").unwrap_or_default(),
            pinecone_non_it_host: std::env::var("PINECONE_NON_IT_HOST").unwrap_or_default(),
            local_index_dir: std::env::var("LOCAL_INDEX_DIR")
                .unwrap_or_else(|_| "./vector-index".to_string()),
            vector_backend,
            min_resume_text_len: parse_env("MIN_RESUME_TEXT_LEN", 100)?,
            extract_concurrency: parse_env("EXTRACT_CONCURRENCY", 8)?,
            resume_deadline_secs: parse_env("RESUME_DEADLINE_SECS", 900)?,
            shutdown_grace_secs: parse_env("SHUTDOWN_GRACE_SECS", 10)?,
            timeout_default_secs: parse_env("TIMEOUT_DEFAULT_SECS", 90)?,
            timeout_domain_secs: parse_env("TIMEOUT_DOMAIN_SECS", 120)?,
            timeout_skills_secs: parse_env("TIMEOUT_SKILLS_SECS", 120)?,
            timeout_name_secs: parse_env("TIMEOUT_NAME_SECS", 90)?,
            timeout_location_secs: parse_env("TIMEOUT_LOCATION_SECS", 90)?,
            job_cache_capacity: parse_env("JOB_CACHE_CAPACITY", 100)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value")),
        Err(_) => Ok(default),
    }
}
