/// Configuration for the client
///
/// Loaded from environment variables, with a `.env` file honored in
/// development.
///
/// # Environment Variables
///
/// - `TASKDECK_API_URL`: Base URL of the REST backend (required)
/// - `TASKDECK_TIMEOUT_SECS`: Per-request timeout (default: 30)
/// - `TASKDECK_PAGE_SIZE`: Default task page size (default: 8)
///
/// # Example
///
/// ```no_run
/// use taskdeck::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("talking to {}", config.api_url);
/// # Ok(())
/// # }
/// ```

use std::env;

/// Client configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the REST backend
    pub api_url: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Default page size for the task list
    pub task_page_size: usize,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `TASKDECK_API_URL` is missing or a numeric
    /// variable does not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_url = env::var("TASKDECK_API_URL")
            .map_err(|_| anyhow::anyhow!("TASKDECK_API_URL environment variable is required"))?;

        let request_timeout_secs = env::var("TASKDECK_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()?;

        let task_page_size = env::var("TASKDECK_PAGE_SIZE")
            .unwrap_or_else(|_| "8".to_string())
            .parse::<usize>()?;

        if task_page_size == 0 {
            anyhow::bail!("TASKDECK_PAGE_SIZE must be at least 1");
        }

        Ok(Self {
            api_url,
            request_timeout_secs,
            task_page_size,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: "http://localhost:8080".to_string(),
            request_timeout_secs: 30,
            task_page_size: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.task_page_size, 8);
        assert!(!config.api_url.is_empty());
    }
}
