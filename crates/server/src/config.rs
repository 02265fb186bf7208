// crates/server/src/config.rs
//! Runtime configuration, read once from the environment at startup.

/// Default port for the server.
const DEFAULT_PORT: u16 = 8000;

/// Default batch size substituted for the requested count in demo mode.
const DEFAULT_DEMO_RECORDS_PER_JOB: u32 = 1000;

/// Server settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    /// When true, job creation ignores the requested record count and uses
    /// `demo_records_per_job` so every demo run has a sizable dataset.
    pub demo_mode: bool,
    pub demo_records_per_job: u32,
}

impl Settings {
    /// Load settings from the environment.
    ///
    /// - `PROVIDER_PULSE_PORT` or `PORT` — listen port (default 8000)
    /// - `DEMO_MODE` — "false"/"0" disables demo-mode count override (default on)
    /// - `DEMO_RECORDS_PER_JOB` — records per job in demo mode (default 1000)
    pub fn from_env() -> Self {
        let port = std::env::var("PROVIDER_PULSE_PORT")
            .ok()
            .or_else(|| std::env::var("PORT").ok())
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let demo_mode = std::env::var("DEMO_MODE")
            .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "false" | "0"))
            .unwrap_or(true);

        let demo_records_per_job = std::env::var("DEMO_RECORDS_PER_JOB")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_DEMO_RECORDS_PER_JOB);

        Self {
            port,
            demo_mode,
            demo_records_per_job,
        }
    }

    /// Effective record count for a new job given the requested count.
    pub fn effective_total_records(&self, requested: u32) -> u32 {
        if self.demo_mode {
            self.demo_records_per_job
        } else {
            requested
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            demo_mode: true,
            demo_records_per_job: DEFAULT_DEMO_RECORDS_PER_JOB,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_mode_overrides_requested_count() {
        let settings = Settings {
            demo_mode: true,
            demo_records_per_job: 1000,
            ..Settings::default()
        };
        assert_eq!(settings.effective_total_records(10), 1000);
    }

    #[test]
    fn test_requested_count_honored_outside_demo_mode() {
        let settings = Settings {
            demo_mode: false,
            ..Settings::default()
        };
        assert_eq!(settings.effective_total_records(10), 10);
    }
}
