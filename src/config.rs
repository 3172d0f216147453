//! Configuration of the sweep trigger and the query surface.
//!
//! The sweep itself is a plain function; an external scheduler (host
//! cron or an in-process timer) is expected to call it once a day at
//! `sweep_time` in `timezone`. Keeping "when" out of the library keeps
//! the sweep synchronously invocable from tests.

use chrono::{NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Number of business days before the anniversary at which a
    /// shipment becomes ready to ship
    pub lead_business_days: u32,
    /// Local wall-clock time at which the host scheduler should invoke
    /// the sweep
    pub sweep_time: NaiveTime,
    pub timezone: Tz,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            lead_business_days: 7,
            sweep_time: NaiveTime::from_hms_opt(6, 0, 0).expect("valid sweep time"),
            timezone: chrono_tz::America::Sao_Paulo,
        }
    }
}

impl SchedulerConfig {
    /// Today's date in the configured timezone
    pub fn local_today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct QueryLimits {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        QueryLimits {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scheduler_config() {
        let config = SchedulerConfig::default();
        assert_eq!(config.lead_business_days, 7);
        assert_eq!(config.sweep_time, NaiveTime::from_hms_opt(6, 0, 0).unwrap());
        assert_eq!(config.timezone, chrono_tz::America::Sao_Paulo);
    }

    #[test]
    fn config_deserializes_with_partial_overrides() {
        let config: SchedulerConfig =
            serde_json::from_str(r#"{ "lead_business_days": 10 }"#).unwrap();
        assert_eq!(config.lead_business_days, 10);
        assert_eq!(config.timezone, chrono_tz::America::Sao_Paulo);
        let limits: QueryLimits = serde_json::from_str(r#"{ "max_page_size": 50 }"#).unwrap();
        assert_eq!(limits.max_page_size, 50);
        assert_eq!(limits.default_page_size, 20);
    }
}
