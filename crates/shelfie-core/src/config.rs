//! Configuration module
//!
//! Submission configuration is read from the environment. Target boxes are
//! given as `WIDTHxHEIGHT` in landscape orientation; portrait sources get the
//! same boxes with the axes swapped.

use std::env;
use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_ORIGINAL_BOX: (u32, u32) = (1600, 1200);
const DEFAULT_RESIZED_BOX: (u32, u32) = (800, 600);
const DEFAULT_JPEG_QUALITY: u8 = 82;

/// Target pixel boxes and encoding quality for the two derived variants.
#[derive(Clone, Debug)]
pub struct ImageConfig {
    /// Landscape-orientation box for the full-size variant.
    pub original_box: (u32, u32),
    /// Landscape-orientation box for the display-size variant.
    pub resized_box: (u32, u32),
    pub jpeg_quality: u8,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            original_box: DEFAULT_ORIGINAL_BOX,
            resized_box: DEFAULT_RESIZED_BOX,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// How side-effect failures (goal linkage, achievement report) are treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SideEffectPolicy {
    /// Report through the notifier, keep the finished post.
    #[default]
    BestEffort,
    /// Treat as fatal: unwind the post via the compensating delete.
    Fatal,
}

/// Submission pipeline configuration.
#[derive(Clone, Debug, Default)]
pub struct SubmitConfig {
    pub image: ImageConfig,
    /// Deadline applied to each upload, document operation and external
    /// call. `None` imposes no pipeline-level deadline.
    pub operation_timeout: Option<Duration>,
    pub side_effect_policy: SideEffectPolicy,
    /// Base URL of the external achievement API; reports are skipped when
    /// unset.
    pub achievement_base_url: Option<String>,
    /// API key for the achievement API; reports are skipped when unset.
    pub achievement_api_key: Option<String>,
}

impl SubmitConfig {
    /// Load configuration from the environment (`.env` honored).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let image = ImageConfig {
            original_box: parse_box("SHELFIE_ORIGINAL_BOX", DEFAULT_ORIGINAL_BOX)?,
            resized_box: parse_box("SHELFIE_RESIZED_BOX", DEFAULT_RESIZED_BOX)?,
            jpeg_quality: parse_optional("SHELFIE_JPEG_QUALITY")?.unwrap_or(DEFAULT_JPEG_QUALITY),
        };

        let operation_timeout =
            parse_optional::<u64>("SHELFIE_OPERATION_TIMEOUT_SECS")?.map(Duration::from_secs);

        let side_effect_policy = match env::var("SHELFIE_SIDE_EFFECTS").ok().as_deref() {
            None | Some("best-effort") => SideEffectPolicy::BestEffort,
            Some("fatal") => SideEffectPolicy::Fatal,
            Some(other) => {
                return Err(ConfigError::InvalidVar {
                    var: "SHELFIE_SIDE_EFFECTS",
                    detail: format!("expected 'best-effort' or 'fatal', got '{}'", other),
                })
            }
        };

        Ok(SubmitConfig {
            image,
            operation_timeout,
            side_effect_policy,
            achievement_base_url: env::var("ACHIEVEMENT_API_URL").ok(),
            achievement_api_key: env::var("ACHIEVEMENT_API_KEY").ok(),
        })
    }
}

fn parse_optional<T: std::str::FromStr>(var: &'static str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidVar {
                var,
                detail: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

fn parse_box(var: &'static str, default: (u32, u32)) -> Result<(u32, u32), ConfigError> {
    let raw = match env::var(var) {
        Ok(raw) => raw,
        Err(_) => return Ok(default),
    };
    let invalid = |detail: String| ConfigError::InvalidVar { var, detail };
    let (w, h) = raw
        .split_once('x')
        .ok_or_else(|| invalid(format!("expected WIDTHxHEIGHT, got '{}'", raw)))?;
    let width = w.trim().parse::<u32>().map_err(|e| invalid(e.to_string()))?;
    let height = h.trim().parse::<u32>().map_err(|e| invalid(e.to_string()))?;
    if width == 0 || height == 0 {
        return Err(invalid("dimensions must be non-zero".to_string()));
    }
    Ok((width, height))
}
