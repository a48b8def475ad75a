//! Profile photo replacement.

use tracing::{debug, warn};

use xpert_core::{defaults, Expert, PhotoLookup};

/// Replaces photo links that are missing or not served by the provider's
/// own media host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoPolicy {
    pub media_host: String,
}

impl Default for PhotoPolicy {
    fn default() -> Self {
        Self {
            media_host: defaults::PROVIDER_MEDIA_HOST.to_string(),
        }
    }
}

impl PhotoPolicy {
    /// | Variable | Default |
    /// |----------|---------|
    /// | `PROVIDER_MEDIA_HOST` | `media.licdn.com` |
    pub fn from_env() -> Self {
        Self {
            media_host: std::env::var("PROVIDER_MEDIA_HOST")
                .ok()
                .filter(|h| !h.trim().is_empty())
                .unwrap_or_else(|| defaults::PROVIDER_MEDIA_HOST.to_string()),
        }
    }

    /// Whether the link already points at the provider's media host.
    pub fn is_trusted(&self, link: &str) -> bool {
        link.contains(&self.media_host)
    }

    /// Consult `lookup` when the expert's photo is absent or untrusted.
    ///
    /// Never fails: a lookup error or empty answer keeps the current value.
    /// Returns whether the link was replaced.
    pub async fn apply(&self, expert: &mut Expert, lookup: &dyn PhotoLookup) -> bool {
        let current = expert
            .profile_picture_link
            .as_deref()
            .filter(|l| !l.trim().is_empty());
        if current.is_some_and(|link| self.is_trusted(link)) {
            return false;
        }

        let found = lookup
            .find_photo(
                &expert.name,
                expert.company.as_deref(),
                expert.profile_link.as_deref(),
            )
            .await;

        match found {
            Ok(Some(found)) if !found.trim().is_empty() => {
                debug!(expert_id = %expert.id, "Replaced profile photo");
                expert.profile_picture_link = Some(found);
                true
            }
            Ok(_) => false,
            Err(e) => {
                warn!(expert_id = %expert.id, error = %e, "Photo lookup failed, keeping original");
                false
            }
        }
    }
}
