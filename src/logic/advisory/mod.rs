//! Crop recommendations: AI advisor first, static rule table as the floor.

mod parse;
mod prompt;
mod table;

pub use parse::parse_recommendations;
pub use prompt::{build_prompt, AdvisorPrompt};

use crate::config::{AdvisorMode, Config};
use crate::datasources::ChatAdvisorClient;
use crate::error::{KrishiError, Result};
use crate::models::{
    sort_recommendations, Advisory, AdvisoryMode, CropRecommendation, FarmContext,
};
use async_trait::async_trait;
use std::time::Duration;

pub const MAX_RECOMMENDATIONS: usize = 3;

const DEFAULT_ADVISOR_TIMEOUT: Duration = Duration::from_secs(30);

/// A remote model that answers crop questions.
#[async_trait]
pub trait CropAdvisor: Send + Sync {
    fn name(&self) -> &str;

    fn mode(&self) -> AdvisorMode;

    /// Raw reply text for the prompt.
    async fn complete(&self, prompt: &AdvisorPrompt) -> Result<String>;
}

/// Outcome of asking the advisor for structured recommendations.
#[derive(Debug, Clone, PartialEq)]
pub enum Delegation {
    /// Parsed, sorted and truncated
    Accepted(Vec<CropRecommendation>),
    /// The advisor answered but the reply was unusable
    Rejected(String),
    /// No reply: not configured, transport failure, timeout or empty content
    Unavailable(String),
}

pub struct AdvisoryEngine {
    advisor: Option<Box<dyn CropAdvisor>>,
    timeout: Duration,
}

impl Default for AdvisoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AdvisoryEngine {
    /// An engine that answers from the rule table only.
    pub fn new() -> Self {
        Self {
            advisor: None,
            timeout: DEFAULT_ADVISOR_TIMEOUT,
        }
    }

    pub fn from_config(config: &Config, client: &reqwest::Client) -> Self {
        match config.advisor_api() {
            Some(advisor) => {
                tracing::info!(
                    "AI advisor configured: {} ({} mode)",
                    advisor.model,
                    match advisor.mode {
                        AdvisorMode::Structured => "structured",
                        AdvisorMode::Narrative => "narrative",
                    }
                );
                Self::new()
                    .with_timeout(advisor.timeout())
                    .with_advisor(ChatAdvisorClient::new(client.clone(), advisor.clone()))
            }
            None => {
                tracing::info!("AI advisor not configured - using rule table recommendations");
                Self::new()
            }
        }
    }

    pub fn with_advisor(mut self, advisor: impl CropAdvisor + 'static) -> Self {
        self.advisor = Some(Box::new(advisor));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn advisor_name(&self) -> Option<&str> {
        self.advisor.as_deref().map(|a| a.name())
    }

    /// One to three recommendations for the context. Advisor failures never
    /// surface; only an empty rule table does.
    pub async fn recommend(&self, context: &FarmContext) -> Result<Advisory> {
        let mode = self.advisor.as_deref().map(|a| a.mode());

        if mode == Some(AdvisorMode::Narrative) {
            let narrative = self.narrate(context).await;
            return Ok(Advisory {
                recommendations: self.deterministic(context)?,
                mode: AdvisoryMode::Deterministic,
                narrative,
            });
        }

        match self.delegate(context).await {
            Delegation::Accepted(recommendations) => Ok(Advisory {
                recommendations,
                mode: AdvisoryMode::Delegated,
                narrative: None,
            }),
            Delegation::Rejected(reason) => {
                tracing::warn!("Advisor reply rejected, using rule table: {}", reason);
                self.deterministic_advisory(context)
            }
            Delegation::Unavailable(reason) => {
                if self.advisor.is_some() {
                    tracing::warn!("Advisor unavailable, using rule table: {}", reason);
                } else {
                    tracing::debug!("{}", reason);
                }
                self.deterministic_advisory(context)
            }
        }
    }

    async fn ask(&self, advisor: &dyn CropAdvisor, prompt: &AdvisorPrompt) -> Result<String> {
        tokio::time::timeout(self.timeout, advisor.complete(prompt))
            .await
            .unwrap_or_else(|_| {
                Err(KrishiError::Advisor(format!(
                    "{} timed out after {:?}",
                    advisor.name(),
                    self.timeout
                )))
            })
    }

    /// Asks the advisor for structured recommendations.
    pub async fn delegate(&self, context: &FarmContext) -> Delegation {
        let Some(advisor) = self.advisor.as_deref() else {
            return Delegation::Unavailable("Advisor not configured".into());
        };

        let prompt = build_prompt(context, AdvisorMode::Structured);
        let reply = match self.ask(advisor, &prompt).await {
            Ok(reply) => reply,
            Err(e) => return Delegation::Unavailable(e.to_string()),
        };

        match parse_recommendations(&reply) {
            Ok(mut recommendations) => {
                sort_recommendations(&mut recommendations);
                recommendations.truncate(MAX_RECOMMENDATIONS);
                tracing::debug!(
                    "{} recommended {}",
                    advisor.name(),
                    recommendations
                        .iter()
                        .map(|r| format!("{} ({}/acre)", r.name, r.earnings_per_acre))
                        .collect::<Vec<_>>()
                        .join(", ")
                );
                Delegation::Accepted(recommendations)
            }
            Err(e) => {
                tracing::debug!("Unparseable advisor reply: {}", reply);
                Delegation::Rejected(e.to_string())
            }
        }
    }

    /// Free-text advice for display. `None` when the advisor is absent or fails.
    pub async fn narrate(&self, context: &FarmContext) -> Option<String> {
        let advisor = self.advisor.as_deref()?;
        let prompt = build_prompt(context, AdvisorMode::Narrative);

        match self.ask(advisor, &prompt).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!("Advisor narrative unavailable: {}", e);
                None
            }
        }
    }

    fn deterministic_advisory(&self, context: &FarmContext) -> Result<Advisory> {
        Ok(Advisory {
            recommendations: self.deterministic(context)?,
            mode: AdvisoryMode::Deterministic,
            narrative: None,
        })
    }

    /// Rule table recommendations, sorted and capped.
    pub fn deterministic(&self, context: &FarmContext) -> Result<Vec<CropRecommendation>> {
        let template = table::template_for(context.season).ok_or_else(|| {
            KrishiError::NoRecommendations(format!("No crop template for {}", context.season))
        })?;

        let regional = context
            .coordinates
            .and_then(|c| table::regional_names(context.season, c.latitude));

        let names: &[&str] = match regional {
            Some(names) => names,
            None => std::slice::from_ref(&template.name),
        };

        let mut recommendations: Vec<CropRecommendation> = names
            .iter()
            .take(MAX_RECOMMENDATIONS)
            .enumerate()
            .map(|(rank, name)| {
                table::instantiate(template, name, table::score(template, rank, context))
            })
            .collect();

        if recommendations.is_empty() {
            return Err(KrishiError::NoRecommendations(format!(
                "Rule table produced nothing for {}",
                context.season
            )));
        }

        sort_recommendations(&mut recommendations);
        Ok(recommendations)
    }
}
