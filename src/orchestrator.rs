//! Engine: the four operations exposed to callers.
//!
//! Analysis runs on a blocking worker under a wall-clock deadline. When the
//! deadline passes the engine cancels the worker's token, so it stops at the
//! next detector boundary, and returns a degraded result without waiting.
//! The classifier is consulted only once the rule-based result is complete,
//! under its own budget; when it fails or runs late only `aiAnalysis` falls
//! back to the neutral verdict.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::analyzer::{AnalysisResult, Analyzer, EngineError};
use crate::classifier::{self, AiAnalysis, QualityClassifier};
use crate::history::{History, HistoryRecord};
use crate::language::Language;
use crate::library::PatternLibrary;
use crate::scaffold;
use crate::transform::{self, Mode, TransformOutcome};

/// Deadline for one analysis.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Entry point tying the pattern library to its optional collaborators.
#[derive(Clone)]
pub struct Engine {
    library: Arc<PatternLibrary>,
    classifier: Option<Arc<dyn QualityClassifier>>,
    history: Option<Arc<History>>,
    timeout: Duration,
    classifier_budget: Duration,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(PatternLibrary::shared())
    }
}

impl Engine {
    pub fn new(library: Arc<PatternLibrary>) -> Self {
        Self {
            library,
            classifier: None,
            history: None,
            timeout: DEFAULT_TIMEOUT,
            classifier_budget: classifier::DEFAULT_BUDGET,
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn QualityClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn with_history(mut self, history: Arc<History>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Time the classifier gets per snippet.
    pub fn with_classifier_budget(mut self, budget: Duration) -> Self {
        self.classifier_budget = budget;
        self
    }

    pub fn library(&self) -> &PatternLibrary {
        &self.library
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Analyze `code` under the deadline.
    ///
    /// Fails only for a language with no rule set. Timeouts and crashes come
    /// back as degraded results flagged `partial_result`.
    pub async fn analyze(
        &self,
        code: &str,
        language: &str,
        user_id: Option<&str>,
    ) -> Result<AnalysisResult, EngineError> {
        let language: Language = language.parse()?;
        if self.library.get(language).is_none() {
            return Err(EngineError::MissingRuleSet(language));
        }

        let token = CancellationToken::new();
        let worker = {
            let library = Arc::clone(&self.library);
            let token = token.clone();
            let code = code.to_string();
            tokio::task::spawn_blocking(move || {
                let rules = library
                    .get(language)
                    .ok_or(EngineError::MissingRuleSet(language))?;
                Analyzer::new(rules).with_cancellation(token).run(&code)
            })
        };

        let mut result = match tokio::time::timeout(self.timeout, worker).await {
            Ok(Ok(Ok(result))) => result,
            Ok(Ok(Err(EngineError::Cancelled))) => AnalysisResult::timed_out(language),
            Ok(Ok(Err(e))) => return Err(e),
            Ok(Err(join_error)) => {
                error!(%language, error = %join_error, "analysis worker crashed");
                AnalysisResult::failed(language)
            }
            Err(_) => {
                token.cancel();
                warn!(
                    %language,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "analysis exceeded its deadline, returning partial result"
                );
                AnalysisResult::timed_out(language)
            }
        };

        if let (Some(model), false) = (&self.classifier, result.partial) {
            result.ai_analysis = Some(self.assess(model, code).await);
        }

        debug!(%language, issues = result.issues.len(), partial = result.partial, "analysis finished");
        if let Some(history) = &self.history {
            let history = Arc::clone(history);
            let record = HistoryRecord::new(user_id, language.as_str(), code, result.clone());
            if let Err(e) = tokio::task::spawn_blocking(move || history.record(&record)).await {
                warn!(error = %e, "history writer crashed, record dropped");
            }
        }
        Ok(result)
    }

    /// Classifier verdict within the budget, else the neutral fallback.
    async fn assess(&self, model: &Arc<dyn QualityClassifier>, code: &str) -> AiAnalysis {
        let call = {
            let model = Arc::clone(model);
            let code = code.to_string();
            tokio::task::spawn_blocking(move || classifier::assess(Some(model.as_ref()), &code))
        };
        match tokio::time::timeout(self.classifier_budget, call).await {
            Ok(Ok(verdict)) => verdict,
            Ok(Err(join_error)) => {
                warn!(error = %join_error, "quality classifier crashed, using neutral fallback");
                AiAnalysis::failed()
            }
            Err(_) => {
                warn!(
                    budget_ms = self.classifier_budget.as_millis() as u64,
                    "quality classifier exceeded its budget, using neutral fallback"
                );
                AiAnalysis::failed()
            }
        }
    }

    /// [`Engine::analyze`] for callers outside an async runtime.
    pub fn analyze_blocking(
        &self,
        code: &str,
        language: &str,
        user_id: Option<&str>,
    ) -> anyhow::Result<AnalysisResult> {
        let runtime = tokio::runtime::Runtime::new()?;
        let result = runtime.block_on(self.analyze(code, language, user_id));
        // A timed-out worker finishes on its own once it sees the cancelled token.
        runtime.shutdown_background();
        Ok(result?)
    }

    /// Scaffold for the first routine. Unsupported languages get a
    /// framework-free placeholder.
    pub fn generate_tests(&self, code: &str, language: &str) -> String {
        scaffold::generate_tests(code, language)
    }

    /// Corrective rewrites. Unsupported languages pass through unchanged.
    pub fn fix(&self, code: &str, language: &str) -> TransformOutcome {
        self.transform(code, language, Mode::Fix)
    }

    /// Corrective then modernizing rewrites.
    pub fn enhance(&self, code: &str, language: &str) -> TransformOutcome {
        self.transform(code, language, Mode::Enhance)
    }

    fn transform(&self, code: &str, language: &str, mode: Mode) -> TransformOutcome {
        let outcome = transform::transform(&self.library, code, language, mode);
        info!(
            language,
            mode = mode.as_str(),
            improvements = outcome.improvements.len(),
            "transformed code"
        );
        outcome
    }
}
