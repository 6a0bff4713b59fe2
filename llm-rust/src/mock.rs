//! An in-process [`LanguageModel`] for tests: replies come from a queue and
//! every input is recorded.
use std::{collections::VecDeque, sync::Mutex};

use crate::{
    LanguageModel, LanguageModelError, LanguageModelInput, LanguageModelResult, ModelResponse,
    Part,
};

/// Result for a mocked `generate` call.
/// It can either be a full response or an error to return.
pub enum MockGenerateResult {
    Response(ModelResponse),
    Error(LanguageModelError),
}

impl MockGenerateResult {
    /// Construct a result that yields the provided response.
    pub fn response(response: ModelResponse) -> Self {
        Self::Response(response)
    }

    /// Construct a result that yields a response made of a single text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Response(ModelResponse {
            content: vec![Part::text(text)],
            ..Default::default()
        })
    }

    /// Construct a result that yields the provided error.
    pub fn error(error: LanguageModelError) -> Self {
        Self::Error(error)
    }
}

impl From<ModelResponse> for MockGenerateResult {
    fn from(response: ModelResponse) -> Self {
        Self::response(response)
    }
}

#[derive(Default)]
struct MockLanguageModelState {
    mocked_generate_results: VecDeque<MockGenerateResult>,
    tracked_generate_inputs: Vec<LanguageModelInput>,
}

/// A mock language model for testing that tracks inputs and yields predefined outputs.
pub struct MockLanguageModel {
    provider: &'static str,
    model_id: String,
    state: Mutex<MockLanguageModelState>,
}

impl Default for MockLanguageModel {
    fn default() -> Self {
        Self {
            provider: "mock",
            model_id: "mock-model".to_string(),
            state: Mutex::new(MockLanguageModelState::default()),
        }
    }
}

impl MockLanguageModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a single mocked generate result.
    ///
    /// # Panics
    /// If the internal state mutex is poisoned.
    pub fn enqueue_generate<R>(&self, result: R) -> &Self
    where
        R: Into<MockGenerateResult>,
    {
        self.state
            .lock()
            .expect("mock state poisoned")
            .mocked_generate_results
            .push_back(result.into());
        self
    }

    /// Retrieve the tracked generate inputs accumulated so far.
    ///
    /// # Panics
    /// If the internal state mutex is poisoned.
    #[must_use]
    pub fn tracked_generate_inputs(&self) -> Vec<LanguageModelInput> {
        let state = self.state.lock().expect("mock state poisoned");
        state.tracked_generate_inputs.clone()
    }

    /// Number of `generate` calls made so far.
    #[must_use]
    pub fn generate_calls(&self) -> usize {
        self.tracked_generate_inputs().len()
    }
}

#[async_trait::async_trait]
impl LanguageModel for MockLanguageModel {
    fn provider(&self) -> &'static str {
        self.provider
    }

    fn model_id(&self) -> String {
        self.model_id.clone()
    }

    async fn generate(&self, input: LanguageModelInput) -> LanguageModelResult<ModelResponse> {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.tracked_generate_inputs.push(input);

        let result = state.mocked_generate_results.pop_front().ok_or_else(|| {
            LanguageModelError::Invariant(
                self.provider,
                "no mocked generate results available".into(),
            )
        })?;

        match result {
            MockGenerateResult::Response(response) => Ok(response),
            MockGenerateResult::Error(error) => Err(error),
        }
    }
}
