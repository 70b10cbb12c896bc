use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

use crate::{
    errors::{ServiceError, ServiceResult},
    service::{AssistantService, ExecutionService, IllustrationService},
    AssistantRequest, AssistantResponse, ExecutionRequest, ExecutionResponse, IllustrationRequest,
    IllustrationResponse, ViewType,
};

/// Result for a mocked service call.
/// It can either be a full response or an error to return.
pub enum MockResult<T> {
    Response(T),
    Error(ServiceError),
}

impl<T> MockResult<T> {
    /// Construct a result that yields the provided response.
    pub fn response(response: T) -> Self {
        Self::Response(response)
    }

    /// Construct a result that yields the provided error.
    pub fn error(error: ServiceError) -> Self {
        Self::Error(error)
    }

    fn into_result(self) -> ServiceResult<T> {
        match self {
            Self::Response(response) => Ok(response),
            Self::Error(error) => Err(error),
        }
    }
}

impl<T> From<ServiceResult<T>> for MockResult<T> {
    fn from(result: ServiceResult<T>) -> Self {
        match result {
            Ok(response) => Self::Response(response),
            Err(error) => Self::Error(error),
        }
    }
}

impl From<AssistantResponse> for MockResult<AssistantResponse> {
    fn from(response: AssistantResponse) -> Self {
        Self::response(response)
    }
}

impl From<ExecutionResponse> for MockResult<ExecutionResponse> {
    fn from(response: ExecutionResponse) -> Self {
        Self::response(response)
    }
}

impl From<IllustrationResponse> for MockResult<IllustrationResponse> {
    fn from(response: IllustrationResponse) -> Self {
        Self::response(response)
    }
}

struct MockState<Req, Res> {
    mocked_results: VecDeque<MockResult<Res>>,
    tracked_requests: Vec<Req>,
}

impl<Req, Res> Default for MockState<Req, Res> {
    fn default() -> Self {
        Self {
            mocked_results: VecDeque::new(),
            tracked_requests: Vec::new(),
        }
    }
}

impl<Req, Res> MockState<Req, Res> {
    fn reset(&mut self) {
        self.tracked_requests.clear();
    }

    fn restore(&mut self) {
        self.mocked_results.clear();
        self.reset();
    }

    fn next(&mut self, provider: &'static str, request: Req) -> ServiceResult<Res> {
        self.tracked_requests.push(request);
        self.mocked_results
            .pop_front()
            .ok_or_else(|| {
                ServiceError::Invariant(provider, "no mocked results available".into())
            })?
            .into_result()
    }
}

/// A mock assistant for testing that tracks requests and yields predefined
/// responses in order.
#[derive(Default)]
pub struct MockAssistant {
    state: Mutex<MockState<AssistantRequest, AssistantResponse>>,
}

impl MockAssistant {
    /// Construct a new mock assistant instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue one or more mocked results.
    pub fn enqueue_results<I>(&self, results: I) -> &Self
    where
        I: IntoIterator<Item = MockResult<AssistantResponse>>,
    {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.mocked_results.extend(results);
        drop(state);
        self
    }

    /// Convenience to enqueue a single mocked result.
    pub fn enqueue<R>(&self, result: R) -> &Self
    where
        R: Into<MockResult<AssistantResponse>>,
    {
        self.enqueue_results(std::iter::once(result.into()))
    }

    /// Convenience to enqueue a reply with the given text content.
    pub fn enqueue_text(&self, content: impl Into<String>) -> &Self {
        self.enqueue(AssistantResponse {
            content: content.into(),
            ..AssistantResponse::default()
        })
    }

    /// Retrieve the tracked requests accumulated so far.
    pub fn tracked_requests(&self) -> Vec<AssistantRequest> {
        let state = self.state.lock().expect("mock state poisoned");
        state.tracked_requests.clone()
    }

    /// Reset tracked requests without touching enqueued results.
    pub fn reset(&self) {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.reset();
    }

    /// Clear both tracked requests and enqueued results.
    pub fn restore(&self) {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.restore();
    }
}

#[async_trait::async_trait]
impl AssistantService for MockAssistant {
    fn provider(&self) -> &'static str {
        "mock"
    }

    async fn complete(&self, request: AssistantRequest) -> ServiceResult<AssistantResponse> {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.next(self.provider(), request)
    }
}

/// A mock execution backend for testing.
#[derive(Default)]
pub struct MockExecutor {
    state: Mutex<MockState<ExecutionRequest, ExecutionResponse>>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue_results<I>(&self, results: I) -> &Self
    where
        I: IntoIterator<Item = MockResult<ExecutionResponse>>,
    {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.mocked_results.extend(results);
        drop(state);
        self
    }

    pub fn enqueue<R>(&self, result: R) -> &Self
    where
        R: Into<MockResult<ExecutionResponse>>,
    {
        self.enqueue_results(std::iter::once(result.into()))
    }

    /// Enqueue a failed run reporting `error`.
    pub fn enqueue_failure(&self, error: impl Into<String>) -> &Self {
        self.enqueue(ExecutionResponse {
            success: false,
            error: Some(error.into()),
            ..ExecutionResponse::default()
        })
    }

    pub fn tracked_requests(&self) -> Vec<ExecutionRequest> {
        let state = self.state.lock().expect("mock state poisoned");
        state.tracked_requests.clone()
    }

    pub fn reset(&self) {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.reset();
    }

    pub fn restore(&self) {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.restore();
    }
}

#[async_trait::async_trait]
impl ExecutionService for MockExecutor {
    fn provider(&self) -> &'static str {
        "mock"
    }

    async fn execute(&self, request: ExecutionRequest) -> ServiceResult<ExecutionResponse> {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.next(self.provider(), request)
    }
}

#[derive(Default)]
struct MockIllustratorState {
    per_view: HashMap<ViewType, VecDeque<MockResult<IllustrationResponse>>>,
    inner: MockState<IllustrationRequest, IllustrationResponse>,
}

/// A mock illustrator. Requests for the same batch arrive concurrently, so
/// results can be keyed by view type; a view without its own result falls
/// back to the shared queue.
#[derive(Default)]
pub struct MockIllustrator {
    state: Mutex<MockIllustratorState>,
}

impl MockIllustrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue<R>(&self, result: R) -> &Self
    where
        R: Into<MockResult<IllustrationResponse>>,
    {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.inner.mocked_results.push_back(result.into());
        drop(state);
        self
    }

    /// Enqueue a result served only to requests for `view_type`.
    pub fn enqueue_for<R>(&self, view_type: ViewType, result: R) -> &Self
    where
        R: Into<MockResult<IllustrationResponse>>,
    {
        let mut state = self.state.lock().expect("mock state poisoned");
        state
            .per_view
            .entry(view_type)
            .or_default()
            .push_back(result.into());
        drop(state);
        self
    }

    pub fn tracked_requests(&self) -> Vec<IllustrationRequest> {
        let state = self.state.lock().expect("mock state poisoned");
        state.inner.tracked_requests.clone()
    }

    pub fn reset(&self) {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.inner.reset();
    }

    pub fn restore(&self) {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.per_view.clear();
        state.inner.restore();
    }
}

#[async_trait::async_trait]
impl IllustrationService for MockIllustrator {
    fn provider(&self) -> &'static str {
        "mock"
    }

    async fn illustrate(
        &self,
        request: IllustrationRequest,
    ) -> ServiceResult<IllustrationResponse> {
        let mut state = self.state.lock().expect("mock state poisoned");
        let keyed = state
            .per_view
            .get_mut(&request.view_type)
            .and_then(VecDeque::pop_front);

        match keyed {
            Some(result) => {
                state.inner.tracked_requests.push(request);
                result.into_result()
            }
            None => state.inner.next(self.provider(), request),
        }
    }
}
