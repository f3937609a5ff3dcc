use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use flashbook::{
    FlashbookError, Result, RetryConfig, RetryingGenerator, SummaryGenerator, SummaryRequest,
};

/// Mock generator that fails N times then succeeds.
struct FailThenSucceed {
    fail_count: AtomicU32,
    fail_with: fn() -> FlashbookError,
    total_calls: AtomicU32,
}

impl FailThenSucceed {
    fn new(failures: u32, fail_with: fn() -> FlashbookError) -> Self {
        Self {
            fail_count: AtomicU32::new(failures),
            fail_with,
            total_calls: AtomicU32::new(0),
        }
    }

    fn call_count(&self) -> u32 {
        self.total_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl SummaryGenerator for FailThenSucceed {
    fn name(&self) -> &str {
        "mock-retry"
    }

    async fn generate(&self, _request: &SummaryRequest) -> Result<String> {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        let remaining = self.fail_count.load(Ordering::Relaxed);
        if remaining > 0 {
            self.fail_count.fetch_sub(1, Ordering::Relaxed);
            return Err((self.fail_with)());
        }
        Ok("ok".into())
    }
}

fn fast_retry(attempts: u32) -> RetryConfig {
    RetryConfig::new()
        .max_attempts(attempts)
        .initial_delay(Duration::from_millis(1))
}

#[tokio::test]
async fn retries_on_transient_error_then_succeeds() {
    let inner = Arc::new(FailThenSucceed::new(2, || FlashbookError::RateLimited {
        retry_after: None,
    }));
    let generator = RetryingGenerator::new(inner.clone(), fast_retry(3));

    let result = generator.generate(&SummaryRequest::new("text")).await;

    assert_eq!(result.unwrap(), "ok");
    assert_eq!(inner.call_count(), 3); // 2 failures + 1 success
}

#[tokio::test]
async fn gives_up_after_max_attempts() {
    let inner = Arc::new(FailThenSucceed::new(10, || {
        FlashbookError::Http("connection reset".into())
    }));
    let generator = RetryingGenerator::new(inner.clone(), fast_retry(3));

    let result = generator.generate(&SummaryRequest::new("text")).await;

    assert!(matches!(result, Err(FlashbookError::Http(_))));
    assert_eq!(inner.call_count(), 3);
}

#[tokio::test]
async fn does_not_retry_permanent_errors() {
    let inner = Arc::new(FailThenSucceed::new(1, || {
        FlashbookError::AuthenticationFailed
    }));
    let generator = RetryingGenerator::new(inner.clone(), fast_retry(3));

    let result = generator.generate(&SummaryRequest::new("text")).await;

    assert!(matches!(result, Err(FlashbookError::AuthenticationFailed)));
    assert_eq!(inner.call_count(), 1);
}

#[tokio::test]
async fn does_not_retry_client_api_errors() {
    let inner = Arc::new(FailThenSucceed::new(1, || FlashbookError::Api {
        status: 400,
        message: "bad request".into(),
    }));
    let generator = RetryingGenerator::new(inner.clone(), fast_retry(3));

    assert!(generator.generate(&SummaryRequest::new("text")).await.is_err());
    assert_eq!(inner.call_count(), 1);
}

#[tokio::test]
async fn disabled_config_makes_single_attempt() {
    let inner = Arc::new(FailThenSucceed::new(1, || FlashbookError::Timeout(
        Duration::from_secs(1),
    )));
    let generator = RetryingGenerator::new(inner.clone(), RetryConfig::disabled());

    assert!(generator.generate(&SummaryRequest::new("text")).await.is_err());
    assert_eq!(inner.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn honours_retry_after_hint() {
    let inner = Arc::new(FailThenSucceed::new(1, || FlashbookError::RateLimited {
        retry_after: Some(Duration::from_secs(5)),
    }));
    let generator = RetryingGenerator::new(inner.clone(), fast_retry(2));

    let start = tokio::time::Instant::now();
    let result = generator.generate(&SummaryRequest::new("text")).await;

    assert!(result.is_ok());
    assert!(start.elapsed() >= Duration::from_secs(5));
    assert_eq!(inner.call_count(), 2);
}

#[tokio::test]
async fn decorator_keeps_inner_name() {
    let inner = Arc::new(FailThenSucceed::new(0, || FlashbookError::EmptyResponse));
    let generator = RetryingGenerator::new(inner, RetryConfig::default());
    assert_eq!(generator.name(), "mock-retry");
}
