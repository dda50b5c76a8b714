/*!
 * Tests for the debounced summarization workflow
 */

use std::sync::Arc;
use std::time::Duration;

use briefly::capability::mock::{CapabilityCall, MockCapability};
use briefly::input::CharacterCount;
use briefly::{
    ControllerState, ReadyPhase, SummarizerOptions, SummaryFormat, SummaryLength, SummaryType,
    UiEvent,
};

use crate::common::{self, RecordingView, ViewEvent};

/// Test the full create -> summarize -> destroy cycle after the quiet period
#[tokio::test(start_paused = true)]
async fn test_summarize_afterQuietPeriod_shouldCreateSummarizeDestroyInOrder() {
    let host = MockCapability::readily();
    let view = Arc::new(RecordingView::default());
    let controller = common::controller_with(&host, &view);
    controller.initialize().await;

    controller.handle_event(UiEvent::TypeChanged(SummaryType::KeyPoints));
    controller.handle_event(UiEvent::FormatChanged(SummaryFormat::PlainText));
    controller.handle_event(UiEvent::LengthChanged(SummaryLength::Short));
    controller.handle_event(UiEvent::Input("Hello world".to_string()));
    common::advance_ms(2000).await;

    let expected_options =
        SummarizerOptions::new(SummaryType::KeyPoints, SummaryFormat::PlainText, SummaryLength::Short);
    assert_eq!(
        host.session_calls(),
        vec![
            CapabilityCall::Create(expected_options),
            CapabilityCall::Summarize("Hello world".to_string()),
            CapabilityCall::Destroy,
        ]
    );
    assert_eq!(host.live_sessions(), 0);
    assert_eq!(view.summaries(), vec!["[key-points/plain-text/short] Hello world".to_string()]);
}

/// Test that rapid events collapse into one summary of the last state
#[tokio::test(start_paused = true)]
async fn test_rapidEvents_withinQuietPeriod_shouldOnlySummarizeLastState() {
    let host = MockCapability::readily();
    let view = Arc::new(RecordingView::default());
    let controller = common::controller_with(&host, &view);
    controller.initialize().await;

    controller.handle_event(UiEvent::Input("first".to_string()));
    common::advance_ms(400).await;
    controller.handle_event(UiEvent::Input("second".to_string()));
    common::advance_ms(999).await;
    controller.handle_event(UiEvent::LengthChanged(SummaryLength::Long));

    common::advance_ms(999).await;
    assert!(host.session_calls().is_empty());

    common::advance_ms(1000).await;
    let expected_options = SummarizerOptions {
        length: SummaryLength::Long,
        ..SummarizerOptions::default()
    };
    assert_eq!(
        host.session_calls(),
        vec![
            CapabilityCall::Create(expected_options),
            CapabilityCall::Summarize("second".to_string()),
            CapabilityCall::Destroy,
        ]
    );
}

/// Test that the placeholder precedes the summary
#[tokio::test(start_paused = true)]
async fn test_summarize_shouldShowPlaceholderBeforeResult() {
    let host = MockCapability::readily();
    let view = Arc::new(RecordingView::default());
    let controller = common::controller_with(&host, &view);
    controller.initialize().await;

    controller.handle_event(UiEvent::Input("abc".to_string()));
    common::advance_ms(1500).await;

    assert_eq!(
        view.events(),
        vec![
            ViewEvent::CharacterCount(CharacterCount { count: 3, over_limit: false }),
            ViewEvent::Generating,
            ViewEvent::Summary("[key-points/markdown/medium] abc".to_string()),
        ]
    );
}

/// Test the over-limit boundary and that long text is still summarized
#[tokio::test(start_paused = true)]
async fn test_characterCount_aroundLimit_shouldFlagOnlyAboveLimit() {
    let host = MockCapability::readily();
    let view = Arc::new(RecordingView::default());
    let controller = common::controller_with(&host, &view);
    controller.initialize().await;

    controller.handle_event(UiEvent::Input("a".repeat(3999)));
    controller.handle_event(UiEvent::Input("a".repeat(4000)));
    controller.handle_event(UiEvent::Input("a".repeat(4001)));

    assert_eq!(
        view.character_counts(),
        vec![
            CharacterCount { count: 3999, over_limit: false },
            CharacterCount { count: 4000, over_limit: false },
            CharacterCount { count: 4001, over_limit: true },
        ]
    );
    assert!(controller.character_count().over_limit);

    common::advance_ms(1500).await;
    assert_eq!(view.summaries().len(), 1);
    assert!(host.session_calls().contains(&CapabilityCall::Summarize("a".repeat(4001))));
}

/// Test that changing a selector with no text still summarizes the empty input
#[tokio::test(start_paused = true)]
async fn test_lengthChange_withEmptyInput_shouldSummarizeEmptyText() {
    let host = MockCapability::readily();
    let view = Arc::new(RecordingView::default());
    let controller = common::controller_with(&host, &view);
    controller.initialize().await;

    controller.handle_event(UiEvent::LengthChanged(SummaryLength::Short));
    common::advance_ms(1500).await;

    assert!(host.session_calls().contains(&CapabilityCall::Summarize(String::new())));
    assert!(view.character_counts().is_empty());
}

/// Test that a failing re-check surfaces an error instead of a stuck placeholder
#[tokio::test(start_paused = true)]
async fn test_summarize_whenTierDropsAfterInit_shouldShowNotSupportedError() {
    let host = MockCapability::readily();
    let view = Arc::new(RecordingView::default());
    let controller = common::controller_with(&host, &view);
    controller.initialize().await;

    host.set_availability(briefly::Availability::No);
    controller.handle_event(UiEvent::Input("Hello".to_string()));
    common::advance_ms(1500).await;

    assert_eq!(view.errors(), vec!["AI Summarization is not supported".to_string()]);
    assert!(host.session_calls().is_empty());
    assert_eq!(controller.state(), ControllerState::Ready(ReadyPhase::Idle));

    let events = view.events();
    assert_eq!(events.last(), Some(&ViewEvent::Error("AI Summarization is not supported".to_string())));
}

/// Test that a summarize failure is shown and the session is still destroyed
#[tokio::test(start_paused = true)]
async fn test_summarize_withFailingHost_shouldShowErrorAndDestroySession() {
    let host = MockCapability::failing_summarize();
    let view = Arc::new(RecordingView::default());
    let controller = common::controller_with(&host, &view);
    controller.initialize().await;

    controller.handle_event(UiEvent::Input("Hello".to_string()));
    common::advance_ms(1500).await;

    assert_eq!(view.errors().len(), 1);
    assert!(view.errors()[0].contains("Simulated summarization failure"));
    assert_eq!(host.session_calls().last(), Some(&CapabilityCall::Destroy));
    assert_eq!(host.live_sessions(), 0);

    // The controller keeps accepting input afterwards
    controller.handle_event(UiEvent::Input("Again".to_string()));
    common::advance_ms(1500).await;
    assert_eq!(view.errors().len(), 2);
}

/// Test that a session creation failure is shown
#[tokio::test(start_paused = true)]
async fn test_summarize_withFailingCreate_shouldShowError() {
    let host = MockCapability::failing_create();
    let view = Arc::new(RecordingView::default());
    let controller = common::controller_with(&host, &view);
    controller.initialize().await;

    controller.handle_event(UiEvent::Input("Hello".to_string()));
    common::advance_ms(1500).await;

    assert_eq!(view.errors().len(), 1);
    assert!(view.summaries().is_empty());
    assert_eq!(controller.state(), ControllerState::Ready(ReadyPhase::Idle));
}

/// Test that overlapping runs are serialized and render in start order
#[tokio::test(start_paused = true)]
async fn test_overlappingRuns_shouldNeverHoldTwoSessions() {
    let host = MockCapability::slow(3000);
    let view = Arc::new(RecordingView::default());
    let controller = common::controller_with(&host, &view);
    controller.initialize().await;

    controller.handle_event(UiEvent::Input("A".to_string()));
    // First run fires at 1000 and is in flight until 4000
    common::advance_ms(1500).await;
    controller.handle_event(UiEvent::Input("B".to_string()));
    // Second run fires at 2500 while the first is still in flight
    common::advance_ms(1500).await;
    assert_eq!(controller.state(), ControllerState::Ready(ReadyPhase::Summarizing));

    common::advance_ms(10_000).await;

    assert_eq!(host.max_live_sessions(), 1);
    assert_eq!(
        view.summaries(),
        vec![
            "[key-points/markdown/medium] A".to_string(),
            "[key-points/markdown/medium] B".to_string(),
        ]
    );
    assert_eq!(
        host.session_calls(),
        vec![
            CapabilityCall::Create(SummarizerOptions::default()),
            CapabilityCall::Summarize("A".to_string()),
            CapabilityCall::Destroy,
            CapabilityCall::Create(SummarizerOptions::default()),
            CapabilityCall::Summarize("B".to_string()),
            CapabilityCall::Destroy,
        ]
    );
}

/// Test that download progress reaches the view before the summary
#[tokio::test(start_paused = true)]
async fn test_afterDownloadTier_shouldForwardProgressToView() {
    let host = MockCapability::after_download(3);
    let view = Arc::new(RecordingView::default());
    let controller = common::controller_with(&host, &view);
    controller.initialize().await;

    controller.handle_event(UiEvent::Input("Hello".to_string()));
    common::advance_ms(1500).await;

    let events = view.events();
    let progress: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            ViewEvent::DownloadProgress(progress) => Some(*progress),
            _ => None,
        })
        .collect();
    assert_eq!(progress.len(), 3);
    assert_eq!(progress.last().map(|p| p.fraction()), Some(1.0));
    assert!(matches!(events.last(), Some(ViewEvent::Summary(_))));

    // The model is cached now, a second run downloads nothing
    controller.handle_event(UiEvent::Input("Hello again".to_string()));
    common::advance_ms(1500).await;
    let progress_count = view
        .events()
        .iter()
        .filter(|event| matches!(event, ViewEvent::DownloadProgress(_)))
        .count();
    assert_eq!(progress_count, 3);
}

/// Test that wait_until_idle returns once the summary is shown
#[tokio::test(start_paused = true)]
async fn test_waitUntilIdle_shouldReturnAfterSummary() {
    let host = MockCapability::slow(200);
    let view = Arc::new(RecordingView::default());
    let controller = common::controller_with(&host, &view);
    controller.initialize().await;

    controller.handle_event(UiEvent::Input("Hello".to_string()));
    controller.wait_until_idle().await;

    assert_eq!(view.summaries().len(), 1);
    assert_eq!(controller.text(), "Hello");
}

/// Test that wait_until_idle resolves as soon as the last run settles
#[tokio::test(start_paused = true)]
async fn test_waitUntilIdle_shouldResolveWhenRunSettles() {
    let host = MockCapability::slow(500);
    let view = Arc::new(RecordingView::default());
    let controller = common::controller_with(&host, &view);
    controller.initialize().await;

    let started = tokio::time::Instant::now();
    controller.handle_event(UiEvent::Input("Hello".to_string()));
    controller.wait_until_idle().await;

    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(1500));
    assert!(elapsed < Duration::from_millis(1510));
    assert_eq!(view.summaries().len(), 1);
}

/// Test that wait_until_idle returns right away when nothing is scheduled
#[tokio::test(start_paused = true)]
async fn test_waitUntilIdle_afterCancel_shouldReturnImmediately() {
    let host = MockCapability::readily();
    let view = Arc::new(RecordingView::default());
    let controller = common::controller_with(&host, &view);
    controller.initialize().await;

    let started = tokio::time::Instant::now();
    controller.wait_until_idle().await;
    controller.handle_event(UiEvent::Input("Hello".to_string()));
    controller.cancel_pending();
    controller.wait_until_idle().await;

    assert_eq!(started.elapsed(), Duration::ZERO);
    assert!(host.session_calls().is_empty());
}
