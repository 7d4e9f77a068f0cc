//! `/probe` query validation rules.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use streamstats_core::{ErrorKind, ProbeRequest, DEFAULT_PERIOD, DEFAULT_STREAMING_SECONDS, MAX_PERIOD};

#[test]
fn defaults_when_absent() {
    let req = ProbeRequest::from_query(Some("rtmp://good.example/live"), None, None).unwrap();
    assert_eq!(req.target(), "rtmp://good.example/live");
    assert_eq!(req.period(), DEFAULT_PERIOD);
    assert_eq!(req.streaming_seconds(), DEFAULT_STREAMING_SECONDS);
}

#[test]
fn zero_values_take_defaults() {
    let req = ProbeRequest::from_query(Some("rtmp://a/b"), Some("0s"), Some("0")).unwrap();
    assert_eq!(req.period(), Duration::from_secs(5));
    assert_eq!(req.streaming_seconds().get(), 5);

    let req = ProbeRequest::from_query(Some("rtmp://a/b"), Some("0"), Some("")).unwrap();
    assert_eq!(req.period(), Duration::from_secs(5));
}

#[test]
fn explicit_values() {
    let req = ProbeRequest::from_query(Some("rtmp://a/b"), Some("1m30s"), Some("12")).unwrap();
    assert_eq!(req.period(), Duration::from_secs(90));
    assert_eq!(req.streaming_seconds().get(), 12);

    let req = ProbeRequest::from_query(Some("rtmp://a/b"), Some("1500ms"), None).unwrap();
    assert_eq!(req.period(), Duration::from_millis(1500));
}

#[test]
fn missing_target_rejected() {
    for target in [None, Some("")] {
        let err = ProbeRequest::from_query(target, None, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        assert!(err.to_string().contains("'target'"));
    }
}

#[test]
fn bad_period_rejected() {
    let err = ProbeRequest::from_query(Some("rtmp://a/b"), Some("notaduration"), None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    assert!(err.to_string().starts_with("'period' parameter must be a duration"));
}

#[test]
fn fractional_period_rejected_with_hint() {
    let err = ProbeRequest::from_query(Some("rtmp://a/b"), Some("1.5h"), None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    assert!(err.to_string().contains("fractional values like 1.5h are not accepted"));
}

#[test]
fn oversized_period_rejected() {
    let err = ProbeRequest::from_query(Some("rtmp://a/b"), Some("10000000000000000000s"), None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);

    let err = ProbeRequest::from_query(Some("rtmp://a/b"), Some("25h"), None).unwrap_err();
    assert!(err.to_string().contains("at most"));

    let req = ProbeRequest::from_query(Some("rtmp://a/b"), Some("24h"), None).unwrap();
    assert_eq!(req.period(), MAX_PERIOD);
}

#[test]
fn bad_streaming_time_rejected() {
    for raw in ["abc", "-3", "2.5"] {
        let err = ProbeRequest::from_query(Some("rtmp://a/b"), None, Some(raw)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter, "{raw}");
        assert!(err.to_string().contains("'streamingTime'"));
    }
}

#[test]
fn target_checked_before_period() {
    let err = ProbeRequest::from_query(None, Some("bogus"), Some("bogus")).unwrap_err();
    assert!(err.to_string().contains("'target'"));

    let err = ProbeRequest::from_query(Some("rtmp://a/b"), Some("bogus"), Some("bogus")).unwrap_err();
    assert!(err.to_string().contains("'period'"));
}
