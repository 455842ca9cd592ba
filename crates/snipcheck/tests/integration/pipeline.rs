use std::sync::Arc;

use snipcheck::config::ResolverConfig;
use snipcheck::locate::{
    GeminiResolver, LineResolver, Localizer, ResolutionError, TraceLineExtractor,
};
use snipcheck::runner::Runner;
use snipcheck::service::Service;
use snipcheck::types::{CodeSubmission, ErrorLines, ResponseEnvelope};

use super::{fixture_source, test_config};

/// Resolver that always fails, as if the network were down
struct Offline;

impl LineResolver for Offline {
    async fn resolve_lines(&self, _: &str, _: &str) -> Result<ErrorLines, ResolutionError> {
        Err(ResolutionError::EmptyResponse)
    }
}

/// Resolver that always names the same lines
struct Answer(ErrorLines);

impl LineResolver for Answer {
    async fn resolve_lines(&self, _: &str, _: &str) -> Result<ErrorLines, ResolutionError> {
        Ok(self.0.clone())
    }
}

fn extractor() -> TraceLineExtractor {
    TraceLineExtractor::new("<string>").unwrap()
}

fn failing_service() -> Service<Offline> {
    Service::new(
        Runner::new(test_config().interpreter),
        Localizer::new(Offline, extractor()),
    )
}

/// Gemini resolver pointed at a closed local port
fn unreachable_gemini_service() -> Service<GeminiResolver> {
    let resolver_config = ResolverConfig {
        base_url: "http://127.0.0.1:9".to_owned(),
        timeout_secs: 5,
        ..Default::default()
    };
    let resolver =
        GeminiResolver::with_api_key(&resolver_config, Some("test-key".to_owned())).unwrap();
    Service::new(
        Runner::new(test_config().interpreter),
        Localizer::new(resolver, extractor()),
    )
}

#[tokio::test]
async fn test_success_envelope() {
    let envelope = failing_service()
        .handle(&CodeSubmission::new("print(1+1)"))
        .await
        .unwrap();
    assert_eq!(
        envelope,
        ResponseEnvelope {
            error: vec![],
            result: "2\n".to_owned(),
        }
    );
}

#[tokio::test]
async fn test_empty_submission_envelope() {
    let envelope = failing_service()
        .handle(&CodeSubmission::new(""))
        .await
        .unwrap();
    assert!(envelope.error.is_empty());
    assert_eq!(envelope.result, "");
}

#[tokio::test]
async fn test_zero_division_falls_back_to_line_one() {
    let envelope = failing_service()
        .handle(&CodeSubmission::new("x = 1/0"))
        .await
        .unwrap();
    assert_eq!(envelope.error, vec![1]);
    assert!(envelope.result.contains("ZeroDivisionError"));
}

#[tokio::test]
async fn test_name_error_falls_back_to_line_two() {
    let envelope = failing_service()
        .handle(&CodeSubmission::new("print('a')\nundefined_name"))
        .await
        .unwrap();
    assert_eq!(envelope.error, vec![2]);
    assert!(envelope.result.starts_with("a\n"));
}

#[tokio::test]
async fn test_network_failure_matches_extractor() {
    let code = fixture_source("nested_fault.py");
    let envelope = unreachable_gemini_service()
        .handle(&CodeSubmission::new(code.clone()))
        .await
        .unwrap();

    assert_eq!(envelope.error, extractor().extract(&envelope.result));
    assert_eq!(envelope.error, vec![10]);
    assert!(envelope.result.starts_with("starting\n"));
}

#[tokio::test]
async fn test_error_lines_exist_in_submission() {
    let submissions = [
        "x = 1/0",
        "print('a')\nundefined_name",
        "def f():\n    raise ValueError('bad')\n\nf()\n",
        "x = 1\nprint(x\ny = 2\n",
        "import json\njson.loads('{')",
    ];
    let service = failing_service();

    for code in submissions {
        let submission = CodeSubmission::new(code);
        let envelope = service.handle(&submission).await.unwrap();
        assert!(!envelope.result.is_empty(), "{code:?} produced no trace");
        assert!(envelope.result.contains("File \"<string>\""));
        assert!(envelope.error.len() <= submission.line_count());
        for line in &envelope.error {
            assert!(
                (1..=submission.line_count() as u32).contains(line),
                "line {line} out of range for {code:?}"
            );
        }
    }
}

#[tokio::test]
async fn test_pure_code_is_idempotent() {
    let service = failing_service();
    let submission = CodeSubmission::new("for i in range(3):\n    print(i * i)");
    let first = service.handle(&submission).await.unwrap();
    let second = service.handle(&submission).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.result, "0\n1\n4\n");
}

#[tokio::test]
async fn test_concurrent_requests_keep_their_own_output() {
    let service = Arc::new(failing_service());

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                let code = format!("for _ in range(50):\n    print({i})");
                let envelope = service.handle(&CodeSubmission::new(code)).await.unwrap();
                (i, envelope)
            })
        })
        .collect();

    for handle in handles {
        let (i, envelope) = handle.await.unwrap();
        assert!(envelope.error.is_empty());
        assert_eq!(envelope.result, format!("{i}\n").repeat(50));
    }
}

#[tokio::test]
async fn test_any_string_yields_an_envelope() {
    struct Case {
        code: String,
        success: bool,
        result: Option<&'static str>,
    }

    let cases = [
        Case {
            code: "print('a')\0".to_owned(),
            success: false,
            result: None,
        },
        Case {
            code: format!("x = '{}'\nprint(len(x))", "a".repeat(200_000)),
            success: true,
            result: Some("200000\n"),
        },
        Case {
            code: "import sys\nsys.stdout.buffer.write(b'\\xff')".to_owned(),
            success: true,
            result: Some("\u{FFFD}"),
        },
        Case {
            code: "import sys\nsys.exit(3)".to_owned(),
            success: false,
            result: Some(""),
        },
    ];
    let service = failing_service();

    for case in cases {
        let submission = CodeSubmission::new(case.code);
        let handled = service
            .handle_detailed(&submission)
            .await
            .unwrap_or_else(|e| panic!("handle failed for {:.40?}: {e}", submission.code));

        assert_eq!(handled.success, case.success, "{:.40?}", submission.code);
        if let Some(result) = case.result {
            assert_eq!(handled.envelope.result, result);
        }
        if case.success {
            assert!(handled.envelope.error.is_empty());
        }
        for line in &handled.envelope.error {
            assert!((1..=submission.line_count() as u32).contains(line));
        }
    }
}

#[tokio::test]
async fn test_exit_without_trace_has_no_error_lines() {
    let handled = failing_service()
        .handle_detailed(&CodeSubmission::new("import sys\nsys.exit(3)"))
        .await
        .unwrap();
    assert!(!handled.success);
    assert!(handled.envelope.error.is_empty());
}

#[tokio::test]
async fn test_resolver_may_name_line_after_trailing_newline() {
    let service = Service::new(
        Runner::new(test_config().interpreter),
        Localizer::new(Answer(vec![2]), extractor()),
    );
    let envelope = service
        .handle(&CodeSubmission::new("def f():\n"))
        .await
        .unwrap();
    assert!(envelope.result.contains("File \"<string>\", line 2"));
    assert_eq!(envelope.error, vec![2]);
}

#[tokio::test]
async fn test_resolver_may_name_line_after_carriage_return() {
    let service = Service::new(
        Runner::new(test_config().interpreter),
        Localizer::new(Answer(vec![2]), extractor()),
    );
    let envelope = service
        .handle(&CodeSubmission::new("x = 1\r1/0"))
        .await
        .unwrap();
    assert!(envelope.result.contains("ZeroDivisionError"));
    assert_eq!(envelope.error, vec![2]);
}

#[tokio::test]
async fn test_fallback_after_trailing_newline_is_in_range() {
    let submission = CodeSubmission::new("def f():\n");
    let envelope = failing_service().handle(&submission).await.unwrap();
    assert_eq!(envelope.error, vec![2]);
    assert_eq!(submission.line_count(), 2);
}
