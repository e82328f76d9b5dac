//! Session controller end to end: in-memory OCR, mock completion endpoint,
//! real PDF rendering.

mod common;

use common::{controller, pdf_bytes, FakeRasterizer, MockEndpoint, Reply, ScriptedRecognizer};
use pdf_autofill::{AutofillError, Document, SessionState, FILL_FAILED};
use std::sync::atomic::Ordering;

#[tokio::test]
async fn upload_fill_download_end_to_end() {
    let mock = MockEndpoint::start(vec![Reply::content("Name: John Doe")]).await;
    let ctl = controller(
        &mock,
        FakeRasterizer::new(1),
        ScriptedRecognizer::new(&["Name:   N/A\n\n\n"]),
    );
    let mut session = SessionState::new();

    let doc = Document::from_bytes("form.pdf", pdf_bytes("a")).unwrap();
    let extracted = ctl.upload(&mut session, doc).await.unwrap();
    assert_eq!(extracted, "Name: N/A");

    let filled = ctl.request_fill(&mut session).await.unwrap();
    assert_eq!(filled, "Name: John Doe");
    assert_eq!(session.filled_text(), Some("Name: John Doe"));

    let download = ctl.request_download(&session).unwrap();
    assert_eq!(download.filename, "AI_Filled_Form.pdf");
    assert_eq!(download.media_type, "application/pdf");
    assert!(!download.bytes().is_empty());
    assert!(download.bytes().starts_with(b"%PDF"));
    assert_eq!(download.content.position(), 0);

    let pdf = lopdf::Document::load_mem(download.bytes()).unwrap();
    assert_eq!(pdf.get_pages().len(), 1);
}

#[tokio::test]
async fn pages_are_joined_with_blank_lines() {
    let mock = MockEndpoint::start(vec![Reply::content("unused")]).await;
    let ctl = controller(
        &mock,
        FakeRasterizer::new(3),
        ScriptedRecognizer::new(&["one", "two", "three"]),
    );
    let mut session = SessionState::new();

    let doc = Document::from_bytes("three.pdf", pdf_bytes("b")).unwrap();
    let text = ctl.upload(&mut session, doc).await.unwrap();

    assert_eq!(text, "one\n\ntwo\n\nthree");
    assert_eq!(mock.hits(), 0);
}

#[tokio::test]
async fn reuploading_the_same_document_skips_ocr() {
    let mock = MockEndpoint::start(vec![Reply::content("Name: Jane")]).await;
    let raster = FakeRasterizer::new(1);
    let ctl = controller(&mock, raster.clone(), ScriptedRecognizer::new(&["Name: N/A"]));
    let mut session = SessionState::new();

    let bytes = pdf_bytes("same");
    ctl.upload(&mut session, Document::from_bytes("f.pdf", bytes.clone()).unwrap())
        .await
        .unwrap();
    ctl.request_fill(&mut session).await.unwrap();
    ctl.ask_question(&mut session, "Name?").await.unwrap();

    ctl.upload(&mut session, Document::from_bytes("f.pdf", bytes).unwrap())
        .await
        .unwrap();

    assert_eq!(raster.calls.load(Ordering::SeqCst), 1);
    assert_eq!(session.filled_text(), Some("Name: Jane"));
    assert_eq!(session.history().len(), 1);
}

#[tokio::test]
async fn reuploading_a_blank_extraction_runs_ocr_again() {
    let mock = MockEndpoint::start(vec![Reply::content("unused")]).await;
    let raster = FakeRasterizer::new(1);
    let ctl = controller(&mock, raster.clone(), ScriptedRecognizer::new(&["  \n\t \n"]));
    let mut session = SessionState::new();

    let bytes = pdf_bytes("blank");
    let first = ctl
        .upload(&mut session, Document::from_bytes("blank.pdf", bytes.clone()).unwrap())
        .await
        .unwrap();
    assert_eq!(first, "");

    ctl.upload(&mut session, Document::from_bytes("blank.pdf", bytes).unwrap())
        .await
        .unwrap();

    assert_eq!(raster.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn uploading_a_different_document_clears_derived_state() {
    let mock = MockEndpoint::start(vec![Reply::content("Name: Jane")]).await;
    let raster = FakeRasterizer::new(1);
    let ctl = controller(&mock, raster.clone(), ScriptedRecognizer::new(&["Name: N/A"]));
    let mut session = SessionState::new();

    ctl.upload(&mut session, Document::from_bytes("a.pdf", pdf_bytes("a")).unwrap())
        .await
        .unwrap();
    ctl.request_fill(&mut session).await.unwrap();
    ctl.ask_question(&mut session, "Name?").await.unwrap();

    ctl.upload(&mut session, Document::from_bytes("b.pdf", pdf_bytes("b")).unwrap())
        .await
        .unwrap();

    assert_eq!(raster.calls.load(Ordering::SeqCst), 2);
    assert_eq!(session.document_name(), Some("b.pdf"));
    assert!(session.filled_text().is_none());
    assert!(session.history().is_empty());
}

#[tokio::test]
async fn history_is_presented_newest_first() {
    let mock = MockEndpoint::start(vec![
        Reply::content("Name: John Doe\nAge: 40"),
        Reply::content("John Doe"),
        Reply::content("40"),
    ])
    .await;
    let ctl = controller(
        &mock,
        FakeRasterizer::new(1),
        ScriptedRecognizer::new(&["Name: N/A\nAge: nan"]),
    );
    let mut session = SessionState::new();

    ctl.upload(&mut session, Document::from_bytes("f.pdf", pdf_bytes("q")).unwrap())
        .await
        .unwrap();
    ctl.request_fill(&mut session).await.unwrap();

    let q1 = ctl.ask_question(&mut session, "  What is the name?  ").await.unwrap();
    assert_eq!(q1.question, "What is the name?");
    assert_eq!(q1.answer, "John Doe");
    ctl.ask_question(&mut session, "What is the age?").await.unwrap();

    let shown: Vec<(&str, &str)> = session
        .history_newest_first()
        .map(|p| (p.question.as_str(), p.answer.as_str()))
        .collect();
    assert_eq!(
        shown,
        vec![("What is the age?", "40"), ("What is the name?", "John Doe")]
    );
}

#[tokio::test]
async fn actions_before_their_preconditions_fail_without_touching_state() {
    let mock = MockEndpoint::start(vec![Reply::content("x")]).await;
    let ctl = controller(&mock, FakeRasterizer::new(1), ScriptedRecognizer::new(&["x"]));
    let mut session = SessionState::new();

    assert!(matches!(
        ctl.request_fill(&mut session).await,
        Err(AutofillError::NothingUploaded)
    ));
    assert!(matches!(
        ctl.request_download(&session),
        Err(AutofillError::NotFilled)
    ));
    assert!(matches!(
        ctl.ask_question(&mut session, "Name?").await,
        Err(AutofillError::NotFilled)
    ));
    assert_eq!(mock.hits(), 0);

    ctl.upload(&mut session, Document::from_bytes("f.pdf", pdf_bytes("p")).unwrap())
        .await
        .unwrap();
    ctl.request_fill(&mut session).await.unwrap();
    assert!(matches!(
        ctl.ask_question(&mut session, "   ").await,
        Err(AutofillError::EmptyQuestion)
    ));
    assert!(session.history().is_empty());
    assert_eq!(mock.hits(), 1);
}

#[tokio::test]
async fn failed_fill_stores_sentinel_and_can_still_be_downloaded() {
    let mock = MockEndpoint::start(vec![Reply::Status(500)]).await;
    let ctl = controller(&mock, FakeRasterizer::new(1), ScriptedRecognizer::new(&["Name: N/A"]));
    let mut session = SessionState::new();

    ctl.upload(&mut session, Document::from_bytes("f.pdf", pdf_bytes("s")).unwrap())
        .await
        .unwrap();
    let filled = ctl.request_fill(&mut session).await.unwrap();
    assert_eq!(filled, FILL_FAILED);
    assert_eq!(mock.hits(), 3);

    let download = ctl.request_download(&session).unwrap();
    assert!(download.bytes().starts_with(b"%PDF"));
}

#[tokio::test]
async fn fill_is_rerun_on_every_request() {
    let mock = MockEndpoint::start(vec![Reply::content("first"), Reply::content("second")]).await;
    let ctl = controller(&mock, FakeRasterizer::new(1), ScriptedRecognizer::new(&["Name: N/A"]));
    let mut session = SessionState::new();

    ctl.upload(&mut session, Document::from_bytes("f.pdf", pdf_bytes("r")).unwrap())
        .await
        .unwrap();
    assert_eq!(ctl.request_fill(&mut session).await.unwrap(), "first");
    assert_eq!(ctl.request_fill(&mut session).await.unwrap(), "second");
    assert_eq!(mock.hits(), 2);
}

#[tokio::test]
async fn long_filled_text_paginates() {
    let long: String = (0..150).map(|i| format!("Field {i}: value\n")).collect();
    let mock = MockEndpoint::start(vec![Reply::Content(long)]).await;
    let ctl = controller(&mock, FakeRasterizer::new(1), ScriptedRecognizer::new(&["x"]));
    let mut session = SessionState::new();

    ctl.upload(&mut session, Document::from_bytes("f.pdf", pdf_bytes("l")).unwrap())
        .await
        .unwrap();
    ctl.request_fill(&mut session).await.unwrap();

    let download = ctl.request_download(&session).unwrap();
    let pdf = lopdf::Document::load_mem(download.bytes()).unwrap();
    assert_eq!(pdf.get_pages().len(), 3);
}
