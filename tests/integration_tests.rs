// Integration tests for extractpdfrecord.
//
// PDFs are generated in-process with lopdf and the chat-completion API is a
// one-shot tiny_http server on a loopback port, so nothing here needs fixtures
// or network access.

use extractpdfrecord::{
    client::build_messages, pipeline, prompt, Error, ModelClient, PdfText, RecordConfig,
    SchemaMode,
};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::io::Read;
use std::path::Path;
use std::sync::mpsc;
use std::thread;

// ── Fixtures ──────────────────────────────────────────────────────────────────

/// Build a PDF with one page per entry of `pages`, each showing its string in
/// Courier.
fn make_pdf(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(Object::from(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn write_pdf(dir: &Path, pages: &[&str]) -> std::path::PathBuf {
    let path = dir.join("study.pdf");
    std::fs::write(&path, make_pdf(pages)).unwrap();
    path
}

/// What the stub server received.
struct Captured {
    url: String,
    authorization: Option<String>,
    body: serde_json::Value,
}

/// Serve exactly one request with `status` and `body`; returns the API root
/// to point a client at and a receiver for the captured request.
fn serve_once(status: u16, body: String) -> (String, mpsc::Receiver<Captured>) {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let mut request = server.recv().unwrap();

        let mut raw = String::new();
        request.as_reader().read_to_string(&mut raw).unwrap();
        let authorization = request
            .headers()
            .iter()
            .find(|h| h.field.equiv("Authorization"))
            .map(|h| h.value.as_str().to_string());
        let _ = tx.send(Captured {
            url: request.url().to_string(),
            authorization,
            body: serde_json::from_str(&raw).unwrap_or(serde_json::Value::Null),
        });

        let header =
            tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
        let response = tiny_http::Response::from_string(body)
            .with_status_code(status)
            .with_header(header);
        let _ = request.respond(response);
    });

    (format!("http://{addr}/v1"), rx)
}

fn chat_reply(content: &str) -> String {
    serde_json::json!({
        "id": "cmpl-1",
        "object": "chat.completion",
        "model": "pixtral-12b-2409",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 120, "completion_tokens": 30, "total_tokens": 150 }
    })
    .to_string()
}

// ── Text extraction ───────────────────────────────────────────────────────────

#[test]
fn pages_are_joined_in_order_and_trimmed() {
    let pdf = PdfText::from_bytes(&make_pdf(&["Alpha page", "Beta page", "Gamma page"])).unwrap();
    assert_eq!(pdf.page_count(), 3);

    let pages = pdf.page_texts().unwrap();
    assert!(pages[0].contains("Alpha page"));
    assert!(pages[1].contains("Beta page"));
    assert!(pages[2].contains("Gamma page"));

    let expected: String = pages.iter().map(|p| format!("{p}\n")).collect();
    let text = pdf.full_text().unwrap();
    assert_eq!(text, expected.trim());

    let alpha = text.find("Alpha").unwrap();
    let beta = text.find("Beta").unwrap();
    let gamma = text.find("Gamma").unwrap();
    assert!(alpha < beta && beta < gamma);
    assert_eq!(text, text.trim());
}

#[test]
fn extract_text_reads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), &["Only page"]);
    assert!(extractpdfrecord::text::extract_text(&path).unwrap().contains("Only page"));
}

#[test]
fn unreadable_document_is_a_fault() {
    let dir = tempfile::tempdir().unwrap();
    let err = extractpdfrecord::text::extract_text(dir.path().join("missing.pdf")).unwrap_err();
    assert!(!err.is_unusable_reply());
}

// ── Model query client ────────────────────────────────────────────────────────

#[test]
fn query_sends_two_messages_and_returns_the_bare_object() {
    let (base_url, captured) = serve_once(200, chat_reply("Sure! ```json\n{\"A\":\"1\"}\n```"));
    let client = ModelClient::new(&base_url, "test-key", "pixtral-12b-2409", None).unwrap();

    let json = client.query("page one\npage two", "Categorise:").unwrap();
    assert_eq!(json, r#"{"A":"1"}"#);

    let request = captured.recv().unwrap();
    assert_eq!(request.url, "/v1/chat/completions");
    assert_eq!(request.authorization.as_deref(), Some("Bearer test-key"));
    assert_eq!(request.body["model"], "pixtral-12b-2409");
    assert_eq!(request.body["messages"][0]["role"], "system");
    assert_eq!(request.body["messages"][0]["content"], prompt::SYSTEM_PROMPT);
    assert_eq!(request.body["messages"][1]["role"], "user");
    assert_eq!(
        request.body["messages"][1]["content"],
        "Categorise:\n\npage one\npage two"
    );
}

#[test]
fn reply_without_braces_is_no_json() {
    let (base_url, _captured) = serve_once(200, chat_reply("I cannot help with that."));
    let client = ModelClient::new(&base_url, "k", "m", None).unwrap();

    let err = client.query("text", "prompt").unwrap_err();
    assert!(matches!(err, Error::NoJsonFound { .. }));
    assert_eq!(err.raw_reply(), Some("I cannot help with that."));
}

#[test]
fn reply_with_invalid_object_is_malformed() {
    let (base_url, _captured) = serve_once(200, chat_reply("{A: 1}"));
    let client = ModelClient::new(&base_url, "k", "m", None).unwrap();

    assert!(matches!(
        client.query("text", "prompt"),
        Err(Error::MalformedJson { .. })
    ));
}

#[test]
fn error_status_is_an_api_fault() {
    let (base_url, _captured) = serve_once(401, r#"{"message":"Unauthorized"}"#.to_string());
    let client = ModelClient::new(&base_url, "bad-key", "m", None).unwrap();

    let err = client.complete(&build_messages("p", "t")).unwrap_err();
    match &err {
        Error::Api { status, body } => {
            assert_eq!(*status, 401);
            assert!(body.contains("Unauthorized"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!err.is_unusable_reply());
}

#[test]
fn reply_without_choices_is_empty() {
    let (base_url, _captured) = serve_once(200, r#"{"choices":[]}"#.to_string());
    let client = ModelClient::new(&base_url, "k", "m", None).unwrap();

    assert!(matches!(
        client.complete(&build_messages("p", "t")),
        Err(Error::EmptyReply)
    ));
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

fn config_for(dir: &Path, base_url: String) -> RecordConfig {
    let mut config = RecordConfig::new(write_pdf(dir, &["Study title: Example"]), "k");
    config.base_url = base_url;
    config.output_path = dir.join("record.csv");
    config
}

#[test]
fn run_writes_header_and_data_rows() {
    let dir = tempfile::tempdir().unwrap();
    let (base_url, captured) = serve_once(
        200,
        chat_reply("Here you go:\n{\"X\": \"a\", \"Y\": \"b\"}\nHope that helps."),
    );
    let config = config_for(dir.path(), base_url);

    let report = pipeline::run(&config).unwrap();

    assert_eq!(report.pages, 1);
    assert_eq!(report.fields, ["X", "Y"]);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("record.csv")).unwrap(),
        "X,Y\na,b\n"
    );

    let request = captured.recv().unwrap();
    let user = request.body["messages"][1]["content"].as_str().unwrap();
    assert!(user.starts_with(&format!("{}\n\n", prompt::default_prompt())));
    assert!(user.contains("Study title: Example"));
}

#[test]
fn run_with_strict_schema_writes_all_fields() {
    let dir = tempfile::tempdir().unwrap();
    let (base_url, _captured) = serve_once(200, chat_reply(r#"{"TITLE": "Example"}"#));
    let mut config = config_for(dir.path(), base_url);
    config.schema = SchemaMode::Strict;

    let report = pipeline::run(&config).unwrap();
    assert_eq!(report.fields, prompt::FIELDS);

    let csv = std::fs::read_to_string(dir.path().join("record.csv")).unwrap();
    let mut lines = csv.lines();
    assert!(lines.next().unwrap().starts_with("TITLE,EDMS NO,PRODUCT,"));
    assert!(lines.next().unwrap().starts_with("Example,,,"));
}

#[test]
fn unusable_reply_surfaces_its_kind_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let (base_url, _captured) = serve_once(200, chat_reply("No structured data here."));
    let config = config_for(dir.path(), base_url);

    let err = pipeline::run(&config).unwrap_err();
    assert!(matches!(err, Error::NoJsonFound { .. }));
    assert!(!config.output_path.exists());
}

#[test]
fn array_reply_is_not_written() {
    let dir = tempfile::tempdir().unwrap();
    let (base_url, _captured) = serve_once(200, chat_reply("[1,2]"));
    let config = config_for(dir.path(), base_url);

    // No `{` in the reply, so this never reaches the writer as JSON.
    let err = pipeline::run(&config).unwrap_err();
    assert!(err.is_unusable_reply());
    assert!(!config.output_path.exists());
}

#[test]
fn run_rejects_blank_api_key_before_any_io() {
    let mut config = RecordConfig::new("does-not-exist.pdf", "");
    config.output_path = "never.csv".into();
    assert!(matches!(pipeline::run(&config), Err(Error::Config(_))));
}

// ── Configuration & errors ────────────────────────────────────────────────────

#[test]
fn default_config_matches_builtin_settings() {
    let cfg = RecordConfig::new("uploads/sgac006.pdf", "key");
    assert_eq!(cfg.model, extractpdfrecord::DEFAULT_MODEL);
    assert_eq!(cfg.base_url, extractpdfrecord::DEFAULT_BASE_URL);
    assert_eq!(cfg.output_path, Path::new("uploads/sgac006.csv"));
    assert_eq!(cfg.schema, SchemaMode::Passthrough);
    assert!(cfg.timeout_secs.is_none());
    assert!(cfg.validate().is_ok());
}

#[test]
fn error_display_is_non_empty() {
    let errors: &[Error] = &[
        Error::Api {
            status: 500,
            body: "oops".into(),
        },
        Error::EmptyReply,
        Error::Config("test".into()),
        Error::NoJsonFound { raw: "x".into() },
        Error::MalformedJson {
            raw: "{".into(),
            message: "EOF".into(),
        },
        Error::NotAnObject,
        Error::EmptyRecord,
        Error::UnknownFields(vec!["MOOD".into()]),
        Error::NoRecord,
    ];
    for e in errors {
        assert!(!e.to_string().is_empty(), "empty display for {e:?}");
    }
}
