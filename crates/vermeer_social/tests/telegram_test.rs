//! Telegram transport against an in-process fake Bot API.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use vermeer_core::{ChatId, MediaPhoto, MessageId, ParseMode};
use vermeer_error::ChatErrorKind;
use vermeer_interface::{ChatTransport, SendOptions};
use vermeer_social::telegram::{BotCommand, TelegramConfig, TelegramTransport};

#[derive(Clone, Default)]
struct Seen(Arc<Mutex<Vec<(String, Value)>>>);

impl Seen {
    fn push(&self, method: &str, body: Value) {
        self.0.lock().unwrap().push((method.to_string(), body));
    }

    fn all(&self) -> Vec<(String, Value)> {
        self.0.lock().unwrap().clone()
    }
}

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn transport(addr: SocketAddr) -> TelegramTransport {
    let config = TelegramConfig::default()
        .with_api_base(format!("http://{addr}"))
        .with_token("TEST".to_string())
        .with_poll_timeout_secs(1);
    TelegramTransport::new(&config).unwrap()
}

async fn send_message(State(seen): State<Seen>, Json(body): Json<Value>) -> Json<Value> {
    seen.push("sendMessage", body.clone());
    Json(json!({
        "ok": true,
        "result": {"message_id": 321, "date": 0, "chat": {"id": body["chat_id"]}, "text": body["text"]}
    }))
}

async fn delete_message(State(seen): State<Seen>, Json(body): Json<Value>) -> Json<Value> {
    seen.push("deleteMessage", body);
    Json(json!({"ok": false, "error_code": 400, "description": "Bad Request: message to delete not found"}))
}

async fn edit_message(State(seen): State<Seen>, Json(body): Json<Value>) -> Json<Value> {
    seen.push("editMessageText", body);
    Json(json!({"ok": true, "result": {"message_id": 5, "chat": {"id": 1}, "text": "edited"}}))
}

async fn get_updates(State(seen): State<Seen>, Json(body): Json<Value>) -> Json<Value> {
    seen.push("getUpdates", body);
    Json(json!({
        "ok": true,
        "result": [
            {"update_id": 10, "message": {"message_id": 1, "chat": {"id": 9}, "text": "/start"}},
            {"update_id": 11, "edited_message": {"message_id": 1, "chat": {"id": 9}, "text": "x"}},
            {"update_id": 12, "message": {"message_id": 2, "chat": {"id": 9}, "from": {"id": 4, "username": "ann"}, "text": "/gen cat"}}
        ]
    }))
}

async fn set_my_commands(State(seen): State<Seen>, Json(body): Json<Value>) -> Json<Value> {
    seen.push("setMyCommands", body);
    Json(json!({"ok": true, "result": true}))
}

async fn send_media_group(State(seen): State<Seen>, mut multipart: Multipart) -> Json<Value> {
    let mut fields = serde_json::Map::new();
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap().to_string();
        if field.file_name().is_some() {
            let bytes = field.bytes().await.unwrap();
            files.push(json!({"name": name, "len": bytes.len()}));
        } else {
            fields.insert(name, Value::String(field.text().await.unwrap()));
        }
    }
    fields.insert("files".to_string(), Value::Array(files.clone()));
    seen.push("sendMediaGroup", Value::Object(fields));

    let result: Vec<Value> = (0..files.len())
        .map(|i| json!({"message_id": 500 + i, "chat": {"id": 1}}))
        .collect();
    Json(json!({"ok": true, "result": result}))
}

fn app(seen: Seen) -> Router {
    Router::new()
        .route("/botTEST/sendMessage", post(send_message))
        .route("/botTEST/deleteMessage", post(delete_message))
        .route("/botTEST/editMessageText", post(edit_message))
        .route("/botTEST/getUpdates", post(get_updates))
        .route("/botTEST/setMyCommands", post(set_my_commands))
        .route("/botTEST/sendMediaGroup", post(send_media_group))
        .with_state(seen)
}

#[tokio::test]
async fn test_send_message_wire_format() {
    let seen = Seen::default();
    let addr = serve(app(seen.clone())).await;
    let transport = transport(addr);

    let options = SendOptions::default()
        .with_reply_to(MessageId(12))
        .with_parse_mode(ParseMode::MarkdownV2);
    let id = transport
        .send_message(ChatId(-42), "*hello*", options)
        .await
        .unwrap();

    assert_eq!(id, MessageId(321));
    let (method, body) = &seen.all()[0];
    assert_eq!(method, "sendMessage");
    assert_eq!(body["chat_id"], json!(-42));
    assert_eq!(body["text"], json!("*hello*"));
    assert_eq!(body["parse_mode"], json!("MarkdownV2"));
    assert_eq!(body["reply_parameters"]["message_id"], json!(12));
}

#[tokio::test]
async fn test_api_refusal_maps_to_api_error() {
    let seen = Seen::default();
    let addr = serve(app(seen.clone())).await;

    let err = transport(addr)
        .delete_message(ChatId(1), MessageId(2))
        .await
        .unwrap_err();

    match err.kind {
        ChatErrorKind::Api {
            method,
            description,
        } => {
            assert_eq!(method, "deleteMessage");
            assert!(description.contains("not found"));
        }
        other => panic!("unexpected kind: {other:?}"),
    }
}

#[tokio::test]
async fn test_edit_message_text() {
    let seen = Seen::default();
    let addr = serve(app(seen.clone())).await;

    transport(addr)
        .edit_message_text(ChatId(1), MessageId(5), "Failed to generate images.", None)
        .await
        .unwrap();

    let (_, body) = &seen.all()[0];
    assert_eq!(body["message_id"], json!(5));
    assert!(body.get("parse_mode").is_none());
}

#[tokio::test]
async fn test_get_updates_offsets_and_messages() {
    let seen = Seen::default();
    let addr = serve(app(seen.clone())).await;

    let polled = transport(addr).get_updates(10).await.unwrap();

    assert_eq!(
        polled.iter().map(|p| p.next_offset).collect::<Vec<_>>(),
        vec![11, 12, 13]
    );
    assert!(polled[1].message.is_none());
    let last = polled[2].message.as_ref().unwrap();
    assert_eq!(last.text(), "/gen cat");
    assert_eq!(last.username().as_deref(), Some("ann"));

    let (_, body) = &seen.all()[0];
    assert_eq!(body["offset"], json!(10));
    assert_eq!(body["timeout"], json!(1));
}

#[tokio::test]
async fn test_set_my_commands() {
    let seen = Seen::default();
    let addr = serve(app(seen.clone())).await;

    transport(addr)
        .set_my_commands(&[BotCommand::new("gen", "Generate images")])
        .await
        .unwrap();

    let (_, body) = &seen.all()[0];
    assert_eq!(
        body["commands"],
        json!([{"command": "gen", "description": "Generate images"}])
    );
}

#[tokio::test]
async fn test_send_media_group_multipart() {
    let seen = Seen::default();
    let addr = serve(app(seen.clone())).await;

    let media = vec![
        MediaPhoto::new(vec![1, 2, 3], "a cat batch# 0", "0.png"),
        MediaPhoto::new(vec![4, 5], "a cat batch# 1", "1.png"),
    ];
    let ids = transport(addr)
        .send_media_group(ChatId(1), &media)
        .await
        .unwrap();

    assert_eq!(ids, vec![MessageId(500), MessageId(501)]);

    let (_, body) = &seen.all()[0];
    assert_eq!(body["chat_id"], json!("1"));
    let descriptors: Value = serde_json::from_str(body["media"].as_str().unwrap()).unwrap();
    assert_eq!(
        descriptors,
        json!([
            {"type": "photo", "media": "attach://photo0", "caption": "a cat batch# 0"},
            {"type": "photo", "media": "attach://photo1", "caption": "a cat batch# 1"}
        ])
    );
    assert_eq!(
        body["files"],
        json!([{"name": "photo0", "len": 3}, {"name": "photo1", "len": 2}])
    );
}

#[tokio::test]
async fn test_empty_media_group_rejected_locally() {
    let seen = Seen::default();
    let addr = serve(app(seen.clone())).await;

    let err = transport(addr)
        .send_media_group(ChatId(1), &[])
        .await
        .unwrap_err();
    assert!(matches!(err.kind, ChatErrorKind::InvalidMedia(_)));
    assert!(seen.all().is_empty());
}

#[tokio::test]
async fn test_unreachable_api_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = transport(addr)
        .send_message(ChatId(1), "hi", SendOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err.kind, ChatErrorKind::Transport(_)));
}
