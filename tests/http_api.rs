use friendbook::social::db::create_memory_pool_with_migration;
use friendbook::social::server::serve_with_shutdown;
use friendbook::{AppConfig, PasswordParams, SocialApp};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

struct TestServer {
    base: String,
    client: reqwest::Client,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn start_server() -> TestServer {
    let pool = create_memory_pool_with_migration().await.expect("memory db");
    let mut config = AppConfig::new("sqlite::memory:");
    config.password = PasswordParams {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    };
    let app = SocialApp::with_pool(config, pool).expect("app");

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        let _ = serve_with_shutdown(app, listener, async {
            let _ = shutdown_rx.await;
        })
        .await;
    });

    TestServer {
        base: format!("http://{}", addr),
        client: reqwest::Client::new(),
        shutdown: Some(shutdown_tx),
    }
}

impl TestServer {
    async fn post(&self, path: &str, token: Option<&str>, body: Value) -> (u16, Value) {
        let mut req = self.client.post(format!("{}{}", self.base, path)).json(&body);
        if let Some(token) = token {
            req = req.header("token", token);
        }
        let resp = req.send().await.expect("request");
        let status = resp.status().as_u16();
        (status, resp.json().await.expect("json body"))
    }

    async fn get(&self, path: &str, token: Option<&str>) -> (u16, Value) {
        let mut req = self.client.get(format!("{}{}", self.base, path));
        if let Some(token) = token {
            req = req.header("token", token);
        }
        let resp = req.send().await.expect("request");
        let status = resp.status().as_u16();
        (status, resp.json().await.expect("json body"))
    }

    /// 注册并登录，返回 (userID, token)
    async fn register(&self, name: &str, email: &str) -> (i64, String) {
        let (_, body) = self
            .post(
                "/account/signup",
                None,
                json!({
                    "name": name,
                    "email": email,
                    "password": "pw",
                    "confirmPassword": "pw",
                }),
            )
            .await;
        assert_eq!(body["errCode"], 0, "signup failed: {}", body);

        let (_, body) = self
            .post(
                "/account/login",
                None,
                json!({ "email": email, "password": "pw" }),
            )
            .await;
        assert_eq!(body["errCode"], 0, "login failed: {}", body);
        (
            body["data"]["user"]["userID"].as_i64().expect("user id"),
            body["data"]["token"].as_str().expect("token").to_string(),
        )
    }
}

#[tokio::test]
async fn health_is_public() {
    let server = start_server().await;
    let (status, body) = server.get("/health", None).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"], "ok");
}

#[tokio::test]
async fn signup_reports_validation_notices() {
    let server = start_server().await;

    let (status, body) = server
        .post(
            "/account/signup",
            None,
            json!({"name": "A", "email": "a@x.com", "password": "1", "confirmPassword": "2"}),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["errCode"], 1001);
    assert_eq!(body["errMsg"], "Passwords do not match");

    server.register("A", "A@x.com").await;
    let (_, body) = server
        .post(
            "/account/signup",
            None,
            json!({"name": "A2", "email": "a@X.com", "password": "1", "confirmPassword": "1"}),
        )
        .await;
    assert_eq!(body["errCode"], 1002);

    let (_, body) = server
        .post(
            "/account/login",
            None,
            json!({"email": "a@x.com", "password": "wrong"}),
        )
        .await;
    assert_eq!(body["errCode"], 1004);
}

#[tokio::test]
async fn protected_routes_require_session() {
    let server = start_server().await;
    let (status, body) = server.get("/friend/friends", None).await;
    assert_eq!(status, 401);
    assert_eq!(body["errCode"], 1005);

    let (status, _) = server.get("/friend/friends", Some("bogus")).await;
    assert_eq!(status, 401);

    let (_, token) = server.register("A", "a@x.com").await;
    let (status, _) = server.get("/friend/friends", Some(&token)).await;
    assert_eq!(status, 200);

    server.post("/account/logout", Some(&token), json!({})).await;
    let (status, _) = server.get("/friend/friends", Some(&token)).await;
    assert_eq!(status, 401);
}

#[tokio::test]
async fn friend_request_workflow_over_http() {
    let server = start_server().await;
    let (alice_id, alice) = server.register("Alice", "alice@x.com").await;
    let (bob_id, bob) = server.register("Bob", "bob@x.com").await;

    // 搜索：邮箱被拒绝，名称前缀可用
    let (_, body) = server
        .get("/users/search?search=bob@x.com", Some(&alice))
        .await;
    assert_eq!(body["errCode"], 1101);

    let (_, body) = server.get("/users/search?search=bo", Some(&alice)).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["hasSentRequest"], false);

    // 给自己发申请
    let (_, body) = server
        .post(
            &format!("/friend/send_request/{}", alice_id),
            Some(&alice),
            json!({}),
        )
        .await;
    assert_eq!(body["errCode"], 1201);

    // 发送
    let (_, body) = server
        .post(
            &format!("/friend/send_request/{}", bob_id),
            Some(&alice),
            json!({}),
        )
        .await;
    assert_eq!(body["errCode"], 0);
    assert_eq!(body["errMsg"], "Friend request sent to Bob.");
    assert_eq!(body["data"]["outcome"], "created");
    let request_id = body["data"]["request"]["requestID"].as_i64().unwrap();

    // 重复发送
    let (_, body) = server
        .post(
            &format!("/friend/send_request/{}", bob_id),
            Some(&alice),
            json!({}),
        )
        .await;
    assert_eq!(body["errCode"], 1203);

    let (_, body) = server.get("/users/search?search=Bob", Some(&alice)).await;
    assert_eq!(body["data"]["items"][0]["hasSentRequest"], true);
    let (_, body) = server.get("/users/search?search=ali", Some(&bob)).await;
    assert_eq!(body["data"]["items"][0]["hasReceivedRequest"], true);

    // 发送者不能接受自己的申请
    let (_, body) = server
        .post(
            &format!("/friend/accept_request/{}", request_id),
            Some(&alice),
            json!({}),
        )
        .await;
    assert_eq!(body["errCode"], 1204);

    let (_, body) = server.get("/friend/pending_requests", Some(&bob)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["peer"]["name"], "Alice");

    let (_, body) = server
        .post(
            &format!("/friend/accept_request/{}", request_id),
            Some(&bob),
            json!({}),
        )
        .await;
    assert_eq!(body["errCode"], 0);
    assert_eq!(body["data"]["status"], "Accepted");

    let (_, body) = server.get("/friend/friends", Some(&alice)).await;
    assert_eq!(body["data"][0]["userID"], bob_id);
    let (_, body) = server.get("/users/search?search=bob", Some(&alice)).await;
    assert_eq!(body["data"]["items"][0]["isFriend"], true);
    assert_eq!(body["data"]["items"][0]["hasSentRequest"], false);
}

#[tokio::test]
async fn reject_is_soft_and_resend_revives() {
    let server = start_server().await;
    let (_, alice) = server.register("Alice", "alice@x.com").await;
    let (bob_id, bob) = server.register("Bob", "bob@x.com").await;

    let (_, body) = server
        .post(
            &format!("/friend/send_request/{}", bob_id),
            Some(&alice),
            json!({}),
        )
        .await;
    let request_id = body["data"]["request"]["requestID"].as_i64().unwrap();

    let (_, body) = server
        .post(
            &format!("/friend/reject_request/{}", request_id),
            Some(&bob),
            json!({}),
        )
        .await;
    assert_eq!(body["errCode"], 0);
    assert_eq!(body["data"]["rejected"], true);

    // 再次拒绝只是提示
    let (status, body) = server
        .post(
            &format!("/friend/reject_request/{}", request_id),
            Some(&bob),
            json!({}),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["errCode"], 0);
    assert_eq!(body["data"]["rejected"], false);
    assert_eq!(body["errMsg"], "No pending friend request to reject.");

    let (_, body) = server.get("/friend/rejected_requests", Some(&alice)).await;
    assert_eq!(body["data"][0]["request"]["requestID"], request_id);

    let (_, body) = server
        .post(
            &format!("/friend/send_request/{}", bob_id),
            Some(&alice),
            json!({}),
        )
        .await;
    assert_eq!(body["data"]["outcome"], "resent");
    assert_eq!(body["data"]["request"]["requestID"], request_id);
    assert_eq!(body["errMsg"], "Friend request sent again to Bob.");
}

#[tokio::test]
async fn fourth_request_within_a_minute_is_rate_limited() {
    let server = start_server().await;
    let (_, alice) = server.register("Alice", "alice@x.com").await;
    let mut targets = Vec::new();
    for i in 0..4 {
        let (id, _) = server
            .register(&format!("T{}", i), &format!("t{}@x.com", i))
            .await;
        targets.push(id);
    }

    for id in &targets[..3] {
        let (_, body) = server
            .post(&format!("/friend/send_request/{}", id), Some(&alice), json!({}))
            .await;
        assert_eq!(body["errCode"], 0);
    }
    let (_, body) = server
        .post(
            &format!("/friend/send_request/{}", targets[3]),
            Some(&alice),
            json!({}),
        )
        .await;
    assert_eq!(body["errCode"], 1202);
    assert_eq!(
        body["errMsg"],
        "You have reached the limit for sending friend requests."
    );
}
