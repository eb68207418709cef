//! End-to-end flow against a real listener:
//! 登录 → 登记会员 → 订地 → 开收据（编号/摊销/汇总）→ 取消级联。

use serde_json::{Value, json};

use society_server::{Config, ServerState, api};

struct TestServer {
    base: String,
    client: reqwest::Client,
    _work_dir: tempfile::TempDir,
}

async fn spawn_server() -> TestServer {
    let work_dir = tempfile::tempdir().expect("tempdir");

    let mut config = Config::with_overrides(work_dir.path().to_string_lossy(), 0);
    config.jwt.secret = "integration-test-secret-0123456789abcdef".to_string();
    config.superadmin_id = Some("root".to_string());
    config.superadmin_password = Some("root-password-1".to_string());
    config.smtp.enabled = false;
    config.smtp.company_email = None;

    let state = ServerState::initialize(&config).await;
    state.start_background_tasks().await;

    let app = api::build_app(&state).with_state(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server");
    });

    TestServer {
        base: format!("http://{addr}"),
        client: reqwest::Client::new(),
        _work_dir: work_dir,
    }
}

async fn login(server: &TestServer, path: &str, username: &str, password: &str) -> String {
    let resp = server
        .client
        .post(format!("{}{path}", server.base))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("login request");
    assert!(resp.status().is_success(), "login failed: {}", resp.status());
    let body: Value = resp.json().await.expect("login body");
    body["token"].as_str().expect("token").to_string()
}

fn member_form() -> reqwest::multipart::Form {
    reqwest::multipart::Form::new()
        .text("seniority_no", "NCG-001")
        .text("name", "Asha Rao")
        .text("aadhar_number", "123412341234")
        .text("application_no", "42")
        .text("membership_type", "Regular")
        .text("date", "2025-01-15")
        .text("dob", "1988-06-02")
        .text("membership_fees", "2500")
        .text("mobile", "9876543210")
        .text("email", "asha@example.com")
        .text("agree_terms_conditions", "true")
        .text("agree_communication", "true")
}

#[tokio::test]
async fn full_receipt_flow() {
    let server = spawn_server().await;

    // Health is public
    let health = server
        .client
        .get(format!("{}/api/health", server.base))
        .send()
        .await
        .unwrap();
    assert!(health.status().is_success());

    // Protected routes reject missing tokens
    let unauthorized = server
        .client
        .get(format!("{}/api/members", server.base))
        .send()
        .await
        .unwrap();
    assert_eq!(unauthorized.status(), 401);

    // Bootstrap superadmin can log in and create a desk admin
    let root_token = login(&server, "/api/auth/superadmin/login", "root", "root-password-1").await;
    let created_admin = server
        .client
        .post(format!("{}/api/admins", server.base))
        .bearer_auth(&root_token)
        .json(&json!({
            "name": "Front Desk",
            "admin_id": "desk01",
            "password": "desk-password-1",
            "mobile": "9000000001",
            "mail": "desk@example.com"
        }))
        .send()
        .await
        .unwrap();
    assert!(created_admin.status().is_success());

    let admin_token = login(&server, "/api/auth/login", "desk01", "desk-password-1").await;

    // Desk admins cannot manage admin accounts
    let forbidden = server
        .client
        .post(format!("{}/api/admins", server.base))
        .bearer_auth(&admin_token)
        .json(&json!({ "name": "X", "admin_id": "x", "password": "xxxxxxxx" }))
        .send()
        .await
        .unwrap();
    assert_eq!(forbidden.status(), 403);

    // Register a member
    let created_member = server
        .client
        .post(format!("{}/api/members", server.base))
        .bearer_auth(&admin_token)
        .multipart(member_form())
        .send()
        .await
        .unwrap();
    assert!(created_member.status().is_success());

    // Duplicate seniority number is rejected
    let duplicate_member = server
        .client
        .post(format!("{}/api/members", server.base))
        .bearer_auth(&admin_token)
        .multipart(member_form())
        .send()
        .await
        .unwrap();
    assert_eq!(duplicate_member.status(), 409);

    // Receipt before booking: member exists but booking does not
    let premature_receipt = server
        .client
        .post(format!("{}/api/receipts", server.base))
        .bearer_auth(&admin_token)
        .json(&json!({
            "seniority_no": "NCG-001",
            "date": "2025-02-01",
            "amount_paid": 150000.0,
            "payment_mode": "Cheque"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(premature_receipt.status(), 404);

    // First-time member breakdown: 5000 entered, fee split injected
    let breakdown = server
        .client
        .post(format!("{}/api/receipts/breakdown", server.base))
        .bearer_auth(&admin_token)
        .json(&json!({
            "seniority_no": "NCG-001",
            "items": [
                { "name": "Share", "checked": false, "amount": 0.0 },
                { "name": "Membership Fee", "checked": false, "amount": 0.0 },
                { "name": "Admission Fee", "checked": false, "amount": 0.0 },
                { "name": "Share Fee", "checked": false, "amount": 0.0 },
                { "name": "Down Payment", "checked": true, "amount": 5000.0 }
            ],
            "advances": []
        }))
        .send()
        .await
        .unwrap();
    assert!(breakdown.status().is_success());
    let breakdown: Value = breakdown.json().await.unwrap();
    assert_eq!(breakdown["adjustment_applied"], json!(true));
    assert_eq!(breakdown["fee_shortfall"], json!(0.0));
    assert_eq!(breakdown["total"], json!(5000.0));
    let items = breakdown["items"].as_array().unwrap();
    let amount_of = |name: &str| {
        items
            .iter()
            .find(|i| i["name"] == name)
            .map(|i| i["amount"].as_f64().unwrap())
            .unwrap()
    };
    assert_eq!(amount_of("Down Payment"), 2500.0);
    assert_eq!(amount_of("Share"), 2000.0);
    assert_eq!(amount_of("Membership Fee"), 200.0);
    assert_eq!(amount_of("Admission Fee"), 150.0);
    assert_eq!(amount_of("Share Fee"), 150.0);

    // Book a site
    let booking = server
        .client
        .post(format!("{}/api/site-bookings", server.base))
        .bearer_auth(&admin_token)
        .json(&json!({
            "seniority_no": "NCG-001",
            "name": "Asha Rao",
            "date": "2025-01-20",
            "project_name": "New City",
            "site_dimension": "30x40",
            "total_amount": 500000.0,
            "nominees": [{ "name": "Ravi Rao", "age": "34", "relationship": "Brother" }]
        }))
        .send()
        .await
        .unwrap();
    assert!(booking.status().is_success());
    let booking: Value = booking.json().await.unwrap();
    let booking_id = booking["data"]["id"].as_i64().unwrap();

    // One active booking per member
    let duplicate_booking = server
        .client
        .post(format!("{}/api/site-bookings", server.base))
        .bearer_auth(&admin_token)
        .json(&json!({
            "seniority_no": "NCG-001",
            "name": "Asha Rao",
            "date": "2025-01-21",
            "total_amount": 1.0
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(duplicate_booking.status(), 409);

    // First receipt gets the project-scoped number
    let receipt1 = server
        .client
        .post(format!("{}/api/receipts", server.base))
        .bearer_auth(&admin_token)
        .json(&json!({
            "seniority_no": "NCG-001",
            "email": "asha@example.com",
            "date": "2025-02-01",
            "amount_paid": 150000.0,
            "payment_mode": "Cheque",
            "payment_type": "Down Payment",
            "transaction_id": "CHQ-1001"
        }))
        .send()
        .await
        .unwrap();
    assert!(receipt1.status().is_success());
    let receipt1: Value = receipt1.json().await.unwrap();
    assert_eq!(receipt1["data"]["receipt_no"], json!("NCG-RCP-000001"));

    let receipt2 = server
        .client
        .post(format!("{}/api/receipts", server.base))
        .bearer_auth(&admin_token)
        .json(&json!({
            "seniority_no": "NCG-001",
            "date": "2025-03-01",
            "amount_paid": 100000.0,
            "payment_mode": "Cash"
        }))
        .send()
        .await
        .unwrap();
    assert!(receipt2.status().is_success());
    let receipt2: Value = receipt2.json().await.unwrap();
    assert_eq!(receipt2["data"]["receipt_no"], json!("NCG-RCP-000002"));

    // With a receipt on file the member no longer gets the fee adjustment
    let later_breakdown = server
        .client
        .post(format!("{}/api/receipts/breakdown", server.base))
        .bearer_auth(&admin_token)
        .json(&json!({
            "seniority_no": "NCG-001",
            "items": [{ "name": "Down Payment", "checked": true, "amount": 5000.0 }],
            "advances": []
        }))
        .send()
        .await
        .unwrap();
    let later_breakdown: Value = later_breakdown.json().await.unwrap();
    assert_eq!(later_breakdown["adjustment_applied"], json!(false));
    assert_eq!(later_breakdown["items"][0]["amount"], json!(5000.0));

    // Payment summary reconciles receipts against the booking total
    let summary = server
        .client
        .get(format!(
            "{}/api/site-bookings/payment-summary/NCG-001",
            server.base
        ))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert!(summary.status().is_success());
    let summary: Value = summary.json().await.unwrap();
    assert_eq!(summary["total_amount"], json!(500000.0));
    assert_eq!(summary["paid_amount"], json!(250000.0));
    assert_eq!(summary["remaining_amount"], json!(250000.0));

    // Receipt emails were recorded in the outbox
    let outbox = server
        .client
        .get(format!("{}/api/outbox", server.base))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    let outbox: Value = outbox.json().await.unwrap();
    assert!(!outbox.as_array().unwrap().is_empty());

    // Member can log in (password = registered mobile) and see own dashboard
    let member_token = login(&server, "/api/auth/member/login", "NCG-001", "9876543210").await;
    let dashboard = server
        .client
        .get(format!("{}/api/portal/dashboard", server.base))
        .bearer_auth(&member_token)
        .send()
        .await
        .unwrap();
    assert!(dashboard.status().is_success());
    let dashboard: Value = dashboard.json().await.unwrap();
    assert_eq!(dashboard["member"]["seniority_no"], json!("NCG-001"));
    assert_eq!(dashboard["summary"]["paid_amount"], json!(250000.0));

    // Member tokens cannot reach staff routes
    let member_forbidden = server
        .client
        .get(format!("{}/api/receipts", server.base))
        .bearer_auth(&member_token)
        .send()
        .await
        .unwrap();
    assert_eq!(member_forbidden.status(), 403);

    // Cancellation requires the signed PDF and cascades to receipts
    let missing_pdf = server
        .client
        .post(format!(
            "{}/api/site-bookings/{booking_id}/cancel",
            server.base
        ))
        .bearer_auth(&admin_token)
        .multipart(reqwest::multipart::Form::new().text("note", "no pdf attached"))
        .send()
        .await
        .unwrap();
    assert_eq!(missing_pdf.status(), 400);

    let cancel_form = reqwest::multipart::Form::new().part(
        "cancellationPdf",
        reqwest::multipart::Part::bytes(b"%PDF-1.4 cancellation".to_vec())
            .file_name("cancellation.pdf"),
    );
    let cancelled = server
        .client
        .post(format!(
            "{}/api/site-bookings/{booking_id}/cancel",
            server.base
        ))
        .bearer_auth(&admin_token)
        .multipart(cancel_form)
        .send()
        .await
        .unwrap();
    assert!(cancelled.status().is_success());

    // Cancelled receipts drop out of the paid aggregate on the next read
    let summary_after: Value = server
        .client
        .get(format!(
            "{}/api/site-bookings/payment-summary/NCG-001",
            server.base
        ))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(summary_after["paid_amount"], json!(0.0));
    assert_eq!(summary_after["remaining_amount"], json!(500000.0));
}
