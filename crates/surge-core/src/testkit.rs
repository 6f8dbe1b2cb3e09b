use std::sync::Arc;

use serde_json::json;
use surge_auth::{AuthConfig, Authenticator, TokenCache};
use surge_client::TaskClient;
use surge_model::{Payload, Principal};
use surge_transport::{Reply, StatusCode, testing::ScriptedTransport};

/// Scripted transport with a working `/token` route plus a client on top of it.
pub fn scripted_client() -> (Arc<ScriptedTransport>, Arc<TaskClient>) {
    let transport = Arc::new(ScriptedTransport::new());
    transport.on_post(
        "/token",
        [Reply::new(StatusCode::OK).with_json(&json!({ "access_token": "tok", "expires_in": 3600 }))],
    );
    let auth = Authenticator::new(transport.clone(), AuthConfig::default());
    let client = TaskClient::new(transport.clone(), Arc::new(TokenCache::new(auth)));
    (transport, Arc::new(client))
}

pub fn principal() -> Principal {
    Principal::new("test", "test")
}

pub fn payload(action: &str) -> Payload {
    Payload::from([
        ("user_id".to_string(), "123".to_string()),
        ("action".to_string(), action.to_string()),
    ])
}

pub fn status(status: &str, data: &Payload) -> Reply {
    Reply::new(StatusCode::OK).with_json(&json!({ "status": status, "data": data }))
}
