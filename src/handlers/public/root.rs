use axum::response::Json;
use serde_json::{json, Value};

/// GET / - service description
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Sigil API",
        "version": version,
        "description": "Incantation processing and sigil records",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "media": "/media/* (public, no token - stored sigil images under unguessable names)",
            "hello": "GET /hello/ (protected)",
            "incantation": "POST /process-incantation/ (protected)",
            "sigils": "GET, POST /sigils/ (protected)",
            "sigil": "GET /sigils/:id/ (protected)",
        }
    }))
}
