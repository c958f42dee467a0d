//! Static greeting page

use axum::{response::Html, routing::get, Router};

const GREETING_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Greeting</title>
</head>
<body>
    <h1>Hello World!</h1>
</body>
</html>
"#;

/// GET /greeting
async fn greeting() -> Html<&'static str> {
    tracing::info!("Hello, World!");
    Html(GREETING_PAGE)
}

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/greeting", get(greeting))
}
