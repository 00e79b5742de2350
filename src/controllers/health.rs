pub async fn root() -> &'static str {
    "API is running..."
}
