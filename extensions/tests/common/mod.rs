use std::env;

/// Returns the key from the environment or `.env`, or `None` to skip a live test.
pub fn api_key_or_skip(var_name: &str, test_name: &str) -> Option<String> {
    dotenv::dotenv().ok();
    match env::var(var_name) {
        Ok(key) if !key.trim().is_empty() => Some(key),
        _ => {
            println!("Skipping integration test {} - {} environment variable not set.", test_name, var_name);
            None
        }
    }
}

pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt::try_init();
}
