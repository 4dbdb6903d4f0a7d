#[cfg(test)]
mod tests {
    use super::super::*;
    use std::collections::HashMap;

    #[test]
    fn test_empty_file_yields_defaults() {
        let config = tokio_test::assert_ok!(ConsoleConfig::from_toml_str(""));
        assert_eq!(config, ConsoleConfig::default());
        assert_eq!(config.backend.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.server.bind_addr, "127.0.0.1:3001");
        assert_eq!(config.task_interval(), Duration::from_millis(2000));
        assert_eq!(config.status_refresh(), Duration::from_secs(30));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = ConsoleConfig::from_toml_str(
            r#"
            [backend]
            base_url = "http://graph.internal:8080/"

            [polling]
            task_interval_ms = 500
            "#,
        )
        .unwrap();
        assert_eq!(config.backend.base_url, "http://graph.internal:8080/");
        assert_eq!(config.backend.request_timeout_secs, 30);
        assert_eq!(config.polling.task_interval_ms, 500);
        assert_eq!(config.polling.status_refresh_secs, 30);
    }

    #[test]
    fn test_env_overrides_file() {
        let env: HashMap<&str, &str> = [
            ("PAPERGRAPH_BACKEND_URL", "http://10.0.0.5:5000"),
            ("PAPERGRAPH_BIND_ADDR", ""),
        ]
        .into_iter()
        .collect();

        let mut config = ConsoleConfig::default();
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.backend.base_url, "http://10.0.0.5:5000");
        // Empty values are ignored.
        assert_eq!(config.server.bind_addr, "127.0.0.1:3001");
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = ConsoleConfig::default();
        config.polling.task_interval_ms = 0;
        let err = tokio_test::assert_err!(config.validate());
        assert!(err.to_string().contains("task_interval_ms"));
    }
}
