use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;
use verity_config::{
    LlmProviderKind, SearchProviderKind, VerityConfigLoader, discover_config_file, load_dotenv,
};

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn empty_config_uses_defaults() {
    temp_env::with_vars_unset(
        ["VERITY__SEARCH__MAX_RESULTS", "VERITY__LLM__PROVIDER"],
        || {
            let settings = VerityConfigLoader::new().load().expect("defaults load");
            assert_eq!(settings.search.provider, SearchProviderKind::DuckDuckGo);
            assert_eq!(settings.search.max_results, 3);
            assert_eq!(settings.llm.provider, LlmProviderKind::Groq);
            assert_eq!(settings.analysis.timeout_secs, 120);
            assert_eq!(settings.http.retries, 0);
        },
    );
}

#[test]
#[serial]
fn file_values_are_expanded_and_env_overrides_win() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(
        &tmp,
        "verity.yaml",
        r#"
search:
  provider: brave
  max_results: 5
  api_key: "${BRAVE_TOKEN_FOR_TEST}"
llm:
  provider: openai
  model: "gpt-4o-mini"
  temperature: 0.2
analysis:
  timeout_secs: 60
"#,
    );

    temp_env::with_vars(
        [
            ("BRAVE_TOKEN_FOR_TEST", Some("brave-123")),
            ("VERITY__SEARCH__MAX_RESULTS", Some("2")),
            ("VERITY__ANALYSIS__TIMEOUT_SECS", Some("15")),
        ],
        || {
            let settings = VerityConfigLoader::new()
                .with_file(&p)
                .load()
                .expect("load config");

            assert_eq!(settings.search.provider, SearchProviderKind::Brave);
            assert_eq!(settings.search.api_key.as_deref(), Some("brave-123"));
            assert_eq!(settings.search.max_results, 2);
            assert_eq!(settings.analysis.timeout_secs, 15);
            assert_eq!(settings.llm.provider, LlmProviderKind::OpenAi);
            assert_eq!(settings.llm.temperature, Some(0.2));
        },
    );
}

#[test]
#[serial]
fn missing_required_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let res = VerityConfigLoader::new()
        .with_file(tmp.path().join("absent.yaml"))
        .load();
    assert!(res.is_err());
}

#[test]
#[serial]
fn zero_max_results_fails_validation() {
    let res = VerityConfigLoader::new()
        .without_env()
        .with_yaml_str("search:\n  max_results: 0")
        .load();
    let err = res.expect_err("invalid");
    assert!(err.to_string().contains("max_results"));
}

#[test]
#[serial]
fn dotenv_file_populates_unset_variables_only() {
    let tmp = TempDir::new().unwrap();
    let env_path = tmp.path().join(".env");
    fs::write(
        &env_path,
        "VERITY_TEST_DOTENV_NEW=from-file\nVERITY_TEST_DOTENV_SET=from-file\n",
    )
    .unwrap();

    temp_env::with_vars(
        [
            ("VERITY_TEST_DOTENV_NEW", None::<&str>),
            ("VERITY_TEST_DOTENV_SET", Some("from-shell")),
        ],
        || {
            let loaded = load_dotenv(Some(&env_path)).expect("dotenv loads");
            assert_eq!(loaded.as_deref(), Some(env_path.as_path()));
            assert_eq!(
                std::env::var("VERITY_TEST_DOTENV_NEW").as_deref(),
                Ok("from-file")
            );
            assert_eq!(
                std::env::var("VERITY_TEST_DOTENV_SET").as_deref(),
                Ok("from-shell")
            );
        },
    );
}

#[test]
fn explicit_config_path_is_returned_verbatim() {
    let p = PathBuf::from("/tmp/does-not-matter.yaml");
    assert_eq!(discover_config_file(Some(&p)), Some(p));
}
