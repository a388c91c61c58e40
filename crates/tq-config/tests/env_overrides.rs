use figment::Jail;
use pretty_assertions::assert_eq;
use tq_config::TqConfig;

#[test]
fn env_overrides_defaults() {
    Jail::expect_with(|jail| {
        jail.set_env("TQ_STORE__SNAPSHOT_FILE", "from-env.json");
        jail.set_env("TQ_GENERAL__DEFAULT_LIMIT", "7");

        let config = TqConfig::load_for(jail.directory()).expect("config loads");
        assert_eq!(config.store.snapshot_file, "from-env.json");
        assert_eq!(config.general.default_limit, 7);
        Ok(())
    });
}

#[test]
fn env_beats_project_toml() {
    Jail::expect_with(|jail| {
        jail.create_dir(".twentyq")?;
        jail.create_file(
            ".twentyq/config.toml",
            r#"
[store]
data_dir = "from-toml"
"#,
        )?;
        jail.set_env("TQ_STORE__DATA_DIR", "from-env");

        let config = TqConfig::load_for(jail.directory()).expect("config loads");
        assert_eq!(config.store.data_dir, "from-env");
        Ok(())
    });
}

#[test]
fn memory_database_via_env() {
    Jail::expect_with(|jail| {
        jail.set_env("TQ_STORE__DATABASE_FILE", ":memory:");

        let config = TqConfig::load_for(jail.directory()).expect("config loads");
        assert!(config.store.is_in_memory());
        Ok(())
    });
}
