use distinctpics::config::Config;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Figment without Env so other tests' variables cannot leak in
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .extract()
        .unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.io_threads, 4);
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        "io_threads = 8\nstrict = true\nskip_unreadable = true\npermanent = true\n",
    )
    .unwrap();

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .extract()
        .unwrap();

    assert_eq!(config.io_threads, 8);
    assert!(config.strict);
    assert!(config.skip_unreadable);
    assert!(config.permanent);
}

#[test]
fn test_config_env_overrides_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "io_threads = 8\n").unwrap();

    figment::Jail::expect_with(|jail| {
        jail.set_env("DISTINCTPICS_IO_THREADS", "16");
        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_path))
            .merge(Env::prefixed("DISTINCTPICS_"))
            .extract()?;
        assert_eq!(config.io_threads, 16);
        Ok(())
    });
}

#[test]
fn test_config_load_explicit_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("custom.toml");
    fs::write(&config_path, "strict = true\n").unwrap();

    figment::Jail::expect_with(|_jail| {
        let config = Config::load(Some(&config_path)).unwrap();
        assert!(config.strict);
        Ok(())
    });
}

#[test]
fn test_config_invalid_value() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "io_threads = \"many\"\n").unwrap();

    figment::Jail::expect_with(|_jail| {
        assert!(Config::load(Some(&config_path)).is_err());
        Ok(())
    });
}

#[test]
fn test_config_save_roundtrip() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    let config = Config {
        io_threads: 2,
        permanent: true,
        ..Config::default()
    };
    config.save(&config_path).unwrap();

    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("io_threads = 2"));
    assert!(content.contains("permanent = true"));
}
