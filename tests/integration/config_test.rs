use std::path::PathBuf;
use supplymon::cli::{build_cli, config_from_matches};
use supplymon::core::config::{AppConfig, DEFAULT_SUBJECT};
use supplymon::core::devices::{load_devices, DeviceKind, DEFAULT_PAGES_SELECTOR};
use supplymon::SupplyError;
use tempfile::TempDir;

const PRINTERS: &str = r#"
printers:
  - name: Front Office M404dn
    type: pages_remaining
    url: http://192.168.1.40/
    threshold: 500
    model: CF258A
  - name: Shipping M402
    type: toner
    url: http://192.168.1.41/
    xpath: //*[@id="SupplyPLR0"]
    threshold: 10
    model: CF226X
  - name: MFP
    type: mfp
    url: http://192.168.1.42/hp/device/info_suppliesStatus.html
    toner_threshold: 10
    waste_toner_model: B5L37A
    model: HP M570dn
    drop_last_supply: true
    exclude_supplies: ["Toner Collection Unit"]
    model_numbers:
      Black: CE400X
      Cyan: CE401A
      Magenta: CE403A
      Yellow: CE402A
"#;

#[test]
fn test_config_default() {
    let config = AppConfig::default();
    assert_eq!(config.printers_path, PathBuf::from("printers.yaml"));
    assert_eq!(config.log_file, PathBuf::from("supply_monitor.log"));
    assert!(config.mail.recipient.is_none());
}

#[test]
fn test_load_devices_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("printers.yaml");
    std::fs::write(&path, PRINTERS).unwrap();

    let devices = load_devices(&path).unwrap();
    assert_eq!(devices.len(), 3);

    // Configured order is preserved
    let names: Vec<&str> = devices.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["Front Office M404dn", "Shipping M402", "MFP"]);

    match &devices[0].kind {
        DeviceKind::PagesRemaining(spec) => assert_eq!(spec.selector(), DEFAULT_PAGES_SELECTOR),
        other => panic!("unexpected kind {:?}", other),
    }

    match &devices[2].kind {
        DeviceKind::Mfp(spec) => {
            assert!(spec.drop_last_supply);
            assert_eq!(spec.model_numbers.len(), 4);
            assert!(spec.is_excluded_supply("Toner Collection Unit"));
            assert!(!spec.is_excluded_supply("Fuser Kit"));
        }
        other => panic!("unexpected kind {:?}", other),
    }
}

#[test]
fn test_missing_printers_file_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let err = load_devices(&temp_dir.path().join("missing.yaml")).unwrap_err();
    assert!(matches!(err, SupplyError::Config(_)));
}

#[test]
fn test_missing_required_field_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("printers.yaml");
    std::fs::write(
        &path,
        "printers:\n  - name: X\n    type: toner\n    url: http://h/\n    threshold: 10\n    model: M\n",
    )
    .unwrap();

    // toner devices need an xpath
    assert!(load_devices(&path).is_err());
}

#[test]
fn test_cli_paths_reach_config() {
    let matches = build_cli()
        .try_get_matches_from([
            "supplymon",
            "--mail-credentials",
            "/etc/supplymon/credentials.json",
            "--mail-token",
            "/var/lib/supplymon/token.json",
            "--chrome",
            "/usr/bin/chromium",
            "devices",
        ])
        .unwrap();

    let config = config_from_matches(&matches, None);
    assert_eq!(
        config.mail.credentials_path,
        PathBuf::from("/etc/supplymon/credentials.json")
    );
    assert_eq!(
        config.mail.token_path,
        PathBuf::from("/var/lib/supplymon/token.json")
    );
    assert_eq!(
        config.browser.chrome_path,
        Some(PathBuf::from("/usr/bin/chromium"))
    );
    assert_eq!(config.mail.subject, DEFAULT_SUBJECT);
}

#[test]
fn test_global_flag_after_subcommand() {
    let matches = build_cli()
        .try_get_matches_from(["supplymon", "devices", "--printers", "/srv/printers.yaml"])
        .unwrap();

    let config = config_from_matches(&matches, None);
    assert_eq!(config.printers_path, PathBuf::from("/srv/printers.yaml"));
}
