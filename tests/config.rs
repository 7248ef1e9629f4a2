use std::sync::Mutex;

use tempfile::NamedTempFile;

use celebi_watch::config::WatchConfig;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "CELEBI_CONFIG",
        "CELEBI_CAMERA_ENDPOINT",
        "CELEBI_CAMERA_INDEX",
        "CELEBI_PATTERN",
        "CELEBI_MATCH_THRESHOLD",
        "CELEBI_MAX_ATTEMPTS",
        "CELEBI_COUNTER_PATH",
        "CELEBI_SERIAL_ENDPOINT",
        "CELEBI_SERIAL_DIR",
        "CELEBI_SMS_HOST",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn loads_defaults_without_any_environment() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = WatchConfig::load().expect("load config");
    assert_eq!(cfg.camera.endpoint, "stub://bench");
    assert_eq!(cfg.detection.match_threshold, 0.75);
    assert_eq!(cfg.detection.max_attempts, 5);
    assert_eq!(cfg.serial.prefix, "ttyACM");
    assert_eq!(cfg.sms_host, "smsapi.free-mobile.fr");

    clear_env();
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{
        "camera": {
            "endpoint": "stub://shiny",
            "width": 800,
            "height": 600
        },
        "region": { "left": 30, "right": 30, "up": 20, "down": 25 },
        "detection": {
            "pattern_path": "target.png",
            "match_threshold": 0.8,
            "max_attempts": 3
        },
        "counter_path": "hunt.counter",
        "serial": { "prefix": "ttyUSB", "baud": 115200 },
        "sms_host": "sms.example.net"
    }"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");

    std::env::set_var("CELEBI_CONFIG", file.path());
    std::env::set_var("CELEBI_MATCH_THRESHOLD", "0.9");
    std::env::set_var("CELEBI_COUNTER_PATH", "/var/lib/celebi/sr.counter");
    std::env::set_var("CELEBI_SERIAL_ENDPOINT", "stub://DETECT");

    let cfg = WatchConfig::load().expect("load config");

    assert_eq!(cfg.camera.endpoint, "stub://shiny");
    assert_eq!(cfg.camera.width, 800);
    assert_eq!(cfg.camera.height, 600);
    assert_eq!(cfg.region.width(), 60);
    assert_eq!(cfg.region.height(), 45);
    assert_eq!(cfg.detection.pattern_path.to_str(), Some("target.png"));
    // Env wins over the file.
    assert_eq!(cfg.detection.match_threshold, 0.9);
    assert_eq!(cfg.detection.max_attempts, 3);
    assert_eq!(
        cfg.counter_path.to_str(),
        Some("/var/lib/celebi/sr.counter")
    );
    assert_eq!(cfg.serial.endpoint, "stub://DETECT");
    assert_eq!(cfg.serial.prefix, "ttyUSB");
    assert_eq!(cfg.serial.baud, 115200);
    assert_eq!(cfg.sms_host, "sms.example.net");

    clear_env();
}

#[test]
fn invalid_threshold_fails_validation() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("CELEBI_MATCH_THRESHOLD", "1.5");
    assert!(WatchConfig::load().is_err());

    clear_env();
}

#[test]
fn missing_config_file_is_an_error() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("CELEBI_CONFIG", "/nonexistent/celebi.json");
    assert!(WatchConfig::load().is_err());

    clear_env();
}
