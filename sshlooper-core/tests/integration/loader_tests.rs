//! Host list, catalog and export working together on real files

use std::path::Path;

use secrecy::SecretString;
use sshlooper_core::{
    CSV_HEADER, CommandCatalog, ConfigManager, CredentialHolder, Credentials, ExportFormat, Host,
    HostResult, HostStatus, Settings, load_hosts_csv, merge_results, write_export, write_sample,
};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, body: &str) {
    std::fs::write(dir.join(name), body).expect("write fixture");
}

#[test]
fn settings_point_at_loadable_inputs() {
    let dir = TempDir::new().unwrap();
    let hosts_file = dir.path().join("assets").join("hosts.csv");
    let commands_dir = dir.path().join("commands");
    std::fs::create_dir_all(&commands_dir).unwrap();

    let manager = ConfigManager::with_config_dir(dir.path().join("cfg"));
    manager
        .save_settings(&Settings {
            hosts_file: hosts_file.clone(),
            commands_dir: commands_dir.clone(),
            ..Settings::default()
        })
        .unwrap();

    write_sample(&hosts_file).unwrap();
    write(
        &commands_dir,
        "kernel.json",
        r#"{"Kernel": {"command": "uname -r", "parse": "(\\S+)", "category": "posix"}}"#,
    );

    let settings = manager.load_settings().unwrap();
    let hosts = load_hosts_csv(&settings.hosts_file).unwrap();
    let catalog = CommandCatalog::load_dir(&settings.commands_dir).unwrap();

    assert_eq!(hosts.len(), 3);
    assert_eq!(catalog.find("POSIX: Kernel").unwrap().spec.command, "uname -r");
}

#[test]
fn credentials_attach_to_every_host() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("hosts.csv");
    write(dir.path(), "hosts.csv", "hostname,ip,port\na,10.0.0.1,22\nb,10.0.0.2,2022\n");

    let mut holder = CredentialHolder::new(true);
    let credentials = holder
        .resolve(|| Ok::<_, std::io::Error>(Credentials::new("ops", "s3cret")))
        .unwrap();

    let hosts: Vec<Host> = load_hosts_csv(&path)
        .unwrap()
        .hosts
        .iter()
        .map(|entry| Host::from_entry(entry, &credentials))
        .collect();

    assert!(hosts.iter().all(|h| h.missing_fields().is_empty()));
    assert_eq!(hosts[1].port, 2022);
    assert!(holder.cached().is_some());
}

#[test]
fn export_reflects_partial_runs() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "hosts.csv",
        "hostname,ip,port\nweb,10.0.0.1,22\ndb,10.0.0.2,22\n",
    );
    let list = load_hosts_csv(&dir.path().join("hosts.csv")).unwrap();

    let finished = Host::new("web", "10.0.0.1", 22, "ops", SecretString::from("pw".to_string()));
    let mut result = HostResult::for_host(&finished);
    result.output = "5 days".to_string();

    let records = merge_results(&list.hosts, &[result]);
    assert_eq!(records[0].status, HostStatus::Complete);
    assert_eq!(records[1].status, HostStatus::Pending);

    let csv_path = dir.path().join("out.csv");
    write_export(&csv_path, ExportFormat::Csv, &records).unwrap();
    let text = std::fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], CSV_HEADER);
    assert!(lines[1].starts_with("web,10.0.0.1,22,"));
    assert!(lines[1].ends_with(",5 days,"));
    assert_eq!(lines[2], "db,10.0.0.2,22,,,");

    let json_path = dir.path().join("out.json");
    write_export(&json_path, ExportFormat::Json, &records).unwrap();
    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(parsed.as_array().map(Vec::len), Some(2));
}
