mod common;

use aix_lvm_sys::{ConvergeError, Converger, Inspector, LvmTools, SysError};
use aix_lvm_testing::FakeAixHost;
use aix_lvm_types::{VolumeGroupAction, VolumeGroupSpec};

use common::{converger, dry_run};

#[test]
fn create_is_idempotent() {
    let host = FakeAixHost::new().with_disks(&["hdisk1", "hdisk2"]);
    let spec = VolumeGroupSpec::new("datavg", ["hdisk1", "hdisk2"]);

    let first = converger(&host).converge(&spec).unwrap();
    assert!(first.changed);
    assert_eq!(first.action, VolumeGroupAction::Create);
    assert_eq!(first.command.as_deref(), Some("mkvg -y datavg hdisk1 hdisk2"));
    assert!(host.has_volume_group("datavg"));
    assert_eq!(host.members("datavg"), vec!["hdisk1", "hdisk2"]);

    let second = converger(&host).converge(&spec).unwrap();
    assert!(!second.changed);
    assert_eq!(second.command, None);
    assert_eq!(host.mutations().len(), 1);
}

#[test]
fn create_keeps_declared_order() {
    let host = FakeAixHost::new().with_disks(&["hdisk1", "hdisk2", "hdisk3"]);
    let spec = VolumeGroupSpec::new("datavg", ["hdisk3", "hdisk1", "hdisk2"]);

    let result = converger(&host).converge(&spec).unwrap();

    assert_eq!(host.mutations(), vec!["mkvg -y datavg hdisk3 hdisk1 hdisk2"]);
    assert_eq!(result.physical_volumes, vec!["hdisk3", "hdisk1", "hdisk2"]);
}

#[test]
fn create_passes_force_and_partition_size() {
    let host = FakeAixHost::new().with_disk("hdisk1");
    let spec = VolumeGroupSpec::new("datavg", "hdisk1")
        .with_wipe_signatures(true)
        .with_physical_partition_size("128");

    converger(&host).converge(&spec).unwrap();

    assert_eq!(host.mutations(), vec!["mkvg -f -s 128 -y datavg hdisk1"]);
}

#[test]
fn existing_group_only_costs_a_status_check() {
    let host = FakeAixHost::new()
        .with_volume_group("datavg", &["hdisk1"])
        .with_disk("hdisk2");
    let spec = VolumeGroupSpec::new("datavg", ["hdisk1", "hdisk2"]);

    let result = converger(&host).converge(&spec).unwrap();

    assert!(!result.changed);
    assert_eq!(host.commands(), vec!["lsvg datavg"]);
    assert_eq!(host.members("datavg"), vec!["hdisk1"]);
}

#[test]
fn scalar_declaration_matches_single_element_list() {
    let scalar: VolumeGroupSpec =
        toml::from_str("name = \"datavg\"\nphysical_volumes = \"hdisk1\"\n").unwrap();
    let list: VolumeGroupSpec =
        toml::from_str("name = \"datavg\"\nphysical_volumes = [\"hdisk1\"]\n").unwrap();

    let scalar_host = FakeAixHost::new().with_disk("hdisk1");
    let list_host = FakeAixHost::new().with_disk("hdisk1");

    let scalar_result = converger(&scalar_host).converge(&scalar).unwrap();
    let list_result = converger(&list_host).converge(&list).unwrap();

    assert_eq!(scalar_result, list_result);
    assert_eq!(scalar_host.commands(), list_host.commands());
}

#[test]
fn dry_run_reports_the_change_without_mkvg() {
    let host = FakeAixHost::new().with_disk("hdisk1");
    let spec = VolumeGroupSpec::new("datavg", "hdisk1");

    let result = dry_run(&host).converge(&spec).unwrap();

    assert!(result.changed);
    assert!(result.dry_run);
    assert_eq!(result.command.as_deref(), Some("mkvg -y datavg hdisk1"));
    assert!(host.mutations().is_empty());
    assert!(!host.has_volume_group("datavg"));
}

#[test]
fn failed_mkvg_is_surfaced() {
    let host = FakeAixHost::new().with_disk("hdisk1");
    host.fail_command("mkvg");
    let spec = VolumeGroupSpec::new("datavg", "hdisk1");

    let error = converger(&host).converge(&spec).unwrap_err();

    assert!(matches!(
        &error,
        ConvergeError::Sys(SysError::CommandFailed { command, code: Some(1), .. })
            if command == "mkvg -y datavg hdisk1"
    ));
    assert_eq!(error.exit_code(), 1);
    assert!(!error.is_fatal());
}

#[test]
fn mkvg_rejection_by_the_host_is_surfaced() {
    let host = FakeAixHost::new().with_volume_group("rootvg", &["hdisk0"]);
    let spec = VolumeGroupSpec::new("datavg", "hdisk0");

    let error = converger(&host).converge(&spec).unwrap_err();

    assert!(error.to_string().contains("belongs to volume group rootvg"));
    assert!(!host.has_volume_group("datavg"));
}

#[test]
fn invalid_declaration_runs_nothing() {
    let host = FakeAixHost::new().with_disk("hdisk1");

    for spec in [
        VolumeGroupSpec::new("..", "hdisk1"),
        VolumeGroupSpec::new("datavg", Vec::<String>::new()),
        VolumeGroupSpec::new("datavg", "hdisk1").with_physical_partition_size("lots"),
    ] {
        let error = converger(&host).converge(&spec).unwrap_err();
        assert!(matches!(error, ConvergeError::InvalidSpec(_)));
        assert_eq!(error.exit_code(), 5);
    }
    assert!(host.commands().is_empty());
}

#[test]
fn missing_tool_is_an_inspection_error() {
    let host = FakeAixHost::new().with_disk("hdisk1");
    let tools = LvmTools {
        lsvg: "/usr/sbin/lsvg-missing".to_string(),
        ..LvmTools::default()
    };
    let converger = Converger::new(Inspector::with_tools(&host, tools));

    let error = converger
        .converge(&VolumeGroupSpec::new("datavg", "hdisk1"))
        .unwrap_err();

    assert!(matches!(
        error,
        ConvergeError::Sys(SysError::CommandNotFound(ref program)) if program == "/usr/sbin/lsvg-missing"
    ));
    assert!(host.mutations().is_empty());
}

#[test]
fn tool_paths_are_honoured() {
    let host = FakeAixHost::new().with_disk("hdisk1");
    let tools = LvmTools {
        lsvg: "/usr/sbin/lsvg".to_string(),
        mkvg: "/usr/sbin/mkvg".to_string(),
        ..LvmTools::default()
    };
    let converger = Converger::new(Inspector::with_tools(&host, tools));

    let result = converger
        .converge(&VolumeGroupSpec::new("datavg", "hdisk1"))
        .unwrap();

    assert!(result.changed);
    assert_eq!(
        host.commands(),
        vec!["/usr/sbin/lsvg datavg", "/usr/sbin/mkvg -y datavg hdisk1"]
    );
}
